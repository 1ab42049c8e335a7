//! Bundled WGSL sources for the cube programs.

/// Uniforms the cube programs declare, in resolution order.
pub const UNIFORM_NAMES: [&str; 3] = ["model_matrix", "view_matrix", "projection_matrix"];

/// Vertex stage forwarding a per-vertex `color` attribute.
pub const PER_VERTEX_COLOR_VERTEX: &str = include_str!("wgsl/per_vertex_color.vert.wgsl");

/// Fragment stage writing the interpolated vertex color.
pub const PER_VERTEX_COLOR_FRAGMENT: &str = include_str!("wgsl/per_vertex_color.frag.wgsl");

/// Vertex stage with positions only.
pub const CONSTANT_COLOR_VERTEX: &str = include_str!("wgsl/constant_color.vert.wgsl");

/// Fragment stage writing one constant color.
pub const CONSTANT_COLOR_FRAGMENT: &str = include_str!("wgsl/constant_color.frag.wgsl");
