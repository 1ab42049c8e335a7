//! Static mesh data.
//!
//! Meshes are plain CPU-side vertex lists. Renderers flatten them into `f32`
//! component arrays before upload; draw order defines the triangles.

mod cube;

pub use cube::{CUBE_FACE_COLORS, CUBE_POSITIONS, CUBE_VERTEX_COUNT, cube_mesh};

/// A single mesh vertex.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: Option<[f32; 3]>,
}

/// An ordered, non-indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.vertex_count() / 3
    }

    /// Flattened positions, three components per vertex.
    pub fn positions(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    /// Flattened colors, three components per vertex.
    ///
    /// Returns `None` unless every vertex carries a color.
    pub fn colors(&self) -> Option<Vec<f32>> {
        let mut out = Vec::with_capacity(self.vertices.len() * 3);
        for v in &self.vertices {
            out.extend_from_slice(&v.color?);
        }
        Some(out)
    }

    /// Drops per-vertex colors, keeping positions.
    pub fn without_colors(mut self) -> Self {
        for v in &mut self.vertices {
            v.color = None;
        }
        self
    }
}
