use crate::paint::Color;

use super::{Mesh, Vertex};

/// Number of vertices in the cube triangle list (6 faces x 2 triangles x 3).
pub const CUBE_VERTEX_COUNT: usize = 36;

/// Cube corner positions, grouped six vertices per face.
///
/// Face order: -Z, +Z, +X, -X, +Y, -Y.
#[rustfmt::skip]
pub const CUBE_POSITIONS: [[f32; 3]; CUBE_VERTEX_COUNT] = [
    [-1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0],
    [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0],
    [ 1.0, -1.0, -1.0],
    [ 1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0],
    [ 1.0, -1.0,  1.0],
    [-1.0,  1.0,  1.0],
    [-1.0,  1.0,  1.0],
    [ 1.0, -1.0,  1.0],
    [ 1.0,  1.0,  1.0],

    [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0,  1.0],
    [ 1.0,  1.0, -1.0],
    [ 1.0,  1.0, -1.0],
    [ 1.0, -1.0,  1.0],
    [ 1.0,  1.0,  1.0],

    [-1.0, -1.0, -1.0],
    [-1.0, -1.0,  1.0],
    [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0],
    [-1.0, -1.0,  1.0],
    [-1.0,  1.0,  1.0],

    [ 1.0,  1.0, -1.0],
    [ 1.0,  1.0,  1.0],
    [-1.0,  1.0, -1.0],
    [ 1.0,  1.0,  1.0],
    [-1.0,  1.0,  1.0],
    [-1.0,  1.0, -1.0],

    [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0,  1.0],
    [-1.0, -1.0, -1.0],
    [ 1.0, -1.0,  1.0],
    [-1.0, -1.0,  1.0],
    [-1.0, -1.0, -1.0],
];

/// One color per face, in `CUBE_POSITIONS` face order.
pub const CUBE_FACE_COLORS: [Color; 6] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::YELLOW,
    Color::CYAN,
    Color::MAGENTA,
];

/// Builds the cube mesh with one color per face.
pub fn cube_mesh() -> Mesh {
    let vertices = CUBE_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            color: Some(CUBE_FACE_COLORS[i / 6].to_rgb_array()),
        })
        .collect();
    Mesh::new(vertices)
}
