//! Rendering-context capability set.
//!
//! [`RenderContext`] is the only seam between the cube renderer and a graphics
//! backend. It is deliberately GL-shaped: handles are opaque ids, state such
//! as the current program or depth testing is sticky, and draws consume
//! whatever attributes are enabled at the time of the call.

use glam::Mat4;

use crate::paint::Color;

use super::shader::ShaderStage;
use super::SetupError;

/// Opaque id of a compiled shader stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShaderHandle(pub(crate) u32);

/// Opaque id of a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ProgramHandle(pub(crate) u32);

/// Opaque id of a device buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferHandle(pub(crate) u32);

/// Resource binding of a uniform within its program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

/// Expected update frequency of buffer contents.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    /// Written once, read by many draws.
    Static,
    /// Rewritten between draws.
    Dynamic,
}

/// How a bound buffer feeds one float vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeLayout {
    /// Components per vertex (1 to 4).
    pub components: u32,
    pub normalized: bool,
    /// Byte distance between vertices; `0` means tightly packed.
    pub stride: u32,
    /// Byte offset of the first vertex.
    pub offset: u64,
}

impl AttributeLayout {
    /// Tightly packed `f32` components, no normalization.
    pub const fn packed(components: u32) -> Self {
        Self { components, normalized: false, stride: 0, offset: 0 }
    }

    /// Effective stride in bytes.
    pub const fn byte_stride(&self) -> u32 {
        if self.stride == 0 {
            self.components * std::mem::size_of::<f32>() as u32
        } else {
            self.stride
        }
    }
}

/// Primitive assembly mode for `draw_arrays`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}

/// Which framebuffer planes a clear touches.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
}

impl ClearFlags {
    pub const COLOR_AND_DEPTH: Self = Self { color: true, depth: true };
    pub const COLOR: Self = Self { color: true, depth: false };
}

/// Capability set a backend provides to the renderer.
///
/// Setup-phase operations return [`SetupError`]. Steady-state operations
/// (uniform upload, clear, draw) do not fail at the call site; backend
/// failures there surface through the backend's own reporting.
pub trait RenderContext {
    /// Compiles one shader stage.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str)
    -> Result<ShaderHandle, SetupError>;

    /// Links two compiled stages into a program.
    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, SetupError>;

    /// Location of a uniform, or `None` when the program does not declare it.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Location of a vertex attribute, or `None` when the program does not
    /// declare it.
    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;

    /// Makes `program` current for uniform uploads and draws.
    fn use_program(&mut self, program: ProgramHandle);

    /// Reserves a buffer name. `None` if the backend cannot create one.
    fn create_buffer(&mut self) -> Option<BufferHandle>;

    /// Allocates storage for `buffer` and uploads `data`.
    fn buffer_data(
        &mut self,
        buffer: BufferHandle,
        data: &[f32],
        usage: BufferUsage,
    ) -> Result<(), SetupError>;

    /// Points attribute `location` at `buffer` with `layout`.
    fn vertex_attrib_pointer(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout);

    /// Enables attribute `location` for subsequent draws.
    fn enable_vertex_attrib(&mut self, location: u32);

    /// Uploads a 4x4 matrix to a uniform of the current program.
    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Mat4);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_blend(&mut self, enabled: bool);

    fn clear(&mut self, color: Color, flags: ClearFlags);

    /// Draws `count` vertices starting at `first` from the enabled attributes.
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);
}
