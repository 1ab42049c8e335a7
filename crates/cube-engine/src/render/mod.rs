//! Cube rendering subsystem.
//!
//! The renderer core talks to the GPU only through [`RenderContext`], a
//! GL-style capability set. [`WgpuContext`] implements it on a wgpu device;
//! [`HeadlessContext`] records calls without one.
//!
//! Convention:
//! - clip space is wgpu's: `x, y ∈ [-1, 1]`, `z ∈ [0, 1]`.
//! - matrices are column-major `glam::Mat4`, uploaded as 16 floats.

pub mod buffer;
pub mod context;
pub mod cube;
mod error;
pub mod headless;
pub mod shader;
pub mod transform;
mod wgpu_context;

pub use buffer::{AttributeBuffer, upload_attribute};
pub use context::{
    AttributeLayout, BufferHandle, BufferUsage, ClearFlags, Primitive, ProgramHandle,
    RenderContext, ShaderHandle, UniformLocation,
};
pub use cube::{ColorMode, CubeConfig, Phase, RenderLoop, RenderState};
pub use error::{LoopError, SetupError};
pub use headless::HeadlessContext;
pub use shader::{ShaderProgram, ShaderStage, UniformLocations};
pub use transform::{CameraConfig, ProjectionConfig, Transform};
pub use wgpu_context::WgpuContext;
