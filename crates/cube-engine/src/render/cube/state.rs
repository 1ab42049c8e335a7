use glam::Mat4;

use crate::paint::Color;
use crate::render::buffer::AttributeBuffer;
use crate::render::context::{ClearFlags, Primitive, RenderContext};
use crate::render::shader::{ShaderProgram, UNIFORM_NAMES};
use crate::render::transform::Transform;

use super::config::{ColorMode, CubeConfig};

pub(super) const MODEL_UNIFORM: &str = UNIFORM_NAMES[0];
pub(super) const VIEW_UNIFORM: &str = UNIFORM_NAMES[1];
pub(super) const PROJECTION_UNIFORM: &str = UNIFORM_NAMES[2];

/// Render loop lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Ready,
    Rendering,
}

/// Everything one frame activation reads and writes.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub(super) config: CubeConfig,
    pub(super) phase: Phase,
    pub(super) transform: Transform,
    pub(super) program: Option<ShaderProgram>,
    pub(super) positions: Option<AttributeBuffer>,
    pub(super) colors: Option<AttributeBuffer>,
    pub(super) vertex_count: u32,
    pub(super) frames: u64,
}

impl RenderState {
    pub fn new(config: CubeConfig) -> Self {
        Self {
            config,
            phase: Phase::Uninitialized,
            transform: Transform {
                model: Mat4::IDENTITY,
                view: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
            },
            program: None,
            positions: None,
            colors: None,
            vertex_count: 0,
            frames: 0,
        }
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    pub fn positions(&self) -> Option<&AttributeBuffer> {
        self.positions.as_ref()
    }

    pub fn colors(&self) -> Option<&AttributeBuffer> {
        self.colors.as_ref()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn color_mode(&self) -> ColorMode {
        self.config.color_mode
    }

    pub fn rotation_speed(&self) -> f32 {
        self.config.rotation_speed
    }

    pub fn background(&self) -> Color {
        self.config.background
    }

    /// Frames rendered since `start`, the initial draw excluded.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances the model rotation by one frame.
    pub(super) fn update(&mut self) {
        self.transform.rotate(self.config.rotation_speed);
        self.frames += 1;
    }

    /// Uploads `matrix` to `name` if the program declares it.
    pub(super) fn upload_matrix<C: RenderContext + ?Sized>(
        &self,
        ctx: &mut C,
        name: &str,
        matrix: &Mat4,
    ) {
        let Some(location) = self.program.as_ref().and_then(|p| p.uniforms.get(name)) else {
            return;
        };
        ctx.uniform_matrix4(location, matrix);
    }

    /// Clears to the background and draws the cube with the current model.
    pub(super) fn draw<C: RenderContext + ?Sized>(&self, ctx: &mut C) {
        self.upload_matrix(ctx, MODEL_UNIFORM, &self.transform.model);
        ctx.clear(self.config.background, ClearFlags::COLOR_AND_DEPTH);
        ctx.draw_arrays(Primitive::Triangles, 0, self.vertex_count);
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(CubeConfig::default())
    }
}
