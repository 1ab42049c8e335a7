//! Rotating cube render loop.
//!
//! The loop moves through `Uninitialized → Ready → Rendering`:
//! - [`setup`] builds the program, uploads the initial matrices and the
//!   vertex attributes.
//! - [`start`] enables depth testing and draws the first frame.
//! - [`frame`] rotates the model, re-uploads it and redraws.
//!
//! Each activation takes the [`RenderState`] explicitly; the host decides
//! when activations happen (a window runtime per redraw, or a plain loop).

mod config;
mod state;

pub use config::{ColorMode, CubeConfig, DEFAULT_ROTATION_SPEED};
pub use state::{Phase, RenderState};

use crate::geometry::cube_mesh;
use crate::render::buffer::upload_attribute;
use crate::render::context::RenderContext;
use crate::render::shader::{self, UNIFORM_NAMES};
use crate::render::transform::Transform;
use crate::render::LoopError;

use state::{MODEL_UNIFORM, PROJECTION_UNIFORM, VIEW_UNIFORM};

const POSITION_ATTRIBUTE: &str = "position";
const COLOR_ATTRIBUTE: &str = "color";

/// One-time setup. On failure the state stays `Uninitialized`.
pub fn setup<C: RenderContext + ?Sized>(ctx: &mut C, state: &mut RenderState) -> Result<(), LoopError> {
    if state.phase != Phase::Uninitialized {
        return Err(LoopError::AlreadySetUp);
    }

    let config = state.config;
    let transform = Transform::new(&config.camera, &config.projection);

    let (vertex_src, fragment_src) = config.color_mode.shader_sources();
    let program = shader::build_program(ctx, vertex_src, fragment_src, &UNIFORM_NAMES)?;
    ctx.use_program(program.handle);

    let mut mesh = cube_mesh();
    if !config.color_mode.uses_color_attribute() {
        mesh = mesh.without_colors();
    }

    let positions = upload_attribute(ctx, program.handle, &mesh.positions(), 3, POSITION_ATTRIBUTE)?;
    let colors = match mesh.colors() {
        Some(colors) => Some(upload_attribute(ctx, program.handle, &colors, 3, COLOR_ATTRIBUTE)?),
        None => None,
    };

    state.transform = transform;
    state.program = Some(program);
    state.positions = Some(positions);
    state.colors = colors;
    state.vertex_count = mesh.vertex_count();

    state.upload_matrix(ctx, MODEL_UNIFORM, &transform.model);
    state.upload_matrix(ctx, VIEW_UNIFORM, &transform.view);
    state.upload_matrix(ctx, PROJECTION_UNIFORM, &transform.projection);

    state.phase = Phase::Ready;
    log::info!(
        "cube ready: {} vertices, {:?} colors",
        state.vertex_count,
        config.color_mode
    );
    Ok(())
}

/// Enables depth testing and draws the initial frame.
pub fn start<C: RenderContext + ?Sized>(ctx: &mut C, state: &mut RenderState) -> Result<(), LoopError> {
    if state.phase != Phase::Ready {
        return Err(LoopError::NotReady);
    }
    ctx.set_depth_test(true);
    state.draw(ctx);
    state.phase = Phase::Rendering;
    Ok(())
}

/// One steady-state frame: rotate, upload the model matrix, clear, draw.
pub fn frame<C: RenderContext + ?Sized>(ctx: &mut C, state: &mut RenderState) -> Result<(), LoopError> {
    if state.phase != Phase::Rendering {
        return Err(LoopError::NotStarted);
    }
    state.update();
    state.draw(ctx);
    Ok(())
}

/// Owns a [`RenderState`] and drives it through the lifecycle.
#[derive(Debug, Clone, Default)]
pub struct RenderLoop {
    state: RenderState,
}

impl RenderLoop {
    pub fn new(config: CubeConfig) -> Self {
        Self { state: RenderState::new(config) }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn setup<C: RenderContext + ?Sized>(&mut self, ctx: &mut C) -> Result<(), LoopError> {
        setup(ctx, &mut self.state)
    }

    pub fn start<C: RenderContext + ?Sized>(&mut self, ctx: &mut C) -> Result<(), LoopError> {
        start(ctx, &mut self.state)
    }

    pub fn frame<C: RenderContext + ?Sized>(&mut self, ctx: &mut C) -> Result<(), LoopError> {
        frame(ctx, &mut self.state)
    }

    /// `setup` then `start`.
    pub fn launch<C: RenderContext + ?Sized>(&mut self, ctx: &mut C) -> Result<(), LoopError> {
        self.setup(ctx)?;
        self.start(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::render::headless::Command;
    use crate::render::{
        CameraConfig, ClearFlags, HeadlessContext, Primitive, ProjectionConfig, SetupError,
    };
    use glam::{Mat4, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn launched(config: CubeConfig) -> (HeadlessContext, RenderLoop) {
        let mut ctx = HeadlessContext::new();
        let mut render = RenderLoop::new(config);
        render.launch(&mut ctx).unwrap();
        (ctx, render)
    }

    // ── setup ─────────────────────────────────────────────────────────────

    #[test]
    fn setup_uploads_initial_matrices_and_attributes() {
        let mut ctx = HeadlessContext::new();
        let mut render = RenderLoop::default();
        render.setup(&mut ctx).unwrap();

        assert_eq!(render.phase(), Phase::Ready);
        assert_eq!(ctx.uniform_by_name("model_matrix"), Some(Mat4::IDENTITY));
        assert_eq!(ctx.uniform_by_name("view_matrix"), Some(Mat4::IDENTITY));
        assert_eq!(
            ctx.uniform_by_name("projection_matrix"),
            Some(render.state().transform().projection)
        );
        assert_eq!(ctx.enabled_attributes(), vec![0, 1]);
        assert_eq!(render.state().vertex_count(), 36);
        assert_eq!(ctx.draw_count(), 0);
    }

    #[test]
    fn constant_color_mode_uploads_positions_only() {
        let mut ctx = HeadlessContext::new();
        let mut render = RenderLoop::new(CubeConfig::default().with_color_mode(ColorMode::Constant));
        render.setup(&mut ctx).unwrap();

        assert!(render.state().colors().is_none());
        assert_eq!(ctx.enabled_attributes(), vec![0]);
    }

    #[test]
    fn setup_twice_is_rejected() {
        let (mut ctx, mut render) = launched(CubeConfig::default());
        assert_eq!(render.setup(&mut ctx), Err(LoopError::AlreadySetUp));
    }

    #[test]
    fn failed_setup_stays_uninitialized() {
        let mut ctx = HeadlessContext::new().with_max_buffer_bytes(16);
        let mut render = RenderLoop::default();

        let err = render.setup(&mut ctx).unwrap_err();
        assert!(matches!(err, LoopError::Setup(SetupError::BufferAllocation { .. })));
        assert_eq!(render.phase(), Phase::Uninitialized);
        assert_eq!(render.frame(&mut ctx), Err(LoopError::NotStarted));
        assert_eq!(ctx.draw_count(), 0);
    }

    // ── start / frame ─────────────────────────────────────────────────────

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut ctx = HeadlessContext::new();
        let mut render = RenderLoop::default();

        assert_eq!(render.frame(&mut ctx), Err(LoopError::NotStarted));
        assert_eq!(render.start(&mut ctx), Err(LoopError::NotReady));

        render.setup(&mut ctx).unwrap();
        assert_eq!(render.frame(&mut ctx), Err(LoopError::NotStarted));

        render.start(&mut ctx).unwrap();
        assert_eq!(render.start(&mut ctx), Err(LoopError::NotReady));
        assert!(render.frame(&mut ctx).is_ok());
    }

    #[test]
    fn start_enables_depth_and_draws_once() {
        let (ctx, render) = launched(CubeConfig::default());
        assert!(ctx.depth_test());
        assert_eq!(ctx.draw_count(), 1);
        assert_eq!(render.phase(), Phase::Rendering);
        assert_eq!(render.state().frames(), 0);
    }

    #[test]
    fn frame_rotates_uploads_clears_and_draws() {
        let (mut ctx, mut render) = launched(CubeConfig::default());
        ctx.take_commands();

        render.frame(&mut ctx).unwrap();

        let model = render.state().transform().model;
        assert_ne!(model, Mat4::IDENTITY);
        assert_eq!(ctx.uniform_by_name("model_matrix"), Some(model));

        let cmds = ctx.take_commands();
        assert_eq!(cmds.len(), 3);
        assert!(matches!(cmds[0], Command::UniformMatrix4 { .. }));
        assert_eq!(
            cmds[1],
            Command::Clear { color: Color::GRAY, flags: ClearFlags::COLOR_AND_DEPTH }
        );
        assert_eq!(
            cmds[2],
            Command::DrawArrays { primitive: Primitive::Triangles, first: 0, count: 36 }
        );
    }

    #[test]
    fn four_quarter_turn_frames_return_model_to_identity() {
        let (mut ctx, mut render) =
            launched(CubeConfig::default().with_rotation_speed(FRAC_PI_2));
        for _ in 0..4 {
            render.frame(&mut ctx).unwrap();
        }

        let model = ctx.uniform_by_name("model_matrix").unwrap();
        assert!(model.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        assert_eq!(render.state().frames(), 4);
        assert_eq!(ctx.draw_count(), 5);
    }

    #[test]
    fn constant_color_frame_draws_from_positions_only() {
        let (mut ctx, mut render) =
            launched(CubeConfig::default().with_color_mode(ColorMode::Constant));
        ctx.take_commands();

        render.frame(&mut ctx).unwrap();

        assert_eq!(ctx.enabled_attributes(), vec![0]);
        assert_eq!(ctx.attribute_layout(0).map(|l| l.components), Some(3));
        assert!(ctx.attribute_layout(1).is_none());
        let cmds = ctx.take_commands();
        assert_eq!(
            cmds.last(),
            Some(&Command::DrawArrays { primitive: Primitive::Triangles, first: 0, count: 36 })
        );
        assert_eq!(
            ctx.uniform_by_name("model_matrix"),
            Some(render.state().transform().model)
        );
    }

    #[test]
    fn configured_camera_and_projection_reach_the_uniforms() {
        let camera = CameraConfig::default()
            .with_eye(Vec3::new(0.0, 0.0, 3.0))
            .with_target(Vec3::ZERO)
            .with_up(Vec3::Y);
        let projection = ProjectionConfig { near: 0.1, far: 10.0, ..ProjectionConfig::default() };
        let config = CubeConfig::default().with_camera(camera).with_projection(projection);

        let (ctx, _render) = launched(config);

        let expected_view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let expected_projection = Mat4::orthographic_rh(-2.0, 2.0, -2.0, 2.0, 0.1, 10.0);
        let view = ctx.uniform_by_name("view_matrix").unwrap();
        let proj = ctx.uniform_by_name("projection_matrix").unwrap();
        assert!(view.abs_diff_eq(expected_view, 1e-6));
        assert!(proj.abs_diff_eq(expected_projection, 1e-6));
    }

    #[test]
    fn view_and_projection_are_not_reuploaded_per_frame() {
        let (mut ctx, mut render) = launched(CubeConfig::default());
        let view = ctx.uniform_by_name("view_matrix");
        let projection = ctx.uniform_by_name("projection_matrix");
        ctx.take_commands();

        for _ in 0..3 {
            render.frame(&mut ctx).unwrap();
        }

        let uploads = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::UniformMatrix4 { .. }))
            .count();
        assert_eq!(uploads, 3);
        assert_eq!(ctx.uniform_by_name("view_matrix"), view);
        assert_eq!(ctx.uniform_by_name("projection_matrix"), projection);
    }

    #[test]
    fn free_functions_drive_an_explicit_state() {
        let mut ctx = HeadlessContext::new();
        let mut state = RenderState::new(CubeConfig::default().with_background(Color::BLACK));

        setup(&mut ctx, &mut state).unwrap();
        start(&mut ctx, &mut state).unwrap();
        frame(&mut ctx, &mut state).unwrap();

        assert_eq!(state.phase(), Phase::Rendering);
        assert_eq!(state.frames(), 1);
        assert!(ctx.commands().contains(&Command::Clear {
            color: Color::BLACK,
            flags: ClearFlags::COLOR_AND_DEPTH
        }));
    }
}
