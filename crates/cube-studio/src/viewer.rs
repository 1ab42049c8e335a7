use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use cube_engine::core::{App, AppControl, FrameCtx};
use cube_engine::render::{CubeConfig, RenderLoop, WgpuContext};
use cube_engine::time::FrameRateMeter;

/// Window app spinning the cube once per redraw.
///
/// The wgpu context needs the window's device, so setup runs on the first
/// frame rather than at construction.
pub struct CubeViewer {
    render: RenderLoop,
    gpu_ctx: Option<WgpuContext>,
    meter: FrameRateMeter,
}

impl CubeViewer {
    pub fn new(config: CubeConfig) -> Self {
        Self {
            render: RenderLoop::new(config),
            gpu_ctx: None,
            meter: FrameRateMeter::default(),
        }
    }
}

impl App for CubeViewer {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.gpu_ctx.is_none() {
            let mut c = WgpuContext::new(ctx.gpu.device(), ctx.gpu.queue(), ctx.gpu.surface_format());
            if let Err(e) = self.render.launch(&mut c) {
                log::error!("{e}");
                return AppControl::Exit;
            }
            self.gpu_ctx = Some(c);
        }
        let Some(gpu_ctx) = self.gpu_ctx.as_mut() else {
            return AppControl::Exit;
        };

        if let Some(fps) = self.meter.record(&ctx.time) {
            log::debug!("{fps:.1} fps (frame {})", ctx.time.frame_index);
        }

        // Pending work here is the initial frame `start` just recorded.
        if gpu_ctx.pending_commands() == 0 {
            if let Err(e) = self.render.frame(gpu_ctx) {
                log::error!("{e}");
                return AppControl::Exit;
            }
        }

        ctx.present(gpu_ctx)
    }

    fn on_resize(&mut self, _window_id: WindowId, width: u32, height: u32) {
        log::debug!("surface resized to {width}x{height}");
    }
}
