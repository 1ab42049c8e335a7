use anyhow::{Context, Result};

use cube_engine::render::{CubeConfig, HeadlessContext, RenderLoop};

/// Drives `frames` steady-state frames against the recording backend.
pub fn run(config: CubeConfig, frames: u64) -> Result<()> {
    let mut ctx = HeadlessContext::new();
    let mut render = RenderLoop::new(config);

    render.launch(&mut ctx).context("cube setup failed")?;

    for _ in 0..frames {
        render.frame(&mut ctx).context("cube frame failed")?;
    }

    let model = render.state().transform().model;
    log::info!(
        "headless run done: {} frames, {} draws",
        render.state().frames(),
        ctx.draw_count()
    );
    log::debug!("final model matrix: {model:?}");
    Ok(())
}
