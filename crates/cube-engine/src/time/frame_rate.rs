use super::FrameTime;

/// Averages frame rate over a fixed reporting window.
#[derive(Debug, Clone)]
pub struct FrameRateMeter {
    window_secs: f32,
    elapsed: f32,
    frames: u32,
}

impl FrameRateMeter {
    /// Reports once per `window_secs` of accumulated frame time.
    pub fn new(window_secs: f32) -> Self {
        Self {
            window_secs: window_secs.max(f32::EPSILON),
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Adds one frame. Returns the average rate when a window completes.
    pub fn record(&mut self, time: &FrameTime) -> Option<f32> {
        self.record_dt(time.dt)
    }

    fn record_dt(&mut self, dt: f32) -> Option<f32> {
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < self.window_secs {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.elapsed = 0.0;
        self.frames = 0;
        Some(fps)
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let mut meter = FrameRateMeter::new(1.0);
        let mut reports = Vec::new();
        for _ in 0..8 {
            if let Some(fps) = meter.record_dt(0.25) {
                reports.push(fps);
            }
        }
        assert_eq!(reports, vec![4.0, 4.0]);
    }

    #[test]
    fn slow_frames_report_immediately() {
        let mut meter = FrameRateMeter::new(1.0);
        assert_eq!(meter.record_dt(2.0), Some(0.5));
    }
}
