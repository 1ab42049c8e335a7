use std::fmt;

/// What the frame driver should do after a surface acquisition failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was reconfigured; the next redraw can acquire again.
    Reconfigured,
    /// Drop this frame and keep running.
    SkipFrame,
    /// Stop rendering; the device cannot recover.
    Fatal,
}

impl SurfaceErrorAction {
    pub fn is_fatal(self) -> bool {
        self == Self::Fatal
    }
}

impl fmt::Display for SurfaceErrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reconfigured => "surface reconfigured",
            Self::SkipFrame => "frame skipped",
            Self::Fatal => "fatal surface error",
        })
    }
}
