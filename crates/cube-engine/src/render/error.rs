use std::fmt;

use super::shader::ShaderStage;

/// Failure during one-time renderer setup.
///
/// Every variant is fatal to setup: no frame is rendered after one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    /// A shader stage failed to parse or validate.
    ShaderCompilation { stage: ShaderStage, log: String },
    /// Two compiled stages could not be linked into a program.
    ShaderLink { log: String },
    /// The backend refused to allocate a device buffer.
    BufferAllocation { log: String },
    /// The attribute layout cannot be expressed as a float vertex format.
    UnsupportedAttribute { name: String, components: u32 },
}

impl SetupError {
    pub(crate) fn compile(stage: ShaderStage, log: impl Into<String>) -> Self {
        Self::ShaderCompilation { stage, log: log.into() }
    }

    pub(crate) fn link(log: impl Into<String>) -> Self {
        Self::ShaderLink { log: log.into() }
    }

    pub(crate) fn buffer(log: impl Into<String>) -> Self {
        Self::BufferAllocation { log: log.into() }
    }

    /// Backend diagnostic text, if the variant carries one.
    pub fn log(&self) -> Option<&str> {
        match self {
            Self::ShaderCompilation { log, .. }
            | Self::ShaderLink { log }
            | Self::BufferAllocation { log } => Some(log),
            Self::UnsupportedAttribute { .. } => None,
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShaderCompilation { stage, log } => {
                write!(f, "{stage} shader compilation failed: {log}")
            }
            Self::ShaderLink { log } => write!(f, "shader program link failed: {log}"),
            Self::BufferAllocation { log } => write!(f, "buffer allocation failed: {log}"),
            Self::UnsupportedAttribute { name, components } => write!(
                f,
                "attribute `{name}` has {components} components; expected 1 to 4"
            ),
        }
    }
}

impl std::error::Error for SetupError {}

/// Render loop failure: an out-of-order transition or a setup error.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopError {
    /// `setup` was called on a loop that already left `Uninitialized`.
    AlreadySetUp,
    /// `start` was called before `setup`, or after the loop started.
    NotReady,
    /// `frame` was called before `start`.
    NotStarted,
    /// `setup` failed; the loop stays `Uninitialized`.
    Setup(SetupError),
}

impl From<SetupError> for LoopError {
    fn from(err: SetupError) -> Self {
        Self::Setup(err)
    }
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySetUp => f.write_str("render loop is already set up"),
            Self::NotReady => f.write_str("render loop is not in the ready state"),
            Self::NotStarted => f.write_str("render loop has not started"),
            Self::Setup(err) => write!(f, "render loop setup failed: {err}"),
        }
    }
}

impl std::error::Error for LoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Setup(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_stage() {
        let err = SetupError::compile(ShaderStage::Fragment, "expected `;`");
        assert_eq!(err.to_string(), "fragment shader compilation failed: expected `;`");
        assert_eq!(err.log(), Some("expected `;`"));
    }

    #[test]
    fn unsupported_attribute_has_no_backend_log() {
        let err = SetupError::UnsupportedAttribute { name: "position".into(), components: 5 };
        assert!(err.log().is_none());
        assert!(err.to_string().contains("position"));
    }

    #[test]
    fn loop_error_wraps_setup_error_as_source() {
        use std::error::Error;

        let err = LoopError::from(SetupError::link("location 1 missing"));
        assert!(err.to_string().starts_with("render loop setup failed"));
        assert!(err.source().is_some());
        assert!(LoopError::NotStarted.source().is_none());
    }
}
