use cube_engine::render::ColorMode;

/// Rotating cube viewer.
#[derive(Debug, Clone, PartialEq, clap::Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Run this many frames without a window, then exit
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<u64>,
    /// Draw every face in one constant color instead of per-face colors
    #[arg(long)]
    pub constant_color: bool,
    /// Logging filter, `env_logger` syntax; overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 640.0)]
    pub width: f64,
    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 640.0)]
    pub height: f64,
}

impl Args {
    pub fn color_mode(&self) -> ColorMode {
        if self.constant_color {
            ColorMode::Constant
        } else {
            ColorMode::PerVertex
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("cube-studio").chain(args.iter().copied()))
    }

    #[test]
    fn no_arguments_open_a_per_vertex_window() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.headless, None);
        assert_eq!(args.color_mode(), ColorMode::PerVertex);
        assert_eq!((args.width, args.height), (640.0, 640.0));
        assert!(args.log_filter.is_none());
    }

    #[test]
    fn headless_takes_a_frame_count() {
        let args = parse(&["--headless", "240", "--constant-color"]).unwrap();
        assert_eq!(args.headless, Some(240));
        assert_eq!(args.color_mode(), ColorMode::Constant);
    }

    #[test]
    fn window_size_and_filter_are_configurable() {
        let args = parse(&["--width", "800", "--height", "600", "--log-filter", "debug"]).unwrap();
        assert_eq!((args.width, args.height), (800.0, 600.0));
        assert_eq!(args.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(parse(&["--headless"]).is_err());
        assert!(parse(&["--headless", "many"]).is_err());
        assert!(parse(&["--fullscreen"]).is_err());
    }

    #[test]
    fn help_is_reported_as_display_help() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
