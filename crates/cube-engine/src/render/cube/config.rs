use crate::paint::Color;
use crate::render::shader::{
    CONSTANT_COLOR_FRAGMENT, CONSTANT_COLOR_VERTEX, PER_VERTEX_COLOR_FRAGMENT,
    PER_VERTEX_COLOR_VERTEX,
};
use crate::render::transform::{CameraConfig, ProjectionConfig};

/// Rotation applied about each axis per frame, in radians.
pub const DEFAULT_ROTATION_SPEED: f32 = 0.025;

/// How cube faces are colored.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ColorMode {
    /// One color per face, carried by a `color` vertex attribute.
    #[default]
    PerVertex,
    /// A single color written by the fragment stage; no color attribute.
    Constant,
}

impl ColorMode {
    /// `(vertex, fragment)` WGSL sources for this mode.
    pub fn shader_sources(self) -> (&'static str, &'static str) {
        match self {
            Self::PerVertex => (PER_VERTEX_COLOR_VERTEX, PER_VERTEX_COLOR_FRAGMENT),
            Self::Constant => (CONSTANT_COLOR_VERTEX, CONSTANT_COLOR_FRAGMENT),
        }
    }

    pub fn uses_color_attribute(self) -> bool {
        matches!(self, Self::PerVertex)
    }
}

/// Cube renderer configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeConfig {
    pub rotation_speed: f32,
    pub background: Color,
    pub color_mode: ColorMode,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            rotation_speed: DEFAULT_ROTATION_SPEED,
            background: Color::GRAY,
            color_mode: ColorMode::PerVertex,
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl CubeConfig {
    pub fn with_rotation_speed(mut self, radians_per_frame: f32) -> Self {
        self.rotation_speed = radians_per_frame;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = projection;
        self
    }
}
