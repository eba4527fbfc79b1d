/// Camera configuration.

use crate::error::Result;
use crate::engine_bail;
use crate::scene::ModelKey;

/// Point the light cap measures distances from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightFocus {
    /// The camera position
    #[default]
    Camera,
    /// The world position of a model
    Model(ModelKey),
}

/// What `clear` does with the previous frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AccumulationMode {
    /// The accumulation target is left untouched
    #[default]
    Off,
    /// The accumulation target keeps `factor` of its alpha and receives the
    /// finished color frame on top
    Fade(f32),
}

/// Camera creation parameters
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Render target size in pixels
    pub width: u32,
    pub height: u32,
    pub near: f32,
    pub far: f32,
    /// Vertical field of view in degrees (perspective only)
    pub fov_y: f32,
    pub perspective: bool,
    /// View volume height in world units (orthographic only)
    pub ortho_scale: f32,
    /// Fraction of the near/far range kept free at both ends of the depth encoding
    pub depth_margin: f32,
    /// Lights kept per frame, nearest to the focus first. 0 keeps all.
    pub max_light_count: usize,
    pub light_focus: LightFocus,
    pub render_depth: bool,
    pub render_normals: bool,
    pub perspective_corrected_textures: bool,
    pub sector_rendering: bool,
    /// Neighbor hops rendered around the current sector
    pub sector_render_depth: u32,
    pub accumulation: AccumulationMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            near: 0.1,
            far: 100.0,
            fov_y: 60.0,
            perspective: true,
            ortho_scale: 20.0,
            depth_margin: 0.04,
            max_light_count: 0,
            light_focus: LightFocus::Camera,
            render_depth: true,
            render_normals: false,
            perspective_corrected_textures: false,
            sector_rendering: false,
            sector_render_depth: 1,
            accumulation: AccumulationMode::Off,
        }
    }
}

impl CameraConfig {
    /// Reject sizes and planes that cannot produce a projection
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            engine_bail!(ConfigurationError, "prism3d::Camera",
                "Camera size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.near.is_nan() || self.near <= 0.0 || self.far <= self.near || !self.far.is_finite() {
            engine_bail!(ConfigurationError, "prism3d::Camera",
                "Camera clip planes must satisfy 0 < near < far, got near={} far={}", self.near, self.far);
        }
        if self.perspective && (self.fov_y <= 0.0 || self.fov_y >= 180.0 || self.fov_y.is_nan()) {
            engine_bail!(ConfigurationError, "prism3d::Camera",
                "Camera field of view must be in (0, 180) degrees, got {}", self.fov_y);
        }
        if !self.perspective && self.ortho_scale <= 0.0 {
            engine_bail!(ConfigurationError, "prism3d::Camera",
                "Camera ortho scale must be positive, got {}", self.ortho_scale);
        }
        if self.depth_margin < 0.0 || self.depth_margin.is_nan() {
            engine_bail!(ConfigurationError, "prism3d::Camera",
                "Camera depth margin must be non-negative, got {}", self.depth_margin);
        }
        if let AccumulationMode::Fade(factor) = self.accumulation {
            if !(0.0..=1.0).contains(&factor) {
                engine_bail!(ConfigurationError, "prism3d::Camera",
                    "Accumulation fade factor must be in [0, 1], got {}", factor);
            }
        }
        Ok(())
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
