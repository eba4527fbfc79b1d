/// World - scene-wide render settings: clear color, global lighting, fog.

use glam::{Vec3, Vec4};
use super::light::AmbientLight;

/// How fog color combines with a vertex color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FogMode {
    /// Fog color added on top
    #[default]
    Additive,
    /// Fog color subtracted
    Subtractive,
    /// Vertex color mixed toward the fog color
    Overwrite,
    /// Vertex alpha faded out
    Transparent,
}

/// Depth fog
#[derive(Debug, Clone, PartialEq)]
pub struct Fog {
    pub enabled: bool,
    pub mode: FogMode,
    pub color: Vec3,
    /// Normalized depth range `[start, end]` over which fog goes from 0 to full
    pub range: [f32; 2],
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: FogMode::Additive,
            color: Vec3::ZERO,
            range: [0.0, 1.0],
        }
    }
}

impl Fog {
    /// Fog amount in `[0, 1]` at a normalized depth
    pub fn amount(&self, depth: f32) -> f32 {
        let [start, end] = self.range;
        let span = end - start;
        if span.abs() <= f32::EPSILON {
            return if depth >= end { 1.0 } else { 0.0 };
        }
        ((depth - start) / span).clamp(0.0, 1.0)
    }

    /// Fogged vertex color; unchanged when fog is disabled
    pub fn apply(&self, color: Vec4, depth: f32) -> Vec4 {
        if !self.enabled {
            return color;
        }
        let t = self.amount(depth);
        let rgb = color.truncate();
        match self.mode {
            FogMode::Additive => (rgb + self.color * t).extend(color.w),
            FogMode::Subtractive => (rgb - self.color * t).max(Vec3::ZERO).extend(color.w),
            FogMode::Overwrite => rgb.lerp(self.color, t).extend(color.w),
            FogMode::Transparent => rgb.extend(color.w * (1.0 - t)),
        }
    }
}

/// Scene-wide settings
#[derive(Debug, Clone)]
pub struct World {
    pub name: String,
    pub clear_color: Vec4,
    /// `false` draws every material unlit
    pub lighting: bool,
    pub ambient: AmbientLight,
    pub fog: Fog,
}

impl World {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }
}

impl Default for World {
    fn default() -> Self {
        Self {
            name: "world".to_string(),
            clear_color: Vec4::new(0.08, 0.09, 0.1, 1.0),
            lighting: true,
            ambient: AmbientLight::new("ambient", Vec3::ONE, 0.5),
            fog: Fog::default(),
        }
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
