/// Lights - closed set of light kinds sharing the [`LightSource`] hooks.
///
/// Lighting is evaluated per vertex in world space. The camera calls
/// `begin_render` once per frame, `begin_model` once per model (a `false`
/// return skips the light for that model), then `light` per vertex.

use glam::Vec3;
use slotmap::new_key_type;
use super::bounds::BoundingSphere;

new_key_type! {
    /// Stable key for a light in a [`Scene`](super::Scene)
    pub struct LightKey;
}

/// Default falloff exponent of point lights
pub const DEFAULT_POINT_FALLOFF: f32 = 4.0;

/// Per-frame, per-model and per-vertex lighting hooks
pub trait LightSource {
    /// Reset per-frame working state
    fn begin_render(&mut self);

    /// Whether the light can reach a model with this world bounding sphere
    fn begin_model(&mut self, sphere: &BoundingSphere) -> bool;

    /// RGB contribution at a world-space vertex with a unit world normal
    fn light(&self, position: Vec3, normal: Vec3) -> Vec3;

    fn is_on(&self) -> bool;
}

// ===== AMBIENT =====

/// Uniform light, independent of position and normal
#[derive(Debug, Clone)]
pub struct AmbientLight {
    pub name: String,
    pub color: Vec3,
    pub energy: f32,
    pub on: bool,
}

impl AmbientLight {
    pub fn new(name: &str, color: Vec3, energy: f32) -> Self {
        Self { name: name.to_string(), color, energy, on: true }
    }
}

impl LightSource for AmbientLight {
    fn begin_render(&mut self) {}

    fn begin_model(&mut self, _sphere: &BoundingSphere) -> bool {
        true
    }

    fn light(&self, _position: Vec3, _normal: Vec3) -> Vec3 {
        self.color * self.energy
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

// ===== DIRECTIONAL =====

/// Sun-like light travelling along `direction`
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub name: String,
    pub color: Vec3,
    pub energy: f32,
    /// World direction the light travels in
    pub direction: Vec3,
    pub on: bool,
    towards_light: Vec3,
}

impl DirectionalLight {
    pub fn new(name: &str, color: Vec3, energy: f32, direction: Vec3) -> Self {
        Self {
            name: name.to_string(),
            color,
            energy,
            direction,
            on: true,
            towards_light: -direction.normalize_or_zero(),
        }
    }
}

impl LightSource for DirectionalLight {
    fn begin_render(&mut self) {
        self.towards_light = -self.direction.normalize_or_zero();
    }

    fn begin_model(&mut self, _sphere: &BoundingSphere) -> bool {
        true
    }

    fn light(&self, _position: Vec3, normal: Vec3) -> Vec3 {
        self.color * self.energy * normal.dot(self.towards_light).max(0.0)
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

// ===== POINT =====

/// Omnidirectional light at a world position
///
/// With `range == 0` the light has no hard limit and decays as
/// `2 / (1 + 0.1 * d²)`. Otherwise it fades to zero at `range` following
/// `1 - (d² / range²)^falloff`.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub name: String,
    pub color: Vec3,
    pub energy: f32,
    pub position: Vec3,
    pub range: f32,
    pub falloff: f32,
    pub on: bool,
}

impl PointLight {
    pub fn new(name: &str, color: Vec3, energy: f32, position: Vec3) -> Self {
        Self {
            name: name.to_string(),
            color,
            energy,
            position,
            range: 0.0,
            falloff: DEFAULT_POINT_FALLOFF,
            on: true,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    fn attenuation(&self, distance_sq: f32) -> f32 {
        if self.range <= 0.0 {
            2.0 / (1.0 + 0.1 * distance_sq)
        } else {
            let ratio = distance_sq / (self.range * self.range);
            (1.0 - ratio.powf(self.falloff)).clamp(0.0, 1.0)
        }
    }
}

impl LightSource for PointLight {
    fn begin_render(&mut self) {}

    fn begin_model(&mut self, sphere: &BoundingSphere) -> bool {
        if self.range <= 0.0 {
            return true;
        }
        let reach = self.range + sphere.radius;
        self.position.distance_squared(sphere.center) <= reach * reach
    }

    fn light(&self, position: Vec3, normal: Vec3) -> Vec3 {
        let to_light = self.position - position;
        let diffuse = normal.dot(to_light.normalize_or_zero()).max(0.0);
        if diffuse <= 0.0 {
            return Vec3::ZERO;
        }
        self.color * self.energy * diffuse * self.attenuation(to_light.length_squared())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

// ===== LIGHT =====

#[derive(Debug, Clone)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
}

impl Light {
    pub fn name(&self) -> &str {
        match self {
            Light::Ambient(l) => &l.name,
            Light::Directional(l) => &l.name,
            Light::Point(l) => &l.name,
        }
    }

    pub fn set_on(&mut self, on: bool) {
        match self {
            Light::Ambient(l) => l.on = on,
            Light::Directional(l) => l.on = on,
            Light::Point(l) => l.on = on,
        }
    }

    /// World position for distance ordering; `None` for global lights
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Light::Point(l) => Some(l.position),
            Light::Ambient(_) | Light::Directional(_) => None,
        }
    }
}

impl LightSource for Light {
    fn begin_render(&mut self) {
        match self {
            Light::Ambient(l) => l.begin_render(),
            Light::Directional(l) => l.begin_render(),
            Light::Point(l) => l.begin_render(),
        }
    }

    fn begin_model(&mut self, sphere: &BoundingSphere) -> bool {
        match self {
            Light::Ambient(l) => l.begin_model(sphere),
            Light::Directional(l) => l.begin_model(sphere),
            Light::Point(l) => l.begin_model(sphere),
        }
    }

    fn light(&self, position: Vec3, normal: Vec3) -> Vec3 {
        match self {
            Light::Ambient(l) => l.light(position, normal),
            Light::Directional(l) => l.light(position, normal),
            Light::Point(l) => l.light(position, normal),
        }
    }

    fn is_on(&self) -> bool {
        match self {
            Light::Ambient(l) => l.is_on(),
            Light::Directional(l) => l.is_on(),
            Light::Point(l) => l.is_on(),
        }
    }
}

impl From<AmbientLight> for Light {
    fn from(light: AmbientLight) -> Self {
        Light::Ambient(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
