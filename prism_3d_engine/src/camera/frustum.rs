/// ViewFrustum - camera-space visibility tests for spheres and points.
///
/// Tests are done in the camera basis (forward, right, up) rather than with
/// clip planes: a sphere is projected on the forward axis and compared with
/// the near/far range, then its lateral offsets are compared with the cone
/// half-extent at that depth. The sphere radius is widened by a per-axis
/// "sphere factor" (`1 / cos(half_angle)`) so a sphere touching the slanted
/// side plane is still reported visible.
///
/// Orthographic frustums compare against the half-width and half-height of
/// the view volume instead.

use glam::{Quat, Vec2, Vec3};

/// Per-axis cone constants, recomputed when the FOV or aspect ratio changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereFactors {
    /// `tan(fov_y / 2)`
    pub tan_y: f32,
    /// `1 / cos(fov_y / 2)`
    pub factor_y: f32,
    /// `tan(fov_y / 2) * aspect`, the horizontal half-angle tangent
    pub tan_x: f32,
    /// `1 / cos(atan(tan(fov_y / 2) * aspect))`
    pub factor_x: f32,
}

impl SphereFactors {
    pub fn new(fov_y_degrees: f32, aspect: f32) -> Self {
        let half = fov_y_degrees.to_radians() * 0.5;
        let tan_y = half.tan();
        let angle_x = (tan_y * aspect).atan();
        Self {
            tan_y,
            factor_y: 1.0 / half.cos(),
            tan_x: angle_x.tan(),
            factor_x: 1.0 / angle_x.cos(),
        }
    }
}

/// Snapshot of a camera's view volume
#[derive(Debug, Clone, Copy)]
pub struct ViewFrustum {
    position: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    near: f32,
    far: f32,
    perspective: bool,
    factors: SphereFactors,
    ortho_half_extent: Vec2,
}

impl ViewFrustum {
    pub fn perspective(position: Vec3, rotation: Quat, near: f32, far: f32, factors: SphereFactors) -> Self {
        Self {
            position,
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
            up: rotation * Vec3::Y,
            near,
            far,
            perspective: true,
            factors,
            ortho_half_extent: Vec2::ZERO,
        }
    }

    /// `half_extent` is half the view volume width and height in world units
    pub fn orthographic(position: Vec3, rotation: Quat, near: f32, far: f32, half_extent: Vec2) -> Self {
        Self {
            position,
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
            up: rotation * Vec3::Y,
            near,
            far,
            perspective: false,
            factors: SphereFactors::new(0.0, 1.0),
            ortho_half_extent: half_extent,
        }
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn is_perspective(&self) -> bool {
        self.perspective
    }

    pub fn sphere_factors(&self) -> &SphereFactors {
        &self.factors
    }

    // ===== TESTS =====

    /// Whether a world-space sphere can be seen
    ///
    /// A sphere containing the camera position is always visible.
    pub fn sphere_in_frustum(&self, center: Vec3, radius: f32) -> bool {
        let offset = center - self.position;
        if offset.length_squared() <= radius * radius {
            return true;
        }

        let z = offset.dot(self.forward);
        if z < self.near - radius || z > self.far + radius {
            return false;
        }

        let x = offset.dot(self.right);
        let y = offset.dot(self.up);

        if self.perspective {
            let limit_y = z * self.factors.tan_y + radius * self.factors.factor_y;
            if y.abs() > limit_y {
                return false;
            }
            let limit_x = z * self.factors.tan_x + radius * self.factors.factor_x;
            if x.abs() > limit_x {
                return false;
            }
        } else {
            if x.abs() > self.ortho_half_extent.x + radius {
                return false;
            }
            if y.abs() > self.ortho_half_extent.y + radius {
                return false;
            }
        }

        true
    }

    /// Whether a world-space point lies inside the view volume
    pub fn point_in_frustum(&self, point: Vec3) -> bool {
        let offset = point - self.position;
        let z = offset.dot(self.forward);
        if z < self.near || z > self.far {
            return false;
        }

        let x = offset.dot(self.right).abs();
        let y = offset.dot(self.up).abs();

        if self.perspective {
            x <= z * self.factors.tan_x && y <= z * self.factors.tan_y
        } else {
            x <= self.ortho_half_extent.x && y <= self.ortho_half_extent.y
        }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
