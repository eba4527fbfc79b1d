/// Bounding volumes used for culling and sector membership.
///
/// Every volume reduces to a world-space [`BoundingSphere`] for the frustum
/// test; sectors use [`AABB`] directly.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::resource::Mesh;

// ===== AABB =====

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Tightest box around a point set, `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, p| Self::new(aabb.min.min(p), aabb.max.max(p))))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Length of the diagonal
    pub fn max_span(&self) -> f32 {
        self.size().length()
    }

    /// Grow every face outward by `margin`
    pub fn expanded(&self, margin: f32) -> AABB {
        AABB::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    /// Transform this local-space AABB by a matrix, returning a new AABB.
    ///
    /// Arvo's method: each matrix axis scaled by the box extents contributes
    /// its min/max, which is exact without transforming the 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    /// Whether the two boxes overlap or touch
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere {
            center: self.center(),
            radius: self.max_span() * 0.5,
        }
    }
}

// ===== SPHERE =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether two spheres overlap
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }
}

/// Largest axis scale of a transform
pub(crate) fn max_scale(matrix: &Mat4) -> f32 {
    matrix
        .col(0)
        .truncate()
        .length()
        .max(matrix.col(1).truncate().length())
        .max(matrix.col(2).truncate().length())
}

// ===== BOUNDS =====

/// Culling volume of a model, in the model's local space
#[derive(Debug, Clone)]
pub enum Bounds {
    Sphere(BoundingSphere),
    Aabb(AABB),
    /// Segment `start..end` swept by `radius`
    Capsule { start: Vec3, end: Vec3, radius: f32 },
    /// Bounds of an arbitrary triangle mesh (its local dimensions)
    Triangles(Arc<Mesh>),
}

impl Bounds {
    /// World-space sphere enclosing the volume
    pub fn world_sphere(&self, world: &Mat4) -> BoundingSphere {
        match self {
            Bounds::Sphere(sphere) => BoundingSphere {
                center: world.transform_point3(sphere.center),
                radius: sphere.radius * max_scale(world),
            },
            Bounds::Aabb(aabb) => aabb.transformed(world).bounding_sphere(),
            Bounds::Capsule { start, end, radius } => BoundingSphere {
                center: world.transform_point3((*start + *end) * 0.5),
                radius: (start.distance(*end) * 0.5 + radius) * max_scale(world),
            },
            Bounds::Triangles(mesh) => mesh.dimensions().transformed(world).bounding_sphere(),
        }
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
