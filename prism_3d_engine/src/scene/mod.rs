//! Scene module
//!
//! Models, lights, world settings, bounding volumes and the sector graph:
//! everything a camera reads when it renders a frame.

mod bounds;
mod light;
mod model;
mod scene;
mod sector;
mod world;

pub use bounds::{AABB, BoundingSphere, Bounds};
pub(crate) use bounds::max_scale;
pub use light::{
    Light, LightKey, LightSource, AmbientLight, DirectionalLight, PointLight,
    DEFAULT_POINT_FALLOFF,
};
pub use model::{Model, ModelKey, ModelFlags, SectorType, DynamicBatch};
pub use scene::Scene;
pub use sector::{Sector, SectorGraph, SectorKey, SECTOR_MARGIN};
pub use world::{World, Fog, FogMode};
