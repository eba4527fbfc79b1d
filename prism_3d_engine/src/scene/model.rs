/// Model - one drawable object in a scene.
///
/// A model pairs an optional shared mesh with a caller-supplied world matrix
/// and a color tint. Transform composition is the caller's job: the renderer
/// only reads `world_matrix`.

use std::collections::BTreeMap;
use std::sync::Arc;
use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use slotmap::new_key_type;
use crate::resource::Mesh;
use super::bounds::{BoundingSphere, Bounds};

new_key_type! {
    /// Stable key for a model in a [`Scene`](super::Scene)
    pub struct ModelKey;
}

bitflags! {
    /// Model flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModelFlags: u32 {
        /// Drawn at all; clearing it also hides every descendant
        const VISIBLE = 1 << 0;
        /// Tested against the view frustum before drawing
        const FRUSTUM_CULLING = 1 << 1;
    }
}

impl Default for ModelFlags {
    fn default() -> Self {
        ModelFlags::VISIBLE | ModelFlags::FRUSTUM_CULLING
    }
}

/// How a model takes part in sector rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectorType {
    /// Always considered, whatever sectors are visible
    #[default]
    Standalone,
    /// Visible when any visible sector contains its position
    Object,
    /// Owns a sector; its mesh dimensions define the sector bounds
    Sector,
}

/// Per-part member lists of a batch owner
///
/// Keys are mesh part indices of the owner's mesh; each member draws its whole
/// mesh with that part's material, in a single dispatch per part.
#[derive(Debug, Clone, Default)]
pub struct DynamicBatch {
    pub(crate) parts: BTreeMap<usize, Vec<ModelKey>>,
}

impl DynamicBatch {
    pub fn parts(&self) -> impl Iterator<Item = (usize, &[ModelKey])> {
        self.parts.iter().map(|(part, members)| (*part, members.as_slice()))
    }

    pub fn members(&self, part: usize) -> &[ModelKey] {
        self.parts.get(&part).map(|m| m.as_slice()).unwrap_or(&[])
    }

    pub fn member_count(&self) -> usize {
        self.parts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.values().all(Vec::is_empty)
    }
}

/// A drawable object
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    mesh: Option<Arc<Mesh>>,
    world_matrix: Mat4,
    color: Vec4,
    flags: ModelFlags,
    sector_type: SectorType,
    bounds: Option<Bounds>,
    pub(crate) parent: Option<ModelKey>,
    pub(crate) children: Vec<ModelKey>,
    pub(crate) batch: Option<DynamicBatch>,
    pub(crate) batch_owner: Option<ModelKey>,
}

impl Model {
    pub fn new(name: &str, mesh: Option<Arc<Mesh>>) -> Self {
        Self {
            name: name.to_string(),
            mesh,
            world_matrix: Mat4::IDENTITY,
            color: Vec4::ONE,
            flags: ModelFlags::default(),
            sector_type: SectorType::Standalone,
            bounds: None,
            parent: None,
            children: Vec::new(),
            batch: None,
            batch_owner: None,
        }
    }

    // ===== BUILDER-STYLE SETTERS =====

    pub fn with_world_matrix(mut self, world_matrix: Mat4) -> Self {
        self.world_matrix = world_matrix;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_sector_type(mut self, sector_type: SectorType) -> Self {
        self.sector_type = sector_type;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.col(3).truncate()
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn flags(&self) -> ModelFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ModelFlags::VISIBLE)
    }

    pub fn frustum_culling(&self) -> bool {
        self.flags.contains(ModelFlags::FRUSTUM_CULLING)
    }

    pub fn sector_type(&self) -> SectorType {
        self.sector_type
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn parent(&self) -> Option<ModelKey> {
        self.parent
    }

    pub fn children(&self) -> &[ModelKey] {
        &self.children
    }

    /// Member lists, if this model owns a dynamic batch
    pub fn batch(&self) -> Option<&DynamicBatch> {
        self.batch.as_ref()
    }

    /// Owner of the batch this model is a member of
    pub fn batch_owner(&self) -> Option<ModelKey> {
        self.batch_owner
    }

    // ===== SETTERS =====

    pub fn set_mesh(&mut self, mesh: Option<Arc<Mesh>>) {
        self.mesh = mesh;
    }

    pub fn set_world_matrix(&mut self, world_matrix: Mat4) {
        self.world_matrix = world_matrix;
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    pub fn set_flags(&mut self, flags: ModelFlags) {
        self.flags = flags;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(ModelFlags::VISIBLE, visible);
    }

    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.flags.set(ModelFlags::FRUSTUM_CULLING, enabled);
    }

    pub fn set_sector_type(&mut self, sector_type: SectorType) {
        self.sector_type = sector_type;
    }

    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
    }

    // ===== CULLING =====

    /// World-space bounding sphere: custom bounds if set, else the mesh dimensions
    pub fn world_sphere(&self) -> Option<BoundingSphere> {
        match (&self.bounds, &self.mesh) {
            (Some(bounds), _) => Some(bounds.world_sphere(&self.world_matrix)),
            (None, Some(mesh)) => Some(mesh.dimensions().transformed(&self.world_matrix).bounding_sphere()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
