/// Scene - the models and lights a camera renders.
///
/// Uses SlotMaps for O(1) insert/remove with stable keys. The scene only
/// stores what the render pipeline reads: parent/child links for traversal
/// order and visibility inheritance, world matrices supplied by the caller,
/// batch membership and an optional sector graph.

use slotmap::SlotMap;
use crate::error::Result;
use crate::{engine_bail, engine_debug};
use super::light::{Light, LightKey};
use super::model::{Model, ModelKey, SectorType};
use super::sector::SectorGraph;
use super::world::World;

/// A renderable scene
#[derive(Debug, Default)]
pub struct Scene {
    name: String,
    models: SlotMap<ModelKey, Model>,
    roots: Vec<ModelKey>,
    lights: SlotMap<LightKey, Light>,
    world: Option<World>,
    sectors: Option<SectorGraph>,
}

impl Scene {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ===== MODELS =====

    /// Add a top-level model
    pub fn add_model(&mut self, model: Model) -> ModelKey {
        let key = self.models.insert(model);
        self.roots.push(key);
        key
    }

    /// Add a model under `parent`
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` does not exist.
    pub fn add_child(&mut self, parent: ModelKey, mut model: Model) -> Result<ModelKey> {
        if !self.models.contains_key(parent) {
            engine_bail!(InvalidResource, "prism3d::Scene",
                "Cannot add child '{}': parent model not found", model.name());
        }
        model.parent = Some(parent);
        let key = self.models.insert(model);
        if let Some(parent_model) = self.models.get_mut(parent) {
            parent_model.children.push(key);
        }
        Ok(key)
    }

    /// Remove a model and its whole subtree
    ///
    /// Batches owned by removed models are dissolved; removed members are
    /// dropped from their owner's lists.
    pub fn remove_model(&mut self, key: ModelKey) -> Option<Model> {
        let parent = self.models.get(key)?.parent;
        match parent.and_then(|p| self.models.get_mut(p)) {
            Some(parent_model) => parent_model.children.retain(|&c| c != key),
            None => self.roots.retain(|&r| r != key),
        }

        let mut stack = vec![key];
        let mut removed_root = None;
        while let Some(current) = stack.pop() {
            let Some(model) = self.models.remove(current) else { continue };
            stack.extend(model.children.iter().copied());
            self.detach_from_batches(current, &model);
            if current == key {
                removed_root = Some(model);
            }
        }
        removed_root
    }

    pub fn model(&self, key: ModelKey) -> Option<&Model> {
        self.models.get(key)
    }

    pub fn model_mut(&mut self, key: ModelKey) -> Option<&mut Model> {
        self.models.get_mut(key)
    }

    pub fn models(&self) -> impl Iterator<Item = (ModelKey, &Model)> {
        self.models.iter()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn roots(&self) -> &[ModelKey] {
        &self.roots
    }

    /// First model with the given name
    pub fn find_model(&self, name: &str) -> Option<ModelKey> {
        self.models.iter().find(|(_, m)| m.name() == name).map(|(key, _)| key)
    }

    /// Whether `key` and every ancestor are visible
    pub fn is_visible_in_hierarchy(&self, key: ModelKey) -> bool {
        let mut current = Some(key);
        while let Some(model) = current.and_then(|k| self.models.get(k)) {
            if !model.is_visible() {
                return false;
            }
            current = model.parent();
        }
        current.is_none()
    }

    // ===== LIGHTS =====

    pub fn add_light(&mut self, light: impl Into<Light>) -> LightKey {
        self.lights.insert(light.into())
    }

    pub fn remove_light(&mut self, key: LightKey) -> Option<Light> {
        self.lights.remove(key)
    }

    pub fn light(&self, key: LightKey) -> Option<&Light> {
        self.lights.get(key)
    }

    pub fn light_mut(&mut self, key: LightKey) -> Option<&mut Light> {
        self.lights.get_mut(key)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightKey, &Light)> {
        self.lights.iter()
    }

    pub fn light_keys(&self) -> Vec<LightKey> {
        self.lights.keys().collect()
    }

    // ===== WORLD =====

    pub fn set_world(&mut self, world: Option<World>) {
        self.world = world;
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    // ===== DYNAMIC BATCHING =====

    /// Add `members` to the batch of `owner`, drawn with part `part` of the owner's mesh
    ///
    /// # Errors
    ///
    /// - `owner` or a member does not exist
    /// - `owner` is a sector model
    /// - `owner` has no mesh or no such part
    /// - a member is the owner itself, owns a batch, or already belongs to another batch
    pub fn add_to_batch(&mut self, owner: ModelKey, part: usize, members: &[ModelKey]) -> Result<()> {
        let Some(owner_model) = self.models.get(owner) else {
            engine_bail!(ConfigurationError, "prism3d::Scene", "Batch owner not found");
        };
        if owner_model.sector_type() == SectorType::Sector {
            engine_bail!(ConfigurationError, "prism3d::Scene",
                "Batch owner '{}' is a sector; sectors cannot own dynamic batches", owner_model.name());
        }
        let Some(mesh) = owner_model.mesh() else {
            engine_bail!(ConfigurationError, "prism3d::Scene",
                "Batch owner '{}' has no mesh", owner_model.name());
        };
        if mesh.part(part).is_none() {
            engine_bail!(ConfigurationError, "prism3d::Scene",
                "Batch owner '{}' has no mesh part {}", owner_model.name(), part);
        }
        if owner_model.batch_owner.is_some() {
            engine_bail!(ConfigurationError, "prism3d::Scene",
                "Batch owner '{}' is itself a batch member", owner_model.name());
        }

        for &member in members {
            let Some(member_model) = self.models.get(member) else {
                engine_bail!(ConfigurationError, "prism3d::Scene", "Batch member not found");
            };
            if member == owner || member_model.batch.is_some() {
                engine_bail!(ConfigurationError, "prism3d::Scene",
                    "Model '{}' owns a batch and cannot be a batch member", member_model.name());
            }
            if member_model.batch_owner.is_some_and(|o| o != owner) {
                engine_bail!(ConfigurationError, "prism3d::Scene",
                    "Model '{}' already belongs to another batch", member_model.name());
            }
        }

        for &member in members {
            if let Some(member_model) = self.models.get_mut(member) {
                member_model.batch_owner = Some(owner);
            }
        }
        if let Some(owner_model) = self.models.get_mut(owner) {
            let list = owner_model.batch.get_or_insert_with(Default::default).parts.entry(part).or_default();
            for &member in members {
                if !list.contains(&member) {
                    list.push(member);
                }
            }
            let member_count = list.len();
            engine_debug!("prism3d::Scene", "Batch '{}' part {} now has {} members",
                owner_model.name(), part, member_count);
        }
        Ok(())
    }

    /// Remove a member from whichever batch it belongs to
    pub fn remove_from_batch(&mut self, member: ModelKey) -> bool {
        let Some(owner) = self.models.get_mut(member).and_then(|m| m.batch_owner.take()) else {
            return false;
        };
        self.drop_batch_member(owner, member);
        true
    }

    /// Remove `member` from `owner`'s batch; an emptied batch turns the owner
    /// back into an ordinary model
    fn drop_batch_member(&mut self, owner: ModelKey, member: ModelKey) {
        if let Some(owner_model) = self.models.get_mut(owner) {
            if let Some(batch) = owner_model.batch.as_mut() {
                for list in batch.parts.values_mut() {
                    list.retain(|&m| m != member);
                }
                batch.parts.retain(|_, list| !list.is_empty());
                if batch.parts.is_empty() {
                    owner_model.batch = None;
                }
            }
        }
    }

    fn detach_from_batches(&mut self, key: ModelKey, removed: &Model) {
        if let Some(owner) = removed.batch_owner {
            self.drop_batch_member(owner, key);
        }
        if let Some(batch) = &removed.batch {
            for members in batch.parts.values() {
                for &member in members {
                    if let Some(member_model) = self.models.get_mut(member) {
                        member_model.batch_owner = None;
                    }
                }
            }
        }
    }

    // ===== SECTORS =====

    /// (Re)build the sector graph from the current sector models
    ///
    /// Call after sector models are added or moved.
    pub fn build_sectors(&mut self) -> Result<()> {
        let graph = SectorGraph::build(self.models.iter())?;
        engine_debug!("prism3d::Scene", "Scene '{}': built {} sectors", self.name, graph.len());
        self.sectors = Some(graph);
        Ok(())
    }

    pub fn sector_graph(&self) -> Option<&SectorGraph> {
        self.sectors.as_ref()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
