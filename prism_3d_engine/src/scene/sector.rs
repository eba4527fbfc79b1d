/// Sector graph - spatial partitions used to restrict rendering to the
/// camera's surroundings.
///
/// Built once from the scene's sector-typed models, decoupled from the models
/// themselves: each sector keeps the key of its owning model, its world AABB
/// and the set of sectors it touches. Neighbor links are symmetric.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};
use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use super::bounds::AABB;
use super::model::{Model, ModelKey, SectorType};

new_key_type! {
    pub struct SectorKey;
}

/// Total padding added to each sector dimension, so touching sectors overlap
pub const SECTOR_MARGIN: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct Sector {
    name: String,
    model: ModelKey,
    bounds: AABB,
    neighbors: FxHashSet<SectorKey>,
}

impl Sector {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the model that owns this sector
    pub fn model(&self) -> ModelKey {
        self.model
    }

    /// World bounds, margin included
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn neighbors(&self) -> &FxHashSet<SectorKey> {
        &self.neighbors
    }
}

/// Every sector of a scene with precomputed adjacency
#[derive(Debug, Clone, Default)]
pub struct SectorGraph {
    sectors: SlotMap<SectorKey, Sector>,
    by_model: FxHashMap<ModelKey, SectorKey>,
}

impl SectorGraph {
    /// Build the graph from every `SectorType::Sector` model
    ///
    /// # Errors
    ///
    /// - a sector model has no mesh to take its dimensions from
    /// - a sector model owns a dynamic batch
    pub fn build<'a>(models: impl IntoIterator<Item = (ModelKey, &'a Model)>) -> Result<Self> {
        let mut graph = SectorGraph::default();

        for (key, model) in models {
            if model.sector_type() != SectorType::Sector {
                continue;
            }
            let Some(mesh) = model.mesh() else {
                engine_bail!(ConfigurationError, "prism3d::SectorGraph",
                    "Sector model '{}' has no mesh to define its bounds", model.name());
            };
            if model.batch().is_some() {
                engine_bail!(ConfigurationError, "prism3d::SectorGraph",
                    "Sector model '{}' cannot own a dynamic batch", model.name());
            }

            let bounds = mesh
                .dimensions()
                .transformed(model.world_matrix())
                .expanded(SECTOR_MARGIN * 0.5);
            let sector_key = graph.sectors.insert(Sector {
                name: model.name().to_string(),
                model: key,
                bounds,
                neighbors: FxHashSet::default(),
            });
            graph.by_model.insert(key, sector_key);
        }

        let keys: Vec<SectorKey> = graph.sectors.keys().collect();
        for (i, &a) in keys.iter().enumerate() {
            for &b in &keys[i + 1..] {
                if graph.sectors[a].bounds.intersects(&graph.sectors[b].bounds) {
                    graph.sectors[a].neighbors.insert(b);
                    graph.sectors[b].neighbors.insert(a);
                }
            }
        }

        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn sector(&self, key: SectorKey) -> Option<&Sector> {
        self.sectors.get(key)
    }

    pub fn sectors(&self) -> impl Iterator<Item = (SectorKey, &Sector)> {
        self.sectors.iter()
    }

    /// Sector owned by a model
    pub fn sector_of_model(&self, model: ModelKey) -> Option<SectorKey> {
        self.by_model.get(&model).copied()
    }

    /// Smallest-volume sector containing `point`, ties to the smaller max span
    pub fn current_sector(&self, point: Vec3) -> Option<SectorKey> {
        self.sectors
            .iter()
            .filter(|(_, sector)| sector.bounds.contains_point(point))
            .min_by(|(_, a), (_, b)| {
                a.bounds
                    .volume()
                    .total_cmp(&b.bounds.volume())
                    .then(a.bounds.max_span().total_cmp(&b.bounds.max_span()))
            })
            .map(|(key, _)| key)
    }

    /// Sectors whose bounds contain `point`
    pub fn sectors_containing(&self, point: Vec3) -> impl Iterator<Item = SectorKey> + '_ {
        self.sectors
            .iter()
            .filter(move |(_, sector)| sector.bounds.contains_point(point))
            .map(|(key, _)| key)
    }

    /// Collect `start` and every sector within `depth` neighbor hops into `out`
    pub fn collect_within(&self, start: SectorKey, depth: u32, out: &mut FxHashSet<SectorKey>) {
        if !self.sectors.contains_key(start) {
            return;
        }
        out.insert(start);
        let mut frontier = vec![start];
        for _ in 0..depth {
            let mut next = Vec::new();
            for key in frontier {
                for &neighbor in &self.sectors[key].neighbors {
                    if out.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
    }
}

#[cfg(test)]
#[path = "sector_tests.rs"]
mod tests;
