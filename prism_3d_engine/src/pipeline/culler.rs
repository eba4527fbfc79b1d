/// Visibility culling: hierarchy walk, sector filter, frustum test, light selection.

use glam::Vec3;
use rustc_hash::FxHashSet;
use crate::camera::ViewFrustum;
use crate::scene::{
    Light, LightKey, LightSource, Model, ModelKey, Scene, SectorGraph, SectorKey, SectorType,
};

/// Sector restriction for one frame
pub(crate) struct SectorFilter<'a> {
    pub graph: &'a SectorGraph,
    pub visible: &'a FxHashSet<SectorKey>,
}

impl SectorFilter<'_> {
    /// Standalone models always pass; the others need a visible sector
    pub fn allows(&self, key: ModelKey, model: &Model) -> bool {
        match model.sector_type() {
            SectorType::Standalone => true,
            SectorType::Sector => self
                .graph
                .sector_of_model(key)
                .is_some_and(|sector| self.visible.contains(&sector)),
            SectorType::Object => self
                .graph
                .sectors_containing(model.world_position())
                .any(|sector| self.visible.contains(&sector)),
        }
    }
}

/// Mark the sector containing `eye` and its neighbors within `depth` hops
///
/// Returns the current sector; `out` stays empty when the eye is in none.
pub(crate) fn visible_sectors(
    graph: &SectorGraph,
    eye: Vec3,
    depth: u32,
    out: &mut FxHashSet<SectorKey>,
) -> Option<SectorKey> {
    out.clear();
    let current = graph.current_sector(eye)?;
    graph.collect_within(current, depth, out);
    Some(current)
}

/// Depth-first pre-order walk from `roots` collecting drawable models
///
/// - an invisible model hides its whole subtree
/// - batch members are skipped (their owner draws them)
/// - models without a mesh are skipped but their children are visited
/// - the sector filter runs before the frustum test
/// - batch owners are not frustum-tested themselves; members are, later
pub(crate) fn collect_candidates(
    scene: &Scene,
    roots: &[ModelKey],
    frustum: &ViewFrustum,
    sectors: Option<&SectorFilter<'_>>,
    stack: &mut Vec<ModelKey>,
    out: &mut Vec<ModelKey>,
) {
    stack.clear();
    stack.extend(roots.iter().rev().copied());

    while let Some(key) = stack.pop() {
        let Some(model) = scene.model(key) else { continue };
        if !model.is_visible() {
            continue;
        }
        stack.extend(model.children().iter().rev().copied());

        if model.batch_owner().is_some() || model.mesh().is_none() {
            continue;
        }
        if let Some(filter) = sectors {
            if !filter.allows(key, model) {
                continue;
            }
        }
        if model.batch().is_none() && !model_in_frustum(model, frustum) {
            continue;
        }
        out.push(key);
    }
}

pub(crate) fn model_in_frustum(model: &Model, frustum: &ViewFrustum) -> bool {
    if !model.frustum_culling() {
        return true;
    }
    match model.world_sphere() {
        Some(sphere) => frustum.sphere_in_frustum(sphere.center, sphere.radius),
        None => false,
    }
}

/// Gather the lights used this frame into `out`
///
/// The world ambient light comes first when world lighting is on. With a cap
/// (`max_lights > 0`) lights are ordered by distance to `focus`, global
/// lights counting as closest, and point lights past the cap are dropped.
/// Global lights are never dropped.
pub(crate) fn collect_lights(
    scene: &Scene,
    light_keys: &[LightKey],
    focus: Vec3,
    max_lights: usize,
    out: &mut Vec<Light>,
) {
    out.clear();
    let Some(world) = scene.world().filter(|w| w.lighting) else {
        return;
    };
    if world.ambient.on {
        out.push(Light::Ambient(world.ambient.clone()));
    }
    out.extend(
        light_keys
            .iter()
            .filter_map(|&key| scene.light(key))
            .filter(|light| light.is_on())
            .cloned(),
    );

    if max_lights > 0 {
        let distance = |light: &Light| {
            light
                .position()
                .map_or(f32::NEG_INFINITY, |p| p.distance_squared(focus))
        };
        out.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
        let globals = out.iter().filter(|l| l.position().is_none()).count();
        out.truncate(max_lights.max(globals));
    }

    for light in out.iter_mut() {
        light.begin_render();
    }
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
