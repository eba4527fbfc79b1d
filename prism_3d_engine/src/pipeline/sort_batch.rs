/// Draw unit classification, ordering and dynamic batch expansion.

use std::ops::Range;
use glam::Vec3;
use crate::camera::ViewFrustum;
use crate::resource::{Material, Mesh};
use crate::scene::{Model, ModelKey, Scene};
use super::arena::FrameStats;
use super::culler::model_in_frustum;

/// One material-homogeneous draw: a model's mesh part, or a batch owner's
/// part expanded over its members
#[derive(Debug, Clone)]
pub(crate) struct DrawUnit {
    pub model: ModelKey,
    pub part: usize,
    /// Squared distance from the camera to the model's bounds center
    pub distance_sq: f32,
    /// Range into `RenderArena::batch_members`, set for batch owners
    pub members: Option<Range<usize>>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchMember {
    pub model: ModelKey,
    pub distance_sq: f32,
}

/// Output lists of [`classify`]
pub(crate) struct Classified<'a> {
    pub solids: &'a mut Vec<DrawUnit>,
    pub transparents: &'a mut Vec<DrawUnit>,
    pub batch_members: &'a mut Vec<BatchMember>,
    pub stats: &'a mut FrameStats,
}

fn distance_sq(model: &Model, eye: Vec3) -> f32 {
    model
        .world_sphere()
        .map_or_else(|| model.world_position(), |sphere| sphere.center)
        .distance_squared(eye)
}

/// Lowest alpha a member can produce once its tint is applied
fn member_alpha(model: &Model, mesh: &Mesh) -> f32 {
    mesh.parts()
        .iter()
        .map(|part| part.min_vertex_alpha())
        .fold(1.0_f32, f32::min)
        * model.color().w
}

/// Split candidates into solid and transparent draw units
///
/// Batch owners contribute one unit per batched part. Members are frustum
/// tested one by one, ordered far to near, and the whole unit is transparent
/// as soon as one member would be. Totals count every part that survived
/// culling, batched or not.
pub(crate) fn classify(
    scene: &Scene,
    candidates: &[ModelKey],
    eye: Vec3,
    frustum: &ViewFrustum,
    default_material: &Material,
    out: Classified<'_>,
) {
    let Classified { solids, transparents, batch_members, stats } = out;

    for &key in candidates {
        let Some(model) = scene.model(key) else { continue };
        let Some(mesh) = model.mesh() else { continue };

        match model.batch() {
            None => {
                let distance_sq = distance_sq(model, eye);
                for (part_index, part) in mesh.parts().iter().enumerate() {
                    stats.total_parts += 1;
                    stats.total_tris += part.triangle_count();
                    let unit = DrawUnit { model: key, part: part_index, distance_sq, members: None };
                    if part.is_transparent(default_material, model.color().w) {
                        transparents.push(unit);
                    } else {
                        solids.push(unit);
                    }
                }
            }
            Some(batch) => {
                for (part_index, members) in batch.parts() {
                    let Some(part) = mesh.part(part_index) else { continue };
                    let material = part.material().map_or(default_material, |m| m.as_ref());

                    let start = batch_members.len();
                    let mut transparent = false;
                    for &member_key in members {
                        let Some(member) = scene.model(member_key) else { continue };
                        let Some(member_mesh) = member.mesh() else { continue };
                        if !scene.is_visible_in_hierarchy(member_key) {
                            continue;
                        }
                        if !model_in_frustum(member, frustum) {
                            continue;
                        }
                        stats.total_parts += 1;
                        stats.total_tris += member_mesh.triangles().len();
                        transparent |= material.resolves_transparent(member_alpha(member, member_mesh));
                        batch_members.push(BatchMember {
                            model: member_key,
                            distance_sq: distance_sq(member, eye),
                        });
                    }
                    if batch_members.len() == start {
                        continue;
                    }
                    order_members_far_to_near(&mut batch_members[start..]);

                    let unit = DrawUnit {
                        model: key,
                        part: part_index,
                        distance_sq: distance_sq(model, eye),
                        members: Some(start..batch_members.len()),
                    };
                    if transparent {
                        transparents.push(unit);
                    } else {
                        solids.push(unit);
                    }
                }
            }
        }
    }
}

/// Stable sort, farthest first; equal distances keep their order
pub(crate) fn order_far_to_near(units: &mut [DrawUnit]) {
    units.sort_by(|a, b| b.distance_sq.total_cmp(&a.distance_sq));
}

fn order_members_far_to_near(members: &mut [BatchMember]) {
    members.sort_by(|a, b| b.distance_sq.total_cmp(&a.distance_sq));
}

#[cfg(test)]
#[path = "sort_batch_tests.rs"]
mod tests;
