/// Draw-unit loop: turns classified units into vertex streams and flushes.

use crate::error::Result;
use crate::engine_trace;
use crate::raster::{RasterVertex, MAX_VERTICES};
use crate::resource::{Material, Mesh};
use crate::scene::{BoundingSphere, Light, LightSource, Model, Scene};
use super::arena::{FrameStats, VertexStream};
use super::dispatcher::Dispatcher;
use super::sort_batch::{BatchMember, DrawUnit};
use super::sorting::SortingTriangleBucket;
use super::vertex_processor::{FrameTransform, TriangleJob, VertexJob};

/// Read-only state shared by every unit of a frame
pub(crate) struct FrameContext<'a> {
    pub scene: &'a Scene,
    pub transform: &'a FrameTransform,
    pub default_material: &'a Material,
    /// World exists and has lighting on
    pub lighting: bool,
}

/// Arena buffers the unit loop writes into
pub(crate) struct FrameBuffers<'a> {
    pub stream: &'a mut VertexStream,
    pub bucket: &'a mut SortingTriangleBucket,
    pub normal_vertices: &'a mut Vec<RasterVertex>,
    pub lights: &'a mut [Light],
    pub model_lights: &'a mut Vec<usize>,
    pub stats: &'a mut FrameStats,
}

/// One model's contribution to the current stream
struct Piece<'a> {
    model: &'a Model,
    mesh: &'a Mesh,
    vertices: std::ops::Range<usize>,
    triangles: std::ops::Range<usize>,
}

/// Draw `units` in order
///
/// A plain unit is one flush. A batch unit appends its members to the same
/// stream with the owner part's material, flushing early only when the next
/// member would overflow the vertex limit.
pub(crate) fn draw_units(
    ctx: &FrameContext<'_>,
    dispatcher: &mut Dispatcher<'_>,
    units: &[DrawUnit],
    members: &[BatchMember],
    transparent: bool,
    buffers: &mut FrameBuffers<'_>,
) -> Result<()> {
    for unit in units {
        let Some(model) = ctx.scene.model(unit.model) else { continue };
        let Some(mesh) = model.mesh() else { continue };
        let Some(part) = mesh.part(unit.part) else { continue };
        let material = part.material().map_or(ctx.default_material, |m| m.as_ref());

        match &unit.members {
            None => {
                let piece = Piece {
                    model,
                    mesh,
                    vertices: part.vertex_range(),
                    triangles: part.triangle_range(),
                };
                if piece.vertices.len() > MAX_VERTICES {
                    engine_trace!("prism3d::Camera", "Model '{}' part {} skipped: {} vertices exceed one draw",
                        model.name(), unit.part, piece.vertices.len());
                    continue;
                }
                append(ctx, dispatcher, material, &piece, buffers);
            }
            Some(range) => {
                for member in &members[range.clone()] {
                    let Some(member_model) = ctx.scene.model(member.model) else { continue };
                    let Some(member_mesh) = member_model.mesh() else { continue };
                    let piece = Piece {
                        model: member_model,
                        mesh: member_mesh,
                        vertices: 0..member_mesh.vertex_count(),
                        triangles: 0..member_mesh.triangles().len(),
                    };
                    if piece.vertices.len() > MAX_VERTICES {
                        engine_trace!("prism3d::Camera", "Batch member '{}' skipped: {} vertices exceed one draw",
                            member_model.name(), piece.vertices.len());
                        continue;
                    }
                    if buffers.stream.remaining() < piece.vertices.len() {
                        flush(dispatcher, material, transparent, buffers)?;
                    }
                    append(ctx, dispatcher, material, &piece, buffers);
                }
            }
        }
        flush(dispatcher, material, transparent, buffers)?;
    }
    Ok(())
}

/// Transform one piece into the stream and queue its surviving triangles
fn append(
    ctx: &FrameContext<'_>,
    dispatcher: &Dispatcher<'_>,
    material: &Material,
    piece: &Piece<'_>,
    buffers: &mut FrameBuffers<'_>,
) {
    let lit = ctx.lighting && material.lighting();
    if lit {
        select_lights(buffers.lights, piece.model.world_sphere(), buffers.model_lights);
    }

    let job = VertexJob {
        mesh: piece.mesh,
        vertex_range: piece.vertices.clone(),
        world: piece.model.world_matrix(),
        model_color: piece.model.color(),
        material,
        lights: lit.then_some((&*buffers.lights, buffers.model_lights.as_slice())),
        texture_size: dispatcher.texture_size(material),
    };
    let base = ctx.transform.transform(&job, buffers.stream);
    ctx.transform.queue_triangles(
        &TriangleJob {
            mesh: piece.mesh,
            triangles: piece.triangles.clone(),
            vertex_start: piece.vertices.start,
            base,
            world: piece.model.world_matrix(),
            backface_culling: material.backface_culling(),
        },
        buffers.stream,
        buffers.bucket,
    );
    buffers.stats.drawn_parts += 1;
}

fn flush(
    dispatcher: &mut Dispatcher<'_>,
    material: &Material,
    transparent: bool,
    buffers: &mut FrameBuffers<'_>,
) -> Result<()> {
    buffers.bucket.drain_into(material.triangle_sort_mode(), &mut buffers.stream.indices);
    dispatcher.flush(material, transparent, buffers.stream, buffers.normal_vertices, buffers.stats)
}

/// Indices of the lights reaching `sphere`; every light when it is unknown
fn select_lights(lights: &mut [Light], sphere: Option<BoundingSphere>, out: &mut Vec<usize>) {
    out.clear();
    for (index, light) in lights.iter_mut().enumerate() {
        let reaches = match &sphere {
            Some(sphere) => light.begin_model(sphere),
            None => true,
        };
        if reaches {
            out.push(index);
        }
    }
}
