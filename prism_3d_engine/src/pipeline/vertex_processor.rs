/// Vertex processing: world → view → projection → pixels, plus per-vertex
/// lighting, vertex color, fog and depth.
///
/// Writes transformed vertices into the arena's [`VertexStream`] and the
/// triangles that survive culling into the sorting bucket.

use std::ops::Range;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use crate::raster::{RasterVertex, CUSTOM_DEPTH, CUSTOM_INV_W};
use crate::resource::{Material, Mesh};
use crate::scene::{Fog, Light, LightSource};
use super::arena::VertexStream;
use super::sorting::SortingTriangleBucket;

/// Smallest clip-space w used for the perspective divide
pub(crate) const MIN_W: f32 = 5e-5;

/// Signed pixel area below which a triangle counts as degenerate
const DEGENERATE_AREA: f32 = 1e-6;

/// Per-frame transform state shared by every draw unit
#[derive(Debug, Clone)]
pub(crate) struct FrameTransform {
    pub view: Mat4,
    /// Pixel-scaled projection times view
    pub view_projection: Mat4,
    pub eye: Vec3,
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
    pub depth_margin: f32,
    pub perspective_corrected: bool,
    /// Active fog, `None` when disabled or absent
    pub fog: Option<Fog>,
}

/// Map a clip-space position to pixel coordinates
///
/// Returns the pixel position and the clamped w.
pub(crate) fn project_to_screen(clip: Vec4, width: f32, height: f32) -> (Vec2, f32) {
    let w = clip.w.max(MIN_W);
    (
        Vec2::new(clip.x / w * width + width * 0.5, clip.y / -w * height + height * 0.5),
        w,
    )
}

/// Normalized depth with a margin of `margin * (far - near)` on both ends
///
/// `view_depth` is the distance along the camera forward axis, measured from
/// the eye rather than from the near plane.
pub(crate) fn normalized_depth(view_depth: f32, near: f32, far: f32, margin: f32) -> f32 {
    let range = far - near;
    let pad = margin * range;
    ((view_depth + pad) / (range + 2.0 * pad)).clamp(0.0, 1.0)
}

/// Everything needed to transform one model's vertices
pub(crate) struct VertexJob<'a> {
    pub mesh: &'a Mesh,
    pub vertex_range: Range<usize>,
    pub world: &'a Mat4,
    pub model_color: Vec4,
    pub material: &'a Material,
    /// `None` draws unlit
    pub lights: Option<(&'a [Light], &'a [usize])>,
    pub texture_size: Vec2,
}

/// Triangles of one model to queue after its vertices were transformed
pub(crate) struct TriangleJob<'a> {
    pub mesh: &'a Mesh,
    pub triangles: Range<usize>,
    /// First mesh vertex that was transformed
    pub vertex_start: usize,
    /// Stream index of that vertex
    pub base: usize,
    pub world: &'a Mat4,
    pub backface_culling: bool,
}

impl FrameTransform {
    /// Append the job's vertices to the stream
    ///
    /// Returns the stream index of the first appended vertex.
    pub fn transform(&self, job: &VertexJob<'_>, stream: &mut VertexStream) -> usize {
        let base = stream.len();
        let model_view_projection = self.view_projection * *job.world;
        let normal_matrix = Mat3::from_mat4(*job.world).inverse().transpose();
        let tint = job.material.color() * job.model_color;
        let vertices = job.mesh.vertices();
        let custom_depth = job.material.custom_depth();
        let fog = self.fog.as_ref().filter(|_| !job.material.fogless());

        for index in job.vertex_range.clone() {
            let local = vertices.positions[index];
            let world_position = job.world.transform_point3(local);
            let world_normal = (normal_matrix * vertices.normals[index]).normalize_or_zero();

            let clip = model_view_projection * local.extend(1.0);
            let (screen, w) = project_to_screen(clip, self.width, self.height);

            let view_depth = -self.view.transform_point3(world_position).z;
            let mut depth = normalized_depth(view_depth, self.near, self.far, self.depth_margin);
            if let Some(custom) = custom_depth {
                depth = custom(world_position, depth);
            }

            let mut color = tint * vertices.color(index);
            if let Some((lights, active)) = job.lights {
                let light = active
                    .iter()
                    .map(|&i| lights[i].light(world_position, world_normal))
                    .fold(Vec3::ZERO, |sum, l| sum + l);
                color = (color.truncate() * light).extend(color.w);
            }
            if let Some(fog) = fog {
                color = fog.apply(color, depth);
            }

            let uv = vertices.uvs[index];
            let mut src = Vec2::new(uv.x * job.texture_size.x, (1.0 - uv.y) * job.texture_size.y);
            let inv_w = 1.0 / w;
            if self.perspective_corrected {
                src *= inv_w;
            }

            let mut custom = [0.0; 4];
            custom[CUSTOM_DEPTH] = depth;
            custom[CUSTOM_INV_W] = inv_w;

            stream.vertices.push(RasterVertex {
                dst: screen.to_array(),
                src: src.to_array(),
                color: color.to_array(),
                custom,
            });
            stream.normal_colors.push((world_normal * 0.5 + Vec3::splat(0.5)).extend(1.0).to_array());
            stream.clip_w.push(clip.w);
        }

        base
    }

    /// Queue the surviving triangles of a job, re-based on the stream
    ///
    /// Dropped: triangles entirely behind the camera, entirely off screen,
    /// degenerate in pixel space, or back-facing when `backface_culling` is on.
    /// Returns the number of queued triangles.
    pub fn queue_triangles(
        &self,
        job: &TriangleJob<'_>,
        stream: &VertexStream,
        bucket: &mut SortingTriangleBucket,
    ) -> usize {
        let TriangleJob { mesh, world, backface_culling, .. } = *job;
        let mut queued = 0;
        for triangle in &mesh.triangles()[job.triangles.clone()] {
            let stream_indices = triangle.indices.map(|i| job.base + i as usize - job.vertex_start);
            let w = stream_indices.map(|i| stream.clip_w[i]);
            if w.iter().all(|&w| w <= 0.0) {
                continue;
            }

            let [a, b, c] = stream_indices.map(|i| Vec2::from(stream.vertices[i].dst));
            if (a.x < 0.0 && b.x < 0.0 && c.x < 0.0)
                || (a.x > self.width && b.x > self.width && c.x > self.width)
                || (a.y < 0.0 && b.y < 0.0 && c.y < 0.0)
                || (a.y > self.height && b.y > self.height && c.y > self.height)
            {
                continue;
            }

            // Pixel y grows downward, so front faces have a negative area
            let area = (b - a).perp_dot(c - a);
            if area.abs() <= DEGENERATE_AREA {
                continue;
            }
            if backface_culling && area > 0.0 && w.iter().all(|&w| w > 0.0) {
                continue;
            }

            let distance_sq = world.transform_point3(triangle.center).distance_squared(self.eye);
            bucket.push(distance_sq, stream_indices.map(|i| i as u16));
            queued += 1;
        }
        queued
    }
}

#[cfg(test)]
#[path = "vertex_processor_tests.rs"]
mod tests;
