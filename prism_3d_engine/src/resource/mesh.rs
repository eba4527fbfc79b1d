/// Resource-level mesh type.
///
/// A Mesh is world-independent geometry: one shared vertex set, a triangle
/// list with precomputed center/normal/span, and parts that assign a material
/// to a contiguous triangle range. Meshes are built once with [`MeshBuilder`],
/// validated, then shared between models through `Arc`.

use std::ops::Range;
use std::sync::Arc;
use glam::{Vec2, Vec3, Vec4};
use crate::error::Result;
use crate::{engine_bail, engine_warn};
use crate::raster::{MAX_TRIANGLES_PER_DRAW, MAX_VERTICES};
use crate::scene::AABB;
use super::material::Material;

// ===== VERTEX DATA =====

/// Per-vertex attribute streams
///
/// Only `positions` is mandatory; the builder fills the other streams with
/// defaults (computed normals, zero UVs, one white color channel, channel 0).
#[derive(Debug, Clone, Default)]
pub struct VertexData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Vertex-paint layers, each one color per vertex
    pub color_channels: Vec<Vec<Vec4>>,
    /// Active color channel per vertex
    pub active_channels: Vec<u8>,
}

impl VertexData {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Color of a vertex in its active channel
    pub fn color(&self, vertex: usize) -> Vec4 {
        let channel = self.active_channels.get(vertex).copied().unwrap_or(0) as usize;
        self.color_channels
            .get(channel)
            .and_then(|colors| colors.get(vertex))
            .copied()
            .unwrap_or(Vec4::ONE)
    }
}

// ===== TRIANGLE =====

/// A triangle with its precomputed local-space properties
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub center: Vec3,
    /// Face normal (zero for degenerate triangles)
    pub normal: Vec3,
    /// Longest edge length
    pub max_span: f32,
}

impl Triangle {
    fn new(indices: [u32; 3], positions: &[Vec3]) -> Self {
        let [a, b, c] = indices.map(|i| positions[i as usize]);
        Self {
            indices,
            center: (a + b + c) / 3.0,
            normal: (b - a).cross(c - a).normalize_or_zero(),
            max_span: a.distance(b).max(b.distance(c)).max(c.distance(a)),
        }
    }
}

// ===== MESH PART =====

/// A material-homogeneous triangle range
#[derive(Debug, Clone)]
pub struct MeshPart {
    material: Option<Arc<Material>>,
    triangle_range: Range<usize>,
    vertex_range: Range<usize>,
    min_vertex_alpha: f32,
}

impl MeshPart {
    /// `None` draws with the default material
    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn triangle_range(&self) -> Range<usize> {
        self.triangle_range.clone()
    }

    /// Smallest contiguous vertex range referenced by the part's triangles
    pub fn vertex_range(&self) -> Range<usize> {
        self.vertex_range.clone()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_range.len()
    }

    /// Lowest vertex-color alpha among the part's vertices
    pub fn min_vertex_alpha(&self) -> f32 {
        self.min_vertex_alpha
    }

    /// Whether the part goes through the transparent pass for a given model tint alpha
    pub fn is_transparent(&self, default_material: &Material, model_alpha: f32) -> bool {
        let material = self.material.as_deref().unwrap_or(default_material);
        material.resolves_transparent(self.min_vertex_alpha * model_alpha)
    }
}

// ===== MESH =====

/// Immutable, validated mesh
#[derive(Debug)]
pub struct Mesh {
    name: String,
    vertices: VertexData,
    triangles: Vec<Triangle>,
    parts: Vec<MeshPart>,
    dimensions: AABB,
}

impl Mesh {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &VertexData {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> Option<&MeshPart> {
        self.parts.get(index)
    }

    /// Local-space bounds of every vertex
    pub fn dimensions(&self) -> &AABB {
        &self.dimensions
    }
}

// ===== BUILDER =====

struct PartDesc {
    material: Option<Arc<Material>>,
    triangles: Vec<[u32; 3]>,
}

/// Mesh construction and validation
///
/// # Example
///
/// ```ignore
/// let mesh = MeshBuilder::new("ramp")
///     .positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
///     .part(None, vec![[0, 1, 2]])
///     .build()?;
/// ```
pub struct MeshBuilder {
    name: String,
    vertices: VertexData,
    parts: Vec<PartDesc>,
}

impl MeshBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertices: VertexData::default(),
            parts: Vec::new(),
        }
    }

    pub fn positions(mut self, positions: Vec<Vec3>) -> Self {
        self.vertices.positions = positions;
        self
    }

    pub fn normals(mut self, normals: Vec<Vec3>) -> Self {
        self.vertices.normals = normals;
        self
    }

    pub fn uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.vertices.uvs = uvs;
        self
    }

    /// Append a vertex-paint layer
    pub fn color_channel(mut self, colors: Vec<Vec4>) -> Self {
        self.vertices.color_channels.push(colors);
        self
    }

    pub fn active_channels(mut self, channels: Vec<u8>) -> Self {
        self.vertices.active_channels = channels;
        self
    }

    /// Append a part drawn with `material`
    pub fn part(mut self, material: Option<Arc<Material>>, triangles: Vec<[u32; 3]>) -> Self {
        self.parts.push(PartDesc { material, triangles });
        self
    }

    /// Validate and build the mesh
    ///
    /// # Errors
    ///
    /// - attribute stream length differs from the position count
    /// - a triangle references a missing vertex
    /// - an active channel references a missing color channel
    ///
    /// Parts at or above the per-draw triangle limit, or spanning more
    /// vertices than one draw can address, only log a warning.
    pub fn build(self) -> Result<Mesh> {
        let MeshBuilder { name, mut vertices, parts } = self;
        let vertex_count = vertices.positions.len();

        // ========== VALIDATION 1: attribute streams ==========
        let streams = [
            ("normals", vertices.normals.len()),
            ("uvs", vertices.uvs.len()),
            ("active_channels", vertices.active_channels.len()),
        ];
        for (stream, len) in streams {
            if len != 0 && len != vertex_count {
                engine_bail!(InvalidResource, "prism3d::Mesh",
                    "Mesh '{}': {} has {} entries for {} vertices", name, stream, len, vertex_count);
            }
        }
        for (channel, colors) in vertices.color_channels.iter().enumerate() {
            if colors.len() != vertex_count {
                engine_bail!(InvalidResource, "prism3d::Mesh",
                    "Mesh '{}': color channel {} has {} entries for {} vertices",
                    name, channel, colors.len(), vertex_count);
            }
        }

        // ========== VALIDATION 2: index ranges ==========
        for (part_index, part) in parts.iter().enumerate() {
            if let Some(bad) = part.triangles.iter().flatten().find(|&&i| i as usize >= vertex_count) {
                engine_bail!(InvalidResource, "prism3d::Mesh",
                    "Mesh '{}': part {} references vertex {} ({} vertices)",
                    name, part_index, bad, vertex_count);
            }
        }

        // ========== DEFAULTS ==========
        if vertices.color_channels.is_empty() {
            vertices.color_channels.push(vec![Vec4::ONE; vertex_count]);
        }
        if vertices.active_channels.is_empty() {
            vertices.active_channels = vec![0; vertex_count];
        }
        if let Some(&channel) = vertices
            .active_channels
            .iter()
            .find(|&&c| c as usize >= vertices.color_channels.len())
        {
            engine_bail!(InvalidResource, "prism3d::Mesh",
                "Mesh '{}': active channel {} but only {} color channels",
                name, channel, vertices.color_channels.len());
        }
        if vertices.uvs.is_empty() {
            vertices.uvs = vec![Vec2::ZERO; vertex_count];
        }

        // ========== TRIANGLES AND PARTS ==========
        let mut triangles = Vec::with_capacity(parts.iter().map(|p| p.triangles.len()).sum());
        let mut mesh_parts = Vec::with_capacity(parts.len());

        for (part_index, part) in parts.into_iter().enumerate() {
            let start = triangles.len();
            triangles.extend(part.triangles.iter().map(|&indices| Triangle::new(indices, &vertices.positions)));
            let triangle_range = start..triangles.len();

            let vertex_range = match (
                part.triangles.iter().flatten().min(),
                part.triangles.iter().flatten().max(),
            ) {
                (Some(&lo), Some(&hi)) => lo as usize..hi as usize + 1,
                _ => 0..0,
            };

            if triangle_range.len() >= MAX_TRIANGLES_PER_DRAW {
                engine_warn!("prism3d::Mesh",
                    "Mesh '{}': part {} has {} triangles, the limit per draw call is {}",
                    name, part_index, triangle_range.len(), MAX_TRIANGLES_PER_DRAW - 1);
            }
            if vertex_range.len() > MAX_VERTICES {
                engine_warn!("prism3d::Mesh",
                    "Mesh '{}': part {} spans {} vertices, the limit per draw call is {}; it will not be drawn",
                    name, part_index, vertex_range.len(), MAX_VERTICES);
            }

            let min_vertex_alpha = vertex_range
                .clone()
                .map(|v| vertices.color(v).w)
                .fold(1.0_f32, f32::min);

            mesh_parts.push(MeshPart {
                material: part.material,
                triangle_range,
                vertex_range,
                min_vertex_alpha,
            });
        }

        if vertices.normals.is_empty() {
            vertices.normals = smooth_normals(&vertices.positions, &triangles);
        }

        let dimensions = AABB::from_points(vertices.positions.iter().copied())
            .unwrap_or(AABB::new(Vec3::ZERO, Vec3::ZERO));

        Ok(Mesh {
            name,
            vertices,
            triangles,
            parts: mesh_parts,
            dimensions,
        })
    }

    // ===== PRIMITIVES =====

    /// Two-triangle square in the XY plane facing +Z, centered on the origin
    pub fn quad(name: &str, size: f32, material: Option<Arc<Material>>) -> Self {
        let h = size * 0.5;
        Self::new(name)
            .positions(vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ])
            .normals(vec![Vec3::Z; 4])
            .uvs(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ])
            .part(material, vec![[0, 1, 2], [0, 2, 3]])
    }

    /// Axis-aligned cube with flat-shaded faces, centered on the origin
    pub fn cube(name: &str, size: f32, material: Option<Arc<Material>>) -> Self {
        let h = size * 0.5;
        // (normal, tangent u, tangent v) per face, counter-clockwise seen from outside
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut triangles = Vec::with_capacity(12);

        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                positions.push((normal + u * su + v * sv) * h);
                normals.push(normal);
                uvs.push(Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5));
            }
            triangles.push([base, base + 1, base + 2]);
            triangles.push([base, base + 2, base + 3]);
        }

        Self::new(name)
            .positions(positions)
            .normals(normals)
            .uvs(uvs)
            .part(material, triangles)
    }
}

fn smooth_normals(positions: &[Vec3], triangles: &[Triangle]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in triangles {
        for index in triangle.indices {
            normals[index as usize] += triangle.normal;
        }
    }
    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }
    normals
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
