/// Per-camera scratch buffers reused across frames.
///
/// Everything here is cleared, never freed, between frames so a steady scene
/// renders without allocating. Nothing in the arena outlives one `render`
/// call semantically; only the capacity is kept.

use rustc_hash::FxHashSet;
use crate::raster::{RasterVertex, MAX_VERTICES};
use crate::scene::{Light, ModelKey, SectorKey};
use super::sort_batch::{BatchMember, DrawUnit};
use super::sorting::SortingTriangleBucket;

/// Screen-space vertices and indices of the draw being accumulated
#[derive(Debug, Default)]
pub(crate) struct VertexStream {
    pub vertices: Vec<RasterVertex>,
    /// Remapped world normals, the color channel of the normal pass
    pub normal_colors: Vec<[f32; 4]>,
    /// Unclamped clip-space w per vertex
    pub clip_w: Vec<f32>,
    pub indices: Vec<u16>,
}

impl VertexStream {
    /// Current cursor: index of the next vertex written
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertices that still fit in one draw call
    pub fn remaining(&self) -> usize {
        MAX_VERTICES - self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn reset(&mut self) {
        self.vertices.clear();
        self.normal_colors.clear();
        self.clip_w.clear();
        self.indices.clear();
    }
}

/// Counters gathered while rendering one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameStats {
    pub draw_calls: usize,
    pub total_parts: usize,
    pub drawn_parts: usize,
    pub total_tris: usize,
    pub drawn_tris: usize,
}

/// Scratch storage owned by a camera
#[derive(Debug, Default)]
pub(crate) struct RenderArena {
    pub stream: VertexStream,
    pub bucket: SortingTriangleBucket,
    /// Depth-first traversal stack
    pub stack: Vec<ModelKey>,
    /// Models passing visibility, sector and frustum filters, in traversal order
    pub candidates: Vec<ModelKey>,
    pub solids: Vec<DrawUnit>,
    pub transparents: Vec<DrawUnit>,
    /// Batch members referenced by `DrawUnit::members` ranges
    pub batch_members: Vec<BatchMember>,
    /// Lights active this frame, after the cap
    pub lights: Vec<Light>,
    /// Indices into `lights` reaching the model being transformed
    pub model_lights: Vec<usize>,
    pub visible_sectors: FxHashSet<SectorKey>,
    /// Normal-pass copy of the stream vertices
    pub normal_vertices: Vec<RasterVertex>,
    pub stats: FrameStats,
}

impl RenderArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all per-frame lists, keeping their capacity
    pub fn begin_frame(&mut self) {
        self.stream.reset();
        self.bucket.clear();
        self.stack.clear();
        self.candidates.clear();
        self.solids.clear();
        self.transparents.clear();
        self.batch_members.clear();
        self.lights.clear();
        self.model_lights.clear();
        self.visible_sectors.clear();
        self.normal_vertices.clear();
        self.stats = FrameStats::default();
    }
}
