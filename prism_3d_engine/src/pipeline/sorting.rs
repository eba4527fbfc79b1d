/// Triangle ordering inside one draw unit.
///
/// Keys are the squared distance from the camera to the world-space triangle
/// center. Non-negative `f32` values order the same as their bit patterns, so
/// the bucket radix-sorts plain `u32` keys.

use rdst::{RadixKey, RadixSort};
use crate::resource::TriangleSortMode;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SortingTriangle {
    key: u32,
    /// Stream-relative vertex indices
    indices: [u16; 3],
}

impl RadixKey for SortingTriangle {
    const LEVELS: usize = 4;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        self.key.get_level(level)
    }
}

/// Triangles of the draw being accumulated, waiting to be ordered
#[derive(Debug, Default)]
pub(crate) struct SortingTriangleBucket {
    triangles: Vec<SortingTriangle>,
}

impl SortingTriangleBucket {
    pub fn clear(&mut self) {
        self.triangles.clear();
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn push(&mut self, distance_sq: f32, indices: [u16; 3]) {
        self.triangles.push(SortingTriangle {
            key: distance_sq.max(0.0).to_bits(),
            indices,
        });
    }

    /// Append every triangle to `out` in `mode` order, then empty the bucket
    ///
    /// Always emits whole triples.
    pub fn drain_into(&mut self, mode: TriangleSortMode, out: &mut Vec<u16>) {
        out.reserve(self.triangles.len() * 3);
        match mode {
            TriangleSortMode::None => {
                out.extend(self.triangles.iter().flat_map(|t| t.indices));
            }
            TriangleSortMode::FrontToBack => {
                self.triangles.radix_sort_unstable();
                out.extend(self.triangles.iter().flat_map(|t| t.indices));
            }
            TriangleSortMode::BackToFront => {
                self.triangles.radix_sort_unstable();
                out.extend(self.triangles.iter().rev().flat_map(|t| t.indices));
            }
        }
        self.triangles.clear();
    }
}

#[cfg(test)]
#[path = "sorting_tests.rs"]
mod tests;
