/// SoftRasterDevice - CPU implementation of the RasterDevice trait
///
/// Triangles are scan-converted with edge functions evaluated at pixel
/// centers. Both windings are accepted; shared edges are owned by exactly one
/// of the two triangles (top-left rule), so adjacent triangles never blend a
/// texel twice. Attributes are interpolated linearly in screen space.

use glam::{Vec2, Vec4};
use slotmap::SlotMap;
use prism_3d_engine::prism3d::raster::{
    DrawImageOptions, DrawTriangles, Fragment, ImageDesc, ImageKey, RasterDevice, RasterVertex,
    SourceImages, MAX_SOURCE_IMAGES,
};
use prism_3d_engine::prism3d::Result;
use prism_3d_engine::engine_bail;
use crate::soft_image::{blend, SoftImage};
use crate::soft_stats::SoftStats;

/// Pixel area under which a triangle is not rasterized
const MIN_AREA: f32 = 1e-8;

/// Source images bound to one draw call
struct BoundImages<'a> {
    slots: [Option<&'a SoftImage>; MAX_SOURCE_IMAGES],
}

impl SourceImages for BoundImages<'_> {
    fn at_dst(&self, slot: usize, position: Vec2) -> Option<Vec4> {
        self.slots.get(slot).copied().flatten()?.at(position)
    }

    fn sample(&self, slot: usize, src: Vec2) -> Option<Vec4> {
        Some(self.slots.get(slot).copied().flatten()?.sample(src))
    }
}

/// CPU rasterizer
pub struct SoftRasterDevice {
    images: SlotMap<ImageKey, SoftImage>,
    stats: SoftStats,
}

impl SoftRasterDevice {
    pub fn new() -> Self {
        Self {
            images: SlotMap::with_key(),
            stats: SoftStats::default(),
        }
    }

    pub fn stats(&self) -> &SoftStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn image_name(&self, image: ImageKey) -> Option<&str> {
        self.images.get(image).map(|i| i.name.as_str())
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Single texel, `None` for unknown images or out-of-range coordinates
    pub fn texel(&self, image: ImageKey, x: u32, y: u32) -> Option<Vec4> {
        let image = self.images.get(image)?;
        if x >= image.width || y >= image.height {
            return None;
        }
        Some(image.texels[y as usize * image.width as usize + x as usize])
    }
}

impl Default for SoftRasterDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Twice the signed area of (a, b, p)
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Whether a texel lying exactly on the edge `a -> b` belongs to this triangle
fn owns_edge(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    d.y > 0.0 || (d.y == 0.0 && d.x < 0.0)
}

fn lerp_vertex(v: [&RasterVertex; 3], l: [f32; 3], position: Vec2) -> Fragment {
    let mix2 = |f: fn(&RasterVertex) -> [f32; 2]| {
        Vec2::from(f(v[0])) * l[0] + Vec2::from(f(v[1])) * l[1] + Vec2::from(f(v[2])) * l[2]
    };
    let mix4 = |f: fn(&RasterVertex) -> [f32; 4]| {
        Vec4::from(f(v[0])) * l[0] + Vec4::from(f(v[1])) * l[1] + Vec4::from(f(v[2])) * l[2]
    };
    Fragment {
        position,
        src: mix2(|v| v.src),
        color: mix4(|v| v.color),
        custom: mix4(|v| v.custom),
    }
}

impl RasterDevice for SoftRasterDevice {
    fn create_image(&mut self, desc: &ImageDesc) -> Result<ImageKey> {
        desc.validate()?;
        Ok(self.images.insert(SoftImage::new(desc)))
    }

    fn destroy_image(&mut self, image: ImageKey) {
        self.images.remove(image);
    }

    fn image_size(&self, image: ImageKey) -> Option<(u32, u32)> {
        self.images.get(image).map(|i| (i.width, i.height))
    }

    fn clear_image(&mut self, image: ImageKey, color: Vec4) -> Result<()> {
        match self.images.get_mut(image) {
            Some(target) => {
                target.clear(color);
                Ok(())
            }
            None => engine_bail!(InvalidResource, "prism3d::soft", "Clear of unknown image {:?}", image),
        }
    }

    fn draw_triangles(&mut self, target: ImageKey, draw: &DrawTriangles<'_>) -> Result<()> {
        draw.validate(target)?;
        let Some(target_image) = self.images.get_mut(target) else {
            engine_bail!(InvalidResource, "prism3d::soft", "Draw into unknown image {:?}", target);
        };
        let (width, height) = (target_image.width, target_image.height);
        let mut texels = std::mem::take(&mut target_image.texels);

        let mut slots = [None; MAX_SOURCE_IMAGES];
        for (slot, key) in slots.iter_mut().zip(draw.images) {
            *slot = key.and_then(|key| self.images.get(key));
        }
        let bound = BoundImages { slots };

        let mut stats = SoftStats::default();
        for triangle in draw.indices.chunks_exact(3) {
            stats.triangles += 1;
            let mut v = [
                &draw.vertices[triangle[0] as usize],
                &draw.vertices[triangle[1] as usize],
                &draw.vertices[triangle[2] as usize],
            ];
            let mut p = v.map(|vertex| Vec2::from(vertex.dst));
            let mut area = edge(p[0], p[1], p[2]);
            if area.abs() < MIN_AREA || !area.is_finite() {
                stats.degenerate_triangles += 1;
                continue;
            }
            if area < 0.0 {
                v.swap(1, 2);
                p.swap(1, 2);
                area = -area;
            }

            let min = p[0].min(p[1]).min(p[2]).max(Vec2::ZERO);
            let max = p[0].max(p[1]).max(p[2]).min(Vec2::new(width as f32, height as f32));
            if min.x >= max.x || min.y >= max.y {
                continue;
            }
            let owned = [owns_edge(p[1], p[2]), owns_edge(p[2], p[0]), owns_edge(p[0], p[1])];

            for y in (min.y.floor() as u32)..(max.y.ceil() as u32).min(height) {
                for x in (min.x.floor() as u32)..(max.x.ceil() as u32).min(width) {
                    let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let w = [edge(p[1], p[2], center), edge(p[2], p[0], center), edge(p[0], p[1], center)];
                    let inside = w.iter().zip(owned).all(|(&w, owned)| w > 0.0 || (w == 0.0 && owned));
                    if !inside {
                        continue;
                    }

                    let fragment = lerp_vertex(v, w.map(|w| w / area), center);
                    stats.fragments_shaded += 1;
                    match draw.program.shade(&fragment, &bound, &draw.uniforms) {
                        Some(color) => {
                            let texel = &mut texels[y as usize * width as usize + x as usize];
                            *texel = blend(*texel, color, draw.blend);
                        }
                        None => stats.fragments_discarded += 1,
                    }
                }
            }
        }

        if let Some(target_image) = self.images.get_mut(target) {
            target_image.texels = texels;
        }
        #[cfg(feature = "draw-tracing")]
        prism_3d_engine::engine_trace!("prism3d::soft", "{}: {} triangles, {} fragments, {} discarded",
            draw.program.name(), stats.triangles, stats.fragments_shaded, stats.fragments_discarded);

        self.stats.draw_calls += 1;
        self.stats.vertex_bytes += draw.vertex_bytes().len() as u64;
        self.stats.triangles += stats.triangles;
        self.stats.degenerate_triangles += stats.degenerate_triangles;
        self.stats.fragments_shaded += stats.fragments_shaded;
        self.stats.fragments_discarded += stats.fragments_discarded;
        Ok(())
    }

    fn draw_image(&mut self, target: ImageKey, source: ImageKey, options: &DrawImageOptions) -> Result<()> {
        if target == source {
            engine_bail!("prism3d::soft", "Image drawn onto itself");
        }
        let Some([target_image, source_image]) = self.images.get_disjoint_mut([target, source]) else {
            engine_bail!(InvalidResource, "prism3d::soft",
                "Image draw between unknown images {:?} <- {:?}", target, source);
        };

        let width = target_image.width.min(source_image.width) as usize;
        let height = target_image.height.min(source_image.height) as usize;
        for y in 0..height {
            for x in 0..width {
                let src = source_image.texels[y * source_image.width as usize + x] * options.color_scale;
                let dst = &mut target_image.texels[y * target_image.width as usize + x];
                *dst = blend(*dst, src, options.blend);
            }
        }
        self.stats.image_draws += 1;
        Ok(())
    }

    fn read_pixels(&self, image: ImageKey) -> Result<Vec<Vec4>> {
        match self.images.get(image) {
            Some(image) => Ok(image.texels.clone()),
            None => engine_bail!(InvalidResource, "prism3d::soft", "Read of unknown image {:?}", image),
        }
    }
}
