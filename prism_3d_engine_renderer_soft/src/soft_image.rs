/// CPU image storage and per-texel blending.

use glam::{Vec2, Vec4};
use prism_3d_engine::prism3d::raster::{depth_bits, BlendMode, ImageDesc};

/// Straight-alpha RGBA image, one `Vec4` per texel, row-major
pub(crate) struct SoftImage {
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) texels: Vec<Vec4>,
}

impl SoftImage {
    /// Build from a validated descriptor
    pub fn new(desc: &ImageDesc) -> Self {
        let count = desc.width as usize * desc.height as usize;
        let texels = match &desc.pixels {
            Some(pixels) => pixels
                .chunks_exact(4)
                .map(|p| Vec4::new(p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32) / 255.0)
                .collect(),
            None => vec![Vec4::ZERO; count],
        };
        Self {
            name: desc.name.clone(),
            width: desc.width,
            height: desc.height,
            texels,
        }
    }

    pub fn clear(&mut self, color: Vec4) {
        self.texels.fill(color);
    }

    /// Texel under a destination pixel position, `None` outside the image
    pub fn at(&self, position: Vec2) -> Option<Vec4> {
        let x = position.x.floor();
        let y = position.y.floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some(self.texels[y as usize * self.width as usize + x as usize])
    }

    /// Nearest texel at texel coordinates, clamped to the edges
    pub fn sample(&self, src: Vec2) -> Vec4 {
        let x = (src.x.floor().max(0.0) as u32).min(self.width - 1);
        let y = (src.y.floor().max(0.0) as u32).min(self.height - 1);
        self.texels[y as usize * self.width as usize + x as usize]
    }
}

/// Combine a source color with the destination texel
pub(crate) fn blend(dst: Vec4, src: Vec4, mode: BlendMode) -> Vec4 {
    let out = match mode {
        BlendMode::Copy => src,
        BlendMode::SourceOver => {
            let alpha = src.w + dst.w * (1.0 - src.w);
            if alpha <= 0.0 {
                Vec4::ZERO
            } else {
                let rgb = (src.truncate() * src.w + dst.truncate() * dst.w * (1.0 - src.w)) / alpha;
                rgb.extend(alpha)
            }
        }
        BlendMode::Additive => {
            (dst.truncate() + src.truncate() * src.w).extend(dst.w + src.w)
        }
        BlendMode::Multiply => (dst.truncate() * src.truncate()).extend(dst.w),
        BlendMode::NearestDepth => {
            if dst.w > 0.0 && depth_bits(dst) <= depth_bits(src) {
                dst
            } else {
                src
            }
        }
    };
    out.clamp(Vec4::ZERO, Vec4::ONE)
}

#[cfg(test)]
#[path = "soft_image_tests.rs"]
mod tests;
