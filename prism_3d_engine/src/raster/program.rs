/// Fragment programs: per-pixel callables selected by material state.
///
/// A program sees one interpolated [`Fragment`], the bound source images and
/// the draw's [`Uniforms`]. Returning `None` discards the fragment.

use glam::{Vec2, Vec4};

/// A typed program parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    UInt(u32),
}

/// Interpolated fragment inputs
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    /// Pixel center in the destination image
    pub position: Vec2,
    /// Interpolated source texel position
    pub src: Vec2,
    /// Interpolated vertex color
    pub color: Vec4,
    /// Interpolated custom channels (`CUSTOM_DEPTH`, `CUSTOM_INV_W`, ...)
    pub custom: Vec4,
}

/// Read access to the images bound to a draw call
pub trait SourceImages {
    /// Texel of the image in `slot` under the destination pixel `position`
    ///
    /// `None` if the slot is unbound or the position falls outside the image.
    fn at_dst(&self, slot: usize, position: Vec2) -> Option<Vec4>;

    /// Nearest texel of the image in `slot` at texel coordinates `src`
    /// (clamped to the image edges). `None` if the slot is unbound.
    fn sample(&self, slot: usize, src: Vec2) -> Option<Vec4>;
}

/// Per-draw constants
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniforms<'a> {
    /// Source coordinates were divided by w and must be divided by `custom[CUSTOM_INV_W]`
    pub perspective_corrected: bool,
    /// Discard fragments below `ALPHA_CLIP_THRESHOLD`
    pub alpha_clip: bool,
    /// Material parameters, in declaration order
    pub params: &'a [(String, ParamValue)],
}

impl Uniforms<'_> {
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Source texel position of a fragment, undoing the perspective division
    pub fn source_position(&self, fragment: &Fragment) -> Vec2 {
        let inv_w = fragment.custom[super::vertex::CUSTOM_INV_W];
        if self.perspective_corrected && inv_w != 0.0 {
            fragment.src / inv_w
        } else {
            fragment.src
        }
    }
}

/// A per-pixel shading callable
pub trait FragmentProgram: Send + Sync {
    /// Debug name
    fn name(&self) -> &str;

    /// Shade one fragment. `None` discards it.
    fn shade(&self, fragment: &Fragment, images: &dyn SourceImages, uniforms: &Uniforms<'_>) -> Option<Vec4>;
}
