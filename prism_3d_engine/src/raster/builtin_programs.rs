/// Built-in fragment programs used by the multi-pass dispatcher.
///
/// Slot conventions:
/// - `DepthTestProgram`: 0 = persistent depth target
/// - `ClipAlphaCompositeProgram`: 0 = clip-alpha scratch, 1 = material texture,
///   2 = persistent depth target
/// - `ColorProgram`: 0 = depth intermediate (optional gate), 1 = material texture

use glam::Vec4;
use super::depth_codec::{depth_bits, encode_depth, quantize_depth};
use super::program::{Fragment, FragmentProgram, SourceImages, Uniforms};
use super::vertex::CUSTOM_DEPTH;

/// Alpha below which alpha-clipped fragments are discarded
pub const ALPHA_CLIP_THRESHOLD: f32 = 0.5;

/// Manual depth test against a color-encoded depth image
///
/// Writes the fragment's encoded depth unless the texel already present in
/// slot 0 is at least as close.
pub struct DepthTestProgram;

impl FragmentProgram for DepthTestProgram {
    fn name(&self) -> &str {
        "depth_test"
    }

    fn shade(&self, fragment: &Fragment, images: &dyn SourceImages, _uniforms: &Uniforms<'_>) -> Option<Vec4> {
        let depth = fragment.custom[CUSTOM_DEPTH];
        if let Some(existing) = images.at_dst(0, fragment.position) {
            if existing.w > 0.0 && depth_bits(existing) <= quantize_depth(depth) {
                return None;
            }
        }
        Some(encode_depth(depth))
    }
}

/// Second step of the alpha-clip depth path
///
/// Writes the fragment's own depth where the scratch image took a depth
/// write, the material texture is opaque enough and the fragment is still
/// closer than the persistent depth target.
pub struct ClipAlphaCompositeProgram;

impl FragmentProgram for ClipAlphaCompositeProgram {
    fn name(&self) -> &str {
        "clip_alpha_composite"
    }

    fn shade(&self, fragment: &Fragment, images: &dyn SourceImages, uniforms: &Uniforms<'_>) -> Option<Vec4> {
        let written = images.at_dst(0, fragment.position)?;
        if written.w <= 0.0 {
            return None;
        }
        let texel = images
            .sample(1, uniforms.source_position(fragment))
            .unwrap_or(Vec4::ONE);
        if texel.w * fragment.color.w < ALPHA_CLIP_THRESHOLD {
            return None;
        }
        let depth = fragment.custom[CUSTOM_DEPTH];
        if let Some(existing) = images.at_dst(2, fragment.position) {
            if existing.w > 0.0 && depth_bits(existing) <= quantize_depth(depth) {
                return None;
            }
        }
        Some(encode_depth(depth))
    }
}

/// Default lit/fogged color program
///
/// Lighting and fog are baked into the vertex colors by the vertex processor,
/// so this only gates on the depth intermediate and modulates the texture.
/// A fragment passes the gate when its depth is the nearest one the depth
/// pass kept at that pixel.
pub struct ColorProgram;

impl FragmentProgram for ColorProgram {
    fn name(&self) -> &str {
        "color"
    }

    fn shade(&self, fragment: &Fragment, images: &dyn SourceImages, uniforms: &Uniforms<'_>) -> Option<Vec4> {
        if let Some(gate) = images.at_dst(0, fragment.position) {
            if gate.w <= 0.0 || quantize_depth(fragment.custom[CUSTOM_DEPTH]) > depth_bits(gate) {
                return None;
            }
        }
        let texel = images
            .sample(1, uniforms.source_position(fragment))
            .unwrap_or(Vec4::ONE);
        let color = texel * fragment.color;
        if uniforms.alpha_clip && color.w < ALPHA_CLIP_THRESHOLD {
            return None;
        }
        Some(color)
    }
}

#[cfg(test)]
#[path = "builtin_programs_tests.rs"]
mod tests;
