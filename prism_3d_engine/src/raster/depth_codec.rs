/// Depth packed into color channels.
///
/// Depth targets are ordinary RGBA images: the normalized depth in `[0, 1]` is
/// quantized to 24 bits and spread over R (high byte), G and B (low byte).
/// Alpha is 1 for written texels; alpha 0 means "nothing drawn here".

use glam::Vec4;

const DEPTH_LEVELS: u32 = (1 << 24) - 1;

/// Quantize a normalized depth to its 24-bit representation
pub fn quantize_depth(depth: f32) -> u32 {
    (depth.clamp(0.0, 1.0) * DEPTH_LEVELS as f32).round() as u32
}

/// 24-bit depth stored in an encoded texel
pub fn depth_bits(texel: Vec4) -> u32 {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(texel.x) << 16) | (channel(texel.y) << 8) | channel(texel.z)
}

/// Encode a normalized depth as an opaque texel
pub fn encode_depth(depth: f32) -> Vec4 {
    let bits = quantize_depth(depth);
    Vec4::new(
        ((bits >> 16) & 0xFF) as f32 / 255.0,
        ((bits >> 8) & 0xFF) as f32 / 255.0,
        (bits & 0xFF) as f32 / 255.0,
        1.0,
    )
}

/// Decode an encoded texel back to a normalized depth
pub fn decode_depth(texel: Vec4) -> f32 {
    depth_bits(texel) as f32 / DEPTH_LEVELS as f32
}
