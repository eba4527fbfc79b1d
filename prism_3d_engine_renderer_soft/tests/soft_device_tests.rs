//! Tests for SoftRasterDevice
//!
//! These tests verify that SoftRasterDevice correctly implements the RasterDevice trait.
//! No GPU required.
//!
//! Run with: cargo test --test soft_device_tests

use glam::{Vec2, Vec4};
use prism_3d_engine::prism3d::Error;
use prism_3d_engine::prism3d::raster::{
    BlendMode, ColorProgram, DepthTestProgram, DrawImageOptions, DrawTriangles, Fragment,
    FragmentProgram, ImageDesc, ImageKey, RasterDevice, RasterVertex, SourceImages, Uniforms,
    encode_depth, CUSTOM_DEPTH,
};
use prism_3d_engine_renderer_soft::{SoftRasterDevice, SoftStats};

// ============================================================================
// HELPERS
// ============================================================================

/// Returns the interpolated vertex color untouched
struct VertexColorProgram;

impl FragmentProgram for VertexColorProgram {
    fn name(&self) -> &str {
        "vertex_color"
    }

    fn shade(&self, fragment: &Fragment, _images: &dyn SourceImages, _uniforms: &Uniforms<'_>) -> Option<Vec4> {
        Some(fragment.color)
    }
}

fn vertex(x: f32, y: f32, color: Vec4) -> RasterVertex {
    RasterVertex {
        dst: [x, y],
        src: [x, y],
        color: color.to_array(),
        custom: [0.0; 4],
    }
}

/// Two triangles covering `[0, w] x [0, h]`, sharing the diagonal
fn quad(w: f32, h: f32, color: Vec4) -> Vec<RasterVertex> {
    vec![
        vertex(0.0, 0.0, color),
        vertex(w, 0.0, color),
        vertex(w, h, color),
        vertex(0.0, h, color),
    ]
}

fn draw<'a>(
    vertices: &'a [RasterVertex],
    indices: &'a [u16],
    program: &'a dyn FragmentProgram,
    images: [Option<ImageKey>; 4],
    blend: BlendMode,
) -> DrawTriangles<'a> {
    DrawTriangles {
        vertices,
        indices,
        program,
        images,
        uniforms: Uniforms::default(),
        blend,
    }
}

fn image(device: &mut SoftRasterDevice, name: &str, w: u32, h: u32) -> ImageKey {
    device.create_image(&ImageDesc::new(name, w, h)).unwrap()
}

fn close(a: Vec4, b: Vec4) -> bool {
    (a - b).length() < 1e-4
}

// ============================================================================
// IMAGE TESTS
// ============================================================================

#[test]
fn test_soft_create_and_destroy_image() {
    let mut device = SoftRasterDevice::new();
    let key = image(&mut device, "target", 8, 4);

    assert_eq!(device.image_size(key), Some((8, 4)));
    assert_eq!(device.image_name(key), Some("target"));
    assert_eq!(device.image_count(), 1);
    assert_eq!(device.read_pixels(key).unwrap(), vec![Vec4::ZERO; 32]);

    device.destroy_image(key);
    assert_eq!(device.image_size(key), None);
    assert_eq!(device.image_count(), 0);

    // Destroying twice is harmless
    device.destroy_image(key);
}

#[test]
fn test_soft_create_invalid_image() {
    let mut device = SoftRasterDevice::new();
    assert!(device.create_image(&ImageDesc::new("empty", 0, 4)).is_err());
    assert!(device
        .create_image(&ImageDesc::new("short", 2, 2).with_pixels(vec![0; 3]))
        .is_err());
    assert_eq!(device.image_count(), 0);
}

#[test]
fn test_soft_clear_image() {
    let mut device = SoftRasterDevice::new();
    let key = image(&mut device, "target", 2, 2);
    let color = Vec4::new(0.1, 0.2, 0.3, 1.0);

    device.clear_image(key, color).unwrap();
    assert_eq!(device.read_pixels(key).unwrap(), vec![color; 4]);
    assert_eq!(device.texel(key, 1, 1), Some(color));
    assert_eq!(device.texel(key, 2, 0), None);
}

#[test]
fn test_soft_unknown_image_errors() {
    let mut device = SoftRasterDevice::new();
    let key = image(&mut device, "gone", 2, 2);
    device.destroy_image(key);

    assert!(matches!(device.clear_image(key, Vec4::ONE), Err(Error::InvalidResource(_))));
    assert!(matches!(device.read_pixels(key), Err(Error::InvalidResource(_))));

    let vertices = quad(2.0, 2.0, Vec4::ONE);
    let indices = [0, 1, 2];
    let call = draw(&vertices, &indices, &VertexColorProgram, [None; 4], BlendMode::Copy);
    assert!(matches!(device.draw_triangles(key, &call), Err(Error::InvalidResource(_))));
}

// ============================================================================
// RASTERIZATION TESTS
// ============================================================================

#[test]
fn test_soft_shared_edge_blended_once() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 4, 4);
    device.clear_image(target, Vec4::new(0.0, 0.0, 0.0, 1.0)).unwrap();

    // Half-transparent red: a texel blended twice would come out at 0.75
    let vertices = quad(4.0, 4.0, Vec4::new(1.0, 0.0, 0.0, 0.5));
    let indices = [0, 1, 2, 0, 2, 3];
    let call = draw(&vertices, &indices, &VertexColorProgram, [None; 4], BlendMode::SourceOver);
    device.draw_triangles(target, &call).unwrap();

    for texel in device.read_pixels(target).unwrap() {
        assert!(close(texel, Vec4::new(0.5, 0.0, 0.0, 1.0)), "texel {:?}", texel);
    }
    assert_eq!(device.stats().fragments_shaded, 16);
    assert_eq!(device.stats().triangles, 2);
    assert_eq!(device.stats().vertex_bytes, 4 * std::mem::size_of::<RasterVertex>() as u64);
}

#[test]
fn test_soft_both_windings_rasterized() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 4, 4);

    let vertices = quad(4.0, 4.0, Vec4::ONE);
    // Second triangle is wound the other way
    let indices = [0, 1, 2, 0, 3, 2];
    let call = draw(&vertices, &indices, &VertexColorProgram, [None; 4], BlendMode::Copy);
    device.draw_triangles(target, &call).unwrap();

    assert!(device.read_pixels(target).unwrap().iter().all(|&t| close(t, Vec4::ONE)));
    assert_eq!(device.stats().fragments_shaded, 16);
}

#[test]
fn test_soft_triangle_clipped_to_target() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 4, 4);

    let vertices = [
        vertex(-10.0, -10.0, Vec4::ONE),
        vertex(20.0, -10.0, Vec4::ONE),
        vertex(-10.0, 20.0, Vec4::ONE),
    ];
    let call = draw(&vertices, &[0, 1, 2], &VertexColorProgram, [None; 4], BlendMode::Copy);
    device.draw_triangles(target, &call).unwrap();

    assert!(device.read_pixels(target).unwrap().iter().all(|&t| close(t, Vec4::ONE)));
    assert_eq!(device.stats().fragments_shaded, 16);
}

#[test]
fn test_soft_degenerate_triangle_skipped() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 4, 4);

    let vertices = [
        vertex(0.0, 0.0, Vec4::ONE),
        vertex(2.0, 2.0, Vec4::ONE),
        vertex(4.0, 4.0, Vec4::ONE),
    ];
    let call = draw(&vertices, &[0, 1, 2], &VertexColorProgram, [None; 4], BlendMode::Copy);
    device.draw_triangles(target, &call).unwrap();

    assert_eq!(device.stats().degenerate_triangles, 1);
    assert_eq!(device.stats().fragments_shaded, 0);
    assert_eq!(device.read_pixels(target).unwrap(), vec![Vec4::ZERO; 16]);
}

#[test]
fn test_soft_color_interpolation() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 4, 1);

    let black = Vec4::new(0.0, 0.0, 0.0, 1.0);
    let white = Vec4::ONE;
    let vertices = [
        vertex(0.0, 0.0, black),
        vertex(4.0, 0.0, white),
        vertex(4.0, 1.0, white),
        vertex(0.0, 1.0, black),
    ];
    let call = draw(&vertices, &[0, 1, 2, 0, 2, 3], &VertexColorProgram, [None; 4], BlendMode::Copy);
    device.draw_triangles(target, &call).unwrap();

    let left = device.texel(target, 0, 0).unwrap();
    let right = device.texel(target, 3, 0).unwrap();
    assert!((left.x - 0.125).abs() < 1e-4);
    assert!((right.x - 0.875).abs() < 1e-4);
}

#[test]
fn test_soft_texture_sampling() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 2, 1);
    let texture = device
        .create_image(&ImageDesc::new("texture", 2, 1).with_pixels(vec![255, 0, 0, 255, 0, 0, 255, 255]))
        .unwrap();

    let vertices = quad(2.0, 1.0, Vec4::ONE);
    let call = draw(
        &vertices,
        &[0, 1, 2, 0, 2, 3],
        &ColorProgram,
        [None, Some(texture), None, None],
        BlendMode::Copy,
    );
    device.draw_triangles(target, &call).unwrap();

    assert!(close(device.texel(target, 0, 0).unwrap(), Vec4::new(1.0, 0.0, 0.0, 1.0)));
    assert!(close(device.texel(target, 1, 0).unwrap(), Vec4::new(0.0, 0.0, 1.0, 1.0)));
}

#[test]
fn test_soft_depth_test_discards() {
    let mut device = SoftRasterDevice::new();
    let depth = image(&mut device, "depth", 2, 2);
    let scratch = image(&mut device, "scratch", 2, 2);
    device.clear_image(depth, encode_depth(0.3)).unwrap();

    let mut vertices = quad(2.0, 2.0, Vec4::ONE);
    let indices = [0, 1, 2, 0, 2, 3];

    // Behind the stored depth: every fragment is discarded
    for v in &mut vertices {
        v.custom[CUSTOM_DEPTH] = 0.5;
    }
    let call = draw(&vertices, &indices, &DepthTestProgram, [Some(depth), None, None, None], BlendMode::Copy);
    device.draw_triangles(scratch, &call).unwrap();
    assert_eq!(device.stats().fragments_discarded, 4);
    assert_eq!(device.read_pixels(scratch).unwrap(), vec![Vec4::ZERO; 4]);

    // In front: the closer depth is written
    for v in &mut vertices {
        v.custom[CUSTOM_DEPTH] = 0.2;
    }
    let call = draw(&vertices, &indices, &DepthTestProgram, [Some(depth), None, None, None], BlendMode::Copy);
    device.draw_triangles(scratch, &call).unwrap();
    assert_eq!(device.read_pixels(scratch).unwrap(), vec![encode_depth(0.2); 4]);
    assert_eq!(device.stats().draw_calls, 2);
}

#[test]
fn test_soft_nearest_depth_kept_within_one_draw() {
    let mut device = SoftRasterDevice::new();
    let scratch = image(&mut device, "scratch", 2, 2);

    // Near quad first, far quad second, same draw call
    let mut vertices = quad(2.0, 2.0, Vec4::ONE);
    vertices.extend(quad(2.0, 2.0, Vec4::ONE));
    for (i, v) in vertices.iter_mut().enumerate() {
        v.custom[CUSTOM_DEPTH] = if i < 4 { 0.2 } else { 0.6 };
    }
    let indices = [0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7];
    let call = draw(&vertices, &indices, &DepthTestProgram, [None; 4], BlendMode::NearestDepth);
    device.draw_triangles(scratch, &call).unwrap();

    assert_eq!(device.read_pixels(scratch).unwrap(), vec![encode_depth(0.2); 4]);
}

#[test]
fn test_soft_invalid_draws_rejected() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 2, 2);
    let vertices = quad(2.0, 2.0, Vec4::ONE);

    let out_of_range = draw(&vertices, &[0, 1, 9], &VertexColorProgram, [None; 4], BlendMode::Copy);
    assert!(device.draw_triangles(target, &out_of_range).is_err());

    let partial = draw(&vertices, &[0, 1], &VertexColorProgram, [None; 4], BlendMode::Copy);
    assert!(device.draw_triangles(target, &partial).is_err());

    let self_bound = draw(&vertices, &[0, 1, 2], &ColorProgram, [Some(target), None, None, None], BlendMode::Copy);
    assert!(device.draw_triangles(target, &self_bound).is_err());

    assert_eq!(device.stats().draw_calls, 0);
}

// ============================================================================
// IMAGE DRAW TESTS
// ============================================================================

#[test]
fn test_soft_draw_image_scaled() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 2, 2);
    let source = image(&mut device, "source", 2, 2);
    device.clear_image(source, Vec4::ONE).unwrap();

    let options = DrawImageOptions {
        blend: BlendMode::Copy,
        color_scale: Vec4::new(1.0, 1.0, 1.0, 0.25),
    };
    device.draw_image(target, source, &options).unwrap();

    assert_eq!(device.read_pixels(target).unwrap(), vec![Vec4::new(1.0, 1.0, 1.0, 0.25); 4]);
    assert_eq!(device.stats().image_draws, 1);
}

#[test]
fn test_soft_draw_image_overlap_only() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 3, 1);
    let source = image(&mut device, "source", 1, 1);
    device.clear_image(source, Vec4::ONE).unwrap();

    device.draw_image(target, source, &DrawImageOptions::default()).unwrap();

    assert_eq!(device.read_pixels(target).unwrap(), vec![Vec4::ONE, Vec4::ZERO, Vec4::ZERO]);
}

#[test]
fn test_soft_draw_image_rejects_self_and_unknown() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 2, 2);
    let gone = image(&mut device, "gone", 2, 2);
    device.destroy_image(gone);

    assert!(device.draw_image(target, target, &DrawImageOptions::default()).is_err());
    assert!(matches!(
        device.draw_image(target, gone, &DrawImageOptions::default()),
        Err(Error::InvalidResource(_))
    ));
}

#[test]
fn test_soft_reset_stats() {
    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 2, 2);
    let vertices = quad(2.0, 2.0, Vec4::ONE);
    let call = draw(&vertices, &[0, 1, 2], &VertexColorProgram, [None; 4], BlendMode::Copy);
    device.draw_triangles(target, &call).unwrap();
    assert_eq!(device.stats().draw_calls, 1);

    device.reset_stats();
    assert_eq!(*device.stats(), SoftStats::default());
}

#[test]
fn test_soft_fragment_position_is_pixel_center() {
    struct PositionProgram;
    impl FragmentProgram for PositionProgram {
        fn name(&self) -> &str {
            "position"
        }
        fn shade(&self, fragment: &Fragment, _images: &dyn SourceImages, _uniforms: &Uniforms<'_>) -> Option<Vec4> {
            Some(fragment.position.extend(0.0).extend(1.0))
        }
    }

    let mut device = SoftRasterDevice::new();
    let target = image(&mut device, "target", 2, 1);
    let vertices = quad(2.0, 1.0, Vec4::ONE);
    let call = draw(&vertices, &[0, 1, 2, 0, 2, 3], &PositionProgram, [None; 4], BlendMode::Copy);
    device.draw_triangles(target, &call).unwrap();

    // Positions above 1 are clamped by blending, so only check the first texel
    let first = device.texel(target, 0, 0).unwrap();
    assert_eq!(Vec2::new(first.x, first.y), Vec2::new(0.5, 0.5));
}
