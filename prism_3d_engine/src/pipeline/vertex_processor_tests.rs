use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::raster::{CUSTOM_DEPTH, CUSTOM_INV_W};
use crate::resource::{CustomDepthFn, Material, MaterialDesc, MeshBuilder, TriangleSortMode};
use crate::scene::{AmbientLight, DirectionalLight, Fog, FogMode, Light};
use super::super::arena::VertexStream;
use super::super::sorting::SortingTriangleBucket;
use super::*;

// ============================================================================
// Helpers
// ============================================================================

const SIZE: f32 = 100.0;

/// Camera at the origin looking down -Z, 90° vertical FOV, square 100x100 target
fn frame() -> FrameTransform {
    let projection = Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0))
        * Mat4::perspective_rh(90.0_f32.to_radians(), 1.0, 0.1, 100.0);
    FrameTransform {
        view: Mat4::IDENTITY,
        view_projection: projection,
        eye: Vec3::ZERO,
        width: SIZE,
        height: SIZE,
        near: 0.1,
        far: 100.0,
        depth_margin: 0.04,
        perspective_corrected: false,
        fog: None,
    }
}

fn quad_at(z: f32) -> (crate::resource::Mesh, Mat4) {
    (
        MeshBuilder::quad("quad", 2.0, None).build().unwrap(),
        Mat4::from_translation(Vec3::new(0.0, 0.0, z)),
    )
}

fn job<'a>(mesh: &'a crate::resource::Mesh, world: &'a Mat4, material: &'a Material) -> VertexJob<'a> {
    VertexJob {
        mesh,
        vertex_range: 0..mesh.vertex_count(),
        world,
        model_color: Vec4::ONE,
        material,
        lights: None,
        texture_size: Vec2::new(16.0, 16.0),
    }
}

// ============================================================================
// Projection math
// ============================================================================

#[test]
fn test_project_to_screen_center_and_flip() {
    let (center, w) = project_to_screen(Vec4::new(0.0, 0.0, 0.5, 2.0), 200.0, 100.0);
    assert_eq!(center, Vec2::new(100.0, 50.0));
    assert_eq!(w, 2.0);

    // Positive clip y goes up, i.e. toward smaller pixel y
    let (up, _) = project_to_screen(Vec4::new(0.0, 0.5, 0.0, 1.0), 200.0, 100.0);
    assert_eq!(up, Vec2::new(100.0, 0.0));
}

#[test]
fn test_project_to_screen_clamps_w() {
    let (point, w) = project_to_screen(Vec4::new(1e-6, 0.0, 0.0, 0.0), 100.0, 100.0);
    assert_eq!(w, MIN_W);
    assert!(point.x.is_finite());
}

#[test]
fn test_normalized_depth_margin() {
    let near = 0.1;
    let far = 100.0;
    let margin = 0.04;
    let at_near = normalized_depth(near, near, far, margin);
    let at_far = normalized_depth(far, near, far, margin);
    // (d + 0.04 * 99.9) / (99.9 * 1.08)
    assert!((at_near - 0.037964).abs() < 1e-5, "{}", at_near);
    assert!((at_far - 0.963890).abs() < 1e-5, "{}", at_far);
    assert_eq!(normalized_depth(-50.0, near, far, margin), 0.0);
    assert_eq!(normalized_depth(500.0, near, far, margin), 1.0);
}

#[test]
fn test_normalized_depth_is_monotonic() {
    for margin in [0.0, 0.04, 0.25] {
        let mut previous = -1.0;
        for step in 1..200 {
            let depth = normalized_depth(0.1 + step as f32 * 0.5, 0.1, 100.0, margin);
            assert!(depth > previous, "margin {} step {}", margin, step);
            previous = depth;
        }
    }
}

// ============================================================================
// Vertex transform
// ============================================================================

#[test]
fn test_transform_writes_screen_positions_and_uvs() {
    let (mesh, world) = quad_at(-1.0);
    let material = Material::default();
    let mut stream = VertexStream::default();
    let base = frame().transform(&job(&mesh, &world, &material), &mut stream);

    assert_eq!(base, 0);
    assert_eq!(stream.len(), 4);
    // Quad corner (-1, -1, -1) with a 90° FOV lands on the bottom-left pixel corner
    let corner = stream.vertices[0];
    assert!((Vec2::from(corner.dst) - Vec2::new(0.0, SIZE)).length() < 1e-3);
    // uv (0, 0) maps to the bottom-left texel row
    assert_eq!(corner.src, [0.0, 16.0]);
    assert!((corner.custom[CUSTOM_INV_W] - 1.0).abs() < 1e-5);
    assert_eq!(stream.normal_colors[0], [0.5, 0.5, 1.0, 1.0]);
}

#[test]
fn test_transform_appends_after_existing_vertices() {
    let (mesh, world) = quad_at(-2.0);
    let material = Material::default();
    let mut stream = VertexStream::default();
    frame().transform(&job(&mesh, &world, &material), &mut stream);
    let base = frame().transform(&job(&mesh, &world, &material), &mut stream);
    assert_eq!(base, 4);
    assert_eq!(stream.len(), 8);
}

#[test]
fn test_perspective_corrected_uvs_divided_by_w() {
    let (mesh, world) = quad_at(-4.0);
    let material = Material::default();
    let mut stream = VertexStream::default();
    let mut frame = frame();
    frame.perspective_corrected = true;
    frame.transform(&job(&mesh, &world, &material), &mut stream);

    let corner = stream.vertices[0];
    let inv_w = corner.custom[CUSTOM_INV_W];
    assert!((inv_w - 0.25).abs() < 1e-5);
    assert!((corner.src[1] - 16.0 * 0.25).abs() < 1e-4);
}

#[test]
fn test_vertex_depth_increases_with_distance() {
    let material = Material::default();
    let mut stream = VertexStream::default();
    let (near_mesh, near_world) = quad_at(-5.0);
    let (far_mesh, far_world) = quad_at(-10.0);
    frame().transform(&job(&near_mesh, &near_world, &material), &mut stream);
    frame().transform(&job(&far_mesh, &far_world, &material), &mut stream);
    assert!(stream.vertices[0].custom[CUSTOM_DEPTH] < stream.vertices[4].custom[CUSTOM_DEPTH]);
}

#[test]
fn test_custom_depth_overrides_depth() {
    let custom: CustomDepthFn = Arc::new(|_: Vec3, _: f32| 0.75);
    let material = Material::from_desc(MaterialDesc { custom_depth: Some(custom), ..MaterialDesc::default() }).unwrap();
    let (mesh, world) = quad_at(-3.0);
    let mut stream = VertexStream::default();
    frame().transform(&job(&mesh, &world, &material), &mut stream);
    assert!(stream.vertices.iter().all(|v| v.custom[CUSTOM_DEPTH] == 0.75));
}

#[test]
fn test_color_combines_tint_and_lights() {
    let material = Material::from_desc(MaterialDesc {
        color: Vec4::new(1.0, 0.5, 1.0, 1.0),
        ..MaterialDesc::default()
    })
    .unwrap();
    let (mesh, world) = quad_at(-3.0);
    let mut lights: Vec<Light> = vec![
        AmbientLight::new("amb", Vec3::ONE, 0.25).into(),
        DirectionalLight::new("sun", Vec3::ONE, 0.5, Vec3::NEG_Z).into(),
    ];
    for light in &mut lights {
        crate::scene::LightSource::begin_render(light);
    }
    let active = [0, 1];
    let mut vertex_job = job(&mesh, &world, &material);
    vertex_job.model_color = Vec4::new(0.5, 1.0, 1.0, 0.8);
    vertex_job.lights = Some((&lights, &active));

    let mut stream = VertexStream::default();
    frame().transform(&vertex_job, &mut stream);
    let color = Vec4::from(stream.vertices[0].color);
    // tint (0.5, 0.5, 1) x light 0.75
    assert!((color - Vec4::new(0.375, 0.375, 0.75, 0.8)).length() < 1e-5);
}

#[test]
fn test_fog_skipped_for_fogless_material() {
    let mut frame = frame();
    frame.fog = Some(Fog { enabled: true, mode: FogMode::Overwrite, color: Vec3::new(1.0, 0.0, 0.0), range: [0.0, 0.0] });
    let (mesh, world) = quad_at(-3.0);

    let fogged = Material::default();
    let mut stream = VertexStream::default();
    frame.transform(&job(&mesh, &world, &fogged), &mut stream);
    assert_eq!(stream.vertices[0].color, [1.0, 0.0, 0.0, 1.0]);

    let fogless = Material::from_desc(MaterialDesc { fogless: true, ..MaterialDesc::default() }).unwrap();
    let mut stream = VertexStream::default();
    frame.transform(&job(&mesh, &world, &fogless), &mut stream);
    assert_eq!(stream.vertices[0].color, [1.0, 1.0, 1.0, 1.0]);
}

// ============================================================================
// Triangle culling
// ============================================================================

fn queue(z: f32, world_override: Option<Mat4>, backface_culling: bool) -> (usize, Vec<u16>) {
    let (mesh, world) = quad_at(z);
    let world = world_override.unwrap_or(world);
    let material = Material::default();
    let mut stream = VertexStream::default();
    let frame = frame();
    let base = frame.transform(&job(&mesh, &world, &material), &mut stream);
    let mut bucket = SortingTriangleBucket::default();
    let queued = frame.queue_triangles(
        &TriangleJob {
            mesh: &mesh,
            triangles: 0..mesh.triangles().len(),
            vertex_start: 0,
            base,
            world: &world,
            backface_culling,
        },
        &stream,
        &mut bucket,
    );
    let mut indices = Vec::new();
    bucket.drain_into(TriangleSortMode::None, &mut indices);
    (queued, indices)
}

#[test]
fn test_front_facing_triangles_queued() {
    let (queued, indices) = queue(-3.0, None, true);
    assert_eq!(queued, 2);
    assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_back_facing_triangles_culled_only_when_enabled() {
    let flipped = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)) * Mat4::from_rotation_y(std::f32::consts::PI);
    assert_eq!(queue(0.0, Some(flipped), true).0, 0);
    assert_eq!(queue(0.0, Some(flipped), false).0, 2);
}

#[test]
fn test_triangles_behind_camera_dropped() {
    assert_eq!(queue(5.0, None, false).0, 0);
}

#[test]
fn test_offscreen_triangles_dropped() {
    let aside = Mat4::from_translation(Vec3::new(50.0, 0.0, -3.0));
    assert_eq!(queue(0.0, Some(aside), false).0, 0);
}

#[test]
fn test_zero_area_triangles_dropped_as_degenerate() {
    let flattened = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)) * Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
    assert_eq!(queue(0.0, Some(flattened), false).0, 0);
}
