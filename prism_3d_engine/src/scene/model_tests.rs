use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::resource::MeshBuilder;
use crate::scene::BoundingSphere;
use super::*;

#[test]
fn test_new_model_defaults() {
    let model = Model::new("empty", None);
    assert!(model.is_visible());
    assert!(model.frustum_culling());
    assert_eq!(model.sector_type(), SectorType::Standalone);
    assert_eq!(model.world_matrix(), &Mat4::IDENTITY);
    assert!(model.parent().is_none());
    assert!(model.batch().is_none());
    assert!(model.world_sphere().is_none());
}

#[test]
fn test_flag_setters() {
    let mut model = Model::new("m", None);
    model.set_visible(false);
    assert!(!model.is_visible());
    assert!(model.frustum_culling());
    model.set_frustum_culling(false);
    assert_eq!(model.flags(), ModelFlags::empty());
    model.set_flags(ModelFlags::default());
    assert!(model.is_visible());
}

#[test]
fn test_world_sphere_from_mesh() {
    let mesh = Arc::new(MeshBuilder::cube("cube", 2.0, None).build().unwrap());
    let model = Model::new("cube", Some(mesh))
        .with_world_matrix(Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0)));
    let sphere = model.world_sphere().unwrap();
    assert_eq!(sphere.center, Vec3::new(0.0, 0.0, -10.0));
    assert!((sphere.radius - 3.0_f32.sqrt()).abs() < 1e-5);
    assert_eq!(model.world_position(), Vec3::new(0.0, 0.0, -10.0));
}

#[test]
fn test_custom_bounds_override_mesh() {
    let mesh = Arc::new(MeshBuilder::cube("cube", 2.0, None).build().unwrap());
    let model = Model::new("cube", Some(mesh))
        .with_bounds(Bounds::Sphere(BoundingSphere::new(Vec3::ZERO, 10.0)));
    assert_eq!(model.world_sphere().unwrap().radius, 10.0);
}

#[test]
fn test_dynamic_batch_accessors() {
    let mut batch = DynamicBatch::default();
    assert!(batch.is_empty());
    batch.parts.insert(0, vec![ModelKey::default(), ModelKey::default()]);
    batch.parts.insert(2, vec![]);
    assert_eq!(batch.member_count(), 2);
    assert_eq!(batch.members(0).len(), 2);
    assert!(batch.members(1).is_empty());
    assert_eq!(batch.parts().count(), 2);
    assert!(!batch.is_empty());
}
