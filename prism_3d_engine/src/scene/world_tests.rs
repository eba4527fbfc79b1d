use glam::{Vec3, Vec4};
use super::*;

fn fog(mode: FogMode) -> Fog {
    Fog { enabled: true, mode, color: Vec3::new(1.0, 0.0, 0.0), range: [0.2, 0.6] }
}

#[test]
fn test_world_defaults() {
    let world = World::new("level");
    assert_eq!(world.name, "level");
    assert_eq!(world.clear_color, Vec4::new(0.08, 0.09, 0.1, 1.0));
    assert!(world.lighting);
    assert_eq!(world.ambient.energy, 0.5);
    assert!(!world.fog.enabled);
    assert_eq!(world.fog.range, [0.0, 1.0]);
}

#[test]
fn test_fog_amount_remaps_range() {
    let fog = fog(FogMode::Additive);
    assert_eq!(fog.amount(0.1), 0.0);
    assert!((fog.amount(0.4) - 0.5).abs() < 1e-6);
    assert_eq!(fog.amount(0.9), 1.0);
}

#[test]
fn test_fog_modes() {
    let base = Vec4::new(0.2, 0.5, 0.5, 1.0);
    let depth = 0.4;

    let add = fog(FogMode::Additive).apply(base, depth);
    assert!((add - Vec4::new(0.7, 0.5, 0.5, 1.0)).length() < 1e-6);

    let sub = fog(FogMode::Subtractive).apply(base, depth);
    assert!((sub - Vec4::new(0.0, 0.5, 0.5, 1.0)).length() < 1e-6);

    let over = fog(FogMode::Overwrite).apply(base, depth);
    assert!((over - Vec4::new(0.6, 0.25, 0.25, 1.0)).length() < 1e-6);

    let transparent = fog(FogMode::Transparent).apply(base, depth);
    assert!((transparent - Vec4::new(0.2, 0.5, 0.5, 0.5)).length() < 1e-6);
}

#[test]
fn test_disabled_fog_is_identity() {
    let mut fog = fog(FogMode::Overwrite);
    fog.enabled = false;
    let color = Vec4::new(0.1, 0.2, 0.3, 0.4);
    assert_eq!(fog.apply(color, 1.0), color);
}
