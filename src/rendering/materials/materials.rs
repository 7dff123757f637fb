use bevy::prelude::*;

use crate::core::components::ColorDamp;
use crate::core::config::{ConnectorConfig, CrystalConfig, SceneConfig};
use crate::core::system::frame_delta::FrameDelta;
use crate::core::system::system_order::PostPhysicsAdjustSet;
use crate::rendering::palette::{parse_color, MaterialDescriptor};

pub struct MaterialsPlugin;

impl Plugin for MaterialsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, damp_material_colors.in_set(PostPhysicsAdjustSet));
    }
}

/// Material for a palette connector. The base color starts white and eases to the descriptor color.
pub fn connector_material(descriptor: &MaterialDescriptor, cfg: &ConnectorConfig) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: descriptor.roughness,
        metallic: cfg.metallic,
        ..default()
    }
}

pub fn crystal_material(cfg: &CrystalConfig) -> StandardMaterial {
    let tint = parse_color(&cfg.tint).unwrap_or(Color::WHITE);
    StandardMaterial {
        base_color: tint,
        perceptual_roughness: 0.0,
        metallic: cfg.metallic,
        specular_transmission: cfg.transmission,
        diffuse_transmission: 0.0,
        thickness: cfg.thickness,
        ior: cfg.ior,
        clearcoat: cfg.clearcoat,
        clearcoat_perceptual_roughness: 0.05,
        ..default()
    }
}

/// Eases every eased material toward its target. Materials are only touched while moving,
/// so settled bodies do not re-upload their material each frame.
pub fn damp_material_colors(
    delta: Res<FrameDelta>,
    cfg: Res<SceneConfig>,
    mut q: Query<(&mut ColorDamp, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let smooth_time = cfg.connectors.color_smooth_time;
    for (mut damp, handle) in q.iter_mut() {
        let Some(current) = materials.get(&handle.0).map(|m| m.base_color) else {
            continue;
        };
        let next = damp.step(current, smooth_time, delta.0);
        if next.to_linear() != current.to_linear() {
            if let Some(mat) = materials.get_mut(&handle.0) {
                mat.base_color = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_material(start: Color, target: Color) -> (App, Handle<StandardMaterial>, Entity) {
        let mut app = App::new();
        app.init_resource::<Assets<StandardMaterial>>()
            .insert_resource(SceneConfig::default())
            .insert_resource(FrameDelta(1.0 / 60.0))
            .add_systems(Update, damp_material_colors);
        let handle = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: start,
                ..default()
            });
        let e = app
            .world_mut()
            .spawn((ColorDamp::new(target), MeshMaterial3d(handle.clone())))
            .id();
        (app, handle, e)
    }

    fn base_color(app: &App, handle: &Handle<StandardMaterial>) -> LinearRgba {
        app.world()
            .resource::<Assets<StandardMaterial>>()
            .get(handle)
            .unwrap()
            .base_color
            .to_linear()
    }

    #[test]
    fn color_reaches_target() {
        let target = Color::srgb(0.0, 0.52, 0.84);
        let (mut app, handle, _) = app_with_material(Color::WHITE, target);
        let first = {
            app.update();
            base_color(&app, &handle)
        };
        assert!(first.red < 1.0 && first.red > 0.0);
        for _ in 0..300 {
            app.update();
        }
        assert_eq!(base_color(&app, &handle), target.to_linear());
    }

    #[test]
    fn steady_state_leaves_color_unchanged() {
        let target = Color::srgb(1.0, 0.8, 0.0);
        let (mut app, handle, e) = app_with_material(target, target);
        for _ in 0..5 {
            app.update();
            assert_eq!(base_color(&app, &handle), target.to_linear());
            assert_eq!(app.world().get::<ColorDamp>(e).unwrap().velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn crystal_material_is_transmissive() {
        let mat = crystal_material(&CrystalConfig::default());
        assert_eq!(mat.specular_transmission, 1.0);
        assert_eq!(mat.thickness, 4.0);
        assert_eq!(mat.base_color, parse_color("#0084D6").unwrap());
    }
}
