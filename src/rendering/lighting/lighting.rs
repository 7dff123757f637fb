use bevy::prelude::*;

use crate::core::config::{EnvironmentConfig, LightingConfig, SceneConfig};
use crate::rendering::palette::parse_color;

/// Every light owned by the scene rig. Rebuilt wholesale when the config changes.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct SceneLight;

pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sync_lighting.run_if(resource_changed::<SceneConfig>));
    }
}

/// Penumbra 0 gives a hard edge (inner == outer), 1 fades across the whole cone.
pub fn spot_inner_angle(angle: f32, penumbra: f32) -> f32 {
    angle * (1.0 - penumbra.clamp(0.0, 1.0))
}

/// Lightformers are authored in a rotated group; this places one in world space.
pub fn lightformer_position(env: &EnvironmentConfig, local: [f32; 3]) -> Vec3 {
    let [x, y, z] = env.rotation;
    Quat::from_euler(EulerRot::XYZ, x, y, z) * Vec3::from_array(local)
}

fn color_or_white(name: &str) -> Color {
    parse_color(name).unwrap_or_else(|e| {
        warn!(target: "config", "light color: {e}; using white");
        Color::WHITE
    })
}

fn spawn_rig(commands: &mut Commands, lighting: &LightingConfig, env: &EnvironmentConfig) {
    commands.insert_resource(AmbientLight {
        color: color_or_white(&lighting.ambient_color),
        brightness: lighting.ambient_brightness,
        ..default()
    });

    let spot = &lighting.spot;
    commands.spawn((
        Name::new("KeySpot"),
        SceneLight,
        SpotLight {
            color: color_or_white(&spot.color),
            intensity: spot.intensity * lighting.lumens_per_unit,
            outer_angle: spot.angle,
            inner_angle: spot_inner_angle(spot.angle, spot.penumbra),
            shadows_enabled: spot.shadows,
            range: 100.0,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(spot.position)).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    if !env.enabled {
        return;
    }
    for (i, lf) in env.lightformers.iter().enumerate() {
        commands.spawn((
            Name::new(format!("Lightformer[{i}]")),
            SceneLight,
            PointLight {
                intensity: lf.intensity * lighting.lumens_per_unit,
                radius: lf.scale * 0.5,
                range: env.range,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(lightformer_position(env, lf.position)),
        ));
    }
}

fn sync_lighting(
    mut commands: Commands,
    cfg: Res<SceneConfig>,
    existing: Query<Entity, With<SceneLight>>,
) {
    for e in existing.iter() {
        commands.entity(e).despawn();
    }
    spawn_rig(&mut commands, &cfg.lighting, &cfg.environment);
    debug!(
        target: "config",
        "lighting rig rebuilt ({} lightformers)",
        if cfg.environment.enabled { cfg.environment.lightformers.len() } else { 0 }
    );
}
