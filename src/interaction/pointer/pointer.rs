use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier3d::prelude::*;

use crate::core::components::PointerFollower;
use crate::core::config::SceneConfig;
use crate::core::system::system_order::{InputSet, PrePhysicsSet};
use crate::rendering::camera::SceneCamera;

pub struct PointerPlugin;

impl Plugin for PointerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerNdc>()
            .init_resource::<ViewportWorldSize>()
            .add_systems(Startup, spawn_pointer_follower)
            .add_systems(
                Update,
                (
                    (track_pointer_ndc, update_viewport_size).in_set(InputSet),
                    follow_pointer.in_set(PrePhysicsSet),
                ),
            );
    }
}

/// Last known pointer position in normalized device coordinates (+y up). Starts centered and
/// keeps its value while the pointer is outside the window.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerNdc(pub Vec2);

/// World-space width/height visible at the camera's focal distance (the origin plane).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportWorldSize(pub Vec2);

impl Default for ViewportWorldSize {
    fn default() -> Self {
        let cam = crate::core::config::CameraConfig::default();
        let distance = Vec3::from_array(cam.position).length();
        Self(viewport_at_distance(cam.fov_degrees.to_radians(), 16.0 / 9.0, distance))
    }
}

/// Window pixel coordinates (origin top-left) -> NDC in [-1, 1]^2 with +y up.
pub fn cursor_to_ndc(cursor: Vec2, window_size: Vec2) -> Option<Vec2> {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return None;
    }
    let x = cursor.x / window_size.x * 2.0 - 1.0;
    let y = -(cursor.y / window_size.y * 2.0 - 1.0);
    Some(Vec2::new(x, y).clamp(Vec2::NEG_ONE, Vec2::ONE))
}

/// Size of the frustum cross-section `distance` units in front of a perspective camera.
pub fn viewport_at_distance(fov_y: f32, aspect: f32, distance: f32) -> Vec2 {
    let height = 2.0 * distance * (fov_y * 0.5).tan();
    Vec2::new(height * aspect, height)
}

/// Maps NDC onto the origin plane: `(x * w/2, y * h/2, 0)`.
pub fn pointer_world_position(ndc: Vec2, viewport: Vec2) -> Vec3 {
    (ndc * viewport * 0.5).extend(0.0)
}

fn spawn_pointer_follower(mut commands: Commands, cfg: Res<SceneConfig>) {
    commands.spawn((
        Name::new("PointerFollower"),
        PointerFollower,
        RigidBody::KinematicPositionBased,
        Collider::ball(cfg.physics.pointer_radius),
        Transform::default(),
    ));
}

pub fn track_pointer_ndc(
    windows: Query<&Window, With<PrimaryWindow>>,
    touches: Option<Res<Touches>>,
    mut ndc: ResMut<PointerNdc>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    // Touches are hash-keyed; the lowest id keeps the pick stable across frames.
    let touch_pos = touches
        .as_deref()
        .and_then(|t| t.iter().min_by_key(|t| t.id()).map(|t| t.position()));
    let Some(screen_pos) = touch_pos.or_else(|| window.cursor_position()) else {
        return;
    };
    if let Some(mapped) = cursor_to_ndc(screen_pos, Vec2::new(window.width(), window.height())) {
        ndc.set_if_neq(PointerNdc(mapped));
    }
}

pub fn update_viewport_size(
    cameras: Query<(&Projection, &Transform), With<SceneCamera>>,
    mut viewport: ResMut<ViewportWorldSize>,
) {
    let Some((projection, transform)) = cameras.iter().next() else {
        return;
    };
    let Projection::Perspective(persp) = projection else {
        return;
    };
    let size = viewport_at_distance(persp.fov, persp.aspect_ratio, transform.translation.length());
    viewport.set_if_neq(ViewportWorldSize(size));
}

/// Teleports the kinematic follower every frame; Rapier sweeps it to the new target.
pub fn follow_pointer(
    ndc: Res<PointerNdc>,
    viewport: Res<ViewportWorldSize>,
    mut q: Query<&mut Transform, With<PointerFollower>>,
) {
    let target = pointer_world_position(ndc.0, viewport.0);
    for mut tf in q.iter_mut() {
        tf.translation = target;
    }
}
