use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::core::components::Connector;
use crate::core::config::SceneConfig;
use crate::core::system::system_order::PrePhysicsSet;

/// Plugin adding the per-connector restoring impulse toward the origin, applied before physics.
pub struct SpringToOriginPlugin;

impl Plugin for SpringToOriginPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_spring_to_origin.in_set(PrePhysicsSet));
    }
}

/// `-translation * factor`: a displacement-proportional pull back to the origin.
#[inline]
pub fn restoring_impulse(translation: Vec3, factor: f32) -> Vec3 {
    -translation * factor
}

/// Replaces (not accumulates) each connector's pending impulse; Rapier consumes it on the next step.
pub fn apply_spring_to_origin(
    cfg: Res<SceneConfig>,
    mut q: Query<(&Transform, &mut ExternalImpulse), With<Connector>>,
) {
    let factor = cfg.physics.spring_factor;
    for (transform, mut impulse) in q.iter_mut() {
        impulse.impulse = restoring_impulse(transform.translation, factor);
    }
}
