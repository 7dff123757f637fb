use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::core::config::SceneConfig;

/// Configures Rapier for the floating scene: no gravity, optional wireframe rendering.
pub struct PhysicsSetupPlugin {
    pub debug_render: bool,
}

impl Plugin for PhysicsSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
            .add_plugins(RapierDebugRenderPlugin {
                enabled: self.debug_render,
                ..default()
            })
            .add_systems(PostStartup, disable_gravity);
    }
}

/// Global gravity is off: the spring impulse is the only steady force on connectors.
fn disable_gravity(mut rapier_cfg: Query<&mut RapierConfiguration>, cfg: Res<SceneConfig>) {
    for mut c in rapier_cfg.iter_mut() {
        c.gravity = Vect::ZERO;
    }
    debug!(
        target: "physics",
        "rapier gravity disabled; spring factor {}",
        cfg.physics.spring_factor
    );
}
