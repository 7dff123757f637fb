//! Debug module: feature gated stats logging and the Rapier wireframe toggle.
//! Built only when compiled with `--features debug` (on by default).

#[cfg(feature = "debug")]
mod logging;
#[cfg(feature = "debug")]
pub mod stats; // pub for testing

#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use crate::core::system::system_order::PostPhysicsAdjustSet;

#[cfg(feature = "debug")]
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct DebugPreRenderSet;

/// Key that flips the physics wireframe.
#[cfg(feature = "debug")]
pub const WIREFRAME_TOGGLE_KEY: KeyCode = KeyCode::F1;

#[cfg(feature = "debug")]
pub struct DebugPlugin;
#[cfg(feature = "debug")]
impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        use logging::debug_logging_system;
        use stats::{debug_stats_collect_system, toggle_rapier_debug, DebugState, DebugStats};

        app.init_resource::<DebugState>()
            .init_resource::<DebugStats>()
            .configure_sets(Update, DebugPreRenderSet.after(PostPhysicsAdjustSet))
            .add_systems(
                Update,
                (
                    toggle_rapier_debug,
                    debug_stats_collect_system,
                    debug_logging_system,
                )
                    .chain()
                    .in_set(DebugPreRenderSet),
            );
    }
}

#[cfg(not(feature = "debug"))]
pub struct DebugPlugin;
#[cfg(not(feature = "debug"))]
impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, _app: &mut bevy::prelude::App) {}
}
