//! Central system ordering labels to make the per-frame sequence explicit.
//! Stages (all in `Update` unless noted):
//! 1. Input (pointer tracking, click -> accent change, palette application)
//! 2. PrePhysics (impulses and kinematic targets handed to Rapier)
//! 3. PostPhysicsAdjust (visual easing after the pre-physics writes)
//! 4. Rapier step (`PostUpdate`, owned by the plugin)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct InputSet; // pointer + click handling

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PrePhysicsSet; // impulses / kinematic targets before the simulation step

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PostPhysicsAdjustSet; // visual-only updates after pre-physics writes

/// Chains the three sets inside `Update`. Rapier's `PostUpdate` step comes after all of them.
pub fn configure_scene_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            InputSet,
            PrePhysicsSet.after(InputSet),
            PostPhysicsAdjustSet.after(PrePhysicsSet),
        ),
    );
}
