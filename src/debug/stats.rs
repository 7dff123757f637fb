use bevy::prelude::*;
use bevy_rapier3d::render::DebugRenderContext;

use super::WIREFRAME_TOGGLE_KEY;
use crate::core::components::Connector;
use crate::rendering::palette::AccentIndex;

#[derive(Resource, Debug)]
pub struct DebugState {
    pub log_interval: f32,
    pub time_accum: f32,
    pub frame_counter: u64,
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            log_interval: 1.0,
            time_accum: 0.0,
            frame_counter: 0,
        }
    }
}

#[derive(Resource, Default, Debug, Clone)]
pub struct DebugStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub connector_count: usize,
    pub accent: usize,
}

/// Exponential moving average, seeded by the first sample.
fn ema(prev: f32, sample: f32) -> f32 {
    if prev == 0.0 {
        sample
    } else {
        prev * 0.9 + sample * 0.1
    }
}

pub fn debug_stats_collect_system(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    mut stats: ResMut<DebugStats>,
    q_connectors: Query<(), With<Connector>>,
    accent: Option<Res<AccentIndex>>,
) {
    state.frame_counter += 1;
    let dt = time.delta_secs().max(1e-6);
    stats.fps = ema(stats.fps, 1.0 / dt);
    stats.frame_time_ms = ema(stats.frame_time_ms, dt * 1000.0);
    stats.connector_count = q_connectors.iter().count();
    stats.accent = accent.map(|a| a.0).unwrap_or_default();
}

pub fn toggle_rapier_debug(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    ctx: Option<ResMut<DebugRenderContext>>,
) {
    let (Some(keys), Some(mut ctx)) = (keys, ctx) else {
        return;
    };
    if keys.just_pressed(WIREFRAME_TOGGLE_KEY) {
        ctx.enabled = !ctx.enabled;
        info!(target: "physics", "rapier wireframe {}", if ctx.enabled { "on" } else { "off" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stats_count_connectors_and_smooth_fps() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<DebugState>()
            .init_resource::<DebugStats>()
            .insert_resource(AccentIndex(2))
            .add_systems(Update, debug_stats_collect_system);
        for _ in 0..3 {
            app.world_mut().spawn(Connector);
        }
        app.world_mut().spawn_empty();
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(20));
        app.update();
        let stats = app.world().resource::<DebugStats>();
        assert_eq!(stats.connector_count, 3);
        assert_eq!(stats.accent, 2);
        assert!((stats.fps - 50.0).abs() < 0.5);
        assert_eq!(app.world().resource::<DebugState>().frame_counter, 1);
    }

    #[test]
    fn f1_flips_wireframe() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(DebugRenderContext { enabled: false, ..default() })
            .add_systems(Update, toggle_rapier_debug);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(WIREFRAME_TOGGLE_KEY);
        app.update();
        assert!(app.world().resource::<DebugRenderContext>().enabled);
        // Held key: pressed but no longer just_pressed.
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
        app.update();
        assert!(app.world().resource::<DebugRenderContext>().enabled, "held key toggles once");
    }
}
