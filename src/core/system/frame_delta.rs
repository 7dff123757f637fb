use bevy::prelude::*;

use crate::core::config::SceneConfig;

/// Frame delta (seconds) clamped to `physics.max_frame_delta`.
/// Long stalls (tab switch, debugger pause) would otherwise make easing jump.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameDelta(pub f32);

#[inline]
pub fn clamp_delta(raw: f32, cap: f32) -> f32 {
    raw.min(cap.max(0.0)).max(0.0)
}

pub fn update_frame_delta(time: Res<Time>, cfg: Res<SceneConfig>, mut delta: ResMut<FrameDelta>) {
    delta.0 = clamp_delta(time.delta_secs(), cfg.physics.max_frame_delta);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clamp_never_exceeds_cap() {
        for cap in [0.1_f32, 0.2] {
            for raw in [0.0_f32, 0.016, 0.099, 0.1, 0.15, 0.2, 0.5, 3.0, 120.0] {
                let d = clamp_delta(raw, cap);
                assert!(d <= cap, "raw {raw} cap {cap} -> {d}");
                assert!(d >= 0.0);
                if raw <= cap {
                    assert_eq!(d, raw);
                }
            }
        }
    }

    #[test]
    fn system_clamps_long_frame() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<FrameDelta>()
            .insert_resource(SceneConfig::default())
            .add_systems(Update, update_frame_delta);
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(2));
        app.update();
        assert_eq!(app.world().resource::<FrameDelta>().0, 0.2);
    }
}
