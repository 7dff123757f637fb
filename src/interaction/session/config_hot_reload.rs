use bevy::prelude::*;
use std::{collections::HashMap, fs, path::PathBuf, time::SystemTime};

use crate::core::config::SceneConfig;
use crate::core::system::system_order::InputSet;
use crate::rendering::palette::{AccentChanged, AccentIndex, Palette};

/// Config layers watched for changes, in merge order.
#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings {
    pub paths: Vec<PathBuf>,
    pub interval_secs: f32,
}
impl Default for ConfigReloadSettings {
    fn default() -> Self {
        Self {
            paths: vec![
                PathBuf::from("assets/config/scene.ron"),
                PathBuf::from("assets/config/scene.local.ron"),
            ],
            interval_secs: 0.5,
        }
    }
}

#[derive(Resource, Debug)]
struct ConfigReloadState {
    last_mod: HashMap<PathBuf, SystemTime>,
    timer: Timer,
}
impl Default for ConfigReloadState {
    fn default() -> Self {
        Self {
            last_mod: HashMap::new(),
            timer: Timer::from_seconds(0.5, TimerMode::Repeating),
        }
    }
}

/// Polls config file mtimes and swaps in the re-merged `SceneConfig` (and `Palette`) on change.
/// Systems keyed on `resource_changed::<SceneConfig>` pick the new values up.
pub struct ConfigHotReloadPlugin;
impl Plugin for ConfigHotReloadPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            app.init_resource::<ConfigReloadSettings>()
                .init_resource::<ConfigReloadState>()
                .init_resource::<AccentIndex>()
                .add_event::<AccentChanged>()
                .add_systems(Startup, prime_mtimes)
                .add_systems(Update, poll_and_reload_config.before(InputSet));
        }
        #[cfg(target_arch = "wasm32")]
        let _ = app;
    }
}

fn scan_mtimes(settings: &ConfigReloadSettings, state: &mut ConfigReloadState) -> bool {
    let mut dirty = false;
    for path in &settings.paths {
        let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
            continue;
        };
        let entry = state.last_mod.entry(path.clone()).or_insert(SystemTime::UNIX_EPOCH);
        if modified > *entry {
            *entry = modified;
            dirty = true;
        }
    }
    dirty
}

// Record current mtimes so the first poll does not reload the config we started with.
fn prime_mtimes(settings: Res<ConfigReloadSettings>, mut state: ResMut<ConfigReloadState>) {
    scan_mtimes(&settings, &mut state);
}

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    mut cfg_res: ResMut<SceneConfig>,
    mut palette: ResMut<Palette>,
    mut accent: ResMut<AccentIndex>,
    mut accent_changed: EventWriter<AccentChanged>,
    mut windows: Query<&mut Window>,
) {
    let interval = settings.interval_secs.max(0.05);
    if (state.timer.duration().as_secs_f32() - interval).abs() > f32::EPSILON {
        state
            .timer
            .set_duration(std::time::Duration::from_secs_f32(interval));
    }
    if !state.timer.tick(time.delta()).finished() {
        return;
    }
    if !scan_mtimes(&settings, &mut state) {
        return;
    }
    let (new_cfg, used, errors) = SceneConfig::load_layered(
        settings.paths.iter().filter(|p| p.exists()),
    );
    for e in errors {
        warn!(target: "config", "CONFIG HOT-RELOAD issue: {e}");
    }
    if *cfg_res == new_cfg {
        return;
    }
    for w in new_cfg.validate() {
        warn!(target: "config", "config: {w}");
    }
    let palette_changed = match Palette::from_config(&new_cfg.palette) {
        Ok(p) => palette.set_if_neq(p),
        Err(e) => {
            warn!(target: "config", "palette unchanged: {e}");
            false
        }
    };
    if let Ok(mut window) = windows.single_mut() {
        if window.width() != new_cfg.window.width || window.height() != new_cfg.window.height {
            window
                .resolution
                .set(new_cfg.window.width, new_cfg.window.height);
        }
        if window.title != new_cfg.window.title {
            window.title = new_cfg.window.title.clone();
        }
    }
    info!(target: "config", "config hot-reload applied from {}", used.join(", "));
    *cfg_res = new_cfg;
    // Re-derive slot descriptors so live connectors follow the edited palette.
    if palette_changed {
        let index = accent.0 % palette.accent_count().max(1);
        accent.set_if_neq(AccentIndex(index));
        accent_changed.write(AccentChanged { index });
    }
}
