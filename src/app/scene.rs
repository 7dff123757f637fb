// This file is part of Connector Field.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::core::config::SceneConfig;
use crate::core::system::frame_delta::{update_frame_delta, FrameDelta};
use crate::core::system::system_order::configure_scene_sets;
use crate::debug::DebugPlugin;
use crate::gameplay::spawn::ConnectorSpawnPlugin;
use crate::interaction::palette_cycle::PaletteCyclePlugin;
use crate::interaction::pointer::PointerPlugin;
use crate::interaction::session::{AutoClosePlugin, ConfigHotReloadPlugin};
use crate::physics::rapier::PhysicsSetupPlugin;
use crate::physics::spring::SpringToOriginPlugin;
use crate::rendering::camera::CameraPlugin;
use crate::rendering::lighting::LightingPlugin;
use crate::rendering::materials::MaterialsPlugin;
use crate::rendering::palette::Palette;
use crate::rendering::postprocess::GrainVignettePlugin;

/// Outcome of config loading, reported once the log plugin is up.
#[derive(Resource, Debug, Default, Clone)]
pub struct ConfigDiagnostics {
    pub layers: Vec<String>,
    pub errors: Vec<String>,
}

/// Everything except the window/render backends. Expects `SceneConfig` to be inserted first
/// (falls back to defaults otherwise).
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SceneConfig>() {
            app.insert_resource(SceneConfig::default());
        }
        let cfg = app.world().resource::<SceneConfig>().clone();
        let palette = Palette::from_config(&cfg.palette).unwrap_or_else(|e| {
            warn!(target: "palette", "invalid palette config ({e}); using built-in palette");
            Palette::default()
        });

        configure_scene_sets(app);
        app.insert_resource(palette)
            .init_resource::<FrameDelta>()
            .init_resource::<ConfigDiagnostics>()
            .add_systems(PreUpdate, update_frame_delta)
            .add_systems(Startup, report_config)
            .add_plugins((
                CameraPlugin,
                LightingPlugin,
                MaterialsPlugin,
                GrainVignettePlugin,
                PhysicsSetupPlugin {
                    debug_render: cfg.rapier_debug,
                },
                SpringToOriginPlugin,
                PointerPlugin,
                PaletteCyclePlugin,
                ConnectorSpawnPlugin,
                DebugPlugin,
                ConfigHotReloadPlugin,
                AutoClosePlugin,
            ));
    }
}

fn report_config(diag: Res<ConfigDiagnostics>, cfg: Res<SceneConfig>, palette: Res<Palette>) {
    for e in &diag.errors {
        warn!(target: "config", "CONFIG LOAD ISSUE: {e}");
    }
    if diag.layers.is_empty() {
        info!(target: "config", "no config layers found; using defaults");
    } else {
        info!(target: "config", "config layers loaded: {}", diag.layers.join(", "));
    }
    for w in cfg.validate() {
        warn!(target: "config", "CONFIG WARNING: {w}");
    }
    info!(
        target: "config",
        "scene: {} slots, {} accents, crystal={}, respawn_on_click={}",
        palette.slots.len(),
        palette.accent_count(),
        cfg.crystal.enabled,
        cfg.connectors.respawn_on_click
    );
}
