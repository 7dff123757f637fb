// This file is part of Connector Field.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use connector_field::{ConfigDiagnostics, SceneConfig, ScenePlugin, SpawnRng};
#[cfg(not(target_arch = "wasm32"))]
use connector_field::interaction::session::ConfigReloadSettings;

const BASE_CONFIG: &str = "assets/config/scene.ron";
const LOCAL_CONFIG: &str = "assets/config/scene.local.ron";

/// Physics connectors that scatter around the pointer and settle back to the origin.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Extra RON layers merged over the base config, in order. May be repeated.
    #[arg(long = "config", value_name = "PATH")]
    config: Vec<PathBuf>,
    /// Seed for connector spawn positions.
    #[arg(long)]
    seed: Option<u64>,
    /// Exit after this many seconds (overrides `window.autoClose`).
    #[arg(long, value_name = "SECS")]
    auto_close: Option<f32>,
}

#[cfg(target_arch = "wasm32")]
fn load_config(_cli: &Cli) -> anyhow::Result<(SceneConfig, ConfigDiagnostics, Vec<PathBuf>)> {
    Ok((
        SceneConfig::embedded(),
        ConfigDiagnostics {
            layers: vec!["embedded".into()],
            errors: Vec::new(),
        },
        Vec::new(),
    ))
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(cli: &Cli) -> anyhow::Result<(SceneConfig, ConfigDiagnostics, Vec<PathBuf>)> {
    // Layers named on the command line must exist and parse on their own.
    for path in &cli.config {
        SceneConfig::load_from_file(path)?;
    }
    let mut paths = vec![PathBuf::from(BASE_CONFIG)];
    if std::path::Path::new(LOCAL_CONFIG).exists() {
        paths.push(PathBuf::from(LOCAL_CONFIG));
    }
    paths.extend(cli.config.iter().cloned());
    let (cfg, layers, errors) = SceneConfig::load_layered(paths.iter());
    Ok((cfg, ConfigDiagnostics { layers, errors }, paths))
}

fn main() -> anyhow::Result<()> {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
    }

    let cli = Cli::parse();
    let (mut cfg, diagnostics, _watched) = load_config(&cli)?;
    if let Some(secs) = cli.auto_close {
        cfg.window.auto_close = secs;
    }

    let window = &cfg.window;
    let primary = Window {
        title: window.title.clone(),
        resolution: (window.width, window.height).into(),
        resizable: true,
        canvas: window.canvas.clone(),
        fit_canvas_to_parent: true,
        ..default()
    };

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(primary),
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu=error,naga=warn,bevy_render=warn".into(),
                ..default()
            }),
    )
    .insert_resource(cfg)
    .insert_resource(diagnostics)
    .insert_resource(SpawnRng::seeded(cli.seed));

    #[cfg(not(target_arch = "wasm32"))]
    app.insert_resource(ConfigReloadSettings {
        paths: _watched,
        ..default()
    });

    app.add_plugins(ScenePlugin).run();
    Ok(())
}
