use bevy::core_pipeline::bloom::{Bloom, BloomPrefilter};
use bevy::core_pipeline::dof::{DepthOfField, DepthOfFieldMode};
use bevy::core_pipeline::prepass::{DepthPrepass, NormalPrepass};
use bevy::core_pipeline::smaa::Smaa;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::ecs::system::EntityCommands;
use bevy::pbr::{ScreenSpaceAmbientOcclusion, ScreenSpaceAmbientOcclusionQualityLevel};
use bevy::prelude::*;

use crate::core::config::{CameraConfig, PostConfig, SceneConfig};
use crate::rendering::palette::Palette;
use crate::rendering::postprocess::GrainVignetteSettings;

/// Marks the single perspective camera the pointer mapping and post stack are bound to.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct SceneCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_scene_camera).add_systems(
            Update,
            (
                sync_post_stack.run_if(resource_changed::<SceneConfig>),
                sync_clear_color.run_if(resource_changed::<Palette>),
            ),
        );
    }
}

pub fn camera_projection(cfg: &CameraConfig) -> PerspectiveProjection {
    PerspectiveProjection {
        fov: cfg.fov_degrees.to_radians(),
        near: cfg.near,
        far: cfg.far,
        ..default()
    }
}

fn spawn_scene_camera(mut commands: Commands, cfg: Res<SceneConfig>) {
    let cam = &cfg.camera;
    commands.spawn((
        Name::new("SceneCamera"),
        SceneCamera,
        Camera3d::default(),
        Camera {
            hdr: cam.hdr,
            ..default()
        },
        Projection::Perspective(camera_projection(cam)),
        Transform::from_translation(Vec3::from_array(cam.position)).looking_at(Vec3::ZERO, Vec3::Y),
        Tonemapping::TonyMcMapface,
    ));
}

fn ao_quality(level: u8) -> ScreenSpaceAmbientOcclusionQualityLevel {
    match level {
        0 => ScreenSpaceAmbientOcclusionQualityLevel::Low,
        1 => ScreenSpaceAmbientOcclusionQualityLevel::Medium,
        2 => ScreenSpaceAmbientOcclusionQualityLevel::High,
        _ => ScreenSpaceAmbientOcclusionQualityLevel::Ultra,
    }
}

pub fn msaa_from_samples(samples: u32) -> Msaa {
    match samples {
        0 | 1 => Msaa::Off,
        2 => Msaa::Sample2,
        4 => Msaa::Sample4,
        _ => Msaa::Sample8,
    }
}

/// Inserts or removes every post effect on the camera to match `post`.
/// SSAO cannot run with MSAA, so enabling it swaps MSAA for SMAA.
pub fn apply_post_stack(camera: &mut EntityCommands, post: &PostConfig) {
    let ao = &post.ambient_occlusion;
    if ao.enabled {
        camera.insert((
            ScreenSpaceAmbientOcclusion {
                quality_level: ao_quality(ao.quality),
                constant_object_thickness: ao.object_thickness,
            },
            DepthPrepass,
            NormalPrepass,
            Msaa::Off,
            Smaa::default(),
        ));
    } else {
        camera
            .remove::<(ScreenSpaceAmbientOcclusion, Smaa)>()
            .insert(msaa_from_samples(post.msaa_samples));
    }

    let dof = &post.depth_of_field;
    if dof.enabled {
        camera.insert((
            DepthOfField {
                mode: DepthOfFieldMode::Bokeh,
                focal_distance: dof.focal_distance,
                aperture_f_stops: dof.aperture_f_stops,
                max_circle_of_confusion_diameter: dof.max_coc_diameter,
                ..default()
            },
            DepthPrepass,
        ));
    } else {
        camera.remove::<DepthOfField>();
    }

    let bloom = &post.bloom;
    if bloom.enabled {
        camera.insert(Bloom {
            intensity: bloom.intensity,
            prefilter: BloomPrefilter {
                threshold: bloom.threshold,
                threshold_softness: bloom.threshold_softness,
            },
            ..Bloom::NATURAL
        });
    } else {
        camera.remove::<Bloom>();
    }

    let gv = &post.grain_vignette;
    if gv.enabled {
        camera.insert(GrainVignetteSettings {
            noise_opacity: gv.noise_opacity,
            vignette_offset: gv.vignette_offset,
            vignette_darkness: gv.vignette_darkness,
            time: 0.0,
        });
    } else {
        camera.remove::<GrainVignetteSettings>();
    }
}

fn sync_post_stack(
    mut commands: Commands,
    cfg: Res<SceneConfig>,
    cameras: Query<Entity, With<SceneCamera>>,
) {
    let post = &cfg.post;
    for e in cameras.iter() {
        apply_post_stack(&mut commands.entity(e), post);
        info!(
            target: "postprocess",
            "post stack on {e}: ssao={} dof={} bloom={} grain/vignette={}",
            post.ambient_occlusion.enabled,
            post.depth_of_field.enabled,
            post.bloom.enabled,
            post.grain_vignette.enabled
        );
    }
}

fn sync_clear_color(mut commands: Commands, palette: Res<Palette>) {
    commands.insert_resource(ClearColor(palette.background()));
}
