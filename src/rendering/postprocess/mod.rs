// Film grain + vignette fullscreen pass, run after tonemapping on the scene camera.
// Bloom, depth of field and SSAO are Bevy's own passes (see rendering::camera).

use bevy::core_pipeline::core_3d::graph::{Core3d, Node3d};
use bevy::core_pipeline::fullscreen_vertex_shader::fullscreen_shader_vertex_state;
use bevy::ecs::query::QueryItem;
use bevy::prelude::*;
use bevy::render::{
    extract_component::{
        ComponentUniforms, DynamicUniformIndex, ExtractComponent, ExtractComponentPlugin,
        UniformComponentPlugin,
    },
    render_graph::{
        NodeRunError, RenderGraphApp, RenderGraphContext, RenderLabel, ViewNode, ViewNodeRunner,
    },
    render_resource::{
        binding_types::{sampler, texture_2d, uniform_buffer},
        *,
    },
    renderer::{RenderContext, RenderDevice},
    view::ViewTarget,
    RenderApp,
};

const SHADER_ASSET_PATH: &str = "shaders/grain_vignette.wgsl";

/// Per-camera parameters. Present on a camera = pass enabled for it.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, ExtractComponent, ShaderType)]
pub struct GrainVignetteSettings {
    /// Screen-blended noise amount (0 disables grain).
    pub noise_opacity: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    /// Seconds; reseeds the grain every frame.
    pub time: f32,
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
struct GrainVignetteLabel;

pub struct GrainVignettePlugin;

impl Plugin for GrainVignettePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ExtractComponentPlugin::<GrainVignetteSettings>::default(),
            UniformComponentPlugin::<GrainVignetteSettings>::default(),
        ))
        .add_systems(Update, advance_grain_time);

        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };
        render_app
            .add_render_graph_node::<ViewNodeRunner<GrainVignetteNode>>(Core3d, GrainVignetteLabel)
            .add_render_graph_edges(
                Core3d,
                (
                    Node3d::Tonemapping,
                    GrainVignetteLabel,
                    Node3d::EndMainPassPostProcessing,
                ),
            );
    }

    fn finish(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };
        render_app.init_resource::<GrainVignettePipeline>();
    }
}

pub fn advance_grain_time(time: Res<Time>, mut q: Query<&mut GrainVignetteSettings>) {
    let t = time.elapsed_secs_wrapped();
    for mut s in q.iter_mut() {
        s.time = t;
    }
}

#[derive(Default)]
struct GrainVignetteNode;

impl ViewNode for GrainVignetteNode {
    type ViewQuery = (
        &'static ViewTarget,
        &'static GrainVignetteSettings,
        &'static DynamicUniformIndex<GrainVignetteSettings>,
    );

    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        (view_target, _settings, settings_index): QueryItem<Self::ViewQuery>,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let pipeline = world.resource::<GrainVignettePipeline>();
        let pipeline_cache = world.resource::<PipelineCache>();
        let pipeline_id = if view_target.is_hdr() {
            pipeline.hdr_pipeline_id
        } else {
            pipeline.ldr_pipeline_id
        };
        let Some(render_pipeline) = pipeline_cache.get_render_pipeline(pipeline_id) else {
            return Ok(());
        };
        let settings_uniforms = world.resource::<ComponentUniforms<GrainVignetteSettings>>();
        let Some(settings_binding) = settings_uniforms.uniforms().binding() else {
            return Ok(());
        };

        let post_process = view_target.post_process_write();
        let bind_group = render_context.render_device().create_bind_group(
            "grain_vignette_bind_group",
            &pipeline.layout,
            &BindGroupEntries::sequential((
                post_process.source,
                &pipeline.sampler,
                settings_binding.clone(),
            )),
        );

        let mut pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
            label: Some("grain_vignette_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: post_process.destination,
                resolve_target: None,
                ops: Operations::default(),
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_render_pipeline(render_pipeline);
        pass.set_bind_group(0, &bind_group, &[settings_index.index()]);
        pass.draw(0..3, 0..1);
        Ok(())
    }
}

/// One pipeline per view target format: HDR cameras write `Rgba16Float` after tonemapping.
#[derive(Resource)]
struct GrainVignettePipeline {
    layout: BindGroupLayout,
    sampler: Sampler,
    ldr_pipeline_id: CachedRenderPipelineId,
    hdr_pipeline_id: CachedRenderPipelineId,
}

impl FromWorld for GrainVignettePipeline {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();
        let layout = render_device.create_bind_group_layout(
            "grain_vignette_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::FRAGMENT,
                (
                    texture_2d(TextureSampleType::Float { filterable: true }),
                    sampler(SamplerBindingType::Filtering),
                    uniform_buffer::<GrainVignetteSettings>(true),
                ),
            ),
        );
        let sampler = render_device.create_sampler(&SamplerDescriptor::default());
        let shader = world.load_asset(SHADER_ASSET_PATH);

        let descriptor = |format: TextureFormat, label: &'static str| RenderPipelineDescriptor {
            label: Some(label.into()),
            layout: vec![layout.clone()],
            vertex: fullscreen_shader_vertex_state(),
            fragment: Some(FragmentState {
                shader: shader.clone(),
                shader_defs: vec![],
                entry_point: "fragment".into(),
                targets: vec![Some(ColorTargetState {
                    format,
                    blend: None,
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            push_constant_ranges: vec![],
            zero_initialize_workgroup_memory: false,
        };
        let pipeline_cache = world.resource::<PipelineCache>();
        let ldr_pipeline_id = pipeline_cache.queue_render_pipeline(descriptor(
            TextureFormat::bevy_default(),
            "grain_vignette_pipeline",
        ));
        let hdr_pipeline_id = pipeline_cache.queue_render_pipeline(descriptor(
            ViewTarget::TEXTURE_FORMAT_HDR,
            "grain_vignette_pipeline_hdr",
        ));

        Self {
            layout,
            sampler,
            ldr_pipeline_id,
            hdr_pipeline_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn grain_time_tracks_elapsed() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_systems(Update, advance_grain_time);
        let cam = app
            .world_mut()
            .spawn(GrainVignetteSettings {
                noise_opacity: 0.04,
                ..default()
            })
            .id();
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(1500));
        app.update();
        let s = app.world().get::<GrainVignetteSettings>(cam).unwrap();
        assert!((s.time - 1.5).abs() < 1e-4);
        assert_eq!(s.noise_opacity, 0.04);
    }

    #[test]
    fn vignette_smoothstep_edges_ascend() {
        let src = include_str!("../../../assets/shaders/grain_vignette.wgsl");
        let line = src
            .lines()
            .find(|l| l.contains("smoothstep"))
            .expect("vignette line");
        let args = line
            .split("smoothstep(")
            .nth(1)
            .and_then(|rest| rest.split(", d)").next())
            .expect("smoothstep args");
        let (lo, hi) = args.split_once(", ").expect("two edges");
        // Worst case allowed by config validation is an offset just under 1.0.
        let lo = lo.replace("settings.vignette_offset", "0.999");
        let eval = |e: &str| -> f32 {
            e.split(" * ")
                .map(|f| f.trim().parse::<f32>().expect("numeric factor"))
                .product()
        };
        assert!(eval(&lo) < eval(hi), "{line}");
        assert!(line.contains("1.0 - smoothstep"), "{line}");
    }
}
