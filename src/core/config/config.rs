use anyhow::Context;
use bevy::prelude::*;
use serde::Deserialize;
use std::{f32::consts::PI, fs, path::Path};

use crate::rendering::palette::palette::parse_color;

/// Color keyword that resolves to the active accent color when used in a palette slot.
pub const ACCENT_KEYWORD: &str = "accent";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
    /// CSS selector of the canvas to render into (wasm only).
    pub canvas: Option<String>,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Connector Field".into(),
            auto_close: 0.0,
            canvas: Some("#scene".into()),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub hdr: bool,
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 20.0],
            fov_degrees: 17.5,
            near: 1.0,
            far: 25.0,
            hdr: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpotConfig {
    pub position: [f32; 3],
    /// Outer cone angle in radians.
    pub angle: f32,
    /// 0 = hard edge, 1 = fully soft.
    pub penumbra: f32,
    pub intensity: f32,
    pub color: String,
    pub shadows: bool,
}
impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 10.0],
            angle: 0.15,
            penumbra: 1.0,
            intensity: 0.5,
            color: "red".into(),
            shadows: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_brightness: f32,
    pub ambient_color: String,
    /// Scales the unitless light intensities below into lumens.
    pub lumens_per_unit: f32,
    pub spot: SpotConfig,
}
impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_brightness: 8.0,
            ambient_color: "white".into(),
            lumens_per_unit: 250_000.0,
            spot: SpotConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LightformerConfig {
    pub intensity: f32,
    pub position: [f32; 3],
    pub scale: f32,
}
impl Default for LightformerConfig {
    fn default() -> Self {
        Self {
            intensity: 2.0,
            position: [0.0, 0.0, 0.0],
            scale: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub enabled: bool,
    /// XYZ euler rotation of the lightformer group.
    pub rotation: [f32; 3],
    pub range: f32,
    pub lightformers: Vec<LightformerConfig>,
}
impl Default for EnvironmentConfig {
    fn default() -> Self {
        let lf = |intensity, position, scale| LightformerConfig {
            intensity,
            position,
            scale,
        };
        Self {
            enabled: true,
            rotation: [-PI / 3.0, 0.0, 1.0],
            range: 30.0,
            lightformers: vec![
                lf(4.0, [0.0, 5.0, -9.0], 2.0),
                lf(2.0, [-5.0, 1.0, -1.0], 2.0),
                lf(2.0, [-5.0, -1.0, -1.0], 2.0),
                lf(2.0, [10.0, 1.0, 0.0], 8.0),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fraction of the displacement from the origin returned as impulse each frame.
    pub spring_factor: f32,
    /// Upper bound (seconds) for the frame delta handed to per-frame easing.
    pub max_frame_delta: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub pointer_radius: f32,
}
impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            spring_factor: 0.2,
            max_frame_delta: 0.2,
            linear_damping: 4.0,
            angular_damping: 1.0,
            friction: 0.2,
            pointer_radius: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConnectorConfig {
    /// glTF file holding the connector geometry. `None` uses the built-in capsule.
    pub mesh: Option<String>,
    /// Index of the glTF mesh to use (first primitive).
    pub mesh_index: usize,
    /// Edge length of the cube (centered on the origin) connectors spawn in.
    pub spawn_spread: f32,
    pub scale: f32,
    pub rotation: [f32; 3],
    pub metallic: f32,
    pub color_smooth_time: f32,
    /// Despawn and respawn slot connectors on click instead of retinting them in place.
    pub respawn_on_click: bool,
}
impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            mesh: None,
            mesh_index: 0,
            spawn_spread: 10.0,
            scale: 0.05,
            rotation: [PI, PI / 2.0, 0.0],
            metallic: 0.5,
            color_smooth_time: 0.2,
            respawn_on_click: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CrystalConfig {
    pub enabled: bool,
    pub position: [f32; 3],
    pub scale: f32,
    pub tint: String,
    pub metallic: f32,
    pub transmission: f32,
    pub thickness: f32,
    pub clearcoat: f32,
    pub ior: f32,
    pub light_color: String,
    pub light_intensity: f32,
    pub light_range: f32,
}
impl Default for CrystalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: [0.0, 0.0, 8.0],
            scale: 0.1,
            tint: "#0084D6".into(),
            metallic: 0.1,
            transmission: 1.0,
            thickness: 4.0,
            clearcoat: 1.0,
            ior: 1.5,
            light_color: "#bae6fd".into(),
            light_intensity: 2.0,
            light_range: 2.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SlotConfig {
    /// Hex / CSS color, or `"accent"` for the active accent color.
    pub color: String,
    pub roughness: f32,
}
impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            color: "white".into(),
            roughness: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PaletteConfig {
    pub backgrounds: Vec<String>,
    pub background_index: usize,
    pub accents: Vec<String>,
    pub slots: Vec<SlotConfig>,
}
impl Default for PaletteConfig {
    fn default() -> Self {
        let slot = |color: &str, roughness| SlotConfig {
            color: color.into(),
            roughness,
        };
        Self {
            backgrounds: vec!["#0a0a0a".into(), "#002136".into()],
            background_index: 1,
            accents: vec![
                "#0084D6".into(),
                "#3DB5FF".into(),
                "#20ffa0".into(),
                "#ffcc00".into(),
            ],
            slots: vec![
                slot("#444", 0.1),
                slot("#444", 0.75),
                slot("#444", 0.15),
                slot("white", 0.5),
                slot("white", 0.75),
                slot("white", 0.1),
                slot(ACCENT_KEYWORD, 0.1),
                slot(ACCENT_KEYWORD, 0.8),
                slot(ACCENT_KEYWORD, 0.1),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AmbientOcclusionConfig {
    pub enabled: bool,
    /// 0 = low .. 3 = ultra.
    pub quality: u8,
    pub object_thickness: f32,
}
impl Default for AmbientOcclusionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quality: 2,
            object_thickness: 0.25,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DepthOfFieldConfig {
    pub enabled: bool,
    pub focal_distance: f32,
    pub aperture_f_stops: f32,
    pub max_coc_diameter: f32,
}
impl Default for DepthOfFieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            focal_distance: 20.0,
            aperture_f_stops: 2.0,
            max_coc_diameter: 48.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BloomConfig {
    pub enabled: bool,
    pub intensity: f32,
    pub threshold: f32,
    pub threshold_softness: f32,
}
impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.2,
            threshold: 0.0,
            threshold_softness: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GrainVignetteConfig {
    pub enabled: bool,
    pub noise_opacity: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
}
impl Default for GrainVignetteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_opacity: 0.0425,
            vignette_offset: 0.1,
            vignette_darkness: 1.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PostConfig {
    pub ambient_occlusion: AmbientOcclusionConfig,
    pub depth_of_field: DepthOfFieldConfig,
    pub bloom: BloomConfig,
    pub grain_vignette: GrainVignetteConfig,
    /// MSAA sample count used when ambient occlusion is off (1, 2, 4 or 8).
    pub msaa_samples: u32,
}
impl Default for PostConfig {
    fn default() -> Self {
        Self {
            ambient_occlusion: Default::default(),
            depth_of_field: Default::default(),
            bloom: Default::default(),
            grain_vignette: Default::default(),
            msaa_samples: 8,
        }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub environment: EnvironmentConfig,
    pub physics: PhysicsConfig,
    pub connectors: ConnectorConfig,
    pub crystal: CrystalConfig,
    pub palette: PaletteConfig,
    pub post: PostConfig,
    pub rapier_debug: bool,
}

impl SceneConfig {
    pub fn from_ron_str(src: &str) -> anyhow::Result<Self> {
        ron::from_str(src).context("parse scene config RON")
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_ron_str(&data).with_context(|| format!("in {}", path.display()))
    }

    /// Config compiled into the binary, used where there is no filesystem (wasm).
    pub fn embedded() -> Self {
        Self::from_ron_str(include_str!("../../../assets/config/scene.ron")).unwrap_or_default()
    }

    /// Deep-merges every readable layer (later files win per key) and deserializes the result.
    /// Returns `(config, used_paths, errors)`; on any failure defaults fill in.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(base_map), Value::Map(overlay_map)) => {
                    for (key, incoming) in overlay_map.into_iter() {
                        if base_map.iter().any(|(k, _)| *k == key) {
                            if let Some((_, existing)) = base_map.iter_mut().find(|(k, _)| **k == key) {
                                merge_value(existing, incoming);
                            }
                        } else {
                            base_map.insert(key, incoming);
                        }
                    }
                }
                (slot, other) => *slot = other,
            }
        }

        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        match &mut merged {
                            Some(cur) => merge_value(cur, val),
                            None => merged = Some(val),
                        }
                        used.push(path_ref.display().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        let Some(val) = merged else {
            return (Self::default(), used, errors);
        };
        match val.into_rust::<SceneConfig>() {
            Ok(cfg) => (cfg, used, errors),
            Err(e) => {
                errors.push(format!(
                    "failed to deserialize merged config; using defaults: {e}"
                ));
                (Self::default(), used, errors)
            }
        }
    }

    /// Non-fatal sanity checks. Each entry is a human readable warning.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled",
                self.window.auto_close
            ));
        }
        let cam = &self.camera;
        if !(1.0..=170.0).contains(&cam.fov_degrees) {
            w.push(format!("camera.fov_degrees {} outside 1..170", cam.fov_degrees));
        }
        if cam.near <= 0.0 || cam.far <= cam.near {
            w.push(format!(
                "camera near/far invalid (near {}, far {})",
                cam.near, cam.far
            ));
        }
        let ph = &self.physics;
        if ph.spring_factor < 0.0 {
            w.push("physics.spring_factor negative -> bodies pushed away from origin".into());
        }
        if ph.max_frame_delta <= 0.0 {
            w.push("physics.max_frame_delta must be > 0".into());
        }
        if ph.linear_damping < 0.0 || ph.angular_damping < 0.0 {
            w.push("physics damping must be >= 0".into());
        }
        if ph.pointer_radius <= 0.0 {
            w.push("physics.pointer_radius must be > 0".into());
        }
        let con = &self.connectors;
        if con.scale <= 0.0 {
            w.push("connectors.scale must be > 0".into());
        }
        if con.spawn_spread < 0.0 {
            w.push("connectors.spawn_spread negative -> treated as 0".into());
        }
        if con.color_smooth_time <= 0.0 {
            w.push("connectors.color_smooth_time must be > 0".into());
        }
        if self.crystal.enabled && self.crystal.scale <= 0.0 {
            w.push("crystal.scale must be > 0".into());
        }

        let pal = &self.palette;
        if pal.accents.is_empty() {
            w.push("palette.accents is empty; clicks will not cycle colors".into());
        }
        if pal.slots.is_empty() {
            w.push("palette.slots is empty; only the crystal will spawn".into());
        }
        if pal.background_index >= pal.backgrounds.len() {
            w.push(format!(
                "palette.background_index {} out of range ({} backgrounds)",
                pal.background_index,
                pal.backgrounds.len()
            ));
        }
        let fixed_colors = pal
            .backgrounds
            .iter()
            .chain(pal.accents.iter())
            .chain(
                pal.slots
                    .iter()
                    .map(|s| &s.color)
                    .filter(|c| c.as_str() != ACCENT_KEYWORD),
            )
            .chain([
                &self.lighting.ambient_color,
                &self.lighting.spot.color,
                &self.crystal.tint,
                &self.crystal.light_color,
            ]);
        for c in fixed_colors {
            if let Err(e) = parse_color(c) {
                w.push(format!("color: {e}"));
            }
        }
        for (i, slot) in pal.slots.iter().enumerate() {
            if !(0.0..=1.0).contains(&slot.roughness) {
                w.push(format!(
                    "palette.slots[{i}].roughness {} outside 0..1",
                    slot.roughness
                ));
            }
        }

        let post = &self.post;
        if post.ambient_occlusion.quality > 3 {
            w.push(format!(
                "post.ambient_occlusion.quality {} > 3 -> clamped to ultra",
                post.ambient_occlusion.quality
            ));
        }
        if !matches!(post.msaa_samples, 1 | 2 | 4 | 8) {
            w.push(format!(
                "post.msaa_samples {} unsupported (1, 2, 4, 8)",
                post.msaa_samples
            ));
        }
        if post.depth_of_field.enabled && post.depth_of_field.aperture_f_stops <= 0.0 {
            w.push("post.depth_of_field.aperture_f_stops must be > 0".into());
        }
        if !(0.0..=1.0).contains(&post.grain_vignette.noise_opacity) {
            w.push(format!(
                "post.grain_vignette.noise_opacity {} outside 0..1",
                post.grain_vignette.noise_opacity
            ));
        }
        // The vignette ramps from `offset * 0.799` up to 0.8; past 1.0 the edges cross.
        if !(0.0..1.0).contains(&post.grain_vignette.vignette_offset) {
            w.push(format!(
                "post.grain_vignette.vignette_offset {} outside 0..1",
                post.grain_vignette.vignette_offset
            ));
        }
        w
    }
}
