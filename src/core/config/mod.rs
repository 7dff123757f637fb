pub mod config;

pub use config::{
    AmbientOcclusionConfig, BloomConfig, CameraConfig, ConnectorConfig, CrystalConfig,
    DepthOfFieldConfig, EnvironmentConfig, GrainVignetteConfig, LightformerConfig,
    LightingConfig, PaletteConfig, PhysicsConfig, PostConfig, SceneConfig, SlotConfig,
    SpotConfig, WindowConfig, ACCENT_KEYWORD,
};
