pub mod lighting;

pub use lighting::{lightformer_position, spot_inner_angle, LightingPlugin, SceneLight};
