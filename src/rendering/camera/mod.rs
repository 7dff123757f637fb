pub mod camera;

pub use camera::{apply_post_stack, camera_projection, msaa_from_samples, CameraPlugin, SceneCamera};
