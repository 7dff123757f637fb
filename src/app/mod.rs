pub mod scene;

pub use scene::{ConfigDiagnostics, ScenePlugin};
