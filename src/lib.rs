pub mod app;
pub mod core;
pub mod debug;
pub mod gameplay;
pub mod interaction;
pub mod physics;
pub mod rendering;

// Curated re-exports
pub use crate::app::{ConfigDiagnostics, ScenePlugin};
pub use crate::core::components::{Accent, ColorDamp, Connector, Crystal, PaletteSlot, PointerFollower};
pub use crate::core::config::{config::SceneConfig, config::WindowConfig};
pub use crate::gameplay::spawn::SpawnRng;
pub use crate::rendering::palette::{AccentIndex, MaterialDescriptor, Palette};
