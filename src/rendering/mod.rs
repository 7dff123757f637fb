pub mod camera;
pub mod lighting;
pub mod materials;
pub mod palette;
pub mod postprocess;
