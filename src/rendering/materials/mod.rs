pub mod materials;

pub use materials::{connector_material, crystal_material, MaterialsPlugin};
