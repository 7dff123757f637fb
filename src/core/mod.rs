pub mod components;
pub mod config;
pub mod easing;
pub mod system;
