pub mod rapier;
pub mod spring;
