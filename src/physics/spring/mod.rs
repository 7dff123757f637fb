pub mod spring;

pub use spring::{restoring_impulse, SpringToOriginPlugin};
