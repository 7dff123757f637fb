use bevy::prelude::*;

use crate::core::easing::smooth_damp;

/// Dynamic rigid body pulled back toward the origin every frame.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Connector;

/// Position of a connector in the palette's descriptor list. Palette changes are applied by slot.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteSlot(pub usize);

/// Present while the slot's descriptor carries the accent flag.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Accent;

/// The transmissive connector with its own point light. Not part of the palette.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Crystal;

/// Renderable child of a connector body (mesh, material, hull collider).
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ConnectorVisual;

/// The single kinematic collider that tracks the pointer.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PointerFollower;

/// Eased material color: the material's base color chases `target`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ColorDamp {
    pub target: Color,
    /// Per-channel (linear RGB) velocity.
    pub velocity: Vec3,
}

impl ColorDamp {
    pub fn new(target: Color) -> Self {
        Self {
            target,
            velocity: Vec3::ZERO,
        }
    }

    /// One easing step in linear RGB. Alpha is taken from the target.
    pub fn step(&mut self, current: Color, smooth_time: f32, delta: f32) -> Color {
        let cur = current.to_linear();
        let tgt = self.target.to_linear();
        let red = smooth_damp(cur.red, tgt.red, &mut self.velocity.x, smooth_time, delta);
        let green = smooth_damp(cur.green, tgt.green, &mut self.velocity.y, smooth_time, delta);
        let blue = smooth_damp(cur.blue, tgt.blue, &mut self.velocity.z, smooth_time, delta);
        Color::LinearRgba(LinearRgba::new(red, green, blue, tgt.alpha))
    }
}
