pub mod pointer;

pub use pointer::{
    cursor_to_ndc, follow_pointer, pointer_world_position, viewport_at_distance, PointerNdc,
    PointerPlugin, ViewportWorldSize,
};
