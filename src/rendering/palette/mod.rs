pub mod palette;

pub use palette::{
    parse_color, AccentChanged, AccentIndex, MaterialDescriptor, Palette, PaletteError,
};
