use bevy::color::palettes::css;
use bevy::prelude::*;
use thiserror::Error;

use crate::core::config::{PaletteConfig, ACCENT_KEYWORD};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaletteError {
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    #[error("unknown color name `{0}`")]
    UnknownName(String),
}

/// Parses `#rgb`, `#rrggbb` (alpha variants too) or a CSS color name.
pub fn parse_color(src: &str) -> Result<Color, PaletteError> {
    let s = src.trim();
    if s.starts_with('#') {
        return Srgba::hex(s)
            .map(Color::Srgba)
            .map_err(|_| PaletteError::InvalidHex(src.to_string()));
    }
    let named = match s.to_ascii_lowercase().as_str() {
        "white" => css::WHITE,
        "black" => css::BLACK,
        "red" => css::RED,
        "green" => css::GREEN,
        "lime" => css::LIME,
        "blue" => css::BLUE,
        "yellow" => css::YELLOW,
        "orange" => css::ORANGE,
        "hotpink" => css::HOT_PINK,
        "gray" | "grey" => css::GRAY,
        "silver" => css::SILVER,
        _ => return Err(PaletteError::UnknownName(src.to_string())),
    };
    Ok(Color::Srgba(named))
}

/// Color + roughness handed to one connector. Rebuilt whenever the accent changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDescriptor {
    pub color: Color,
    pub roughness: f32,
    pub accent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotColor {
    Fixed(Color),
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotTemplate {
    pub color: SlotColor,
    pub roughness: f32,
}

/// Parsed palette: backgrounds, accent cycle and the per-slot descriptor templates.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Palette {
    pub backgrounds: Vec<Color>,
    pub background_index: usize,
    pub accents: Vec<Color>,
    pub slots: Vec<SlotTemplate>,
}

impl Default for Palette {
    fn default() -> Self {
        // The default config only holds valid colors.
        Self::from_config(&PaletteConfig::default()).unwrap_or(Self {
            backgrounds: vec![Color::BLACK],
            background_index: 0,
            accents: vec![Color::WHITE],
            slots: Vec::new(),
        })
    }
}

impl Palette {
    pub fn from_config(cfg: &PaletteConfig) -> Result<Self, PaletteError> {
        let backgrounds = cfg
            .backgrounds
            .iter()
            .map(|c| parse_color(c))
            .collect::<Result<Vec<_>, _>>()?;
        let accents = cfg
            .accents
            .iter()
            .map(|c| parse_color(c))
            .collect::<Result<Vec<_>, _>>()?;
        let slots = cfg
            .slots
            .iter()
            .map(|s| {
                let color = if s.color.trim().eq_ignore_ascii_case(ACCENT_KEYWORD) {
                    SlotColor::Accent
                } else {
                    SlotColor::Fixed(parse_color(&s.color)?)
                };
                Ok(SlotTemplate {
                    color,
                    roughness: s.roughness.clamp(0.0, 1.0),
                })
            })
            .collect::<Result<Vec<_>, PaletteError>>()?;
        Ok(Self {
            backgrounds,
            background_index: cfg.background_index,
            accents,
            slots,
        })
    }

    pub fn accent_count(&self) -> usize {
        self.accents.len()
    }

    /// Accent for `index`, wrapping around the cycle. White when there are no accents.
    pub fn accent_color(&self, index: usize) -> Color {
        if self.accents.is_empty() {
            return Color::WHITE;
        }
        self.accents[index % self.accents.len()]
    }

    pub fn background(&self) -> Color {
        self.backgrounds
            .get(self.background_index)
            .or_else(|| self.backgrounds.first())
            .copied()
            .unwrap_or(Color::BLACK)
    }

    /// Descriptor list for the given accent index, one entry per slot.
    pub fn shuffle(&self, accent: usize) -> Vec<MaterialDescriptor> {
        let accent_color = self.accent_color(accent);
        self.slots
            .iter()
            .map(|slot| match slot.color {
                SlotColor::Fixed(color) => MaterialDescriptor {
                    color,
                    roughness: slot.roughness,
                    accent: false,
                },
                SlotColor::Accent => MaterialDescriptor {
                    color: accent_color,
                    roughness: slot.roughness,
                    accent: true,
                },
            })
            .collect()
    }
}

/// Session-wide accent counter, advanced once per click.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccentIndex(pub usize);

impl AccentIndex {
    /// `(current + 1) mod len`. Stays at 0 with an empty cycle.
    pub fn advance(&mut self, len: usize) -> usize {
        self.0 = if len == 0 { 0 } else { (self.0 + 1) % len };
        self.0
    }
}

/// Sent after the accent index changes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentChanged {
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        assert_eq!(parse_color("#444").unwrap(), Color::Srgba(Srgba::hex("444444").unwrap()));
        assert_eq!(parse_color("white").unwrap(), Color::WHITE);
        assert_eq!(parse_color(" White ").unwrap(), Color::WHITE);
        assert!(matches!(parse_color("#12"), Err(PaletteError::InvalidHex(_))));
        assert!(matches!(parse_color("chartreuse-ish"), Err(PaletteError::UnknownName(_))));
    }

    #[test]
    fn shuffle_places_accent_in_flagged_slots() {
        let palette = Palette::default();
        for accent in 0..palette.accent_count() {
            let descriptors = palette.shuffle(accent);
            assert_eq!(descriptors.len(), 9);
            let accented: Vec<_> = descriptors.iter().filter(|d| d.accent).collect();
            assert_eq!(accented.len(), 3);
            for d in accented {
                assert_eq!(d.color, palette.accents[accent]);
            }
            assert_eq!(descriptors[0].color, parse_color("#444").unwrap());
            assert_eq!(descriptors[0].roughness, 0.1);
            assert_eq!(descriptors[7].roughness, 0.8);
        }
    }

    #[test]
    fn accent_index_wraps() {
        let palette = Palette::default();
        let len = palette.accent_count();
        let mut idx = AccentIndex::default();
        for k in 1..=20usize {
            idx.advance(len);
            assert_eq!(idx.0, k % len);
            assert_eq!(palette.accent_color(idx.0), palette.accents[k % len]);
        }
        let mut empty = AccentIndex(3);
        assert_eq!(empty.advance(0), 0);
    }

    #[test]
    fn background_falls_back_to_first() {
        let mut palette = Palette::default();
        assert_eq!(palette.background(), parse_color("#002136").unwrap());
        palette.background_index = 42;
        assert_eq!(palette.background(), parse_color("#0a0a0a").unwrap());
    }
}
