// ── RGB color ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {0:?} (expected #rrggbb)")]
pub struct ParseColorError(String);

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }

    pub fn is_white(self) -> bool {
        self == Self::WHITE
    }

    /// Fully saturated color at `degrees` around the hue wheel
    /// (0 red, 120 green, 240 blue). Wraps past 360.
    pub fn from_hue(degrees: u16) -> Self {
        let scaled = u32::from(degrees % 360) * 1536 / 360;
        let rise = u8::try_from(scaled % 256).unwrap_or(u8::MAX);
        let fall = u8::MAX - rise;
        match scaled / 256 {
            0 => Self::new(255, rise, 0),
            1 => Self::new(fall, 255, 0),
            2 => Self::new(0, 255, rise),
            3 => Self::new(0, fall, 255),
            4 => Self::new(rise, 0, 255),
            _ => Self::new(255, 0, fall),
        }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Accepts `#rrggbb`, `rrggbb`, and the `#rgb` shorthand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_owned());
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(err());
        }

        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_owned(),
            _ => return Err(err()),
        };

        let channel = |i: usize| {
            expanded
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(err)
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Swatches offered by the color picker, row by row (8 per row):
/// yellows, reds, greens, blues. The first swatch is black (off) and the
/// eighth is white (on).
pub const PALETTE: [Rgb; 32] = [
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0xCC, 0x99, 0x00),
    Rgb::new(0xFF, 0xCC, 0x00),
    Rgb::new(0xFF, 0xFF, 0x00),
    Rgb::new(0xFF, 0xFF, 0x33),
    Rgb::new(0xFF, 0xFF, 0x66),
    Rgb::new(0xFF, 0xFF, 0xCC),
    Rgb::new(0xFF, 0xFF, 0xFF),
    Rgb::new(0x66, 0x00, 0x00),
    Rgb::new(0x99, 0x00, 0x00),
    Rgb::new(0xCC, 0x00, 0x00),
    Rgb::new(0xFF, 0x00, 0x00),
    Rgb::new(0xCC, 0x33, 0x33),
    Rgb::new(0xFF, 0x66, 0x66),
    Rgb::new(0xFF, 0x99, 0x99),
    Rgb::new(0xFF, 0xCC, 0xCC),
    Rgb::new(0x00, 0x33, 0x00),
    Rgb::new(0x00, 0x66, 0x00),
    Rgb::new(0x00, 0x99, 0x00),
    Rgb::new(0x00, 0xCC, 0x00),
    Rgb::new(0x00, 0xFF, 0x00),
    Rgb::new(0x66, 0xFF, 0x66),
    Rgb::new(0x99, 0xFF, 0x99),
    Rgb::new(0xCC, 0xFF, 0xCC),
    Rgb::new(0x00, 0x00, 0x66),
    Rgb::new(0x00, 0x00, 0x99),
    Rgb::new(0x00, 0x00, 0xCC),
    Rgb::new(0x00, 0x00, 0xFF),
    Rgb::new(0x33, 0x66, 0xFF),
    Rgb::new(0x33, 0x99, 0xFF),
    Rgb::new(0x66, 0xCC, 0xFF),
    Rgb::new(0x99, 0xCC, 0xFF),
];
