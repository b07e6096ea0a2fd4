use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A cell/material color, persisted as a lowercase `#rrggbb` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Base ground color for freshly generated terrain cells.
pub const BACKGROUND: CellColor = CellColor::rgb(0x6b, 0x8e, 0x4e);

/// Generic fallback when a color property has no declared default.
pub const MID_GREY: CellColor = CellColor::rgb(0x80, 0x80, 0x80);

impl CellColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string. Leading `#` is required, hex digits are
    /// case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for CellColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CellColor::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid color string: {raw}")))
    }
}
