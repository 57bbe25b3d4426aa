//! Color value object
//!
//! A color is built from either a hex string or RGB components and the other
//! representation is derived at construction, so the two never disagree.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Red, green and blue components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse `#rrggbb` or `rrggbb` (either case) into RGB components.
///
/// # Errors
///
/// Returns `DomainError::Parse` for anything but exactly six hex digits
/// with an optional leading `#`.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, DomainError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DomainError::parse(format!(
            "Invalid hexadecimal color string: {}",
            hex
        )));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| DomainError::parse(format!("Invalid hexadecimal color string: {}", hex)))
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format RGB components as lower-case `#rrggbb`.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

/// A named color with consistent hex and RGB forms
///
/// # Invariants
///
/// - `hex` is always `rgb_to_hex(rgb)` (lower-case, `#` prefixed)
/// - Neither form can be changed after construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRecord", into = "ColorRecord")]
pub struct Color {
    rgb: Rgb,
    hex: String,
    name: String,
}

impl Color {
    /// Color from a hex string, named after its normalized hex.
    pub fn from_hex(hex: &str) -> Result<Self, DomainError> {
        let rgb = hex_to_rgb(hex)?;
        Ok(Self::from_rgb(rgb.r, rgb.g, rgb.b))
    }

    pub fn from_hex_named(hex: &str, name: impl Into<String>) -> Result<Self, DomainError> {
        let rgb = hex_to_rgb(hex)?;
        Ok(Self::from_rgb_named(rgb.r, rgb.g, rgb.b, name))
    }

    /// Color from RGB components, named after its hex.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let hex = rgb_to_hex(Rgb::new(r, g, b));
        Self::from_rgb_named(r, g, b, hex)
    }

    pub fn from_rgb_named(r: u8, g: u8, b: u8, name: impl Into<String>) -> Self {
        let rgb = Rgb::new(r, g, b);
        Self {
            rgb,
            hex: rgb_to_hex(rgb),
            name: name.into(),
        }
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.hex {
            write!(f, "{}", self.hex)
        } else {
            write!(f, "{} ({})", self.name, self.hex)
        }
    }
}

/// Wire shape of a color: the hex string is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColorRecord {
    hex: String,
    name: String,
}

impl TryFrom<ColorRecord> for Color {
    type Error = DomainError;

    fn try_from(record: ColorRecord) -> Result<Self, Self::Error> {
        Color::from_hex_named(&record.hex, record.name)
    }
}

impl From<Color> for ColorRecord {
    fn from(color: Color) -> Self {
        Self {
            hex: color.hex,
            name: color.name,
        }
    }
}
