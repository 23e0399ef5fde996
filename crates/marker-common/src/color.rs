//! RGB colour values used by marker palettes and elements.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::MarkerError;

/// An opaque 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex colour string ("#RRGGBB" or "RRGGBB").
    pub fn from_hex(hex: &str) -> Result<Self, MarkerError> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(MarkerError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| MarkerError::InvalidColor(hex.to_string()))
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as "#RRGGBB".
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Pack into 0xRRGGBB.
    pub fn to_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Per-channel linear interpolation in 0-255 space, truncated toward zero.
    pub fn lerp(&self, end: Rgb, step: f32) -> Rgb {
        let channel = |start: u8, end: u8| -> u8 {
            let value = start as f32 + (end as f32 - start as f32) * step;
            value.clamp(0.0, 255.0) as u8
        };

        Rgb::new(
            channel(self.r, end.r),
            channel(self.g, end.g),
            channel(self.b, end.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Rgb::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = Rgb::from_hex("#3957BD").unwrap();
        assert_eq!(color, Rgb::new(57, 87, 189));
        assert_eq!(color.to_hex(), "#3957BD");
        assert_eq!(Rgb::from_hex("d9dbd0").unwrap(), Rgb::new(217, 219, 208));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Rgb::from_hex("#FFF").is_err());
        assert!(Rgb::from_hex("#GGGGGG").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn test_lerp_truncates() {
        let start = Rgb::new(0, 100, 255);
        let end = Rgb::new(255, 0, 0);
        let mid = start.lerp(end, 0.5);
        assert_eq!(mid, Rgb::new(127, 50, 127));
        assert_eq!(start.lerp(end, 0.0), start);
        assert_eq!(start.lerp(end, 1.0), end);
    }

    #[test]
    fn test_to_u32() {
        assert_eq!(Rgb::new(0x12, 0x34, 0x56).to_u32(), 0x123456);
    }
}
