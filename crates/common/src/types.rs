use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of a body inside its world.
///
/// Bodies are never removed during a run, so an id stays valid for the
/// lifetime of the world it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Packed `0x00RRGGBB` display color. Opaque to the physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x0000_0000);
    pub const WHITE: Color = Color(0x00FF_FFFF);
    pub const RED: Color = Color(0x00FF_0000);
    pub const GREEN: Color = Color(0x0000_FF00);
    pub const BLUE: Color = Color(0x0000_00FF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Channels as `[r, g, b]` bytes.
    pub const fn to_rgb(self) -> [u8; 3] {
        [self.r(), self.g(), self.b()]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0x00FF_FFFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_channels_round_trip() {
        let c = Color::rgb(0x12, 0x34, 0x56);
        assert_eq!(c.0, 0x0012_3456);
        assert_eq!(c.to_rgb(), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn named_colors_match_packed_layout() {
        assert_eq!(Color::RED.to_rgb(), [255, 0, 0]);
        assert_eq!(Color::GREEN.to_rgb(), [0, 255, 0]);
        assert_eq!(Color::BLUE.to_rgb(), [0, 0, 255]);
        assert_eq!(Color::WHITE.to_rgb(), [255, 255, 255]);
    }

    #[test]
    fn display_formats() {
        assert_eq!(BodyId(3).to_string(), "#3");
        assert_eq!(Color::RED.to_string(), "#ff0000");
    }
}
