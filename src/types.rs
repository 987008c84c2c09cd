// Core value types shared by the surface, brushes and input handling.

use std::fmt;
use std::str::FromStr;

use crate::error::ColorParseError;

/// A position in surface pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation, `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Straight (non-premultiplied) sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Pack as 0x00RRGGBB, the layout minifb and the surface use. Alpha is dropped.
    pub const fn to_rgb_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn from_rgb_u32(px: u32) -> Self {
        Self::rgb(((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`, as a color picker would yield.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_owned()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_owned()));
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map(|n| n * 17);
        let bad = |_| ColorParseError::BadDigit(s.to_owned());

        match digits.len() {
            3 => Ok(Self::rgb(
                nibble(0).map_err(bad)?,
                nibble(1).map_err(bad)?,
                nibble(2).map_err(bad)?,
            )),
            6 => Ok(Self::rgb(byte(0).map_err(bad)?, byte(2).map_err(bad)?, byte(4).map_err(bad)?)),
            8 => Ok(Self {
                r: byte(0).map_err(bad)?,
                g: byte(2).map_err(bad)?,
                b: byte(4).map_err(bad)?,
                a: byte(6).map_err(bad)?,
            }),
            _ => Err(ColorParseError::BadLength(s.to_owned())),
        }
    }
}

/// On-screen bounding box of the drawing surface, in client coordinates.
/// May differ from the surface's pixel size when the window is resized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementBounds {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }
}
