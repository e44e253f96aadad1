//! Cell colors and the low/high height color ramp.

use serde::{Deserialize, Serialize};

/// Linear RGB color with channels in 0.0-1.0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear interpolation, `self + (other - self) * t`.
    /// `t` is clamped to 0.0-1.0.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Convert to 8-bit RGB for image output.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::rgb(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Two-stop color ramp used to tint cells by relative height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    /// Color at height 0
    pub low: Color,
    /// Color at max height
    pub high: Color,
}

impl ColorRamp {
    pub fn new(low: Color, high: Color) -> Self {
        Self { low, high }
    }

    /// Color at `ratio` along the ramp (clamped to 0.0-1.0).
    pub fn sample(&self, ratio: f32) -> Color {
        self.low.lerp(self.high, ratio)
    }
}

impl Default for ColorRamp {
    /// Red for the lowest cells, green for the highest.
    fn default() -> Self {
        Self::new(Color::RED, Color::GREEN)
    }
}
