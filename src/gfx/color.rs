//! Linear RGB colors built from sRGB hex literals

/// A color in linear RGB space
///
/// Scene literals are written as sRGB hex codes (`0xb35f45`); lighting runs in
/// linear space, so [`Color::from_hex`] decodes the sRGB transfer curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::linear(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::linear(0.0, 0.0, 0.0);

    pub const fn linear(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decodes a `0xRRGGBB` sRGB literal into linear RGB
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Color scaled by `intensity`, padded with `w`
    pub fn premultiplied(&self, intensity: f32, w: f32) -> [f32; 4] {
        [self.r * intensity, self.g * intensity, self.b * intensity, w]
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_wgpu(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn extremes_are_unchanged() {
        assert_eq!(Color::from_hex(0xffffff), Color::WHITE);
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
    }

    #[test]
    fn channels_are_read_in_rgb_order() {
        let magenta = Color::from_hex(0xff00ff);
        assert_eq!(magenta, Color::linear(1.0, 0.0, 1.0));
        let yellow = Color::from_hex(0xffff00);
        assert_eq!(yellow, Color::linear(1.0, 1.0, 0.0));
    }

    #[test]
    fn mid_grey_decodes_to_linear() {
        let grey = Color::from_hex(0x808080);
        assert_relative_eq!(grey.r, 0.2158605, epsilon = 1e-5);
        assert_eq!(grey.r, grey.g);
    }

    #[test]
    fn premultiplied_scales_rgb_only() {
        let c = Color::linear(0.5, 1.0, 0.25).premultiplied(2.0, 7.0);
        assert_eq!(c, [1.0, 2.0, 0.5, 7.0]);
    }
}
