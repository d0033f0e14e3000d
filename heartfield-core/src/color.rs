use core::fmt;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }
}

/// Formats as a CSS hex color, e.g. `#ff7a5a`
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Palette every particle picks its color from
pub const WARM_PALETTE: [Color; 6] = [
    Color::from_hex(0xff7a5a),
    Color::from_hex(0xff5f6d),
    Color::from_hex(0xff9a62),
    Color::from_hex(0xff4d4d),
    Color::from_hex(0xff8c42),
    Color::from_hex(0xffb070),
];
