//! A single BGRA pixel value.

/// A color stored in the same BGRA byte order as frame data.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbaColor {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub alpha: u8,
}

impl RgbaColor {
    pub const fn new(blue: u8, green: u8, red: u8, alpha: u8) -> Self {
        Self {
            blue,
            green,
            red,
            alpha,
        }
    }

    /// An opaque color.
    pub const fn opaque(blue: u8, green: u8, red: u8) -> Self {
        Self::new(blue, green, red, 0xff)
    }

    /// Reads the first four bytes of `bgra`, e.g. a pixel inside frame data.
    pub fn from_bgra_bytes(bgra: &[u8]) -> Self {
        Self::new(bgra[0], bgra[1], bgra[2], bgra[3])
    }

    /// Inverse of [`RgbaColor::to_u32`].
    pub const fn from_u32(bgra: u32) -> Self {
        let [blue, green, red, alpha] = bgra.to_le_bytes();
        Self::new(blue, green, red, alpha)
    }

    /// Packs the color so that its in-memory byte order is B, G, R, A.
    pub const fn to_u32(&self) -> u32 {
        u32::from_le_bytes([self.blue, self.green, self.red, self.alpha])
    }

    pub const fn to_bgra_bytes(&self) -> [u8; 4] {
        [self.blue, self.green, self.red, self.alpha]
    }
}

/// Capturers disagree on opaque alpha: some report 0, others 255.
fn alpha_equals(i: u8, j: u8) -> bool {
    i == j || ((i == 0 || i == 255) && (j == 0 || j == 255))
}

impl PartialEq for RgbaColor {
    fn eq(&self, other: &Self) -> bool {
        self.blue == other.blue
            && self.green == other.green
            && self.red == other.red
            && alpha_equals(self.alpha, other.alpha)
    }
}

impl Eq for RgbaColor {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_conversion_keeps_byte_order() {
        let color = RgbaColor::new(1, 2, 3, 4);
        assert_eq!(color.to_u32().to_le_bytes(), [1, 2, 3, 4]);
        assert_eq!(RgbaColor::from_u32(color.to_u32()).alpha, 4);
    }

    #[test]
    fn test_from_bgra_bytes() {
        let pixel = [10u8, 20, 30, 40, 99];
        let color = RgbaColor::from_bgra_bytes(&pixel);
        assert_eq!(color.to_bgra_bytes(), [10, 20, 30, 40]);
    }

    #[test]
    fn test_opaque_alpha_equality() {
        assert_eq!(RgbaColor::new(1, 2, 3, 0), RgbaColor::opaque(1, 2, 3));
        assert_ne!(RgbaColor::new(1, 2, 3, 128), RgbaColor::opaque(1, 2, 3));
        assert_ne!(RgbaColor::opaque(1, 2, 4), RgbaColor::opaque(1, 2, 3));
    }
}
