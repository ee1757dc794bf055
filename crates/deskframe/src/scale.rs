//! DPI to scale-factor mapping.

use serde::{Deserialize, Serialize};

use crate::geometry::Vector;

/// DPI that corresponds to a scale factor of 1.0.
pub const STANDARD_DPI: f32 = 96.0;

/// The platform a frame was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    MacOs,
    ChromeOs,
    Linux,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// Whether logical and physical pixels diverge on this platform.
    pub fn scales_logical_pixels(&self) -> bool {
        matches!(self, Platform::MacOs | Platform::ChromeOs)
    }
}

/// Returns the scale from logical to physical pixels for a frame with `dpi`.
///
/// On Windows and Linux logical and physical pixels are the same, so the
/// result is always 1.0. Elsewhere the horizontal DPI is compared to
/// [`STANDARD_DPI`], but only when it is known and square.
pub fn scale_factor(dpi: Vector, platform: Platform) -> f32 {
    if platform.scales_logical_pixels() && !dpi.is_zero() && dpi.x == dpi.y {
        dpi.x as f32 / STANDARD_DPI
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_ignored_on_windows() {
        assert_eq!(scale_factor(Vector::new(192, 192), Platform::Windows), 1.0);
        assert_eq!(scale_factor(Vector::new(192, 192), Platform::Linux), 1.0);
    }

    #[test]
    fn test_scale_factor_on_mac() {
        assert_eq!(scale_factor(Vector::new(192, 192), Platform::MacOs), 2.0);
        assert_eq!(scale_factor(Vector::new(144, 144), Platform::ChromeOs), 1.5);
    }

    #[test]
    fn test_scale_factor_unknown_or_uneven_dpi() {
        assert_eq!(scale_factor(Vector::default(), Platform::MacOs), 1.0);
        assert_eq!(scale_factor(Vector::new(192, 96), Platform::MacOs), 1.0);
    }
}
