//! Error types for the frame engine.

use thiserror::Error;

use crate::geometry::{Size, Vector};

/// Errors that can occur while creating frames or cursors.
///
/// Overlap misses are not errors (they come back as `None` / `false`), and
/// caller bugs such as out-of-bounds destination rectangles panic.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Heap allocation for the pixel buffer failed.
    #[error("Failed to allocate {bytes} bytes for frame")]
    AllocationFailed { bytes: usize },

    /// The shared memory factory could not provide a segment.
    #[error("Shared memory factory could not provide {bytes} bytes")]
    SharedMemoryUnavailable { bytes: usize },

    /// Frame dimensions are negative.
    #[error("Invalid frame size: {0}")]
    InvalidSize(Size),

    /// Stride is too small for the frame width.
    #[error("Stride {stride} is too small for width {width}")]
    InvalidStride { stride: usize, width: i32 },

    /// Backing buffer cannot hold the frame.
    #[error("Buffer too small: need {required} bytes, have {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Cursor bitmaps are malformed.
    #[error("Invalid cursor bitmap: {0}")]
    InvalidCursorBitmap(String),

    /// Cursor hotspot lies outside the cursor image.
    #[error("Hotspot {hotspot} outside of cursor image {size}")]
    HotspotOutOfBounds { hotspot: Vector, size: Size },
}
