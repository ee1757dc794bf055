//! Pixel buffers and frame transforms for screen capture.
//!
//! This crate provides the frame representation shared by capture backends
//! and their consumers, zero-copy cropping and sharing of frames, pixel
//! copies between frames placed on a scaled desktop, rotation, and cursor
//! shape reconstruction, along with block-based change detection and blank
//! frame detection for consecutive captures.

mod blank;
mod color;
mod cropped;
mod cursor;
mod differ;
mod error;
mod frame;
mod geometry;
mod pixels;
mod queue;
mod region;
mod rotation;
mod scale;
mod shared_memory;

pub use blank::{is_blank_frame, BlankDetector, BLANK_SAMPLE_STEP};
pub use color::RgbaColor;
pub use cropped::create_cropped_frame;
pub use cursor::{
    add_cursor_outline, create_mouse_cursor, has_alpha_channel, premultiply_alpha,
    reconstruct_alpha_from_mask, CursorBitmaps, MouseCursor,
};
pub use differ::{block_difference, compare_frames, FrameDiffer, DIFFER_BLOCK_SIZE};
pub use error::FrameError;
pub use frame::{CapturerId, Frame, FrameBuffer, FrameInfo, BYTES_PER_PIXEL};
pub use geometry::{Rect, Size, Vector};
pub use pixels::{copy_plane, rotate_argb};
pub use queue::{FrameQueue, QUEUE_LENGTH};
pub use region::Region;
pub use rotation::{reverse_rotation, rotate_frame, rotate_rect, rotate_size, Rotation};
pub use scale::{scale_factor, Platform, STANDARD_DPI};
pub use shared_memory::{
    LocalSharedMemory, LocalSharedMemoryFactory, NativeHandle, SharedMemory,
    SharedMemoryFactory, INVALID_HANDLE,
};

/// Result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;
