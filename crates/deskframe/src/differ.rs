//! Block-based detection of changed pixels between consecutive captures.
//!
//! Frames are compared in square blocks of [`DIFFER_BLOCK_SIZE`] pixels.
//! Dirty blocks next to each other in a block row are reported as one
//! rectangle; the last block of a row or column may be partial.

use tracing::debug;

use crate::frame::{Frame, BYTES_PER_PIXEL};
use crate::geometry::{Rect, Vector};
use crate::region::Region;

/// Edge length of a compared block, in pixels.
pub const DIFFER_BLOCK_SIZE: i32 = 32;

/// Returns true if the `width_bytes` by `height` areas at the start of the
/// two buffers differ.
pub fn block_difference(
    old: &[u8],
    old_stride: usize,
    new: &[u8],
    new_stride: usize,
    width_bytes: usize,
    height: usize,
) -> bool {
    (0..height).any(|row| {
        let old_row = &old[row * old_stride..][..width_bytes];
        let new_row = &new[row * new_stride..][..width_bytes];
        old_row != new_row
    })
}

/// Pixel bytes starting at the top-left pixel of a block row.
#[derive(Clone, Copy)]
struct Plane<'a> {
    data: &'a [u8],
    stride: usize,
}

impl<'a> Plane<'a> {
    fn at(frame: &'a Frame, pos: Vector) -> Self {
        Self {
            data: frame.data_at(pos),
            stride: frame.stride(),
        }
    }

    fn differs(&self, other: &Plane<'_>, x_offset: usize, width_bytes: usize, height: usize) -> bool {
        block_difference(
            &self.data[x_offset..],
            self.stride,
            &other.data[x_offset..],
            other.stride,
            width_bytes,
            height,
        )
    }
}

/// Compares one block row covering `row` and adds its dirty spans to `output`.
fn compare_row(old: Plane<'_>, new: Plane<'_>, row: &Rect, output: &mut Region) {
    let block_bytes = DIFFER_BLOCK_SIZE as usize * BYTES_PER_PIXEL;
    let height = row.height() as usize;
    let block_count = (row.width() - 1) / DIFFER_BLOCK_SIZE;
    let last_block_width = row.width() - block_count * DIFFER_BLOCK_SIZE;
    let block_left = |x: i32| row.left() + x * DIFFER_BLOCK_SIZE;

    let mut first_dirty: Option<i32> = None;
    for x in 0..block_count {
        if old.differs(&new, x as usize * block_bytes, block_bytes, height) {
            first_dirty.get_or_insert(x);
        } else if let Some(first) = first_dirty.take() {
            output.add_rect(Rect::make_ltrb(
                block_left(first),
                row.top(),
                block_left(x),
                row.bottom(),
            ));
        }
    }

    let last_dirty = old.differs(
        &new,
        block_count as usize * block_bytes,
        last_block_width as usize * BYTES_PER_PIXEL,
        height,
    );
    if last_dirty {
        let first = first_dirty.unwrap_or(block_count);
        output.add_rect(Rect::make_ltrb(
            block_left(first),
            row.top(),
            row.right(),
            row.bottom(),
        ));
    } else if let Some(first) = first_dirty {
        output.add_rect(Rect::make_ltrb(
            block_left(first),
            row.top(),
            block_left(block_count),
            row.bottom(),
        ));
    }
}

/// Adds the blocks of `rect` whose pixels differ between `old` and `new` to
/// `output`. `rect` is clamped to the frames first.
///
/// # Panics
///
/// Panics if the frames differ in size.
pub fn compare_frames(old: &Frame, new: &Frame, rect: &Rect, output: &mut Region) {
    assert!(
        old.size() == new.size(),
        "cannot compare frames of size {} and {}",
        old.size(),
        new.size()
    );
    let rect = rect.intersection(&Rect::make_size(old.size()));
    if rect.is_empty() {
        return;
    }

    let mut top = rect.top();
    while top < rect.bottom() {
        let bottom = (top + DIFFER_BLOCK_SIZE).min(rect.bottom());
        let start = Vector::new(rect.left(), top);
        compare_row(
            Plane::at(old, start),
            Plane::at(new, start),
            &Rect::make_ltrb(rect.left(), top, rect.right(), bottom),
            output,
        );
        top = bottom;
    }
}

/// Narrows the updated region of consecutive captures down to the blocks
/// that really changed.
///
/// The region a capturer sets on a frame is taken as a hint of where to
/// look. It is replaced with the dirty blocks found inside it by comparing
/// against the previous frame. The first frame, and the first one after a
/// size change, is marked as updated in full.
#[derive(Debug, Default)]
pub struct FrameDiffer {
    last_frame: Option<Frame>,
}

impl FrameDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites `frame`'s updated region and keeps a shared handle to it for
    /// the next comparison.
    pub fn process(&mut self, frame: &mut Frame) {
        if self
            .last_frame
            .as_ref()
            .is_some_and(|last| last.size() != frame.size())
        {
            debug!(size = %frame.size(), "Frame size changed, dropping previous frame");
            self.last_frame = None;
        }

        match &self.last_frame {
            Some(last) => {
                let mut updated = Region::new();
                for hint in frame.updated_region().rects() {
                    compare_frames(last, frame, hint, &mut updated);
                }
                *frame.updated_region_mut() = updated;
            }
            None => {
                let full = Rect::make_size(frame.size());
                frame.updated_region_mut().set_rect(full);
            }
        }

        self.last_frame = Some(frame.share());
    }

    /// Forgets the previous frame, so the next one is marked updated in full.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}
