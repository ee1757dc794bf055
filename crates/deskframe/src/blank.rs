//! Detection of blank frames.
//!
//! Some capture paths deliver frames filled with a single color until the
//! screen content becomes available. A frame is considered blank when a
//! sparse sample of its pixels all match the blank color.

use tracing::debug;

use crate::color::RgbaColor;
use crate::frame::Frame;
use crate::geometry::Vector;

/// Distance between two sampled pixels, counted in row-major order.
pub const BLANK_SAMPLE_STEP: i64 = 105;

fn is_blank_pixel(frame: &Frame, pos: Vector, blank: RgbaColor) -> bool {
    RgbaColor::from_bgra_bytes(frame.data_at(pos)) == blank
}

/// Samples every [`BLANK_SAMPLE_STEP`]th pixel plus the center one and
/// returns true if all of them equal `blank`. An empty frame is blank.
pub fn is_blank_frame(frame: &Frame, blank: RgbaColor) -> bool {
    let size = frame.size();
    if size.is_empty() {
        return true;
    }

    let width = i64::from(size.width);
    let pixels = width * i64::from(size.height);
    let sampled_blank = (0..pixels)
        .step_by(BLANK_SAMPLE_STEP as usize)
        .all(|i| {
            let pos = Vector::new((i % width) as i32, (i / width) as i32);
            is_blank_pixel(frame, pos, blank)
        });

    sampled_blank
        && is_blank_pixel(
            frame,
            Vector::new(size.width / 2, size.height / 2),
            blank,
        )
}

/// Holds back frames of a source until its first non-blank frame.
///
/// Frames are only sampled again when their updated region is not empty.
/// Once a non-blank frame was seen, every later frame passes unchecked.
#[derive(Debug)]
pub struct BlankDetector {
    blank: RgbaColor,
    is_first_frame: bool,
    last_frame_is_blank: bool,
    non_blank_frame_received: bool,
}

impl BlankDetector {
    pub fn new(blank: RgbaColor) -> Self {
        Self {
            blank,
            is_first_frame: true,
            last_frame_is_blank: false,
            non_blank_frame_received: false,
        }
    }

    /// Returns true if `frame` should be delivered.
    pub fn check(&mut self, frame: &Frame) -> bool {
        if self.non_blank_frame_received {
            return true;
        }

        if self.is_first_frame || !frame.updated_region().is_empty() {
            self.last_frame_is_blank = is_blank_frame(frame, self.blank);
            self.is_first_frame = false;
        }

        if self.last_frame_is_blank {
            debug!(size = %frame.size(), "Holding back blank frame");
            return false;
        }
        self.non_blank_frame_received = true;
        true
    }

    /// Starts over, e.g. after switching to another source.
    pub fn reset(&mut self) {
        self.is_first_frame = true;
        self.last_frame_is_blank = false;
        self.non_blank_frame_received = false;
    }
}
