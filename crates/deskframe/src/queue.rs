//! Double-buffered frame queue for capturers.

use tracing::{debug, warn};

use crate::frame::Frame;
use crate::geometry::Size;
use crate::FrameResult;

/// Number of frames a capturer cycles through.
pub const QUEUE_LENGTH: usize = 2;

/// Reusable frames for a capturer: the `current` frame being captured into
/// and the `previous` one, which consumers may still be reading through
/// shared handles.
///
/// Consumers should hold at most [`QUEUE_LENGTH`] frames from one queue and
/// release the oldest before the capturer moves on. A frame that is still
/// shared when its slot comes around again is replaced, never overwritten.
#[derive(Debug, Default)]
pub struct FrameQueue {
    frames: [Option<Frame>; QUEUE_LENGTH],
    current: usize,
    reallocations: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the current frame the previous one.
    pub fn move_to_next_frame(&mut self) {
        self.current = (self.current + 1) % QUEUE_LENGTH;
    }

    /// Replaces the current frame, dropping the old one.
    pub fn replace_current_frame(&mut self, frame: Frame) {
        self.frames[self.current] = Some(frame);
    }

    /// Drops every frame, e.g. after the screen size changed.
    pub fn reset(&mut self) {
        self.frames = Default::default();
        self.current = 0;
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames[self.current].as_ref()
    }

    pub fn current_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames[self.current].as_mut()
    }

    pub fn previous_frame(&self) -> Option<&Frame> {
        self.frames[(self.current + QUEUE_LENGTH - 1) % QUEUE_LENGTH].as_ref()
    }

    /// Returns a writable current frame of `size`.
    ///
    /// The existing frame is reused if it has the right size and no other
    /// handle shares its buffer. Otherwise `allocate` provides a new one.
    pub fn prepare_current_frame<F>(&mut self, size: Size, allocate: F) -> FrameResult<&mut Frame>
    where
        F: FnOnce(Size) -> FrameResult<Frame>,
    {
        let slot = &mut self.frames[self.current];
        let reusable = match slot.as_ref() {
            Some(frame) if frame.size() == size => {
                if frame.is_shared() {
                    warn!(%size, "Current frame is still shared, allocating a new one");
                    false
                } else {
                    true
                }
            }
            _ => false,
        };

        let frame = match slot.take() {
            Some(frame) if reusable => frame,
            _ => {
                self.reallocations += 1;
                debug!(%size, reallocations = self.reallocations, "Allocating queue frame");
                allocate(size)?
            }
        };
        Ok(slot.insert(frame))
    }

    /// Number of frames `prepare_current_frame` had to allocate.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}
