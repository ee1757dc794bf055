//! Synthetic screen content.

use deskframe::{Frame, Rect, Region, RgbaColor, Size, Vector, BYTES_PER_PIXEL};

/// A block moving diagonally across a black screen.
pub struct TestPattern {
    block: Size,
    step: i32,
    color: RgbaColor,
}

impl TestPattern {
    pub fn new(block: Size, step: i32) -> Self {
        Self {
            block,
            step,
            color: RgbaColor::opaque(0x20, 0xc0, 0xf0),
        }
    }

    pub fn color(&self) -> RgbaColor {
        self.color
    }

    /// Where the block is drawn in frame `sequence`.
    pub fn block_rect(&self, frame_size: Size, sequence: u64) -> Rect {
        let span_x = i64::from((frame_size.width - self.block.width).max(1));
        let span_y = i64::from((frame_size.height - self.block.height).max(1));
        let travel = sequence as i64 * i64::from(self.step);
        let rect = Rect::make_xywh(
            (travel % span_x) as i32,
            ((travel / 2) % span_y) as i32,
            self.block.width,
            self.block.height,
        );
        rect.intersection(&Rect::make_size(frame_size))
    }

    /// Draws frame `sequence` and returns what changed since the frame before.
    pub fn paint(&self, frame: &mut Frame, sequence: u64) -> Region {
        frame.clear_pixels();
        let block = self.block_rect(frame.size(), sequence);
        fill(frame, &block, self.color);

        let mut changed = Region::from_rect(block);
        if let Some(previous) = sequence.checked_sub(1) {
            changed.add_rect(self.block_rect(frame.size(), previous));
        }
        changed
    }
}

fn fill(frame: &mut Frame, rect: &Rect, color: RgbaColor) {
    let pixel = color.to_bgra_bytes();
    let row_bytes = rect.width() as usize * BYTES_PER_PIXEL;
    for y in rect.top()..rect.bottom() {
        let start = frame.pixel_offset(Vector::new(rect.left(), y));
        let row = &mut frame.data_mut()[start..start + row_bytes];
        for dst in row.chunks_exact_mut(BYTES_PER_PIXEL) {
            dst.copy_from_slice(&pixel);
        }
    }
}
