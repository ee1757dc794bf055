//! Zero-copy crops of frames.

use tracing::debug;

use crate::frame::Frame;
use crate::geometry::Rect;

/// Crops `frame` to `rect`, given in the frame's own buffer coordinates.
///
/// `rect` is clamped to the frame first. Returns `None` if nothing is left,
/// and `frame` unchanged if the whole frame is left. Otherwise the result
/// owns `frame` and exposes the clamped area of its buffer without copying:
/// rows keep the source stride. The metadata moves to the result, with
/// `top_left` shifted and the updated region clipped to the crop.
pub fn create_cropped_frame(frame: Frame, rect: &Rect) -> Option<Frame> {
    let bounds = Rect::make_size(frame.size());
    let intersection = bounds.intersection(rect);
    if intersection.is_empty() {
        return None;
    }
    if intersection == bounds {
        return Some(frame);
    }

    debug!(size = %frame.size(), crop = %intersection, "Cropping frame");

    let mut cropped = frame.into_view(&intersection);
    let info = cropped.info_mut();
    info.top_left = info.top_left + intersection.top_left();
    info.updated_region.intersect_with_rect(&intersection);
    info.updated_region.translate_by(-intersection.top_left());
    Some(cropped)
}
