//! Clockwise rotation of frames and of the coordinates inside them.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::frame::Frame;
use crate::geometry::{Rect, Size, Vector};
use crate::pixels::rotate_argb;

/// Clockwise rotation in 90 degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    R0,
    #[serde(rename = "90")]
    R90,
    #[serde(rename = "180")]
    R180,
    #[serde(rename = "270")]
    R270,
}

impl Rotation {
    /// Rotation angle in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }
}

/// The rotation that undoes `rotation`.
pub fn reverse_rotation(rotation: Rotation) -> Rotation {
    match rotation {
        Rotation::R0 => Rotation::R0,
        Rotation::R90 => Rotation::R270,
        Rotation::R180 => Rotation::R180,
        Rotation::R270 => Rotation::R90,
    }
}

/// Size of a `size` area after rotating it by `rotation`.
pub fn rotate_size(size: Size, rotation: Rotation) -> Size {
    match rotation {
        Rotation::R0 | Rotation::R180 => size,
        Rotation::R90 | Rotation::R270 => Size::new(size.height, size.width),
    }
}

/// Maps `rect` inside a `size` area to where it lands once the area is
/// rotated by `rotation`.
pub fn rotate_rect(rect: Rect, size: Size, rotation: Rotation) -> Rect {
    match rotation {
        Rotation::R0 => rect,
        Rotation::R90 => Rect::make_xywh(
            size.height - rect.bottom(),
            rect.left(),
            rect.height(),
            rect.width(),
        ),
        Rotation::R180 => Rect::make_xywh(
            size.width - rect.right(),
            size.height - rect.bottom(),
            rect.width(),
            rect.height(),
        ),
        Rotation::R270 => Rect::make_xywh(
            rect.top(),
            size.width - rect.right(),
            rect.height(),
            rect.width(),
        ),
    }
}

/// Writes `source_rect` of `source` into `target`, rotated by `rotation` and
/// moved by `target_offset`. The written rectangle is added to the target's
/// updated region. Nothing happens if that rectangle is empty.
///
/// # Panics
///
/// Panics if `source` does not contain `source_rect`, or if `target` does not
/// contain the rotated and offset rectangle.
pub fn rotate_frame(
    source: &Frame,
    source_rect: &Rect,
    rotation: Rotation,
    target_offset: Vector,
    target: &mut Frame,
) {
    let mut target_rect = rotate_rect(*source_rect, source.size(), rotation);
    target_rect.translate_by(target_offset);
    if target_rect.is_empty() {
        return;
    }

    assert!(
        Rect::make_size(source.size()).contains_rect(source_rect),
        "source rect {source_rect} is outside of frame {}",
        source.size()
    );
    assert!(
        Rect::make_size(target.size()).contains_rect(&target_rect),
        "target rect {target_rect} is outside of frame {}",
        target.size()
    );

    trace!(%source_rect, %target_rect, degrees = rotation.degrees(), "Rotating frame");

    let target_stride = target.stride();
    rotate_argb(
        source.data_at(source_rect.top_left()),
        source.stride(),
        target.data_at_mut(target_rect.top_left()),
        target_stride,
        source_rect.width() as usize,
        source_rect.height() as usize,
        rotation,
    );
    target.updated_region_mut().add_rect(target_rect);
}
