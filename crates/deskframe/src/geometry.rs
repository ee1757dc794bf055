//! Integer geometry used to position frames on the desktop.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2-D integer offset. Used both as a point and as a displacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a screen, window or frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either extent is zero (or negative).
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Rect {
    pub const fn make_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn make_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::make_ltrb(x, y, x + width, y + height)
    }

    pub const fn make_wh(width: i32, height: i32) -> Self {
        Self::make_ltrb(0, 0, width, height)
    }

    pub const fn make_size(size: Size) -> Self {
        Self::make_wh(size.width, size.height)
    }

    pub const fn make_origin_size(origin: Vector, size: Size) -> Self {
        Self::make_xywh(origin.x, origin.y, size.width, size.height)
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn top_left(&self) -> Vector {
        Vector::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Compares only the extents, ignoring position.
    pub fn equals_size(&self, other: &Rect) -> bool {
        self.size() == other.size()
    }

    /// Returns true if `point` lies within the rectangle.
    pub fn contains(&self, point: Vector) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Returns true if `rect` lies within the boundaries of this rectangle.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        rect.left >= self.left
            && rect.right <= self.right
            && rect.top >= self.top
            && rect.bottom <= self.bottom
    }

    /// Shrinks to the intersection with `rect`. An empty result collapses to
    /// the zero rectangle.
    pub fn intersect_with(&mut self, rect: &Rect) {
        self.left = self.left.max(rect.left);
        self.top = self.top.max(rect.top);
        self.right = self.right.min(rect.right);
        self.bottom = self.bottom.min(rect.bottom);
        if self.is_empty() {
            *self = Rect::default();
        }
    }

    pub fn intersection(&self, rect: &Rect) -> Rect {
        let mut result = *self;
        result.intersect_with(rect);
        result
    }

    /// Grows to cover `rect`. An empty `self` is replaced, an empty `rect`
    /// is ignored.
    pub fn union_with(&mut self, rect: &Rect) {
        if self.is_empty() {
            *self = *rect;
            return;
        }
        if rect.is_empty() {
            return;
        }

        self.left = self.left.min(rect.left);
        self.top = self.top.min(rect.top);
        self.right = self.right.max(rect.right);
        self.bottom = self.bottom.max(rect.bottom);
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.left += dx;
        self.top += dy;
        self.right += dx;
        self.bottom += dy;
    }

    pub fn translate_by(&mut self, d: Vector) {
        self.translate(d.x, d.y);
    }

    pub fn translated(&self, d: Vector) -> Rect {
        let mut result = *self;
        result.translate_by(d);
        result
    }

    /// Moves each edge outwards by its offset. Negative offsets shrink. The
    /// result is not normalized.
    pub fn extend(&mut self, left_offset: i32, top_offset: i32, right_offset: i32, bottom_offset: i32) {
        self.left -= left_offset;
        self.top -= top_offset;
        self.right += right_offset;
        self.bottom += bottom_offset;
    }

    /// Scales the extents, keeping `left` and `top` in place.
    pub fn scale(&mut self, horizontal: f64, vertical: f64) {
        self.right += (self.width() as f64 * (horizontal - 1.0)).round() as i32;
        self.bottom += (self.height() as f64 * (vertical - 1.0)).round() as i32;
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {})",
            self.left, self.right, self.top, self.bottom
        )
    }
}
