//! Changed-region tracking.
//!
//! A [`Region`] is a set of pixels described by non-overlapping rectangles.
//! The rectangles are kept in a canonical banded form: the region is cut into
//! horizontal bands, each band holds sorted disjoint spans, and vertically
//! adjacent bands with identical spans are merged. Two regions covering the
//! same pixels therefore compare equal.

use crate::geometry::{Rect, Vector};

/// A set of rectangles recording which pixels changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.set_rect(rect);
        region
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The canonical rectangles, ordered top to bottom, then left to right.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rects.clear();
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    pub fn add_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.rects.push(rect);
        self.normalize();
    }

    pub fn add_rects(&mut self, rects: &[Rect]) {
        self.rects.extend(rects.iter().filter(|r| !r.is_empty()));
        self.normalize();
    }

    pub fn add_region(&mut self, region: &Region) {
        self.add_rects(&region.rects);
    }

    pub fn intersect_with_rect(&mut self, rect: &Rect) {
        for r in self.rects.iter_mut() {
            r.intersect_with(rect);
        }
        self.normalize();
    }

    pub fn intersect_with(&mut self, region: &Region) {
        let mut result = Vec::new();
        for a in &self.rects {
            for b in &region.rects {
                let r = a.intersection(b);
                if !r.is_empty() {
                    result.push(r);
                }
            }
        }
        self.rects = result;
        self.normalize();
    }

    pub fn subtract_rect(&mut self, rect: &Rect) {
        if rect.is_empty() {
            return;
        }

        let mut result = Vec::with_capacity(self.rects.len());
        for r in &self.rects {
            let overlap = r.intersection(rect);
            if overlap.is_empty() {
                result.push(*r);
                continue;
            }

            // Above and below the overlap span the full width, left and right
            // pieces only the overlap's rows.
            let pieces = [
                Rect::make_ltrb(r.left(), r.top(), r.right(), overlap.top()),
                Rect::make_ltrb(r.left(), overlap.bottom(), r.right(), r.bottom()),
                Rect::make_ltrb(r.left(), overlap.top(), overlap.left(), overlap.bottom()),
                Rect::make_ltrb(overlap.right(), overlap.top(), r.right(), overlap.bottom()),
            ];
            result.extend(pieces.into_iter().filter(|p| !p.is_empty()));
        }
        self.rects = result;
        self.normalize();
    }

    pub fn subtract(&mut self, region: &Region) {
        for r in &region.rects {
            self.subtract_rect(r);
        }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for r in self.rects.iter_mut() {
            r.translate(dx, dy);
        }
    }

    pub fn translate_by(&mut self, d: Vector) {
        self.translate(d.x, d.y);
    }

    pub fn swap(&mut self, other: &mut Region) {
        std::mem::swap(&mut self.rects, &mut other.rects);
    }

    pub fn contains_point(&self, point: Vector) -> bool {
        self.rects.iter().any(|r| r.contains(point))
    }

    /// Total number of pixels covered.
    pub fn area(&self) -> i64 {
        self.rects
            .iter()
            .map(|r| r.width() as i64 * r.height() as i64)
            .sum()
    }

    fn normalize(&mut self) {
        self.rects.retain(|r| !r.is_empty());
        if self.rects.len() <= 1 {
            return;
        }

        let mut edges: Vec<i32> = self
            .rects
            .iter()
            .flat_map(|r| [r.top(), r.bottom()])
            .collect();
        edges.sort_unstable();
        edges.dedup();

        // (top, bottom, spans) per band.
        let mut bands: Vec<(i32, i32, Vec<(i32, i32)>)> = Vec::new();
        for pair in edges.windows(2) {
            let (top, bottom) = (pair[0], pair[1]);

            let mut spans: Vec<(i32, i32)> = self
                .rects
                .iter()
                .filter(|r| r.top() <= top && r.bottom() >= bottom)
                .map(|r| (r.left(), r.right()))
                .collect();
            if spans.is_empty() {
                continue;
            }
            spans.sort_unstable();

            let mut merged: Vec<(i32, i32)> = Vec::with_capacity(spans.len());
            for (left, right) in spans {
                match merged.last_mut() {
                    Some(last) if left <= last.1 => last.1 = last.1.max(right),
                    _ => merged.push((left, right)),
                }
            }

            match bands.last_mut() {
                Some(last) if last.1 == top && last.2 == merged => last.1 = bottom,
                _ => bands.push((top, bottom, merged)),
            }
        }

        self.rects = bands
            .into_iter()
            .flat_map(|(top, bottom, spans)| {
                spans
                    .into_iter()
                    .map(move |(left, right)| Rect::make_ltrb(left, top, right, bottom))
            })
            .collect();
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_overlapping_rects_is_canonical() {
        let mut a = Region::new();
        a.add_rect(Rect::make_xywh(0, 0, 10, 10));
        a.add_rect(Rect::make_xywh(5, 5, 10, 10));

        let mut b = Region::new();
        b.add_rect(Rect::make_xywh(5, 5, 10, 10));
        b.add_rect(Rect::make_xywh(0, 0, 10, 10));

        assert_eq!(a, b);
        assert_eq!(a.area(), 100 + 100 - 25);
    }

    #[test]
    fn test_adjacent_rects_merge() {
        let mut region = Region::new();
        region.add_rect(Rect::make_xywh(0, 0, 5, 5));
        region.add_rect(Rect::make_xywh(5, 0, 5, 5));
        region.add_rect(Rect::make_xywh(0, 5, 10, 5));
        assert_eq!(region.rects(), &[Rect::make_xywh(0, 0, 10, 10)]);
    }

    #[test]
    fn test_add_region() {
        let mut region = Region::from_rect(Rect::make_xywh(0, 0, 4, 4));
        let mut other = Region::from_rect(Rect::make_xywh(2, 2, 4, 4));
        other.add_rect(Rect::make_xywh(10, 0, 2, 2));
        region.add_region(&other);

        assert_eq!(region.area(), 16 + 16 - 4 + 4);
        assert!(region.contains_point(Vector::new(5, 5)));
        assert!(region.contains_point(Vector::new(11, 1)));
        assert!(!region.contains_point(Vector::new(5, 0)));

        region.add_region(&Region::new());
        assert_eq!(region.area(), 32);
    }

    #[test]
    fn test_intersect_with_rect() {
        let mut region = Region::from_rect(Rect::make_xywh(0, 0, 10, 10));
        region.add_rect(Rect::make_xywh(20, 20, 5, 5));
        region.intersect_with_rect(&Rect::make_xywh(5, 5, 20, 20));

        let mut expected = Region::from_rect(Rect::make_xywh(5, 5, 5, 5));
        expected.add_rect(Rect::make_xywh(20, 20, 5, 5));
        assert_eq!(region, expected);
    }

    #[test]
    fn test_intersect_with_region() {
        let mut a = Region::from_rect(Rect::make_xywh(0, 0, 10, 10));
        let mut b = Region::from_rect(Rect::make_xywh(5, 0, 10, 3));
        b.add_rect(Rect::make_xywh(0, 8, 3, 10));
        a.intersect_with(&b);

        let mut expected = Region::from_rect(Rect::make_xywh(5, 0, 5, 3));
        expected.add_rect(Rect::make_xywh(0, 8, 3, 2));
        assert_eq!(a, expected);
    }

    #[test]
    fn test_subtract_hole() {
        let mut region = Region::from_rect(Rect::make_xywh(0, 0, 10, 10));
        region.subtract_rect(&Rect::make_xywh(3, 3, 4, 4));

        assert_eq!(region.area(), 100 - 16);
        assert!(!region.contains_point(Vector::new(5, 5)));
        assert!(region.contains_point(Vector::new(2, 5)));
        assert!(region.contains_point(Vector::new(7, 5)));
        assert!(region.contains_point(Vector::new(5, 9)));
    }

    #[test]
    fn test_subtract_everything() {
        let mut region = Region::from_rect(Rect::make_xywh(0, 0, 10, 10));
        region.subtract(&Region::from_rect(Rect::make_xywh(-1, -1, 12, 12)));
        assert!(region.is_empty());
    }

    #[test]
    fn test_translate() {
        let mut region = Region::from_rect(Rect::make_xywh(0, 0, 2, 2));
        region.translate(3, -1);
        assert_eq!(region.rects(), &[Rect::make_xywh(3, -1, 2, 2)]);
    }

    #[test]
    fn test_swap() {
        let mut a = Region::from_rect(Rect::make_xywh(0, 0, 2, 2));
        let mut b = Region::new();
        a.swap(&mut b);
        assert!(a.is_empty());
        assert_eq!(b.rects(), &[Rect::make_xywh(0, 0, 2, 2)]);
    }

    #[test]
    fn test_empty_rect_is_ignored() {
        let mut region = Region::new();
        region.add_rect(Rect::make_xywh(1, 1, 0, 5));
        assert!(region.is_empty());
        assert!(Region::from_rect(Rect::default()).is_empty());
    }
}
