//! Damage regions.
//!
//! A [`Region`] is a set of mutually disjoint, non-empty rectangles. Adding a
//! rectangle only stores the parts not already covered, so the rectangles of a
//! region never overlap and its area is the sum of theirs.

use std::cmp::{max, min};

/// An axis-aligned rectangle in framebuffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: u16,
    /// Top edge.
    pub y: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

impl Rect {
    /// Creates a rectangle.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// One past the right edge.
    pub fn right(&self) -> u32 {
        u32::from(self.x) + u32::from(self.width)
    }

    /// One past the bottom edge.
    pub fn bottom(&self) -> u32 {
        u32::from(self.y) + u32::from(self.height)
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the pixel at (`x`, `y`) lies inside.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= u32::from(self.x) && x < self.right() && y >= u32::from(self.y) && y < self.bottom()
    }

    /// The overlapping part of two rectangles, if any.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = max(self.x, other.x);
        let top = max(self.y, other.y);
        let right = min(self.right(), other.right());
        let bottom = min(self.bottom(), other.bottom());

        if right <= u32::from(left) || bottom <= u32::from(top) {
            return None;
        }
        Some(Rect::new(
            left,
            top,
            (right - u32::from(left)) as u16,
            (bottom - u32::from(top)) as u16,
        ))
    }

    /// The parts of `self` not covered by `other`, as at most four disjoint
    /// rectangles.
    pub fn subtract(&self, other: &Rect) -> Vec<Rect> {
        let Some(hole) = self.intersect(other) else {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        };

        // pieces starting past the last addressable coordinate cover nothing
        let below = u16::try_from(hole.bottom())
            .ok()
            .map(|y| Rect::new(self.x, y, self.width, (self.bottom() - hole.bottom()) as u16));
        let right = u16::try_from(hole.right())
            .ok()
            .map(|x| Rect::new(x, hole.y, (self.right() - hole.right()) as u16, hole.height));

        let pieces = [
            // above
            Some(Rect::new(self.x, self.y, self.width, hole.y - self.y)),
            below,
            // left
            Some(Rect::new(self.x, hole.y, hole.x - self.x, hole.height)),
            right,
        ];
        pieces.into_iter().flatten().filter(|r| !r.is_empty()).collect()
    }
}

/// A set of disjoint rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// Creates an empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a region covering one rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.add_rect(rect);
        region
    }

    /// Builds a region from rectangles already known to be disjoint.
    pub(crate) fn from_disjoint(rects: Vec<Rect>) -> Self {
        let region = Self { rects };
        debug_assert!(region.is_disjoint());
        region
    }

    /// Adds the parts of `rect` not yet covered.
    pub fn add_rect(&mut self, rect: Rect) {
        let mut pieces = if rect.is_empty() { Vec::new() } else { vec![rect] };
        for existing in &self.rects {
            if pieces.is_empty() {
                return;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|piece| piece.subtract(existing))
                .collect();
        }
        self.rects.extend(pieces);
    }

    /// Adds every rectangle of `other`.
    pub fn union(&mut self, other: &Region) {
        for rect in other {
            self.add_rect(*rect);
        }
    }

    /// The part of the region inside `bounds`.
    pub fn intersect_rect(&self, bounds: &Rect) -> Region {
        Self {
            rects: self.rects.iter().filter_map(|r| r.intersect(bounds)).collect(),
        }
    }

    /// The rectangles, in insertion order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Iterates over the rectangles.
    pub fn iter(&self) -> std::slice::Iter<'_, Rect> {
        self.rects.iter()
    }

    /// Number of rectangles.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Whether the region covers nothing.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Smallest rectangle containing the whole region, clamped to the
    /// largest representable size.
    pub fn extents(&self) -> Option<Rect> {
        let first = self.rects.first()?;
        let (mut left, mut top) = (first.x, first.y);
        let (mut right, mut bottom) = (first.right(), first.bottom());
        for r in &self.rects[1..] {
            left = min(left, r.x);
            top = min(top, r.y);
            right = max(right, r.right());
            bottom = max(bottom, r.bottom());
        }
        Some(Rect::new(
            left,
            top,
            u16::try_from(right - u32::from(left)).unwrap_or(u16::MAX),
            u16::try_from(bottom - u32::from(top)).unwrap_or(u16::MAX),
        ))
    }

    /// Removes every rectangle.
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Whether no two rectangles overlap.
    pub fn is_disjoint(&self) -> bool {
        self.rects.iter().enumerate().all(|(i, a)| {
            self.rects[i + 1..].iter().all(|b| a.intersect(b).is_none())
        })
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a Rect;
    type IntoIter = std::slice::Iter<'a, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}

impl FromIterator<Rect> for Region {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut region = Region::new();
        for rect in iter {
            region.add_rect(rect);
        }
        region
    }
}
