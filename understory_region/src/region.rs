// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regions: point sets stored as lists of disjoint rectangles.

use alloc::vec::Vec;
use core::slice;

use crate::Rect;

/// How a rectangle relates to a [`Region`], see [`Region::rect_in`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Overlap {
    /// The rectangle lies entirely inside the region.
    In,
    /// The rectangle shares no pixel with the region.
    Out,
    /// The rectangle is partly inside and partly outside.
    Part,
}

/// A set of pixels stored as an ordered list of disjoint, non-empty rectangles.
///
/// Regions are created empty, grow with [`add_rect`](Self::add_rect) and
/// shrink with [`subtract_rect`](Self::subtract_rect). Two regions covering
/// the same pixels may store different rectangle lists, so `Region` does not
/// implement `PartialEq`; compare coverage with
/// [`covers_same`](Self::covers_same).
///
/// Adding a rectangle only stores the parts not already covered, then merges
/// neighbours that share a full edge, so repeated unions of the same area do
/// not grow the list.
///
/// ```rust
/// use understory_region::{Overlap, Rect, Region};
///
/// let mut region = Region::new();
/// region.add_rect(Rect::new(0, 0, 10, 10));
/// region.add_rect(Rect::new(10, 0, 10, 10));
/// assert_eq!(region.len(), 1);
/// assert_eq!(region.area(), 200);
///
/// region.subtract_rect(Rect::new(5, 5, 10, 10));
/// assert_eq!(region.area(), 200 - 50);
/// assert_eq!(region.rect_in(Rect::new(0, 0, 5, 5)), Overlap::In);
/// assert_eq!(region.rect_in(Rect::new(6, 6, 2, 2)), Overlap::Out);
/// assert_eq!(region.rect_in(Rect::new(0, 0, 10, 10)), Overlap::Part);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering `rect`, or an empty one if `rect` is empty.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.add_rect(rect);
        region
    }

    /// Returns `true` if the region covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Number of stored rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Iterates the stored rectangles.
    ///
    /// The order is stable as long as the region is not mutated, and the
    /// iterator can be cloned to restart it.
    pub fn rects(&self) -> core::iter::Copied<slice::Iter<'_, Rect>> {
        self.rects.iter().copied()
    }

    /// The stored rectangles as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Rect] {
        &self.rects
    }

    /// Smallest rectangle enclosing the region.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.rects.iter().fold(Rect::EMPTY, |acc, r| acc.union(*r))
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Returns `true` if the pixel at `(x, y)` is covered.
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    /// Returns `true` if every pixel of `rect` is covered.
    ///
    /// An empty `rect` is contained in every region.
    #[must_use]
    pub fn contains_rect(&self, rect: Rect) -> bool {
        self.rect_in(rect) == Overlap::In || rect.is_empty()
    }

    /// Classifies `rect` against the region.
    ///
    /// An empty rectangle is reported as [`Overlap::Out`].
    #[must_use]
    pub fn rect_in(&self, rect: Rect) -> Overlap {
        if rect.is_empty() {
            return Overlap::Out;
        }
        let covered: u64 = self.rects.iter().map(|r| r.intersect(rect).area()).sum();
        if covered == 0 {
            Overlap::Out
        } else if covered == rect.area() {
            Overlap::In
        } else {
            Overlap::Part
        }
    }

    /// Adds the pixels of `rect`. Returns `true` if the coverage grew.
    pub fn add_rect(&mut self, rect: Rect) -> bool {
        if rect.is_empty() {
            return false;
        }
        let fresh = self.uncovered_parts(rect);
        if fresh.is_empty() {
            return false;
        }
        for piece in fresh {
            self.merge_in(piece);
        }
        true
    }

    /// Adds every pixel of `other`.
    pub fn add_region(&mut self, other: &Self) {
        for rect in other.rects() {
            self.add_rect(rect);
        }
    }

    /// Removes the pixels of `rect`. Returns `true` if anything was removed.
    pub fn subtract_rect(&mut self, rect: Rect) -> bool {
        if rect.is_empty() || !self.rects.iter().any(|r| r.overlaps(&rect)) {
            return false;
        }
        let mut fragments = Vec::new();
        self.rects.retain(|r| {
            if r.overlaps(&rect) {
                fragments.extend(r.subtract(rect));
                false
            } else {
                true
            }
        });
        for fragment in fragments {
            self.merge_in(fragment);
        }
        true
    }

    /// Removes every pixel of `other`.
    pub fn subtract_region(&mut self, other: &Self) {
        for rect in other.rects() {
            self.subtract_rect(rect);
        }
    }

    /// The part of the region inside `rect`.
    #[must_use]
    pub fn intersect_rect(&self, rect: Rect) -> Self {
        let rects = self
            .rects
            .iter()
            .map(|r| r.intersect(rect))
            .filter(|r| !r.is_empty())
            .collect();
        Self { rects }
    }

    /// The pixels covered by both regions.
    #[must_use]
    pub fn intersect_region(&self, other: &Self) -> Self {
        let mut rects = Vec::new();
        for a in &self.rects {
            rects.extend(
                other
                    .rects
                    .iter()
                    .map(|b| a.intersect(*b))
                    .filter(|r| !r.is_empty()),
            );
        }
        Self { rects }
    }

    /// Removes every pixel.
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Moves every rectangle by `(dx, dy)`.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for r in &mut self.rects {
            *r = r.translate(dx, dy);
        }
    }

    /// Returns `true` if both regions cover exactly the same pixels.
    #[must_use]
    pub fn covers_same(&self, other: &Self) -> bool {
        self.area() == other.area() && self.intersect_region(other).area() == self.area()
    }

    /// Parts of `rect` not yet covered by the region, pairwise disjoint.
    fn uncovered_parts(&self, rect: Rect) -> Vec<Rect> {
        let mut pieces = Vec::from([rect]);
        for existing in &self.rects {
            if pieces.is_empty() {
                break;
            }
            if !existing.overlaps(&rect) {
                continue;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|p| p.subtract(*existing))
                .collect();
        }
        pieces
    }

    /// Stores `rect`, which must not overlap the region, joining it with
    /// neighbours that share a complete edge.
    ///
    /// Only the incoming rectangle is compared against the list, so one call
    /// is linear in the number of stored rectangles per join.
    fn merge_in(&mut self, mut rect: Rect) {
        loop {
            let neighbour = self
                .rects
                .iter()
                .enumerate()
                .find_map(|(idx, r)| join(*r, rect).map(|joined| (idx, joined)));
            let Some((idx, joined)) = neighbour else {
                break;
            };
            self.rects.remove(idx);
            rect = joined;
        }
        self.rects.push(rect);
    }
}

/// Union of `a` and `b` when they tile a rectangle exactly.
fn join(a: Rect, b: Rect) -> Option<Rect> {
    let same_columns = a.x() == b.x() && a.width() == b.width();
    let stacked = a.y1() == i64::from(b.y()) || b.y1() == i64::from(a.y());
    let same_rows = a.y() == b.y() && a.height() == b.height();
    let abutting = a.x1() == i64::from(b.x()) || b.x1() == i64::from(a.x());
    ((same_columns && stacked) || (same_rows && abutting)).then(|| a.union(b))
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl Extend<Rect> for Region {
    fn extend<I: IntoIterator<Item = Rect>>(&mut self, iter: I) {
        for rect in iter {
            self.add_rect(rect);
        }
    }
}

impl FromIterator<Rect> for Region {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut region = Self::new();
        region.extend(iter);
        region
    }
}
