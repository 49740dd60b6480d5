// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer axis-aligned rectangles.

use core::fmt;

use smallvec::SmallVec;

/// Disjoint pieces produced by [`Rect::subtract`]; never more than four.
pub type Fragments = SmallVec<[Rect; 4]>;

/// An integer axis-aligned rectangle in pixel space.
///
/// A rectangle covers the half-open ranges `x..x + width` and `y..y + height`.
/// Width and height are never negative: constructors clamp negative extents to
/// zero. Any rectangle with zero area is *empty* and means "nothing"; all empty
/// rectangles behave identically in the set operations, whatever their origin.
///
/// Edges are computed in `i64` so that sums near the `i32` limits do not wrap.
///
/// There is no implicit infinity. Operations that produce an unbounded plane
/// (a solid color source, for example) report [`Rect::INFINITE`] and callers
/// check for it with [`Rect::is_infinite`].
///
/// ```rust
/// use understory_region::Rect;
///
/// let a = Rect::new(0, 0, 10, 10);
/// let b = Rect::new(5, 5, 10, 10);
/// assert_eq!(a.intersect(b), Rect::new(5, 5, 5, 5));
/// assert_eq!(a.union(b), Rect::new(0, 0, 15, 15));
/// assert!(Rect::new(3, 3, -4, 2).is_empty());
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Rect {
    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Sentinel for an unbounded plane.
    ///
    /// Its edges sit well inside the `i32` range so that unions and
    /// intersections with ordinary rectangles stay representable.
    pub const INFINITE: Self = Self {
        x: i32::MIN / 2,
        y: i32::MIN / 2,
        width: i32::MAX,
        height: i32::MAX,
    };

    /// Creates a rectangle; negative `width` or `height` clamp to zero.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Creates a rectangle from its top-left corner and exclusive bottom-right
    /// corner. Inverted corners produce an empty rectangle.
    ///
    /// ```rust
    /// use understory_region::Rect;
    ///
    /// assert_eq!(Rect::from_corners(2, 3, 6, 4), Rect::new(2, 3, 4, 1));
    /// assert!(Rect::from_corners(6, 3, 2, 4).is_empty());
    /// ```
    #[must_use]
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::from_edges(x0.into(), y0.into(), x1.into(), y1.into())
    }

    /// Builds a rectangle from wide edges, saturating into the `i32` range.
    pub(crate) fn from_edges(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        let x = clamp_i32(x0);
        let y = clamp_i32(y0);
        Self::new(
            x,
            y,
            clamp_i32(x1 - i64::from(x)),
            clamp_i32(y1 - i64::from(y)),
        )
    }

    /// Left edge.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Width, never negative.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height, never negative.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn x1(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn y1(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns `true` if this is the [`Rect::INFINITE`] sentinel.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        *self == Self::INFINITE
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        u64::from(self.width.unsigned_abs()) * u64::from(self.height.unsigned_abs())
    }

    /// Smallest rectangle containing both; empty operands are ignored.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if other.is_empty() {
            return if self.is_empty() { Self::EMPTY } else { self };
        }
        if self.is_empty() {
            return other;
        }
        Self::from_edges(
            i64::from(self.x.min(other.x)),
            i64::from(self.y.min(other.y)),
            self.x1().max(other.x1()),
            self.y1().max(other.y1()),
        )
    }

    /// Overlap of both rectangles, or [`Rect::EMPTY`] if they are disjoint.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.x1().min(other.x1());
        let y1 = self.y1().min(other.y1());
        if x1 <= i64::from(x0) || y1 <= i64::from(y0) {
            return Self::EMPTY;
        }
        Self::from_edges(x0.into(), y0.into(), x1, y1)
    }

    /// Returns `true` if the rectangles share at least one pixel.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(*other).is_empty()
    }

    /// Returns `true` if the pixel at `(px, py)` lies inside.
    #[must_use]
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        !self.is_empty()
            && px >= self.x
            && py >= self.y
            && i64::from(px) < self.x1()
            && i64::from(py) < self.y1()
    }

    /// Returns `true` if every pixel of `other` lies inside `self`.
    ///
    /// An empty `other` is contained in everything.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        !self.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.x1() <= self.x1()
            && other.y1() <= self.y1()
    }

    /// Pixels of `self` not covered by `other`, as up to four disjoint pieces.
    ///
    /// The pieces are a full-width band above the overlap, a full-width band
    /// below it, then the left and right slivers beside it.
    ///
    /// ```rust
    /// use understory_region::Rect;
    ///
    /// let pieces = Rect::new(0, 0, 10, 10).subtract(Rect::new(2, 2, 4, 4));
    /// assert_eq!(pieces.len(), 4);
    /// let area: u64 = pieces.iter().map(|r| r.area()).sum();
    /// assert_eq!(area, 100 - 16);
    /// ```
    #[must_use]
    pub fn subtract(self, other: Self) -> Fragments {
        let mut out = Fragments::new();
        if self.is_empty() {
            return out;
        }
        let hole = self.intersect(other);
        if hole.is_empty() {
            out.push(self);
            return out;
        }
        let (x0, y0) = (i64::from(self.x), i64::from(self.y));
        let (x1, y1) = (self.x1(), self.y1());
        let (hx0, hy0) = (i64::from(hole.x), i64::from(hole.y));
        let (hx1, hy1) = (hole.x1(), hole.y1());
        for piece in [
            Self::from_edges(x0, y0, x1, hy0),
            Self::from_edges(x0, hy1, x1, y1),
            Self::from_edges(x0, hy0, hx0, hy1),
            Self::from_edges(hx1, hy0, x1, hy1),
        ] {
            if !piece.is_empty() {
                out.push(piece);
            }
        }
        out
    }

    /// Moves the rectangle by `(dx, dy)`, saturating at the `i32` limits.
    ///
    /// The infinite sentinel stays infinite.
    #[must_use]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        if self.is_infinite() || self.is_empty() {
            return self;
        }
        let x = clamp_i32(i64::from(self.x) + i64::from(dx));
        let y = clamp_i32(i64::from(self.y) + i64::from(dy));
        Self::new(x, y, self.width, self.height)
    }

    /// Grows every side by `dx` horizontally and `dy` vertically.
    ///
    /// Negative amounts shrink the rectangle, down to empty. Empty and
    /// infinite rectangles are returned unchanged.
    ///
    /// ```rust
    /// use understory_region::Rect;
    ///
    /// assert_eq!(Rect::new(10, 10, 4, 4).inflate(2, 1), Rect::new(8, 9, 8, 6));
    /// assert!(Rect::new(10, 10, 4, 4).inflate(-2, 0).is_empty());
    /// ```
    #[must_use]
    pub fn inflate(self, dx: i32, dy: i32) -> Self {
        if self.is_infinite() || self.is_empty() {
            return self;
        }
        let (dx, dy) = (i64::from(dx), i64::from(dy));
        Self::from_edges(
            i64::from(self.x) - dx,
            i64::from(self.y) - dy,
            self.x1() + dx,
            self.y1() + dy,
        )
    }

    /// Splits into a left part `offset` pixels wide and the remainder.
    ///
    /// `offset` is clamped to `0..=width`, so one side may be empty.
    #[must_use]
    pub fn split_x(self, offset: i32) -> (Self, Self) {
        let left = offset.clamp(0, self.width);
        (
            Self::new(self.x, self.y, left, self.height),
            Self::from_edges(
                i64::from(self.x) + i64::from(left),
                self.y.into(),
                self.x1(),
                self.y1(),
            ),
        )
    }

    /// Splits into a top part `offset` pixels tall and the remainder.
    ///
    /// `offset` is clamped to `0..=height`, so one side may be empty.
    #[must_use]
    pub fn split_y(self, offset: i32) -> (Self, Self) {
        let top = offset.clamp(0, self.height);
        (
            Self::new(self.x, self.y, self.width, top),
            Self::from_edges(
                self.x.into(),
                i64::from(self.y) + i64::from(top),
                self.x1(),
                self.y1(),
            ),
        )
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            return f.write_str("Rect(INFINITE)");
        }
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to the i32 range first"
)]
fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
