// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between [`Rect`] and `kurbo::Rect`.

use kurbo::common::FloatFuncs as _;

use crate::Rect;

impl From<Rect> for kurbo::Rect {
    fn from(rect: Rect) -> Self {
        if rect.is_empty() {
            return Self::ZERO;
        }
        Self::new(
            f64::from(rect.x()),
            f64::from(rect.y()),
            rect.x1() as f64,
            rect.y1() as f64,
        )
    }
}

impl Rect {
    /// Smallest integer rectangle covering every pixel touched by `rect`.
    ///
    /// Fractional edges round outwards and inverted input is normalized first.
    /// Non-finite input yields an empty rectangle.
    ///
    /// ```rust
    /// use understory_region::Rect;
    ///
    /// let r = Rect::covering(kurbo::Rect::new(0.5, 1.0, 3.2, 2.0));
    /// assert_eq!(r, Rect::new(0, 1, 4, 1));
    /// ```
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to int casts saturate and the edges are clamped afterwards"
    )]
    pub fn covering(rect: kurbo::Rect) -> Self {
        if !rect.is_finite() {
            return Self::EMPTY;
        }
        let rect = rect.abs();
        Self::from_edges(
            rect.x0.floor() as i64,
            rect.y0.floor() as i64,
            rect.x1.ceil() as i64,
            rect.y1.ceil() as i64,
        )
    }
}
