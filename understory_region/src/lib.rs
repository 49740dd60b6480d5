// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Region: integer rectangles and rectangle-list regions.
//!
//! This crate is the geometric vocabulary of the Understory evaluation stack:
//!
//! - [`Rect`]: an integer axis-aligned rectangle with union, intersection,
//!   containment, subtraction and band splitting. Zero-area rectangles mean
//!   "nothing" and an explicit [`Rect::INFINITE`] sentinel stands for an
//!   unbounded plane.
//! - [`Region`]: a point set stored as an ordered list of disjoint rectangles,
//!   used for valid-pixel bookkeeping, accumulated damage and pending work.
//!
//! ## Example
//!
//! ```rust
//! use understory_region::{Rect, Region};
//!
//! // Pixels already rendered.
//! let mut valid = Region::new();
//! valid.add_rect(Rect::new(0, 0, 64, 64));
//!
//! // A request for a larger area only needs the uncovered part.
//! let mut todo = Region::from_rect(Rect::new(0, 0, 128, 64));
//! todo.subtract_region(&valid);
//! assert!(todo.covers_same(&Region::from_rect(Rect::new(64, 0, 64, 64))));
//!
//! // Damage removes pixels from the valid set again.
//! valid.subtract_rect(Rect::new(16, 16, 8, 8));
//! assert_eq!(valid.area(), 64 * 64 - 64);
//! ```
//!
//! ## Algebra
//!
//! Every operation is total. Empty rectangles are identities for union and
//! no-ops for region updates. Union and intersection are commutative and
//! associative on covered pixels; regions are compared by coverage with
//! [`Region::covers_same`], not by their rectangle lists.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.
//!
//! ## Features
//!
//! - `kurbo`: conversions between [`Rect`] and `kurbo::Rect`.

#![no_std]

extern crate alloc;

#[cfg(feature = "kurbo")]
mod kurbo_interop;
mod rect;
mod region;

pub use rect::{Fragments, Rect};
pub use region::{Overlap, Region};
