// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered queue of rectangles waiting to be rendered.

use alloc::collections::VecDeque;

use log::trace;
use understory_region::{Rect, Region};

use crate::SplitPolicy;

/// FIFO of disjoint dirty rectangles.
///
/// Fresh requests are appended. When a rectangle is too large to render in
/// one step, the piece nearer the origin is taken and the remainder goes back
/// where the rectangle was, so one large request drains before anything
/// queued after it.
///
/// The queued area is kept as a [`Region`] next to the list and updated
/// with every edit.
#[derive(Clone, Debug, Default)]
pub(crate) struct DirtyQueue {
    rects: VecDeque<Rect>,
    area: Region,
}

impl DirtyQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Rect> + '_ {
        self.rects.iter().copied()
    }

    /// Appends `rect` unless it is empty. `rect` must not overlap the
    /// queued area.
    pub(crate) fn push_back(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.rects.push_back(rect);
            self.area.add_rect(rect);
        }
    }

    /// The queued area.
    pub(crate) fn region(&self) -> &Region {
        &self.area
    }

    pub(crate) fn clear(&mut self) {
        self.rects.clear();
        self.area.clear();
    }

    /// Removes `rect` from every queued rectangle. Surviving pieces keep the
    /// position of the rectangle they came from.
    pub(crate) fn remove_rect(&mut self, rect: Rect) {
        if !self.area.subtract_rect(rect) {
            return;
        }
        let old = core::mem::take(&mut self.rects);
        for queued in old {
            self.rects.extend(queued.subtract(rect));
        }
    }

    /// Returns `true` if a queued rectangle intersects `roi`, or if anything
    /// is queued when there is no `roi`.
    pub(crate) fn has_work_in(&self, roi: Option<Rect>) -> bool {
        match roi {
            None => !self.rects.is_empty(),
            Some(roi) => self.rects.iter().any(|r| r.overlaps(&roi)),
        }
    }

    /// Takes the next chunk of at most `max_area` pixels.
    ///
    /// With a `roi`, only the first rectangle intersecting it is considered,
    /// and the parts of that rectangle outside the `roi` stay where they were
    /// in the queue.
    pub(crate) fn next_chunk(
        &mut self,
        roi: Option<Rect>,
        max_area: u64,
        policy: SplitPolicy,
    ) -> Option<Rect> {
        let idx = match roi {
            None => 0,
            Some(roi) => self.rects.iter().position(|r| r.overlaps(&roi))?,
        };
        let head = self.rects.remove(idx)?;
        let mut chunk = head;
        if let Some(roi) = roi
            && !roi.contains_rect(&head)
        {
            chunk = head.intersect(roi);
            for (offset, outside) in head.subtract(roi).into_iter().enumerate() {
                self.rects.insert(idx + offset, outside);
            }
        }

        let max_area = max_area.max(1);
        while chunk.area() > max_area {
            let (near, far) = split(chunk, policy);
            trace!("split {chunk} into {near} and {far}");
            self.rects.insert(idx, far);
            chunk = near;
        }
        self.area.subtract_rect(chunk);
        Some(chunk)
    }
}

/// Cuts across the longer side, the width on ties.
fn split(rect: Rect, policy: SplitPolicy) -> (Rect, Rect) {
    if rect.width() >= rect.height() {
        rect.split_x(policy.band(rect.width()))
    } else {
        rect.split_y(policy.band(rect.height()))
    }
}
