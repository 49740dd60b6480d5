// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Budgeted driving of a projection.

use understory_graph::{Graph, GraphError};
use understory_region::{Overlap, Rect};

use crate::{Projection, StepOutcome};

/// Renders a projection a bounded number of chunks at a time.
///
/// A processor borrows its projection for as long as it drives it. With a
/// region of interest set, it only services queued rectangles that intersect
/// it, leaving the rest of the queue in order for later.
///
/// ```rust
/// use understory_graph::{Graph, SolidColor};
/// use understory_projection::{Projection, ProjectionConfig};
/// use understory_region::Rect;
///
/// let mut graph = Graph::new();
/// let color = graph.add_node(SolidColor::rgba8([9; 4]).with_extent(Rect::new(0, 0, 256, 256)));
/// let mut projection = Projection::new(&mut graph, color, ProjectionConfig::default()).unwrap();
///
/// let mut processor = projection.processor().with_chunk_area(64 * 64);
/// processor.set_rectangle_to_bounds(&mut graph).unwrap();
/// assert_eq!(processor.progress(), 0.0);
///
/// // One chunk per idle tick.
/// let mut ticks = 0;
/// while processor.work(&mut graph) {
///     ticks += 1;
/// }
/// assert_eq!(ticks + 1, 16);
/// assert!(processor.is_rendered());
/// assert_eq!(processor.progress(), 1.0);
/// ```
#[derive(Debug)]
pub struct Processor<'p> {
    projection: &'p mut Projection,
    rect: Option<Rect>,
    chunk_area: u64,
}

impl<'p> Processor<'p> {
    /// Drives `projection` with its configured chunk area and no region of
    /// interest.
    pub fn new(projection: &'p mut Projection) -> Self {
        let chunk_area = projection.config().max_chunk_area;
        Self {
            projection,
            rect: None,
            chunk_area,
        }
    }

    /// Sets the largest area rendered per chunk.
    #[must_use]
    pub fn with_chunk_area(mut self, area: u64) -> Self {
        self.chunk_area = area;
        self
    }

    /// Largest area rendered per chunk.
    #[must_use]
    pub fn chunk_area(&self) -> u64 {
        self.chunk_area
    }

    /// Changes the largest area rendered per chunk.
    pub fn set_chunk_area(&mut self, area: u64) {
        self.chunk_area = area;
    }

    /// The driven projection.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        self.projection
    }

    /// The region of interest, clipped to the canvas.
    #[must_use]
    pub fn rectangle(&self) -> Option<Rect> {
        self.rect
    }

    /// Focuses on `roi` and asks the projection for it.
    ///
    /// Returns how many rectangles were queued.
    pub fn set_rectangle(&mut self, roi: Rect) -> usize {
        let roi = roi.intersect(self.projection.config().extent);
        self.rect = Some(roi);
        self.projection.update_rect(roi)
    }

    /// Focuses on the projected node's bounding box, or the whole canvas if
    /// the box is infinite.
    pub fn set_rectangle_to_bounds(&mut self, graph: &mut Graph) -> Result<Rect, GraphError> {
        let extent = self.projection.config().extent;
        let bounds = graph.bounding_box(self.projection.node())?;
        let roi = if bounds.is_infinite() {
            extent
        } else {
            bounds.intersect(extent)
        };
        self.set_rectangle(roi);
        Ok(roi)
    }

    /// Drops the region of interest; every queued rectangle is serviced.
    pub fn clear_rectangle(&mut self) {
        self.rect = None;
    }

    /// Renders at most one chunk. Returns `true` if more work remains.
    pub fn work(&mut self, graph: &mut Graph) -> bool {
        if let StepOutcome::Idle = self.projection.step(graph, self.rect, self.chunk_area) {
            return false;
        }
        self.has_work()
    }

    /// Renders at most `chunks` chunks. Returns `true` if more work remains.
    pub fn work_chunks(&mut self, graph: &mut Graph, chunks: usize) -> bool {
        for _ in 0..chunks {
            if !self.work(graph) {
                return false;
            }
        }
        self.has_work()
    }

    /// Renders chunks until `should_yield` returns `true` after one of them
    /// or the work runs out. Returns `true` if more work remains.
    pub fn work_until(
        &mut self,
        graph: &mut Graph,
        mut should_yield: impl FnMut() -> bool,
    ) -> bool {
        loop {
            if !self.work(graph) {
                return false;
            }
            if should_yield() {
                return true;
            }
        }
    }

    /// Returns `true` if a queued rectangle lies in the region of interest.
    #[must_use]
    pub fn has_work(&self) -> bool {
        self.projection.has_work_in(self.rect)
    }

    /// Returns `true` when nothing relevant is queued and the region of
    /// interest is entirely valid.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        if self.has_work() {
            return false;
        }
        match self.rect {
            Some(roi) => {
                roi.is_empty() || self.projection.valid_region().rect_in(roi) == Overlap::In
            }
            None => true,
        }
    }

    /// Fraction of the wanted area that is valid, in `[0, 1]`.
    ///
    /// The wanted area is the region of interest, or the valid and queued
    /// area together without one. Reaches 1.0 only once
    /// [`is_rendered`](Self::is_rendered) holds.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let valid = self.projection.valid_region();
        let (done, wanted) = match self.rect {
            Some(roi) => (valid.intersect_rect(roi).area(), roi.area()),
            None => {
                let mut wanted = self.projection.pending_region().clone();
                wanted.add_region(valid);
                (valid.area(), wanted.area())
            }
        };
        let rendered = self.is_rendered();
        if wanted == 0 {
            return if rendered { 1.0 } else { 0.999 };
        }
        let ratio = done as f64 / wanted as f64;
        if ratio >= 1.0 && !rendered {
            0.9999
        } else {
            ratio.min(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use understory_graph::{Nop, SolidColor};

    use super::*;
    use crate::ProjectionConfig;

    fn setup() -> (Graph, Projection) {
        let mut graph = Graph::new();
        let color =
            graph.add_node(SolidColor::rgba8([5; 4]).with_extent(Rect::new(0, 0, 100, 100)));
        let out = graph.add_node(Nop);
        graph.connect(color, "output", out, "input").unwrap();
        let projection = Projection::new(&mut graph, out, ProjectionConfig::default()).unwrap();
        (graph, projection)
    }

    #[test]
    fn roi_limits_work_to_its_area() {
        let (mut graph, mut projection) = setup();
        projection.update_rect(Rect::new(500, 500, 10, 10));
        {
            let mut processor = projection.processor();
            processor.set_rectangle(Rect::new(0, 0, 10, 10));
            assert!(!processor.work(&mut graph));
            assert!(processor.is_rendered());
        }
        assert_eq!(projection.valid_region().area(), 100);
        assert_eq!(
            projection.pending().collect::<alloc::vec::Vec<_>>(),
            [Rect::new(500, 500, 10, 10)]
        );
    }

    #[test]
    fn work_chunks_respects_budget() {
        let (mut graph, mut projection) = setup();
        let mut processor = projection.processor().with_chunk_area(10 * 10);
        processor.set_rectangle(Rect::new(0, 0, 40, 10));
        assert!(processor.work_chunks(&mut graph, 2));
        assert_eq!(processor.projection().valid_region().area(), 200);
        assert!(!processor.work_chunks(&mut graph, 10));
        assert!(processor.is_rendered());
    }

    #[test]
    fn work_until_yields() {
        let (mut graph, mut projection) = setup();
        let mut processor = projection.processor().with_chunk_area(10 * 10);
        processor.set_rectangle(Rect::new(0, 0, 40, 10));
        let mut budget = 2;
        assert!(processor.work_until(&mut graph, || {
            budget -= 1;
            budget == 0
        }));
        assert_eq!(processor.projection().valid_region().area(), 200);
        assert!(!processor.work_until(&mut graph, || false));
    }

    #[test]
    fn progress_never_claims_done_early() {
        let (mut graph, mut projection) = setup();
        let mut processor = projection.processor().with_chunk_area(50 * 100);
        assert_eq!(
            processor.set_rectangle_to_bounds(&mut graph).unwrap(),
            Rect::new(0, 0, 100, 100)
        );
        assert_eq!(processor.progress(), 0.0);
        assert!(processor.work(&mut graph));
        assert_eq!(processor.progress(), 0.5);
        assert!(!processor.work(&mut graph));
        assert_eq!(processor.progress(), 1.0);
    }

    #[test]
    fn progress_without_roi_tracks_queue() {
        let (mut graph, mut projection) = setup();
        projection.update_rect(Rect::new(0, 0, 10, 10));
        let mut processor = projection.processor();
        assert_eq!(processor.progress(), 0.0);
        assert!(!processor.work(&mut graph));
        assert_eq!(processor.progress(), 1.0);
    }

    #[test]
    fn empty_roi_is_rendered() {
        let (_, mut projection) = setup();
        let mut processor = projection.processor();
        assert_eq!(processor.set_rectangle(Rect::new(0, 0, 0, 10)), 0);
        assert!(processor.is_rendered());
        assert_eq!(processor.progress(), 1.0);
    }
}
