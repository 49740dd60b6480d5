// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The incremental renderer bound to one graph output.

use log::{debug, trace, warn};
use understory_graph::{Buffer, Graph, GraphError, NodeId, WatchId};
use understory_region::{Overlap, Rect, Region};

use crate::queue::DirtyQueue;
use crate::signal::{ListenerId, Listeners};
use crate::{Processor, ProjectionConfig, TileBuffer};

/// Whether a projection has work queued.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProjectionState {
    /// Nothing is queued.
    Idle,
    /// At least one rectangle waits to be rendered.
    Rendering,
}

/// What one [`Projection::render_step`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The queue was empty.
    Idle,
    /// The chunk was rendered, stored and marked valid.
    Rendered(Rect),
    /// The chunk was already valid and was dropped without rendering.
    AlreadyValid(Rect),
    /// Rendering failed; the chunk was dropped and stays invalid.
    Failed(Rect),
}

impl StepOutcome {
    /// The chunk the step handled, if any.
    #[must_use]
    pub fn chunk(self) -> Option<Rect> {
        match self {
            Self::Idle => None,
            Self::Rendered(r) | Self::AlreadyValid(r) | Self::Failed(r) => Some(r),
        }
    }
}

/// An incrementally rendered, cached view of one node's output.
///
/// A projection keeps three pieces of state:
///
/// - a sparse [`TileBuffer`] of pixels;
/// - the **valid region**, where those pixels are known to be current;
/// - a FIFO **dirty queue** of rectangles waiting to be rendered.
///
/// Clients ask for areas with [`update_rect`](Self::update_rect), which
/// queues whatever part is neither valid nor already queued. Each
/// [`render_step`](Self::render_step) takes one chunk of bounded area off the
/// queue, renders it through [`Graph::render`], stores the pixels and grows
/// the valid region. [`poll_dirty`](Self::poll_dirty) shrinks the valid
/// region by whatever damage reached the node since the last poll.
///
/// Rendering failures are soft: the chunk is dropped without becoming valid,
/// so the next [`update_rect`](Self::update_rect) covering it tries again.
///
/// ```rust
/// use understory_graph::{Graph, Nop, SolidColor};
/// use understory_projection::{Projection, ProjectionConfig, ProjectionState};
/// use understory_region::Rect;
///
/// let mut graph = Graph::new();
/// let color = graph.add_node(SolidColor::rgba8([0, 0, 255, 255]));
/// let out = graph.add_node(Nop);
/// graph.connect(color, "output", out, "input").unwrap();
///
/// let mut projection = Projection::new(&mut graph, out, ProjectionConfig::default()).unwrap();
/// projection.update_rect(Rect::new(0, 0, 300, 100));
/// assert_eq!(projection.state(), ProjectionState::Rendering);
///
/// let chunks = projection.render(&mut graph);
/// assert!(chunks >= 2);
/// assert_eq!(projection.state(), ProjectionState::Idle);
/// assert_eq!(projection.valid_region().area(), 300 * 100);
/// assert_eq!(projection.read(Rect::new(299, 99, 1, 1)).data(), &[0, 0, 255, 255]);
///
/// // Damage upstream makes the cached pixels stale.
/// graph.invalidate(color, Rect::new(0, 0, 10, 10)).unwrap();
/// let stale = projection.poll_dirty(&mut graph);
/// assert_eq!(stale.area(), 100);
/// assert_eq!(projection.valid_region().area(), 300 * 100 - 100);
/// ```
///
/// # See Also
///
/// - [`Processor`]: Drives a projection within a region of interest.
#[derive(Debug)]
pub struct Projection {
    node: NodeId,
    watch: Option<WatchId>,
    config: ProjectionConfig,
    valid: Region,
    queue: DirtyQueue,
    tiles: TileBuffer,
    listeners: Listeners,
}

impl Projection {
    /// Creates an empty projection of `node` and subscribes to its damage.
    pub fn new(
        graph: &mut Graph,
        node: NodeId,
        config: ProjectionConfig,
    ) -> Result<Self, GraphError> {
        let watch = graph.watch(node)?;
        debug!("projection of {node:?} created with {config:?}");
        Ok(Self {
            node,
            watch: Some(watch),
            config,
            valid: Region::new(),
            queue: DirtyQueue::default(),
            tiles: TileBuffer::new(config.format, config.tile_size),
            listeners: Listeners::default(),
        })
    }

    /// The projected node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The settings the projection was created with.
    #[must_use]
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Where the stored pixels are current.
    #[must_use]
    pub fn valid_region(&self) -> &Region {
        &self.valid
    }

    /// The stored pixels. Outside the valid region they may be stale or zero.
    #[must_use]
    pub fn buffer(&self) -> &TileBuffer {
        &self.tiles
    }

    /// [`ProjectionState::Rendering`] while anything is queued.
    #[must_use]
    pub fn state(&self) -> ProjectionState {
        if self.queue.is_empty() {
            ProjectionState::Idle
        } else {
            ProjectionState::Rendering
        }
    }

    /// Returns `true` until the projected node is removed or the projection
    /// is detached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.watch.is_some()
    }

    /// Queued rectangles, next first.
    pub fn pending(&self) -> impl Iterator<Item = Rect> + '_ {
        self.queue.iter()
    }

    /// The queued area.
    #[must_use]
    pub fn pending_region(&self) -> &Region {
        self.queue.region()
    }

    /// Asks for `roi` to become valid.
    ///
    /// Queues the parts of `roi` inside the canvas that are neither valid nor
    /// already queued, one rectangle per disjoint piece, after everything
    /// queued before. Returns how many rectangles were queued.
    ///
    /// ```rust
    /// use understory_graph::{Graph, SolidColor};
    /// use understory_projection::{Projection, ProjectionConfig};
    /// use understory_region::Rect;
    ///
    /// let mut graph = Graph::new();
    /// let color = graph.add_node(SolidColor::rgba8([255; 4]));
    /// let config = ProjectionConfig::default();
    /// let mut projection = Projection::new(&mut graph, color, config).unwrap();
    ///
    /// assert_eq!(projection.update_rect(Rect::new(0, 0, 10, 10)), 1);
    /// // Already queued.
    /// assert_eq!(projection.update_rect(Rect::new(0, 0, 10, 10)), 0);
    /// assert_eq!(projection.update_rect(Rect::EMPTY), 0);
    /// ```
    pub fn update_rect(&mut self, roi: Rect) -> usize {
        let roi = roi.intersect(self.config.extent);
        if roi.is_empty() {
            return 0;
        }
        let mut needed = Region::from_rect(roi);
        needed.subtract_region(&self.valid);
        needed.subtract_region(self.queue.region());
        if needed.is_empty() {
            return 0;
        }
        if self.queue.is_empty() {
            debug!("projection of {:?} rendering", self.node);
        }
        for rect in needed.rects() {
            trace!("queued {rect}");
            self.queue.push_back(rect);
        }
        needed.len()
    }

    /// Marks cached pixels stale.
    ///
    /// `None` empties the valid region. `Some(rect)` removes only `rect`
    /// from it. Queued work is untouched. Emits `invalidated` and returns
    /// `true` if any valid area was removed.
    pub fn invalidate(&mut self, rect: Option<Rect>) -> bool {
        let removed = match rect {
            None => {
                let had = !self.valid.is_empty();
                self.valid.clear();
                had
            }
            Some(rect) => self.valid.subtract_rect(rect),
        };
        if removed {
            debug!("projection of {:?} invalidated over {rect:?}", self.node);
            self.listeners.invalidated();
        }
        removed
    }

    /// Drops queued work inside `rect`, or all of it for `None`.
    ///
    /// The parts of partly covered rectangles outside `rect` stay queued in
    /// place.
    pub fn forget_queue(&mut self, rect: Option<Rect>) {
        match rect {
            None => self.queue.clear(),
            Some(rect) => self.queue.remove_rect(rect),
        }
    }

    /// Drops queued work and validity inside `rect`, or everywhere for
    /// `None`, without notifying listeners.
    pub fn forget(&mut self, rect: Option<Rect>) {
        self.forget_queue(rect);
        match rect {
            None => self.valid.clear(),
            Some(rect) => {
                self.valid.subtract_rect(rect);
            }
        }
    }

    /// Renders the next queued chunk.
    ///
    /// The head of the queue is cut down to at most
    /// [`max_chunk_area`](ProjectionConfig::max_chunk_area) pixels, the
    /// remainder staying at the front of the queue. The chunk is then
    /// rendered unless it is already valid, its pixels are stored, it joins
    /// the valid region and `computed` is emitted. Never shrinks the valid
    /// region.
    pub fn render_step(&mut self, graph: &mut Graph) -> StepOutcome {
        self.step(graph, None, self.config.max_chunk_area)
    }

    /// Steps until the queue is empty. Returns how many chunks were rendered.
    pub fn render(&mut self, graph: &mut Graph) -> usize {
        let mut rendered = 0;
        loop {
            match self.render_step(graph) {
                StepOutcome::Idle => return rendered,
                StepOutcome::Rendered(_) => rendered += 1,
                StepOutcome::AlreadyValid(_) | StepOutcome::Failed(_) => {}
            }
        }
    }

    /// Collects damage that reached the node since the last poll.
    ///
    /// First asks every operation for damage it produced on its own, then
    /// drains this projection's subscription. The damaged part of the valid
    /// region is removed and returned; `invalidated` is emitted if it is not
    /// empty. A projection whose node was removed detaches itself and
    /// reports nothing.
    pub fn poll_dirty(&mut self, graph: &mut Graph) -> Region {
        graph.collect_operation_dirt();
        let Some(watch) = self.watch else {
            return Region::new();
        };
        let damage = match graph.take_invalidated(watch) {
            Ok(damage) => damage,
            Err(err) => {
                warn!("projection of {:?} detached: {err}", self.node);
                self.watch = None;
                return Region::new();
            }
        };
        let stale = damage.intersect_region(&self.valid);
        if stale.is_empty() {
            return stale;
        }
        self.valid.subtract_region(&stale);
        debug!(
            "projection of {:?} lost {} valid pixels",
            self.node,
            stale.area()
        );
        self.listeners.invalidated();
        stale
    }

    /// Stored pixels over `rect` clipped to the canvas.
    #[must_use]
    pub fn read(&self, rect: Rect) -> Buffer {
        self.tiles.read(rect.intersect(self.config.extent))
    }

    /// Calls `f` with every rectangle that becomes valid.
    pub fn connect_computed(&mut self, f: impl FnMut(Rect) + 'static) -> ListenerId {
        self.listeners.on_computed(f)
    }

    /// Calls `f` whenever valid area is removed.
    pub fn connect_invalidated(&mut self, f: impl FnMut() + 'static) -> ListenerId {
        self.listeners.on_invalidated(f)
    }

    /// Removes a listener. Returns `false` if it was not connected.
    pub fn disconnect(&mut self, listener: ListenerId) -> bool {
        self.listeners.remove(listener)
    }

    /// Cancels the damage subscription and drops the projection.
    pub fn detach(self, graph: &mut Graph) {
        if let Some(watch) = self.watch
            && let Err(err) = graph.unwatch(watch)
        {
            warn!("projection of {:?}: {err}", self.node);
        }
        debug!("projection of {:?} detached", self.node);
    }

    /// A driver for this projection.
    pub fn processor(&mut self) -> Processor<'_> {
        Processor::new(self)
    }

    pub(crate) fn has_work_in(&self, roi: Option<Rect>) -> bool {
        self.queue.has_work_in(roi)
    }

    pub(crate) fn step(
        &mut self,
        graph: &mut Graph,
        roi: Option<Rect>,
        max_area: u64,
    ) -> StepOutcome {
        let Some(chunk) = self
            .queue
            .next_chunk(roi, max_area, self.config.split_policy)
        else {
            return StepOutcome::Idle;
        };
        let outcome = if self.valid.rect_in(chunk) == Overlap::In {
            trace!("{chunk} already valid");
            StepOutcome::AlreadyValid(chunk)
        } else {
            match graph.render(self.node, chunk) {
                Ok(pixels) => self.store(chunk, &pixels),
                Err(err) => {
                    warn!("rendering {chunk} of {:?} failed: {err}", self.node);
                    StepOutcome::Failed(chunk)
                }
            }
        };
        if self.queue.is_empty() {
            debug!("projection of {:?} idle", self.node);
        }
        outcome
    }

    fn store(&mut self, chunk: Rect, pixels: &Buffer) -> StepOutcome {
        if pixels.is_empty() {
            warn!("rendering {chunk} of {:?} produced no pixels", self.node);
            return StepOutcome::Failed(chunk);
        }
        if let Err(err) = self.tiles.write(pixels) {
            warn!("storing {chunk} of {:?} failed: {err}", self.node);
            return StepOutcome::Failed(chunk);
        }
        self.valid.add_rect(chunk);
        trace!("computed {chunk}");
        self.listeners.computed(chunk);
        StepOutcome::Rendered(chunk)
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use understory_graph::{Nop, PixelFormat, SolidColor};

    use super::*;

    fn setup(config: ProjectionConfig) -> (Graph, NodeId, Projection) {
        let mut graph = Graph::new();
        let color = graph.add_node(SolidColor::rgba8([1, 2, 3, 4]));
        let out = graph.add_node(Nop);
        graph.connect(color, "output", out, "input").unwrap();
        let projection = Projection::new(&mut graph, out, config).unwrap();
        (graph, color, projection)
    }

    #[test]
    fn update_rect_is_clipped_to_canvas() {
        let config = ProjectionConfig::default().with_extent(Rect::new(0, 0, 10, 10));
        let (_, _, mut projection) = setup(config);
        assert_eq!(projection.update_rect(Rect::new(-5, -5, 10, 10)), 1);
        assert_eq!(projection.pending().collect::<Vec<_>>(), [Rect::new(0, 0, 5, 5)]);
        assert_eq!(projection.update_rect(Rect::new(20, 20, 5, 5)), 0);
    }

    #[test]
    fn computed_fires_per_chunk() {
        let config = ProjectionConfig::default().with_max_chunk_area(100);
        let (mut graph, _, mut projection) = setup(config);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        projection.connect_computed(move |r| sink.borrow_mut().push(r));

        projection.update_rect(Rect::new(0, 0, 20, 10));
        assert_eq!(projection.render(&mut graph), 2);
        assert_eq!(*seen.borrow(), [Rect::new(0, 0, 10, 10), Rect::new(10, 0, 10, 10)]);
    }

    #[test]
    fn already_valid_chunks_are_skipped() {
        let (mut graph, _, mut projection) = setup(ProjectionConfig::default());
        projection.update_rect(Rect::new(0, 0, 4, 4));
        // Validity that arrives while the rectangle is still queued.
        projection.valid.add_rect(Rect::new(0, 0, 4, 4));
        assert_eq!(
            projection.render_step(&mut graph),
            StepOutcome::AlreadyValid(Rect::new(0, 0, 4, 4))
        );
        assert_eq!(projection.render_step(&mut graph), StepOutcome::Idle);
    }

    #[test]
    fn format_mismatch_is_a_soft_failure() {
        let config = ProjectionConfig::default().with_format(PixelFormat::Y_U8);
        let (mut graph, _, mut projection) = setup(config);
        projection.update_rect(Rect::new(0, 0, 4, 4));
        assert_eq!(
            projection.render_step(&mut graph),
            StepOutcome::Failed(Rect::new(0, 0, 4, 4))
        );
        assert!(projection.valid_region().is_empty());
        assert!(projection.buffer().is_empty());
    }

    #[test]
    fn invalidate_partial_and_total() {
        let (mut graph, _, mut projection) = setup(ProjectionConfig::default());
        let fired = Rc::new(RefCell::new(0));
        let counter = fired.clone();
        projection.connect_invalidated(move || *counter.borrow_mut() += 1);

        projection.update_rect(Rect::new(0, 0, 10, 10));
        projection.render(&mut graph);
        assert!(projection.invalidate(Some(Rect::new(0, 0, 5, 10))));
        assert_eq!(projection.valid_region().area(), 50);
        assert!(!projection.invalidate(Some(Rect::new(0, 0, 5, 10))));
        assert!(projection.invalidate(None));
        assert!(!projection.invalidate(None));
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn forget_queue_trims_pending_work() {
        let (_, _, mut projection) = setup(ProjectionConfig::default());
        projection.update_rect(Rect::new(0, 0, 10, 10));
        projection.update_rect(Rect::new(20, 0, 10, 10));
        projection.forget_queue(Some(Rect::new(0, 0, 10, 5)));
        assert_eq!(
            projection.pending().collect::<Vec<_>>(),
            [Rect::new(0, 5, 10, 5), Rect::new(20, 0, 10, 10)]
        );
        projection.forget_queue(None);
        assert_eq!(projection.state(), ProjectionState::Idle);
    }

    #[test]
    fn removed_node_detaches_on_poll() {
        let (mut graph, _, mut projection) = setup(ProjectionConfig::default());
        let out = projection.node();
        projection.update_rect(Rect::new(0, 0, 2, 2));
        graph.remove_node(out).unwrap();
        assert!(projection.poll_dirty(&mut graph).is_empty());
        assert!(!projection.is_attached());
        assert!(matches!(projection.render_step(&mut graph), StepOutcome::Failed(_)));
        projection.detach(&mut graph);
    }

    #[test]
    fn detach_cancels_the_subscription() {
        let (mut graph, color, projection) = setup(ProjectionConfig::default());
        let out = projection.node();
        projection.detach(&mut graph);
        // A fresh watch on the node gets a new id; the old one is gone.
        let watch = graph.watch(out).unwrap();
        graph.invalidate(color, Rect::new(0, 0, 1, 1)).unwrap();
        assert_eq!(graph.take_invalidated(watch).unwrap().area(), 1);
    }
}
