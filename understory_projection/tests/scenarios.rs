// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of projections over small graphs.
//!
//! A recording source stands in for an expensive operation: it logs every
//! rectangle it is asked to compute, can be made to fail, and can report
//! damage on its own like a live feed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use understory_graph::{
    Buffer, EvalError, Graph, GraphError, NodeId, Nop, Operation, OperationError, PixelFormat,
};
use understory_projection::{Projection, ProjectionConfig, StepOutcome};
use understory_region::{Rect, Region};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Shared handles into a [`Source`] after it moved into the graph.
#[derive(Clone, Debug, Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<Rect>>>,
    fail: Rc<Cell<bool>>,
    dirt: Rc<Cell<Option<Rect>>>,
}

impl Recorder {
    fn source(&self, extent: Rect) -> Source {
        Source {
            extent,
            recorder: self.clone(),
        }
    }

    fn calls(&self) -> Vec<Rect> {
        self.calls.borrow().clone()
    }

    fn reset(&self) {
        self.calls.borrow_mut().clear();
    }
}

#[derive(Debug)]
struct Source {
    extent: Rect,
    recorder: Recorder,
}

impl Operation for Source {
    fn name(&self) -> &str {
        "source"
    }

    fn input_pads(&self) -> &[&'static str] {
        &[]
    }

    fn bounding_box(&self, _input_boxes: &[Rect]) -> Rect {
        self.extent
    }

    fn process(
        &mut self,
        _output_pad: usize,
        _inputs: &[Buffer],
        roi: Rect,
    ) -> Result<Buffer, OperationError> {
        self.recorder.calls.borrow_mut().push(roi);
        if self.recorder.fail.get() {
            return Err(OperationError::Process("source offline".into()));
        }
        let mut out = Buffer::new(PixelFormat::RGBA_U8, roi);
        out.fill(&[7, 7, 7, 255])
            .map_err(|e| OperationError::Process(e.to_string()))?;
        Ok(out)
    }

    fn take_dirty(&mut self) -> Option<Rect> {
        self.recorder.dirt.take()
    }
}

/// Source → identity → output.
fn chain(extent: Rect) -> (Graph, Recorder, NodeId, NodeId) {
    let recorder = Recorder::default();
    let mut graph = Graph::new();
    let source = graph.add_node(recorder.source(extent));
    let identity = graph.add_node(Nop);
    let output = graph.add_node(Nop);
    graph.connect(source, "output", identity, "input").unwrap();
    graph.connect(identity, "output", output, "input").unwrap();
    (graph, recorder, source, output)
}

fn drain(projection: &mut Projection, graph: &mut Graph) -> Vec<StepOutcome> {
    let mut outcomes = Vec::new();
    loop {
        match projection.render_step(graph) {
            StepOutcome::Idle => return outcomes,
            outcome => outcomes.push(outcome),
        }
    }
}

#[test]
fn second_request_only_queues_the_missing_part() {
    init_logger();
    let (mut graph, _, _, output) = chain(Rect::new(0, 0, 100, 100));
    let mut projection = Projection::new(&mut graph, output, ProjectionConfig::default()).unwrap();

    projection.update_rect(Rect::new(0, 0, 50, 50));
    drain(&mut projection, &mut graph);
    assert!(
        projection
            .valid_region()
            .covers_same(&Region::from_rect(Rect::new(0, 0, 50, 50)))
    );

    let queued = projection.update_rect(Rect::new(25, 25, 75, 75));
    assert!(queued >= 1);
    let mut expected = Region::from_rect(Rect::new(25, 25, 75, 75));
    expected.subtract_rect(Rect::new(0, 0, 50, 50));
    assert!(projection.pending_region().covers_same(&expected));
    for rect in projection.pending() {
        assert!(!rect.overlaps(&Rect::new(0, 0, 50, 50)), "{rect} was already valid");
    }
}

#[test]
fn large_request_is_rendered_in_bounded_chunks() {
    init_logger();
    let (mut graph, recorder, _, output) = chain(Rect::new(0, 0, 1000, 1000));
    let config = ProjectionConfig::default();
    assert_eq!(config.max_chunk_area, 128 * 128);
    let mut projection = Projection::new(&mut graph, output, config).unwrap();

    let request = Rect::new(0, 0, 200, 200);
    projection.update_rect(request);
    drain(&mut projection, &mut graph);

    let calls = recorder.calls();
    assert!(calls.len() as u64 >= (200 * 200_u64).div_ceil(128 * 128));
    let mut covered = Region::new();
    let mut total = 0;
    for rect in &calls {
        assert!(rect.area() <= 128 * 128, "{rect} exceeds the chunk area");
        total += rect.area();
        covered.add_rect(*rect);
    }
    // Disjoint pieces whose areas add up to the request cover it exactly.
    assert_eq!(total, request.area());
    assert!(covered.covers_same(&Region::from_rect(request)));
}

#[test]
fn total_invalidation_forces_a_rerender() {
    init_logger();
    let (mut graph, recorder, _, output) = chain(Rect::new(0, 0, 100, 100));
    let mut projection = Projection::new(&mut graph, output, ProjectionConfig::default()).unwrap();
    let area = Rect::new(0, 0, 64, 64);

    projection.update_rect(area);
    drain(&mut projection, &mut graph);
    assert_eq!(projection.valid_region().area(), area.area());
    assert_eq!(projection.update_rect(area), 0);

    assert!(projection.invalidate(None));
    assert!(projection.valid_region().is_empty());

    recorder.reset();
    assert_eq!(projection.update_rect(area), 1);
    drain(&mut projection, &mut graph);
    assert_eq!(recorder.calls(), vec![area]);
    assert_eq!(projection.valid_region().area(), area.area());
}

#[test]
fn failed_chunks_stay_invalid_until_requested_again() {
    init_logger();
    let (mut graph, recorder, source, output) = chain(Rect::new(0, 0, 100, 100));
    let mut projection = Projection::new(&mut graph, output, ProjectionConfig::default()).unwrap();
    let area = Rect::new(0, 0, 10, 10);

    recorder.fail.set(true);
    projection.update_rect(area);
    assert_eq!(projection.render_step(&mut graph), StepOutcome::Failed(area));
    assert!(projection.valid_region().is_empty());
    assert_eq!(projection.render_step(&mut graph), StepOutcome::Idle);

    // The failure names the node through the graph as well.
    let err = graph.render(output, area).unwrap_err();
    assert!(matches!(err, EvalError::Operation { node, .. } if node == source));

    recorder.fail.set(false);
    assert_eq!(projection.update_rect(area), 1);
    assert_eq!(projection.render_step(&mut graph), StepOutcome::Rendered(area));
    assert_eq!(projection.read(area).pixel(9, 9), Some(&[7, 7, 7, 255][..]));
}

#[test]
fn rendering_never_shrinks_the_valid_region() {
    init_logger();
    let (mut graph, _, _, output) = chain(Rect::new(0, 0, 300, 300));
    let config = ProjectionConfig::default().with_max_chunk_area(37 * 41);
    let mut projection = Projection::new(&mut graph, output, config).unwrap();

    projection.update_rect(Rect::new(-20, -20, 150, 90));
    projection.update_rect(Rect::new(60, 40, 200, 120));
    projection.update_rect(Rect::new(10, 10, 5, 5));

    let mut last = 0;
    loop {
        let outcome = projection.render_step(&mut graph);
        let area = projection.valid_region().area();
        assert!(area >= last, "valid area fell from {last} to {area}");
        last = area;
        if let Some(chunk) = outcome.chunk() {
            assert!(chunk.area() <= 37 * 41, "{chunk} exceeds the chunk area");
        } else {
            break;
        }
    }
    let mut wanted = Region::from_rect(Rect::new(-20, -20, 150, 90));
    wanted.add_rect(Rect::new(60, 40, 200, 120));
    assert!(projection.valid_region().covers_same(&wanted));
}

#[test]
fn upstream_damage_reaches_every_projection() {
    init_logger();
    let (mut graph, recorder, source, output) = chain(Rect::new(0, 0, 100, 100));
    let mut near = Projection::new(&mut graph, source, ProjectionConfig::default()).unwrap();
    let mut far = Projection::new(&mut graph, output, ProjectionConfig::default()).unwrap();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    far.connect_invalidated(move || counter.set(counter.get() + 1));

    for projection in [&mut near, &mut far] {
        projection.update_rect(Rect::new(0, 0, 100, 100));
        drain(projection, &mut graph);
    }

    // A live source reports damage on its own.
    recorder.dirt.set(Some(Rect::new(90, 90, 20, 20)));
    let stale = far.poll_dirty(&mut graph);
    assert_eq!(stale.area(), 100);
    assert_eq!(fired.get(), 1);
    // The other projection collects the same damage independently.
    let stale = near.poll_dirty(&mut graph);
    assert_eq!(stale.area(), 100);
    assert_eq!(far.valid_region().area(), 100 * 100 - 100);

    // Nothing new: no notification.
    assert!(far.poll_dirty(&mut graph).is_empty());
    assert_eq!(fired.get(), 1);

    recorder.reset();
    far.update_rect(Rect::new(0, 0, 100, 100));
    drain(&mut far, &mut graph);
    assert_eq!(recorder.calls(), vec![Rect::new(90, 90, 10, 10)]);
}

#[test]
fn scattered_requests_are_queued_and_rendered_once() {
    init_logger();
    let (mut graph, recorder, _, output) = chain(Rect::new(0, 0, 4096, 4096));
    let mut projection = Projection::new(&mut graph, output, ProjectionConfig::default()).unwrap();
    let pixels: Vec<Rect> = (0..1_000)
        .map(|i| Rect::new((i * 613) % 2048 * 2, (i * 397) % 2039 * 2, 1, 1))
        .collect();

    for pixel in &pixels {
        assert_eq!(projection.update_rect(*pixel), 1);
    }
    for pixel in &pixels {
        assert_eq!(projection.update_rect(*pixel), 0, "{pixel} queued twice");
    }
    assert_eq!(projection.pending_region().area(), 1_000);

    assert_eq!(drain(&mut projection, &mut graph).len(), 1_000);
    assert_eq!(recorder.calls().len(), 1_000);
    assert_eq!(projection.valid_region().area(), 1_000);
    assert!(projection.pending_region().is_empty());
    for pixel in &pixels {
        assert_eq!(projection.update_rect(*pixel), 0, "{pixel} already valid");
    }
}

#[test]
fn structural_edits_invalidate_projections() {
    init_logger();
    let (mut graph, _, source, output) = chain(Rect::new(0, 0, 40, 40));
    let mut projection = Projection::new(&mut graph, output, ProjectionConfig::default()).unwrap();
    projection.update_rect(Rect::new(0, 0, 40, 40));
    drain(&mut projection, &mut graph);

    let (identity, _) = graph.producer(output, "input").unwrap().unwrap();
    graph.disconnect(output, "input").unwrap();
    assert_eq!(projection.poll_dirty(&mut graph).area(), 40 * 40);

    graph.connect(source, "output", output, "input").unwrap();
    assert!(graph.contains(identity));
    projection.update_rect(Rect::new(0, 0, 40, 40));
    drain(&mut projection, &mut graph);
    assert_eq!(projection.valid_region().area(), 40 * 40);
}

#[test]
fn cycles_are_rejected_without_side_effects() {
    init_logger();
    let mut graph = Graph::new();
    let a = graph.add_node(Nop);
    let b = graph.add_node(Nop);
    graph.connect(a, "output", b, "input").unwrap();
    let before = graph.edges();

    assert_eq!(
        graph.connect(b, "output", a, "input"),
        Err(GraphError::CycleDetected { from: b, to: a })
    );
    assert_eq!(graph.edges(), before);
    assert_eq!(graph.producer(a, "input").unwrap(), None);
}
