// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle-driven evaluation: requests flow upstream, pixels flow down.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use log::trace;
use smallvec::SmallVec;
use understory_region::Rect;

use crate::operation::PrepareContext;
use crate::{Buffer, EvalError, Graph, GraphError, NodeId, PixelFormat};

/// Output pad of a node, keyed by node and pad index.
type PadKey = (NodeId, usize);

impl Graph {
    /// Computes the first output pad of `target` over `roi`.
    ///
    /// Evaluation runs in four passes over the upstream closure of `target`:
    ///
    /// 1. nodes are ordered producers first;
    /// 2. nodes that are not prepared, or whose producers were just prepared,
    ///    negotiate formats;
    /// 3. requests flow from consumers to producers through
    ///    [`Operation::required_for_output`](crate::Operation::required_for_output),
    ///    each request accumulated by union and clipped to the producer's
    ///    bounding box unless that box is infinite;
    /// 4. every node with a non-empty request runs
    ///    [`Operation::process`](crate::Operation::process) once per consumed
    ///    output pad, and an intermediate buffer is dropped as soon as its last
    ///    consumer has run.
    ///
    /// The returned buffer covers exactly `roi`. Pixels outside the target's
    /// bounding box are zero. An empty `roi` yields an empty buffer.
    ///
    /// ```rust
    /// use understory_graph::{Graph, Nop, SolidColor};
    /// use understory_region::Rect;
    ///
    /// let mut graph = Graph::new();
    /// let color = SolidColor::rgba8([9, 8, 7, 255]).with_extent(Rect::new(0, 0, 4, 4));
    /// let color = graph.add_node(color);
    /// let out = graph.add_node(Nop);
    /// graph.connect(color, "output", out, "input").unwrap();
    ///
    /// let buf = graph.render(out, Rect::new(2, 2, 4, 4)).unwrap();
    /// assert_eq!(buf.extent(), Rect::new(2, 2, 4, 4));
    /// assert_eq!(buf.pixel(3, 3), Some(&[9, 8, 7, 255][..]));
    /// assert_eq!(buf.pixel(5, 5), Some(&[0, 0, 0, 0][..]));
    /// ```
    pub fn render(&mut self, target: NodeId, roi: Rect) -> Result<Buffer, EvalError> {
        let node = self.node(target)?;
        if node.outputs.is_empty() {
            return Err(GraphError::PadNotFound {
                node: target,
                pad: "output".into(),
            }
            .into());
        }
        if roi.is_empty() {
            return Ok(Buffer::empty(node.format));
        }

        let order = self.upstream_closure(target);
        self.prepare_nodes(&order)?;
        // Refreshes every stale box in the closure.
        let target_box = self.resolve_bbox(target);
        let requests = self.request_rects(&order, target, clip(roi, target_box));
        let mut results = self.process_nodes(&order, target, &requests)?;

        let format = self.node(target)?.format;
        Ok(match results.remove(&(target, 0)) {
            Some(buffer) => buffer.resized(roi),
            None => Buffer::new(format, roi),
        })
    }

    fn prepare_nodes(&mut self, order: &[NodeId]) -> Result<(), EvalError> {
        let mut prepared_now: HashSet<NodeId> = HashSet::new();
        for &id in order {
            let node = self.node(id)?;
            let upstream_changed = node
                .producers()
                .any(|producer| prepared_now.contains(&producer));
            if node.prepared && !upstream_changed {
                continue;
            }
            let formats: SmallVec<[Option<PixelFormat>; 2]> = node
                .inputs
                .iter()
                .map(|p| {
                    p.source
                        .and_then(|(src, _)| self.node(src).ok())
                        .map(|src| src.format)
                })
                .collect();
            let Some(node) = self.node_slot_mut(id) else {
                continue;
            };
            let mut cx = PrepareContext::new(&formats, node.format);
            node.operation
                .prepare(&mut cx)
                .map_err(|error| EvalError::Operation { node: id, error })?;
            node.format = cx.output_format();
            node.prepared = true;
            trace!("prepared {id:?} as {}", node.format.name());
            prepared_now.insert(id);
        }
        Ok(())
    }

    /// Accumulates what every node in `order` must produce, consumers first.
    fn request_rects(
        &self,
        order: &[NodeId],
        target: NodeId,
        target_request: Rect,
    ) -> HashMap<NodeId, Rect> {
        let mut requests: HashMap<NodeId, Rect> = HashMap::with_capacity(order.len());
        requests.insert(target, target_request);
        for &id in order.iter().rev() {
            let Some(&request) = requests.get(&id) else {
                continue;
            };
            if request.is_empty() {
                continue;
            }
            let Ok(node) = self.node(id) else {
                continue;
            };
            for (pad, input) in node.inputs.iter().enumerate() {
                let Some((source, _)) = input.source else {
                    continue;
                };
                let Ok(producer) = self.node(source) else {
                    continue;
                };
                let needed = clip(
                    node.operation.required_for_output(pad, request),
                    producer.bbox,
                );
                let entry = requests.entry(source).or_insert(Rect::EMPTY);
                *entry = entry.union(needed);
            }
        }
        requests
    }

    fn process_nodes(
        &mut self,
        order: &[NodeId],
        target: NodeId,
        requests: &HashMap<NodeId, Rect>,
    ) -> Result<HashMap<PadKey, Buffer>, EvalError> {
        let active = |id: &NodeId| requests.get(id).is_some_and(|r| !r.is_empty());

        // Remaining reads of each output pad by nodes that will run.
        let mut readers: HashMap<PadKey, usize> = HashMap::new();
        for id in order.iter().filter(|id| active(*id)) {
            for input in &self.node(*id)?.inputs {
                if let Some(key) = input.source {
                    *readers.entry(key).or_default() += 1;
                }
            }
        }

        let mut results: HashMap<PadKey, Buffer> = HashMap::new();
        for &id in order.iter().filter(|id| active(*id)) {
            let request = requests.get(&id).copied().unwrap_or(Rect::EMPTY);
            let node = self.node(id)?;
            let mut inputs = Vec::with_capacity(node.inputs.len());
            for input in &node.inputs {
                inputs.push(match input.source {
                    None => Buffer::empty(node.format),
                    Some(key) => {
                        let format = self.node(key.0).map_or(node.format, |p| p.format);
                        take_input(&mut results, &mut readers, key, format)
                    }
                });
            }
            let pads: SmallVec<[usize; 1]> = (0..node.outputs.len())
                .filter(|&pad| {
                    (id == target && pad == 0) || readers.get(&(id, pad)).is_some_and(|&n| n > 0)
                })
                .collect();

            let Some(node) = self.node_slot_mut(id) else {
                continue;
            };
            for pad in pads {
                trace!("processing {id:?} pad {pad} over {request}");
                let buffer = node
                    .operation
                    .process(pad, &inputs, request)
                    .map_err(|error| EvalError::Operation { node: id, error })?;
                if buffer.is_empty() {
                    return Err(EvalError::EmptyResult { node: id, request });
                }
                if !buffer.extent().contains_rect(&request) {
                    return Err(EvalError::IncompleteResult {
                        node: id,
                        request,
                        extent: buffer.extent(),
                    });
                }
                results.insert((id, pad), buffer);
            }
            node.clean(request);
        }
        Ok(results)
    }
}

/// Moves the buffer to its last reader and clones it for earlier ones.
fn take_input(
    results: &mut HashMap<PadKey, Buffer>,
    readers: &mut HashMap<PadKey, usize>,
    key: PadKey,
    format: PixelFormat,
) -> Buffer {
    let last = match readers.get_mut(&key) {
        Some(count) => {
            *count = count.saturating_sub(1);
            *count == 0
        }
        None => true,
    };
    let buffer = if last {
        results.remove(&key)
    } else {
        results.get(&key).cloned()
    };
    buffer.unwrap_or_else(|| Buffer::empty(format))
}

fn clip(rect: Rect, bbox: Rect) -> Rect {
    if bbox.is_infinite() {
        rect
    } else {
        rect.intersect(bbox)
    }
}
