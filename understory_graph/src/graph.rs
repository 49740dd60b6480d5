// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node arena: structure, bounding boxes and invalidation.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::mem;

use hashbrown::HashMap;
use log::{debug, trace};
use smallvec::SmallVec;
use understory_region::{Rect, Region};

use crate::node::{Edge, Node};
use crate::order::topological;
use crate::scratch::{Direction, Traversal};
use crate::{GraphError, NodeId, Operation, PixelFormat, WatchId};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A pending-damage subscription on one node.
#[derive(Debug)]
struct Watch {
    node: NodeId,
    pending: Region,
}

/// A directed acyclic graph of [`Operation`] nodes.
///
/// Nodes live in an arena and are referenced by generational [`NodeId`]s.
/// Each node has named input pads, each fed by at most one upstream output
/// pad, and named output pads that fan out to any number of consumers.
/// Connections that would close a cycle are rejected, and every failed edit
/// leaves the graph untouched.
///
/// The graph tracks three kinds of derived state per node:
///
/// - a memoized **bounding box**, recomputed lazily from the producers' boxes
///   after connection or property changes;
/// - an accumulated **dirty region**, grown by [`invalidate`](Self::invalidate)
///   as damage flows downstream through
///   [`Operation::invalidated_by_change`] and shrunk when
///   [`render`](Self::render) computes the damaged pixels;
/// - a **prepared** flag, cleared by structural or property changes so the
///   operation negotiates formats again before it next runs.
///
/// Observers such as projections subscribe with [`watch`](Self::watch) and
/// collect the damage that reached the watched node with
/// [`take_invalidated`](Self::take_invalidated).
///
/// ```rust
/// use understory_graph::{Graph, Nop, SolidColor};
/// use understory_region::Rect;
///
/// let mut graph = Graph::new();
/// let color = SolidColor::rgba8([255, 0, 0, 255]).with_extent(Rect::new(0, 0, 8, 8));
/// let color = graph.add_node(color);
/// let out = graph.add_node(Nop);
/// graph.connect(color, "output", out, "input").unwrap();
///
/// assert_eq!(graph.bounding_box(out).unwrap(), Rect::new(0, 0, 8, 8));
///
/// // A node cannot feed itself.
/// assert!(graph.connect(out, "output", out, "input").is_err());
/// ```
///
/// # See Also
///
/// - [`Graph::render`]: Evaluates a rectangle of a node's output.
#[derive(Debug, Default)]
pub struct Graph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    watches: HashMap<WatchId, Watch>,
    next_watch: u64,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node owning `operation`.
    pub fn add_node(&mut self, operation: impl Operation) -> NodeId {
        self.add_boxed_node(Box::new(operation))
    }

    /// Adds a node owning an already boxed operation.
    pub fn add_boxed_node(&mut self, operation: Box<dyn Operation>) -> NodeId {
        let node = Node::new(operation);
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(idx, slot.generation)
        } else {
            let id = slot_id(self.slots.len(), 1);
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
            });
            id
        };
        self.len += 1;
        debug!("added {id:?} ({})", self.node(id).map_or("?", |n| n.operation.name()));
        id
    }

    /// Removes a node and every connection touching it.
    ///
    /// Consumers lose their input and are invalidated over their previous
    /// bounding box. Watches on the node are dropped. The slot is recycled
    /// with a new generation, so `id` stays stale forever.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Box<dyn Operation>, GraphError> {
        let node = self.node(id)?;
        let sources: SmallVec<[(usize, NodeId, usize); 2]> = node
            .inputs
            .iter()
            .enumerate()
            .filter_map(|(pad, p)| p.source.map(|(src, out)| (pad, src, out)))
            .collect();
        let consumers: Vec<(usize, NodeId, usize)> = node
            .outputs
            .iter()
            .enumerate()
            .flat_map(|(out, p)| p.consumers.iter().map(move |&(c, pad)| (out, c, pad)))
            .collect();

        let mut damage: Vec<(NodeId, Rect)> = Vec::with_capacity(consumers.len());
        for &(_, consumer, _) in &consumers {
            damage.push((consumer, self.resolve_bbox(consumer)));
        }

        for (pad, src, out) in sources {
            self.unlink(src, out, id, pad);
        }
        for &(out, consumer, pad) in &consumers {
            self.unlink(id, out, consumer, pad);
        }
        self.watches.retain(|_, w| w.node != id);

        let slot = &mut self.slots[id.idx()];
        let Some(node) = slot.node.take() else {
            return Err(GraphError::NodeNotFound(id));
        };
        self.free.push(id.0);
        self.len -= 1;
        debug!("removed {id:?} ({})", node.operation.name());

        for (consumer, rect) in damage {
            self.structure_changed(consumer);
            self.propagate_invalidation(consumer, rect);
        }
        Ok(node.operation)
    }

    /// Connects `source`'s output pad to `sink`'s input pad.
    ///
    /// Fails without changing anything if either node or pad does not exist,
    /// if the input pad already has a producer, or if `sink` already reaches
    /// `source` downstream (a self-loop included). On success the sink must
    /// prepare again, bounding boxes from the sink down are recomputed on
    /// demand, and the sink is invalidated over the source's bounding box.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_pad: &str,
        sink: NodeId,
        sink_pad: &str,
    ) -> Result<(), GraphError> {
        let out = self
            .node(source)?
            .output_index(source_pad)
            .ok_or_else(|| pad_not_found(source, source_pad))?;
        let sink_node = self.node(sink)?;
        let pad = sink_node
            .input_index(sink_pad)
            .ok_or_else(|| pad_not_found(sink, sink_pad))?;
        if sink_node.inputs[pad].source.is_some() {
            return Err(GraphError::PadAlreadyConnected {
                node: sink,
                pad: sink_node.inputs[pad].name,
            });
        }
        if source == sink || self.reaches(sink, source) {
            return Err(GraphError::CycleDetected {
                from: source,
                to: sink,
            });
        }

        if let Some(node) = self.node_slot_mut(sink) {
            node.inputs[pad].source = Some((source, out));
        }
        if let Some(node) = self.node_slot_mut(source) {
            node.outputs[out].consumers.push((sink, pad));
        }
        debug!("connected {source:?}.{source_pad} -> {sink:?}.{sink_pad}");

        self.structure_changed(sink);
        let rect = self.resolve_bbox(source);
        self.propagate_invalidation(sink, rect);
        Ok(())
    }

    /// Disconnects whatever feeds `sink`'s input pad.
    ///
    /// Returns `Ok(false)` if the pad had no producer. Otherwise the sink is
    /// invalidated over its bounding box from before the change.
    pub fn disconnect(&mut self, sink: NodeId, sink_pad: &str) -> Result<bool, GraphError> {
        let node = self.node(sink)?;
        let pad = node
            .input_index(sink_pad)
            .ok_or_else(|| pad_not_found(sink, sink_pad))?;
        let Some((source, out)) = node.inputs[pad].source else {
            return Ok(false);
        };
        let old = self.resolve_bbox(sink);
        self.unlink(source, out, sink, pad);
        debug!("disconnected {source:?} -> {sink:?}.{sink_pad}");
        self.structure_changed(sink);
        self.propagate_invalidation(sink, old);
        Ok(true)
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ids of all live nodes in slot order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.node.is_some())
            .map(|(idx, slot)| slot_id(idx, slot.generation))
    }

    /// Every connection, sorted by sink then source.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for sink in self.node_ids() {
            let Ok(node) = self.node(sink) else {
                continue;
            };
            for input in &node.inputs {
                let Some((source, out)) = input.source else {
                    continue;
                };
                let Ok(producer) = self.node(source) else {
                    continue;
                };
                edges.push(Edge {
                    source,
                    source_pad: producer.outputs[out].name,
                    sink,
                    sink_pad: input.name,
                });
            }
        }
        edges.sort_by_key(|e| (e.sink, e.sink_pad, e.source, e.source_pad));
        edges
    }

    /// Names of `id`'s input pads.
    pub fn inputs(
        &self,
        id: NodeId,
    ) -> Result<impl Iterator<Item = &'static str> + '_, GraphError> {
        Ok(self.node(id)?.inputs.iter().map(|p| p.name))
    }

    /// Names of `id`'s output pads.
    pub fn outputs(
        &self,
        id: NodeId,
    ) -> Result<impl Iterator<Item = &'static str> + '_, GraphError> {
        Ok(self.node(id)?.outputs.iter().map(|p| p.name))
    }

    /// The producer feeding `id`'s input pad, with its output pad name.
    pub fn producer(
        &self,
        id: NodeId,
        input_pad: &str,
    ) -> Result<Option<(NodeId, &'static str)>, GraphError> {
        let node = self.node(id)?;
        let pad = node
            .input_index(input_pad)
            .ok_or_else(|| pad_not_found(id, input_pad))?;
        Ok(node.inputs[pad].source.and_then(|(source, out)| {
            self.node(source)
                .ok()
                .map(|producer| (source, producer.outputs[out].name))
        }))
    }

    /// Consumers of `id`'s output pad, with their input pad names.
    pub fn consumers(
        &self,
        id: NodeId,
        output_pad: &str,
    ) -> Result<Vec<(NodeId, &'static str)>, GraphError> {
        let node = self.node(id)?;
        let out = node
            .output_index(output_pad)
            .ok_or_else(|| pad_not_found(id, output_pad))?;
        Ok(node.outputs[out]
            .consumers
            .iter()
            .filter_map(|&(consumer, pad)| {
                self.node(consumer)
                    .ok()
                    .map(|c| (consumer, c.inputs[pad].name))
            })
            .collect())
    }

    /// The operation owned by `id`.
    pub fn operation(&self, id: NodeId) -> Result<&dyn Operation, GraphError> {
        Ok(self.node(id)?.operation.as_ref())
    }

    /// The operation owned by `id`, as its concrete type.
    pub fn operation_as<T: Operation>(&self, id: NodeId) -> Result<&T, GraphError> {
        let any: &dyn Any = self.node(id)?.operation.as_ref();
        any.downcast_ref::<T>().ok_or(GraphError::OperationType {
            node: id,
            expected: type_name::<T>(),
        })
    }

    /// Mutates the operation of `id` and then reports a property change.
    ///
    /// See [`property_changed`](Self::property_changed) for what follows the
    /// edit. Nothing changes if the operation is not a `T`.
    ///
    /// ```rust
    /// use understory_graph::{Graph, SolidColor};
    /// use understory_region::Rect;
    ///
    /// let mut graph = Graph::new();
    /// let color = SolidColor::rgba8([0, 0, 0, 255]).with_extent(Rect::new(0, 0, 4, 4));
    /// let color = graph.add_node(color);
    /// let watch = graph.watch(color).unwrap();
    ///
    /// graph
    ///     .update_operation::<SolidColor, _>(color, |c| c.set_extent(Rect::new(0, 0, 8, 4)))
    ///     .unwrap();
    /// assert_eq!(graph.bounding_box(color).unwrap(), Rect::new(0, 0, 8, 4));
    /// assert_eq!(graph.take_invalidated(watch).unwrap().area(), 32);
    /// ```
    pub fn update_operation<T: Operation, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, GraphError> {
        let old = self.bbox_checked(id)?;
        let Some(node) = self.node_slot_mut(id) else {
            return Err(GraphError::NodeNotFound(id));
        };
        let any: &mut dyn Any = node.operation.as_mut();
        let Some(operation) = any.downcast_mut::<T>() else {
            return Err(GraphError::OperationType {
                node: id,
                expected: type_name::<T>(),
            });
        };
        let result = f(operation);
        self.changed(id, old);
        Ok(result)
    }

    /// Reports that the operation of `id` changed in a way that affects its
    /// output.
    ///
    /// The node prepares again before its next run, bounding boxes from the
    /// node down are recomputed on demand, and the node is invalidated over
    /// the union of its old and new bounding boxes.
    pub fn property_changed(&mut self, id: NodeId) -> Result<(), GraphError> {
        let old = self.bbox_checked(id)?;
        self.changed(id, old);
        Ok(())
    }

    /// The bounding box of `id`'s output, recomputed if stale.
    pub fn bounding_box(&mut self, id: NodeId) -> Result<Rect, GraphError> {
        self.bbox_checked(id)
    }

    /// Area of `input_pad` that `id` needs to produce `output_rect`.
    pub fn required_input_rect(
        &self,
        id: NodeId,
        input_pad: &str,
        output_rect: Rect,
    ) -> Result<Rect, GraphError> {
        let node = self.node(id)?;
        let pad = node
            .input_index(input_pad)
            .ok_or_else(|| pad_not_found(id, input_pad))?;
        Ok(node.operation.required_for_output(pad, output_rect))
    }

    /// Format negotiated by `id`'s last prepare.
    pub fn output_format(&self, id: NodeId) -> Result<PixelFormat, GraphError> {
        Ok(self.node(id)?.format)
    }

    /// Marks `rect` of `id` and everything downstream of it as dirty.
    ///
    /// Damage flows in topological order: each consumer receives the union of
    /// what its producers forward, mapped through
    /// [`Operation::invalidated_by_change`]. Every affected node accumulates
    /// its damage in its dirty region, and so does every watch on it. An
    /// empty `rect` does nothing.
    ///
    /// ```rust
    /// use understory_graph::{Graph, Nop};
    /// use understory_region::Rect;
    ///
    /// let mut graph = Graph::new();
    /// let a = graph.add_node(Nop);
    /// let b = graph.add_node(Nop);
    /// graph.connect(a, "output", b, "input").unwrap();
    /// let watch = graph.watch(b).unwrap();
    ///
    /// graph.invalidate(a, Rect::new(0, 0, 10, 10)).unwrap();
    /// assert!(graph.dirty_region(b).unwrap().contains_rect(Rect::new(0, 0, 10, 10)));
    /// assert_eq!(graph.take_invalidated(watch).unwrap().area(), 100);
    /// ```
    pub fn invalidate(&mut self, id: NodeId, rect: Rect) -> Result<(), GraphError> {
        self.node(id)?;
        self.propagate_invalidation(id, rect);
        Ok(())
    }

    /// Damage that reached `id` and was not computed since.
    ///
    /// Grows with [`invalidate`](Self::invalidate) and shrinks when
    /// [`render`](Self::render) processes `id`. A region fragmented into many
    /// rectangles is replaced by its bounding rectangle, so the result may
    /// cover more than the damage itself.
    pub fn dirty_region(&self, id: NodeId) -> Result<&Region, GraphError> {
        Ok(&self.node(id)?.dirty)
    }

    /// Forgets `id`'s accumulated damage.
    pub fn clear_dirt(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.node(id)?;
        if let Some(node) = self.node_slot_mut(id) {
            node.dirty.clear();
        }
        Ok(())
    }

    /// Asks every operation for damage it produced on its own and invalidates
    /// accordingly. Returns how many operations reported damage.
    pub fn collect_operation_dirt(&mut self) -> usize {
        let mut found = Vec::new();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let Some(node) = &mut slot.node else {
                continue;
            };
            if let Some(rect) = node.operation.take_dirty()
                && !rect.is_empty()
            {
                found.push((slot_id(idx, slot.generation), rect));
            }
        }
        for &(id, rect) in &found {
            trace!("{id:?} reported damage {rect}");
            self.propagate_invalidation(id, rect);
        }
        found.len()
    }

    /// Subscribes to damage reaching `id`.
    pub fn watch(&mut self, id: NodeId) -> Result<WatchId, GraphError> {
        self.node(id)?;
        let watch = WatchId(self.next_watch);
        self.next_watch += 1;
        self.watches.insert(
            watch,
            Watch {
                node: id,
                pending: Region::new(),
            },
        );
        Ok(watch)
    }

    /// Cancels a subscription.
    pub fn unwatch(&mut self, watch: WatchId) -> Result<(), GraphError> {
        self.watches
            .remove(&watch)
            .map(|_| ())
            .ok_or(GraphError::WatchNotFound(watch))
    }

    /// The node a watch observes.
    pub fn watched_node(&self, watch: WatchId) -> Result<NodeId, GraphError> {
        self.watches
            .get(&watch)
            .map(|w| w.node)
            .ok_or(GraphError::WatchNotFound(watch))
    }

    /// Takes the damage collected by `watch` since the last call.
    pub fn take_invalidated(&mut self, watch: WatchId) -> Result<Region, GraphError> {
        self.watches
            .get_mut(&watch)
            .map(|w| mem::take(&mut w.pending))
            .ok_or(GraphError::WatchNotFound(watch))
    }

    /// `id` and its transitive producers, producers first.
    pub fn upstream_order(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.node(id)?;
        Ok(self.upstream_closure(id))
    }

    /// Transitive consumers of `id`, excluding `id`, in depth-first order.
    pub fn downstream(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.node(id)?;
        Ok(self.walk(id, Direction::Downstream))
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.slots
            .get(id.idx())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(GraphError::NodeNotFound(id))
    }

    pub(crate) fn node_slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.idx())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    /// `id` and its transitive producers in topological order.
    pub(crate) fn upstream_closure(&self, id: NodeId) -> Vec<NodeId> {
        let mut members = vec![id];
        members.extend(self.walk(id, Direction::Upstream));
        topological(&members, |n| self.producer_ids(n))
    }

    /// The memoized bounding box of `id`, recomputing stale boxes upstream.
    pub(crate) fn resolve_bbox(&mut self, id: NodeId) -> Rect {
        match self.node(id) {
            Ok(node) if !node.bbox_stale => return node.bbox,
            Ok(_) => {}
            Err(_) => return Rect::EMPTY,
        }
        for n in self.upstream_closure(id) {
            let Ok(node) = self.node(n) else {
                continue;
            };
            if !node.bbox_stale {
                continue;
            }
            let boxes: SmallVec<[Rect; 4]> = node
                .inputs
                .iter()
                .map(|p| {
                    p.source
                        .and_then(|(src, _)| self.node(src).ok())
                        .map_or(Rect::EMPTY, |src| src.bbox)
                })
                .collect();
            let bbox = node.operation.bounding_box(&boxes);
            trace!("bounding box of {n:?} is {bbox}");
            if let Some(node) = self.node_slot_mut(n) {
                node.bbox = bbox;
                node.bbox_stale = false;
            }
        }
        self.node(id).map_or(Rect::EMPTY, |n| n.bbox)
    }

    fn bbox_checked(&mut self, id: NodeId) -> Result<Rect, GraphError> {
        self.node(id)?;
        Ok(self.resolve_bbox(id))
    }

    fn changed(&mut self, id: NodeId, old: Rect) {
        self.structure_changed(id);
        let new = self.resolve_bbox(id);
        debug!("properties of {id:?} changed, bounding box {old} -> {new}");
        self.propagate_invalidation(id, old.union(new));
    }

    /// Forces `id` to prepare again and its bounding box, and every box
    /// downstream of it, to be recomputed.
    fn structure_changed(&mut self, id: NodeId) {
        let downstream = self.walk(id, Direction::Downstream);
        if let Some(node) = self.node_slot_mut(id) {
            node.prepared = false;
            node.bbox_stale = true;
        }
        for n in downstream {
            if let Some(node) = self.node_slot_mut(n) {
                node.bbox_stale = true;
            }
        }
    }

    fn propagate_invalidation(&mut self, origin: NodeId, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut members = vec![origin];
        members.extend(self.walk(origin, Direction::Downstream));
        let order = topological(&members, |n| self.producer_ids(n));

        let mut incoming: HashMap<NodeId, Rect> = HashMap::with_capacity(order.len());
        incoming.insert(origin, rect);
        for id in order {
            let Some(damage) = incoming.remove(&id) else {
                continue;
            };
            if damage.is_empty() {
                continue;
            }
            let Some(node) = self.node_slot_mut(id) else {
                continue;
            };
            node.add_dirt(damage);
            for watch in self.watches.values_mut().filter(|w| w.node == id) {
                watch.pending.add_rect(damage);
            }
            trace!("{id:?} invalidated over {damage}");

            let Ok(node) = self.node(id) else {
                continue;
            };
            for (consumer, pad) in node.consumers() {
                let Ok(c) = self.node(consumer) else {
                    continue;
                };
                let mapped = c.operation.invalidated_by_change(pad, damage);
                let entry = incoming.entry(consumer).or_insert(Rect::EMPTY);
                *entry = entry.union(mapped);
            }
        }
    }

    fn producer_ids(&self, id: NodeId) -> SmallVec<[NodeId; 2]> {
        self.node(id)
            .map(|n| n.producers().collect())
            .unwrap_or_default()
    }

    fn neighbours(&self, id: NodeId, direction: Direction) -> SmallVec<[NodeId; 4]> {
        let Ok(node) = self.node(id) else {
            return SmallVec::new();
        };
        match direction {
            Direction::Upstream => node.producers().collect(),
            Direction::Downstream => node.consumers().map(|(c, _)| c).collect(),
        }
    }

    /// Nodes reachable from `start`, excluding `start`.
    fn walk(&self, start: NodeId, direction: Direction) -> Vec<NodeId> {
        let mut scratch = Traversal::new();
        scratch.reset(start);
        scratch.stack.extend(self.neighbours(start, direction));
        let mut out = Vec::new();
        while let Some(next) = scratch.stack.pop() {
            if scratch.visited.insert(next) {
                out.push(next);
                scratch.stack.extend(self.neighbours(next, direction));
            }
        }
        out
    }

    /// Returns `true` if `to` is downstream of `from`.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut scratch = Traversal::new();
        scratch.reset(from);
        scratch.stack.push(from);
        while let Some(current) = scratch.stack.pop() {
            if current == to {
                return true;
            }
            for next in self.neighbours(current, Direction::Downstream) {
                if scratch.visited.insert(next) {
                    scratch.stack.push(next);
                }
            }
        }
        false
    }

    fn unlink(&mut self, source: NodeId, out: usize, sink: NodeId, pad: usize) {
        if let Some(node) = self.node_slot_mut(sink) {
            node.inputs[pad].source = None;
        }
        if let Some(node) = self.node_slot_mut(source) {
            node.outputs[out].consumers.retain(|&c| c != (sink, pad));
        }
    }
}

fn pad_not_found(node: NodeId, pad: &str) -> GraphError {
    GraphError::PadNotFound {
        node,
        pad: pad.to_owned(),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "slot indices are allocated below u32::MAX"
)]
fn slot_id(idx: usize, generation: u32) -> NodeId {
    NodeId::new(idx as u32, generation)
}
