// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node state stored in the graph arena.

use alloc::boxed::Box;
use alloc::vec::Vec;

use smallvec::SmallVec;
use understory_region::{Rect, Region};

use crate::{NodeId, Operation, PixelFormat};

/// A connection from an output pad to an input pad, as reported by
/// [`Graph::edges`](crate::Graph::edges).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Producing node.
    pub source: NodeId,
    /// Output pad of the producer.
    pub source_pad: &'static str,
    /// Consuming node.
    pub sink: NodeId,
    /// Input pad of the consumer.
    pub sink_pad: &'static str,
}

#[derive(Debug, Clone)]
pub(crate) struct InputPad {
    pub(crate) name: &'static str,
    /// Producer node and its output pad index.
    pub(crate) source: Option<(NodeId, usize)>,
}

#[derive(Debug, Clone)]
pub(crate) struct OutputPad {
    pub(crate) name: &'static str,
    /// Consumer nodes and their input pad indices.
    pub(crate) consumers: Vec<(NodeId, usize)>,
}

/// A dirty region holding more rectangles than this collapses to its bounds.
pub(crate) const MAX_DIRTY_RECTS: usize = 64;

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) operation: Box<dyn Operation>,
    pub(crate) inputs: SmallVec<[InputPad; 2]>,
    pub(crate) outputs: SmallVec<[OutputPad; 1]>,
    /// Memoized bounding box, valid while `bbox_stale` is false.
    pub(crate) bbox: Rect,
    pub(crate) bbox_stale: bool,
    /// Damage not yet covered by an evaluation, at most `MAX_DIRTY_RECTS`
    /// rectangles.
    pub(crate) dirty: Region,
    pub(crate) prepared: bool,
    pub(crate) format: PixelFormat,
}

impl Node {
    pub(crate) fn new(operation: Box<dyn Operation>) -> Self {
        let inputs = operation
            .input_pads()
            .iter()
            .map(|&name| InputPad { name, source: None })
            .collect();
        let outputs = operation
            .output_pads()
            .iter()
            .map(|&name| OutputPad {
                name,
                consumers: Vec::new(),
            })
            .collect();
        Self {
            operation,
            inputs,
            outputs,
            bbox: Rect::EMPTY,
            bbox_stale: true,
            dirty: Region::new(),
            prepared: false,
            format: PixelFormat::default(),
        }
    }

    pub(crate) fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|p| p.name == name)
    }

    pub(crate) fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|p| p.name == name)
    }

    pub(crate) fn add_dirt(&mut self, rect: Rect) {
        if self.dirty.add_rect(rect) {
            self.bound_dirt();
        }
    }

    /// Forgets the damage inside a rectangle that was just computed.
    pub(crate) fn clean(&mut self, rect: Rect) {
        if self.dirty.subtract_rect(rect) {
            self.bound_dirt();
        }
    }

    fn bound_dirt(&mut self) {
        if self.dirty.len() > MAX_DIRTY_RECTS {
            self.dirty = Region::from_rect(self.dirty.bounds());
        }
    }

    /// Producers of every connected input pad, one entry per connection.
    pub(crate) fn producers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs.iter().filter_map(|p| p.source.map(|(id, _)| id))
    }

    /// Consumers of every output pad as `(node, input pad)`.
    pub(crate) fn consumers(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.outputs.iter().flat_map(|p| p.consumers.iter().copied())
    }
}
