// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scratch storage for depth-first walks over the graph.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::NodeId;

/// Which edges a walk follows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// From producers to consumers.
    Downstream,
    /// From consumers to producers.
    Upstream,
}

/// Stack and visited set for one walk.
///
/// Nodes are yielded in depth-first discovery order, each at most once,
/// which keeps results deterministic for a given graph.
#[derive(Debug, Default)]
pub(crate) struct Traversal {
    pub(crate) stack: Vec<NodeId>,
    pub(crate) visited: HashSet<NodeId>,
}

impl Traversal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clears state and seeds the walk with `start`, which counts as visited.
    pub(crate) fn reset(&mut self, start: NodeId) {
        self.stack.clear();
        self.visited.clear();
        self.visited.insert(start);
    }
}
