// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topological ordering of a node subset (Kahn's algorithm).

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::NodeId;

/// Orders `members` so that every node follows the producers it has inside
/// `members`.
///
/// `producers_of` lists the producers of a node, one entry per connection;
/// producers outside `members` are ignored. Ties keep the order of `members`.
/// The graph is acyclic by construction, so every member is yielded.
pub(crate) fn topological<F, I>(members: &[NodeId], mut producers_of: F) -> Vec<NodeId>
where
    F: FnMut(NodeId) -> I,
    I: IntoIterator<Item = NodeId>,
{
    let mut in_degree: HashMap<NodeId, usize> = HashMap::with_capacity(members.len());
    for &id in members {
        in_degree.entry(id).or_insert(0);
    }

    let mut dependents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for &id in members {
        for producer in producers_of(id) {
            if !in_degree.contains_key(&producer) {
                continue;
            }
            if let Some(degree) = in_degree.get_mut(&id) {
                *degree += 1;
            }
            dependents.entry(producer).or_default().push(id);
        }
    }

    let mut queue: VecDeque<NodeId> = members
        .iter()
        .copied()
        .filter(|id| in_degree.get(id).is_some_and(|&d| d == 0))
        .collect();
    let mut out = Vec::with_capacity(in_degree.len());
    while let Some(id) = queue.pop_front() {
        if in_degree.remove(&id).is_none() {
            // Duplicate entry in `members`.
            continue;
        }
        out.push(id);
        for dependent in dependents.remove(&id).unwrap_or_default() {
            if let Some(degree) = in_degree.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }
    debug_assert!(in_degree.is_empty(), "node subset contains a cycle");
    out
}
