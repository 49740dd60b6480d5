// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Projection: progressive, interruptible rendering of a node
//! graph's output into a cached pixel plane.
//!
//! A [`Projection`] sits on top of one node of an
//! [`understory_graph::Graph`]. It remembers which pixels it already holds
//! (the valid region), keeps a queue of rectangles clients asked for, and
//! renders that queue one bounded chunk at a time. A [`Processor`] drives a
//! projection from whatever scheduler the host has: an event loop tick, a
//! frame budget or a plain loop.
//!
//! Nothing here blocks or spawns. Every step is explicit and the caller may
//! stop between any two of them; the queue and valid region are always
//! consistent.
//!
//! ## Example
//!
//! ```rust
//! use understory_graph::{Graph, Nop, SolidColor};
//! use understory_projection::{Projection, ProjectionConfig, StepOutcome};
//! use understory_region::Rect;
//!
//! let mut graph = Graph::new();
//! let color = SolidColor::rgba8([200, 0, 0, 255]).with_extent(Rect::new(0, 0, 100, 100));
//! let color = graph.add_node(color);
//! let out = graph.add_node(Nop);
//! graph.connect(color, "output", out, "input").unwrap();
//!
//! let config = ProjectionConfig::default().with_max_chunk_area(50 * 50);
//! let mut projection = Projection::new(&mut graph, out, config).unwrap();
//! projection.update_rect(Rect::new(0, 0, 100, 100));
//!
//! // The first step renders one chunk and leaves the rest queued.
//! let first = projection.render_step(&mut graph);
//! assert_eq!(first, StepOutcome::Rendered(Rect::new(0, 0, 50, 50)));
//!
//! // Drain the remainder.
//! while projection.render_step(&mut graph) != StepOutcome::Idle {}
//! assert_eq!(projection.valid_region().area(), 100 * 100);
//!
//! // Asking again for a valid area queues nothing.
//! assert_eq!(projection.update_rect(Rect::new(10, 10, 20, 20)), 0);
//! ```
//!
//! ## Logging
//!
//! Queue transitions are reported through the `log` crate at `debug` level,
//! chunks at `trace` level, and chunks that fail to render at `warn` level.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod processor;
mod projection;
mod queue;
mod signal;
mod tile;

pub use config::{
    DEFAULT_EXTENT, DEFAULT_MAX_CHUNK_AREA, DEFAULT_TILE_SIZE, ProjectionConfig, SplitPolicy,
};
pub use processor::Processor;
pub use projection::{Projection, ProjectionState, StepOutcome};
pub use signal::ListenerId;
pub use tile::TileBuffer;
