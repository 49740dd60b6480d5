// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Graph: a node graph of image operations with region-tracked
//! invalidation and rectangle-driven evaluation.
//!
//! The crate models the core of a demand-driven image pipeline:
//!
//! - **Graph** ([`Graph`]): an arena of nodes addressed by generational
//!   [`NodeId`]s. Each node owns an [`Operation`] and exposes named input and
//!   output pads. Connections form a DAG; cycles are rejected at connect time
//!   and failed edits change nothing.
//! - **Operations** ([`Operation`]): the contract for pixel computations. The
//!   graph asks an operation for its bounding box, for the input area needed
//!   to produce an output area, for how input damage maps to output damage,
//!   and finally to compute a rectangle of pixels.
//! - **Invalidation**: [`Graph::invalidate`] pushes damage downstream in
//!   topological order, accumulating it in each node's dirty region and in
//!   every [watch](Graph::watch) on an affected node.
//! - **Evaluation**: [`Graph::render`] computes any rectangle of a node's
//!   output by propagating requests upstream and running each involved
//!   operation once.
//! - **Pixels** ([`Buffer`], [`PixelFormat`]): rectangular byte buffers tagged
//!   with an opaque format descriptor.
//!
//! Built-in [`Nop`], [`SolidColor`] and [`Crop`] operations cover the trivial
//! cases; real filters are supplied by the embedding application.
//!
//! ## Example
//!
//! ```rust
//! use understory_graph::{Crop, Graph, Nop, SolidColor};
//! use understory_region::Rect;
//!
//! let mut graph = Graph::new();
//! let color = graph.add_node(SolidColor::rgba8([255, 255, 255, 255]));
//! let crop = graph.add_node(Crop::new(Rect::new(0, 0, 64, 64)));
//! let out = graph.add_node(Nop);
//! graph.connect(color, "output", crop, "input").unwrap();
//! graph.connect(crop, "output", out, "input").unwrap();
//!
//! // An infinite plane cropped to 64x64.
//! assert_eq!(graph.bounding_box(out).unwrap(), Rect::new(0, 0, 64, 64));
//!
//! // Observe damage reaching the output.
//! let watch = graph.watch(out).unwrap();
//! graph.invalidate(color, Rect::new(60, 60, 10, 10)).unwrap();
//! let damage = graph.take_invalidated(watch).unwrap();
//! assert_eq!(damage.bounds(), Rect::new(60, 60, 4, 4));
//!
//! // Compute pixels.
//! let pixels = graph.render(out, Rect::new(0, 0, 8, 8)).unwrap();
//! assert_eq!(pixels.pixel(7, 7), Some(&[255, 255, 255, 255][..]));
//! ```
//!
//! ## Logging
//!
//! Structural edits are reported through the `log` crate at `debug` level;
//! invalidation and evaluation steps at `trace` level. The crate never
//! installs a logger.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod buffer;
mod builtin;
mod error;
mod eval;
mod graph;
mod id;
mod node;
mod operation;
mod order;
mod scratch;

pub use buffer::{Buffer, PixelFormat};
pub use builtin::{Crop, Nop, SolidColor};
pub use error::{BufferError, EvalError, GraphError, OperationError};
pub use graph::Graph;
pub use id::{NodeId, WatchId};
pub use node::Edge;
pub use operation::{DEFAULT_INPUT_PADS, DEFAULT_OUTPUT_PADS, Operation, PrepareContext};
