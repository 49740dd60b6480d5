// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for graph edits, operations, buffers and evaluation.

use alloc::string::String;

use thiserror::Error;
use understory_region::Rect;

use crate::{NodeId, PixelFormat, WatchId};

/// Structural errors returned by [`Graph`](crate::Graph) edits and queries.
///
/// A failed edit leaves the graph exactly as it was before the call.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// The node was removed or never belonged to this graph.
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),
    /// The node has no pad with this name.
    #[error("node {node:?} has no pad named `{pad}`")]
    PadNotFound {
        /// Node that was asked for the pad.
        node: NodeId,
        /// Requested pad name.
        pad: String,
    },
    /// The input pad already has an upstream connection.
    #[error("input pad `{pad}` of node {node:?} is already connected")]
    PadAlreadyConnected {
        /// Sink node.
        node: NodeId,
        /// Sink input pad.
        pad: &'static str,
    },
    /// The connection would close a cycle (including a self-loop).
    #[error("connecting {from:?} into {to:?} would create a cycle")]
    CycleDetected {
        /// Node whose output was being connected.
        from: NodeId,
        /// Node whose input was being connected.
        to: NodeId,
    },
    /// The watch was removed or never registered with this graph.
    #[error("watch {0:?} does not exist")]
    WatchNotFound(WatchId),
    /// A typed operation access named the wrong operation type.
    #[error("operation of node {node:?} is not a `{expected}`")]
    OperationType {
        /// Node whose operation was accessed.
        node: NodeId,
        /// Requested type name.
        expected: &'static str,
    },
}

/// Failure reported by an [`Operation`](crate::Operation).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum OperationError {
    /// Format negotiation or setup failed.
    #[error("prepare failed: {0}")]
    Prepare(String),
    /// Pixel computation failed.
    #[error("process failed: {0}")]
    Process(String),
    /// The operation cannot work with this pixel format.
    #[error("unsupported pixel format {0:?}")]
    UnsupportedFormat(PixelFormat),
}

/// Errors from constructing or copying pixel [`Buffer`](crate::Buffer)s.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// Byte length does not match the extent and format.
    #[error("expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Bytes required.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// Buffers with different pixel formats were combined.
    #[error("pixel format mismatch: expected {expected:?}, got {actual:?}")]
    FormatMismatch {
        /// Format of the destination.
        expected: PixelFormat,
        /// Format of the source.
        actual: PixelFormat,
    },
}

/// Errors from [`Graph::render`](crate::Graph::render).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum EvalError {
    /// The target or one of its pads does not exist.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// An operation failed while preparing or processing.
    #[error("node {node:?} failed: {error}")]
    Operation {
        /// Failing node.
        node: NodeId,
        /// Error reported by the operation.
        #[source]
        error: OperationError,
    },
    /// An operation returned a zero-area buffer for a non-empty request.
    #[error("node {node:?} produced nothing for {request:?}")]
    EmptyResult {
        /// Node that produced the buffer.
        node: NodeId,
        /// Rectangle it was asked for.
        request: Rect,
    },
    /// An operation returned a buffer that does not cover its request.
    #[error("node {node:?} produced {extent:?}, which does not cover {request:?}")]
    IncompleteResult {
        /// Node that produced the buffer.
        node: NodeId,
        /// Rectangle it was asked for.
        request: Rect,
        /// Extent of the returned buffer.
        extent: Rect,
    },
}
