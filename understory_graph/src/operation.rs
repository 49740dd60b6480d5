// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between the graph and the pixel computations it schedules.

use core::any::Any;
use core::fmt;

use understory_region::Rect;

use crate::{Buffer, OperationError, PixelFormat};

/// Default input pad list: a single pad named `"input"`.
pub const DEFAULT_INPUT_PADS: &[&str] = &["input"];

/// Default output pad list: a single pad named `"output"`.
pub const DEFAULT_OUTPUT_PADS: &[&str] = &["output"];

/// A pixel computation owned by a graph node.
///
/// The graph never inspects pixels itself. It asks the operation how large its
/// output is, which input area it needs for a given output area, how input
/// damage maps to output damage, and finally to compute pixels for a
/// rectangle.
///
/// Pads are addressed by position in [`input_pads`](Self::input_pads) and
/// [`output_pads`](Self::output_pads). The pad lists are read once when the
/// node is added and must not change afterwards.
///
/// ```rust
/// use understory_graph::{Buffer, Operation, OperationError, PixelFormat};
/// use understory_region::Rect;
///
/// /// Inverts 8-bit luminance.
/// #[derive(Debug)]
/// struct Invert;
///
/// impl Operation for Invert {
///     fn name(&self) -> &str {
///         "invert"
///     }
///
///     fn process(
///         &mut self,
///         _output_pad: usize,
///         inputs: &[Buffer],
///         roi: Rect,
///     ) -> Result<Buffer, OperationError> {
///         let mut out = inputs[0].resized(roi);
///         if out.format() != PixelFormat::Y_U8 {
///             return Err(OperationError::UnsupportedFormat(out.format()));
///         }
///         for byte in out.data_mut() {
///             *byte = 255 - *byte;
///         }
///         Ok(out)
///     }
/// }
/// ```
pub trait Operation: Any + fmt::Debug {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Names of the input pads.
    fn input_pads(&self) -> &[&'static str] {
        DEFAULT_INPUT_PADS
    }

    /// Names of the output pads.
    fn output_pads(&self) -> &[&'static str] {
        DEFAULT_OUTPUT_PADS
    }

    /// Negotiates pixel formats before the first [`process`](Self::process).
    ///
    /// Called again after the node's connections or properties change. The
    /// default passes the first input's format through, or keeps the current
    /// output format for sources.
    fn prepare(&mut self, cx: &mut PrepareContext<'_>) -> Result<(), OperationError> {
        if let Some(format) = cx.input_format(0) {
            cx.set_output_format(format);
        }
        Ok(())
    }

    /// Output extent given the bounding boxes of the inputs, one per input pad.
    ///
    /// Unconnected pads report an empty box. The default is the union of all
    /// inputs, which suits filters and compositors.
    fn bounding_box(&self, input_boxes: &[Rect]) -> Rect {
        input_boxes
            .iter()
            .fold(Rect::EMPTY, |acc, r| acc.union(*r))
    }

    /// Area of `input_pad` needed to produce `output_rect`.
    ///
    /// Identity for point filters; area filters dilate.
    fn required_for_output(&self, input_pad: usize, output_rect: Rect) -> Rect {
        let _ = input_pad;
        output_rect
    }

    /// Output area affected when `input_rect` changes on `input_pad`.
    ///
    /// Identity for point filters; area filters dilate.
    fn invalidated_by_change(&self, input_pad: usize, input_rect: Rect) -> Rect {
        let _ = input_pad;
        input_rect
    }

    /// Computes `output_pad` over `roi`.
    ///
    /// `inputs` holds one buffer per input pad; unconnected pads get an empty
    /// buffer. Input buffers may be larger or smaller than what
    /// [`required_for_output`](Self::required_for_output) asked for, since
    /// producers are clipped to their bounding box. The returned buffer must
    /// cover `roi`.
    fn process(
        &mut self,
        output_pad: usize,
        inputs: &[Buffer],
        roi: Rect,
    ) -> Result<Buffer, OperationError>;

    /// Takes damage the operation produced on its own, such as a new frame
    /// from a live source.
    fn take_dirty(&mut self) -> Option<Rect> {
        None
    }
}

/// Format negotiation state handed to [`Operation::prepare`].
#[derive(Debug)]
pub struct PrepareContext<'a> {
    input_formats: &'a [Option<PixelFormat>],
    output_format: PixelFormat,
}

impl<'a> PrepareContext<'a> {
    pub(crate) fn new(
        input_formats: &'a [Option<PixelFormat>],
        output_format: PixelFormat,
    ) -> Self {
        Self {
            input_formats,
            output_format,
        }
    }

    /// Format produced by the producer on `input_pad`, if it is connected.
    #[must_use]
    pub fn input_format(&self, input_pad: usize) -> Option<PixelFormat> {
        self.input_formats.get(input_pad).copied().flatten()
    }

    /// Number of input pads.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.input_formats.len()
    }

    /// Format the node currently declares.
    #[must_use]
    pub fn output_format(&self) -> PixelFormat {
        self.output_format
    }

    /// Declares the format of every output pad.
    pub fn set_output_format(&mut self, format: PixelFormat) {
        self.output_format = format;
    }
}
