// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trivial operations every graph needs: pass-through, fill and crop.

use alloc::format;

use smallvec::SmallVec;
use understory_region::Rect;

use crate::{Buffer, Operation, OperationError, PixelFormat, PrepareContext};

/// Passes its input through unchanged.
///
/// Useful as a stable attachment point: projections can watch a `Nop` while
/// the graph feeding it is rewired.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Nop;

impl Operation for Nop {
    fn name(&self) -> &str {
        "nop"
    }

    fn process(
        &mut self,
        _output_pad: usize,
        inputs: &[Buffer],
        roi: Rect,
    ) -> Result<Buffer, OperationError> {
        Ok(inputs[0].resized(roi))
    }
}

/// Fills its extent with one pixel value.
///
/// The extent defaults to [`Rect::INFINITE`], an unbounded plane.
///
/// ```rust
/// use understory_graph::{Operation, SolidColor};
/// use understory_region::Rect;
///
/// let color = SolidColor::rgba8([0, 128, 255, 255]);
/// assert!(color.bounding_box(&[]).is_infinite());
/// let bounded = color.with_extent(Rect::new(0, 0, 16, 16));
/// assert_eq!(bounded.bounding_box(&[]), Rect::new(0, 0, 16, 16));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolidColor {
    format: PixelFormat,
    pixel: SmallVec<[u8; 16]>,
    extent: Rect,
}

impl SolidColor {
    /// Fills with `pixel`, which must be `format.bytes_per_pixel()` long.
    #[must_use]
    pub fn new(format: PixelFormat, pixel: &[u8]) -> Self {
        Self {
            format,
            pixel: SmallVec::from_slice(pixel),
            extent: Rect::INFINITE,
        }
    }

    /// Fills with an 8-bit RGBA color.
    #[must_use]
    pub fn rgba8(rgba: [u8; 4]) -> Self {
        Self::new(PixelFormat::RGBA_U8, &rgba)
    }

    /// Limits the fill to `extent`.
    #[must_use]
    pub fn with_extent(mut self, extent: Rect) -> Self {
        self.extent = extent;
        self
    }

    /// Changes the filled area.
    pub fn set_extent(&mut self, extent: Rect) {
        self.extent = extent;
    }

    /// Changes the pixel value and its format.
    pub fn set_pixel(&mut self, format: PixelFormat, pixel: &[u8]) {
        self.format = format;
        self.pixel = SmallVec::from_slice(pixel);
    }

    /// Filled area.
    #[must_use]
    pub fn extent(&self) -> Rect {
        self.extent
    }
}

impl Operation for SolidColor {
    fn name(&self) -> &str {
        "color"
    }

    fn input_pads(&self) -> &[&'static str] {
        &[]
    }

    fn prepare(&mut self, cx: &mut PrepareContext<'_>) -> Result<(), OperationError> {
        if self.pixel.len() != self.format.bytes_per_pixel() {
            return Err(OperationError::Prepare(format!(
                "{} bytes do not make a {} pixel",
                self.pixel.len(),
                self.format.name()
            )));
        }
        cx.set_output_format(self.format);
        Ok(())
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
        let mut out = Buffer::new(self.format, roi);
        let fill = if self.extent.is_infinite() {
            roi
        } else {
            roi.intersect(self.extent)
        };
        if fill.is_empty() {
            return Ok(out);
        }
        let mut patch = Buffer::new(self.format, fill);
        patch
            .fill(&self.pixel)
            .map_err(|e| OperationError::Process(format!("{e}")))?;
        out.copy_from(&patch)
            .map_err(|e| OperationError::Process(format!("{e}")))?;
        Ok(out)
    }
}

/// Restricts its input to a rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Crop {
    rect: Rect,
}

impl Crop {
    /// Keeps only the pixels inside `rect`.
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// The kept rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Changes the kept rectangle.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

impl Operation for Crop {
    fn name(&self) -> &str {
        "crop"
    }

    fn bounding_box(&self, input_boxes: &[Rect]) -> Rect {
        input_boxes
            .first()
            .map_or(Rect::EMPTY, |input| input.intersect(self.rect))
    }

    fn required_for_output(&self, _input_pad: usize, output_rect: Rect) -> Rect {
        output_rect.intersect(self.rect)
    }

    fn invalidated_by_change(&self, _input_pad: usize, input_rect: Rect) -> Rect {
        input_rect.intersect(self.rect)
    }

    fn process(
        &mut self,
        _output_pad: usize,
        inputs: &[Buffer],
        roi: Rect,
    ) -> Result<Buffer, OperationError> {
        let mut out = Buffer::new(inputs[0].format(), roi);
        out.copy_from(&inputs[0].cropped(self.rect))
            .map_err(|e| OperationError::Process(format!("{e}")))?;
        Ok(out)
    }
}
