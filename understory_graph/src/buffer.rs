// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel format descriptors and rectangular pixel buffers.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use understory_region::Rect;

use crate::BufferError;

/// Opaque pixel format descriptor.
///
/// The graph only needs a name to compare formats and a pixel size to lay out
/// bytes; the meaning of the bytes belongs to the operations. Conversion
/// between formats is not provided.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    name: &'static str,
    bytes_per_pixel: u8,
}

impl PixelFormat {
    /// 8-bit gamma-encoded RGBA, straight alpha.
    pub const RGBA_U8: Self = Self::new("R'G'B'A u8", 4);
    /// 32-bit float linear RGBA.
    pub const RGBA_F32: Self = Self::new("RGBA float", 16);
    /// 8-bit luminance.
    pub const Y_U8: Self = Self::new("Y u8", 1);

    /// Describes a format with a unique `name` and pixel size.
    #[must_use]
    pub const fn new(name: &'static str, bytes_per_pixel: u8) -> Self {
        Self {
            name,
            bytes_per_pixel,
        }
    }

    /// Format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Bytes per pixel.
    #[must_use]
    pub const fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel as usize
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::RGBA_U8
    }
}

/// A row-major block of pixels covering `extent`.
///
/// Pixels are addressed in graph coordinates: [`pixel`](Self::pixel) takes the
/// same `(x, y)` a [`Rect`] uses, not an offset into the buffer.
///
/// ```rust
/// use understory_graph::{Buffer, PixelFormat};
/// use understory_region::Rect;
///
/// let mut buf = Buffer::new(PixelFormat::Y_U8, Rect::new(10, 10, 4, 2));
/// buf.fill(&[7]).unwrap();
/// assert_eq!(buf.pixel(11, 11), Some(&[7_u8][..]));
/// assert_eq!(buf.pixel(0, 0), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    format: PixelFormat,
    extent: Rect,
    data: Vec<u8>,
}

impl Buffer {
    /// Allocates a zeroed buffer.
    ///
    /// # Panics
    ///
    /// Panics if the byte size does not fit in memory, as `vec!` does. Never
    /// pass [`Rect::INFINITE`].
    #[must_use]
    pub fn new(format: PixelFormat, extent: Rect) -> Self {
        let extent = if extent.is_empty() { Rect::EMPTY } else { extent };
        Self {
            format,
            extent,
            data: vec![0; byte_len(format, extent)],
        }
    }

    /// A buffer with no pixels.
    #[must_use]
    pub fn empty(format: PixelFormat) -> Self {
        Self {
            format,
            extent: Rect::EMPTY,
            data: Vec::new(),
        }
    }

    /// Wraps existing bytes, which must match `extent` and `format` exactly.
    pub fn from_data(
        format: PixelFormat,
        extent: Rect,
        data: Vec<u8>,
    ) -> Result<Self, BufferError> {
        let expected = byte_len(format, extent);
        if data.len() != expected {
            return Err(BufferError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let extent = if extent.is_empty() { Rect::EMPTY } else { extent };
        Ok(Self {
            format,
            extent,
            data,
        })
    }

    /// Pixel format.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Covered rectangle.
    #[must_use]
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Returns `true` if the buffer holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extent.is_empty()
    }

    /// Raw bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes, row-major.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer and returns its bytes.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of the pixel at `(x, y)`, or `None` outside the extent.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<&[u8]> {
        let start = self.offset(x, y)?;
        self.data.get(start..start + self.format.bytes_per_pixel())
    }

    /// Mutable bytes of the pixel at `(x, y)`, or `None` outside the extent.
    pub fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut [u8]> {
        let start = self.offset(x, y)?;
        let bpp = self.format.bytes_per_pixel();
        self.data.get_mut(start..start + bpp)
    }

    /// Sets every pixel to `pixel`.
    pub fn fill(&mut self, pixel: &[u8]) -> Result<(), BufferError> {
        let bpp = self.format.bytes_per_pixel();
        if pixel.len() != bpp {
            return Err(BufferError::SizeMismatch {
                expected: bpp,
                actual: pixel.len(),
            });
        }
        for chunk in self.data.chunks_exact_mut(bpp) {
            chunk.copy_from_slice(pixel);
        }
        Ok(())
    }

    /// Copies the pixels where `src` overlaps this buffer.
    ///
    /// Returns the rectangle that was copied, which may be empty.
    pub fn copy_from(&mut self, src: &Self) -> Result<Rect, BufferError> {
        if src.format != self.format {
            return Err(BufferError::FormatMismatch {
                expected: self.format,
                actual: src.format,
            });
        }
        let overlap = self.extent.intersect(src.extent);
        if overlap.is_empty() {
            return Ok(Rect::EMPTY);
        }
        let row_len = row_bytes(self.format, overlap.width());
        for y in overlap.y()..y_end(overlap) {
            let (Some(from), Some(to)) = (src.offset(overlap.x(), y), self.offset(overlap.x(), y))
            else {
                continue;
            };
            self.data[to..to + row_len].copy_from_slice(&src.data[from..from + row_len]);
        }
        Ok(overlap)
    }

    /// A new buffer holding the part of this one inside `rect`.
    #[must_use]
    pub fn cropped(&self, rect: Rect) -> Self {
        let mut out = Self::new(self.format, self.extent.intersect(rect));
        // Formats match by construction.
        let _ = out.copy_from(self);
        out
    }

    /// A new buffer over exactly `rect`; pixels this buffer lacks are zero.
    #[must_use]
    pub fn resized(&self, rect: Rect) -> Self {
        if rect == self.extent {
            return self.clone();
        }
        let mut out = Self::new(self.format, rect);
        let _ = out.copy_from(self);
        out
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.extent.contains_point(x, y) {
            return None;
        }
        let col = usize::try_from(i64::from(x) - i64::from(self.extent.x())).ok()?;
        let row = usize::try_from(i64::from(y) - i64::from(self.extent.y())).ok()?;
        let width = usize::try_from(self.extent.width()).ok()?;
        Some((row * width + col) * self.format.bytes_per_pixel())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("format", &self.format.name())
            .field("extent", &self.extent)
            .field("bytes", &self.data.len())
            .finish()
    }
}

fn row_bytes(format: PixelFormat, width: i32) -> usize {
    usize::try_from(width).unwrap_or(0) * format.bytes_per_pixel()
}

fn y_end(rect: Rect) -> i32 {
    rect.y().saturating_add(rect.height())
}

fn byte_len(format: PixelFormat, extent: Rect) -> usize {
    let pixels = usize::try_from(extent.area()).unwrap_or(usize::MAX);
    pixels.saturating_mul(format.bytes_per_pixel())
}
