// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse tiled pixel storage.

use core::ops::RangeInclusive;

use hashbrown::HashMap;
use understory_graph::{Buffer, BufferError, PixelFormat};
use understory_region::Rect;

/// A sparse plane of pixels stored as square tiles.
///
/// Tiles are allocated on first write and never shrink; pixels that were
/// never written read as zero. Tile `(tx, ty)` covers
/// `tx * size .. (tx + 1) * size` horizontally and likewise vertically.
///
/// ```rust
/// use understory_graph::{Buffer, PixelFormat};
/// use understory_projection::TileBuffer;
/// use understory_region::Rect;
///
/// let mut tiles = TileBuffer::new(PixelFormat::Y_U8, 16);
/// let mut patch = Buffer::new(PixelFormat::Y_U8, Rect::new(14, 0, 4, 1));
/// patch.fill(&[3]).unwrap();
/// tiles.write(&patch).unwrap();
/// assert_eq!(tiles.len(), 2);
///
/// let back = tiles.read(Rect::new(12, 0, 8, 1));
/// assert_eq!(back.data(), &[0, 0, 3, 3, 3, 3, 0, 0]);
/// ```
#[derive(Clone, Debug)]
pub struct TileBuffer {
    format: PixelFormat,
    size: i32,
    tiles: HashMap<(i32, i32), Buffer>,
}

impl TileBuffer {
    /// Creates an empty store of `size × size` tiles. Sizes below 1 act as 1.
    #[must_use]
    pub fn new(format: PixelFormat, size: i32) -> Self {
        Self {
            format,
            size: size.max(1),
            tiles: HashMap::new(),
        }
    }

    /// Format of the stored pixels.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Tile edge length.
    #[must_use]
    pub fn tile_size(&self) -> i32 {
        self.size
    }

    /// Number of allocated tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` if no tile was ever written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Coordinates of the allocated tiles, in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.tiles.keys().copied()
    }

    /// Stores the pixels of `src`, allocating tiles as needed.
    ///
    /// Fails without writing anything if `src` is in another format.
    pub fn write(&mut self, src: &Buffer) -> Result<(), BufferError> {
        if src.format() != self.format {
            return Err(BufferError::FormatMismatch {
                expected: self.format,
                actual: src.format(),
            });
        }
        let extent = src.extent();
        if extent.is_empty() {
            return Ok(());
        }
        for ty in tile_range(extent.y(), extent.height(), self.size) {
            for tx in tile_range(extent.x(), extent.width(), self.size) {
                let (format, rect) = (self.format, self.tile_rect(tx, ty));
                self.tiles
                    .entry((tx, ty))
                    .or_insert_with(|| Buffer::new(format, rect))
                    .copy_from(src)?;
            }
        }
        Ok(())
    }

    /// Copies out the pixels inside `rect`.
    ///
    /// `rect` must be finite; the returned buffer covers exactly it.
    #[must_use]
    pub fn read(&self, rect: Rect) -> Buffer {
        let mut out = Buffer::new(self.format, rect);
        if out.is_empty() {
            return out;
        }
        for ty in tile_range(rect.y(), rect.height(), self.size) {
            for tx in tile_range(rect.x(), rect.width(), self.size) {
                if let Some(tile) = self.tiles.get(&(tx, ty)) {
                    // Every tile shares the store's format.
                    let _ = out.copy_from(tile);
                }
            }
        }
        out
    }

    /// Frees every tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    fn tile_rect(&self, tx: i32, ty: i32) -> Rect {
        Rect::new(
            tx.saturating_mul(self.size),
            ty.saturating_mul(self.size),
            self.size,
            self.size,
        )
    }
}

/// Tile indices touched by the span `start .. start + len`.
fn tile_range(start: i32, len: i32, size: i32) -> RangeInclusive<i32> {
    let first = start.div_euclid(size);
    let end = i64::from(start) + i64::from(len) - 1;
    let last = i32::try_from(end.div_euclid(i64::from(size))).unwrap_or(i32::MAX);
    first..=last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_range_handles_negative_coordinates() {
        assert_eq!(tile_range(0, 128, 128), 0..=0);
        assert_eq!(tile_range(-1, 2, 128), -1..=0);
        assert_eq!(tile_range(-128, 128, 128), -1..=-1);
        assert_eq!(tile_range(100, 300, 128), 0..=3);
    }

    #[test]
    fn write_and_read_across_tiles() {
        let mut tiles = TileBuffer::new(PixelFormat::RGBA_U8, 8);
        let mut patch = Buffer::new(PixelFormat::RGBA_U8, Rect::new(-4, -4, 8, 8));
        patch.fill(&[1, 2, 3, 4]).unwrap();
        tiles.write(&patch).unwrap();
        assert_eq!(tiles.len(), 4);

        let back = tiles.read(Rect::new(-4, -4, 8, 8));
        assert_eq!(back, patch);
        let outside = tiles.read(Rect::new(100, 100, 2, 2));
        assert!(outside.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn write_rejects_foreign_format() {
        let mut tiles = TileBuffer::new(PixelFormat::RGBA_U8, 8);
        let patch = Buffer::new(PixelFormat::Y_U8, Rect::new(0, 0, 2, 2));
        assert!(matches!(
            tiles.write(&patch),
            Err(BufferError::FormatMismatch { .. })
        ));
        assert!(tiles.is_empty());
    }

    #[test]
    fn later_writes_overwrite() {
        let mut tiles = TileBuffer::new(PixelFormat::Y_U8, 4);
        let mut a = Buffer::new(PixelFormat::Y_U8, Rect::new(0, 0, 4, 1));
        a.fill(&[1]).unwrap();
        let mut b = Buffer::new(PixelFormat::Y_U8, Rect::new(2, 0, 4, 1));
        b.fill(&[2]).unwrap();
        tiles.write(&a).unwrap();
        tiles.write(&b).unwrap();
        assert_eq!(tiles.read(Rect::new(0, 0, 6, 1)).data(), &[1, 1, 2, 2, 2, 2]);
        tiles.clear();
        assert!(tiles.is_empty());
    }
}
