// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projection configuration.

use understory_graph::PixelFormat;
use understory_region::Rect;

/// Default upper bound on the pixel area of one rendered chunk (128 × 128).
pub const DEFAULT_MAX_CHUNK_AREA: u64 = 128 * 128;

/// Default edge length of a storage tile, in pixels.
pub const DEFAULT_TILE_SIZE: i32 = 128;

/// Default canvas: ±65536 pixels around the origin.
pub const DEFAULT_EXTENT: Rect = Rect::new(-65536, -65536, 131_072, 131_072);

/// How an oversized dirty rectangle is cut into chunks.
///
/// Both policies cut across the longer axis (the width on ties) and render
/// the piece nearer the origin first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Cut the rectangle in half.
    #[default]
    Halve,
    /// Cut off a band of 128 or 256 pixels when the half is close to that, so
    /// chunks line up with power-of-two tiles.
    TileAligned,
}

impl SplitPolicy {
    /// Length of the first piece when cutting a side of `size` pixels.
    ///
    /// Always at least 1 and, for `size >= 2`, less than `size`.
    ///
    /// ```rust
    /// use understory_projection::SplitPolicy;
    ///
    /// assert_eq!(SplitPolicy::Halve.band(300), 150);
    /// assert_eq!(SplitPolicy::TileAligned.band(300), 128);
    /// assert_eq!(SplitPolicy::TileAligned.band(900), 256);
    /// assert_eq!(SplitPolicy::TileAligned.band(4000), 2000);
    /// ```
    #[must_use]
    pub fn band(self, size: i32) -> i32 {
        let half = size / 2;
        let band = match self {
            Self::Halve => half,
            Self::TileAligned if half <= 256 => half.min(128),
            Self::TileAligned if half <= 512 => half.min(256),
            Self::TileAligned => half,
        };
        band.max(1)
    }
}

/// Settings for a [`Projection`](crate::Projection).
///
/// ```rust
/// use understory_graph::PixelFormat;
/// use understory_projection::{ProjectionConfig, SplitPolicy};
/// use understory_region::Rect;
///
/// let config = ProjectionConfig::default()
///     .with_max_chunk_area(64 * 64)
///     .with_split_policy(SplitPolicy::TileAligned)
///     .with_extent(Rect::new(0, 0, 1920, 1080))
///     .with_format(PixelFormat::RGBA_F32);
/// assert_eq!(config.max_chunk_area, 4096);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// Largest pixel area rendered in one step. Values below 1 act as 1.
    pub max_chunk_area: u64,
    /// How oversized dirty rectangles are cut.
    pub split_policy: SplitPolicy,
    /// Canvas outside of which nothing is ever queued or stored.
    pub extent: Rect,
    /// Format of the stored pixels. Chunks rendered in another format are
    /// rejected.
    pub format: PixelFormat,
    /// Edge length of storage tiles. Values below 1 act as 1.
    pub tile_size: i32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_chunk_area: DEFAULT_MAX_CHUNK_AREA,
            split_policy: SplitPolicy::Halve,
            extent: DEFAULT_EXTENT,
            format: PixelFormat::RGBA_U8,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl ProjectionConfig {
    /// Sets [`max_chunk_area`](Self::max_chunk_area).
    #[must_use]
    pub fn with_max_chunk_area(mut self, area: u64) -> Self {
        self.max_chunk_area = area;
        self
    }

    /// Sets [`split_policy`](Self::split_policy).
    #[must_use]
    pub fn with_split_policy(mut self, policy: SplitPolicy) -> Self {
        self.split_policy = policy;
        self
    }

    /// Sets [`extent`](Self::extent).
    #[must_use]
    pub fn with_extent(mut self, extent: Rect) -> Self {
        self.extent = extent;
        self
    }

    /// Sets [`format`](Self::format).
    #[must_use]
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets [`tile_size`](Self::tile_size).
    #[must_use]
    pub fn with_tile_size(mut self, size: i32) -> Self {
        self.tile_size = size;
        self
    }
}
