//! Fixed-grid slot allocation for glyph atlases.
//!
//! Every glyph gets one square cell. Slots are handed out from a counter and
//! never released, so the position of slot `i` is a pure function of `i` and
//! the grid width.

use crate::config::AtlasConfig;

/// Pixel rectangle of one cell, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

impl CellRect {
    /// Whether two cells share any pixel.
    pub fn overlaps(&self, other: &CellRect) -> bool {
        self.x < other.x + other.size
            && other.x < self.x + self.size
            && self.y < other.y + other.size
            && other.y < self.y + self.size
    }
}

/// Grid geometry of an atlas pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasPacker {
    cell_size: u32,
    cells_per_row: u32,
    width: u32,
    height: u32,
    max_dimension: u32,
}

impl AtlasPacker {
    /// Size a grid for `estimated_glyphs` plus slack.
    ///
    /// The grid is square unless that would exceed the maximum dimension, in
    /// which case the width is clamped and the height follows from the slot
    /// count (itself clamped).
    pub fn for_estimate(estimated_glyphs: u32, config: &AtlasConfig) -> Self {
        let cell_size = config.cell_size.max(1);
        let max_dimension = config.max_dimension.max(cell_size);
        let total_slots = (estimated_glyphs + config.slot_slack).max(config.min_slots).max(1);

        let mut cells_per_row = (f64::from(total_slots)).sqrt().ceil() as u32;
        let mut width = cells_per_row * cell_size;
        let mut height = width;

        if width > max_dimension {
            width = max_dimension;
            cells_per_row = max_dimension / cell_size;
            let rows = total_slots.div_ceil(cells_per_row);
            height = (rows * cell_size).min(max_dimension);
        }

        Self {
            cell_size,
            cells_per_row,
            width,
            height,
            max_dimension,
        }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn cells_per_row(&self) -> u32 {
        self.cells_per_row
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Length of the RGBA pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Number of cells that physically fit in the buffer.
    pub fn capacity(&self) -> u32 {
        self.cells_per_row * (self.height / self.cell_size)
    }

    /// Grid position `(column, row)` of a slot. Defined for any slot, including
    /// ones past capacity.
    pub fn slot_position(&self, slot: u32) -> (u32, u32) {
        (slot % self.cells_per_row, slot / self.cells_per_row)
    }

    /// Pixel rectangle of a slot. May lie outside the buffer past capacity.
    pub fn cell_rect(&self, slot: u32) -> CellRect {
        let (col, row) = self.slot_position(slot);
        CellRect {
            x: col * self.cell_size,
            y: row * self.cell_size,
            size: self.cell_size,
        }
    }

    /// A larger grid for the same cell size, or `None` once both dimensions
    /// are at the maximum.
    ///
    /// Both sides double while the width can still grow; after that only the
    /// height does. Dimensions are rounded down to whole cells.
    pub fn grown(&self) -> Option<Self> {
        let max = self.max_dimension;
        let (width, height) = if self.width < max {
            ((self.width * 2).min(max), (self.height * 2).min(max))
        } else {
            (self.width, (self.height * 2).min(max))
        };
        let width = (width / self.cell_size * self.cell_size).max(self.width);
        let height = (height / self.cell_size * self.cell_size).max(self.height);

        let next = Self {
            cell_size: self.cell_size,
            cells_per_row: width / self.cell_size,
            width,
            height,
            max_dimension: max,
        };
        (next.capacity() > self.capacity()).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_slot_count() {
        let packer = AtlasPacker::for_estimate(10, &AtlasConfig::default());
        // max(10 + 32, 128) = 128 slots -> ceil(sqrt(128)) = 12 per row
        assert_eq!(packer.cells_per_row(), 12);
        assert_eq!(packer.width(), 768);
        assert_eq!(packer.height(), 768);
        assert_eq!(packer.byte_len(), 12 * 12 * 64 * 64 * 4);
    }

    #[test]
    fn test_ascii_estimate() {
        let packer = AtlasPacker::for_estimate(95, &AtlasConfig::default());
        // 127 < 128 so the minimum still wins
        assert_eq!(packer.cells_per_row(), 12);
        let packer = AtlasPacker::for_estimate(200, &AtlasConfig::default());
        // 232 slots -> 16 per row
        assert_eq!(packer.cells_per_row(), 16);
        assert!(packer.capacity() >= 232);
    }

    #[test]
    fn test_clamped_to_max_dimension() {
        let packer = AtlasPacker::for_estimate(5000, &AtlasConfig::default());
        // 5032 slots would need 71 per row = 4544 px
        assert_eq!(packer.width(), 4096);
        assert_eq!(packer.cells_per_row(), 64);
        // ceil(5032 / 64) = 79 rows, clamped to 64
        assert_eq!(packer.height(), 4096);
        assert_eq!(packer.capacity(), 4096);
    }

    #[test]
    fn test_clamped_width_rectangular_height() {
        let config = AtlasConfig::default().with_max_dimension(1024);
        let packer = AtlasPacker::for_estimate(300, &config);
        // 332 slots -> 19 per row = 1216 px > 1024
        assert_eq!(packer.width(), 1024);
        assert_eq!(packer.cells_per_row(), 16);
        // ceil(332 / 16) = 21 rows = 1344 px, clamped
        assert_eq!(packer.height(), 1024);
    }

    #[test]
    fn test_slot_positions_row_major() {
        let packer = AtlasPacker::for_estimate(0, &AtlasConfig::default());
        assert_eq!(packer.slot_position(0), (0, 0));
        assert_eq!(packer.slot_position(11), (11, 0));
        assert_eq!(packer.slot_position(12), (0, 1));
        assert_eq!(packer.cell_rect(13), CellRect { x: 64, y: 64, size: 64 });
    }

    #[test]
    fn test_cells_within_capacity_never_overlap() {
        let config = AtlasConfig::default().with_cell_size(16).with_max_dimension(128);
        let packer = AtlasPacker::for_estimate(0, &config);
        let rects: Vec<_> = (0..packer.capacity()).map(|s| packer.cell_rect(s)).collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.x + a.size <= packer.width());
            assert!(a.y + a.size <= packer.height());
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_grown_doubles_until_max() {
        let config = AtlasConfig::default().with_max_dimension(2048);
        let packer = AtlasPacker::for_estimate(0, &config);
        let grown = packer.grown().unwrap();
        assert_eq!((grown.width(), grown.height()), (1536, 1536));
        let grown = grown.grown().unwrap();
        assert_eq!((grown.width(), grown.height()), (2048, 2048));
        assert!(grown.grown().is_none());
    }

    #[test]
    fn test_grown_height_only_when_width_maxed() {
        let packer = AtlasPacker {
            cell_size: 64,
            cells_per_row: 16,
            width: 1024,
            height: 512,
            max_dimension: 1024,
        };
        let grown = packer.grown().unwrap();
        assert_eq!((grown.width(), grown.height()), (1024, 1024));
        assert_eq!(grown.cells_per_row(), 16);
        // Existing slots keep their grid position when the row width is unchanged.
        assert_eq!(grown.cell_rect(37), packer.cell_rect(37));
    }

    #[test]
    fn test_grown_rounds_to_whole_cells() {
        let config = AtlasConfig::default().with_max_dimension(1000);
        let packer = AtlasPacker::for_estimate(0, &config);
        let grown = packer.grown().unwrap();
        assert_eq!((grown.width(), grown.height()), (960, 960));
        assert!(grown.grown().is_none());
    }
}
