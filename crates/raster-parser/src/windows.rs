//! Masked tile windows over a raster band.

use cube_common::{CubeError, CubeResult, Tile};

/// One band of a raster, read into memory together with its validity mask.
#[derive(Debug, Clone)]
pub struct BandData {
    band: usize,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
    valid: Vec<bool>,
}

impl BandData {
    /// Assemble band data from raw parts (row-major, mask true = valid).
    pub fn from_parts(
        band: usize,
        rows: usize,
        cols: usize,
        values: Vec<f64>,
        valid: Vec<bool>,
    ) -> CubeResult<Self> {
        if values.len() != rows * cols || valid.len() != values.len() {
            return Err(CubeError::MalformedInput(format!(
                "band {band} data/mask lengths {}/{} do not match shape {rows}x{cols}",
                values.len(),
                valid.len()
            )));
        }
        Ok(Self {
            band,
            rows,
            cols,
            values,
            valid,
        })
    }

    /// 1-based GDAL band index this data was read from.
    pub fn band(&self) -> usize {
        self.band
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Lazy sequence of `(row, col, tile)` for every window whose validity
    /// mask has at least one true entry. Scans row-major from the origin in
    /// fixed non-overlapping steps; windows at the array edge may be smaller
    /// than the nominal tile size. No sorting, no deduplication.
    pub fn tile_windows(&self, tile_size: usize) -> TileWindows<'_> {
        TileWindows {
            band: self,
            cursor: Cursor::new(tile_size),
        }
    }

    /// Like [`BandData::tile_windows`], but consuming the band data, so the
    /// windows can outlive the borrow.
    pub fn into_tile_windows(self, tile_size: usize) -> TileWindowsOwned {
        TileWindowsOwned {
            cursor: Cursor::new(tile_size),
            band: self,
        }
    }

    fn next_window(&self, cursor: &mut Cursor) -> Option<(usize, usize, Tile)> {
        while cursor.row < self.rows {
            let (row0, col0) = (cursor.row, cursor.col);

            cursor.col += cursor.tile_size;
            if cursor.col >= self.cols {
                cursor.col = 0;
                cursor.row += cursor.tile_size;
            }

            let height = cursor.tile_size.min(self.rows - row0);
            let width = cursor.tile_size.min(self.cols - col0);
            if self.window_any_valid(row0, col0, height, width) {
                return Some((row0, col0, self.window(row0, col0, height, width)));
            }
        }
        None
    }

    fn window(&self, row0: usize, col0: usize, height: usize, width: usize) -> Tile {
        let mut values = Vec::with_capacity(height * width);
        let mut mask = Vec::with_capacity(height * width);
        for row in row0..row0 + height {
            let start = row * self.cols + col0;
            values.extend_from_slice(&self.values[start..start + width]);
            mask.extend_from_slice(&self.valid[start..start + width]);
        }
        // Lengths match by construction
        Tile::with_mask(height, width, values, mask).expect("window shape is consistent")
    }

    fn window_any_valid(&self, row0: usize, col0: usize, height: usize, width: usize) -> bool {
        (row0..row0 + height).any(|row| {
            let start = row * self.cols + col0;
            self.valid[start..start + width].iter().any(|&v| v)
        })
    }
}

/// Scan position of a window iterator.
struct Cursor {
    tile_size: usize,
    row: usize,
    col: usize,
}

impl Cursor {
    fn new(tile_size: usize) -> Self {
        Self {
            tile_size: tile_size.max(1),
            row: 0,
            col: 0,
        }
    }
}

/// Iterator over the masked tile windows of one band.
pub struct TileWindows<'a> {
    band: &'a BandData,
    cursor: Cursor,
}

impl Iterator for TileWindows<'_> {
    type Item = (usize, usize, Tile);

    fn next(&mut self) -> Option<Self::Item> {
        self.band.next_window(&mut self.cursor)
    }
}

/// Owning variant of [`TileWindows`].
pub struct TileWindowsOwned {
    band: BandData,
    cursor: Cursor,
}

impl Iterator for TileWindowsOwned {
    type Item = (usize, usize, Tile);

    fn next(&mut self) -> Option<Self::Item> {
        self.band.next_window(&mut self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(rows: usize, cols: usize, valid: Vec<bool>) -> BandData {
        let values = (0..rows * cols).map(|i| i as f64).collect();
        BandData::from_parts(1, rows, cols, values, valid).unwrap()
    }

    #[test]
    fn test_all_valid_4x4_yields_four_windows() {
        let band = band(4, 4, vec![true; 16]);
        let windows: Vec<_> = band.tile_windows(2).collect();
        assert_eq!(windows.len(), 4);

        let origins: Vec<_> = windows.iter().map(|(r, c, _)| (*r, *c)).collect();
        assert_eq!(origins, vec![(0, 0), (0, 2), (2, 0), (2, 2)]);
        for (_, _, tile) in &windows {
            assert_eq!((tile.rows(), tile.cols()), (2, 2));
        }
    }

    #[test]
    fn test_window_contents_row_major() {
        let band = band(4, 4, vec![true; 16]);
        let (_, _, tile) = band.tile_windows(2).nth(1).unwrap();
        // Window at (0, 2) of a 4-wide band counted 0..16
        assert_eq!(tile.values(), &[2.0, 3.0, 6.0, 7.0]);
    }

    #[test]
    fn test_fully_invalid_windows_skipped() {
        let mut valid = vec![true; 16];
        // Invalidate the (0, 0) window entirely
        for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            valid[row * 4 + col] = false;
        }
        let band = band(4, 4, valid);
        let origins: Vec<_> = band.tile_windows(2).map(|(r, c, _)| (r, c)).collect();
        assert_eq!(origins, vec![(0, 2), (2, 0), (2, 2)]);
    }

    #[test]
    fn test_single_valid_entry_keeps_window() {
        let mut valid = vec![false; 16];
        valid[5] = true; // inside the (0, 0) window at (1, 1)
        let band = band(4, 4, valid);
        let windows: Vec<_> = band.tile_windows(2).collect();
        assert_eq!(windows.len(), 1);

        let (row, col, tile) = &windows[0];
        assert_eq!((*row, *col), (0, 0));
        assert!(!tile.is_valid(0, 0));
        assert!(tile.is_valid(1, 1));
    }

    #[test]
    fn test_edge_windows_clipped() {
        let band = band(5, 5, vec![true; 25]);
        let windows: Vec<_> = band.tile_windows(2).collect();
        assert_eq!(windows.len(), 9);

        let (row, col, tile) = windows.last().unwrap();
        assert_eq!((*row, *col), (4, 4));
        assert_eq!((tile.rows(), tile.cols()), (1, 1));
    }
}
