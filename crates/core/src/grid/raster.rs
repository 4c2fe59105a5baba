//! Georeferenced rasters on a shared grid
//!
//! All rasters in a run live on one common grid (same CRS, resolution and
//! cell lattice) and differ only in extent. Windows onto that lattice are
//! addressed by whole-cell offsets, so clipping never interpolates.
//!
//! NoData is stored as `NaN` and is never a legitimate trait value.

use crate::error::AlignmentError;
use crate::grid::BoundingBox;
use serde::{Deserialize, Serialize};

/// Fraction of a cell two grids may disagree by and still be "aligned"
const ALIGN_TOLERANCE: f64 = 1e-6;

/// Signed whole-cell offset between two aligned grids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellOffset {
    pub row: i64,
    pub col: i64,
}

/// Raster lattice definition
///
/// Cell `(row, col)` has its centre at
///   x = xmin + (col + 0.5) * resolution
///   y = ymax - (row + 0.5) * resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// West edge (CRS units)
    pub xmin: f64,
    /// North edge (CRS units)
    pub ymax: f64,
    /// Square cell size in metres
    pub resolution: f64,
    /// Number of columns
    pub ncols: usize,
    /// Number of rows
    pub nrows: usize,
    /// Coordinate reference identifier (e.g. "EPSG:5070")
    pub crs: String,
}

impl GridSpec {
    /// Create a grid definition
    pub fn new(
        xmin: f64,
        ymax: f64,
        resolution: f64,
        ncols: usize,
        nrows: usize,
        crs: impl Into<String>,
    ) -> Self {
        GridSpec {
            xmin,
            ymax,
            resolution,
            ncols,
            nrows,
            crs: crs.into(),
        }
    }

    /// Total number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.ncols * self.nrows
    }

    /// True when the grid has no cells
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major index of a cell
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.ncols + col
    }

    /// East edge
    #[inline]
    pub fn xmax(&self) -> f64 {
        self.xmin + self.ncols as f64 * self.resolution
    }

    /// South edge
    #[inline]
    pub fn ymin(&self) -> f64 {
        self.ymax - self.nrows as f64 * self.resolution
    }

    /// Centre of a cell in CRS coordinates
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> [f64; 2] {
        [
            self.xmin + (col as f64 + 0.5) * self.resolution,
            self.ymax - (row as f64 + 0.5) * self.resolution,
        ]
    }

    /// Outer extent of the grid
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            xmin: self.xmin,
            ymin: self.ymin(),
            xmax: self.xmax(),
            ymax: self.ymax,
        }
    }

    /// Area of one cell in square metres
    #[inline]
    pub fn cell_area(&self) -> f64 {
        self.resolution * self.resolution
    }

    /// Locate `other`'s origin on this grid's lattice
    ///
    /// Cell `(r, c)` of `other` is cell `(r + offset.row, c + offset.col)` here.
    ///
    /// # Errors
    /// Returns `AlignmentError` if the grids differ in CRS or resolution, or if
    /// their origins are not separated by a whole number of cells.
    pub fn offset_of(&self, other: &GridSpec) -> Result<CellOffset, AlignmentError> {
        if self.crs != other.crs {
            return Err(AlignmentError::Crs {
                expected: self.crs.clone(),
                found: other.crs.clone(),
            });
        }
        if (self.resolution - other.resolution).abs() > ALIGN_TOLERANCE * self.resolution {
            return Err(AlignmentError::Resolution {
                expected: self.resolution,
                found: other.resolution,
            });
        }

        let dx = (other.xmin - self.xmin) / self.resolution;
        let dy = (self.ymax - other.ymax) / self.resolution;
        if (dx - dx.round()).abs() > ALIGN_TOLERANCE || (dy - dy.round()).abs() > ALIGN_TOLERANCE
        {
            return Err(AlignmentError::Origin { dx, dy });
        }

        Ok(CellOffset {
            row: dy.round() as i64,
            col: dx.round() as i64,
        })
    }

    /// Sub-grid of whole cells covering `bbox`, clipped to this grid
    ///
    /// Returns `None` when `bbox` does not overlap the grid.
    pub fn window(&self, bbox: &BoundingBox) -> Option<GridSpec> {
        let col0 = ((bbox.xmin - self.xmin) / self.resolution).floor().max(0.0);
        let col1 = ((bbox.xmax - self.xmin) / self.resolution)
            .ceil()
            .min(self.ncols as f64);
        let row0 = ((self.ymax - bbox.ymax) / self.resolution).floor().max(0.0);
        let row1 = ((self.ymax - bbox.ymin) / self.resolution)
            .ceil()
            .min(self.nrows as f64);

        if col1 <= col0 || row1 <= row0 {
            return None;
        }

        Some(GridSpec {
            xmin: self.xmin + col0 * self.resolution,
            ymax: self.ymax - row0 * self.resolution,
            resolution: self.resolution,
            ncols: (col1 - col0) as usize,
            nrows: (row1 - row0) as usize,
            crs: self.crs.clone(),
        })
    }
}

/// Single-band raster with `NaN` as NoData
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub(crate) grid: GridSpec,
    /// Values in row-major order (row * ncols + col)
    pub(crate) data: Vec<f64>,
}

impl Raster {
    /// Wrap row-major values
    ///
    /// # Errors
    /// Returns `AlignmentError::Shape` if `data` does not fill the grid.
    pub fn new(grid: GridSpec, data: Vec<f64>) -> Result<Self, AlignmentError> {
        if data.len() != grid.len() {
            return Err(AlignmentError::Shape {
                len: data.len(),
                ncols: grid.ncols,
                nrows: grid.nrows,
            });
        }
        Ok(Raster { grid, data })
    }

    /// Wrap values that mark missing cells with a numeric sentinel
    ///
    /// # Errors
    /// Returns `AlignmentError::Shape` if `data` does not fill the grid.
    pub fn with_nodata_value(
        grid: GridSpec,
        mut data: Vec<f64>,
        nodata: f64,
    ) -> Result<Self, AlignmentError> {
        for value in &mut data {
            if *value == nodata {
                *value = f64::NAN;
            }
        }
        Raster::new(grid, data)
    }

    /// Raster with every cell set to `value`
    pub fn filled(grid: GridSpec, value: f64) -> Self {
        let data = vec![value; grid.len()];
        Raster { grid, data }
    }

    /// Raster with every cell NoData
    pub fn nodata(grid: GridSpec) -> Self {
        Raster::filled(grid, f64::NAN)
    }

    /// Grid definition
    #[inline]
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Row-major values (NoData as `NaN`)
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Value at a cell, `None` for NoData
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        assert!(
            row < self.grid.nrows && col < self.grid.ncols,
            "Coordinates out of bounds"
        );
        let value = self.data[self.grid.index(row, col)];
        (!value.is_nan()).then_some(value)
    }

    /// Value at a flat index, `None` for NoData or out of range
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied().filter(|v| !v.is_nan())
    }

    /// Set a cell; `None` writes NoData
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        assert!(
            row < self.grid.nrows && col < self.grid.ncols,
            "Coordinates out of bounds"
        );
        let index = self.grid.index(row, col);
        self.data[index] = value.unwrap_or(f64::NAN);
    }

    /// Number of non-NoData cells
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Apply `f` to every valid cell, leaving NoData untouched
    pub fn map_valid(&self, f: impl Fn(f64) -> f64) -> Raster {
        let data = self
            .data
            .iter()
            .map(|&v| if v.is_nan() { v } else { f(v) })
            .collect();
        Raster {
            grid: self.grid.clone(),
            data,
        }
    }

    /// Re-window this raster onto `target`
    ///
    /// Cells of `target` that fall outside this raster become NoData.
    ///
    /// # Errors
    /// Returns `AlignmentError` if `target` is not on this raster's lattice.
    pub fn clip_to(&self, target: &GridSpec) -> Result<Raster, AlignmentError> {
        let offset = self.grid.offset_of(target)?;
        let mut out = Raster::nodata(target.clone());

        for row in 0..target.nrows {
            let src_row = row as i64 + offset.row;
            if src_row < 0 || src_row >= self.grid.nrows as i64 {
                continue;
            }
            for col in 0..target.ncols {
                let src_col = col as i64 + offset.col;
                if src_col < 0 || src_col >= self.grid.ncols as i64 {
                    continue;
                }
                out.data[target.index(row, col)] =
                    self.data[self.grid.index(src_row as usize, src_col as usize)];
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(xmin: f64, ymax: f64, ncols: usize, nrows: usize) -> GridSpec {
        GridSpec::new(xmin, ymax, 30.0, ncols, nrows, "EPSG:5070")
    }

    #[test]
    fn test_raster_creation() {
        let raster = Raster::filled(grid(0.0, 120.0, 4, 3), 2.5);
        assert_eq!(raster.values().len(), 12);
        assert_eq!(raster.valid_count(), 12);
        assert_eq!(raster.get(2, 3), Some(2.5));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = Raster::new(grid(0.0, 0.0, 2, 2), vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, AlignmentError::Shape { len: 3, .. }));
    }

    #[test]
    fn test_nodata_sentinel_converted() {
        let raster =
            Raster::with_nodata_value(grid(0.0, 30.0, 3, 1), vec![1.0, -9999.0, 0.0], -9999.0)
                .unwrap();
        assert_eq!(raster.get(0, 0), Some(1.0));
        assert_eq!(raster.get(0, 1), None);
        // Zero is a value, not NoData
        assert_eq!(raster.get(0, 2), Some(0.0));
    }

    #[test]
    fn test_get_set_row_major() {
        let mut raster = Raster::nodata(grid(0.0, 90.0, 4, 3));
        raster.set(1, 2, Some(7.0));
        assert_eq!(raster.values()[6], 7.0);
        raster.set(1, 2, None);
        assert_eq!(raster.get(1, 2), None);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_bounds_check() {
        let raster = Raster::nodata(grid(0.0, 30.0, 2, 1));
        let _ = raster.get(1, 0);
    }

    #[test]
    fn test_offset_of_aligned_grids() {
        let region = grid(0.0, 300.0, 10, 10);
        let window = grid(60.0, 210.0, 3, 3);
        let offset = region.offset_of(&window).unwrap();
        assert_eq!(offset, CellOffset { row: 3, col: 2 });
    }

    #[test]
    fn test_offset_of_rejects_misalignment() {
        let region = grid(0.0, 300.0, 10, 10);

        let shifted = grid(15.0, 300.0, 3, 3);
        assert!(matches!(
            region.offset_of(&shifted),
            Err(AlignmentError::Origin { .. })
        ));

        let coarse = GridSpec::new(0.0, 300.0, 60.0, 5, 5, "EPSG:5070");
        assert!(matches!(
            region.offset_of(&coarse),
            Err(AlignmentError::Resolution { .. })
        ));

        let other_crs = GridSpec::new(0.0, 300.0, 30.0, 5, 5, "EPSG:4326");
        assert!(matches!(
            region.offset_of(&other_crs),
            Err(AlignmentError::Crs { .. })
        ));
    }

    #[test]
    fn test_window_snaps_outward_and_clips() {
        let region = grid(0.0, 300.0, 10, 10);
        let bbox = BoundingBox {
            xmin: 40.0,
            ymin: 200.0,
            xmax: 95.0,
            ymax: 250.0,
        };
        let window = region.window(&bbox).unwrap();
        assert_eq!(window.xmin, 30.0);
        assert_eq!(window.ymax, 270.0);
        assert_eq!(window.ncols, 3);
        assert_eq!(window.nrows, 3);

        let outside = BoundingBox {
            xmin: 400.0,
            ymin: 0.0,
            xmax: 500.0,
            ymax: 100.0,
        };
        assert!(region.window(&outside).is_none());
    }

    #[test]
    fn test_clip_to_pads_with_nodata() {
        let source = Raster::new(grid(0.0, 60.0, 2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        // Target shifted one cell east: its first column is the source's second
        let target = grid(30.0, 60.0, 2, 2);
        let clipped = source.clip_to(&target).unwrap();
        assert_eq!(clipped.get(0, 0), Some(2.0));
        assert_eq!(clipped.get(1, 0), Some(4.0));
        assert_eq!(clipped.get(0, 1), None);
        assert_eq!(clipped.get(1, 1), None);
    }

    #[test]
    fn test_map_valid_keeps_nodata() {
        let raster =
            Raster::new(grid(0.0, 30.0, 2, 1), vec![2.0, f64::NAN]).unwrap();
        let doubled = raster.map_valid(|v| v * 2.0);
        assert_eq!(doubled.get(0, 0), Some(4.0));
        assert_eq!(doubled.get(0, 1), None);
    }
}
