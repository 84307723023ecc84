//! Grid specifications and elevation grids.
//!
//! A [`GridSpec`] is the pixel geometry shared by every surface in one
//! comparison: extent, cell pitch and CRS. An [`ElevationGrid`] pairs a
//! spec with row-major values, top row first. Missing cells are NaN.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::{BoundingBox, EpsgCode, GeoTransform};

/// Relative tolerance used when comparing grid geometry.
const GEOMETRY_TOLERANCE: f64 = 1e-9;

/// Pixel geometry of a north-up raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Outer extent of the grid (cell edges, not centers)
    pub extent: BoundingBox,
    /// Cell width in map units
    pub dx: f64,
    /// Cell height in map units (positive)
    pub dy: f64,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Projection of the grid
    pub crs: EpsgCode,
}

impl GridSpec {
    /// Build a spec from an extent and cell size.
    ///
    /// `width = round((max_x - min_x) / dx)` and likewise for the height.
    /// The extent's max corner is then snapped so that it is exactly
    /// `width * dx` (and `height * dy`) away from the min corner.
    pub fn from_extent(extent: BoundingBox, dx: f64, dy: f64, crs: EpsgCode) -> GridResult<Self> {
        if !(dx > 0.0 && dy > 0.0 && dx.is_finite() && dy.is_finite()) {
            return Err(GridError::InvalidCellSize { dx, dy });
        }
        if !extent.is_valid() {
            return Err(GridError::InvalidExtent(extent.to_string()));
        }

        let width = (extent.width() / dx).round() as usize;
        let height = (extent.height() / dy).round() as usize;
        if width == 0 || height == 0 {
            return Err(GridError::InvalidExtent(format!(
                "{} is smaller than one {}x{} cell",
                extent, dx, dy
            )));
        }

        let extent = BoundingBox::new(
            extent.min_x,
            extent.max_y - height as f64 * dy,
            extent.min_x + width as f64 * dx,
            extent.max_y,
        );

        Ok(Self {
            extent,
            dx,
            dy,
            width,
            height,
            crs,
        })
    }

    /// Build a spec from a raster's geotransform and pixel size.
    pub fn from_geotransform(
        gt: &GeoTransform,
        width: usize,
        height: usize,
        crs: EpsgCode,
    ) -> GridResult<Self> {
        if !gt.is_north_up() {
            return Err(GridError::RotatedGeotransform(gt.to_gdal()));
        }
        if width == 0 || height == 0 {
            return Err(GridError::InvalidExtent(format!(
                "raster has {}x{} cells",
                width, height
            )));
        }

        let (dx, dy) = gt.cell_size();
        if !(dx > 0.0 && dy > 0.0) {
            return Err(GridError::InvalidCellSize { dx, dy });
        }

        Ok(Self {
            extent: gt.extent(width, height),
            dx,
            dy,
            width,
            height,
            crs,
        })
    }

    /// North-up geotransform for this grid.
    pub fn geotransform(&self) -> GeoTransform {
        GeoTransform::north_up(self.extent.min_x, self.extent.max_y, self.dx, self.dy)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lower-left corner of the extent.
    pub fn lower_left(&self) -> (f64, f64) {
        (self.extent.min_x, self.extent.min_y)
    }

    /// Map coordinates of the center of cell (`col`, `row`).
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.extent.min_x + (col as f64 + 0.5) * self.dx,
            self.extent.max_y - (row as f64 + 0.5) * self.dy,
        )
    }

    /// Fractional pixel position of a map coordinate.
    ///
    /// The center of cell (0, 0) maps to (0.0, 0.0); the outer edge of the
    /// grid maps to -0.5 and `width - 0.5`.
    pub fn pixel_position(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.extent.min_x) / self.dx - 0.5,
            (self.extent.max_y - y) / self.dy - 0.5,
        )
    }

    /// True when both specs describe the same pixel grid.
    ///
    /// The CRS is not compared: grids are always tagged with the
    /// configured CRS, never reprojected.
    pub fn same_geometry(&self, other: &GridSpec) -> bool {
        let close = |a: f64, b: f64, scale: f64| (a - b).abs() <= GEOMETRY_TOLERANCE * scale.max(1.0);
        let span = self.extent.width().max(self.extent.height());

        self.width == other.width
            && self.height == other.height
            && close(self.dx, other.dx, self.dx)
            && close(self.dy, other.dy, self.dy)
            && close(self.extent.min_x, other.extent.min_x, span)
            && close(self.extent.max_y, other.extent.max_y, span)
    }

    /// Short human-readable geometry description for logs and errors.
    pub fn describe(&self) -> String {
        format!(
            "{}x{} cells of {}x{} at {}",
            self.width, self.height, self.dx, self.dy, self.extent
        )
    }
}

/// A gridded elevation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    spec: GridSpec,
    data: Vec<f64>,
}

impl ElevationGrid {
    /// Wrap row-major values (top row first) with their geometry.
    pub fn new(spec: GridSpec, data: Vec<f64>) -> GridResult<Self> {
        if data.len() != spec.len() {
            return Err(GridError::DimensionMismatch {
                expected: spec.len(),
                actual: data.len(),
            });
        }
        Ok(Self { spec, data })
    }

    /// A grid with every cell set to `value`.
    pub fn filled(spec: GridSpec, value: f64) -> Self {
        Self {
            spec,
            data: vec![value; spec.len()],
        }
    }

    /// A grid with every cell missing.
    pub fn missing(spec: GridSpec) -> Self {
        Self::filled(spec, f64::NAN)
    }

    /// Evaluate `f(x, y)` at every cell center.
    pub fn from_fn(spec: GridSpec, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        let mut data = Vec::with_capacity(spec.len());
        for row in 0..spec.height {
            for col in 0..spec.width {
                let (x, y) = spec.cell_center(col, row);
                data.push(f(x, y));
            }
        }
        Self { spec, data }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn into_values(self) -> Vec<f64> {
        self.data
    }

    pub fn width(&self) -> usize {
        self.spec.width
    }

    pub fn height(&self) -> usize {
        self.spec.height
    }

    /// Get the value at a specific cell.
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.spec.width || row >= self.spec.height {
            return None;
        }
        self.data.get(row * self.spec.width + col).copied()
    }

    /// Set the value at a specific cell. Out-of-range cells are ignored.
    pub fn set(&mut self, col: usize, row: usize, value: f64) {
        if col < self.spec.width && row < self.spec.height {
            self.data[row * self.spec.width + col] = value;
        }
    }

    /// Number of cells holding a finite value.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    /// Minimum over finite cells.
    pub fn min_valid(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::min)
    }

    /// Maximum over finite cells.
    pub fn max_valid(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::max)
    }

    /// Iterate `(x, y, value)` over every cell center, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        let width = self.spec.width;
        self.data.iter().enumerate().map(move |(idx, &value)| {
            let (x, y) = self.spec.cell_center(idx % width, idx / width);
            (x, y, value)
        })
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> ElevationGrid {
        Self {
            spec: self.spec,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two grids cell by cell.
    ///
    /// Fails unless both grids share the same pixel geometry.
    pub fn zip_map(
        &self,
        other: &ElevationGrid,
        f: impl Fn(f64, f64) -> f64,
    ) -> GridResult<ElevationGrid> {
        self.ensure_same_geometry(other)?;
        Ok(Self {
            spec: self.spec,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Error unless `other` lies on the same pixel grid.
    pub fn ensure_same_geometry(&self, other: &ElevationGrid) -> GridResult<()> {
        if self.spec.same_geometry(&other.spec) {
            Ok(())
        } else {
            Err(GridError::GeometryMismatch {
                expected: self.spec.describe(),
                actual: other.spec.describe(),
            })
        }
    }
}
