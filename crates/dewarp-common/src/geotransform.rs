//! GDAL-style affine geotransforms.

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// Affine transform from pixel/line to projected coordinates.
///
/// Same layout and meaning as GDAL's six-element geotransform:
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up rasters `pixel_height` is negative and both rotation
/// terms are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform with the upper-left corner at (`ulx`, `uly`).
    pub fn north_up(ulx: f64, uly: f64, dx: f64, dy: f64) -> Self {
        Self {
            origin_x: ulx,
            pixel_width: dx,
            row_rotation: 0.0,
            origin_y: uly,
            col_rotation: 0.0,
            pixel_height: -dy,
        }
    }

    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            origin_x: gt[0],
            pixel_width: gt[1],
            row_rotation: gt[2],
            origin_y: gt[3],
            col_rotation: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// True when the raster has no rotation and rows run north to south.
    pub fn is_north_up(&self) -> bool {
        self.row_rotation == 0.0 && self.col_rotation == 0.0 && self.pixel_height < 0.0
    }

    /// Cell pitch as positive (dx, dy).
    pub fn cell_size(&self) -> (f64, f64) {
        (self.pixel_width.abs(), self.pixel_height.abs())
    }

    /// Outer extent of a `width` x `height` raster.
    ///
    /// Computes the lower-right corner through the full affine terms, so
    /// rotated transforms give the same corners GDAL would report.
    pub fn extent(&self, width: usize, height: usize) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        let ulx = self.origin_x;
        let uly = self.origin_y;
        let lrx = self.origin_x + w * self.pixel_width + h * self.row_rotation;
        let lry = self.origin_y + w * self.col_rotation + h * self.pixel_height;

        BoundingBox::new(ulx.min(lrx), uly.min(lry), ulx.max(lrx), uly.max(lry))
    }
}
