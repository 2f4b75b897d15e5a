//! Affine georeferencing for rasters

use serde::{Deserialize, Serialize};

/// Pixel-to-map affine transform, stored with named coefficients.
///
/// In GDAL coefficient order `[gt0, gt1, gt2, gt3, gt4, gt5]`:
/// ```text
/// x = gt0 + col * gt1 + row * gt2
/// y = gt3 + col * gt4 + row * gt5
/// ```
/// L1T scenes are north-up, so `gt2 = gt4 = 0` and `gt5 < 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// gt0
    pub origin_x: f64,
    /// gt3
    pub origin_y: f64,
    /// gt1
    pub pixel_width: f64,
    /// gt5, negative for north-up
    pub pixel_height: f64,
    /// gt2
    pub row_rotation: f64,
    /// gt4
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform without rotation terms
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::from_gdal([origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
    }

    pub fn from_gdal(gt: [f64; 6]) -> Self {
        let [origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height] = gt;
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation,
            col_rotation,
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

    /// Map coordinates of the pixel-grid vertex `(col, row)`
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let [gt0, gt1, gt2, gt3, gt4, gt5] = self.to_gdal();
        (gt0 + col * gt1 + row * gt2, gt3 + col * gt4 + row * gt5)
    }

    /// Map coordinates of the top-left corner of pixel (col, row)
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64, row as f64)
    }

    pub fn has_rotation(&self) -> bool {
        self.row_rotation != 0.0 || self.col_rotation != 0.0
    }

    /// Vertex opposite the origin for a `width x height` grid
    pub fn far_corner(&self, width: usize, height: usize) -> (f64, f64) {
        self.pixel_to_geo_corner(width, height)
    }

    /// `(min_x, min_y, max_x, max_y)` over the four grid corners
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        [(0, 0), (width, 0), (0, height), (width, height)]
            .into_iter()
            .map(|(c, r)| self.pixel_to_geo_corner(c, r))
            .fold(
                (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                |(x0, y0, x1, y1), (x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            )
    }
}

impl Default for GeoTransform {
    /// Unit pixels anchored at the origin
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
