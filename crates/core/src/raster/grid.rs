//! Single-band raster type

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::{Array2, ArrayView2};
use std::collections::BTreeMap;

/// Free-form `KEY -> VALUE` metadata carried alongside a raster.
///
/// Kept ordered so written products are byte-for-byte reproducible.
pub type Metadata = BTreeMap<String, String>;

/// A georeferenced single-band 2D raster.
///
/// `Raster<T>` stores values of type `T` in a row-major grid together with
/// the affine transform, projection and metadata read from its source file.
///
/// # Example
///
/// ```ignore
/// use eofuse_core::Raster;
///
/// let mut raster: Raster<f64> = Raster::new(100, 100);
/// raster.set(10, 20, 42.0)?;
/// let value = raster.get(10, 20)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    transform: GeoTransform,
    crs: Option<CRS>,
    metadata: Metadata,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from row-major data.
    ///
    /// Fails when the buffer length disagrees with `rows * cols` or when
    /// either dimension is zero.
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 || data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            metadata: Metadata::new(),
        }
    }

    /// Create a raster holding `data` and a copy of this raster's
    /// transform, CRS and metadata.
    pub fn with_data<U: RasterElement>(&self, data: Array2<U>) -> Raster<U> {
        Raster {
            data,
            transform: self.transform,
            crs: self.crs.clone(),
            metadata: self.metadata.clone(),
        }
    }

    // Dimensions

    /// Number of rows (height)
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns (width)
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let (rows, cols) = self.shape();
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds { row, col, rows, cols }),
        }
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Consume the raster and return the underlying array
    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the CRS
    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Set the CRS
    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    /// Key/value metadata read from the source file
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Replace the metadata map
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    /// Insert a single metadata entry
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    // Statistics

    /// Basic statistics over the nonzero samples.
    ///
    /// Zero is the no-data sentinel of L1T band files, so it is counted
    /// separately and never enters min/max/mean.
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter() {
            let Some(v) = value.to_f64() else { continue };
            if v == 0.0 || v.is_nan() {
                continue;
            }
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            sum += v;
            count += 1;
        }

        RasterStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f64> = Raster::new(100, 200);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<u16> = Raster::new(10, 10);
        raster.set(5, 5, 42).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42);
        assert!(raster.set(10, 0, 1).is_err());
        assert!(raster.get(0, 10).is_err());
    }

    #[test]
    fn test_from_vec_rejects_empty_and_short_buffers() {
        assert!(Raster::<f64>::from_vec(vec![], 0, 3).is_err());
        assert!(Raster::<f64>::from_vec(vec![1.0, 2.0, 3.0], 2, 2).is_err());
        let r = Raster::<f64>::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(r.get(1, 0).unwrap(), 3.0);
    }

    #[test]
    fn test_with_data_copies_georeferencing() {
        let mut src: Raster<u16> = Raster::new(2, 2);
        src.set_transform(GeoTransform::new(500000.0, 4200000.0, 30.0, -30.0));
        src.set_crs(Some(CRS::from_epsg(32633)));
        src.insert_metadata("AREA_OR_POINT", "Area");

        let out: Raster<f64> = src.with_data(Array2::from_elem((2, 2), 1.5));
        assert_eq!(out.transform(), src.transform());
        assert_eq!(out.crs(), src.crs());
        assert_eq!(out.metadata().get("AREA_OR_POINT").map(String::as_str), Some("Area"));
    }

    #[test]
    fn test_statistics_skip_zero_samples() {
        let raster = Raster::from_vec(vec![0u16, 10, 20, 0, 30, 0], 2, 3).unwrap();
        let stats = raster.statistics();
        assert_eq!(stats.min, Some(10));
        assert_eq!(stats.max, Some(30));
        assert_eq!(stats.mean, Some(20.0));
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.nodata_count, 3);
    }
}
