//! Multi-band raster sharing one georeferencing

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Metadata, Raster, RasterElement};
use ndarray::{Array2, ArrayView2};

/// A stack of equally sized bands with a single transform, CRS and
/// metadata map, the in-memory form of a multi-band GeoTIFF.
///
/// Band indices are 0-based here; file formats number bands from 1.
#[derive(Debug, Clone)]
pub struct MultiBandRaster<T: RasterElement> {
    bands: Vec<Array2<T>>,
    transform: GeoTransform,
    crs: Option<CRS>,
    metadata: Metadata,
}

impl<T: RasterElement> MultiBandRaster<T> {
    /// Build a stack from band arrays.
    ///
    /// All bands must share the shape of the first one and the stack must
    /// not be empty.
    pub fn from_bands(bands: Vec<Array2<T>>) -> Result<Self> {
        let first = bands.first().ok_or_else(|| Error::InvalidParameter {
            name: "bands",
            value: "0".into(),
            reason: "a raster needs at least one band".into(),
        })?;
        let shape = first.dim();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(Error::InvalidDimensions {
                width: shape.1,
                height: shape.0,
            });
        }
        if let Some(bad) = bands.iter().find(|b| b.dim() != shape) {
            return Err(Error::mismatch(shape, bad.dim()));
        }

        Ok(Self {
            bands,
            transform: GeoTransform::default(),
            crs: None,
            metadata: Metadata::new(),
        })
    }

    /// Wrap a single-band raster, keeping its georeferencing.
    pub fn from_raster(raster: Raster<T>) -> Self {
        let transform = *raster.transform();
        let crs = raster.crs().cloned();
        let metadata = raster.metadata().clone();
        Self {
            bands: vec![raster.into_array()],
            transform,
            crs,
            metadata,
        }
    }

    /// Copy transform, CRS and metadata from `reference` verbatim.
    pub fn copy_georeferencing<U: RasterElement>(&mut self, reference: &Raster<U>) {
        self.transform = *reference.transform();
        self.crs = reference.crs().cloned();
        self.metadata = reference.metadata().clone();
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].dim()
    }

    /// Number of rows (height)
    pub fn rows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns (width)
    pub fn cols(&self) -> usize {
        self.shape().1
    }

    /// View of band `index` (0-based)
    pub fn band(&self, index: usize) -> Option<ArrayView2<'_, T>> {
        self.bands.get(index).map(|b| b.view())
    }

    /// Iterate over all bands in order
    pub fn bands(&self) -> impl Iterator<Item = ArrayView2<'_, T>> {
        self.bands.iter().map(|b| b.view())
    }

    /// Extract band `index` (0-based) as a standalone raster carrying this
    /// stack's georeferencing.
    pub fn to_raster(&self, index: usize) -> Option<Raster<T>> {
        let band = self.bands.get(index)?;
        let mut raster = Raster::from_array(band.clone());
        raster.set_transform(self.transform);
        raster.set_crs(self.crs.clone());
        raster.set_metadata(self.metadata.clone());
        Some(raster)
    }

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

    /// Key/value metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Replace the metadata map
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }
}
