//! GeoTIFF reading and writing using GDAL

use super::{to_byte, PixelType, RasterSource, RasterWriter, WriteOptions};
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Metadata, MultiBandRaster, Raster};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata as _};
use std::path::Path;

/// GDAL-backed driver, enabled with the `gdal` feature
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalDriver;

impl RasterSource for GdalDriver {
    fn open(&self, path: &Path) -> Result<Raster<f64>> {
        let dataset = Dataset::open(path)?;
        let rasterband = dataset.rasterband(1)?;
        let (cols, rows) = dataset.raster_size();

        let buffer = rasterband.read_as::<f64>((0, 0), (cols, rows), (cols, rows), None)?;
        let mut raster = Raster::from_vec(buffer.data().to_vec(), rows, cols)?;

        if let Ok(gt) = dataset.geo_transform() {
            raster.set_transform(GeoTransform::from_gdal(gt));
        }

        if let Ok(srs) = dataset.spatial_ref() {
            if let Ok(wkt) = srs.to_wkt() {
                let mut crs = CRS::from_wkt(wkt);
                if let Ok(code) = srs.auth_code() {
                    crs = crs.with_epsg(code as u32);
                }
                raster.set_crs(Some(crs));
            }
        }

        if let Some(entries) = dataset.metadata_domain("") {
            let metadata: Metadata = entries
                .iter()
                .filter_map(|entry| entry.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            raster.set_metadata(metadata);
        }

        Ok(raster)
    }
}

impl RasterWriter for GdalDriver {
    fn write(&self, raster: &MultiBandRaster<f64>, path: &Path, options: &WriteOptions) -> Result<()> {
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let (rows, cols) = raster.shape();
        let bands = raster.band_count();

        let create_options = options.creation_options();
        let create_options_refs: Vec<&str> = create_options.iter().map(|s| s.as_str()).collect();

        let mut dataset = match options.pixel_type {
            PixelType::Byte => driver.create_with_band_type_with_options::<u8, _>(
                path,
                cols as isize,
                rows as isize,
                bands as isize,
                &create_options_refs,
            )?,
            PixelType::Float32 => driver.create_with_band_type_with_options::<f32, _>(
                path,
                cols as isize,
                rows as isize,
                bands as isize,
                &create_options_refs,
            )?,
        };

        // Georeferencing goes in before any band data
        dataset.set_geo_transform(&raster.transform().to_gdal())?;
        if let Some(crs) = raster.crs() {
            if let Some(wkt) = crs.wkt() {
                dataset.set_spatial_ref(&SpatialRef::from_wkt(wkt)?)?;
            } else if let Some(epsg) = crs.epsg() {
                dataset.set_spatial_ref(&SpatialRef::from_epsg(epsg)?)?;
            }
        }
        for (key, value) in raster.metadata() {
            dataset.set_metadata_item(key, value, "")?;
        }

        for (index, band) in raster.bands().enumerate() {
            let mut target = dataset.rasterband(index + 1)?;
            match options.pixel_type {
                PixelType::Byte => {
                    let data: Vec<u8> = band.iter().map(|&v| to_byte(v)).collect();
                    target.write((0, 0), (cols, rows), &data)?;
                }
                PixelType::Float32 => {
                    let data: Vec<f32> = band.iter().map(|&v| v as f32).collect();
                    target.write((0, 0), (cols, rows), &data)?;
                }
            }
        }

        dataset.flush_cache().map_err(|e| Error::Gdal(e.to_string()))?;
        Ok(())
    }
}
