//! In-memory raster store

use super::{RasterSource, RasterWriter, WriteOptions};
use crate::error::{Error, Result};
use crate::raster::{MultiBandRaster, Raster};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Path-keyed raster store implementing both [`RasterSource`] and
/// [`RasterWriter`].
///
/// Written stacks are kept exactly as given; no pixel type conversion is
/// applied, so a write followed by a read returns the original samples.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    files: Mutex<BTreeMap<PathBuf, MultiBandRaster<f64>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a single-band raster under `path`
    pub fn insert(&self, path: impl Into<PathBuf>, raster: Raster<f64>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), MultiBandRaster::from_raster(raster));
        }
    }

    /// Stack stored under `path`, if any
    pub fn get(&self, path: &Path) -> Option<MultiBandRaster<f64>> {
        self.files.lock().ok()?.get(path).cloned()
    }

    /// All stored paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<PathBuf, MultiBandRaster<f64>>>> {
        self.files
            .lock()
            .map_err(|_| Error::Other("memory driver lock poisoned".into()))
    }
}

impl RasterSource for MemoryDriver {
    fn open(&self, path: &Path) -> Result<Raster<f64>> {
        self.lock()?
            .get(path)
            .and_then(|stack| stack.to_raster(0))
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                ))
            })
    }
}

impl RasterWriter for MemoryDriver {
    fn write(&self, raster: &MultiBandRaster<f64>, path: &Path, _options: &WriteOptions) -> Result<()> {
        self.lock()?.insert(path.to_path_buf(), raster.clone());
        Ok(())
    }
}
