//! Sequential band resolution with ordered fallback

use super::spec::{channel_name, BandId, BandSpec};
use crate::error::{Error, Result};
use crate::io::RasterSource;
use crate::raster::Raster;
use crate::scene::{SceneId, SceneLayout};
use tracing::{debug, info};

/// A band accepted for an output channel
#[derive(Debug, Clone)]
pub struct ResolvedBand {
    /// Output channel index (0-based)
    pub channel: usize,
    /// Band number that opened successfully
    pub band: BandId,
    /// The opened raster, owned by the caller from here on
    pub raster: Raster<f64>,
}

/// Opens the bands of one scene through a [`RasterSource`], trying the
/// candidates of each [`BandSpec`] strictly in order.
pub struct BandResolver<S> {
    source: S,
    layout: SceneLayout,
    scene: SceneId,
}

impl<S: RasterSource> BandResolver<S> {
    pub fn new(source: S, layout: SceneLayout, scene: SceneId) -> Self {
        Self {
            source,
            layout,
            scene,
        }
    }

    pub fn scene(&self) -> &SceneId {
        &self.scene
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    /// Open a single band file of the scene
    pub fn open_band(&self, band: BandId) -> Result<Raster<f64>> {
        let path = self.layout.band_path(&self.scene, band);
        self.source.open(&path)
    }

    /// Resolve one channel: the first candidate that opens wins and the
    /// remaining candidates are never touched.
    pub fn resolve_channel(&self, channel: usize, spec: &BandSpec) -> Result<ResolvedBand> {
        for &band in spec.candidates() {
            match self.open_band(band) {
                Ok(raster) => {
                    info!("Channel {}: using band {}", channel_name(channel), band);
                    return Ok(ResolvedBand {
                        channel,
                        band,
                        raster,
                    });
                }
                Err(e) => debug!("Channel {}: band {} unavailable: {}", channel_name(channel), band, e),
            }
        }
        Err(Error::BandNotFound {
            channel,
            attempted: spec.candidates().to_vec(),
        })
    }

    /// Resolve every channel in order, stopping at the first channel with no
    /// openable candidate.
    pub fn resolve(&self, specs: &[BandSpec]) -> Result<Vec<ResolvedBand>> {
        specs
            .iter()
            .enumerate()
            .map(|(channel, spec)| self.resolve_channel(channel, spec))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryDriver;
    use crate::scene::Instrument;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    const SCENE: &str = "EO1A1930292014029110PZ";

    /// Source that records every path it was asked to open
    struct Recording {
        inner: MemoryDriver,
        opened: RefCell<Vec<PathBuf>>,
    }

    impl RasterSource for Recording {
        fn open(&self, path: &Path) -> Result<Raster<f64>> {
            self.opened.borrow_mut().push(path.to_path_buf());
            self.inner.open(path)
        }
    }

    fn resolver_with_bands(bands: &[BandId]) -> BandResolver<Recording> {
        let scene = SceneId::parse(SCENE).unwrap();
        let layout = SceneLayout::for_scene(&scene);
        let inner = MemoryDriver::new();
        for &band in bands {
            inner.insert(layout.band_path(&scene, band), Raster::filled(2, 2, band as f64));
        }
        let source = Recording {
            inner,
            opened: RefCell::new(Vec::new()),
        };
        BandResolver::new(source, layout, scene)
    }

    #[test]
    fn test_first_available_candidate_wins() {
        let resolver = resolver_with_bands(&[3, 4, 5]);
        let resolved = resolver
            .resolve(&BandSpec::rgb_defaults(Instrument::Ali))
            .unwrap();
        let bands: Vec<BandId> = resolved.iter().map(|r| r.band).collect();
        assert_eq!(bands, vec![5, 4, 3]);
        assert_eq!(resolved[1].raster.get(0, 0).unwrap(), 4.0);
    }

    #[test]
    fn test_fallback_skips_missing_band() {
        let resolver = resolver_with_bands(&[3, 5]);
        let resolved = resolver
            .resolve(&BandSpec::rgb_defaults(Instrument::Ali))
            .unwrap();
        assert_eq!(resolved[1].band, 3);
        assert_eq!(resolved[2].band, 3);
        // 5, then 4 (missing) and 3 for G, then 3 for B
        assert_eq!(resolver.source.opened.borrow().len(), 4);
    }

    #[test]
    fn test_fails_fast_on_first_unresolved_channel() {
        let resolver = resolver_with_bands(&[3]);
        let err = resolver
            .resolve(&BandSpec::rgb_defaults(Instrument::Ali))
            .unwrap_err();
        match err {
            Error::BandNotFound { channel, attempted } => {
                assert_eq!(channel, 0);
                assert_eq!(attempted, vec![5]);
            }
            other => panic!("expected BandNotFound, got {other:?}"),
        }
        // G and B were never attempted
        assert_eq!(resolver.source.opened.borrow().len(), 1);
    }

    #[test]
    fn test_reports_every_attempted_candidate() {
        let resolver = resolver_with_bands(&[5]);
        let err = resolver
            .resolve(&BandSpec::rgb_defaults(Instrument::Ali))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BandNotFound { channel: 1, ref attempted } if attempted == &vec![4, 3]
        ));
    }
}
