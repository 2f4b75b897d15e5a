//! Archive layout configuration

use super::{Instrument, SceneId};
use crate::bands::BandId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root of the public EO-1 archive on the Open Science Data Cloud
pub const DEFAULT_BASE_PATH: &str = "/glusterfs/osdc_public_data/eo1";

/// Where the band files of a scene live and how they are named.
///
/// ```text
/// <base_path>/<instrument dir>/<YYYY>/<DDD>/<scene><suffix>/<scene>_B<band>_L1T.TIF
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    /// Instrument whose directory and suffix tables apply
    pub instrument: Instrument,
    /// Archive root
    pub base_path: PathBuf,
    /// Zero-padding width of band numbers in file names
    pub band_digit_width: usize,
}

impl SceneLayout {
    /// Layout with the archive defaults for an instrument
    pub fn for_instrument(instrument: Instrument) -> Self {
        Self {
            instrument,
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            band_digit_width: instrument.band_digit_width(),
        }
    }

    /// Layout with the archive defaults for the instrument of `scene`
    pub fn for_scene(scene: &SceneId) -> Self {
        Self::for_instrument(scene.instrument())
    }

    /// Replace the archive root
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Directory holding all band files of `scene`
    pub fn scene_dir(&self, scene: &SceneId) -> PathBuf {
        self.base_path
            .join(self.instrument.directory())
            .join(format!("{:04}", scene.year()))
            .join(format!("{:03}", scene.day_of_year()))
            .join(format!("{}{}", scene, self.instrument.suffix()))
    }

    /// File name of one band, e.g. `EO1A..._B05_L1T.TIF`
    pub fn band_file_name(&self, scene: &SceneId, band: BandId) -> String {
        format!(
            "{}_B{:0width$}_L1T.TIF",
            scene,
            band,
            width = self.band_digit_width
        )
    }

    /// Full path of one band file
    pub fn band_path(&self, scene: &SceneId, band: BandId) -> PathBuf {
        self.scene_dir(scene).join(self.band_file_name(scene, band))
    }
}
