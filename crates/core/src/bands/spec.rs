//! Ordered band candidates for one output channel

use crate::error::{Error, Result};
use crate::scene::Instrument;
use std::fmt;

/// Band number as it appears in EO-1 file names (`_B05_`, `_B029_`)
pub type BandId = u16;

/// Acceptable bands for one output channel, in order of preference.
///
/// Never empty: construction rejects an empty candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSpec {
    candidates: Vec<BandId>,
}

impl BandSpec {
    /// Build the spec of output channel `channel` from an ordered
    /// candidate list
    pub fn new(channel: usize, candidates: impl IntoIterator<Item = BandId>) -> Result<Self> {
        let candidates: Vec<BandId> = candidates.into_iter().collect();
        if candidates.is_empty() {
            return Err(Error::EmptyBandSpec { channel });
        }
        Ok(Self { candidates })
    }

    /// Spec with a single acceptable band
    pub fn single(band: BandId) -> Self {
        Self {
            candidates: vec![band],
        }
    }

    /// Candidates in the order they are tried
    pub fn candidates(&self) -> &[BandId] {
        &self.candidates
    }

    /// Default red, green, blue specs for an instrument.
    ///
    /// ALI: R = `[5]`, G = `[4, 3]`, B = `[3, 4]`.
    /// Hyperion: R = `29..=40`, G = `23` down to `15`, B = `16` down to `10`.
    pub fn rgb_defaults(instrument: Instrument) -> [BandSpec; 3] {
        let spec = |c: Vec<BandId>| BandSpec { candidates: c };
        match instrument {
            Instrument::Ali => [spec(vec![5]), spec(vec![4, 3]), spec(vec![3, 4])],
            Instrument::Hyperion => [
                spec((29..=40).collect()),
                spec((15..=23).rev().collect()),
                spec((10..=16).rev().collect()),
            ],
        }
    }
}

impl fmt::Display for BandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.candidates)
    }
}

/// Display name of an output channel: `R`, `G`, `B`, else its index
pub fn channel_name(channel: usize) -> String {
    match channel {
        0 => "R".into(),
        1 => "G".into(),
        2 => "B".into(),
        n => n.to_string(),
    }
}
