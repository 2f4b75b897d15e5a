//! EO-1 scene identifiers and on-disk layout
//!
//! Scene ids such as `EO1A1930292014029110PZ` encode the instrument
//! (character 3), acquisition year (characters 10..14) and day of year
//! (characters 14..17). Together with a [`SceneLayout`] they locate every
//! band file of the scene.

mod layout;

pub use layout::{SceneLayout, DEFAULT_BASE_PATH};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EO-1 imaging instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    /// Advanced Land Imager (multispectral + panchromatic)
    #[serde(rename = "A")]
    Ali,
    /// Hyperion hyperspectral imager
    #[serde(rename = "H")]
    Hyperion,
}

impl Instrument {
    /// Parse the single-character instrument code used in scene ids
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Ali),
            'H' => Some(Self::Hyperion),
            _ => None,
        }
    }

    /// Single-character instrument code
    pub fn code(self) -> char {
        match self {
            Self::Ali => 'A',
            Self::Hyperion => 'H',
        }
    }

    /// Directory under the archive root holding this instrument's scenes
    pub fn directory(self) -> &'static str {
        match self {
            Self::Ali => "ali_l1g",
            Self::Hyperion => "hyperion_l1g",
        }
    }

    /// Suffix appended to the scene id to name the scene directory
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Ali => "_ALI_L1G",
            Self::Hyperion => "_HYP_L1G",
        }
    }

    /// Number of digits band numbers are zero-padded to in file names
    pub fn band_digit_width(self) -> usize {
        match self {
            Self::Ali => 2,
            Self::Hyperion => 3,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ali => write!(f, "ALI"),
            Self::Hyperion => write!(f, "Hyperion"),
        }
    }
}

/// A parsed EO-1 scene identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneId {
    id: String,
    instrument: Instrument,
    year: u16,
    day_of_year: u16,
}

impl SceneId {
    /// Parse and validate a scene id
    pub fn parse(id: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSceneId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        if !id.is_ascii() || id.len() < 17 {
            return Err(invalid("expected at least 17 ASCII characters"));
        }

        let code = id.as_bytes()[3] as char;
        let instrument = Instrument::from_code(code)
            .ok_or_else(|| invalid("instrument code at position 3 must be 'A' or 'H'"))?;

        let digits = |range: std::ops::Range<usize>| -> Option<u16> {
            let s = &id[range];
            s.bytes().all(|b| b.is_ascii_digit()).then(|| s.parse().ok()).flatten()
        };
        let year = digits(10..14).ok_or_else(|| invalid("characters 10..14 must be the year"))?;
        let day_of_year =
            digits(14..17).ok_or_else(|| invalid("characters 14..17 must be the day of year"))?;

        Ok(Self {
            id: id.to_string(),
            instrument,
            year,
            day_of_year,
        })
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Instrument that acquired the scene
    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Acquisition year
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Acquisition day of year
    pub fn day_of_year(&self) -> u16 {
        self.day_of_year
    }
}

impl FromStr for SceneId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ali_scene() {
        let scene = SceneId::parse("EO1A1930292014029110PZ").unwrap();
        assert_eq!(scene.instrument(), Instrument::Ali);
        assert_eq!(scene.year(), 2014);
        assert_eq!(scene.day_of_year(), 29);
        assert_eq!(scene.to_string(), "EO1A1930292014029110PZ");
    }

    #[test]
    fn test_parse_hyperion_scene() {
        let scene: SceneId = "EO1H0240362014122110KF".parse().unwrap();
        assert_eq!(scene.instrument(), Instrument::Hyperion);
        assert_eq!(scene.day_of_year(), 122);
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        for bad in ["EO1A193", "EO1X1930292014029110PZ", "EO1A193029YYYY029110PZ", "EO1A19302920140X9110PZ"] {
            assert!(
                matches!(SceneId::parse(bad), Err(Error::InvalidSceneId { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_instrument_tables() {
        assert_eq!(Instrument::Ali.directory(), "ali_l1g");
        assert_eq!(Instrument::Ali.suffix(), "_ALI_L1G");
        assert_eq!(Instrument::Hyperion.band_digit_width(), 3);
        assert_eq!(Instrument::from_code('H'), Some(Instrument::Hyperion));
        assert_eq!(Instrument::Ali.code(), 'A');
    }
}
