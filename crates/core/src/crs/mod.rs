//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation.
///
/// The projection of a band file is carried through untouched as WKT; an
/// EPSG code is only needed when publishing a product (see [`CRS::resolve_epsg`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation (primary)
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
        }
    }

    /// Attach a known EPSG code to this CRS
    pub fn with_epsg(mut self, code: u32) -> Self {
        self.epsg = Some(code);
        self
    }

    /// Get EPSG code if explicitly known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// EPSG code of this CRS: the explicit code if set, otherwise the
    /// top-level authority code found in the WKT.
    pub fn resolve_epsg(&self) -> Option<u32> {
        self.epsg.or_else(|| self.wkt.as_deref().and_then(epsg_from_wkt))
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.resolve_epsg() {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt.char_indices().nth(50).map_or(wkt.len(), |(i, _)| i);
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Extract the EPSG code of the outermost object of a WKT string.
///
/// In WKT1 the authority of the whole CRS is the last `AUTHORITY[...]`
/// clause; nested datum/unit authorities come earlier. WKT2 uses `ID[...]`
/// with an unquoted code.
fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    ["AUTHORITY[", "ID["]
        .iter()
        .filter_map(|keyword| {
            let start = wkt.rfind(keyword)? + keyword.len();
            let rest = &wkt[start..];
            let clause = &rest[..rest.find(']')?];
            let mut parts = clause.split(',').map(|p| p.trim().trim_matches('"'));
            if !parts.next()?.eq_ignore_ascii_case("EPSG") {
                return None;
            }
            parts.next()?.parse().ok().map(|code| (start, code))
        })
        .max_by_key(|(pos, _)| *pos)
        .map(|(_, code)| code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTM_33N: &str = r#"PROJCS["WGS 84 / UTM zone 33N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"],PARAMETER["central_meridian",15],UNIT["metre",1,AUTHORITY["EPSG","9001"]],AUTHORITY["EPSG","32633"]]"#;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::from_epsg(4326);
        assert_eq!(crs.epsg(), Some(4326));
        assert_eq!(crs.identifier(), "EPSG:4326");
    }

    #[test]
    fn test_resolve_epsg_from_wkt1_uses_outermost_authority() {
        let crs = CRS::from_wkt(UTM_33N);
        assert_eq!(crs.epsg(), None);
        assert_eq!(crs.resolve_epsg(), Some(32633));
        assert_eq!(crs.to_string(), "EPSG:32633");
    }

    #[test]
    fn test_resolve_epsg_from_wkt2_id() {
        let crs = CRS::from_wkt(r#"PROJCRS["WGS 84 / UTM zone 18N",BASEGEOGCRS["WGS 84"],ID["EPSG",32618]]"#);
        assert_eq!(crs.resolve_epsg(), Some(32618));
    }

    #[test]
    fn test_explicit_code_wins_over_wkt() {
        let crs = CRS::from_wkt(UTM_33N).with_epsg(3857);
        assert_eq!(crs.resolve_epsg(), Some(3857));
    }

    #[test]
    fn test_wkt_without_authority() {
        let crs = CRS::from_wkt(r#"LOCAL_CS["arbitrary"]"#);
        assert_eq!(crs.resolve_epsg(), None);
        assert!(crs.identifier().starts_with("WKT:"));
    }
}
