//! Atom feed entries describing published raster layers
//!
//! An entry carries what a WMS client needs to build a GetMap request for
//! the layer: workspace, layer name, SRS, bounding box and size.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use crate::Raster;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Atom namespace
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Map-server workspace the EO-1 layers are published under
pub const DEFAULT_WORKSPACE: &str = "eo1";

/// Output format requested from the map server
pub const DEFAULT_FORMAT: &str = "application/openlayers";

/// One Atom `<entry>` describing a georeferenced layer
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub workspace: String,
    pub layer: String,
    /// `EPSG:<code>`
    pub srs: String,
    /// `ulx,uly,lrx,lry`
    pub bbox: String,
    pub width: usize,
    pub height: usize,
    pub format: String,
    pub description: Option<String>,
}

impl FeedEntry {
    /// Describe `raster` as layer `layer`.
    ///
    /// Fails when the raster's CRS has no identifiable EPSG code.
    pub fn from_raster<T: RasterElement>(
        layer: impl Into<String>,
        raster: &Raster<T>,
        description: Option<String>,
    ) -> Result<Self> {
        let epsg = raster
            .crs()
            .and_then(|crs| crs.resolve_epsg())
            .ok_or_else(|| Error::InvalidParameter {
                name: "crs",
                value: raster.crs().map_or_else(|| "none".into(), |c| c.to_string()),
                reason: "no EPSG code could be identified".into(),
            })?;

        Ok(Self {
            workspace: DEFAULT_WORKSPACE.to_string(),
            layer: layer.into(),
            srs: format!("EPSG:{}", epsg),
            bbox: bbox(raster.transform(), raster.cols(), raster.rows()),
            width: raster.cols(),
            height: raster.rows(),
            format: DEFAULT_FORMAT.to_string(),
            description: description.filter(|d| !d.is_empty()),
        })
    }

    /// Layer name for an image file: its file stem
    pub fn layer_name(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Serialize the entry as a standalone XML document
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Start(
                BytesStart::new("entry").with_attributes([("xmlns", ATOM_NS)]),
            ))
            .map_err(xml_error)?;

        let width = self.width.to_string();
        let height = self.height.to_string();
        let mut children: Vec<(&str, &str)> = vec![
            ("title", self.layer.as_str()),
            ("workspace", self.workspace.as_str()),
            ("layer", self.layer.as_str()),
            ("srs", self.srs.as_str()),
            ("bbox", self.bbox.as_str()),
            ("width", width.as_str()),
            ("height", height.as_str()),
            ("format", self.format.as_str()),
        ];
        if let Some(description) = &self.description {
            children.push(("description", description.as_str()));
        }

        for (tag, text) in children {
            writer.write_event(Event::Start(BytesStart::new(tag))).map_err(xml_error)?;
            writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
            writer.write_event(Event::End(BytesEnd::new(tag))).map_err(xml_error)?;
        }
        writer.write_event(Event::End(BytesEnd::new("entry"))).map_err(xml_error)?;

        String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
    }
}

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::Xml(e.to_string())
}

/// Upper-left and lower-right corners as `x0,y0,x1,y1`, computed straight
/// from the affine coefficients so rotated rasters keep their true corner.
fn bbox(transform: &GeoTransform, width: usize, height: usize) -> String {
    let (far_x, far_y) = transform.far_corner(width, height);
    [transform.origin_x, transform.origin_y, far_x, far_y]
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(",")
}
