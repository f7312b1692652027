//! Flat layer descriptors.
//!
//! A [`RemoteLayer`] carries the fields every layer shares plus a
//! [`LayerKind`] payload: raster tile sources on one side, NGW-backed vector
//! layers (optionally bound to a data-entry form) on the other. The JSON
//! projection produced by [`RemoteLayer::to_json`] is the public feed shape,
//! so a persisted layer parses back through the same dispatch as a fresh one.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::Digest as _;

use super::fields;

/// Default upper zoom bound when the feed does not specify one.
pub const DEFAULT_MAX_ZOOM: f64 = 25.0;

/// Derive the stable storage key of a layer from its title, type tag and URL.
///
/// The same derivation names resource-tree nodes, which is how a tree leaf is
/// matched to its flat layer.
pub fn path_key(title: &str, type_tag: &str, url: &str) -> String {
    let digest = sha2::Sha256::digest(format!("{title}{type_tag}{url}").as_bytes());
    let hex = format!("{digest:x}");
    format!("layer_{}", &hex[..16])
}

/// Origin of a raster tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSource {
    Tms,
    Ngrc,
    #[serde(rename = "basemap_layer")]
    Basemap,
}

impl TileSource {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Tms => "tms",
            Self::Ngrc => "ngrc",
            Self::Basemap => "basemap_layer",
        }
    }
}

/// Tile addressing scheme.
///
/// `Osm` counts tile rows from the top (XYZ); `Tms` from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TmsType {
    #[default]
    Osm,
    Tms,
}

impl TmsType {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) if s.eq_ignore_ascii_case("tms") => Self::Tms,
            Some(Value::Number(n)) if n.as_i64() == Some(2) => Self::Tms,
            _ => Self::Osm,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Osm => "osm",
            Self::Tms => "tms",
        }
    }
}

/// Raster tile payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub source: TileSource,
    /// Tile cache max-age in minutes; `0` never expires.
    pub lifetime: u64,
    pub tms_type: TmsType,
}

/// NGW vector layer payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayer {
    /// `true` for layers edited through a data-entry form (`ngfp`).
    pub form_bound: bool,
    pub login: Option<String>,
    /// Obfuscated; decode with the owning project's version.
    pub password: Option<String>,
    pub editable: bool,
    pub syncable: bool,
    /// Renderer description, kept verbatim.
    pub style: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Tile(TileLayer),
    Vector(VectorLayer),
}

/// One layer of a project, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteLayer {
    pub title: String,
    pub description: String,
    pub url: String,
    pub visible: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub default_form_id: Option<i64>,
    /// NGW resource id; `-1` when the layer is not an NGW resource.
    pub resource_id: i64,
    pub kind: LayerKind,
}

impl RemoteLayer {
    /// Build a layer from a feed item whose kind has already been decided.
    pub(crate) fn from_item(item: &Map<String, Value>, kind: LayerKind) -> Self {
        let default_form_id = fields::int(item, "default_form_id", -1);
        Self {
            title: fields::string(item, "title"),
            description: fields::string(item, "description"),
            url: fields::string(item, "url"),
            visible: fields::flag(item, "visible", true),
            min_zoom: fields::float(item, "min_zoom", 0.0),
            max_zoom: fields::float(item, "max_zoom", DEFAULT_MAX_ZOOM),
            default_form_id: (default_form_id >= 0).then_some(default_form_id),
            resource_id: fields::int(item, "resource_id", -1),
            kind,
        }
    }

    /// The layer's type tag: `tms`, `ngrc`, `basemap_layer`, `ngw` or `ngfp`.
    pub fn type_tag(&self) -> &'static str {
        match &self.kind {
            LayerKind::Tile(tile) => tile.source.tag(),
            LayerKind::Vector(vector) if vector.form_bound => "ngfp",
            LayerKind::Vector(_) => "ngw",
        }
    }

    pub fn path_key(&self) -> String {
        path_key(&self.title, self.type_tag(), &self.url)
    }

    /// Serialize into the public feed item shape.
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "title": self.title,
            "type": self.type_tag(),
            "description": self.description,
            "url": self.url,
            "visible": self.visible,
            "min_zoom": self.min_zoom,
            "max_zoom": self.max_zoom,
            "default_form_id": self.default_form_id.unwrap_or(-1),
            "resource_id": self.resource_id,
        });
        let Some(obj) = value.as_object_mut() else {
            return value;
        };
        match &self.kind {
            LayerKind::Tile(tile) => {
                obj.insert("lifetime".into(), json!(tile.lifetime));
                obj.insert("tms_type".into(), json!(tile.tms_type.as_str()));
            }
            LayerKind::Vector(vector) => {
                obj.insert("form".into(), json!(vector.form_bound));
                obj.insert("editable".into(), json!(vector.editable));
                obj.insert("syncable".into(), json!(vector.syncable));
                if let Some(login) = &vector.login {
                    obj.insert("login".into(), json!(login));
                }
                if let Some(password) = &vector.password {
                    obj.insert("password".into(), json!(password));
                }
                if let Some(style) = &vector.style {
                    obj.insert("style".into(), style.clone());
                }
            }
        }
        value
    }
}

impl TileLayer {
    pub(crate) fn from_item(item: &Map<String, Value>, source: TileSource) -> Self {
        Self {
            source,
            lifetime: fields::int(item, "lifetime", 0).max(0) as u64,
            tms_type: TmsType::from_value(item.get("tms_type")),
        }
    }
}

impl VectorLayer {
    /// `tagged_form` is set when the item's own tag is already `ngfp`.
    pub(crate) fn from_item(item: &Map<String, Value>, tagged_form: bool) -> Self {
        Self {
            form_bound: tagged_form || fields::flag(item, "form", false),
            login: fields::opt_string(item, "login").filter(|s| !s.is_empty()),
            password: fields::opt_string(item, "password").filter(|s| !s.is_empty()),
            editable: fields::flag(item, "editable", false),
            syncable: fields::flag(item, "syncable", false),
            style: item.get("style").filter(|s| !s.is_null()).cloned(),
        }
    }
}
