//! Project feed → [`Project`].
//!
//! 1. Parse the document; it must be a JSON object.
//! 2. Private feeds only: rewrite keys ([`super::schema`]) and resolve form
//!    items ([`super::forms`]) with the project's decoded credentials.
//! 3. Dispatch every item by its `type` tag into a flat layer list.
//!    Directories and groups are flattened into their parent; unrecognized
//!    leaf tags are skipped. Missing URLs are synthesized from the resource
//!    id and written back into the item.
//! 4. Build the resource tree from the same (still nested) items, with ids
//!    derived like layer path keys.
//! 5. Read the initial extent, falling back to [`Extent::ABSENT`].

use serde_json::{json, Map, Value};

use super::forms;
use super::schema;
use super::Schema;
use crate::client::{Credentials, NgwApi};
use crate::codec;
use crate::error::AppError;
use crate::models::fields;
use crate::models::{
    Extent, IdMode, LayerKind, Project, RemoteLayer, ResourceClass, ResourceTree, Screen,
    TileLayer, TileSource, VectorLayer,
};

/// Tile endpoint of an NGW instance; `{z}/{x}/{y}` are filled by the map SDK.
pub fn tile_url(base: &str, resource_id: i64) -> String {
    format!(
        "{}/api/component/render/tile?z={{z}}&x={{x}}&y={{y}}&resource={resource_id}",
        base.trim_end_matches('/')
    )
}

/// Address of a vector resource on an NGW instance.
pub fn vector_url(base: &str, resource_id: i64) -> String {
    format!("{}/resource/{resource_id}", base.trim_end_matches('/'))
}

/// Turns feed documents into [`Project`]s. Holds no state between calls.
pub struct Normalizer<'a> {
    base_url: &'a str,
    api: Option<&'a dyn NgwApi>,
}

/// Per-document values needed while dispatching items.
struct Dispatch<'a> {
    base: &'a str,
    /// Private feeds lend the project login and hash to vector layers.
    inherited: Option<(&'a str, &'a str)>,
}

impl<'a> Normalizer<'a> {
    /// `base_url` is used for synthesized URLs when the document has no `url`.
    pub fn new(base_url: &'a str) -> Self {
        Self {
            base_url,
            api: None,
        }
    }

    /// Remote service used to resolve form items.
    pub fn with_api(mut self, api: &'a dyn NgwApi) -> Self {
        self.api = Some(api);
        self
    }

    pub fn normalize_str(&self, text: &str, schema: Schema) -> Result<Project, AppError> {
        let doc: Value = serde_json::from_str(text)
            .map_err(|e| AppError::ProjectLoad(format!("cannot parse project document: {e}")))?;
        self.normalize(doc, schema)
    }

    pub fn normalize(&self, mut doc: Value, schema: Schema) -> Result<Project, AppError> {
        if schema == Schema::Private {
            schema::rewrite_private(&mut doc);
        }
        let Value::Object(mut root) = doc else {
            return Err(AppError::ProjectLoad(
                "project document is not a JSON object".to_string(),
            ));
        };

        let version = fields::int(&root, "version", 0).max(0);
        let version = u32::try_from(version).map_err(|_| {
            AppError::ProjectLoad(format!("project version {version} is out of range"))
        })?;
        let mut project = Project::with_version(version);
        project.id = fields::int(&root, "id", -1);
        project.ngw_id = fields::int(&root, "ngw_id", -1);
        project.title = fields::string(&root, "title");
        project.description = fields::string(&root, "description");
        project.screen = Screen::from_tag(&fields::string(&root, "screen"));
        project.private = schema == Schema::Private || fields::flag(&root, "private", false);
        project.user = fields::opt_string(&root, "user")
            .or_else(|| fields::opt_string(&root, "username"))
            .unwrap_or_default();
        project.hash = fields::opt_string(&root, "hash")
            .or_else(|| fields::opt_string(&root, "password"))
            .unwrap_or_default();
        project.url = fields::opt_string(&root, "url")
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.base_url.to_string());
        project.extent = parse_extent(root.get("initial_extent"));

        // Undecodable credentials fail the load even when no form needs them.
        let password = codec::decode(&project.hash, project.version())?;

        let mut items = match root.remove("layers") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(AppError::ProjectLoad(format!(
                    "project layers must be an array, got {other}"
                )))
            }
        };

        if schema == Schema::Private {
            let credentials = Credentials {
                login: project.user.clone(),
                password,
            };
            let resolved = forms::resolve_forms(&mut items, self.api, &project.url, &credentials)?;
            if resolved > 0 {
                tracing::info!(project_id = project.id, resolved, "resolved form items");
            }
        }

        let dispatch = Dispatch {
            base: &project.url,
            inherited: (schema == Schema::Private)
                .then_some((project.user.as_str(), project.hash.as_str())),
        };
        let mut layers = Vec::new();
        dispatch.flatten(&mut items, &mut layers);

        let items = Value::Array(items);
        project.tree = ResourceTree::from_items(Some(&items), IdMode::Derived).to_json()?;
        project.layers = layers;

        tracing::debug!(
            project_id = project.id,
            layers = project.layers.len(),
            private = project.private,
            "project normalized"
        );
        Ok(project)
    }
}

impl Dispatch<'_> {
    fn flatten(&self, items: &mut [Value], out: &mut Vec<RemoteLayer>) {
        for item in items.iter_mut() {
            let Some(obj) = item.as_object_mut() else {
                tracing::warn!(%item, "skipping non-object project item");
                continue;
            };
            let tag = fields::string(obj, "type");
            let class = ResourceClass::from_tag(&tag);
            let layer = match class {
                Some(ResourceClass::QgisVectorStyle | ResourceClass::MapserverStyle) => {
                    self.ensure_url(obj, tile_url);
                    tile(obj, TileSource::Tms)
                }
                Some(ResourceClass::Tms) => tile(obj, TileSource::Tms),
                Some(ResourceClass::Ngrc) => tile(obj, TileSource::Ngrc),
                Some(ResourceClass::BasemapLayer) => tile(obj, TileSource::Basemap),
                Some(
                    ResourceClass::Ngw
                    | ResourceClass::Ngfp
                    | ResourceClass::VectorLayer
                    | ResourceClass::PostgisLayer
                    | ResourceClass::FormbuilderForm,
                ) => {
                    self.ensure_url(obj, vector_url);
                    self.inherit_credentials(obj);
                    let vector = VectorLayer::from_item(obj, class == Some(ResourceClass::Ngfp));
                    RemoteLayer::from_item(obj, LayerKind::Vector(vector))
                }
                Some(ResourceClass::Dir | ResourceClass::Group) | None => {
                    if let Some(Value::Array(children)) = obj.get_mut("layers") {
                        self.flatten(children, out);
                    } else if class.is_none() {
                        tracing::debug!(%tag, "skipping item of unrecognized type");
                    }
                    continue;
                }
            };
            // The tree derives node ids from the item, so it must carry the
            // layer's own tag and url for leaves to match their layer's path key.
            obj.insert("type".into(), json!(layer.type_tag()));
            obj.insert("url".into(), json!(layer.url));
            out.push(layer);
        }
    }

    fn ensure_url(&self, obj: &mut Map<String, Value>, build: fn(&str, i64) -> String) {
        if fields::opt_string(obj, "url").is_some_and(|u| !u.is_empty()) {
            return;
        }
        let resource_id = fields::int(obj, "resource_id", -1);
        obj.insert("url".into(), json!(build(self.base, resource_id)));
    }

    fn inherit_credentials(&self, obj: &mut Map<String, Value>) {
        let Some((login, hash)) = self.inherited else {
            return;
        };
        if !obj.contains_key("login") && !login.is_empty() {
            obj.insert("login".into(), json!(login));
        }
        if !obj.contains_key("password") && !hash.is_empty() {
            obj.insert("password".into(), json!(hash));
        }
    }
}

fn tile(obj: &Map<String, Value>, source: TileSource) -> RemoteLayer {
    RemoteLayer::from_item(obj, LayerKind::Tile(TileLayer::from_item(obj, source)))
}

fn parse_extent(value: Option<&Value>) -> Extent {
    match value {
        None | Some(Value::Null) => Extent::ABSENT,
        Some(value) => try_extent(value).unwrap_or_else(|| {
            tracing::warn!(%value, "ignoring malformed initial_extent");
            Extent::ABSENT
        }),
    }
}

fn try_extent(value: &Value) -> Option<Extent> {
    let coords = value.as_array()?;
    if coords.len() != 4 {
        return None;
    }
    let mut xy = [0.0; 4];
    for (slot, coord) in xy.iter_mut().zip(coords) {
        *slot = coord.as_f64()?;
    }
    Some(Extent {
        min_x: xy[0],
        min_y: xy[1],
        max_x: xy[2],
        max_y: xy[3],
    })
}
