//! Hierarchical resource tree shown by the layer picker.
//!
//! The tree is built from the same nested item list as the flat layer list
//! but independently of it: directories stay nodes here, while the flat list
//! only keeps their leaves. Leaves are matched to layers by [`path_key`].

use serde::Serialize;
use serde_json::{Map, Value};

use super::class::ResourceClass;
use super::fields;
use super::layer::path_key;
use crate::error::AppError;

/// How a node's `id` is obtained while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    /// Derive the id from `title + type + url`, like a layer's path key.
    /// A missing `url` is replaced by the current timestamp.
    Derived,
    /// Read the item's own `id` field.
    Field,
}

/// One node of the resource tree. Only `dir` nodes have children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub description: String,
    pub id: String,
    pub default_form_id: i64,
    #[serde(rename = "layers", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Resource>,
}

impl Resource {
    pub fn is_dir(&self) -> bool {
        self.resource_type == ResourceClass::DIR_TAG
    }

    fn from_item(item: &Map<String, Value>, mode: IdMode) -> Self {
        let title = fields::string(item, "title");
        let resource_type = fields::string(item, "type");
        let id = match mode {
            IdMode::Derived => {
                let url = fields::opt_string(item, "url")
                    .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string());
                path_key(&title, &resource_type, &url)
            }
            IdMode::Field => fields::string(item, "id"),
        };
        let children = if resource_type == ResourceClass::DIR_TAG {
            parse_items(item.get("layers"), mode)
        } else {
            Vec::new()
        };
        Self {
            description: fields::string(item, "description"),
            default_form_id: fields::int(item, "default_form_id", -1),
            title,
            resource_type,
            id,
            children,
        }
    }
}

fn parse_items(value: Option<&Value>, mode: IdMode) -> Vec<Resource> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| Resource::from_item(item, mode))
        .collect()
}

/// Ordered top-level resources of a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTree {
    roots: Vec<Resource>,
}

impl ResourceTree {
    /// Build a tree from a nested item array. `null` or a missing array
    /// yields an empty tree.
    pub fn from_items(items: Option<&Value>, mode: IdMode) -> Self {
        Self {
            roots: parse_items(items, mode),
        }
    }

    /// Parse a persisted tree produced by [`ResourceTree::to_json`].
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(text)
            .map_err(|e| AppError::ProjectLoad(format!("cannot parse resource tree: {e}")))?;
        Ok(Self::from_items(Some(&value), IdMode::Field))
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(&self.roots)
            .map_err(|e| AppError::ProjectLoad(format!("cannot serialize resource tree: {e}")))
    }

    pub fn roots(&self) -> &[Resource] {
        &self.roots
    }

    /// Children of the node with `id`, or the top level when `id` is blank.
    ///
    /// Returns an empty slice when no node matches.
    pub fn get_level(&self, id: &str) -> &[Resource] {
        if id.trim().is_empty() {
            return &self.roots;
        }
        find_children(&self.roots, id).unwrap_or(&[])
    }
}

fn find_children<'a>(nodes: &'a [Resource], id: &str) -> Option<&'a [Resource]> {
    for node in nodes {
        if node.id == id {
            return Some(&node.children);
        }
        if node.is_dir() {
            if let Some(found) = find_children(&node.children, id) {
                return Some(found);
            }
        }
    }
    None
}
