//! The project aggregate root.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::layer::RemoteLayer;
use super::resource::{Resource, ResourceTree};
use crate::codec::{self, CodecError};
use crate::error::AppError;

/// Initial screen shown when a project is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    List,
    #[default]
    #[serde(other)]
    Map,
}

impl Screen {
    pub(crate) fn from_tag(tag: &str) -> Self {
        if tag == "list" {
            Self::List
        } else {
            Self::Map
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

/// Initial map extent. Every coordinate is `-1.0` when the feed has none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub const ABSENT: Extent = Extent {
        min_x: -1.0,
        min_y: -1.0,
        max_x: -1.0,
        max_y: -1.0,
    };

    pub fn is_absent(&self) -> bool {
        *self == Self::ABSENT
    }

    fn to_json(self) -> Value {
        if self.is_absent() {
            Value::Null
        } else {
            json!([self.min_x, self.min_y, self.max_x, self.max_y])
        }
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::ABSENT
    }
}

/// A normalized project: metadata, flat layers and the serialized tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub ngw_id: i64,
    pub title: String,
    pub description: String,
    pub screen: Screen,
    /// Bumped by the server whenever the project is reconfigured; also the
    /// key of the credential obfuscation.
    version: u32,
    pub layers: Vec<RemoteLayer>,
    /// Resource tree as JSON text, persisted separately from [`Project::to_json`].
    pub tree: String,
    /// `true` when the project came from the private (authenticated) feed.
    pub private: bool,
    /// Base URL of the NGW instance hosting the project's resources.
    pub url: String,
    pub user: String,
    /// Obfuscated password; see [`Project::password`].
    pub hash: String,
    pub extent: Extent,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: -1,
            ngw_id: -1,
            title: String::new(),
            description: String::new(),
            screen: Screen::Map,
            version: 0,
            layers: Vec::new(),
            tree: "[]".to_string(),
            private: false,
            url: String::new(),
            user: String::new(),
            hash: String::new(),
            extent: Extent::ABSENT,
        }
    }
}

impl Project {
    pub(crate) fn with_version(version: u32) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Restore a project persisted with [`Project::to_json`]. The tree is
    /// not part of that document and is left empty.
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        crate::project::normalizer::Normalizer::new("")
            .normalize_str(text, crate::project::Schema::Public)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Store a new version. Returns the previous one when it changed.
    pub fn set_version(&mut self, version: u32) -> Option<u32> {
        if self.version == version {
            return None;
        }
        let previous = self.version;
        self.version = version;
        Some(previous)
    }

    /// Open on the map unless the feed asked for the list view.
    pub fn is_map_main(&self) -> bool {
        self.screen != Screen::List
    }

    /// Decode the password from [`Project::hash`]. Not cached.
    pub fn password(&self) -> Result<String, CodecError> {
        codec::decode(&self.hash, self.version)
    }

    pub fn resource_tree(&self) -> Result<ResourceTree, AppError> {
        ResourceTree::from_json(&self.tree)
    }

    /// Children of the tree node `id`, or the top level when `id` is blank.
    pub fn level(&self, id: &str) -> Result<Vec<Resource>, AppError> {
        Ok(self.resource_tree()?.get_level(id).to_vec())
    }

    pub fn layer_by_key(&self, key: &str) -> Option<&RemoteLayer> {
        self.layers.iter().find(|l| l.path_key() == key)
    }

    /// Serialize scalar fields and layers in the public feed shape.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "ngw_id": self.ngw_id,
            "title": self.title,
            "description": self.description,
            "screen": self.screen.as_str(),
            "version": self.version,
            "private": self.private,
            "url": self.url,
            "user": self.user,
            "hash": self.hash,
            "initial_extent": self.extent.to_json(),
            "layers": self.layers.iter().map(RemoteLayer::to_json).collect::<Vec<_>>(),
        })
    }
}
