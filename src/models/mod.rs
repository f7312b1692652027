//! In-memory data model for a remote project.
//!
//! - [`class`]: the closed set of resource-class tags found in project feeds
//! - [`layer`]: flat layer descriptors handed to the map SDK
//! - [`resource`]: the hierarchical resource tree used by the layer picker
//! - [`project`]: the aggregate root tying them together

pub mod class;
pub(crate) mod fields;
pub mod layer;
pub mod project;
pub mod resource;

pub use class::ResourceClass;
pub use layer::{path_key, LayerKind, RemoteLayer, TileLayer, TileSource, TmsType, VectorLayer};
pub use project::{Extent, Project, Screen};
pub use resource::{IdMode, Resource, ResourceTree};
