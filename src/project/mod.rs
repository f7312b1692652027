//! Project feed normalization and persistence.
//!
//! A feed document goes through:
//!
//! - [`schema`]: typed key rewrite of the private feed into the public shape
//! - [`forms`]: replacement of `formbuilder_form` items by form-bound vector layers
//! - [`normalizer`]: type dispatch, directory flattening, tree and [`Project`] assembly
//!
//! [`serialization`] stores normalized projects on disk and reads them back.
//!
//! [`Project`]: crate::models::Project

pub mod forms;
pub mod normalizer;
pub mod schema;
pub mod serialization;

pub use normalizer::Normalizer;

/// Which upstream feed shape a document follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// `layers` array with meaningful `type` and `url`; also the persisted shape.
    Public,
    /// `items` array keyed by NGW resource classes.
    Private,
}

impl Schema {
    pub fn from_private(private: bool) -> Self {
        if private {
            Self::Private
        } else {
            Self::Public
        }
    }
}
