//! Application-level error type returned across the component boundary.
//!
//! `AppError` is serialized to `{ kind, message }` JSON payloads so a UI
//! layer can pattern-match on a stable `kind` string and show `message`.

use crate::client::FetchError;
use crate::codec::CodecError;

/// Top-level error returned by project loading, persistence and commands.
///
/// Serialized with serde's adjacently-tagged representation:
/// `{ "kind": "<variant>", "message": "<human-readable text>" }`
#[derive(Debug, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum AppError {
    /// The project document could not be fetched, parsed or normalized.
    #[error("{0}")]
    ProjectLoad(String),

    /// A `formbuilder_form` item could not be resolved to its vector layer.
    /// Always aborts the whole load.
    #[error("{0}")]
    FormResolution(String),

    /// An obfuscated credential could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// The remote service could not be reached or answered with an error.
    #[error("{0}")]
    Network(String),

    /// The configuration file is unreadable or invalid.
    #[error("{0}")]
    Config(String),

    /// A generic I/O error; the inner [`std::io::Error`] is converted to a
    /// string at the system boundary so it remains serializable.
    #[error("{0}")]
    Io(String),

    /// A requested project or resource was not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<CodecError> for AppError {
    /// Credentials that fail to decode make the whole project unusable.
    fn from(e: CodecError) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    /// Convert an [`std::io::Error`] into an [`AppError::Io`].
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_load_error_serializes_to_kind_message() {
        let err = AppError::ProjectLoad("invalid JSON".to_string());
        let value = serde_json::to_value(&err).expect("serialize AppError::ProjectLoad");
        assert_eq!(value["kind"], "ProjectLoad");
        assert_eq!(value["message"], "invalid JSON");
    }

    #[test]
    fn form_resolution_error_serializes_to_kind_message() {
        let err = AppError::FormResolution("form 12 has no parent".to_string());
        let value = serde_json::to_value(&err).expect("serialize AppError::FormResolution");
        assert_eq!(value["kind"], "FormResolution");
        assert_eq!(value["message"], "form 12 has no parent");
    }

    #[test]
    fn from_codec_error_produces_decode_variant() {
        let app_err = AppError::from(CodecError::InvalidLength(3));
        assert!(matches!(app_err, AppError::Decode(_)));
        let value = serde_json::to_value(&app_err).expect("serialize");
        assert_eq!(value["kind"], "Decode");
    }

    #[test]
    fn from_fetch_error_produces_network_variant() {
        let app_err = AppError::from(FetchError::Status {
            url: "https://example.com/api/resource/1".to_string(),
            status: 404,
        });
        assert!(matches!(app_err, AppError::Network(_)));
        assert!(app_err.to_string().contains("404"));
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let app_err = AppError::from(io_err);
        assert!(matches!(app_err, AppError::Io(_)));
        let value = serde_json::to_value(&app_err).expect("serialize");
        assert_eq!(value["kind"], "Io");
    }

    #[test]
    fn app_error_display_is_human_readable() {
        assert_eq!(
            AppError::NotFound("project 7 not found".to_string()).to_string(),
            "project 7 not found"
        );
        assert_eq!(
            AppError::Config("base_url is empty".to_string()).to_string(),
            "base_url is empty"
        );
    }
}
