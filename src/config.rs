//! Application configuration loaded from a TOML file.
//!
//! The file lives at `<config dir>/ngfield/config.toml`:
//!   Linux    ~/.config/ngfield/config.toml
//!   macOS    ~/Library/Application Support/ngfield/config.toml
//!   Windows  %APPDATA%\ngfield\config.toml
//!
//! Every key is optional; a missing file yields [`AppConfig::default`].
//!
//! ```toml
//! [service]
//! base_url = "https://demo.nextgis.com"
//! public_project = "{base}/api/project/{id}"
//! private_project = "{base}/api/project/{id}/private"
//! hash_header = "X-Project-Hash"
//! timeout_secs = 30
//!
//! [log]
//! filter = "ngfield_lib=debug,info"
//!
//! [storage]
//! dir = "/var/lib/ngfield"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const APP_DIR: &str = "ngfield";

/// `[service]`: remote project service endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Base URL substituted for `{base}` in the endpoint templates and used
    /// for layer URLs when a project does not name its own instance.
    pub base_url: String,
    /// Template of the public project feed. Must contain `{id}`.
    pub public_project: String,
    /// Template of the private project feed. Must contain `{id}`.
    pub private_project: String,
    /// Header carrying the caller-supplied credential hash.
    pub hash_header: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://demo.nextgis.com".to_string(),
            public_project: "{base}/api/project/{id}".to_string(),
            private_project: "{base}/api/project/{id}/private".to_string(),
            hash_header: "X-Project-Hash".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    /// Expand the feed template for project `id`.
    pub fn project_url(&self, id: i64, private: bool) -> String {
        let template = if private {
            &self.private_project
        } else {
            &self.public_project
        };
        template
            .replace("{base}", self.base_url.trim_end_matches('/'))
            .replace("{id}", &id.to_string())
    }

    pub fn resource_url(&self, base: &str, id: i64) -> String {
        format!("{}/api/resource/{id}", base.trim_end_matches('/'))
    }
}

/// `[log]`: tracing filter used when `RUST_LOG` is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// `[storage]`: where projects are persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to the OS data directory when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub log: LogConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load_default() -> Result<Self, AppError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(text)
            .map_err(|e| AppError::Config(format!("cannot parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.service.base_url.trim().is_empty() {
            return Err(AppError::Config("service.base_url is empty".to_string()));
        }
        for (name, template) in [
            ("public_project", &self.service.public_project),
            ("private_project", &self.service.private_project),
        ] {
            if !template.contains("{id}") {
                return Err(AppError::Config(format!(
                    "service.{name} must contain {{id}}, got {template:?}"
                )));
            }
        }
        if self.service.timeout_secs == 0 {
            return Err(AppError::Config("service.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Root directory for persisted projects.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .dir
            .clone()
            .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_default().join(APP_DIR))
    }
}
