//! Access to the remote NGW service.
//!
//! [`NgwApi`] is the seam between project normalization and the network:
//! the normalizer only ever sees this trait, so tests substitute an
//! in-memory implementation. [`NgwClient`] is the blocking HTTP
//! implementation; call it from a blocking context only (see
//! [`crate::loader`]).

use std::time::Duration;

use serde_json::Value;

use crate::config::ServiceConfig;

/// Failure talking to the remote service.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid response from {url}: {message}")]
    Body { url: String, message: String },
}

/// Login and plaintext password used for authenticated resource reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn is_anonymous(&self) -> bool {
        self.login.is_empty()
    }
}

/// What to fetch from the project feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    pub id: i64,
    /// Selects the private (authenticated) feed and schema.
    pub private: bool,
    /// Credential hash sent in the configured header, if any.
    pub hash: Option<String>,
}

pub trait NgwApi: Send + Sync {
    /// Raw project feed document.
    fn fetch_project(&self, request: &ProjectRequest) -> Result<String, FetchError>;

    /// Resource description (`/api/resource/{id}`) on the instance at `base`.
    fn fetch_resource(
        &self,
        base: &str,
        id: i64,
        credentials: &Credentials,
    ) -> Result<Value, FetchError>;
}

/// Blocking HTTP implementation of [`NgwApi`].
pub struct NgwClient {
    http: reqwest::blocking::Client,
    service: ServiceConfig,
}

impl NgwClient {
    pub fn new(service: ServiceConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(service.timeout_secs))
            .user_agent(concat!("ngfield/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                url: service.base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { http, service })
    }

    fn send(
        &self,
        url: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, FetchError> {
        let response = request.send().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl NgwApi for NgwClient {
    fn fetch_project(&self, request: &ProjectRequest) -> Result<String, FetchError> {
        let url = self.service.project_url(request.id, request.private);
        tracing::debug!(%url, private = request.private, "fetching project feed");

        let mut builder = self.http.get(&url);
        if let Some(hash) = &request.hash {
            builder = builder.header(self.service.hash_header.as_str(), hash);
        }
        self.send(&url, builder)?
            .text()
            .map_err(|e| FetchError::Body {
                url,
                message: e.to_string(),
            })
    }

    fn fetch_resource(
        &self,
        base: &str,
        id: i64,
        credentials: &Credentials,
    ) -> Result<Value, FetchError> {
        let url = self.service.resource_url(base, id);
        tracing::debug!(%url, "fetching resource");

        let mut builder = self.http.get(&url);
        if !credentials.is_anonymous() {
            builder = builder.basic_auth(&credentials.login, Some(&credentials.password));
        }
        self.send(&url, builder)?
            .json::<Value>()
            .map_err(|e| FetchError::Body {
                url,
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_login_is_anonymous() {
        assert!(Credentials::default().is_anonymous());
        let creds = Credentials {
            login: "field".to_string(),
            password: String::new(),
        };
        assert!(!creds.is_anonymous());
    }

    #[test]
    fn fetch_error_messages_name_the_url() {
        let err = FetchError::Status {
            url: "https://demo.nextgis.com/api/resource/5".to_string(),
            status: 401,
        };
        assert_eq!(
            err.to_string(),
            "https://demo.nextgis.com/api/resource/5 answered with HTTP 401"
        );
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(NgwClient::new(ServiceConfig::default()).is_ok());
    }
}
