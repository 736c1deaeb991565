//! Client configuration.
//!
//! The values themselves come from outside (environment, flags); this module
//! only validates them. A [`ClientConfig`] that exists is usable.

use crate::ClientError;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://wawtesettur.tsoft.biz/rest1";

/// Connection settings shared by both transport adapters.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    token: String,
    debug: bool,
}

impl ClientConfig {
    /// Validates and builds a configuration.
    ///
    /// `base_url` must be an `http(s)` URL; trailing slashes are removed.
    /// `token` must be non-blank.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        debug: bool,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let token = token.into().trim().to_string();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Configuration {
                message: format!("base URL must start with http:// or https://, got '{base_url}'"),
            });
        }
        if token.is_empty() {
            return Err(ClientError::Configuration {
                message: "API token is not configured".to_string(),
            });
        }

        Ok(Self {
            base_url,
            token,
            debug,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether adapters log request payloads and response bodies.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Joins `path` onto the base URL, inserting a `/` when needed.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

// The token is a credential; keep it out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("debug", &self.debug)
            .finish()
    }
}
