//! Sender configuration and construction-time validation.
//!
//! Validation is the only operation in this library permitted to fail the
//! caller visibly; once a sender is running, its steady-state operations
//! are total from the caller's perspective.

use reqwest::Url;
use thiserror::Error;
use uuid::Uuid;

/// Why a [`SenderConfig`] was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The project id is not a canonical UUID.
    #[error("invalid project id `{0}`: expected canonical UUID form (8-4-4-4-12)")]
    InvalidProjectId(String),

    /// The endpoint is not an http(s) URL.
    #[error("invalid endpoint `{url}`: {reason}")]
    InvalidEndpoint {
        /// The offending URL string.
        url: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The API key contains characters that cannot travel in a header.
    #[error("invalid API key: {0}")]
    InvalidApiKey(&'static str),
}

/// Immutable configuration of a sender.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Base URL of the collection endpoint, e.g. `https://ingest.example.com`.
    pub endpoint: String,
    /// Project identifier, canonical UUID text form.
    pub project_id: String,
    /// API key sent as `X-API-Key`; omitted from requests when `None`.
    pub api_key: Option<String>,
}

impl SenderConfig {
    /// Creates a configuration without an API key.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, project_id: impl Into<String>) -> Self {
        SenderConfig {
            endpoint: endpoint.into(),
            project_id: project_id.into(),
            api_key: None,
        }
    }

    /// Attaches an API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Validates the configuration.
    ///
    /// Checks the project id for canonical UUID shape, the endpoint for a
    /// parseable `http`/`https` URL with a host, and the API key (when
    /// present) for printable, whitespace-free ASCII.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Canonical form only: 36 chars, hyphenated. `Uuid` alone would
        // also accept simple/braced/urn forms.
        if self.project_id.len() != 36 || Uuid::try_parse(&self.project_id).is_err() {
            return Err(ConfigError::InvalidProjectId(self.project_id.clone()));
        }

        let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidEndpoint {
                url: self.endpoint.clone(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidEndpoint {
                url: self.endpoint.clone(),
                reason: "missing host".to_string(),
            });
        }

        if let Some(key) = &self.api_key {
            if key.is_empty() {
                return Err(ConfigError::InvalidApiKey("key is empty"));
            }
            if !key.chars().all(|c| c.is_ascii_graphic()) {
                return Err(ConfigError::InvalidApiKey(
                    "key must be printable ASCII without whitespace",
                ));
            }
        }

        Ok(())
    }

    /// Full receiving URL for this project.
    pub(crate) fn intake_url(&self) -> String {
        format!(
            "{}/api/v1/logs/receiving/{}",
            self.endpoint.trim_end_matches('/'),
            self.project_id
        )
    }
}
