//! Poster lookups against an external metadata provider.
//!
//! The provider is the only network dependency. Every request carries its
//! own timeout and is attempted once; callers decide what a failure means.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const OMDB_ENDPOINT: &str = "https://www.omdbapi.com/";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("poster lookup is disabled")]
    Disabled,

    #[error("no poster found for {0}")]
    NotFound(String),

    #[error("poster lookup request failed: {0}")]
    Http(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

pub trait PosterLookup {
    /// URL of an illustrative image for the title `name`.
    fn fetch_image_reference(&self, name: &str) -> Result<String, LookupError>;
}

/// Used when no provider is configured or lookups were switched off.
pub struct DisabledLookup;

impl PosterLookup for DisabledLookup {
    fn fetch_image_reference(&self, _name: &str) -> Result<String, LookupError> {
        Err(LookupError::Disabled)
    }
}

/// Title search against the OMDb API.
pub struct OmdbLookup {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl OmdbLookup {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::with_endpoint(OMDB_ENDPOINT, api_key, timeout)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: String, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        OmdbLookup {
            agent,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

impl PosterLookup for OmdbLookup {
    fn fetch_image_reference(&self, name: &str) -> Result<String, LookupError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("t", name)
            .query("apikey", &self.api_key)
            .call()
            .map_err(describe_http_error)?;

        let title: OmdbTitle = response
            .into_json()
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        poster_from_title(name, title)
    }
}

#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn poster_from_title(name: &str, title: OmdbTitle) -> Result<String, LookupError> {
    if !title.response.eq_ignore_ascii_case("true") {
        if let Some(error) = title.error {
            tracing::debug!(%name, %error, "provider has no match");
        }
        return Err(LookupError::NotFound(name.to_string()));
    }

    match title.poster {
        Some(poster) if !poster.is_empty() && poster != "N/A" => Ok(poster),
        _ => Err(LookupError::NotFound(name.to_string())),
    }
}

// ureq error text embeds the request url, which carries the api key
fn describe_http_error(err: ureq::Error) -> LookupError {
    match err {
        ureq::Error::Status(code, _) => LookupError::Http(format!("provider answered with status {code}")),
        ureq::Error::Transport(transport) => LookupError::Http(transport.kind().to_string()),
    }
}
