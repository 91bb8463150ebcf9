//! Redash status API client.
//!
//! Fetches the two admin endpoints the exporter consumes and decodes
//! their JSON payloads into snapshot types.

mod models;
mod normalize;

pub use models::*;
pub use normalize::*;

use std::time::Duration;
use thiserror::Error;

/// Path of the system status endpoint.
pub const STATUS_PATH: &str = "/status.json";
/// Path of the background task list endpoint.
pub const TASKS_PATH: &str = "/api/admin/queries/tasks";

/// Fetch error types.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("body read error: {0}")]
    Read(String),
}

/// Decode error types.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// HTTP client for the Redash status API.
///
/// The API key is appended as a query parameter on every request and is
/// stripped from any error text before it can reach a log line.
pub struct RedashClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RedashClient {
    /// Create a client for the given base URL (scheme://host:port).
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch the raw body of one endpoint.
    ///
    /// Any response that yields a body counts as fetch success, whatever
    /// its status code; an invalid key or a proxy error page surfaces as
    /// a decode failure downstream.
    pub async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}{}?api_key={}", self.base_url, path, self.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Read(e.without_url().to_string()))?;

        Ok(body.to_vec())
    }

    /// Fetch and decode the system status snapshot.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot, PollError> {
        let body = self.fetch(STATUS_PATH).await?;
        Ok(decode_status(&body)?)
    }

    /// Fetch and decode the background task list snapshot.
    pub async fn fetch_tasks(&self) -> Result<TaskSnapshot, PollError> {
        let body = self.fetch(TASKS_PATH).await?;
        Ok(decode_tasks(&body)?)
    }
}

/// Either failure mode of one endpoint poll.
#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl PollError {
    /// True when the failure came from decoding the body. Redash answers
    /// with an unparseable body when the API key is wrong, so this is
    /// also the signal used to hint at a credential problem.
    pub fn is_decode(&self) -> bool {
        matches!(self, PollError::Decode(_))
    }
}
