//! Upstream HTTP client.
//!
//! A thin wrapper over reqwest that issues one GET per call with a per-call
//! timeout. There is no retry, caching or circuit breaking: a failure is
//! reported to the caller as a [`ClientError`] and never coerced into an
//! empty body.

mod middleware;

pub use middleware::RequestLogger;

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

/// Raw upstream response body with its status.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,

    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// HTTP client shared by the PubMed and arXiv adapters.
#[derive(Clone)]
pub struct UpstreamClient {
    client: ClientWithMiddleware,
}

impl UpstreamClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(api::USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        let client = ClientBuilder::new(client).with(RequestLogger).build();

        Ok(Self { client })
    }

    /// Issue one GET request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] for non-2xx responses, [`ClientError::Timeout`]
    /// when `timeout` elapses, and a transport error otherwise.
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> ClientResult<UpstreamResponse> {
        let response = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::status(status.as_u16(), url));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() { ClientError::Timeout(timeout) } else { ClientError::Http(e.without_url()) }
        })?;

        Ok(UpstreamResponse { status: status.as_u16(), body: body.to_vec() })
    }

    /// GET and decode the body as text.
    pub async fn fetch_text(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> ClientResult<String> {
        Ok(self.fetch(url, params, timeout).await?.text())
    }

    /// GET and decode the body as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> ClientResult<T> {
        self.fetch(url, params, timeout).await?.json()
    }
}

// reqwest errors carry the full request URL, query string (and api_key) included.
fn classify(err: reqwest_middleware::Error, timeout: Duration) -> ClientError {
    match err {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => ClientError::Timeout(timeout),
        reqwest_middleware::Error::Reqwest(e) => ClientError::Http(e.without_url()),
        other => ClientError::Middleware(other),
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient").field("user_agent", &api::USER_AGENT).finish()
    }
}
