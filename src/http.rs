//! JSON batch client for HTTP-controlled DMX gateways.

use crate::{constants::HTTP_TIMEOUT, dmx::DmxFrame, Error, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Posts whole DMX frames to a batch endpoint
#[derive(Debug, Clone)]
pub struct HttpBatchClient {
    client: Client,
}

impl HttpBatchClient {
    /// Create a client with the standard one second request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(HTTP_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// POST `frame` to `url`
    ///
    /// An empty frame sends nothing and succeeds.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for an unusable body, an HTTP error if
    /// the request fails, or a transport error on a non-success status.
    pub fn post_frame(&self, url: &str, frame: &DmxFrame) -> Result<()> {
        if frame.is_empty() {
            return Ok(());
        }
        let body = frame.to_json_body()?;
        debug!("POST {url} {body}");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!("DMX API responded with {status}")));
        }
        Ok(())
    }
}
