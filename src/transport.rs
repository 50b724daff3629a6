use std::time::Instant;

use log::{debug, info};
use reqwest::blocking::Client;

use crate::error::ApiError;

/// Base URL of the puush service API.
pub const API_BASE: &str = "https://puush.me/api";

/// Listing endpoint: POST with field `k`, returns the upload history.
pub const HISTORY_ENDPOINT: &str = "hist";
/// Deletion endpoint: POST with fields `k` and `i`, returns the remaining
/// history in the same wire format as a listing.
pub const DELETION_ENDPOINT: &str = "del";
/// Other endpoints the service exposes; not used by the drain loop.
pub const AUTH_ENDPOINT: &str = "auth";
pub const THUMBNAIL_ENDPOINT: &str = "thumb";
pub const UPLOAD_ENDPOINT: &str = "up";

/// Form field carrying the API key.
pub const KEY_FIELD: &str = "k";
/// Form field carrying an entry identifier on deletion calls.
pub const ID_FIELD: &str = "i";

/// The request primitive the reconciliation engine drives.
///
/// Production code goes through [`HttpTransport`]; tests substitute a
/// scripted implementation to exercise the engine without a network.
pub trait Transport {
    /// POST `fields` as a form body to `endpoint` and return the raw
    /// response text.
    fn post(&mut self, endpoint: &str, fields: &[(&str, String)]) -> Result<String, ApiError>;
}

/// Blocking HTTP transport over [`reqwest`].
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(API_BASE)
    }

    /// Point the transport at a different base URL. Used against local
    /// stand-ins for the service.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(HttpTransport {
            client,
            base_url: base_url.into(),
        })
    }
}

impl Transport for HttpTransport {
    fn post(&mut self, endpoint: &str, fields: &[(&str, String)]) -> Result<String, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("sending POST request to {url}");

        let started = Instant::now();
        let response = self.client.post(&url).form(fields).send()?;

        info!(
            "received POST response {} ({}) from {url} in {:.0?}",
            response.status().as_u16(),
            response.status().canonical_reason().unwrap_or("unknown"),
            started.elapsed()
        );

        let response = response.error_for_status()?;
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(
            format!("{API_BASE}/{HISTORY_ENDPOINT}"),
            "https://puush.me/api/hist"
        );
        assert_eq!(
            format!("{API_BASE}/{DELETION_ENDPOINT}"),
            "https://puush.me/api/del"
        );
    }
}
