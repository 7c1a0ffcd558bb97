//! The seam between the client core and the HTTP stack.
//!
//! The client assembles a complete POST ([`WireRequest`]) and hands it to
//! a [`Transport`], which owns connection handling, TLS, timeouts and any
//! retry policy. The core performs no retries of its own.

use async_trait::async_trait;
use log::debug;

use crate::error::ClientError;

/// A transport-ready request: everything needed to perform the POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    /// Full request URL, scheme included.
    pub url: String,
    /// Header name/value pairs in send order.
    pub headers: Vec<(String, String)>,
    /// Form-encoded body; empty when the call carries no parameters.
    pub body: String,
}

impl WireRequest {
    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The raw result of performing a request.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl WireResponse {
    /// Whether the HTTP status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        200 <= self.status && self.status < 300
    }
}

/// Performs an assembled POST request and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and reads the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] (or an implementation-specific
    /// kind) when the request cannot be performed or the body cannot be
    /// read.
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, ClientError>;
}

/// Production transport over a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wraps an existing reqwest client, keeping its pool and timeouts.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, ClientError> {
        debug!("POST {}", request.url);

        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(WireResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = WireRequest {
            url: "http://example.com/a".to_string(),
            headers: vec![("X-Authorization".to_string(), "id:sig".to_string())],
            body: String::new(),
        };
        assert_eq!(request.header("x-authorization"), Some("id:sig"));
        assert_eq!(request.header("Date"), None);
    }

    #[test]
    fn success_range_is_2xx() {
        let ok = WireResponse {
            status: 200,
            body: String::new(),
        };
        let redirect = WireResponse {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
