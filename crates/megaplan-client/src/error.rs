//! Error types for the client library.

use thiserror::Error;

use megaplan_common::PathError;

/// Errors that can occur when talking to the Megaplan API.
///
/// Every failure kind surfaces as a distinct variant; nothing is retried
/// or downgraded inside the client. Callers decide whether to
/// re-authenticate or retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// A signed call was attempted with no credentials present.
    ///
    /// Detected before any network activity; authenticate first or
    /// construct the client with a stored credential pair.
    #[error("authentication required: no credential pair present")]
    AuthenticationRequired,

    /// The service rejected the request: the envelope's `status.code` was
    /// not `"ok"`. Carries `status.message` verbatim.
    #[error("API error: {0}")]
    Api(String),

    /// Network or HTTP request failure from the transport.
    ///
    /// Indicates issues like DNS resolution, connection failures, or
    /// socket errors.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status whose body was not a decodable envelope.
    #[error("HTTP {status}: {body}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// The response body was not valid JSON or lacked the required
    /// `status` block.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The envelope decoded but its payload did not have the expected
    /// shape for the operation.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// MAC initialization failed.
    ///
    /// Not expected in normal operation; indicates a malformed key or a
    /// broken crypto environment.
    #[error("signing error: {0}")]
    Signing(String),

    /// The endpoint path failed validation.
    #[error(transparent)]
    Path(#[from] PathError),
}

impl ClientError {
    /// Check if this is the pre-flight missing-credentials error.
    #[must_use]
    pub const fn is_authentication_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    /// Check if this is a rejection reported by the service itself.
    #[must_use]
    pub const fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// The remote rejection message, if this is an API error.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api(message) => Some(message),
            _ => None,
        }
    }
}
