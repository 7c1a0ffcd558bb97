//! Canonical request construction and signing.
//!
//! Every API call is a `POST` over `http` with a form-encoded body. The
//! service authenticates the request by recomputing an HMAC over a
//! canonical text derived from the request fields, so the exact bytes of
//! the `Date` header and the joined URI matter as much as the MAC itself.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::form_urlencoded;

use megaplan_common::ApiPath;

use crate::error::ClientError;
use crate::transport::WireRequest;

type HmacSha1 = Hmac<Sha1>;

/// The fixed `User-Agent` identifier the service expects.
pub const USER_AGENT: &str = "SdfApi_Request";

/// Request method; the protocol supports nothing else.
pub const METHOD: &str = "POST";

/// URL scheme the service is addressed over.
pub const SCHEME: &str = "http";

/// Content type of every request body, also part of the canonical text.
pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `Date` header format: RFC-1123-like, UTC, literal `+0000` suffix.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// A single API call in canonical form.
///
/// Deterministically builds the exact byte sequence that is authenticated
/// by the MAC and the transport-ready request derived from it. The
/// timestamp is captured once at construction; it participates in the
/// signature and is sent verbatim as the `Date` header, and any mismatch
/// between the two breaks verification on the server side.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    uri: String,
    date: String,
    params: Vec<(String, String)>,
    access_id: Option<String>,
    signature: Option<String>,
}

impl SignedRequest {
    /// Builds a request for `hostname` and `path`, capturing the current
    /// UTC wall-clock time.
    #[must_use]
    pub fn new(hostname: &str, path: &ApiPath, params: &[(&str, &str)]) -> Self {
        Self::at(hostname, path, params, Utc::now())
    }

    /// Builds a request with an explicit timestamp.
    #[must_use]
    pub fn at(
        hostname: &str,
        path: &ApiPath,
        params: &[(&str, &str)],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uri: format!("{hostname}/{path}"),
            date: now.format(DATE_FORMAT).to_string(),
            params: params
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
            access_id: None,
            signature: None,
        }
    }

    /// The newline-joined text that is authenticated by the MAC.
    ///
    /// Exactly five fields: method, a blank line (the unused Content-MD5
    /// slot the server still includes when verifying), content type, date,
    /// joined URI.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        [METHOD, "", CONTENT_TYPE, &self.date, &self.uri].join("\n")
    }

    /// Computes and stores the request signature.
    ///
    /// The signature is the HMAC-SHA1 of the canonical text under the
    /// secret key, rendered as a lowercase hex string and then
    /// base64-encoded. Encoding the hex text rather than the raw digest is
    /// the service's wire contract; SHA-1 is likewise fixed by the legacy
    /// protocol and kept bit-exact for interoperability.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Signing`] if the MAC cannot be initialized
    /// from the key.
    pub fn sign(&mut self, access_id: &str, secret_key: &str) -> Result<(), ClientError> {
        let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        mac.update(self.canonical_text().as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());

        self.signature = Some(BASE64.encode(digest.as_bytes()));
        self.access_id = Some(access_id.to_string());
        Ok(())
    }

    /// The captured `Date` header value.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The computed signature, if [`SignedRequest::sign`] has run.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Assembles the transport-ready POST: URL, headers and form body.
    ///
    /// The `X-Authorization` header is attached if and only if the request
    /// was signed.
    #[must_use]
    pub fn into_wire(self) -> WireRequest {
        let mut body = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            body.append_pair(key, value);
        }
        let body = body.finish();

        let url = format!("{SCHEME}://{}", self.uri);

        let mut headers = vec![
            ("Date".to_string(), self.date),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
        ];
        if let (Some(access_id), Some(signature)) = (self.access_id, self.signature) {
            headers.push((
                "X-Authorization".to_string(),
                format!("{access_id}:{signature}"),
            ));
        }

        WireRequest { url, headers, body }
    }
}
