use serde::Deserialize;
use serde_json::Value;

/// `status.code` value of a successful response.
pub const STATUS_OK: &str = "ok";

/// The status block carried by every response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    /// `"ok"` on success; anything else is a rejection.
    pub code: String,
    /// Human-readable detail, present especially on failure.
    #[serde(default)]
    pub message: Option<String>,
}

impl Status {
    /// Whether the response was accepted by the service.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == STATUS_OK
    }

    /// The rejection message, falling back to the status code when the
    /// service sent none.
    #[must_use]
    pub fn into_message(self) -> String {
        self.message.unwrap_or(self.code)
    }
}

/// The outer JSON object wrapping every Megaplan response.
///
/// The payload, when present, sits under `data` or under `json`; an `"ok"`
/// envelope carrying neither is an explicit empty result, not an error.
/// The envelope is decoded once at the client boundary so the rest of the
/// code never inspects raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// The mandatory status block.
    pub status: Status,
    /// Primary payload slot.
    #[serde(default)]
    pub data: Option<Value>,
    /// Alternate payload slot used by some endpoints.
    #[serde(default)]
    pub json: Option<Value>,
}

impl ResponseEnvelope {
    /// Splits the envelope into its payload or its rejection status.
    ///
    /// # Errors
    ///
    /// Returns the [`Status`] block when `status.code` is not `"ok"`.
    pub fn into_payload(self) -> Result<Option<Value>, Status> {
        if !self.status.is_ok() {
            return Err(self.status);
        }
        Ok(self.data.or(self.json))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn parse(text: &str) -> ResponseEnvelope {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn payload_comes_from_data() {
        let envelope = parse(r#"{"status":{"code":"ok"},"data":{"tasks":[]}}"#);
        let payload = envelope.into_payload().unwrap().unwrap();
        assert_eq!(payload, serde_json::json!({"tasks": []}));
    }

    #[test]
    fn payload_falls_back_to_json() {
        let envelope = parse(r#"{"status":{"code":"ok"},"json":[1,2,3]}"#);
        let payload = envelope.into_payload().unwrap().unwrap();
        assert_eq!(payload, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn data_wins_over_json_when_both_present() {
        let envelope = parse(r#"{"status":{"code":"ok"},"data":"d","json":"j"}"#);
        let payload = envelope.into_payload().unwrap().unwrap();
        assert_eq!(payload, serde_json::json!("d"));
    }

    #[test]
    fn ok_without_payload_is_explicit_empty_result() {
        let envelope = parse(r#"{"status":{"code":"ok"}}"#);
        assert!(envelope.into_payload().unwrap().is_none());
    }

    #[test]
    fn non_ok_status_is_a_rejection() {
        let envelope = parse(r#"{"status":{"code":"error","message":"bad login"}}"#);
        let status = envelope.into_payload().unwrap_err();
        assert_eq!(status.code, "error");
        assert_eq!(status.into_message(), "bad login");
    }

    #[test]
    fn rejection_without_message_falls_back_to_code() {
        let envelope = parse(r#"{"status":{"code":"denied"}}"#);
        let status = envelope.into_payload().unwrap_err();
        assert_eq!(status.into_message(), "denied");
    }

    #[test]
    fn missing_status_block_fails_to_decode() {
        let result = serde_json::from_str::<ResponseEnvelope>(r#"{"data":{}}"#);
        assert!(result.is_err());
    }
}
