//! # megaplan-common
//!
//! Foundational types for the Megaplan API client: credential handling,
//! validated endpoint paths, and the JSON envelope every response of the
//! service is wrapped in.
//!
//! ## Example
//!
//! ```
//! use megaplan_common::{ApiPath, ResponseEnvelope};
//!
//! let path = ApiPath::new("BumsTaskApiV01/Task/list.api")?;
//! assert_eq!(path.as_str(), "BumsTaskApiV01/Task/list.api");
//!
//! let envelope: ResponseEnvelope =
//!     serde_json::from_str(r#"{"status":{"code":"ok"},"data":{"tasks":[]}}"#)?;
//! let payload = envelope.into_payload().ok().flatten();
//! assert!(payload.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Credential types: the access-id / secret-key pair and the grant
/// returned by the authorize endpoint.
pub mod credentials;
/// The response envelope contract shared by every endpoint.
pub mod envelope;
/// Validated relative endpoint paths.
pub mod path;

pub use credentials::{AuthGrant, Credentials};
pub use envelope::{ResponseEnvelope, Status, STATUS_OK};
pub use path::{ApiPath, PathError};
