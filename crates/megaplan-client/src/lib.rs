//! # megaplan-client
//!
//! Client library for the Megaplan task-management HTTP API.
//!
//! Implements the service's authentication and request-signing protocol:
//! every call is a `POST` with a form-encoded body, authenticated by an
//! HMAC-SHA1 signature over a canonical request text carried in the
//! `X-Authorization` header. Responses arrive wrapped in a JSON envelope
//! with a status block and an optional payload.
//!
//! ## Example
//!
//! Logging in with a password:
//!
//! ```no_run
//! use megaplan_client::MegaplanClient;
//!
//! # async fn example() -> Result<(), megaplan_client::ClientError> {
//! let client = MegaplanClient::new("xyz.megaplan.ru");
//! let grant = client.authenticate("login", "password").await?;
//! println!("signed in as employee {}", grant.employee_id);
//!
//! for task in client.actual_tasks().await? {
//!     println!("{task}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Reusing a previously issued credential pair, skipping the login step:
//!
//! ```no_run
//! use megaplan_client::MegaplanClient;
//!
//! let client = MegaplanClient::with_credentials("xyz.megaplan.ru", "access-id", "secret-key");
//! ```
//!
//! Endpoints without a convenience wrapper are reachable through the
//! generic [`MegaplanClient::call`]:
//!
//! ```no_run
//! # async fn example(client: megaplan_client::MegaplanClient)
//! # -> Result<(), megaplan_client::ClientError> {
//! let payload = client
//!     .call("BumsTaskApiV01/Task/list.api", &[("Status", "done")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// The client itself: credential state, `authenticate`, `call` and the
/// convenience wrappers.
pub mod client;
/// Fixed endpoint paths defined by the remote service.
pub mod endpoints;
/// Error types for the client library.
pub mod error;
/// Canonical request construction and signing.
pub mod request;
/// The transport seam between the client core and the HTTP stack.
pub mod transport;

pub use client::MegaplanClient;
pub use error::ClientError;
pub use megaplan_common::{ApiPath, AuthGrant, Credentials, PathError, ResponseEnvelope, Status};
pub use request::SignedRequest;
pub use transport::{HttpTransport, Transport, WireRequest, WireResponse};
