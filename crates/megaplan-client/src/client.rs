//! The Megaplan client: credential state, the authentication bootstrap and
//! the generic signed-call operation.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, error, warn};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;

use megaplan_common::{ApiPath, AuthGrant, Credentials, PathError, ResponseEnvelope};

use crate::endpoints;
use crate::error::ClientError;
use crate::request::SignedRequest;
use crate::transport::{HttpTransport, Transport};

/// Payload shape of the authorize endpoint.
#[derive(Deserialize)]
struct AuthorizePayload {
    #[serde(rename = "AccessId")]
    access_id: String,
    #[serde(rename = "SecretKey")]
    secret_key: String,
    #[serde(rename = "EmployeeId")]
    employee_id: u64,
}

/// MD5 hex digest of the exact input bytes.
///
/// The authorize endpoint mandates this legacy digest for the `Password`
/// field; it is reproduced bit-for-bit for wire compatibility and is not a
/// general-purpose hashing choice.
fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Client for the Megaplan task-management HTTP API.
///
/// Owns the long-lived credential state for one account on one host and
/// exposes [`authenticate`](Self::authenticate), the generic
/// [`call`](Self::call) operation, and convenience wrappers for the common
/// endpoints.
///
/// The client starts authenticated if a credential pair was supplied at
/// construction, otherwise unauthenticated; the only transition is a
/// successful `authenticate`. Credential mutation is a single atomic
/// update behind an `RwLock`, so concurrent calls on one instance never
/// observe a half-updated pair.
pub struct MegaplanClient {
    transport: Arc<dyn Transport>,
    hostname: String,
    credentials: RwLock<Option<Credentials>>,
}

impl fmt::Debug for MegaplanClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MegaplanClient")
            .field("hostname", &self.hostname)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl MegaplanClient {
    /// Creates an unauthenticated client for `hostname`
    /// (e.g. `"xyz.megaplan.ru"`) over a default HTTP transport.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self::with_transport(hostname, Arc::new(HttpTransport::default()))
    }

    /// Creates a client that reuses a previously issued credential pair,
    /// skipping the login step.
    #[must_use]
    pub fn with_credentials(
        hostname: impl Into<String>,
        access_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let client = Self::new(hostname);
        client.store_credentials(Credentials::new(access_id, secret_key));
        client
    }

    /// Creates an unauthenticated client over a custom [`Transport`].
    #[must_use]
    pub fn with_transport(hostname: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            hostname: hostname.into(),
            credentials: RwLock::new(None),
        }
    }

    /// The host this client talks to.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Whether a credential pair is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_credentials(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_credentials(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
    }

    /// Authenticates with a login and plaintext password.
    ///
    /// The password is sent as its MD5 hex digest, as the service's legacy
    /// protocol requires. On success the issued access id and secret key
    /// replace the client's credential state and the full grant, employee
    /// id included, is returned so the pair can be stored for later
    /// [`with_credentials`](Self::with_credentials) construction.
    ///
    /// On any error the stored credentials are left untouched.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] when the service rejects the login, or any of
    /// the transport/decoding kinds.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<AuthGrant, ClientError> {
        let digest = md5_hex(password);
        let path = ApiPath::new(endpoints::AUTHORIZE)?;
        let payload = self
            .dispatch(&path, &[("Login", login), ("Password", &digest)], None)
            .await?;
        let payload = payload.ok_or_else(|| {
            ClientError::InvalidResponse("authorize returned no payload".to_string())
        })?;
        let grant: AuthorizePayload = serde_json::from_value(payload)
            .map_err(|e| ClientError::InvalidResponse(format!("authorize payload: {e}")))?;

        self.store_credentials(Credentials::new(&grant.access_id, &grant.secret_key));
        debug!("authenticated as employee {}", grant.employee_id);

        Ok(AuthGrant {
            access_id: grant.access_id,
            secret_key: SecretString::from(grant.secret_key),
            employee_id: grant.employee_id,
        })
    }

    /// Sends a signed request and returns the decoded payload.
    ///
    /// `path` must be relative (no leading slash), e.g.
    /// `BumsTaskApiV01/Task/list.api`. `Ok(None)` means the service
    /// answered `"ok"` with no payload.
    ///
    /// # Errors
    ///
    /// [`ClientError::AuthenticationRequired`] if no credential pair is
    /// present; the check happens before any network activity.
    pub async fn call<P>(
        &self,
        path: P,
        params: &[(&str, &str)],
    ) -> Result<Option<Value>, ClientError>
    where
        P: TryInto<ApiPath, Error = PathError>,
    {
        let path = path.try_into()?;
        let credentials = self
            .current_credentials()
            .ok_or(ClientError::AuthenticationRequired)?;
        self.dispatch(&path, params, Some(&credentials)).await
    }

    /// Sends an unsigned request; no `X-Authorization` header is attached,
    /// whether or not credentials are present.
    ///
    /// # Errors
    ///
    /// Any of the transport/decoding kinds, or [`ClientError::Api`] on a
    /// remote rejection.
    pub async fn call_unsigned<P>(
        &self,
        path: P,
        params: &[(&str, &str)],
    ) -> Result<Option<Value>, ClientError>
    where
        P: TryInto<ApiPath, Error = PathError>,
    {
        let path = path.try_into()?;
        self.dispatch(&path, params, None).await
    }

    async fn dispatch(
        &self,
        path: &ApiPath,
        params: &[(&str, &str)],
        credentials: Option<&Credentials>,
    ) -> Result<Option<Value>, ClientError> {
        let mut request = SignedRequest::new(&self.hostname, path, params);
        if let Some(credentials) = credentials {
            request.sign(credentials.access_id(), credentials.secret_key())?;
        }

        debug!("POST {}/{path}", self.hostname);
        let response = self.transport.execute(request.into_wire()).await?;

        let envelope: ResponseEnvelope = match serde_json::from_str(&response.body) {
            Ok(envelope) => envelope,
            Err(e) if response.is_success() => {
                error!("undecodable envelope from {path}: {e}");
                return Err(ClientError::Decode(e));
            }
            Err(_) => {
                error!("HTTP {} from {path} with undecodable body", response.status);
                return Err(ClientError::Http {
                    status: response.status,
                    body: response.body,
                });
            }
        };

        envelope.into_payload().map_err(|status| {
            let message = status.into_message();
            warn!("{path} rejected: {message}");
            ClientError::Api(message)
        })
    }

    // ------------------------------------------------------------------
    // Convenience wrappers: fixed endpoints, fixed field names.
    // ------------------------------------------------------------------

    /// Lists your active tasks.
    ///
    /// # Errors
    ///
    /// Propagates [`call`](Self::call) errors;
    /// [`ClientError::InvalidResponse`] if the payload has no `tasks`
    /// array.
    pub async fn actual_tasks(&self) -> Result<Vec<Value>, ClientError> {
        self.tasks_by_status("actual").await
    }

    /// Lists your tasks filtered by status.
    ///
    /// # Errors
    ///
    /// Propagates [`call`](Self::call) errors;
    /// [`ClientError::InvalidResponse`] if the payload has no `tasks`
    /// array.
    pub async fn tasks_by_status(&self, status: &str) -> Result<Vec<Value>, ClientError> {
        let payload = self
            .call(endpoints::TASK_LIST, &[("Status", status)])
            .await?;
        take_array(payload, "tasks")
    }

    /// Fetches a task card.
    ///
    /// # Errors
    ///
    /// Propagates [`call`](Self::call) errors.
    pub async fn task_card(&self, task_id: u64) -> Result<Option<Value>, ClientError> {
        self.call(endpoints::TASK_CARD, &[("Id", &task_id.to_string())])
            .await
    }

    /// Lists the comments attached to a task.
    ///
    /// # Errors
    ///
    /// Propagates [`call`](Self::call) errors.
    pub async fn task_comments(&self, task_id: u64) -> Result<Option<Value>, ClientError> {
        self.call(
            endpoints::COMMENT_LIST,
            &[("SubjectType", "task"), ("SubjectId", &task_id.to_string())],
        )
        .await
    }

    /// Sets a reaction by notification token.
    ///
    /// # Errors
    ///
    /// Propagates [`call`](Self::call) errors.
    pub async fn set_reaction(
        &self,
        token: &str,
        message: &str,
    ) -> Result<Option<Value>, ClientError> {
        self.call(
            endpoints::REACTION_DO,
            &[("Token", token), ("params[text]", message)],
        )
        .await
    }

    /// Fetches an employee card.
    ///
    /// # Errors
    ///
    /// Propagates [`call`](Self::call) errors.
    pub async fn employee_card(&self, employee_id: u64) -> Result<Option<Value>, ClientError> {
        self.call(endpoints::EMPLOYEE_CARD, &[("Id", &employee_id.to_string())])
            .await
    }

    /// Lists all employees.
    ///
    /// # Errors
    ///
    /// Propagates [`call`](Self::call) errors.
    pub async fn employee_list(&self) -> Result<Option<Value>, ClientError> {
        self.call(endpoints::EMPLOYEE_LIST, &[]).await
    }
}

fn take_array(payload: Option<Value>, key: &str) -> Result<Vec<Value>, ClientError> {
    let Some(Value::Object(mut map)) = payload else {
        return Err(ClientError::InvalidResponse(format!(
            "expected an object payload carrying `{key}`"
        )));
    };
    match map.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ClientError::InvalidResponse(format!(
            "`{key}` is not an array"
        ))),
        None => Err(ClientError::InvalidResponse(format!(
            "payload has no `{key}` field"
        ))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::transport::{WireRequest, WireResponse};

    use super::*;

    /// Canned-response transport that records every request it sees.
    struct StubTransport {
        status: u16,
        body: String,
        calls: AtomicUsize,
        seen: Mutex<Vec<WireRequest>>,
    }

    impl StubTransport {
        fn with_status(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: body.to_string(),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn ok(body: &str) -> Arc<Self> {
            Self::with_status(200, body)
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> WireRequest {
            self.seen.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn execute(&self, request: WireRequest) -> Result<WireResponse, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request);
            Ok(WireResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn authenticated_client(stub: Arc<StubTransport>) -> MegaplanClient {
        let client = MegaplanClient::with_transport("xyz.example.com", stub);
        client.store_credentials(Credentials::new("acc", "secret"));
        client
    }

    #[test]
    fn md5_digest_matches_known_constants() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("hunter2"), "2ab96390c7dbe3439de74d0c9b0b1767");
    }

    #[tokio::test]
    async fn signed_call_without_credentials_fails_before_transport() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"}}"#);
        let client = MegaplanClient::with_transport(
            "xyz.example.com",
            Arc::clone(&stub) as Arc<dyn Transport>,
        );

        let err = client.call(endpoints::TASK_LIST, &[]).await.unwrap_err();
        assert!(err.is_authentication_required());
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn leading_slash_path_is_rejected() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"}}"#);
        let client = authenticated_client(Arc::clone(&stub));

        let err = client.call("/Task/list.api", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Path(_)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn actual_tasks_returns_empty_list() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"},"data":{"tasks":[]}}"#);
        let client = authenticated_client(Arc::clone(&stub));

        let tasks = client.actual_tasks().await.unwrap();
        assert!(tasks.is_empty());

        let request = stub.last_request();
        assert_eq!(
            request.url,
            "http://xyz.example.com/BumsTaskApiV01/Task/list.api"
        );
        assert_eq!(request.body, "Status=actual");
        assert!(request.header("X-Authorization").is_some());
    }

    #[tokio::test]
    async fn unsigned_call_never_attaches_authorization() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"}}"#);
        let client = authenticated_client(Arc::clone(&stub));

        let payload = client
            .call_unsigned(endpoints::TASK_LIST, &[])
            .await
            .unwrap();
        assert!(payload.is_none());
        assert_eq!(stub.last_request().header("X-Authorization"), None);
    }

    #[tokio::test]
    async fn authenticate_stores_credentials_and_returns_grant() {
        let stub = StubTransport::ok(
            r#"{"status":{"code":"ok"},"data":{"AccessId":"id-1","SecretKey":"key-1","EmployeeId":1000005}}"#,
        );
        let client = MegaplanClient::with_transport(
            "xyz.example.com",
            Arc::clone(&stub) as Arc<dyn Transport>,
        );
        assert!(!client.is_authenticated());

        let grant = client.authenticate("jdoe", "hunter2").await.unwrap();
        assert_eq!(grant.access_id, "id-1");
        assert_eq!(grant.employee_id, 1_000_005);
        assert!(client.is_authenticated());

        let request = stub.last_request();
        assert_eq!(
            request.url,
            "http://xyz.example.com/BumsCommonApiV01/User/authorize.api"
        );
        assert_eq!(
            request.body,
            "Login=jdoe&Password=2ab96390c7dbe3439de74d0c9b0b1767"
        );
        assert_eq!(request.header("X-Authorization"), None);
    }

    #[tokio::test]
    async fn authenticate_rejection_leaves_state_unchanged() {
        let stub =
            StubTransport::ok(r#"{"status":{"code":"error","message":"bad login"}}"#);
        let client = MegaplanClient::with_transport("xyz.example.com", stub);

        let err = client.authenticate("jdoe", "wrong").await.unwrap_err();
        assert_eq!(err.api_message(), Some("bad login"));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn rejection_carries_message_verbatim() {
        let stub = StubTransport::ok(
            r#"{"status":{"code":"error","message":"Task not found"}}"#,
        );
        let client = authenticated_client(stub);

        let err = client.task_card(42).await.unwrap_err();
        assert_eq!(err.api_message(), Some("Task not found"));
    }

    #[tokio::test]
    async fn ok_without_payload_is_none() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"}}"#);
        let client = authenticated_client(stub);

        let payload = client.set_reaction("tok", "done").await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn json_slot_is_used_when_data_is_absent() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"},"json":{"employees":[]}}"#);
        let client = authenticated_client(stub);

        let payload = client.employee_list().await.unwrap().unwrap();
        assert_eq!(payload, serde_json::json!({"employees": []}));
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_decode_error() {
        let stub = StubTransport::ok("<html>not json</html>");
        let client = authenticated_client(stub);

        let err = client.employee_list().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn undecodable_error_body_is_an_http_error() {
        let stub = StubTransport::with_status(502, "Bad Gateway");
        let client = authenticated_client(stub);

        let err = client.employee_list().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Http { status: 502, ref body } if body.as_str() == "Bad Gateway"
        ));
    }

    #[tokio::test]
    async fn error_envelope_wins_over_http_status() {
        let stub = StubTransport::with_status(
            403,
            r#"{"status":{"code":"error","message":"expired"}}"#,
        );
        let client = authenticated_client(stub);

        let err = client.employee_list().await.unwrap_err();
        assert_eq!(err.api_message(), Some("expired"));
    }

    #[tokio::test]
    async fn reaction_params_use_the_service_field_names() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"}}"#);
        let client = authenticated_client(Arc::clone(&stub));

        client.set_reaction("tok-1", "all done").await.unwrap();

        let request = stub.last_request();
        assert_eq!(
            request.url,
            "http://xyz.example.com/SdfNotify/ReactionApi/do.api"
        );
        assert_eq!(request.body, "Token=tok-1&params%5Btext%5D=all+done");
    }

    #[tokio::test]
    async fn comment_listing_targets_the_task_subject() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"},"data":{"comments":[]}}"#);
        let client = authenticated_client(Arc::clone(&stub));

        client.task_comments(17).await.unwrap();
        assert_eq!(stub.last_request().body, "SubjectType=task&SubjectId=17");
    }

    #[tokio::test]
    async fn tasks_payload_without_array_is_invalid() {
        let stub = StubTransport::ok(r#"{"status":{"code":"ok"},"data":{"tasks":"nope"}}"#);
        let client = authenticated_client(stub);

        let err = client.actual_tasks().await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
