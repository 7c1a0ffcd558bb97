use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// The access-id / secret-key pair identifying an authenticated principal.
///
/// Credentials are born from a successful `authenticate` call or supplied
/// at client construction, and live for the lifetime of the client
/// instance. The library never persists them; callers are responsible for
/// storage and reuse.
///
/// The secret key is held as a [`SecretString`], which zeroes its memory
/// on drop and requires an explicit [`Credentials::secret_key`] call to
/// expose the raw bytes for MAC computation.
#[derive(Clone)]
pub struct Credentials {
    access_id: String,
    secret_key: SecretString,
}

impl Credentials {
    /// Creates a credential pair from a previously issued access id and
    /// secret key.
    pub fn new(access_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// The public access id, sent in the `X-Authorization` header.
    #[must_use]
    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    /// Exposes the raw secret key for signing.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

// Custom Debug implementation to avoid exposing the secret key
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_id", &self.access_id)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Everything the authorize endpoint returns on success.
///
/// The client stores the access id and secret key internally; the whole
/// grant is handed back to the caller so the pair can be saved and reused
/// to construct clients that do not need to log in again.
pub struct AuthGrant {
    /// The issued access id.
    pub access_id: String,
    /// The issued secret key.
    pub secret_key: SecretString,
    /// Numeric id of the employee the login belongs to.
    pub employee_id: u64,
}

impl fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGrant")
            .field("access_id", &self.access_id)
            .field("secret_key", &"[REDACTED]")
            .field("employee_id", &self.employee_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret_key() {
        let credentials = Credentials::new("id-123", "very-secret");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("id-123"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("very-secret"));
    }

    #[test]
    fn secret_key_is_exposable_for_signing() {
        let credentials = Credentials::new("id", "key-material");
        assert_eq!(credentials.secret_key(), "key-material");
    }
}
