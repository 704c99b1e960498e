use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Resource-owner credentials for the password grant
///
/// Immutable once built. `Debug` never prints the password or the
/// basic-auth value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    basic_auth: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into(), basic_auth: None }
    }

    /// Attach a pre-encoded value for the `Authorization: Basic` header sent
    /// to the token endpoint.
    #[must_use]
    pub fn with_basic_auth(mut self, encoded: impl Into<String>) -> Self {
        self.basic_auth = Some(encoded.into());
        self
    }

    /// Attach client-application credentials, encoding them as
    /// `base64(client_id:client_secret)`.
    #[must_use]
    pub fn with_client_credentials(self, client_id: &str, client_secret: &str) -> Self {
        let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
        self.with_basic_auth(encoded)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn basic_auth(&self) -> Option<&str> {
        self.basic_auth.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
