use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::auth::{Credentials, DEFAULT_AUTH_URL};
use crate::endpoint::Endpoint;
use crate::error::{PaApiError, Result};

/// Connection settings for one PA account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaApiConfig {
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub realm: String,
    pub username: String,
    pub password: String,
    /// Pre-encoded value for `Authorization: Basic` on the token request
    #[serde(default)]
    pub basic_auth: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl PaApiConfig {
    /// Config against the default endpoints
    pub fn new(
        realm: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            auth_url: default_auth_url(),
            api_url: default_api_url(),
            realm: realm.into(),
            username: username.into(),
            password: password.into(),
            basic_auth: None,
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }

    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(self.username.as_str(), self.password.as_str());
        match &self.basic_auth {
            Some(basic) => credentials.with_basic_auth(basic.as_str()),
            None => credentials,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings before any connection is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Config`] for an empty username or realm, a zero
    /// timeout, or a URL that cannot serve as a base.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(PaApiError::Config("username must not be empty".to_string()));
        }
        if self.realm.trim().is_empty() {
            return Err(PaApiError::Config("realm must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(PaApiError::Config("timeout_secs must be greater than zero".to_string()));
        }
        Endpoint::parse(&self.auth_url)
            .map_err(|e| PaApiError::Config(format!("auth_url: {e}")))?;
        Endpoint::parse(&self.api_url).map_err(|e| PaApiError::Config(format!("api_url: {e}")))?;
        Ok(())
    }
}

impl fmt::Debug for PaApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaApiConfig")
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("realm", &self.realm)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
