//! Bearer token types
//!
//! [`TokenResponse`] is what the identity provider sends back;
//! [`Token`] is what the authenticator caches: the opaque value plus the
//! absolute instant after which it must not be used.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::{PaApiError, Result};

/// Token endpoint response body
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds from the moment of issue; may be fractional
    pub expires_in: f64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Cached bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { value: value.into(), expires_at }
    }

    /// Build the cached token for a response received at `now`.
    ///
    /// The expiry is pulled forward by `safety_margin` so the token is
    /// replaced before the server would start rejecting it.
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::InvalidResponse`] if `expires_in` is out of
    /// range for a timestamp.
    pub fn from_response(
        response: &TokenResponse,
        now: DateTime<Utc>,
        safety_margin: Duration,
    ) -> Result<Self> {
        let out_of_range = || {
            PaApiError::InvalidResponse(format!(
                "expires_in out of range: {}",
                response.expires_in
            ))
        };

        let millis = (response.expires_in * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        #[allow(clippy::cast_possible_truncation)]
        let lifetime = Duration::try_milliseconds(millis as i64).ok_or_else(out_of_range)?;
        let expires_at = now
            .checked_add_signed(lifetime)
            .and_then(|at| at.checked_sub_signed(safety_margin))
            .ok_or_else(out_of_range)?;

        Ok(Self::new(response.access_token.clone(), expires_at))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A token is valid strictly before its expiry
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
