//! Token manager for the resource-owner password grant
//!
//! Manages the bearer token lifecycle:
//! - Lazy acquisition on first use
//! - In-memory caching until `expires_in - safety margin` has elapsed
//! - Re-authentication with the same credentials once the token expires
//!
//! The cache sits behind a single lock held across check-then-refresh, so
//! concurrent callers trigger at most one token request per expiry window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use super::credentials::Credentials;
use super::token::{Token, TokenResponse};
use crate::clock::{Clock, SystemClock};
use crate::endpoint::Endpoint;
use crate::error::{PaApiError, Result};
use crate::http::{HttpRequest, HttpTransport, ReqwestTransport};

/// Default identity-provider base URL
pub const DEFAULT_AUTH_URL: &str = "https://paapi.siteconfidence.co.uk";

/// Token endpoint path, relative to the identity-provider base URL
pub const TOKEN_PATH: &str = "authorisation/token";

/// Seconds by which a token's expiry is pulled forward to absorb clock skew
/// and in-flight latency
pub const SAFETY_MARGIN_SECS: i64 = 30;

/// Something that can hand out a currently valid bearer token
///
/// This trait allows dependency injection and testing with mock providers.
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, authenticating first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Authentication`] when the credentials are
    /// rejected, or another [`PaApiError`] when the token request fails.
    fn access_token(&self) -> Result<String>;
}

impl<T: AccessTokenProvider + ?Sized> AccessTokenProvider for Arc<T> {
    fn access_token(&self) -> Result<String> {
        (**self).access_token()
    }
}

/// Caching authenticator for the PA identity provider
pub struct TokenAuthenticator {
    credentials: Credentials,
    token_url: url::Url,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
    cached: Mutex<Option<Token>>,
}

impl TokenAuthenticator {
    /// Create an authenticator against the default identity provider, using
    /// a fresh reqwest transport and the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Config`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder(credentials: Credentials) -> TokenAuthenticatorBuilder {
        TokenAuthenticatorBuilder {
            credentials,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            transport: None,
            clock: None,
            safety_margin: Duration::seconds(SAFETY_MARGIN_SECS),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token_url(&self) -> &url::Url {
        &self.token_url
    }

    /// Run `f` with a currently valid token.
    ///
    /// Authenticates first if no token is cached or the cached one has
    /// expired. The token stays cached after `f` returns; nothing is
    /// released or revoked.
    ///
    /// # Errors
    ///
    /// Fails without calling `f` if a token cannot be obtained.
    pub fn authenticate<R>(&self, f: impl FnOnce(&str) -> R) -> Result<R> {
        let token = self.current_token()?;
        Ok(f(&token))
    }

    /// Currently valid token, authenticating first if needed.
    ///
    /// # Errors
    ///
    /// See [`authenticate`](Self::authenticate).
    pub fn access_token(&self) -> Result<String> {
        self.current_token()
    }

    /// Drop the cached token so the next call re-authenticates.
    pub fn invalidate(&self) {
        if self.cached.lock().take().is_some() {
            debug!("cached token invalidated");
        }
    }

    /// Expiry of the cached token, if one is cached (valid or not)
    pub fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.cached.lock().as_ref().map(Token::expires_at)
    }

    fn current_token(&self) -> Result<String> {
        let mut cached = self.cached.lock();
        let now = self.clock.now();

        if let Some(token) = cached.as_ref() {
            if token.is_valid_at(now) {
                return Ok(token.value().to_string());
            }
            debug!(expired_at = %token.expires_at(), "cached token expired");
        }

        // An expired token must not survive a failed refresh.
        *cached = None;

        let token = self.request_token()?;
        let value = token.value().to_string();
        *cached = Some(token);
        Ok(value)
    }

    #[instrument(skip(self), fields(url = %self.token_url, username = %self.credentials.username()))]
    fn request_token(&self) -> Result<Token> {
        let mut request = HttpRequest::new(Method::POST, self.token_url.clone()).form([
            ("username", self.credentials.username()),
            ("password", self.credentials.password()),
            ("grant_type", "password"),
        ]);
        if let Some(basic) = self.credentials.basic_auth() {
            request = request.header("Authorization", format!("Basic {basic}"));
        }

        let response = self.transport.execute(request)?;
        let status = response.status;

        if status.is_client_error() {
            warn!(%status, "identity provider rejected credentials");
            return Err(PaApiError::Authentication { status, body: response.text() });
        }

        if !status.is_success() {
            warn!(%status, "token request failed");
            let body = response.text();
            return Err(PaApiError::Request {
                status,
                url: self.token_url.to_string(),
                body: (!body.is_empty()).then_some(body),
            });
        }

        let parsed: TokenResponse = response.json()?;
        let token = Token::from_response(&parsed, self.clock.now(), self.safety_margin)?;

        info!(
            token_type = %parsed.token_type,
            expires_in = parsed.expires_in,
            expires_at = %token.expires_at(),
            "authenticated with PA identity provider"
        );

        Ok(token)
    }
}

impl AccessTokenProvider for TokenAuthenticator {
    fn access_token(&self) -> Result<String> {
        self.current_token()
    }
}

/// Builder for [`TokenAuthenticator`]
pub struct TokenAuthenticatorBuilder {
    credentials: Credentials,
    auth_url: String,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Option<Arc<dyn Clock>>,
    safety_margin: Duration,
}

impl TokenAuthenticatorBuilder {
    /// Identity-provider base URL; the token path is appended to it
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Build the authenticator
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Config`] if the URL is invalid or the default
    /// transport cannot be created.
    pub fn build(self) -> Result<TokenAuthenticator> {
        let token_url = Endpoint::parse(&self.auth_url)?.url::<&str, &str>(TOKEN_PATH, &[]);

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(TokenAuthenticator {
            credentials: self.credentials,
            token_url,
            transport,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            safety_margin: self.safety_margin,
            cached: Mutex::new(None),
        })
    }
}
