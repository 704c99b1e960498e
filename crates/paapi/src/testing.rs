//! Test doubles for the transport and token seams
//!
//! Available to this crate's unit tests and, with the `test-utils` feature,
//! to downstream crates.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::AccessTokenProvider;
use crate::error::{PaApiError, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, StatusCode};

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync;

/// In-memory [`HttpTransport`] that records every request and answers from
/// a handler
pub struct ScriptedTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Answer every request with a handler
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()) }
    }

    /// Answer every request with the same status and body
    ///
    /// # Panics
    ///
    /// Panics if `status` is not a valid HTTP status code.
    #[allow(clippy::expect_used)]
    pub fn always(status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status code");
        let body = body.into();
        Self::with_handler(move |_| Ok(HttpResponse::new(status, body.clone())))
    }

    /// Fail every request as if the server were unreachable
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_handler(move |_| {
            Err(PaApiError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message.clone(),
            )))
        })
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = (self.handler)(&request);
        self.requests.lock().push(request);
        response
    }
}

/// [`AccessTokenProvider`] that always returns the same token
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    pub fn shared(token: impl Into<String>) -> Arc<dyn AccessTokenProvider> {
        Arc::new(Self::new(token))
    }
}

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// [`AccessTokenProvider`] whose every call fails with the given error
pub struct FailingTokenProvider {
    make_error: Box<dyn Fn() -> PaApiError + Send + Sync>,
}

impl FailingTokenProvider {
    pub fn new<F>(make_error: F) -> Self
    where
        F: Fn() -> PaApiError + Send + Sync + 'static,
    {
        Self { make_error: Box::new(make_error) }
    }
}

impl AccessTokenProvider for FailingTokenProvider {
    fn access_token(&self) -> Result<String> {
        Err((self.make_error)())
    }
}
