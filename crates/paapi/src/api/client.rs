//! PA API resource client
//!
//! Turns the job-template, test-run and page-object operations into
//! authenticated HTTP calls. Every call fetches a token from the
//! [`AccessTokenProvider`], so expired tokens are replaced transparently.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::types::{Record, ResourcePage};
use crate::auth::{AccessTokenProvider, TokenAuthenticator};
use crate::config::PaApiConfig;
use crate::endpoint::Endpoint;
use crate::error::{PaApiError, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};

/// Default resource API base URL
pub const DEFAULT_API_URL: &str = "https://paapi.siteconfidence.co.uk/pa/1";

/// Page size requested from every list endpoint
pub const PAGE_SIZE: u32 = 1000;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the resource API (e.g. "https://paapi.siteconfidence.co.uk/pa/1")
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// Client for the PA resource API
pub struct ApiClient {
    endpoint: Endpoint,
    realm: String,
    auth: Arc<dyn AccessTokenProvider>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Create a client with its own reqwest transport
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Config`] if the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(
        config: ApiClientConfig,
        realm: impl Into<String>,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let transport = ReqwestTransport::builder()
            .timeout(config.timeout)
            .accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Self::with_transport(&config.base_url, realm, auth, Arc::new(transport))
    }

    fn with_transport(
        base_url: &str,
        realm: impl Into<String>,
        auth: Arc<dyn AccessTokenProvider>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        Ok(Self { endpoint: Endpoint::parse(base_url)?, realm: realm.into(), auth, transport })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Wire a [`TokenAuthenticator`] and an API client from configuration.
    ///
    /// Both share one HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Config`] if the configuration is invalid.
    pub fn from_config(config: &PaApiConfig) -> Result<Self> {
        config.validate()?;

        let transport: Arc<dyn HttpTransport> = Arc::new(
            ReqwestTransport::builder()
                .timeout(config.timeout())
                .accept_invalid_certs(config.accept_invalid_certs)
                .build()?,
        );

        let authenticator = TokenAuthenticator::builder(config.credentials())
            .auth_url(config.auth_url.as_str())
            .transport(transport.clone())
            .build()?;

        Self::with_transport(
            &config.api_url,
            config.realm.as_str(),
            Arc::new(authenticator),
            transport,
        )
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn base_url(&self) -> &Url {
        self.endpoint.base()
    }

    /// All job templates visible to the account.
    ///
    /// Only the first page (up to [`PAGE_SIZE`] records) is returned.
    ///
    /// # Errors
    ///
    /// Fails on authentication, transport or request errors; no partial
    /// results are returned.
    #[instrument(skip(self))]
    pub fn get_all_jobtemplates(&self) -> Result<Vec<Record>> {
        let page_size = PAGE_SIZE.to_string();
        self.list("jobTemplates", &[("paginationPageSize", page_size.as_str())])
    }

    /// Test runs of one job template, optionally only those from
    /// `start_date` onwards.
    ///
    /// `start_date` is passed through as the `fromDate` parameter without
    /// reformatting.
    ///
    /// # Errors
    ///
    /// See [`get_all_jobtemplates`](Self::get_all_jobtemplates).
    #[instrument(skip(self))]
    pub fn get_testruns_for_jobtemplate(
        &self,
        jobtemplate_uri: &str,
        start_date: Option<&str>,
    ) -> Result<Vec<Record>> {
        let page_size = PAGE_SIZE.to_string();
        let mut params = vec![
            ("jobTemplate", jobtemplate_uri),
            ("paginationPageSize", page_size.as_str()),
        ];
        if let Some(start_date) = start_date {
            params.push(("fromDate", start_date));
        }
        self.list("testruns", &params)
    }

    /// Page objects recorded during one test run
    ///
    /// # Errors
    ///
    /// See [`get_all_jobtemplates`](Self::get_all_jobtemplates).
    #[instrument(skip(self))]
    pub fn get_pageobjects_for_testrun(&self, testrun_uri: &str) -> Result<Vec<Record>> {
        let page_size = PAGE_SIZE.to_string();
        self.list("objects", &[("testRun", testrun_uri), ("paginationPageSize", page_size.as_str())])
    }

    /// Create a job template and return the created resource.
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Serialization`] if `definition` cannot be
    /// encoded as JSON (nothing is sent), [`PaApiError::InvalidResponse`] if
    /// the response is not a JSON object, and a request error on a non-2xx
    /// status.
    #[instrument(skip(self, definition))]
    pub fn create_job_template<T: Serialize + ?Sized>(&self, definition: &T) -> Result<Record> {
        self.create("jobTemplates", definition)
    }

    /// Create a job and return the created resource.
    ///
    /// # Errors
    ///
    /// See [`create_job_template`](Self::create_job_template).
    #[instrument(skip(self, definition))]
    pub fn create_job<T: Serialize + ?Sized>(&self, definition: &T) -> Result<Record> {
        self.create("jobs", definition)
    }

    fn list(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<Record>> {
        let url = self.endpoint.url(path, params);
        let response = self.send(HttpRequest::new(Method::GET, url.clone()))?;

        let page: ResourcePage = response.json()?;
        info!(url = %url, count = page.results.len(), "listed resources");
        Ok(page.results)
    }

    fn create<T: Serialize + ?Sized>(&self, path: &str, definition: &T) -> Result<Record> {
        let body = serde_json::to_value(definition).map_err(PaApiError::Serialization)?;

        let url = self.endpoint.url::<&str, &str>(path, &[]);
        let request = HttpRequest::new(Method::POST, url.clone())
            .header("Content-Type", "application/json")
            .json(body);
        let response = self.send(request)?;

        let created = match response.json::<Value>()? {
            Value::Object(mut object) => match object.remove("results") {
                Some(Value::Object(results)) => results,
                Some(other) => {
                    return Err(PaApiError::InvalidResponse(format!(
                        "expected `results` to be an object, got {other}"
                    )))
                }
                None => object,
            },
            other => {
                return Err(PaApiError::InvalidResponse(format!(
                    "expected a JSON object, got {other}"
                )))
            }
        };

        info!(url = %url, "created resource");
        Ok(created)
    }

    /// Authenticate, send and reject non-2xx responses
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let token = self.auth.access_token()?;
        let request = request
            .header("Authorization", format!("Bearer {token}"))
            .header("Realm", self.realm.as_str());

        let url = request.url.to_string();
        debug!(method = %request.method, url = %url, "PA API request");

        let response = self.transport.execute(request)?;
        let status = response.status;
        if !status.is_success() {
            warn!(%status, url = %url, "PA API request failed");
            let body = response.text();
            return Err(PaApiError::Request {
                status,
                url,
                body: (!body.is_empty()).then_some(body),
            });
        }

        Ok(response)
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    realm: Option<String>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the realm sent with every request
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Use an existing transport instead of building one from the config
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ApiClient> {
        let config = self.config.unwrap_or_default();
        let auth =
            self.auth.ok_or_else(|| PaApiError::Config("Auth provider not set".to_string()))?;
        let realm = self.realm.ok_or_else(|| PaApiError::Config("Realm not set".to_string()))?;

        match self.transport {
            Some(transport) => ApiClient::with_transport(&config.base_url, realm, auth, transport),
            None => ApiClient::new(config, realm, auth),
        }
    }
}
