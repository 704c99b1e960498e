//! # PA API client
//!
//! Blocking client for the PA performance-analysis API.
//!
//! This crate contains:
//! - A caching OAuth2 password-grant authenticator ([`TokenAuthenticator`])
//! - A resource client for job templates, test runs, page objects and jobs
//!   ([`ApiClient`])
//! - Environment and file based configuration ([`config`])
//!
//! ## Architecture
//! - Network access goes through the [`http::HttpTransport`] trait
//! - Time goes through the [`clock::Clock`] trait
//! - [`ApiClient`] depends on [`auth::AccessTokenProvider`], not on the
//!   concrete authenticator
//!
//! ```no_run
//! use paapi::{config, ApiClient};
//!
//! # fn main() -> paapi::Result<()> {
//! let client = ApiClient::from_config(&config::load()?)?;
//! for template in client.get_all_jobtemplates()? {
//!     println!("{}", template["uri"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, ApiClientConfig, Record, ResourcePage};
pub use auth::{AccessTokenProvider, Credentials, TokenAuthenticator};
pub use config::PaApiConfig;
pub use error::{ErrorCategory, PaApiError, Result};
