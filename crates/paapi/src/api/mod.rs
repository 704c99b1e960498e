//! Resource API: job templates, test runs, page objects and jobs

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig, DEFAULT_API_URL, PAGE_SIZE};
pub use types::{Record, ResourcePage};
