//! Endpoint URL construction
//!
//! Both the identity provider and the resource API are addressed as a base
//! URL plus an endpoint path plus query parameters. [`Endpoint`] holds the
//! parsed base and derives request URLs from it without keeping any other
//! state.

use url::Url;

use crate::error::{PaApiError, Result};

/// Parsed base URL that endpoint paths are appended to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Parse a base URL such as `https://paapi.siteconfidence.co.uk/pa/1`
    ///
    /// # Errors
    ///
    /// Returns [`PaApiError::Config`] if the URL does not parse or cannot
    /// carry a path (e.g. `mailto:`).
    pub fn parse(base: &str) -> Result<Self> {
        let url = Url::parse(base)?;
        if url.cannot_be_a_base() {
            return Err(PaApiError::Config(format!("URL cannot be used as a base: {base}")));
        }
        Ok(Self { base: url })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build `<base>/<path>?<params>`
    ///
    /// The base path is kept and `path` is appended after a single `/`.
    /// Parameters are form-urlencoded in the order given; with no parameters
    /// the URL has no query string at all.
    pub fn url<K, V>(&self, path: &str, params: &[(K, V)]) -> Url
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.base.clone();
        let joined = format!(
            "{}/{}",
            self.base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_fragment(None);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));
        }

        url
    }
}
