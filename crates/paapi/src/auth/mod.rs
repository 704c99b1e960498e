//! Authentication against the PA identity provider
//!
//! - [`Credentials`]: username, password and optional client basic-auth value
//! - [`Token`]: cached bearer token with an absolute expiry
//! - [`TokenAuthenticator`]: password-grant token manager with caching

pub mod authenticator;
pub mod credentials;
pub mod token;

pub use authenticator::{
    AccessTokenProvider, TokenAuthenticator, TokenAuthenticatorBuilder, DEFAULT_AUTH_URL,
    SAFETY_MARGIN_SECS, TOKEN_PATH,
};
pub use credentials::Credentials;
pub use token::{Token, TokenResponse};
