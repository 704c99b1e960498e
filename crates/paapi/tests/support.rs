#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paapi::PaApiConfig;

pub const REALM: &str = "test-realm";
pub const TOKEN_PATH: &str = "/authorisation/token";

/// Run blocking client code off the async test runtime.
///
/// reqwest's blocking client owns its own runtime and must be created and
/// dropped outside of tokio's worker threads.
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}

/// Config pointing both the identity provider and the API at `server`.
pub fn config_for(server: &MockServer) -> PaApiConfig {
    let mut config = PaApiConfig::new(REALM, "foo", "bar");
    config.auth_url = server.uri();
    config.api_url = format!("{}/pa/1", server.uri());
    config.timeout_secs = 5;
    config
}

pub fn token_body(token: &str, expires_in: i64) -> Value {
    json!({ "access_token": token, "token_type": "Bearer", "expires_in": expires_in })
}

pub fn page_body(results: Value) -> Value {
    json!({ "meta": { "totalCount": results.as_array().map_or(0, Vec::len) }, "results": results })
}

/// Serve `token` from the token endpoint for any number of requests.
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token, 43200)))
        .mount(server)
        .await;
}
