//! End-to-end tests for the resource client: real HTTP transport, mock PA
//! server for both the identity provider and the API.

mod support;

use std::sync::Arc;
use std::time::Duration;

use paapi::http::StatusCode;
use paapi::{AccessTokenProvider, ApiClient, ApiClientConfig, PaApiError};
use serde_json::json;
use support::{blocking, config_for, mount_token, page_body, REALM, TOKEN_PATH};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_get_all_jobtemplates() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("GET"))
        .and(path("/pa/1/jobTemplates"))
        .and(query_param("paginationPageSize", "1000"))
        .and(header("Authorization", "Bearer 123"))
        .and(header("Realm", REALM))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(json!([
            { "sref": "jobTemplates/1", "name": "test 1", "type": "Single" },
            { "sref": "jobTemplates/2", "name": "test 2", "type": "Single" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let jobtemplates = blocking(move || ApiClient::from_config(&config)?.get_all_jobtemplates())
        .await
        .expect("job templates");

    assert_eq!(jobtemplates.len(), 2, "Parsed jobtemplates isn't the right size");
    assert_eq!(jobtemplates[0]["name"], "test 1");
    assert_eq!(jobtemplates[1]["name"], "test 2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_testruns_for_jobtemplate() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("GET"))
        .and(path("/pa/1/testruns"))
        .and(query_param("jobTemplate", "jobTemplates/123"))
        .and(query_param("paginationPageSize", "1000"))
        .and(query_param_is_missing("fromDate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(json!([
            { "url": "http://site.com/first-testrun" },
            { "url": "http://site.com/second-testrun" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let testruns = blocking(move || {
        ApiClient::from_config(&config)?.get_testruns_for_jobtemplate("jobTemplates/123", None)
    })
    .await
    .expect("test runs");

    assert_eq!(testruns.len(), 2, "Parsed testruns isn't the right size");
    assert_eq!(testruns[0]["url"], "http://site.com/first-testrun");
    assert_eq!(testruns[1]["url"], "http://site.com/second-testrun");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_testruns_from_date() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("GET"))
        .and(path("/pa/1/testruns"))
        .and(query_param("fromDate", "2017-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let testruns = blocking(move || {
        ApiClient::from_config(&config)?
            .get_testruns_for_jobtemplate("jobTemplates/123", Some("2017-02-01"))
    })
    .await
    .expect("test runs");

    assert!(testruns.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_pageobjects_for_testrun() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("GET"))
        .and(path("/pa/1/objects"))
        .and(query_param("testRun", "testRuns/123"))
        .and(query_param("paginationPageSize", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(json!([
            { "url": "http://site.com/first-object" },
            { "url": "http://site.com/second-object" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let objects = blocking(move || {
        ApiClient::from_config(&config)?.get_pageobjects_for_testrun("testRuns/123")
    })
    .await
    .expect("page objects");

    assert_eq!(objects.len(), 2, "Parsed objects isn't the right size");
    assert_eq!(objects[0]["url"], "http://site.com/first-object");
    assert_eq!(objects[1]["url"], "http://site.com/second-object");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_job_template() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("POST"))
        .and(path("/pa/1/jobTemplates"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "name": "homepage" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": [],
            "results": { "jobTemplateUri": "jobTemplates/1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let created = blocking(move || {
        ApiClient::from_config(&config)?.create_job_template(&json!({ "name": "homepage" }))
    })
    .await
    .expect("created job template");

    assert_eq!(created["jobTemplateUri"], "jobTemplates/1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_job() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("POST"))
        .and(path("/pa/1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": [],
            "results": { "jobUri": "jobs/1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let created = blocking(move || ApiClient::from_config(&config)?.create_job(&json!({})))
        .await
        .expect("created job");

    assert_eq!(created["jobUri"], "jobs/1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_one_token_for_many_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::token_body("123", 43200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pa/1/jobTemplates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(json!([]))))
        .expect(3)
        .mount(&server)
        .await;

    let config = config_for(&server);
    blocking(move || {
        let client = ApiClient::from_config(&config)?;
        for _ in 0..3 {
            client.get_all_jobtemplates()?;
        }
        Ok::<_, PaApiError>(())
    })
    .await
    .expect("listing should succeed");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_request_error() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("GET"))
        .and(path("/pa/1/objects"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = blocking(move || {
        ApiClient::from_config(&config)?.get_pageobjects_for_testrun("testRuns/1")
    })
    .await
    .unwrap_err();

    assert!(err.is_request_error());
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_credentials_skip_api_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pa/1/jobTemplates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = blocking(move || ApiClient::from_config(&config)?.get_all_jobtemplates())
        .await
        .unwrap_err();

    assert!(err.is_authentication());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_job_rejected_by_server() {
    let server = MockServer::start().await;
    mount_token(&server, "123").await;
    Mock::given(method("POST"))
        .and(path("/pa/1/jobs"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown jobTemplate"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = blocking(move || {
        ApiClient::from_config(&config)?.create_job(&json!({ "jobTemplate": "jobTemplates/0" }))
    })
    .await
    .unwrap_err();

    match err {
        PaApiError::Request { status, url, body } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(url.ends_with("/pa/1/jobs"));
            assert_eq!(body.as_deref(), Some("unknown jobTemplate"));
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

struct FixedToken(&'static str);

impl AccessTokenProvider for FixedToken {
    fn access_token(&self) -> paapi::Result<String> {
        Ok(self.0.to_string())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_builder_with_own_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pa/1/objects"))
        .and(header("Authorization", "Bearer fixed"))
        .and(header("Realm", REALM))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(json!([{ "url": "https://a" }]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let base_url = format!("{}/pa/1", server.uri());
    let objects = blocking(move || {
        let client = ApiClient::builder()
            .config(ApiClientConfig {
                base_url,
                timeout: Duration::from_secs(5),
                accept_invalid_certs: false,
            })
            .realm(REALM)
            .auth(Arc::new(FixedToken("fixed")))
            .build()?;
        client.get_pageobjects_for_testrun("testRuns/1")
    })
    .await
    .expect("page objects");

    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0]["url"], "https://a");
}
