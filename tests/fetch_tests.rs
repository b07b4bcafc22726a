use remwaste_client::config::ClientOptions;
use remwaste_client::fetch::HttpClient;
use remwaste_client::retry::{RetryPolicy, RetryingClient};
use remwaste_client::Error;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_http(server_uri: &str) -> HttpClient {
    HttpClient::new(ClientOptions::for_base_url(server_uri)).unwrap()
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_retries(max_retries)
        .with_initial_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(40))
}

#[tokio::test]
async fn test_post_sends_json_and_bearer_token() {
    let server = MockServer::start().await;
    let http = setup_http(&server.uri());

    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("Authorization", "Bearer abc.def.ghi"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"title": "Bottle"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let response = http
        .post("/items")
        .bearer_auth("abc.def.ghi")
        .json(&json!({"title": "Bottle"}))
        .unwrap()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert!(response.is_success());
    assert_eq!(response.body, json!({"ok": true}));
    assert!(response.content_type().unwrap().contains("application/json"));
}

#[tokio::test]
async fn test_non_success_fails_by_default() {
    let server = MockServer::start().await;
    let http = setup_http(&server.uri());

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Access token required"})),
        )
        .mount(&server)
        .await;

    let result = http.get("/items").send().await;

    match result.err().unwrap() {
        Error::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Access token required"));
        }
        other => panic!("Expected Error::UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_allow_failure_returns_raw_response() {
    let server = MockServer::start().await;
    let http = setup_http(&server.uri());

    Mock::given(method("DELETE"))
        .and(path("/items/99999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Item not found"})))
        .mount(&server)
        .await;

    let response = http
        .delete("/items/99999")
        .allow_failure()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.error_message(), Some("Item not found"));
}

#[tokio::test]
async fn test_server_error_is_surfaced() {
    let server = MockServer::start().await;
    let http = setup_http(&server.uri());

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let raw = http.get("/items").allow_failure().send().await.unwrap();
    assert_eq!(raw.status, 500);
    assert_eq!(raw.body, json!("Internal Server Error"));

    let result = http.get("/items").send().await;
    assert!(matches!(result, Err(Error::UnexpectedStatus { status: 500, .. })));
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockServer::start().await;
    let http = setup_http(&server.uri());

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let result = http
        .get("/health")
        .timeout(Duration::from_millis(50))
        .send()
        .await;

    match result.err().unwrap() {
        e @ Error::Http(_) => assert!(e.is_network()),
        other => panic!("Expected Error::Http, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retrying_client_waits_for_service_to_wake() {
    let server = MockServer::start().await;
    let retrying = RetryingClient::new(setup_http(&server.uri()), fast_policy(3));

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = retrying
        .send_until(
            |http| http.get("/health").allow_failure(),
            |r| r.status == 200,
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_retrying_client_returns_last_response_when_exhausted() {
    let server = MockServer::start().await;
    let retrying = RetryingClient::new(setup_http(&server.uri()), fast_policy(2));

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let response = retrying
        .send_until(
            |http| http.get("/health").allow_failure(),
            |r| r.status == 200,
        )
        .await
        .unwrap();

    assert_eq!(response.status, 503);
}

#[tokio::test]
async fn test_retrying_client_does_not_retry_status_errors() {
    let server = MockServer::start().await;
    let retrying = RetryingClient::new(setup_http(&server.uri()), fast_policy(3));

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // Without allow_failure the 401 is an UnexpectedStatus error, which is not a network error.
    let result = retrying
        .send_until(|http| http.get("/items"), |r| r.status == 200)
        .await;

    assert!(matches!(result, Err(Error::UnexpectedStatus { status: 401, .. })));
}

#[tokio::test]
async fn test_invalid_header_fails_before_sending() {
    let server = MockServer::start().await;
    let http = setup_http(&server.uri());

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;

    let result = http.get("/items").bearer_auth("bad\ntoken").send().await;

    match result.err().unwrap() {
        Error::Config(msg) => assert!(msg.contains("Authorization")),
        other => panic!("Expected Error::Config, got {:?}", other),
    }
}
