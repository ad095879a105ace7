//! Integration tests for the plantpal-relay endpoint
//!
//! Tests cover:
//! - Status and body pass-through for upstream success and error replies
//! - Local 400 when no image part is present (upstream never called)
//! - Local 500 with {error, detail} on transport failure and timeout
//! - Open CORS policy
//! - Single-route surface

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use httpmock::prelude::*;
use plantpal_relay::{build_router, AppState, RelayConfig};
use serde_json::Value;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

const BOUNDARY: &str = "plantpal-test-boundary";
const API_KEY: &str = "test-api-key";
const FAKE_JPEG: &[u8] = b"fake-jpeg-payload";

/// Test helper: relay configuration pointing at a stub upstream
fn test_config(upstream_url: String) -> RelayConfig {
    RelayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream_url,
        project: "all".to_string(),
        api_key: API_KEY.to_string(),
        organ: "leaf".to_string(),
        timeout: Duration::from_secs(5),
        max_upload_bytes: 1024 * 1024,
        include_related_images: false,
    }
}

fn setup_app(config: RelayConfig) -> Router {
    build_router(AppState::new(config).expect("Should build upstream client"))
}

/// One multipart part: (field name, optional file name, content)
type TestPart<'a> = (&'a str, Option<&'a str>, &'a [u8]);

/// Test helper: encode a multipart/form-data body
fn multipart_body(parts: &[TestPart]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: image/jpeg\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(parts: &[TestPart]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/identify-plants")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn image_request() -> Request<Body> {
    multipart_request(&[("image", Some("leaf.jpg"), FAKE_JPEG)])
}

async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

async fn body_json(body: Body) -> Value {
    serde_json::from_str(&body_text(body).await).expect("Should parse JSON")
}

// =============================================================================
// Pass-through
// =============================================================================

#[tokio::test]
async fn test_success_status_and_body_pass_through() {
    let server = MockServer::start_async().await;
    let upstream_body = r#"{"results":[{"score":0.8734,"species":{"scientificNameWithoutAuthor":"Ficus lyrata","commonNames":["Fiddle Leaf Fig"]}}]}"#;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/identify/all")
                .query_param("api-key", API_KEY)
                .body_contains("name=\"images\"")
                .body_contains("name=\"organs\"")
                .body_contains("leaf")
                .body_contains("fake-jpeg-payload");
            then.status(200)
                .header("content-type", "application/json")
                .body(upstream_body);
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let response = app.oneshot(image_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_text(response.into_body()).await, upstream_body);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_status_relayed_verbatim() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/identify/all");
            then.status(404).body("Species not found");
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let response = app.oneshot(image_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response.into_body()).await, "Species not found");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_auth_failure_not_reinterpreted() {
    let server = MockServer::start_async().await;
    let upstream_body = r#"{"statusCode":401,"error":"Unauthorized","message":"Invalid API key"}"#;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/identify/all");
            then.status(401)
                .header("content-type", "application/json")
                .body(upstream_body);
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let response = app.oneshot(image_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response.into_body()).await, upstream_body);
}

#[tokio::test]
async fn test_any_file_part_is_accepted_as_image() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/identify/all")
                .body_contains("fake-jpeg-payload");
            then.status(200).body(r#"{"results":[]}"#);
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let request = multipart_request(&[
        ("organs", None, &b"flower"[..]),
        ("photo", Some("monstera.jpg"), FAKE_JPEG),
    ]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_related_images_flag_forwarded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/identify/all")
                .query_param("include-related-images", "true");
            then.status(200).body(r#"{"results":[]}"#);
        })
        .await;

    let config = RelayConfig {
        include_related_images: true,
        ..test_config(server.url("/v2/identify"))
    };
    let response = setup_app(config).oneshot(image_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

// =============================================================================
// Validation: no upstream call
// =============================================================================

#[tokio::test]
async fn test_missing_image_part_returns_400() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let request = multipart_request(&[("organs", None, &b"leaf"[..])]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "No image uploaded");
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_empty_image_part_returns_400() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let request = multipart_request(&[("image", Some("empty.jpg"), &b""[..])]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_non_multipart_body_returns_400() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/identify-plants")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image":"not-a-file"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body.get("error").is_some());
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let config = RelayConfig {
        max_upload_bytes: 64,
        ..test_config(server.url("/v2/identify"))
    };
    let big = vec![b'x'; 4096];
    let request = multipart_request(&[("image", Some("big.jpg"), big.as_slice())]);
    let response = setup_app(config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    mock.assert_hits_async(0).await;
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_unreachable_upstream_returns_500_with_detail() {
    // Reserve a port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = setup_app(test_config(format!("http://{}/v2/identify", addr)));
    let response = app.oneshot(image_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "Failed to reach identification service");
    let detail = body["detail"].as_str().unwrap();
    assert!(
        !detail.contains(API_KEY),
        "API key must not leak into error detail"
    );
    assert!(
        detail.matches("onnection refused").count() <= 1,
        "cause repeated in detail: {}",
        detail
    );
}

#[tokio::test]
async fn test_stalled_upstream_times_out_as_500() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/identify/all");
            then.status(200)
                .delay(Duration::from_secs(3))
                .body(r#"{"results":[]}"#);
        })
        .await;

    let config = RelayConfig {
        timeout: Duration::from_millis(300),
        ..test_config(server.url("/v2/identify"))
    };
    let response = setup_app(config).oneshot(image_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "Identification service timed out");
    assert!(body["detail"].is_string());
}

// =============================================================================
// CORS and route surface
// =============================================================================

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"results":[]}"#);
        })
        .await;

    let app = setup_app(test_config(server.url("/v2/identify")));
    let mut request = image_request();
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://pages.example.org".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight_succeeds() {
    let app = setup_app(test_config("http://127.0.0.1:9/v2/identify".to_string()));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/identify-plants")
        .header(header::ORIGIN, "http://pages.example.org")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_only_identify_route_exists() {
    let app = setup_app(test_config("http://127.0.0.1:9/v2/identify".to_string()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/identify-plants")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
