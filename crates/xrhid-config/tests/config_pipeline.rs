//! Configured pipelines behave according to their configuration.

use bytes::Bytes;
use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
use http_body_util::Full;
use xrhid_config::ConfigLoader;
use xrhid_core::{fixtures, RequestContext};
use xrhid_middleware::{BoxFuture, Request, Response};

fn ok_handler(_ctx: RequestContext, _req: Request) -> BoxFuture<'static, Response> {
    Box::pin(async {
        HttpResponse::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::new()))
            .unwrap()
    })
}

#[tokio::test]
async fn test_configured_header_and_duplicate_policy() {
    let toml = r#"
        [identity]
        duplicate_headers = "reject"

        [request_id]
        header = "x-correlation-id"
    "#;
    let pipeline = ConfigLoader::new()
        .with_string(toml, "toml")
        .unwrap()
        .load()
        .unwrap()
        .build_pipeline()
        .unwrap();

    let header = fixtures::encode_json(fixtures::EXAMPLE_IDENTITY_JSON);
    let request = HttpRequest::builder()
        .uri("/")
        .header("x-rh-identity", header.as_str())
        .header("x-rh-identity", header.as_str())
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = pipeline
        .process(RequestContext::new(), request, ok_handler)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key("x-correlation-id"));
    assert!(!response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_default_pipeline_accepts_duplicates() {
    let pipeline = ConfigLoader::new().load().unwrap().build_pipeline().unwrap();

    let header = fixtures::encode_json(fixtures::EXAMPLE_IDENTITY_JSON);
    let request = HttpRequest::builder()
        .uri("/")
        .header("x-rh-identity", header.as_str())
        .header("x-rh-identity", "not-base64!")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = pipeline
        .process(RequestContext::new(), request, ok_handler)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}
