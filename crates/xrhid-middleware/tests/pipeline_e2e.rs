//! End-to-end pipeline integration tests.
//!
//! These tests run requests through the standard pipeline:
//!
//! 1. Request ID - Propagate or generate request ID
//! 2. Access Log - Structured log record and metrics
//! 3. Identity - Decode, validate and store `x-rh-identity`

use bytes::Bytes;
use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
use http_body_util::{BodyExt, Full};
use std::sync::{Arc, Mutex};
use xrhid_core::fixtures::{self, encode_json};
use xrhid_core::{RequestContext, ValidationPolicy};
use xrhid_middleware::{
    pipeline::Pipeline,
    stages::{AccessLogMiddleware, AccessLogRecord, IdentityMiddleware, RequestIdMiddleware},
    BoxFuture, Request, Response,
};

/// Creates a request with an optional identity header.
fn make_request(identity: Option<&str>) -> Request {
    let mut builder = HttpRequest::builder().uri("/api/inventory/v1/hosts");
    if let Some(value) = identity {
        builder = builder.header("x-rh-identity", value);
    }
    builder.body(Full::new(Bytes::new())).unwrap()
}

/// Handler that echoes the identity it received as `org/account`.
fn identity_echo(ctx: RequestContext, _req: Request) -> BoxFuture<'static, Response> {
    Box::pin(async move {
        let body = ctx
            .identity()
            .map(|id| format!("{}/{}", id.identity.org_id, id.identity.account_number))
            .unwrap_or_else(|| "none".to_string());
        HttpResponse::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    })
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn standard() -> Pipeline {
    Pipeline::standard(IdentityMiddleware::new(), RequestIdMiddleware::new())
}

#[tokio::test]
async fn test_stage_identity_header_is_accepted() {
    let header = encode_json(fixtures::EXAMPLE_IDENTITY_JSON);

    let response = standard()
        .process(RequestContext::new(), make_request(Some(&header)), identity_echo)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_string(response).await, "1979710/540155");
}

#[tokio::test]
async fn test_internal_org_id_is_promoted() {
    for json in fixtures::VALID_JSON {
        let header = encode_json(json);

        let response = standard()
            .process(RequestContext::new(), make_request(Some(&header)), identity_echo)
            .await;

        assert_eq!(body_string(response).await, "1979710/540155");
    }
}

#[tokio::test]
async fn test_missing_header_is_rejected() {
    let response = standard()
        .process(RequestContext::new(), make_request(None), identity_echo)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        body_string(response).await,
        "Bad Request: missing x-rh-identity header\n"
    );
}

#[tokio::test]
async fn test_garbage_payload_is_rejected() {
    let header = encode_json("garbage");

    let response = standard()
        .process(RequestContext::new(), make_request(Some(&header)), identity_echo)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response)
        .await
        .starts_with("Bad Request: x-rh-identity header does not contain valid JSON: "));
}

#[tokio::test]
async fn test_missing_type_is_rejected() {
    let header = encode_json(r#"{"identity": {"account_number": "540155", "org_id": "1979710"}}"#);

    let response = standard()
        .process(RequestContext::new(), make_request(Some(&header)), identity_echo)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_string(response).await,
        "Bad Request: x-rh-identity header is missing type\n"
    );
}

#[tokio::test]
async fn test_associate_without_account_or_org() {
    let header = encode_json(r#"{"identity": {"type": "Associate", "associate": {"email": "a@b.c"}}}"#);

    let relaxed = standard()
        .process(RequestContext::new(), make_request(Some(&header)), identity_echo)
        .await;
    assert_eq!(relaxed.status(), StatusCode::OK);

    let strict = Pipeline::standard(
        IdentityMiddleware::new().with_policy(ValidationPolicy::OrgIdOnly),
        RequestIdMiddleware::new(),
    )
    .process(RequestContext::new(), make_request(Some(&header)), identity_echo)
    .await;
    assert_eq!(strict.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejections_are_access_logged_with_request_id() {
    let records: Arc<Mutex<Vec<AccessLogRecord>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = records.clone();
    let rejections = Arc::new(Mutex::new(Vec::new()));
    let observed = rejections.clone();

    let pipeline = Pipeline::builder()
        .add_stage(RequestIdMiddleware::new())
        .add_stage(
            AccessLogMiddleware::new().with_sink(move |record| sink.lock().unwrap().push(record.clone())),
        )
        .add_stage(IdentityMiddleware::new().with_observer(move |ctx, _raw, reason| {
            let id = ctx.request_id().map(ToString::to_string).unwrap_or_default();
            observed.lock().unwrap().push((id, reason.to_string()));
        }))
        .build();

    let request = HttpRequest::builder()
        .uri("/api/test")
        .header("x-request-id", "trace-me")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = pipeline
        .process(RequestContext::new(), request, identity_echo)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-me");

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 400);
    assert_eq!(records[0].request_id, "trace-me");
    assert_eq!(
        records[0].size,
        "Bad Request: missing x-rh-identity header\n".len() as u64
    );

    let rejections = rejections.lock().unwrap();
    assert_eq!(
        *rejections,
        vec![(
            "trace-me".to_string(),
            "Bad Request: missing x-rh-identity header".to_string()
        )]
    );
}

#[tokio::test]
async fn test_pipeline_is_shared_across_tasks() {
    let pipeline = Arc::new(standard());
    let header = encode_json(fixtures::EXAMPLE_IDENTITY_JSON);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pipeline = pipeline.clone();
        let header = header.clone();
        handles.push(tokio::spawn(async move {
            let response = pipeline
                .process(RequestContext::new(), make_request(Some(&header)), identity_echo)
                .await;
            response.status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
}
