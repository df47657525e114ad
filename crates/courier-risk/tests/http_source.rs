//! The reqwest-backed courier source against a local lookup server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use courier_risk::checks::{Language, PhoneNumber};
use courier_risk::lookup::{
    CourierSource, HttpCourierSource, LookupError, RateLimitInfo, SessionCredentials,
};
use serde_json::json;

async fn check(
    Path(phone): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    match phone.as_str() {
        "01700000429" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "message": "quota", "details": ["100 lookups per day"] })),
        )
            .into_response(),
        "01700000400" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "phone number is blacklisted" })),
        )
            .into_response(),
        "01700000500" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "01700000200" => (StatusCode::OK, "not json").into_response(),
        "01700000408" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({})).into_response()
        }
        _ => (
            [
                ("x-ratelimit-limit", "100"),
                ("x-ratelimit-remaining", "99"),
                ("x-ratelimit-reset", "1724563591"),
            ],
            Json(json!({
                "echo": {
                    "phone": phone,
                    "lang": query.get("lang"),
                    "api_key": header("x-api-key"),
                    "authorization": header("authorization"),
                },
                "pathao": { "stats": { "success": 1, "cancel": 0, "total": 1 } }
            })),
        )
            .into_response(),
    }
}

async fn spawn_lookup_server() -> SocketAddr {
    let app = Router::new().route("/check/:phone", get(check));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });
    addr
}

fn source(addr: SocketAddr, timeout: Duration) -> HttpCourierSource {
    HttpCourierSource::new(
        format!("http://{addr}/"),
        timeout,
        SessionCredentials {
            api_key: Some("key-123".to_string()),
            bearer_token: Some("token-abc".to_string()),
        },
    )
    .expect("client builds")
}

fn phone(raw: &str) -> PhoneNumber {
    PhoneNumber::parse(raw).expect("valid number")
}

#[tokio::test]
async fn sends_credentials_and_language() {
    let addr = spawn_lookup_server().await;
    let source = source(addr, Duration::from_secs(5));

    let body = source
        .fetch(&phone("01881143277"), Language::Bn)
        .await
        .expect("lookup succeeds");

    assert_eq!(body["echo"]["phone"], "01881143277");
    assert_eq!(body["echo"]["lang"], "bn");
    assert_eq!(body["echo"]["api_key"], "key-123");
    assert_eq!(body["echo"]["authorization"], "Bearer token-abc");
    assert_eq!(body["pathao"]["stats"]["total"], 1);
    assert_eq!(
        source.rate_limit(),
        Some(RateLimitInfo {
            limit: 100,
            remaining: 99,
            reset: 1_724_563_591,
        })
    );
}

#[tokio::test]
async fn maps_upstream_error_statuses() {
    let addr = spawn_lookup_server().await;
    let source = source(addr, Duration::from_secs(5));

    match source.fetch(&phone("01700000429"), Language::En).await {
        Err(LookupError::QuotaExceeded { details }) => {
            assert_eq!(details, vec!["100 lookups per day".to_string()])
        }
        other => panic!("unexpected result: {other:?}"),
    }

    match source.fetch(&phone("01700000400"), Language::En).await {
        Err(LookupError::BadRequest { message }) => {
            assert_eq!(message, "phone number is blacklisted")
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(matches!(
        source.fetch(&phone("01700000500"), Language::En).await,
        Err(LookupError::Server { status: 500, .. })
    ));
    assert!(matches!(
        source.fetch(&phone("01700000200"), Language::En).await,
        Err(LookupError::Decode(_))
    ));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let addr = spawn_lookup_server().await;
    let source = source(addr, Duration::from_millis(100));

    match source.fetch(&phone("01700000408"), Language::En).await {
        Err(LookupError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(100)),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let source = source(addr, Duration::from_secs(2));
    let err = source
        .fetch(&phone("01881143277"), Language::En)
        .await
        .expect_err("nothing is listening");
    assert_eq!(err.code(), "NETWORK_ERROR");
    assert!(source.rate_limit().is_none());
}
