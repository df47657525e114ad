use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::service::{PhoneCheckError, PhoneCheckService};
use super::{CourierSource, LookupError};
use crate::checks::Language;

const TRY_AGAIN: &str = "received an unexpected response from the lookup service, please try again";

/// Router builder exposing the phone check endpoints.
pub fn lookup_router<S>(service: Arc<PhoneCheckService<S>>) -> Router
where
    S: CourierSource + 'static,
{
    Router::new()
        .route("/api/v1/check/:phone", get(check_handler::<S>))
        .route("/api/v1/parse", post(parse_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

pub(crate) async fn check_handler<S>(
    State(service): State<Arc<PhoneCheckService<S>>>,
    Path(phone): Path<String>,
    Query(query): Query<CheckQuery>,
) -> Response
where
    S: CourierSource + 'static,
{
    let language = match query.lang.as_deref().map(str::parse::<Language>) {
        None => None,
        Some(Ok(language)) => Some(language),
        Some(Err(err)) => {
            let payload = json!({ "error": err.to_string(), "field": "lang" });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    match service.check(&phone, language).await {
        Ok(parsed) => (StatusCode::OK, Json(parsed)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn parse_handler<S>(
    State(service): State<Arc<PhoneCheckService<S>>>,
    Json(raw): Json<Value>,
) -> Response
where
    S: CourierSource + 'static,
{
    match service.parse_payload(&raw) {
        Ok(parsed) => (StatusCode::OK, Json(parsed)).into_response(),
        // Caller-supplied payload.
        Err(PhoneCheckError::InvalidResponse(err)) => {
            let payload = json!({ "error": err.to_string(), "code": "INVALID_PAYLOAD" });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Map a service error to its HTTP response.
pub fn error_response(err: PhoneCheckError) -> Response {
    match err {
        PhoneCheckError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        PhoneCheckError::InvalidResponse(error) => {
            error!(%error, "lookup payload rejected");
            let payload = json!({ "error": TRY_AGAIN });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        PhoneCheckError::Lookup(error) => {
            let status = lookup_status(&error);
            let mut payload = json!({
                "error": error.to_string(),
                "code": error.code(),
            });
            if let LookupError::QuotaExceeded { details } = &error {
                payload["details"] = json!(details);
            }
            (status, Json(payload)).into_response()
        }
    }
}

fn lookup_status(error: &LookupError) -> StatusCode {
    match error {
        LookupError::Unauthorized => StatusCode::UNAUTHORIZED,
        LookupError::Forbidden => StatusCode::FORBIDDEN,
        LookupError::NotFound => StatusCode::NOT_FOUND,
        LookupError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        LookupError::AccountLocked => StatusCode::LOCKED,
        LookupError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        LookupError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        LookupError::Server { .. } | LookupError::Transport { .. } | LookupError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}
