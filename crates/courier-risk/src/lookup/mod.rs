//! Fetching courier history from the upstream lookup service.
//!
//! [`CourierSource`] is the seam between the pure core and the network. The
//! service facade validates and parses around it; [`router`] exposes the
//! facade over HTTP.

mod client;
pub mod router;
mod service;

pub use client::HttpCourierSource;
pub use router::lookup_router;
pub use service::{PhoneCheckError, PhoneCheckService};

use crate::checks::{Language, PhoneNumber};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Supplies the raw lookup payload for a validated number.
#[async_trait]
pub trait CourierSource: Send + Sync {
    async fn fetch(&self, phone: &PhoneNumber, language: Language) -> Result<Value, LookupError>;
}

/// Credentials forwarded to the lookup service on every request.
#[derive(Debug, Clone, Default)]
pub struct SessionCredentials {
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl SessionCredentials {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            bearer_token: None,
        }
    }
}

/// Quota headers from the last upstream response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("authentication required, please log in again")]
    Unauthorized,
    #[error("access denied, insufficient permissions")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    #[error("daily quota exceeded, please upgrade your plan")]
    QuotaExceeded { details: Vec<String> },
    #[error("account temporarily locked, please try again later")]
    AccountLocked,
    #[error("{message}")]
    BadRequest { message: String },
    #[error("upstream error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("lookup service not reachable at {base_url}")]
    Transport {
        base_url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("lookup response was not valid JSON")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LookupError {
    /// Stable machine-readable code for API responses.
    pub const fn code(&self) -> &'static str {
        match self {
            LookupError::Unauthorized => "UNAUTHORIZED",
            LookupError::Forbidden => "FORBIDDEN",
            LookupError::NotFound => "NOT_FOUND",
            LookupError::QuotaExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            LookupError::AccountLocked => "ACCOUNT_LOCKED",
            LookupError::BadRequest { .. } => "BAD_REQUEST",
            LookupError::Server { .. } => "SERVER_ERROR",
            LookupError::Timeout(_) => "TIMEOUT",
            LookupError::Transport { .. } => "NETWORK_ERROR",
            LookupError::Decode(_) => "INVALID_RESPONSE",
        }
    }
}
