use super::{CourierSource, LookupError, RateLimitInfo, SessionCredentials};
use crate::checks::{Language, PhoneNumber};
use crate::config::LookupConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "x-api-key";
const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Lookup source backed by the courier check HTTP API.
pub struct HttpCourierSource {
    client: Client,
    base_url: String,
    timeout: Duration,
    credentials: SessionCredentials,
    rate_limit: Mutex<Option<RateLimitInfo>>,
}

impl HttpCourierSource {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: SessionCredentials,
    ) -> Result<Self, LookupError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LookupError::Transport {
                base_url: base_url.clone(),
                source: Box::new(err),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            credentials,
            rate_limit: Mutex::new(None),
        })
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let credentials = SessionCredentials {
            api_key: config.api_key.clone(),
            bearer_token: None,
        };
        Self::new(config.base_url.clone(), config.timeout, credentials)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Quota reported by the most recent response, if the upstream sent one.
    pub fn rate_limit(&self) -> Option<RateLimitInfo> {
        match self.rate_limit.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn check_url(&self, phone: &PhoneNumber) -> String {
        format!("{}/check/{}", self.base_url, phone.as_str())
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        let Some(info) = parse_rate_limit(headers) else {
            return;
        };
        debug!(
            limit = info.limit,
            remaining = info.remaining,
            "lookup quota updated"
        );
        match self.rate_limit.lock() {
            Ok(mut guard) => *guard = Some(info),
            Err(poisoned) => *poisoned.into_inner() = Some(info),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.timeout)
        } else {
            LookupError::Transport {
                base_url: self.base_url.clone(),
                source: Box::new(err),
            }
        }
    }
}

#[async_trait]
impl CourierSource for HttpCourierSource {
    async fn fetch(&self, phone: &PhoneNumber, language: Language) -> Result<Value, LookupError> {
        let mut request = self
            .client
            .get(self.check_url(phone))
            .query(&[("lang", language.code())])
            .header(ACCEPT, "application/json");

        if let Some(token) = &self.credentials.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(api_key) = &self.credentials.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        self.record_rate_limit(response.headers());

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;

        if !status.is_success() {
            let error = error_for_status(status, &body);
            warn!(status = status.as_u16(), code = error.code(), "lookup rejected");
            return Err(error);
        }

        serde_json::from_slice(&body).map_err(|err| LookupError::Decode(Box::new(err)))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Vec<String>>,
}

fn error_for_status(status: StatusCode, body: &[u8]) -> LookupError {
    let body: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => LookupError::Unauthorized,
        StatusCode::FORBIDDEN => LookupError::Forbidden,
        StatusCode::NOT_FOUND => LookupError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => LookupError::QuotaExceeded {
            details: body.details.unwrap_or_default(),
        },
        StatusCode::LOCKED => LookupError::AccountLocked,
        StatusCode::BAD_REQUEST => LookupError::BadRequest {
            message: body
                .message
                .unwrap_or_else(|| "an error occurred, please try again".to_string()),
        },
        other => LookupError::Server {
            status: other.as_u16(),
            message: body
                .message
                .unwrap_or_else(|| "server error occurred, please try again later".to_string()),
        },
    }
}

// All three headers must be present and numeric.
fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let read = |name: &str| -> Option<u64> {
        headers
            .get(name)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
    };

    Some(RateLimitInfo {
        limit: read(RATE_LIMIT_LIMIT)?,
        remaining: read(RATE_LIMIT_REMAINING)?,
        reset: read(RATE_LIMIT_RESET)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn maps_status_codes_to_errors() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, b""),
            LookupError::Unauthorized
        ));
        assert!(matches!(
            error_for_status(StatusCode::LOCKED, b"{}"),
            LookupError::AccountLocked
        ));

        match error_for_status(
            StatusCode::TOO_MANY_REQUESTS,
            br#"{"details":["limit 100/day"]}"#,
        ) {
            LookupError::QuotaExceeded { details } => assert_eq!(details, vec!["limit 100/day"]),
            other => panic!("unexpected error: {other:?}"),
        }

        match error_for_status(StatusCode::BAD_REQUEST, br#"{"message":"bad phone"}"#) {
            LookupError::BadRequest { message } => assert_eq!(message, "bad phone"),
            other => panic!("unexpected error: {other:?}"),
        }

        match error_for_status(StatusCode::SERVICE_UNAVAILABLE, b"<html>") {
            LookupError::Server { status, .. } => assert_eq!(status, 503),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rate_limit_requires_all_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from_static("100"));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("42"));
        assert!(parse_rate_limit(&headers).is_none());

        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("1724563591"));
        assert_eq!(
            parse_rate_limit(&headers),
            Some(RateLimitInfo {
                limit: 100,
                remaining: 42,
                reset: 1_724_563_591,
            })
        );
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let source = HttpCourierSource::new(
            "http://127.0.0.1:9/",
            Duration::from_secs(1),
            SessionCredentials::default(),
        )
        .expect("client builds");
        let phone = PhoneNumber::parse("01881143277").expect("valid");
        assert_eq!(source.check_url(&phone), "http://127.0.0.1:9/check/01881143277");
        assert!(source.rate_limit().is_none());
    }
}
