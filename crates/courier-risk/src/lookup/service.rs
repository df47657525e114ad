use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::{CourierSource, LookupError};
use crate::checks::{
    Language, ParseError, ParsedPhoneData, PhoneNumber, ResponseParser, ValidationError,
};

/// Service composing phone validation, the courier source and the response parser.
pub struct PhoneCheckService<S> {
    source: Arc<S>,
    parser: ResponseParser,
    default_language: Language,
}

impl<S> PhoneCheckService<S>
where
    S: CourierSource + 'static,
{
    pub fn new(source: Arc<S>, parser: ResponseParser) -> Self {
        Self {
            source,
            parser,
            default_language: Language::default(),
        }
    }

    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Validate the number, fetch its history and score it. Invalid input
    /// never reaches the source.
    pub async fn check(
        &self,
        raw_phone: &str,
        language: Option<Language>,
    ) -> Result<ParsedPhoneData, PhoneCheckError> {
        let phone = PhoneNumber::parse(raw_phone)?;
        let language = language.unwrap_or(self.default_language);

        let raw = self
            .source
            .fetch(&phone, language)
            .await
            .map_err(|err| {
                warn!(phone = %phone.masked(), code = err.code(), error = %err, "courier lookup failed");
                err
            })?;

        let parsed = self.parser.parse(&raw)?;
        info!(
            phone = %phone.masked(),
            lang = language.code(),
            couriers = parsed.courier_checks.len(),
            fraud_score = parsed.fraud_score,
            risk_level = ?parsed.risk_level,
            cached = parsed.cached,
            "phone check completed"
        );
        Ok(parsed)
    }

    /// Score a payload obtained elsewhere without touching the source.
    pub fn parse_payload(&self, raw: &Value) -> Result<ParsedPhoneData, PhoneCheckError> {
        Ok(self.parser.parse(raw)?)
    }

    pub fn parse_payload_at(
        &self,
        raw: &Value,
        now: DateTime<Utc>,
    ) -> Result<ParsedPhoneData, PhoneCheckError> {
        Ok(self.parser.parse_at(raw, now)?)
    }
}

/// Error raised by the phone check service.
#[derive(Debug, thiserror::Error)]
pub enum PhoneCheckError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    InvalidResponse(#[from] ParseError),
}
