//! Typed view of the raw lookup payload.
//!
//! Backend data is partial and inconsistently typed, so every field decodes
//! leniently: malformed values degrade to their defaults instead of failing.

use super::domain::{CourierStats, CourierUser, DeliveryTotals, FraudDetail, FraudReport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCourierRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) stats: Option<RawStats>,
    #[serde(default, deserialize_with = "fraud_report")]
    pub(crate) fraud: Option<FraudReport>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) user: Option<RawUser>,
    #[serde(default, deserialize_with = "service_error")]
    pub(crate) error: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) details: Option<String>,
}

impl RawCourierRecord {
    /// Non-object values yield an empty record.
    pub(crate) fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStats {
    #[serde(default, deserialize_with = "lenient_count")]
    success: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    cancel: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    total: u64,
}

impl From<RawStats> for CourierStats {
    fn from(raw: RawStats) -> Self {
        CourierStats::new(raw.success, raw.cancel, raw.total)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawUser {
    #[serde(default, deserialize_with = "lenient_text")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    address: Option<String>,
}

impl From<RawUser> for CourierUser {
    fn from(raw: RawUser) -> Self {
        CourierUser {
            phone: raw.phone,
            name: raw.name,
            address: raw.address,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawFraudDetail {
    #[serde(default, deserialize_with = "lenient_text")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    details: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAiAnalysis {
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) summary: Option<RawAiSummary>,
}

impl RawAiAnalysis {
    pub(crate) fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(value) if value.is_object() => Self::deserialize(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAiSummary {
    #[serde(default, deserialize_with = "lenient_count")]
    total_success: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    total_cancel: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    total_parcels: u64,
    #[serde(default, deserialize_with = "lenient_flag")]
    has_fraud_report: bool,
}

impl From<RawAiSummary> for DeliveryTotals {
    fn from(raw: RawAiSummary) -> Self {
        DeliveryTotals {
            total_success: raw.total_success,
            total_cancel: raw.total_cancel,
            total_parcels: raw.total_parcels,
            has_fraud_report: raw.has_fraud_report,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// `true` or an object is a report; `false`, null and anything else are not.
fn fraud_report<'de, D>(deserializer: D) -> Result<Option<FraudReport>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(true) => Some(FraudReport::Flagged),
        Value::Object(_) => {
            let raw: RawFraudDetail = serde_json::from_value(value).unwrap_or_default();
            Some(FraudReport::Detailed(FraudDetail {
                phone: raw.phone,
                name: raw.name,
                details: raw.details,
                time: raw.time,
            }))
        }
        _ => None,
    })
}

/// Any truthy `error` marks the courier as failed. Strings and `message`
/// fields become the error text; other values are kept as raw JSON.
fn service_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Object(fields) => Some(
            fields
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
        ),
        _ => Some(value.to_string()),
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_count(&value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_flag(&value))
}

/// Integers pass through, floats truncate, numeric strings parse, negatives
/// clamp to zero and everything else is zero.
pub(crate) fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(number) => {
            if let Some(count) = number.as_u64() {
                count
            } else {
                number.as_f64().map(truncate_count).unwrap_or(0)
            }
        }
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(truncate_count))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn truncate_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

pub(crate) fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}
