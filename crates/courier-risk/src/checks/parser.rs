use super::domain::{
    AiAnalysis, Courier, CourierService, DeliveryTotals, ParsedPhoneData, ServiceStatus,
};
use super::normalizer::normalize_with;
use super::payload::{coerce_flag, RawAiAnalysis};
use super::scoring::{FraudScorer, ScoringConfig};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

const COURIER_CHECKS_KEY: &str = "courier_checks";
const AI_ANALYSIS_KEY: &str = "ai_analysis";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid response format: expected a JSON object, received {found}")]
    InvalidResponseFormat { found: &'static str },
}

/// Courier wrapping conventions the lookup backend has shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseShape {
    Wrapped,
    Flat,
}

/// Turns a raw lookup payload into [`ParsedPhoneData`]. Stateless between calls.
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    scorer: FraudScorer,
}

impl ResponseParser {
    pub fn with_config(config: ScoringConfig) -> Self {
        Self {
            scorer: FraudScorer::new(config),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.scorer.config()
    }

    pub fn parse(&self, raw: &Value) -> Result<ParsedPhoneData, ParseError> {
        self.parse_at(raw, Utc::now())
    }

    /// Parse with an explicit lookup time, used when the payload has no timestamp.
    pub fn parse_at(&self, raw: &Value, now: DateTime<Utc>) -> Result<ParsedPhoneData, ParseError> {
        let payload = raw.as_object().ok_or(ParseError::InvalidResponseFormat {
            found: json_kind(raw),
        })?;

        let (container, shape) = courier_container(payload);
        debug!(?shape, "detected courier payload shape");

        let thresholds = &self.config().classifier;
        let mut courier_checks = BTreeMap::new();
        for courier in Courier::ordered() {
            match container.get(courier.key()) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => {
                    debug!(courier = courier.key(), "no data from courier");
                }
                Some(record) => {
                    let check = normalize_with(record, thresholds);
                    if let Some(error) = check.error() {
                        debug!(courier = courier.key(), error, "courier reported an error");
                    }
                    courier_checks.insert(courier, check);
                }
            }
        }

        let services = Courier::ordered()
            .into_iter()
            .map(|courier| CourierService {
                courier,
                name: courier.label(),
                status: courier_checks
                    .get(&courier)
                    .map_or(ServiceStatus::Unavailable, |check| check.service_status()),
            })
            .collect();

        let raw_ai = RawAiAnalysis::from_value(payload.get(AI_ANALYSIS_KEY));
        let ai_summary: Option<DeliveryTotals> = raw_ai.summary.map(Into::into);
        let assessment = self.scorer.score(&courier_checks, ai_summary.as_ref());

        let analysis = raw_ai
            .analysis
            .clone()
            .or_else(|| payload.get("analysis").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();

        let cached = payload.get("cached").map(coerce_flag).unwrap_or(false);
        let timestamp = payload
            .get("timestamp")
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

        debug!(
            couriers = courier_checks.len(),
            fraud_score = assessment.fraud_score,
            risk_level = ?assessment.risk_level,
            totals_source = ?assessment.totals_source,
            "parsed lookup payload"
        );

        Ok(ParsedPhoneData {
            courier_checks,
            ai_analysis: AiAnalysis {
                analysis: raw_ai.analysis,
                language: raw_ai.language,
                summary: Some(assessment.totals),
            },
            fraud_score: assessment.fraud_score,
            risk_level: assessment.risk_level,
            analysis,
            cached,
            timestamp,
            totals_source: assessment.totals_source,
            services,
        })
    }
}

/// Parse with the default scoring weights.
pub fn parse_phone_check_response(raw: &Value) -> Result<ParsedPhoneData, ParseError> {
    ResponseParser::default().parse(raw)
}

fn courier_container(payload: &Map<String, Value>) -> (&Map<String, Value>, ResponseShape) {
    match payload.get(COURIER_CHECKS_KEY).and_then(Value::as_object) {
        Some(wrapped) => (wrapped, ResponseShape::Wrapped),
        None => (payload, ResponseShape::Flat),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::domain::{FraudStatus, RiskLevel, TotalsSource};
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 25, 6, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[test]
    fn rejects_non_object_payloads() {
        let parser = ResponseParser::default();
        for raw in [json!(null), json!([1, 2]), json!("ok"), json!(3)] {
            assert!(matches!(
                parser.parse(&raw),
                Err(ParseError::InvalidResponseFormat { .. })
            ));
        }
    }

    #[test]
    fn wrapped_shape_takes_precedence_over_top_level_keys() {
        let raw = json!({
            "courier_checks": {
                "redx": { "stats": { "success": 5, "cancel": 0, "total": 5 } }
            },
            "pathao": { "stats": { "success": 0, "cancel": 9, "total": 9 } }
        });

        let parsed = ResponseParser::default()
            .parse_at(&raw, fixed_now())
            .expect("parses");
        assert_eq!(
            parsed.courier_checks.keys().copied().collect::<Vec<_>>(),
            vec![Courier::Redx]
        );
        assert_eq!(parsed.fraud_score, 0);
    }

    #[test]
    fn non_object_wrapper_falls_back_to_flat_shape() {
        let raw = json!({
            "courier_checks": null,
            "steadfast": { "stats": { "success": 1, "cancel": 0, "total": 1 } }
        });
        let parsed = ResponseParser::default().parse(&raw).expect("parses");
        assert!(parsed.courier(Courier::Steadfast).is_some());
    }

    #[test]
    fn null_courier_entries_are_treated_as_absent() {
        let raw = json!({ "pathao": null, "redx": false, "steadfast": {} });
        let parsed = ResponseParser::default().parse(&raw).expect("parses");
        assert_eq!(
            parsed.courier_checks.keys().copied().collect::<Vec<_>>(),
            vec![Courier::Steadfast]
        );
    }

    #[test]
    fn defaults_cached_and_timestamp() {
        let parsed = ResponseParser::default()
            .parse_at(&json!({}), fixed_now())
            .expect("parses");
        assert!(!parsed.cached);
        assert_eq!(parsed.timestamp, "2025-08-25T06:00:00.000Z");
        assert_eq!(parsed.analysis, "");
        assert!(parsed.courier_checks.is_empty());
        assert_eq!(parsed.totals_source, TotalsSource::CourierSum);
        assert_eq!(parsed.totals(), DeliveryTotals::default());
    }

    #[test]
    fn copies_cached_timestamp_and_analysis_from_payload() {
        let raw = json!({
            "cached": true,
            "timestamp": "2025-08-25T05:06:31.000Z",
            "analysis": "fallback analysis",
        });
        let parsed = ResponseParser::default()
            .parse_at(&raw, fixed_now())
            .expect("parses");
        assert!(parsed.cached);
        assert_eq!(parsed.timestamp, "2025-08-25T05:06:31.000Z");
        assert_eq!(parsed.analysis, "fallback analysis");
    }

    #[test]
    fn derives_summary_when_ai_block_missing() {
        let raw = json!({
            "pathao": { "stats": { "success": 2, "cancel": 8, "total": 10 } },
            "redx": { "stats": { "success": 0, "cancel": 0, "total": 0 }, "fraud": true }
        });
        let parsed = ResponseParser::default().parse(&raw).expect("parses");

        let summary = parsed.ai_analysis.summary.expect("summary derived");
        assert_eq!(summary.total_parcels, 10);
        assert_eq!(summary.total_cancel, 8);
        assert!(summary.has_fraud_report);
        // base 40 + cancel 30 + fraud 40 -> clamped
        assert_eq!(parsed.fraud_score, 100);
        assert_eq!(parsed.risk_level, RiskLevel::High);
        assert_eq!(
            parsed.courier(Courier::Pathao).map(|c| c.fraud_status()),
            Some(FraudStatus::Fraudulent)
        );
    }

    #[test]
    fn failed_courier_is_distinct_from_zero_activity() {
        let raw = json!({
            "pathao": { "error": "Pathao API timeout" },
            "redx": { "stats": { "success": 0, "cancel": 0, "total": 0 } }
        });
        let parsed = ResponseParser::default()
            .parse_at(&raw, fixed_now())
            .expect("parses");

        let pathao = parsed.courier(Courier::Pathao).expect("pathao kept");
        assert_eq!(pathao.service_status(), ServiceStatus::Error);
        assert_eq!(pathao.error(), Some("Pathao API timeout"));
        assert_eq!(parsed.service_status(Courier::Redx), ServiceStatus::Available);
        assert_eq!(
            parsed.service_status(Courier::Steadfast),
            ServiceStatus::Unavailable
        );
        assert_ne!(parsed.courier(Courier::Pathao), parsed.courier(Courier::Redx));

        let statuses: Vec<_> = parsed
            .services
            .iter()
            .map(|service| (service.courier, service.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (Courier::Pathao, ServiceStatus::Error),
                (Courier::Steadfast, ServiceStatus::Unavailable),
                (Courier::Redx, ServiceStatus::Available),
            ]
        );

        let value = serde_json::to_value(&parsed).expect("serializes");
        assert_eq!(value["courier_checks"]["pathao"]["serviceStatus"], "error");
        assert_eq!(value["courier_checks"]["pathao"]["error"], "Pathao API timeout");
        assert_eq!(value["courier_checks"]["redx"]["serviceStatus"], "available");
        assert!(value["courier_checks"]["redx"].get("error").is_none());
        assert_eq!(value["services"][1]["status"], "unavailable");
        assert_eq!(value["services"][2]["name"], "RedX");
    }

    #[test]
    fn custom_config_changes_classification() {
        let mut config = ScoringConfig::default();
        config.classifier.suspicious_success_rate = 0.95;
        let parser = ResponseParser::with_config(config);

        let raw = json!({ "pathao": { "stats": { "success": 9, "cancel": 1, "total": 10 } } });
        let parsed = parser.parse(&raw).expect("parses");
        assert_eq!(
            parsed.courier(Courier::Pathao).map(|c| c.fraud_status()),
            Some(FraudStatus::Suspicious)
        );
    }
}
