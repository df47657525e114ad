//! End-to-end parsing scenarios driven through the public parser API with
//! payloads shaped like real lookup responses.

use chrono::{TimeZone, Utc};
use courier_risk::checks::{
    classify, parse_phone_check_response, phone, Courier, CourierStats, FraudReport, FraudStatus,
    ParseError, ResponseParser, RiskLevel, TotalsSource,
};
use serde_json::{json, Value};

fn fraud_report_payload() -> Value {
    serde_json::from_str(include_str!("fixtures/steadfast_fraud_report.json"))
        .expect("fixture is valid json")
}

#[test]
fn fraud_report_lookup_scores_maximum_risk() {
    let parsed = parse_phone_check_response(&fraud_report_payload()).expect("parses");

    assert_eq!(parsed.fraud_score, 100);
    assert_eq!(parsed.risk_level, RiskLevel::High);
    assert_eq!(parsed.totals_source, TotalsSource::AiSummary);
    assert!(!parsed.cached);
    assert!(parsed.analysis.starts_with("Only one failed delivery"));
    assert_eq!(parsed.ai_analysis.language.as_deref(), Some("en"));

    let steadfast = parsed.courier(Courier::Steadfast).expect("steadfast present");
    assert_eq!(steadfast.fraud_status(), FraudStatus::Fraudulent);
    let detail = steadfast
        .fraud()
        .and_then(FraudReport::detail)
        .expect("fraud detail kept");
    assert_eq!(detail.name.as_deref(), Some("Imran"));
    assert_eq!(
        detail.reported_at(),
        Utc.with_ymd_and_hms(2025, 8, 25, 5, 6, 31).single()
    );

    let redx = parsed.courier(Courier::Redx).expect("redx present");
    assert_eq!(redx.stats(), &CourierStats::new(0, 0, 0));
    assert_eq!(redx.fraud_status(), FraudStatus::Clean);
}

#[test]
fn zero_activity_everywhere_is_low_risk() {
    let raw = json!({
        "pathao": { "stats": { "success": 0, "cancel": 0, "total": 0 } },
        "steadfast": { "stats": { "success": 0, "cancel": 0, "total": 0 } },
        "redx": { "stats": { "success": 0, "cancel": 0, "total": 0 } }
    });
    let parsed = parse_phone_check_response(&raw).expect("parses");

    assert_eq!(parsed.courier_checks.len(), 3);
    assert_eq!(parsed.fraud_score, 0);
    assert_eq!(parsed.risk_level, RiskLevel::Low);
}

#[test]
fn fraud_report_without_deliveries_is_high_risk() {
    let raw = json!({
        "steadfast": { "fraud": true },
        "ai_analysis": {
            "summary": { "totalSuccess": 0, "totalCancel": 0, "totalParcels": 0, "hasFraudReport": true }
        }
    });
    let parsed = parse_phone_check_response(&raw).expect("parses");

    assert_eq!(parsed.fraud_score, 85);
    assert_eq!(parsed.risk_level, RiskLevel::High);
}

#[test]
fn single_courier_payload_keeps_absent_couriers_absent() {
    let flat = json!({ "pathao": { "stats": { "success": 3, "cancel": 0, "total": 3 } } });
    let wrapped = json!({ "courier_checks": flat.clone() });

    for raw in [flat, wrapped] {
        let parsed = parse_phone_check_response(&raw).expect("parses");
        assert_eq!(
            parsed.courier_checks.keys().copied().collect::<Vec<_>>(),
            vec![Courier::Pathao]
        );

        let value = serde_json::to_value(&parsed).expect("serializes");
        let map = value["courier_checks"].as_object().expect("map");
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("pathao"));
        assert!(!map.contains_key("steadfast"));
        assert!(!map.contains_key("redx"));
    }
}

#[test]
fn non_object_payloads_are_rejected() {
    let err = parse_phone_check_response(&json!(["pathao"])).expect_err("array rejected");
    assert_eq!(err, ParseError::InvalidResponseFormat { found: "an array" });
}

#[test]
fn output_shape_matches_consumers() {
    let parser = ResponseParser::default();
    let now = Utc
        .with_ymd_and_hms(2025, 8, 25, 6, 0, 0)
        .single()
        .expect("valid instant");
    let parsed = parser
        .parse_at(&fraud_report_payload(), now)
        .expect("parses");
    let value = serde_json::to_value(&parsed).expect("serializes");

    assert_eq!(value["fraudScore"], 100);
    assert_eq!(value["riskLevel"], "high");
    assert_eq!(value["cached"], false);
    assert_eq!(value["timestamp"], "2025-08-25T06:00:00.000Z");
    assert_eq!(value["aiAnalysis"]["summary"]["totalCancel"], 1);
    assert_eq!(value["aiAnalysis"]["summary"]["hasFraudReport"], true);
    assert_eq!(value["courier_checks"]["steadfast"]["fraudStatus"], "fraudulent");
    assert_eq!(value["courier_checks"]["pathao"]["fraud"], Value::Null);
    assert_eq!(value["courier_checks"]["pathao"]["user"]["name"], Value::Null);
}

#[test]
fn flagged_fraud_serializes_as_true() {
    let parsed = parse_phone_check_response(&json!({ "redx": { "fraud": true } })).expect("parses");
    let value = serde_json::to_value(&parsed).expect("serializes");
    assert_eq!(value["courier_checks"]["redx"]["fraud"], Value::Bool(true));
}

#[test]
fn fraud_report_overrides_any_statistics() {
    for stats in [
        CourierStats::new(0, 0, 0),
        CourierStats::new(10, 0, 10),
        CourierStats::new(4, 6, 10),
        CourierStats::new(u64::MAX, 0, u64::MAX),
    ] {
        assert_eq!(classify(&stats, true), FraudStatus::Fraudulent);
    }
    assert_eq!(classify(&CourierStats::new(10, 0, 10), false), FraudStatus::Clean);
    assert_eq!(classify(&CourierStats::new(4, 6, 10), false), FraudStatus::Fraudulent);
    assert_eq!(classify(&CourierStats::new(0, 0, 0), false), FraudStatus::Clean);
}

#[test]
fn phone_numbers_from_lookup_scenarios() {
    assert!(phone::validate("01881143277"));
    assert!(!phone::validate("+8801881143277"));
    assert!(!phone::validate("0188114327"));
}
