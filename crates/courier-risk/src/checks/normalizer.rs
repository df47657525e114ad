use super::domain::CourierCheck;
use super::payload::RawCourierRecord;
use super::scoring::ClassifierThresholds;
use serde_json::Value;

/// Build a canonical courier record from one raw courier entry using the
/// default classifier thresholds.
pub fn normalize_courier_record(raw: &Value) -> CourierCheck {
    normalize_with(raw, &ClassifierThresholds::default())
}

pub(crate) fn normalize_with(raw: &Value, thresholds: &ClassifierThresholds) -> CourierCheck {
    let record = RawCourierRecord::from_value(raw);
    let check = CourierCheck::with_thresholds(
        record.stats.map(Into::into).unwrap_or_default(),
        record.fraud,
        record.user.map(Into::into).unwrap_or_default(),
        thresholds,
    )
    .with_details(record.details);

    match record.error {
        Some(message) => check.with_service_error(message),
        None => check,
    }
}
