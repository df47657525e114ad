use super::domain::{CourierStats, FraudStatus};
use super::scoring::ClassifierThresholds;

/// Classify one courier's history with the default thresholds.
pub fn classify(stats: &CourierStats, fraud_present: bool) -> FraudStatus {
    classify_with(stats, fraud_present, &ClassifierThresholds::default())
}

/// An explicit fraud report outranks any statistical pattern. With no
/// deliveries on record the number is treated as clean.
pub fn classify_with(
    stats: &CourierStats,
    fraud_present: bool,
    thresholds: &ClassifierThresholds,
) -> FraudStatus {
    if fraud_present {
        return FraudStatus::Fraudulent;
    }

    if stats.total == 0 {
        return FraudStatus::Clean;
    }

    let total = stats.total as f64;
    let success_rate = stats.success as f64 / total;
    let cancel_rate = stats.cancel as f64 / total;

    if success_rate < thresholds.fraudulent_success_rate
        || cancel_rate > thresholds.fraudulent_cancel_rate
    {
        FraudStatus::Fraudulent
    } else if success_rate < thresholds.suspicious_success_rate
        || cancel_rate > thresholds.suspicious_cancel_rate
    {
        FraudStatus::Suspicious
    } else {
        FraudStatus::Clean
    }
}
