use super::super::domain::{Courier, CourierCheck, DeliveryTotals, RiskLevel};
use super::config::{ScoringConfig, MAX_FRAUD_SCORE};
use std::collections::BTreeMap;

pub(crate) fn sum_courier_totals(checks: &BTreeMap<Courier, CourierCheck>) -> DeliveryTotals {
    checks
        .values()
        .fold(DeliveryTotals::default(), |mut totals, check| {
            let stats = check.stats();
            totals.total_success = totals.total_success.saturating_add(stats.success);
            totals.total_cancel = totals.total_cancel.saturating_add(stats.cancel);
            totals.total_parcels = totals.total_parcels.saturating_add(stats.total);
            totals.has_fraud_report |= check.has_fraud_report();
            totals
        })
}

pub(crate) fn weighted_score(totals: &DeliveryTotals, config: &ScoringConfig) -> u8 {
    let max = f64::from(MAX_FRAUD_SCORE);
    let mut low_success = false;

    let score = if totals.total_parcels > 0 {
        let parcels = totals.total_parcels as f64;
        let success_rate = totals.total_success as f64 / parcels;
        let cancel_rate = totals.total_cancel as f64 / parcels;
        low_success = success_rate < config.floor_success_rate;

        let base = ((1.0 - success_rate) * config.base_weight).max(0.0);
        let mut raw = base + cancel_penalty(cancel_rate, config);
        if totals.has_fraud_report {
            raw += config.fraud_report_penalty;
        }

        raw.round().clamp(0.0, max) as u8
    } else if totals.has_fraud_report {
        config.fraud_without_history_score.min(MAX_FRAUD_SCORE)
    } else {
        0
    };

    if low_success || totals.has_fraud_report {
        score.max(config.signal_floor.min(MAX_FRAUD_SCORE))
    } else {
        score
    }
}

fn cancel_penalty(cancel_rate: f64, config: &ScoringConfig) -> f64 {
    config
        .cancel_penalties
        .iter()
        .filter(|band| cancel_rate > band.above)
        .max_by(|a, b| a.above.total_cmp(&b.above))
        .map(|band| band.penalty)
        .unwrap_or(0.0)
}

pub(crate) fn risk_level_for(score: u8, config: &ScoringConfig) -> RiskLevel {
    if score >= config.high_risk_threshold {
        RiskLevel::High
    } else if score >= config.medium_risk_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
