mod config;
mod rules;

pub use config::{
    CancelPenaltyBand, ClassifierThresholds, ScoringConfig, DEFAULT_BASE_WEIGHT,
    DEFAULT_CANCEL_PENALTIES, DEFAULT_FLOOR_SUCCESS_RATE, DEFAULT_FRAUDULENT_CANCEL_RATE,
    DEFAULT_FRAUDULENT_SUCCESS_RATE, DEFAULT_FRAUD_REPORT_PENALTY,
    DEFAULT_FRAUD_WITHOUT_HISTORY_SCORE,
    DEFAULT_HIGH_RISK_THRESHOLD, DEFAULT_MEDIUM_RISK_THRESHOLD, DEFAULT_SIGNAL_FLOOR,
    DEFAULT_SUSPICIOUS_CANCEL_RATE, DEFAULT_SUSPICIOUS_SUCCESS_RATE, MAX_FRAUD_SCORE,
};

use super::domain::{Courier, CourierCheck, DeliveryTotals, RiskLevel, TotalsSource};
use serde::Serialize;
use std::collections::BTreeMap;

/// Stateless scorer combining courier statistics into one 0-100 fraud score.
#[derive(Debug, Clone, Default)]
pub struct FraudScorer {
    config: ScoringConfig,
}

impl FraudScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a lookup. An AI summary, when present, is authoritative for the
    /// totals; otherwise they are summed across the couriers present.
    pub fn score(
        &self,
        checks: &BTreeMap<Courier, CourierCheck>,
        ai_summary: Option<&DeliveryTotals>,
    ) -> RiskAssessment {
        let (totals, totals_source) = match ai_summary {
            Some(summary) => (*summary, TotalsSource::AiSummary),
            None => (rules::sum_courier_totals(checks), TotalsSource::CourierSum),
        };

        let fraud_score = rules::weighted_score(&totals, &self.config);
        let risk_level = rules::risk_level_for(fraud_score, &self.config);

        RiskAssessment {
            fraud_score,
            risk_level,
            totals,
            totals_source,
        }
    }
}

/// Score a lookup with the default weights.
pub fn score(
    checks: &BTreeMap<Courier, CourierCheck>,
    ai_summary: Option<&DeliveryTotals>,
) -> RiskAssessment {
    FraudScorer::default().score(checks, ai_summary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub fraud_score: u8,
    pub risk_level: RiskLevel,
    pub totals: DeliveryTotals,
    pub totals_source: TotalsSource,
}
