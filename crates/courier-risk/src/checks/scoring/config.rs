use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAUDULENT_SUCCESS_RATE: f64 = 0.5;
pub const DEFAULT_FRAUDULENT_CANCEL_RATE: f64 = 0.5;
pub const DEFAULT_SUSPICIOUS_SUCCESS_RATE: f64 = 0.8;
pub const DEFAULT_SUSPICIOUS_CANCEL_RATE: f64 = 0.3;

pub const DEFAULT_BASE_WEIGHT: f64 = 50.0;
pub const DEFAULT_FRAUD_REPORT_PENALTY: f64 = 40.0;
/// Cancel-rate penalty bands, highest threshold first.
pub const DEFAULT_CANCEL_PENALTIES: [CancelPenaltyBand; 3] = [
    CancelPenaltyBand {
        above: 0.6,
        penalty: 30.0,
    },
    CancelPenaltyBand {
        above: 0.4,
        penalty: 20.0,
    },
    CancelPenaltyBand {
        above: 0.2,
        penalty: 10.0,
    },
];
pub const DEFAULT_FRAUD_WITHOUT_HISTORY_SCORE: u8 = 85;
pub const DEFAULT_SIGNAL_FLOOR: u8 = 10;
pub const DEFAULT_FLOOR_SUCCESS_RATE: f64 = 0.8;
pub const DEFAULT_MEDIUM_RISK_THRESHOLD: u8 = 40;
pub const DEFAULT_HIGH_RISK_THRESHOLD: u8 = 70;

pub const MAX_FRAUD_SCORE: u8 = 100;

/// Rate bands used to classify a single courier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Success rate below this is fraudulent.
    pub fraudulent_success_rate: f64,
    /// Cancel rate above this is fraudulent.
    pub fraudulent_cancel_rate: f64,
    pub suspicious_success_rate: f64,
    pub suspicious_cancel_rate: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            fraudulent_success_rate: DEFAULT_FRAUDULENT_SUCCESS_RATE,
            fraudulent_cancel_rate: DEFAULT_FRAUDULENT_CANCEL_RATE,
            suspicious_success_rate: DEFAULT_SUSPICIOUS_SUCCESS_RATE,
            suspicious_cancel_rate: DEFAULT_SUSPICIOUS_CANCEL_RATE,
        }
    }
}

/// Penalty applied when the aggregate cancel rate exceeds `above`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CancelPenaltyBand {
    pub above: f64,
    pub penalty: f64,
}

/// Heuristic weights for the aggregate fraud score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub classifier: ClassifierThresholds,
    /// Points at a 0% success rate, scaled linearly.
    pub base_weight: f64,
    /// Only the highest band exceeded applies.
    pub cancel_penalties: Vec<CancelPenaltyBand>,
    pub fraud_report_penalty: f64,
    /// Fixed score for a fraud report with no delivery history.
    pub fraud_without_history_score: u8,
    /// Minimum score whenever any negative signal is present.
    pub signal_floor: u8,
    /// Success rates below this count as a negative signal for the floor.
    pub floor_success_rate: f64,
    pub medium_risk_threshold: u8,
    pub high_risk_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierThresholds::default(),
            base_weight: DEFAULT_BASE_WEIGHT,
            cancel_penalties: DEFAULT_CANCEL_PENALTIES.to_vec(),
            fraud_report_penalty: DEFAULT_FRAUD_REPORT_PENALTY,
            fraud_without_history_score: DEFAULT_FRAUD_WITHOUT_HISTORY_SCORE,
            signal_floor: DEFAULT_SIGNAL_FLOOR,
            floor_success_rate: DEFAULT_FLOOR_SUCCESS_RATE,
            medium_risk_threshold: DEFAULT_MEDIUM_RISK_THRESHOLD,
            high_risk_threshold: DEFAULT_HIGH_RISK_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_come_from_the_named_table() {
        let config = ScoringConfig::default();
        assert_eq!(config.cancel_penalties, DEFAULT_CANCEL_PENALTIES.to_vec());
        assert!(DEFAULT_CANCEL_PENALTIES
            .windows(2)
            .all(|pair| pair[0].above > pair[1].above && pair[0].penalty > pair[1].penalty));
    }
}
