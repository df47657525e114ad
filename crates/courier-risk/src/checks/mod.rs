//! Pure lookup core: phone validation, payload normalization, per-courier
//! classification and aggregate fraud scoring. Nothing here does I/O.

pub mod classifier;
pub mod domain;
pub mod normalizer;
pub mod parser;
mod payload;
pub mod phone;
pub mod report;
pub mod scoring;

pub use classifier::{classify, classify_with};
pub use domain::{
    AiAnalysis, Courier, CourierCheck, CourierService, CourierStats, CourierUser, DeliveryTotals,
    FraudDetail, FraudReport, FraudStatus, Language, ParsedPhoneData, RiskLevel, ServiceStatus,
    TotalsSource, UnknownLanguage,
};
pub use normalizer::normalize_courier_record;
pub use parser::{parse_phone_check_response, ParseError, ResponseParser};
pub use phone::{PhoneNumber, ValidationError};
pub use report::{success_rate_percent, write_csv, CourierRow, RiskReportView};
pub use scoring::{
    CancelPenaltyBand, ClassifierThresholds, FraudScorer, RiskAssessment, ScoringConfig,
};
