use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::classifier::classify_with;
use super::scoring::ClassifierThresholds;

/// Courier services queried for delivery history. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Courier {
    Pathao,
    Steadfast,
    Redx,
}

impl Courier {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pathao, Self::Steadfast, Self::Redx]
    }

    /// Key used by the lookup service payloads.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Pathao => "pathao",
            Self::Steadfast => "steadfast",
            Self::Redx => "redx",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pathao => "Pathao",
            Self::Steadfast => "Steadfast",
            Self::Redx => "RedX",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pathao" => Some(Self::Pathao),
            "steadfast" => Some(Self::Steadfast),
            "redx" => Some(Self::Redx),
            _ => None,
        }
    }
}

impl fmt::Display for Courier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delivery counters reported by one courier. `total` is backend-provided and
/// is not recomputed from `success + cancel`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierStats {
    pub success: u64,
    pub cancel: u64,
    pub total: u64,
}

impl CourierStats {
    pub const fn new(success: u64, cancel: u64, total: u64) -> Self {
        Self {
            success,
            cancel,
            total,
        }
    }
}

/// Third-party fraud report filed against the number for one courier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudDetail {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub details: Option<String>,
    pub time: Option<String>,
}

impl FraudDetail {
    pub fn reported_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.time.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// A fraud report is either a bare flag or a detailed record.
///
/// Serializes as `true` or as the detail object so the output keeps the
/// `null | true | FraudDetail` shape consumers expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudReport {
    Flagged,
    Detailed(FraudDetail),
}

impl FraudReport {
    pub fn detail(&self) -> Option<&FraudDetail> {
        match self {
            FraudReport::Flagged => None,
            FraudReport::Detailed(detail) => Some(detail),
        }
    }
}

impl Serialize for FraudReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FraudReport::Flagged => serializer.serialize_bool(true),
            FraudReport::Detailed(detail) => detail.serialize(serializer),
        }
    }
}

/// Identity data a courier holds for the number; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierUser {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Per-courier fraud verdict, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudStatus {
    Clean,
    Suspicious,
    Fraudulent,
}

impl FraudStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clean => "Clean",
            Self::Suspicious => "Suspicious",
            Self::Fraudulent => "Fraudulent",
        }
    }
}

/// Whether a courier answered the lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Available,
    /// The courier returned nothing for the number.
    Unavailable,
    /// The backend reported a failure while querying the courier.
    Error,
}

impl ServiceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "No data",
            Self::Error => "Error",
        }
    }
}

/// Canonical record for one courier.
///
/// `fraud_status` is derived when the record is built and cannot be supplied by callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierCheck {
    stats: CourierStats,
    fraud: Option<FraudReport>,
    user: CourierUser,
    #[serde(rename = "fraudStatus")]
    fraud_status: FraudStatus,
    #[serde(rename = "serviceStatus")]
    service_status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl CourierCheck {
    pub fn new(stats: CourierStats, fraud: Option<FraudReport>, user: CourierUser) -> Self {
        Self::with_thresholds(stats, fraud, user, &ClassifierThresholds::default())
    }

    pub fn with_thresholds(
        stats: CourierStats,
        fraud: Option<FraudReport>,
        user: CourierUser,
        thresholds: &ClassifierThresholds,
    ) -> Self {
        let fraud_status = classify_with(&stats, fraud.is_some(), thresholds);
        Self {
            stats,
            fraud,
            user,
            fraud_status,
            service_status: ServiceStatus::Available,
            error: None,
            details: None,
        }
    }

    /// Mark the courier as failed. Counts stay as reported, usually zero.
    pub fn with_service_error(mut self, message: impl Into<String>) -> Self {
        self.service_status = ServiceStatus::Error;
        self.error = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    pub fn stats(&self) -> &CourierStats {
        &self.stats
    }

    pub fn fraud(&self) -> Option<&FraudReport> {
        self.fraud.as_ref()
    }

    pub fn has_fraud_report(&self) -> bool {
        self.fraud.is_some()
    }

    pub fn user(&self) -> &CourierUser {
        &self.user
    }

    pub fn fraud_status(&self) -> FraudStatus {
        self.fraud_status
    }

    pub fn service_status(&self) -> ServiceStatus {
        self.service_status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

/// Aggregate delivery totals. Shares its wire shape with the AI summary block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTotals {
    pub total_success: u64,
    pub total_cancel: u64,
    pub total_parcels: u64,
    pub has_fraud_report: bool,
}

/// AI commentary attached to a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AiAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DeliveryTotals>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    pub const fn advice(self) -> &'static str {
        match self {
            Self::Low => "Delivery history looks healthy.",
            Self::Medium => "Proceed with caution and consider partial advance payment.",
            Self::High => "High fraud risk: collect full payment before dispatch.",
        }
    }
}

/// Where the aggregate totals used for scoring came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsSource {
    AiSummary,
    CourierSum,
}

/// Availability of one courier within a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourierService {
    pub courier: Courier,
    pub name: &'static str,
    pub status: ServiceStatus,
}

/// Stable, fully computed lookup result handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPhoneData {
    pub courier_checks: BTreeMap<Courier, CourierCheck>,
    #[serde(rename = "aiAnalysis")]
    pub ai_analysis: AiAnalysis,
    #[serde(rename = "fraudScore")]
    pub fraud_score: u8,
    #[serde(rename = "riskLevel")]
    pub risk_level: RiskLevel,
    pub analysis: String,
    pub cached: bool,
    pub timestamp: String,
    #[serde(rename = "totalsSource")]
    pub totals_source: TotalsSource,
    /// Every known courier in display order, including those without data.
    pub services: Vec<CourierService>,
}

impl ParsedPhoneData {
    pub fn courier(&self, courier: Courier) -> Option<&CourierCheck> {
        self.courier_checks.get(&courier)
    }

    pub fn service_status(&self, courier: Courier) -> ServiceStatus {
        self.courier(courier)
            .map_or(ServiceStatus::Unavailable, CourierCheck::service_status)
    }

    /// Totals the score was computed from.
    pub fn totals(&self) -> DeliveryTotals {
        self.ai_analysis.summary.unwrap_or_default()
    }
}

/// Language the upstream AI commentary is requested in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Bn,
    #[default]
    En,
    Hi,
    Ur,
}

impl Language {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Bn => "bn",
            Self::En => "en",
            Self::Hi => "hi",
            Self::Ur => "ur",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bn => "বাংলা",
            Self::En => "English",
            Self::Hi => "हिंदी",
            Self::Ur => "اردو",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code '{0}' (expected bn, en, hi or ur)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bn" => Ok(Self::Bn),
            "en" => Ok(Self::En),
            "hi" => Ok(Self::Hi),
            "ur" => Ok(Self::Ur),
            _ => Err(UnknownLanguage(value.to_string())),
        }
    }
}
