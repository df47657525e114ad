use super::domain::{
    Courier, CourierStats, DeliveryTotals, FraudStatus, ParsedPhoneData, RiskLevel, ServiceStatus,
    TotalsSource,
};
use serde::Serialize;
use std::io::Write;

/// Per-courier summary row ready for tables and exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourierRow {
    pub courier: Courier,
    pub courier_label: &'static str,
    pub service_status: ServiceStatus,
    pub service_status_label: &'static str,
    pub error: Option<String>,
    pub success: u64,
    pub cancel: u64,
    pub total: u64,
    pub success_rate: u32,
    pub fraud_status: FraudStatus,
    pub fraud_status_label: &'static str,
    pub fraud_reported: bool,
    pub reporter_name: Option<String>,
    pub reported_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskReportView {
    pub fraud_score: u8,
    pub risk_level: RiskLevel,
    pub risk_label: &'static str,
    pub advice: &'static str,
    pub totals: DeliveryTotals,
    pub totals_source: TotalsSource,
    pub overall_success_rate: u32,
    pub couriers: Vec<CourierRow>,
    pub analysis: String,
    pub cached: bool,
    pub timestamp: String,
}

/// Whole-percent success rate; zero when the courier has no parcels.
pub fn success_rate_percent(stats: &CourierStats) -> u32 {
    percent(stats.success, stats.total)
}

fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

impl ParsedPhoneData {
    /// Rows in display order, couriers without data omitted.
    pub fn courier_rows(&self) -> Vec<CourierRow> {
        Courier::ordered()
            .into_iter()
            .filter_map(|courier| {
                self.courier(courier).map(|check| {
                    let stats = *check.stats();
                    let detail = check.fraud().and_then(|report| report.detail());
                    CourierRow {
                        courier,
                        courier_label: courier.label(),
                        service_status: check.service_status(),
                        service_status_label: check.service_status().label(),
                        error: check.error().map(str::to_string),
                        success: stats.success,
                        cancel: stats.cancel,
                        total: stats.total,
                        success_rate: success_rate_percent(&stats),
                        fraud_status: check.fraud_status(),
                        fraud_status_label: check.fraud_status().label(),
                        fraud_reported: check.has_fraud_report(),
                        reporter_name: detail.and_then(|d| d.name.clone()),
                        reported_at: detail
                            .and_then(|d| d.reported_at())
                            .map(|at| at.to_rfc3339()),
                    }
                })
            })
            .collect()
    }

    pub fn report_view(&self) -> RiskReportView {
        let totals = self.totals();
        RiskReportView {
            fraud_score: self.fraud_score,
            risk_level: self.risk_level,
            risk_label: self.risk_level.label(),
            advice: self.risk_level.advice(),
            totals,
            totals_source: self.totals_source,
            overall_success_rate: percent(totals.total_success, totals.total_parcels),
            couriers: self.courier_rows(),
            analysis: self.analysis.clone(),
            cached: self.cached,
            timestamp: self.timestamp.clone(),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    courier: &'a str,
    service_status: &'a str,
    success: u64,
    cancel: u64,
    total: u64,
    success_rate: u32,
    fraud_status: &'a str,
    fraud_reported: bool,
    reporter_name: &'a str,
    reported_at: &'a str,
    error: &'a str,
}

/// Write courier rows as CSV with a header line.
pub fn write_csv<W: Write>(rows: &[CourierRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(CsvRow {
            courier: row.courier.key(),
            service_status: row.service_status_label,
            success: row.success,
            cancel: row.cancel,
            total: row.total,
            success_rate: row.success_rate,
            fraud_status: row.fraud_status_label,
            fraud_reported: row.fraud_reported,
            reporter_name: row.reporter_name.as_deref().unwrap_or(""),
            reported_at: row.reported_at.as_deref().unwrap_or(""),
            error: row.error.as_deref().unwrap_or(""),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
