use clap::ValueEnum;
use courier_risk::checks::{phone, write_csv, ParsedPhoneData, ServiceStatus};
use courier_risk::error::AppError;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub(crate) fn render(
    parsed: &ParsedPhoneData,
    phone: &str,
    format: OutputFormat,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Text => Ok(render_text(parsed, phone)),
        OutputFormat::Json => {
            let mut body = serde_json::to_string_pretty(parsed)?;
            body.push('\n');
            Ok(body)
        }
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(&parsed.courier_rows(), &mut buffer)?;
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        }
    }
}

fn render_text(parsed: &ParsedPhoneData, number: &str) -> String {
    let view = parsed.report_view();
    let mut out = String::new();

    let _ = writeln!(out, "Phone: {}", phone::format(number));
    let _ = writeln!(
        out,
        "Fraud score: {}/100 ({})",
        view.fraud_score, view.risk_label
    );
    let _ = writeln!(out, "{}", view.advice);
    let _ = writeln!(
        out,
        "Deliveries: {} total | {} delivered | {} cancelled | {}% success",
        view.totals.total_parcels,
        view.totals.total_success,
        view.totals.total_cancel,
        view.overall_success_rate
    );
    if view.totals.has_fraud_report {
        let _ = writeln!(out, "Fraud report on file");
    }

    if view.couriers.is_empty() {
        let _ = writeln!(out, "\nNo courier returned data for this number.");
    } else {
        let _ = writeln!(out, "\nCouriers:");
        for row in &view.couriers {
            if row.service_status == ServiceStatus::Error {
                let reason = row.error.as_deref().unwrap_or("unknown error");
                let _ = writeln!(
                    out,
                    "- {}: {} ({reason})",
                    row.courier_label, row.service_status_label
                );
                continue;
            }
            let _ = writeln!(
                out,
                "- {}: {}/{} delivered, {} cancelled ({}% success) | {}",
                row.courier_label,
                row.success,
                row.total,
                row.cancel,
                row.success_rate,
                row.fraud_status_label
            );
            if let Some(name) = &row.reporter_name {
                let reported = row.reported_at.as_deref().unwrap_or("unknown time");
                let _ = writeln!(out, "    reported by {name} at {reported}");
            }
        }
    }

    let missing: Vec<_> = parsed
        .services
        .iter()
        .filter(|service| service.status == ServiceStatus::Unavailable)
        .map(|service| service.name)
        .collect();
    if !missing.is_empty() && !view.couriers.is_empty() {
        let _ = writeln!(out, "{}: {}", ServiceStatus::Unavailable.label(), missing.join(", "));
    }

    if !view.analysis.is_empty() {
        let _ = writeln!(out, "\nAnalysis: {}", view.analysis);
    }
    let _ = writeln!(
        out,
        "\nChecked at {}{}",
        view.timestamp,
        if view.cached { " (cached)" } else { "" }
    );
    out
}
