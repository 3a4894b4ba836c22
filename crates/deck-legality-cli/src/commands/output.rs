//! Shared output formatting for legality results.

use anyhow::Result;
use deck_legality_core::{Config, LegalityVerdict, ViolationCode};
use serde::Serialize;
use std::fmt::Write as _;

use crate::OutputFormat;

/// One format's result as shown to the user.
#[derive(Debug, Serialize)]
pub struct FormatReport<'a> {
    /// Format name.
    pub format: &'a str,
    /// Display title.
    pub title: &'a str,
    /// Whether the deck is legal.
    pub is_legal: bool,
    /// Violation codes, in evaluation order.
    pub errors: &'a [ViolationCode],
    /// Rendered messages, same order as `errors`.
    pub messages: Vec<String>,
}

/// Pairs verdicts with their formats and renders messages.
#[must_use]
pub fn reports<'a>(verdicts: &'a [LegalityVerdict], config: &'a Config) -> Vec<FormatReport<'a>> {
    config
        .formats
        .iter()
        .zip(verdicts)
        .map(|(rules, verdict)| FormatReport {
            format: rules.name().as_str(),
            title: rules.title(),
            is_legal: verdict.is_legal(),
            errors: &verdict.violations,
            messages: config.messages.render_all(&verdict.violations, rules),
        })
        .collect()
}

/// Print legality results in the specified format.
pub fn print(verdicts: &[LegalityVerdict], config: &Config, format: OutputFormat) -> Result<()> {
    let reports = reports(verdicts, config);
    let rendered = match format {
        OutputFormat::Text => render_text(&reports),
        OutputFormat::Json => render_json(&reports)?,
        OutputFormat::Compact => render_compact(&reports),
    };
    print!("{rendered}");
    Ok(())
}

fn render_text(reports: &[FormatReport<'_>]) -> String {
    let mut out = String::new();
    for report in reports {
        if report.is_legal {
            let _ = writeln!(out, "\x1b[32mlegal\x1b[0m    {}", report.title);
        } else {
            let _ = writeln!(out, "\x1b[31millegal\x1b[0m  {}", report.title);
            for (code, message) in report.errors.iter().zip(&report.messages) {
                let _ = writeln!(out, "  - {message} [{code}]");
            }
        }
    }

    let legal = reports.iter().filter(|r| r.is_legal).count();
    let color = if legal == reports.len() {
        "\x1b[32m"
    } else {
        "\x1b[33m"
    };
    let _ = writeln!(
        out,
        "\n{color}Legal in {legal} of {} format(s)\x1b[0m",
        reports.len()
    );
    out
}

fn render_json(reports: &[FormatReport<'_>]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(reports)?;
    json.push('\n');
    Ok(json)
}

fn render_compact(reports: &[FormatReport<'_>]) -> String {
    let mut out = String::new();
    for report in reports {
        if report.is_legal {
            let _ = writeln!(out, "{}: legal", report.format);
        } else {
            let codes: Vec<&str> = report.errors.iter().map(|c| c.as_str()).collect();
            let _ = writeln!(out, "{}: {}", report.format, codes.join(","));
        }
    }
    out
}
