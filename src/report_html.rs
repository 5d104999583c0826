// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Standalone HTML rendering of a senior report.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::models::SeniorReport;
use crate::schedule;
use crate::time_utils::format_display;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;width:100%;margin-bottom:2em}\
th,td{border:1px solid #ccc;padding:6px 8px;text-align:left}\
th{background:#f0f4f8}";

/// Render `report` as a complete HTML document generated at `now`.
pub fn render(report: &SeniorReport, now: DateTime<Utc>) -> String {
    let name = report.senior_name.as_deref().unwrap_or("Senior");
    let generated = report.generated_at.unwrap_or(now);

    let mut html = String::with_capacity(4096);
    // Writing to a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Report: {name}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>Report: {name}</h1>\n<p>Generated {generated}</p>\n",
        name = escape(name),
        generated = escape(&format_display(generated)),
    );

    if let Some(summary) = report.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(html, "<p>{}</p>", escape(summary));
    }

    render_prescriptions(&mut html, report);
    render_symptoms(&mut html, report);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_prescriptions(html: &mut String, report: &SeniorReport) {
    html.push_str("<h2>Prescriptions</h2>\n");
    if report.prescriptions.is_empty() {
        html.push_str("<p>No prescriptions.</p>\n");
        return;
    }

    html.push_str(
        "<table>\n<tr><th>Medication</th><th>Dosage</th><th>Frequency</th>\
         <th>Schedule</th><th>Period</th></tr>\n",
    );
    for p in &report.prescriptions {
        let times = p
            .dosage_times()
            .map(|t| schedule::format_times(&t).join(", "))
            .unwrap_or_default();
        let period = match p.end_date {
            Some(end) => format!(
                "{} to {}",
                p.start_date.format("%d/%m/%Y"),
                end.format("%d/%m/%Y")
            ),
            None => format!("from {}", p.start_date.format("%d/%m/%Y")),
        };
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>every {}h</td><td>{}</td><td>{}</td></tr>",
            escape(p.medication_label()),
            escape(&p.dosage),
            p.frequency,
            escape(&times),
            escape(&period),
        );
    }
    html.push_str("</table>\n");
}

fn render_symptoms(html: &mut String, report: &SeniorReport) {
    html.push_str("<h2>Symptoms</h2>\n");
    if report.symptoms.is_empty() {
        html.push_str("<p>No symptoms reported.</p>\n");
        return;
    }

    if let Some(avg) = report.average_pain() {
        let _ = writeln!(html, "<p>Average pain level: {:.1}</p>", avg);
    }

    html.push_str("<table>\n<tr><th>Date</th><th>Description</th><th>Pain level</th></tr>\n");
    let mut symptoms: Vec<_> = report.symptoms.iter().collect();
    symptoms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    for s in symptoms {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{} ({})</td></tr>",
            escape(&format_display(s.created_at)),
            escape(&s.description),
            s.pain_level,
            s.severity(),
        );
    }
    html.push_str("</table>\n");
}

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
