//! Run, section and validation summaries, rendered as styled text or JSON.

use crate::OutputFormat;
use anyhow::Result;
use console::style;
use std::fmt::Write;
use taxform_core::{FieldStatus, RunReport, SectionResult, Verification};

pub fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    print!("{}", render_report(report, format)?);
    Ok(())
}

pub fn print_section_result(result: &SectionResult, format: OutputFormat) -> Result<()> {
    print!("{}", render_section_result(result, format)?);
    Ok(())
}

pub fn print_verifications(verifications: &[Verification], format: OutputFormat) -> Result<()> {
    print!("{}", render_verifications(verifications, format)?);
    Ok(())
}

pub fn render_report(report: &RunReport, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)? + "\n");
    }

    let mut out = String::new();
    writeln!(out, "\n{}", style("Run Summary").bold().cyan())?;
    writeln!(out, "{}", style("===========").cyan())?;
    for result in &report.results {
        write_result_lines(&mut out, result)?;
    }

    let completed = report.results.iter().filter(|r| r.success).count();
    let elapsed = report.finished_at - report.started_at;
    writeln!(
        out,
        "\n{} of {} sections completed in {}s",
        completed,
        report.results.len(),
        elapsed.num_seconds()
    )?;
    if report.all_succeeded() {
        writeln!(
            out,
            "{}",
            style("Review the return in the browser before submitting it.").green()
        )?;
    } else {
        writeln!(
            out,
            "{}",
            style("Finish the sections marked ✗ in the browser before submitting.").yellow()
        )?;
    }
    Ok(out)
}

pub fn render_section_result(result: &SectionResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(result)? + "\n");
    }

    let mut out = String::from("\n");
    write_result_lines(&mut out, result)?;
    Ok(out)
}

fn write_result_lines(out: &mut String, result: &SectionResult) -> std::fmt::Result {
    if result.success {
        return writeln!(out, "  {} {}", style("✓").green().bold(), result.section.title());
    }

    writeln!(
        out,
        "  {} {}: {}",
        style("✗").red().bold(),
        result.section.title(),
        result.error.as_deref().unwrap_or("failed")
    )?;
    if !result.failed_fields.is_empty() {
        writeln!(
            out,
            "      {} {}",
            style("fields:").dim(),
            result.failed_fields.join(", ")
        )?;
    }
    if let Some(action) = &result.manual_action {
        writeln!(out, "      {} {}", style("→").yellow(), action)?;
    }
    Ok(())
}

pub fn render_verifications(verifications: &[Verification], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(verifications)? + "\n");
    }

    let mut out = String::new();
    writeln!(out, "\n{}", style("Form Validation").bold().cyan())?;
    writeln!(out, "{}", style("===============").cyan())?;
    for verification in verifications {
        let marker = if verification.is_valid() {
            style("✓").green().bold()
        } else {
            style("✗").red().bold()
        };
        writeln!(out, "\n{} {}", marker, style(verification.section.title()).bold())?;

        if let Some(error) = &verification.error {
            writeln!(out, "  {} {}", style("could not read:").red(), error)?;
            continue;
        }
        for check in &verification.checks {
            let status = match check.status {
                FieldStatus::Match => style("ok").green(),
                FieldStatus::Mismatch => style("mismatch").red(),
                FieldStatus::Empty => style("empty").yellow(),
            };
            writeln!(
                out,
                "  {:<6} {:<40} {:<10} expected {}, found {}",
                check.id,
                check.label,
                status,
                check.expected,
                check.actual.as_deref().unwrap_or("-")
            )?;
        }
    }
    Ok(out)
}
