//! Section automators: one per part of the return.
//!
//! Each automator runs a fixed script against the page it was given:
//! container visible, fill every configured field, click the section's
//! advance/save control, wait for the site to confirm.
//!
//! Field failures do not stop the script early. They are logged, the
//! remaining fields are still filled, and the save click is skipped when a
//! required field is among them. The section then reports failure and asks
//! for the field to be completed by hand.

mod dialogs;
mod main_return;
mod schedule_a;
mod schedule_b;

pub use main_return::MainReturn;
pub use schedule_a::ScheduleA;
pub use schedule_b::ScheduleB;

use crate::driver::PageDriver;
use crate::form::{FieldKind, FormFieldSpec, SectionFields};
use crate::interact::{ElementHelper, Outcome};
use crate::report::{FieldCheck, FieldStatus, SectionResult, Verification};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    MainReturn,
    ScheduleA,
    ScheduleB,
}

impl SectionName {
    /// Execution order of a full run
    pub const ALL: [SectionName; 3] = [
        SectionName::MainReturn,
        SectionName::ScheduleA,
        SectionName::ScheduleB,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::MainReturn => "main_return",
            SectionName::ScheduleA => "schedule_a",
            SectionName::ScheduleB => "schedule_b",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionName::MainReturn => "Main Return",
            SectionName::ScheduleA => "Schedule A",
            SectionName::ScheduleB => "Schedule B",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "main_return" | "main" => Ok(SectionName::MainReturn),
            "schedule_a" | "schedule01" | "schedule1" => Ok(SectionName::ScheduleA),
            "schedule_b" | "schedule02" | "schedule2" => Ok(SectionName::ScheduleB),
            other => Err(Error::Config(format!(
                "unknown section '{}' (expected main_return, schedule_a or schedule_b)",
                other
            ))),
        }
    }
}

/// One automatable part of the return
#[async_trait]
pub trait Section: Send + Sync {
    fn name(&self) -> SectionName;

    /// Run the section's script once. `Err` only for session failures.
    async fn setup(&self) -> Result<SectionResult>;

    /// Read every configured field back from the page
    async fn verify(&self) -> Result<Verification>;

    /// Clear the section's fields on the page
    async fn reset(&self) -> Result<()> {
        Ok(())
    }
}

/// Identifiers of the fields that could not be filled
#[derive(Debug, Default)]
pub(crate) struct FillSummary {
    pub required_failed: Vec<String>,
    pub optional_failed: Vec<String>,
}

impl FillSummary {
    pub fn can_save(&self) -> bool {
        self.required_failed.is_empty()
    }

    pub fn all_failed(&self) -> Vec<String> {
        self.required_failed
            .iter()
            .chain(self.optional_failed.iter())
            .cloned()
            .collect()
    }
}

/// Fill every field in order, carrying on past failures
pub(crate) async fn fill_fields(
    helper: &ElementHelper<'_>,
    section: SectionName,
    fields: &SectionFields,
    timeout: Duration,
) -> Result<FillSummary> {
    tracing::info!("[{}] filling {} field(s)", section, fields.len());

    let mut summary = FillSummary::default();
    for field in fields.iter() {
        let outcome = helper.fill_field(field, timeout).await?;
        if outcome.is_done() {
            continue;
        }

        tracing::error!(
            "[{}] field {} ({}) {}; please fill it manually",
            section,
            field.id,
            field.label,
            outcome
        );
        if field.required {
            summary.required_failed.push(field.id.clone());
        } else {
            summary.optional_failed.push(field.id.clone());
        }
    }
    Ok(summary)
}

/// Result for a section whose required fields did not all take
pub(crate) fn incomplete_fields(section: SectionName, summary: &FillSummary) -> SectionResult {
    SectionResult::failed(
        section,
        format!(
            "required field(s) not filled: {}",
            summary.required_failed.join(", ")
        ),
    )
    .with_failed_fields(summary.all_failed())
    .with_manual_action(format!(
        "Fill field(s) {} in the browser and save {} by hand",
        summary.required_failed.join(", "),
        section.title()
    ))
}

/// Fail fast when the section's root element never renders
pub(crate) async fn require_container(
    helper: &ElementHelper<'_>,
    section: SectionName,
    container: &str,
    timeout: Duration,
) -> Result<Option<SectionResult>> {
    if helper.wait_visible(container, timeout).await? {
        tracing::info!("[{}] container {} is visible", section, container);
        return Ok(None);
    }

    tracing::error!("[{}] container {} not visible after {:?}", section, container, timeout);
    Ok(Some(
        SectionResult::failed(section, format!("container {} not visible", container))
            .with_manual_action(format!(
                "Open {} in the browser and complete it manually",
                section.title()
            )),
    ))
}

/// Read the configured fields back and compare
pub(crate) async fn verify_fields(
    page: &dyn PageDriver,
    section: SectionName,
    fields: &SectionFields,
) -> Result<Verification> {
    let mut checks = Vec::with_capacity(fields.len());
    for field in fields.iter() {
        checks.push(check_field(page, field).await?);
    }

    let verification = Verification {
        section,
        checks,
        error: None,
    };
    if verification.is_valid() {
        tracing::info!("[{}] form data validation passed", section);
    } else {
        for check in verification.checks.iter().filter(|c| c.status != FieldStatus::Match) {
            tracing::warn!(
                "[{}] field {}: expected {}, got {:?}",
                section,
                check.id,
                check.expected,
                check.actual
            );
        }
    }
    Ok(verification)
}

async fn check_field(page: &dyn PageDriver, field: &FormFieldSpec) -> Result<FieldCheck> {
    let selector = field.selector();
    let expected = field.value.to_string();

    let actual = match field.kind {
        FieldKind::Choice => {
            let checked = page.is_checked(&selector).await?;
            Some(if checked { "checked" } else { "unchecked" }.to_string())
        }
        _ => page.read_value(&selector).await?,
    };

    let status = match actual.as_deref().map(str::trim) {
        None | Some("") => FieldStatus::Empty,
        Some(live) => {
            if values_match(field.kind, &expected, live) {
                FieldStatus::Match
            } else {
                FieldStatus::Mismatch
            }
        }
    };

    Ok(FieldCheck {
        id: field.id.clone(),
        label: field.label.clone(),
        expected,
        actual,
        status,
    })
}

fn values_match(kind: FieldKind, expected: &str, live: &str) -> bool {
    match kind {
        FieldKind::Choice => live == "checked",
        FieldKind::Numeric => match (parse_amount(expected), parse_amount(live)) {
            (Some(a), Some(b)) => (a - b).abs() < 0.005,
            _ => false,
        },
        FieldKind::Dropdown => {
            live == expected
                || (!live.is_empty() && live.contains(expected))
                || expected
                    .split_once('-')
                    .is_some_and(|(code, _)| !live.is_empty() && code.trim() == live)
        }
        FieldKind::Text => live == expected.trim(),
    }
}

/// Parse an amount as the numeric widgets format it ("2,000,000.00")
fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    cleaned.parse().ok()
}

/// Blank the text, numeric and dropdown fields; misses are skipped
pub(crate) async fn clear_fields(
    page: &dyn PageDriver,
    section: SectionName,
    fields: &SectionFields,
) -> Result<()> {
    tracing::info!("[{}] resetting form", section);
    for field in fields.iter() {
        let selector = field.selector();
        let result = match field.kind {
            FieldKind::Text | FieldKind::Numeric => page.set_text(&selector, "").await,
            FieldKind::Dropdown => page.select_option(&selector, "").await,
            FieldKind::Choice => continue,
        };
        match result {
            Ok(()) => {}
            Err(e) if e.is_element() => {
                tracing::debug!("[{}] could not clear {}: {}", section, field.id, e)
            }
            Err(e) => return Err(e),
        }
    }
    tracing::info!("[{}] form reset completed", section);
    Ok(())
}

/// Log and convert a failed terminal click
pub(crate) fn control_failed(section: SectionName, control: &str, outcome: &Outcome) -> SectionResult {
    tracing::error!("[{}] could not click {}: {}", section, control, outcome);
    SectionResult::failed(section, format!("{} {}", control, outcome)).with_manual_action(format!(
        "Click {} in the browser to finish {}",
        control,
        section.title()
    ))
}
