use crate::section::SectionName;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What one section automator reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionResult {
    pub section: SectionName,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// What the user has to finish by hand in the open browser
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_action: Option<String>,
    /// Identifiers of fields that could not be filled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_fields: Vec<String>,
}

impl SectionResult {
    pub fn succeeded(section: SectionName) -> Self {
        Self {
            section,
            success: true,
            error: None,
            manual_action: None,
            failed_fields: Vec::new(),
        }
    }

    pub fn failed(section: SectionName, error: impl Into<String>) -> Self {
        Self {
            section,
            success: false,
            error: Some(error.into()),
            manual_action: None,
            failed_fields: Vec::new(),
        }
    }

    pub fn with_manual_action(mut self, instruction: impl Into<String>) -> Self {
        self.manual_action = Some(instruction.into());
        self
    }

    pub fn with_failed_fields(mut self, fields: Vec<String>) -> Self {
        self.failed_fields = fields;
        self
    }
}

/// Results of a full run, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<SectionResult>,
}

impl RunReport {
    pub fn get(&self, section: SectionName) -> Option<&SectionResult> {
        self.results.iter().find(|r| r.section == section)
    }

    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SectionResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Match,
    Mismatch,
    Empty,
}

/// Live value of one field compared to its configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCheck {
    pub id: String,
    pub label: String,
    pub expected: String,
    pub actual: Option<String>,
    pub status: FieldStatus,
}

/// Read-back of a whole section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub section: SectionName,
    pub checks: Vec<FieldCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.checks.iter().all(|c| c.status == FieldStatus::Match)
    }

    pub fn unreadable(section: SectionName, error: impl Into<String>) -> Self {
        Self {
            section,
            checks: Vec::new(),
            error: Some(error.into()),
        }
    }
}
