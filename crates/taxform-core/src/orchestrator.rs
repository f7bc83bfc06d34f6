//! Runs the sections in their fixed order and collects the outcome.
//!
//! The pipeline never stops early: a failed section is recorded and the next
//! one is still attempted. A later section that depends on an earlier one
//! fails fast on its own container check. Session errors escaping a section
//! are caught here and reported as that section's failure.

use crate::driver::BrowserSession;
use crate::form::FormConfig;
use crate::report::{RunReport, SectionResult, Verification};
use crate::section::{MainReturn, ScheduleA, ScheduleB, Section, SectionName};
use crate::Result;
use chrono::Utc;

pub struct Orchestrator<'a> {
    session: &'a dyn BrowserSession,
    config: &'a FormConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(session: &'a dyn BrowserSession, config: &'a FormConfig) -> Self {
        Self { session, config }
    }

    fn section(&self, name: SectionName) -> Box<dyn Section + 'a> {
        match name {
            SectionName::MainReturn => Box::new(MainReturn::new(self.session.main_page(), self.config)),
            SectionName::ScheduleA => Box::new(ScheduleA::new(self.session.main_page(), self.config)),
            SectionName::ScheduleB => Box::new(ScheduleB::new(self.session, self.config)),
        }
    }

    /// Main return, then Schedule A, then Schedule B
    pub async fn run_all(&self) -> RunReport {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(SectionName::ALL.len());

        for (step, name) in SectionName::ALL.into_iter().enumerate() {
            tracing::info!("Step {}: {}", step + 1, name.title());
            results.push(self.run_one(name).await);
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            results,
        };
        if report.all_succeeded() {
            tracing::info!("All sections completed");
        } else {
            tracing::warn!(
                "Run completed with {} failed section(s)",
                report.failures().count()
            );
        }
        report
    }

    /// Run one section on its own
    pub async fn run_section_only(&self, name: SectionName) -> SectionResult {
        tracing::info!("Running {} only", name.title());
        self.run_one(name).await
    }

    async fn run_one(&self, name: SectionName) -> SectionResult {
        match self.section(name).setup().await {
            Ok(result) => {
                if result.success {
                    tracing::info!("{} succeeded", name.title());
                } else {
                    tracing::error!(
                        "{} failed: {}",
                        name.title(),
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
                result
            }
            Err(e) => {
                tracing::error!("{} aborted: {}", name.title(), e);
                SectionResult::failed(name, e.to_string()).with_manual_action(format!(
                    "Complete {} manually in the open browser",
                    name.title()
                ))
            }
        }
    }

    /// Read every section back from the page
    pub async fn validate_all(&self) -> Vec<Verification> {
        let mut verifications = Vec::with_capacity(SectionName::ALL.len());
        for name in SectionName::ALL {
            let verification = match self.section(name).verify().await {
                Ok(verification) => verification,
                Err(e) => {
                    tracing::error!("Could not read {}: {}", name.title(), e);
                    Verification::unreadable(name, e.to_string())
                }
            };
            verifications.push(verification);
        }
        verifications
    }

    /// Clear the fields of every section that has any to clear
    pub async fn reset_all(&self) -> Result<()> {
        tracing::info!("Resetting all sections");
        for name in SectionName::ALL {
            self.section(name).reset().await?;
        }
        tracing::info!("All sections reset");
        Ok(())
    }
}
