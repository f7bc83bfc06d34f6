use super::{clear_fields, control_failed, dialogs, fill_fields, incomplete_fields};
use super::{require_container, verify_fields, Section, SectionName};
use crate::driver::PageDriver;
use crate::form::FormConfig;
use crate::interact::ElementHelper;
use crate::report::{SectionResult, Verification};
use crate::Result;
use async_trait::async_trait;

pub const CONTAINER: &str = "#Schedule01Container";
const ADD_BUTTONS: [&str; 3] = [
    "#btnS1AddC_2",
    "input[type=\"button\"][value=\"Add\"]",
    "input[id*=\"Add\"]",
];
const SAVE_DRAFT_BUTTON: &str = "#btnS1SaveDraft";

/// Business income lines: fill, add the row, save the draft
pub struct ScheduleA<'a> {
    page: &'a dyn PageDriver,
    config: &'a FormConfig,
}

impl<'a> ScheduleA<'a> {
    pub fn new(page: &'a dyn PageDriver, config: &'a FormConfig) -> Self {
        Self { page, config }
    }
}

#[async_trait]
impl Section for ScheduleA<'_> {
    fn name(&self) -> SectionName {
        SectionName::ScheduleA
    }

    async fn setup(&self) -> Result<SectionResult> {
        let section = self.name();
        let timeouts = &self.config.timeouts;
        let helper = ElementHelper::new(self.page, section, timeouts.poll_interval);
        tracing::info!("[{}] starting setup", section);

        if let Some(failed) = require_container(&helper, section, CONTAINER, timeouts.element).await? {
            return Ok(failed);
        }

        let filled = fill_fields(&helper, section, &self.config.schedule_a, timeouts.element).await?;
        if !filled.can_save() {
            return Ok(incomplete_fields(section, &filled));
        }

        let added = helper
            .click_first(&ADD_BUTTONS, timeouts.element, timeouts.fallback)
            .await?;
        if !added.is_done() {
            return Ok(control_failed(section, "Add", &added));
        }

        if let Some(failed) =
            dialogs::save_draft(&helper, section, SAVE_DRAFT_BUTTON, timeouts).await?
        {
            return Ok(failed.with_failed_fields(filled.all_failed()));
        }

        tracing::info!("[{}] setup completed", section);
        Ok(SectionResult::succeeded(section).with_failed_fields(filled.all_failed()))
    }

    async fn verify(&self) -> Result<Verification> {
        verify_fields(self.page, self.name(), &self.config.schedule_a).await
    }

    async fn reset(&self) -> Result<()> {
        clear_fields(self.page, self.name(), &self.config.schedule_a).await
    }
}
