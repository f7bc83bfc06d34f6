use super::{clear_fields, dialogs, fill_fields, incomplete_fields, require_container};
use super::{verify_fields, Section, SectionName};
use crate::driver::{BrowserSession, PageDriver, TabInfo};
use crate::form::FormConfig;
use crate::interact::ElementHelper;
use crate::report::{SectionResult, Verification};
use crate::Result;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use tokio::time::Instant;

pub const CONTAINER: &str = "#Schedule02Container";
const TAB_LINKS: [&str; 2] = [
    "a[href=\"javascript:void(0)\"][onclick*=\"tabStrip.select(tabSchedule2)\"]",
    "a[onclick*=\"tabSchedule2\"]",
];
const SAVE_DRAFT_BUTTON: &str = "#btnS2SaveDraft";

/// Schedule B is filled in a tab of its own.
///
/// The automator opens the return in a new tab, finds that tab among the
/// browser's targets, switches the form to its Schedule B strip, fills and
/// saves it, then closes the tab it opened.
pub struct ScheduleB<'a> {
    session: &'a dyn BrowserSession,
    config: &'a FormConfig,
}

impl<'a> ScheduleB<'a> {
    pub fn new(session: &'a dyn BrowserSession, config: &'a FormConfig) -> Self {
        Self { session, config }
    }

    /// Poll the browser for a tab that was not in `before` and whose URL matches
    async fn discover_tab(&self, before: &HashSet<String>, pattern: &Regex) -> Result<Option<TabInfo>> {
        let timeouts = &self.config.timeouts;
        let deadline = Instant::now() + timeouts.tab_discovery;
        loop {
            let found = self
                .session
                .tabs()
                .await?
                .into_iter()
                .find(|tab| !before.contains(&tab.id) && pattern.is_match(&tab.url));
            if found.is_some() {
                return Ok(found);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tracing::debug!("[{}] waiting for the new tab to appear", self.name());
            tokio::time::sleep(timeouts.poll_interval.min(deadline - now)).await;
        }
    }

    async fn fill_in(&self, page: &dyn PageDriver) -> Result<SectionResult> {
        let section = self.name();
        let timeouts = &self.config.timeouts;
        let helper = ElementHelper::new(page, section, timeouts.poll_interval);

        let switched = helper
            .click_first(&TAB_LINKS, timeouts.element, timeouts.fallback)
            .await?;
        if !switched.is_done() {
            tracing::warn!(
                "[{}] could not find the Schedule B tab strip; please click it manually",
                section
            );
            if helper.wait_visible(CONTAINER, timeouts.manual_action).await? {
                tracing::info!("[{}] container visible after manual click", section);
            }
        }

        if let Some(failed) = require_container(&helper, section, CONTAINER, timeouts.element).await? {
            return Ok(failed);
        }

        let filled = fill_fields(&helper, section, &self.config.schedule_b, timeouts.element).await?;
        if !filled.can_save() {
            return Ok(incomplete_fields(section, &filled));
        }

        if let Some(failed) =
            dialogs::save_draft(&helper, section, SAVE_DRAFT_BUTTON, timeouts).await?
        {
            return Ok(failed.with_failed_fields(filled.all_failed()));
        }

        tracing::info!("[{}] setup completed", section);
        Ok(SectionResult::succeeded(section).with_failed_fields(filled.all_failed()))
    }
}

#[async_trait]
impl Section for ScheduleB<'_> {
    fn name(&self) -> SectionName {
        SectionName::ScheduleB
    }

    async fn setup(&self) -> Result<SectionResult> {
        let section = self.name();
        let urls = &self.config.urls;
        tracing::info!("[{}] starting setup in a new tab", section);

        let pattern = match urls.form_tab_regex() {
            Ok(pattern) => pattern,
            Err(e) => return Ok(SectionResult::failed(section, e.to_string())),
        };

        let before: HashSet<String> = self
            .session
            .tabs()
            .await?
            .into_iter()
            .map(|tab| tab.id)
            .collect();
        self.session.open_tab(&urls.form_url).await?;

        let Some(tab) = self.discover_tab(&before, &pattern).await? else {
            tracing::error!(
                "[{}] no tab matching {} appeared within {:?}",
                section,
                urls.form_tab_pattern,
                self.config.timeouts.tab_discovery
            );
            return Ok(SectionResult::failed(
                section,
                format!(
                    "no new tab matching {} appeared within {:?}; manual action required",
                    urls.form_tab_pattern, self.config.timeouts.tab_discovery
                ),
            )
            .with_manual_action(format!(
                "Open {} in a new tab and complete {} manually",
                urls.form_url,
                section.title()
            )));
        };
        tracing::info!("[{}] switched to tab {} ({})", section, tab.id, tab.url);

        let page = self.session.page(&tab.id).await?;
        let result = self.fill_in(page.as_ref()).await;

        match self.session.close_tab(&tab.id).await {
            Ok(()) => tracing::info!("[{}] tab closed", section),
            Err(e) => tracing::warn!("[{}] could not close tab {}: {}", section, tab.id, e),
        }

        result
    }

    async fn verify(&self) -> Result<Verification> {
        verify_fields(self.session.main_page(), self.name(), &self.config.schedule_b).await
    }

    async fn reset(&self) -> Result<()> {
        clear_fields(self.session.main_page(), self.name(), &self.config.schedule_b).await
    }
}
