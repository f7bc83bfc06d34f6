//! Wait-then-act primitive shared by every section.
//!
//! Each call waits for its selector to become visible, performs one action
//! and reports an [`Outcome`]. A timeout or an element-level failure is
//! logged and returned as a value; only session failures become `Err`.

use crate::driver::PageDriver;
use crate::form::{FieldKind, FormFieldSpec};
use crate::section::SectionName;
use crate::Result;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Result of one wait-then-act step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The element never became visible within the timeout
    TimedOut,
    /// The element was there but the action did not take
    Failed(String),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => f.write_str("done"),
            Outcome::TimedOut => f.write_str("timed out"),
            Outcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

enum Action<'v> {
    SetText(&'v str),
    TypeOver(&'v str),
    Select(&'v str),
    Check,
    Click,
}

impl Action<'_> {
    fn verb(&self) -> &'static str {
        match self {
            Action::SetText(_) | Action::TypeOver(_) => "fill",
            Action::Select(_) => "select",
            Action::Check => "check",
            Action::Click => "click",
        }
    }
}

/// Selector for a button inside whichever dialog is on top.
///
/// Drivers act on the last visible match, which is the most recently
/// opened dialog when several are stacked.
pub fn dialog_button_selector(label: &str) -> String {
    format!(
        ".k-window input[type=\"button\"][value=\"{label}\"], \
         div[role=\"dialog\"] input[type=\"button\"][value=\"{label}\"], \
         input[type=\"button\"][value=\"{label}\"].r-btn-pop"
    )
}

pub struct ElementHelper<'a> {
    page: &'a dyn PageDriver,
    /// Log prefix
    scope: &'static str,
    poll_interval: Duration,
}

impl<'a> ElementHelper<'a> {
    pub fn new(page: &'a dyn PageDriver, section: SectionName, poll_interval: Duration) -> Self {
        Self::scoped(page, section.as_str(), poll_interval)
    }

    /// Helper for pages outside the form sections, such as the login page
    pub fn scoped(page: &'a dyn PageDriver, scope: &'static str, poll_interval: Duration) -> Self {
        Self {
            page,
            scope,
            poll_interval,
        }
    }

    pub fn page(&self) -> &'a dyn PageDriver {
        self.page
    }

    /// Poll until `selector` is visible; `false` once `timeout` has elapsed
    pub async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.is_visible(selector).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) if e.is_element() => {
                    tracing::debug!("[{}] visibility check for {}: {}", self.scope, selector, e)
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    pub async fn fill_text(&self, selector: &str, value: &str, timeout: Duration) -> Result<Outcome> {
        self.run(selector, Action::SetText(value), timeout).await
    }

    pub async fn fill_numeric(&self, selector: &str, value: &str, timeout: Duration) -> Result<Outcome> {
        self.run(selector, Action::TypeOver(value), timeout).await
    }

    pub async fn select(&self, selector: &str, option: &str, timeout: Duration) -> Result<Outcome> {
        self.run(selector, Action::Select(option), timeout).await
    }

    pub async fn check(&self, selector: &str, timeout: Duration) -> Result<Outcome> {
        self.run(selector, Action::Check, timeout).await
    }

    pub async fn click(&self, selector: &str, timeout: Duration) -> Result<Outcome> {
        self.run(selector, Action::Click, timeout).await
    }

    /// Fill one configured field the way its kind requires
    pub async fn fill_field(&self, field: &FormFieldSpec, timeout: Duration) -> Result<Outcome> {
        let selector = field.selector();
        let value = field.value.to_string();
        let outcome = match field.kind {
            FieldKind::Text => self.fill_text(&selector, &value, timeout).await?,
            FieldKind::Numeric => self.fill_numeric(&selector, &value, timeout).await?,
            FieldKind::Dropdown => self.select(&selector, &value, timeout).await?,
            FieldKind::Choice => self.check(&selector, timeout).await?,
        };

        if outcome.is_done() {
            tracing::info!("[{}] {} ({}): {}", self.scope, field.label, field.id, value);
        }
        Ok(outcome)
    }

    /// Click the first of `selectors` that shows up.
    ///
    /// The primary selector gets `timeout`, every fallback `fallback_timeout`.
    pub async fn click_first(
        &self,
        selectors: &[&str],
        timeout: Duration,
        fallback_timeout: Duration,
    ) -> Result<Outcome> {
        let mut last = Outcome::TimedOut;
        for (i, selector) in selectors.iter().enumerate() {
            let wait = if i == 0 { timeout } else { fallback_timeout };
            last = self.click(selector, wait).await?;
            if last.is_done() {
                if i > 0 {
                    tracing::info!("[{}] clicked fallback selector {}", self.scope, selector);
                }
                return Ok(last);
            }
        }
        Ok(last)
    }

    /// Click the button labelled `label` in the topmost dialog
    pub async fn click_dialog_button(&self, label: &str, timeout: Duration) -> Result<Outcome> {
        self.click(&dialog_button_selector(label), timeout).await
    }

    async fn run(&self, selector: &str, action: Action<'_>, timeout: Duration) -> Result<Outcome> {
        if !self.wait_visible(selector, timeout).await? {
            tracing::warn!(
                "[{}] timed out after {:?} waiting to {} {}",
                self.scope,
                timeout,
                action.verb(),
                selector
            );
            return Ok(Outcome::TimedOut);
        }

        let result = match action {
            Action::SetText(value) => self.page.set_text(selector, value).await,
            Action::TypeOver(value) => self.page.type_over(selector, value).await,
            Action::Select(option) => self.page.select_option(selector, option).await,
            Action::Check => self.page.check(selector).await,
            Action::Click => self.page.click(selector).await,
        };

        match result {
            Ok(()) => {
                tracing::debug!("[{}] {} {}", self.scope, action.verb(), selector);
                Ok(Outcome::Done)
            }
            Err(e) if e.is_element() => {
                tracing::warn!("[{}] could not {} {}: {}", self.scope, action.verb(), selector, e);
                Ok(Outcome::Failed(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePage, Op};
    use crate::Error;

    const POLL: Duration = Duration::from_millis(250);

    #[tokio::test(start_paused = true)]
    async fn test_fill_waits_for_late_element() {
        let page = FakePage::new();
        page.show_after("#late", Duration::from_secs(2));
        let helper = ElementHelper::new(&page, SectionName::ScheduleA, POLL);

        let outcome = helper
            .fill_text("#late", "hello", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Done);
        assert_eq!(page.value_of("#late").as_deref(), Some("hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_an_outcome_not_an_error() {
        let page = FakePage::new();
        let helper = ElementHelper::new(&page, SectionName::ScheduleA, POLL);

        let started = Instant::now();
        let outcome = helper.click("#missing", Duration::from_secs(3)).await.unwrap();

        assert_eq!(outcome, Outcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(page.ops().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_element_error_becomes_failed_outcome() {
        let page = FakePage::new();
        page.show("select[data-cage=\"201\"]");
        let helper = ElementHelper::new(&page, SectionName::ScheduleB, POLL);

        let outcome = helper
            .select("select[data-cage=\"201\"]", "999999", Duration::from_secs(1))
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_error_propagates() {
        let page = FakePage::new();
        page.disconnect();
        let helper = ElementHelper::new(&page, SectionName::MainReturn, POLL);

        let result = helper.click("#btnNext", Duration::from_secs(1)).await;

        assert!(matches!(result, Err(Error::Session(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_first_falls_back() {
        let page = FakePage::new();
        page.show("input[id*=\"Add\"]");
        let helper = ElementHelper::new(&page, SectionName::ScheduleA, POLL);

        let outcome = helper
            .click_first(
                &["#btnS1AddC_2", "input[id*=\"Add\"]"],
                Duration::from_secs(2),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Done);
        assert_eq!(page.ops(), vec![Op::Click("input[id*=\"Add\"]".to_string())]);
    }

    #[test]
    fn test_dialog_button_selector_covers_popup_styles() {
        let selector = dialog_button_selector("Ok");

        assert!(selector.contains(".k-window input[type=\"button\"][value=\"Ok\"]"));
        assert!(selector.contains("div[role=\"dialog\"]"));
        assert!(selector.contains(".r-btn-pop"));
    }
}
