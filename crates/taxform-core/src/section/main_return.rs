use super::{dialogs, fill_fields, incomplete_fields, require_container, verify_fields};
use super::{control_failed, schedule_a, Section, SectionName};
use crate::driver::PageDriver;
use crate::form::FormConfig;
use crate::interact::ElementHelper;
use crate::report::{SectionResult, Verification};
use crate::Result;
use async_trait::async_trait;

/// The residency radio group only renders once the return has loaded
pub const CONTAINER: &str = "#Resident_Resident";
const NEXT_BUTTON: &str = "#btnNext";

/// Residency answers, then advance to Schedule A
pub struct MainReturn<'a> {
    page: &'a dyn PageDriver,
    config: &'a FormConfig,
}

impl<'a> MainReturn<'a> {
    pub fn new(page: &'a dyn PageDriver, config: &'a FormConfig) -> Self {
        Self { page, config }
    }

    fn helper(&self) -> ElementHelper<'a> {
        ElementHelper::new(self.page, SectionName::MainReturn, self.config.timeouts.poll_interval)
    }
}

#[async_trait]
impl Section for MainReturn<'_> {
    fn name(&self) -> SectionName {
        SectionName::MainReturn
    }

    async fn setup(&self) -> Result<SectionResult> {
        let section = self.name();
        let timeouts = &self.config.timeouts;
        let helper = self.helper();
        tracing::info!("[{}] starting setup", section);

        if let Some(failed) = require_container(&helper, section, CONTAINER, timeouts.element).await? {
            return Ok(failed);
        }

        let filled = fill_fields(&helper, section, &self.config.main_return, timeouts.element).await?;
        if !filled.can_save() {
            return Ok(incomplete_fields(section, &filled));
        }

        let next = helper.click(NEXT_BUTTON, timeouts.element).await?;
        if !next.is_done() {
            return Ok(control_failed(section, "Next", &next));
        }

        let confirmed = helper.click_dialog_button("Yes", timeouts.element).await?;
        if !confirmed.is_done() {
            return Ok(control_failed(section, "the 'Yes' confirmation", &confirmed));
        }

        let acknowledged = dialogs::acknowledge_info(&helper, section, timeouts).await?;
        if !acknowledged.is_done() {
            return Ok(control_failed(section, "the 'Ok' info dialog", &acknowledged));
        }

        if !helper.wait_visible(schedule_a::CONTAINER, timeouts.element).await? {
            tracing::error!("[{}] Schedule A did not load after Next", section);
            return Ok(SectionResult::failed(section, "Schedule A did not load after Next")
                .with_manual_action("Click Next in the browser and confirm the dialogs"));
        }

        tracing::info!("[{}] setup completed, Schedule A loaded", section);
        Ok(SectionResult::succeeded(section).with_failed_fields(filled.all_failed()))
    }

    async fn verify(&self) -> Result<Verification> {
        verify_fields(self.page, self.name(), &self.config.main_return).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::dialog_button_selector;
    use crate::testing::{FakePage, Op};

    fn ready_page() -> FakePage {
        let page = FakePage::new();
        page.show(CONTAINER);
        page.show("#IsSeniorCitizen");
        page.show(NEXT_BUTTON);
        let yes = dialog_button_selector("Yes");
        let ok = dialog_button_selector("Ok");
        page.on_click(NEXT_BUTTON, &[&yes]);
        page.on_click(&yes, &[&ok]);
        page.on_click(&ok, &[schedule_a::CONTAINER]);
        page
    }

    #[tokio::test(start_paused = true)]
    async fn test_setup_selects_answers_and_advances() {
        let page = ready_page();
        let config = FormConfig::default();

        let result = MainReturn::new(&page, &config).setup().await.unwrap();

        assert!(result.success, "{:?}", result);
        assert_eq!(
            page.ops(),
            vec![
                Op::Check(CONTAINER.to_string()),
                Op::Check("#IsSeniorCitizen".to_string()),
                Op::Click(NEXT_BUTTON.to_string()),
                Op::Click(dialog_button_selector("Yes")),
                Op::Click(dialog_button_selector("Ok")),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_container_fails_without_filling() {
        let page = FakePage::new();
        let config = FormConfig::default();

        let result = MainReturn::new(&page, &config).setup().await.unwrap();

        assert!(!result.success);
        assert!(result.manual_action.is_some());
        assert!(page.ops().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_info_dialog_uppercase_spelling_is_accepted() {
        let page = ready_page();
        let yes = dialog_button_selector("Yes");
        let upper_ok = dialog_button_selector("OK");
        page.on_click(&yes, &[&upper_ok]);
        page.on_click(&upper_ok, &[schedule_a::CONTAINER]);
        let config = FormConfig::default();

        let result = MainReturn::new(&page, &config).setup().await.unwrap();

        assert!(result.success, "{:?}", result);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_a_never_loading_is_failure() {
        let page = ready_page();
        page.on_click(&dialog_button_selector("Ok"), &[]);
        let config = FormConfig::default();

        let result = MainReturn::new(&page, &config).setup().await.unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("Schedule A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_reports_checked_answers() {
        let page = ready_page();
        let config = FormConfig::default();
        let section = MainReturn::new(&page, &config);

        section.setup().await.unwrap();
        let verification = section.verify().await.unwrap();

        assert!(verification.is_valid());
    }
}
