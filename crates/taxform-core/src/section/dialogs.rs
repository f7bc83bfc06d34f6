use super::{control_failed, SectionName};
use crate::form::Timeouts;
use crate::interact::{ElementHelper, Outcome};
use crate::report::SectionResult;
use crate::Result;

/// The site spells its info button both ways
const INFO_LABELS: [&str; 2] = ["Ok", "OK"];

/// Click "Yes" if a confirmation dialog shows up; its absence is not an error
pub(super) async fn confirm_if_asked(
    helper: &ElementHelper<'_>,
    section: SectionName,
    timeouts: &Timeouts,
) -> Result<bool> {
    let outcome = helper.click_dialog_button("Yes", timeouts.dialog).await?;
    if outcome.is_done() {
        tracing::info!("[{}] confirmed 'Yes' on dialog", section);
        return Ok(true);
    }
    tracing::warn!("[{}] no confirmation dialog; continuing", section);
    Ok(false)
}

/// Acknowledge the info dialog that tells the user the site accepted the step
pub(super) async fn acknowledge_info(
    helper: &ElementHelper<'_>,
    section: SectionName,
    timeouts: &Timeouts,
) -> Result<Outcome> {
    let mut outcome = Outcome::TimedOut;
    for (label, timeout) in INFO_LABELS
        .iter()
        .zip([timeouts.info_dialog, timeouts.info_dialog_retry])
    {
        outcome = helper.click_dialog_button(label, timeout).await?;
        if outcome.is_done() {
            tracing::info!("[{}] acknowledged '{}' on info dialog", section, label);
            break;
        }
    }
    Ok(outcome)
}

/// Save draft → optional "Yes" → info "Ok". `None` when the site confirmed the save.
pub(super) async fn save_draft(
    helper: &ElementHelper<'_>,
    section: SectionName,
    save_button: &str,
    timeouts: &Timeouts,
) -> Result<Option<SectionResult>> {
    tracing::info!("[{}] saving draft", section);

    let clicked = helper.click(save_button, timeouts.element).await?;
    if !clicked.is_done() {
        return Ok(Some(control_failed(section, "Save draft", &clicked)));
    }

    confirm_if_asked(helper, section, timeouts).await?;

    let acknowledged = acknowledge_info(helper, section, timeouts).await?;
    if !acknowledged.is_done() {
        tracing::error!("[{}] save was not acknowledged by the site", section);
        return Ok(Some(
            SectionResult::failed(section, "draft save not acknowledged")
                .with_manual_action(format!(
                    "Check in the browser that the {} draft was saved",
                    section.title()
                )),
        ));
    }

    tracing::info!("[{}] draft saved", section);
    Ok(None)
}
