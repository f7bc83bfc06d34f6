//! Semi-automatic login: the credentials are typed in for the user, the
//! CAPTCHA and the login click stay manual. Logout is a single click.

use regex::Regex;
use std::fmt;
use std::time::Duration;
use taxform_core::{BrowserSession, ElementHelper, Outcome, PageDriver, Result, TabInfo};

pub const TIN_INPUT: &str = "#MyTaxReferNo";
pub const PIN_INPUT: &str = "#MyIRDPIN";
pub const LOGOUT_LINK: &str = "a.r-login.r-link-login[href=\"/Authentication/Logout\"]";

/// How long the logout link gets to show up
pub const LOGOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Taxpayer identification number and IRD PIN
#[derive(Clone)]
pub struct Credentials {
    pub tin: String,
    pub pin: String,
}

impl Credentials {
    pub fn new(tin: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            tin: tin.into(),
            pin: pin.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tin", &self.tin)
            .field("pin", &"***")
            .finish()
    }
}

/// Type the TIN and PIN into the login form.
///
/// Returns `false` when a field never appeared or would not take its value,
/// which usually means the profile is still logged in.
pub async fn fill_credentials(
    page: &dyn PageDriver,
    credentials: &Credentials,
    timeout: Duration,
    poll: Duration,
) -> Result<bool> {
    let helper = ElementHelper::scoped(page, "login", poll);
    for (selector, value, label) in [
        (TIN_INPUT, credentials.tin.as_str(), "Tax Reference Number"),
        (PIN_INPUT, credentials.pin.as_str(), "IRD PIN"),
    ] {
        match helper.fill_text(selector, value, timeout).await? {
            Outcome::Done => tracing::info!("{} filled", label),
            outcome => {
                tracing::warn!("{} field {}: {}", label, selector, outcome);
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Click the portal's logout link; `false` when it never showed up
pub async fn logout(page: &dyn PageDriver, timeout: Duration, poll: Duration) -> Result<bool> {
    let outcome = ElementHelper::scoped(page, "logout", poll)
        .click(LOGOUT_LINK, timeout)
        .await?;
    if outcome.is_done() {
        tracing::info!("Logged out");
    } else {
        tracing::warn!("Logout link {}: {}", LOGOUT_LINK, outcome);
    }
    Ok(outcome.is_done())
}

/// Wait until some tab shows the return-filing page
pub async fn wait_for_form(session: &dyn BrowserSession, pattern: &Regex, poll: Duration) -> Result<TabInfo> {
    loop {
        if let Some(tab) = session
            .tabs()
            .await?
            .into_iter()
            .find(|tab| pattern.is_match(&tab.url))
        {
            tracing::info!("Return-filing page open at {}", tab.url);
            return Ok(tab);
        }
        tokio::time::sleep(poll).await;
    }
}
