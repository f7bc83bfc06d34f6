use super::{Context, connect};
use anyhow::Result;
use console::style;
use taxform_browser::login::{LOGOUT_TIMEOUT, logout};
use taxform_core::FormConfig;

/// Click the portal's logout link on the main tab
pub async fn execute(ctx: &Context, config: &FormConfig) -> Result<()> {
    let session = connect(ctx, config).await?;

    let logged_out = logout(session.main(), LOGOUT_TIMEOUT, config.timeouts.poll_interval).await?;

    if ctx.format == crate::OutputFormat::Json {
        println!("{}", serde_json::json!({ "logged_out": logged_out }));
    } else if logged_out {
        println!("{} Logged out of the portal", style("✓").green().bold());
    } else {
        println!(
            "{}",
            style("⚠️  Logout link not found; the session may already be logged out").yellow()
        );
    }
    Ok(())
}
