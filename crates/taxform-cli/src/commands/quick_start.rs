//! Guided flow for first-time use: log in, then fill everything.

use super::{Context, LoginOptions, login, run};
use anyhow::Result;
use console::style;
use taxform_core::FormConfig;

pub async fn execute(ctx: &Context, options: LoginOptions, config: &FormConfig) -> Result<()> {
    println!("{}", style("taxform quick start").bold().cyan());
    println!("{}", style("===================").cyan());
    println!("  1. Chrome opens at the login page and your TIN and PIN are filled in");
    println!("  2. You solve the CAPTCHA, log in and open the return");
    println!("  3. The main return, Schedule A and Schedule B are filled and saved as drafts");
    println!("  4. You review and submit the return yourself");

    {
        let mut keys = ctx.keys.lock().await;
        if keys.is_interactive() {
            println!();
            println!("Press any key to start...");
            keys.next_key().await?;
        }
    }

    let chrome = login::bootstrap(ctx, options, config).await?;

    println!();
    println!("{}", style("Filling the return").bold());
    let result = run::execute(ctx, config).await;

    if chrome.profile().is_temporary() {
        println!("🧹 Closing Chrome and removing the temporary profile");
    }
    drop(chrome);
    result
}
