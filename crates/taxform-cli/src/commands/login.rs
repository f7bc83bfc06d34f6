use super::{Context, connect};
use anyhow::Result;
use console::style;
use std::path::PathBuf;
use std::time::Duration;
use taxform_browser::login::{fill_credentials, wait_for_form};
use taxform_browser::{CdpSession, ChromeFinder, ChromeLauncher, Credentials, LaunchedChrome, ProfileManager};
use taxform_core::FormConfig;

const FORM_POLL: Duration = Duration::from_secs(1);

pub struct LoginOptions {
    pub credentials: Option<Credentials>,
    pub profile: Option<PathBuf>,
    /// Only for flows that finish their work before exiting; Chrome is
    /// stopped together with the temporary profile
    pub temporary: bool,
    pub chrome_path: Option<PathBuf>,
}

pub async fn execute(ctx: &Context, options: LoginOptions, config: &FormConfig) -> Result<()> {
    let chrome = bootstrap(ctx, options, config).await?;
    tracing::debug!("Leaving Chrome (pid {}) running", chrome.pid());

    println!();
    println!("✅ Chrome stays open on port {}.", ctx.port);
    println!("   Run `taxform run` to fill the return.");
    Ok(())
}

/// Launch Chrome at the login page and hand over to the user for the CAPTCHA.
///
/// Returns once a tab shows the return-filing page, or the user pressed a
/// key. Dropping the returned handle stops Chrome when its profile is
/// temporary, so it has to outlive the automation that follows.
pub async fn bootstrap(ctx: &Context, options: LoginOptions, config: &FormConfig) -> Result<LaunchedChrome> {
    println!("🔍 Locating Chrome...");
    let chrome_binary = ChromeFinder::new(options.chrome_path).find()?;
    println!("✅ Found Chrome at: {}", chrome_binary.display());

    let profile = if options.temporary {
        println!("📁 Using temporary profile");
        ProfileManager::temporary()?
    } else {
        let path = match options.profile {
            Some(path) => path,
            None => ProfileManager::default_path()?,
        };
        println!("📁 Using profile: {}", path.display());
        ProfileManager::persistent(path)?
    };

    println!("🚀 Launching Chrome...");
    let child = ChromeLauncher::new(chrome_binary, profile.path().to_path_buf())
        .with_port(ctx.port)
        .with_url(&config.urls.login_url)
        .launch()?;
    let chrome = LaunchedChrome::new(child, profile);
    tracing::debug!("Chrome started with pid {}", chrome.pid());

    let session = connect(ctx, config).await?;

    match &options.credentials {
        Some(credentials) => {
            let timeouts = &config.timeouts;
            if fill_credentials(session.main(), credentials, timeouts.element, timeouts.poll_interval).await? {
                println!("✅ Tax reference number and PIN filled");
            } else {
                println!(
                    "{}",
                    style("⚠️  Could not fill the login form; the profile may already be logged in").yellow()
                );
            }
        }
        None => println!("📝 No TIN/PIN given; fill the login form yourself"),
    }

    println!();
    println!("{}", style("CAPTCHA REQUIRED").bold().cyan());
    println!("{}", style("================").cyan());
    println!("  1. Solve the CAPTCHA and click Login");
    println!("  2. Open the return: {}", config.urls.form_url);
    println!();
    println!("Waiting for the return page (press any key to continue without it)...");

    wait_for_return_page(ctx, &session, config).await?;
    Ok(chrome)
}

async fn wait_for_return_page(ctx: &Context, session: &CdpSession, config: &FormConfig) -> Result<()> {
    let pattern = config.urls.form_tab_regex()?;
    let mut keys = ctx.keys.lock().await;

    tokio::select! {
        tab = wait_for_form(session, &pattern, FORM_POLL) => {
            let tab = tab?;
            println!("✅ Return page open: {}", tab.url);
        }
        key = keys.next_key() => {
            if let Err(e) = key {
                tracing::debug!("Key press not read: {}", e);
            }
            println!("⏭️  Continuing without waiting for the return page");
        }
    }
    Ok(())
}
