pub mod completion;
pub mod login;
pub mod logout;
pub mod quick_start;
pub mod reset;
pub mod run;
pub mod section;
pub mod validate;

mod output;

pub use login::LoginOptions;

use crate::OutputFormat;
use crate::keys::KeyReader;
use anyhow::{Context as _, Result};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use taxform_browser::CdpSession;
use taxform_core::{FormConfig, FormOverrides};
use tokio::sync::Mutex;

/// Settings shared by every command
pub struct Context {
    pub port: u16,
    pub format: OutputFormat,
    /// The only reader of key presses in this process
    pub keys: Mutex<KeyReader>,
}

impl Context {
    pub fn new(port: u16, format: OutputFormat) -> Self {
        Self {
            port,
            format,
            keys: Mutex::new(KeyReader::terminal()),
        }
    }
}

/// Built-in form values, overlaid with `--data` and `--timeout-ms`
pub fn load_config(data: Option<&Path>, timeout_ms: Option<u64>) -> Result<FormConfig> {
    let mut config = FormConfig::default();

    if let Some(path) = data {
        let overrides = FormOverrides::from_file(path)
            .with_context(|| format!("Could not load form data from {}", path.display()))?;
        tracing::info!("Loaded {} field value(s) from {}", overrides.len(), path.display());
        config = config.with_overrides(&overrides);
    }

    if let Some(ms) = timeout_ms {
        config = config.with_element_timeout(Duration::from_millis(ms));
    }

    Ok(config)
}

/// Attach to the running Chrome
pub async fn connect(ctx: &Context, config: &FormConfig) -> Result<CdpSession> {
    let pattern = config.urls.form_tab_regex()?;

    let spinner = spinner(ctx, format!("Connecting to Chrome on port {}...", ctx.port))?;
    let session = CdpSession::connect(ctx.port, &pattern).await;
    spinner.finish_and_clear();

    Ok(session?)
}

fn spinner(ctx: &Context, message: String) -> Result<ProgressBar> {
    if ctx.format == OutputFormat::Json || !Term::stderr().is_term() {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Keep the console window open until the user has read the output
pub async fn pause_before_exit(ctx: &Context) {
    let mut keys = ctx.keys.lock().await;
    if !keys.is_interactive() {
        return;
    }
    println!();
    println!("{}", style("Press any key to exit...").dim());
    let _ = keys.next_key().await;
}
