use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;
use taxform_browser::{Credentials, DEFAULT_DEBUG_PORT};
use taxform_cli::OutputFormat;
use taxform_cli::commands::{self, Context, LoginOptions};
use taxform_core::SectionName;

const EXIT_STATUS_SECTIONS: &str = "EXIT STATUS:\n  \
    0  every section was filled and saved\n  \
    1  a section needs manual attention (the summary is printed first), or Chrome was unreachable";

const EXIT_STATUS_VALIDATE: &str = "EXIT STATUS:\n  \
    0  every field on the page matches\n  \
    1  a field is empty or differs (the report is printed first), or Chrome was unreachable";

#[derive(Parser)]
#[command(name = "taxform")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Fill the online individual income tax return in a logged-in Chrome",
    long_about = "taxform attaches to a Chrome started with remote debugging, fills the main \
                  return, Schedule A and Schedule B, and saves each schedule as a draft. \
                  Logging in (CAPTCHA included) and the final submission stay with you."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, json)
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Chrome remote debugging port
    #[arg(long, global = true, env = "TAXFORM_DEBUG_PORT", default_value_t = DEFAULT_DEBUG_PORT)]
    port: u16,

    /// Exit without waiting for a key press
    #[arg(long, global = true)]
    no_pause: bool,
}

#[derive(Args)]
struct FormArgs {
    /// JSON file with field values to use instead of the built-in ones
    #[arg(long, env = "TAXFORM_DATA", value_name = "FILE")]
    data: Option<PathBuf>,

    /// How long to wait for each form element, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

#[derive(Args)]
struct LoginArgs {
    /// Tax reference number typed into the login form
    #[arg(long, env = "TAXFORM_TIN")]
    tin: Option<String>,

    /// IRD PIN typed into the login form
    #[arg(long, env = "TAXFORM_PIN", hide_env_values = true)]
    pin: Option<String>,

    /// Chrome profile directory (default: ~/.taxform/chrome-profile)
    #[arg(long, value_name = "DIR")]
    profile: Option<PathBuf>,

    /// Path to the Chrome binary
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,
}

impl LoginArgs {
    fn into_options(self, temporary: bool) -> LoginOptions {
        let credentials = match (self.tin, self.pin) {
            (Some(tin), Some(pin)) => Some(Credentials::new(tin, pin)),
            (None, None) => None,
            _ => {
                tracing::warn!("Both --tin and --pin are needed to fill the login form");
                None
            }
        };
        LoginOptions {
            credentials,
            profile: self.profile,
            temporary,
            chrome_path: self.chrome_path,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Launch Chrome, fill TIN and PIN, and wait for you to log in
    Login {
        #[command(flatten)]
        login: LoginArgs,
    },

    /// Fill the main return, Schedule A and Schedule B in order
    #[command(after_help = EXIT_STATUS_SECTIONS)]
    Run {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Fill a single section (main_return, schedule_a, schedule_b)
    #[command(after_help = EXIT_STATUS_SECTIONS)]
    Section {
        /// Section to fill
        #[arg(value_name = "SECTION", value_parser = parse_section)]
        name: SectionName,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Read the form back and compare it with the configured values
    #[command(after_help = EXIT_STATUS_VALIDATE)]
    Validate {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Clear the Schedule A and Schedule B fields on the page
    Reset {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Log out of the portal in the attached Chrome
    Logout,

    /// Guided login followed by a full run
    QuickStart {
        #[command(flatten)]
        login: LoginArgs,

        /// Use a temporary profile; Chrome is closed and the profile deleted
        /// when the run is over
        #[arg(long, conflicts_with = "profile")]
        temp: bool,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  bash, zsh, fish, powershell, elvish\n\n\
                            INSTALLATION:\n  bash:  taxform completion --shell bash > ~/.local/share/bash-completion/completions/taxform\n  \
                            zsh:   taxform completion --shell zsh > ~/.zfunc/_taxform\n  \
                            fish:  taxform completion --shell fish > ~/.config/fish/completions/taxform.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn parse_section(value: &str) -> std::result::Result<SectionName, String> {
    value.parse().map_err(|e: taxform_core::Error| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Commands::Completion { shell } = cli.command {
        return commands::completion::execute(shell, &mut Cli::command());
    }

    let ctx = Context::new(cli.port, cli.format);
    let pause = !cli.no_pause;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async {
        let result = execute(cli.command, &ctx).await;
        if pause {
            commands::pause_before_exit(&ctx).await;
        }
        result
    });
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

async fn execute(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Login { login } => {
            let config = commands::load_config(None, None)?;
            commands::login::execute(ctx, login.into_options(false), &config).await
        }
        Commands::Run { form } => {
            let config = commands::load_config(form.data.as_deref(), form.timeout_ms)?;
            commands::run::execute(ctx, &config).await
        }
        Commands::Section { name, form } => {
            let config = commands::load_config(form.data.as_deref(), form.timeout_ms)?;
            commands::section::execute(ctx, &config, name).await
        }
        Commands::Validate { form } => {
            let config = commands::load_config(form.data.as_deref(), form.timeout_ms)?;
            commands::validate::execute(ctx, &config).await
        }
        Commands::Reset { form } => {
            let config = commands::load_config(form.data.as_deref(), form.timeout_ms)?;
            commands::reset::execute(ctx, &config).await
        }
        Commands::Logout => {
            let config = commands::load_config(None, None)?;
            commands::logout::execute(ctx, &config).await
        }
        Commands::QuickStart { login, temp, form } => {
            let config = commands::load_config(form.data.as_deref(), form.timeout_ms)?;
            commands::quick_start::execute(ctx, login.into_options(temp), &config).await
        }
        Commands::Completion { .. } => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("taxform=debug,taxform_cli=debug,taxform_core=debug,taxform_browser=debug")
    } else {
        EnvFilter::new("taxform=info,taxform_cli=info,taxform_core=info,taxform_browser=info")
    };

    // Summaries go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
