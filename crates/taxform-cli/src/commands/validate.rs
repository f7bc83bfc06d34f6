use super::{Context, connect, output};
use anyhow::{Result, bail};
use taxform_core::{FormConfig, Orchestrator};

/// Compare what the page shows with the configured values
pub async fn execute(ctx: &Context, config: &FormConfig) -> Result<()> {
    let session = connect(ctx, config).await?;

    let verifications = Orchestrator::new(&session, config).validate_all().await;
    output::print_verifications(&verifications, ctx.format)?;

    let invalid: Vec<&str> = verifications
        .iter()
        .filter(|v| !v.is_valid())
        .map(|v| v.section.title())
        .collect();
    if !invalid.is_empty() {
        bail!("Form data does not match in: {}", invalid.join(", "));
    }
    Ok(())
}
