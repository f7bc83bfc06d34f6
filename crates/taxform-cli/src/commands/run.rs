use super::{Context, connect, output};
use anyhow::{Result, bail};
use taxform_core::{FormConfig, Orchestrator};

/// Fill all sections in order and print the summary
pub async fn execute(ctx: &Context, config: &FormConfig) -> Result<()> {
    let session = connect(ctx, config).await?;

    let report = Orchestrator::new(&session, config).run_all().await;
    output::print_report(&report, ctx.format)?;

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{} of {} sections need manual attention", failed, report.results.len());
    }
    Ok(())
}
