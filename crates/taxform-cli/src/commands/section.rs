use super::{Context, connect, output};
use anyhow::{Result, bail};
use taxform_core::{FormConfig, Orchestrator, SectionName};

pub async fn execute(ctx: &Context, config: &FormConfig, name: SectionName) -> Result<()> {
    let session = connect(ctx, config).await?;

    let result = Orchestrator::new(&session, config)
        .run_section_only(name)
        .await;
    output::print_section_result(&result, ctx.format)?;

    if !result.success {
        bail!("{} needs manual attention", name.title());
    }
    Ok(())
}
