use super::{Context, connect};
use anyhow::Result;
use console::style;
use taxform_core::{FormConfig, Orchestrator};

pub async fn execute(ctx: &Context, config: &FormConfig) -> Result<()> {
    let session = connect(ctx, config).await?;

    Orchestrator::new(&session, config).reset_all().await?;

    if ctx.format == crate::OutputFormat::Json {
        println!("{}", serde_json::json!({ "reset": true }));
    } else {
        println!("{} Schedule A and Schedule B fields cleared", style("✓").green().bold());
    }
    Ok(())
}
