use super::ready_storage;
use crate::config::Config;
use crate::manager::{CatalogService, PatternService, PromptService, WorkflowFilter, WorkflowService};
use crate::utils::error::AppResult;
use crate::utils::output::{DisplayFormatter, OutputStyle};

pub async fn handle_stats_command(config: Config) -> AppResult<()> {
    let storage = ready_storage(&config).await?;

    let stats = PromptService::new(&storage).stats().await?;
    DisplayFormatter::print_stats(&stats);

    let patterns = PatternService::new(&storage).list(None).await?.len();
    let workflows = WorkflowService::new(&storage)
        .list(&WorkflowFilter { limit: Some(1), ..Default::default() }, false)
        .await?
        .total;
    let (models, tools) = CatalogService::new(&storage).counts().await?;

    println!("\n{}", OutputStyle::header("📚 Catalog"));
    println!("Patterns: {}", patterns);
    println!("Workflows: {}", workflows);
    println!("AI models: {}", models);
    println!("AI tools: {}", tools);
    Ok(())
}
