use crate::cli::SeedArgs;
use crate::config::Config;
use crate::manager::SeedBundle;
use crate::server::open_storage;
use crate::utils::error::AppResult;
use crate::utils::output::OutputStyle;
use crate::utils::print_success;

pub async fn handle_seed_command(config: Config, args: &SeedArgs) -> AppResult<()> {
    let bundle = SeedBundle::from_file(&args.file)?;
    // Reads only; a missing data directory is just an empty store
    let storage = open_storage(&config);
    bundle.validate_against(&storage).await?;

    if args.dry_run {
        print_success(&format!(
            "Bundle is valid: {} prompts, {} patterns, {} workflows, {} models, {} tools",
            bundle.prompts.len(),
            bundle.patterns.len(),
            bundle.workflows.len(),
            bundle.ai_models.len(),
            bundle.ai_tools.len()
        ));
        return Ok(());
    }

    storage.ensure_ready().await?;
    let report = bundle.apply(&storage).await?;

    OutputStyle::print_header("🌱 Seed applied");
    for (label, (inserted, replaced)) in [
        ("Prompts", report.prompts),
        ("Patterns", report.patterns),
        ("Workflows", report.workflows),
        ("AI models", report.ai_models),
        ("AI tools", report.ai_tools),
    ] {
        println!(
            "{:>12}: {} new, {} replaced",
            OutputStyle::label(label),
            OutputStyle::success(&inserted.to_string()),
            OutputStyle::info(&replaced.to_string())
        );
    }
    Ok(())
}
