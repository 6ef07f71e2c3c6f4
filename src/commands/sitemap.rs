use super::ready_storage;
use crate::cli::SitemapArgs;
use crate::config::Config;
use crate::sitemap::SitemapBuilder;
use crate::utils::error::AppResult;
use crate::utils::print_success;

pub async fn handle_sitemap_command(config: Config, args: &SitemapArgs) -> AppResult<()> {
    let storage = ready_storage(&config).await?;
    let xml = SitemapBuilder::new(storage).build_xml(config.origin()).await?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &xml)?;
            print_success(&format!("Sitemap written to {}", path.display()));
        }
        None => print!("{}", xml),
    }
    Ok(())
}
