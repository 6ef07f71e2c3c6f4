use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::error::AppResult;
use crate::utils::print_success;

pub fn handle_config_command(config: Config, command: Option<ConfigCommands>) -> AppResult<()> {
    match command {
        Some(ConfigCommands::Show) => handle_show_command(&config),
        Some(ConfigCommands::Path) => {
            println!("{}", Config::config_file_path().display());
            Ok(())
        }
        Some(ConfigCommands::Reset) => handle_reset_command(),
        None => handle_config_help(),
    }
}

fn handle_show_command(config: &Config) -> AppResult<()> {
    println!("⚙️  Engify Configuration");
    println!("=======================");

    println!("Server:");
    println!("  Bind: {}", config.server.bind);
    println!("  Base URL: {}", config.server.base_url);

    println!("Storage:");
    println!("  Backend: {:?}", config.storage.backend);
    println!("  Data dir: {}", config.storage.data_dir.display());

    println!("Auth:");
    println!("  Session cookie: {}", config.auth.session_cookie);
    println!("  Admin roles: {}", config.auth.admin_roles.join(", "));
    println!("  Session TTL: {}h", config.auth.session_ttl_hours);

    println!("Rate limits:");
    for (name, bucket) in [("admin_write", &config.rate_limit.admin_write), ("image", &config.rate_limit.image)] {
        println!("  {}: {} burst, {}/s refill", name, bucket.capacity, bucket.refill_per_sec);
    }

    println!("Image:");
    println!("  Endpoint: {}", config.image.endpoint);
    println!("  Model: {} ({})", config.image.model, config.image.size);
    if config.image.api_key.is_some() {
        println!("  API key: ✓");
    }

    println!("Logging:");
    println!("  Level: {}", config.logging.level);
    Ok(())
}

fn handle_config_help() -> AppResult<()> {
    println!("⚙️  Configuration Management");
    println!("==========================");
    println!("Available configuration commands:");
    println!("  engify config show    - Show current configuration");
    println!("  engify config path    - Print the configuration file path");
    println!("  engify config reset   - Reset configuration to defaults");
    println!();
    println!("Configuration file location: {}", Config::config_file_path().display());
    Ok(())
}

fn handle_reset_command() -> AppResult<()> {
    Config::default().save()?;
    print_success("Configuration reset to defaults");
    Ok(())
}
