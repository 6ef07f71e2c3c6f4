use crate::commands::{configure, list, playground, seed, serve, session, sitemap, stats};
use crate::config::Config;
use crate::utils::error::AppResult;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "engify")]
#[command(about = "Content service for the Engify prompt library")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    pub async fn execute(self, config: Config) -> AppResult<()> {
        match self {
            Commands::Serve(args) => serve::handle_serve_command(config, &args).await,
            Commands::Seed(args) => seed::handle_seed_command(config, &args).await,
            Commands::List(args) => list::handle_list_command(config, &args).await,
            Commands::Stats => stats::handle_stats_command(config).await,
            Commands::Sitemap(args) => sitemap::handle_sitemap_command(config, &args).await,
            Commands::Playground(args) => playground::handle_playground_command(&args),
            Commands::Session(args) => session::handle_session_command(config, args.command).await,
            Commands::Config(args) => configure::handle_config_command(config, args.command),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Import a JSON content bundle
    Seed(SeedArgs),

    /// List catalog content
    List(ListArgs),

    /// Show prompt library statistics
    Stats,

    /// Print or write sitemap.xml
    Sitemap(SitemapArgs),

    /// Apply a prompt pattern to a task
    Playground(PlaygroundArgs),

    /// Manage admin sessions
    Session(SessionArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(short, long, help = "Address to bind (overrides config)")]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct SeedArgs {
    #[arg(help = "JSON bundle with prompts, patterns, workflows, aiModels and aiTools")]
    pub file: PathBuf,

    #[arg(long, help = "Validate the bundle without writing anything")]
    pub dry_run: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Prompts,
    Patterns,
    Workflows,
    Models,
    Tools,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(value_enum, default_value = "prompts")]
    pub kind: ContentKind,

    #[arg(short, long, help = "Free-text filter (prompts only)")]
    pub query: Option<String>,

    #[arg(long, help = "Filter by category")]
    pub category: Option<String>,

    #[arg(short, long, help = "Filter by tag (prompts only)")]
    pub tag: Option<String>,

    #[arg(long, help = "Include private, draft and inactive entries")]
    pub all: bool,

    #[arg(short, long, value_enum, default_value = "simple")]
    pub format: ListFormat,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFormat {
    Simple,
    Detailed,
    Json,
}

#[derive(Args)]
pub struct SitemapArgs {
    #[arg(short, long, help = "Write to a file instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PlaygroundArgs {
    #[arg(help = "Pattern template to apply; omit to list templates")]
    pub pattern: Option<String>,

    #[arg(short, long, help = "Task the pattern is applied to")]
    pub task: Option<String>,

    #[arg(long = "var", value_name = "NAME=VALUE", help = "Template variable value")]
    pub vars: Vec<String>,
}

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand, Clone)]
pub enum SessionCommands {
    /// Issue a session token for an operator
    Create {
        #[arg(long)]
        email: String,

        #[arg(long, default_value = "admin")]
        role: String,
    },

    /// Revoke a session token
    Revoke { token: String },

    /// Remove expired sessions
    Purge,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["engify", "list"]).unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.kind, ContentKind::Prompts);
                assert_eq!(args.format, ListFormat::Simple);
                assert!(!args.all);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["engify", "stats", "--debug", "-c", "/tmp/engify.toml"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/engify.toml")));
    }

    #[test]
    fn test_session_create() {
        let cli = Cli::try_parse_from(["engify", "session", "create", "--email", "ops@engify.ai"]).unwrap();
        match cli.command {
            Commands::Session(SessionArgs {
                command: SessionCommands::Create { email, role },
            }) => {
                assert_eq!(email, "ops@engify.ai");
                assert_eq!(role, "admin");
            }
            _ => panic!("expected session create"),
        }
    }

    #[test]
    fn test_playground_vars() {
        let cli = Cli::try_parse_from([
            "engify", "playground", "persona", "--task", "Review", "--var", "role=a DBA",
        ])
        .unwrap();
        match cli.command {
            Commands::Playground(args) => {
                assert_eq!(args.pattern.as_deref(), Some("persona"));
                assert_eq!(args.vars, vec!["role=a DBA".to_string()]);
            }
            _ => panic!("expected playground"),
        }
    }
}
