use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod discover;

#[derive(Debug, Parser)]
#[command(name = "prospect-cli")]
#[command(about = "Prospect discovery command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run (or resume) a discovery campaign
    Discover {
        /// Campaign YAML file; defaults to `PROSPECT_CAMPAIGN_PATH`
        #[arg(long)]
        campaign: Option<PathBuf>,
        /// Resume the campaign with this id instead of creating one
        #[arg(long)]
        resume: Option<i64>,
        /// Keep all results in memory instead of writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = prospect_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Discover {
            campaign,
            resume,
            dry_run,
        }) => {
            let path = campaign.unwrap_or_else(|| config.campaign_path.clone());
            let result = discover::run_discover(&config, &path, resume, dry_run).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
        }
        Some(Commands::Db { command }) => {
            let pool = discover::connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    prospect_db::ping(&pool).await?;
                    println!("database reachable");
                }
                DbCommands::Migrate => {
                    let applied = prospect_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        None => println!("nothing to do; try `prospect-cli discover --help`"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
