//! Command-line front end for Ansimssi search.
//!
//! Results are written to stdout as JSON. All tracing output goes to
//! stderr so stdout stays machine-readable.

use std::path::PathBuf;

use ansimssi::{AppConfig, SearchService};
use ansimssi_search::ApiKeys;
use anyhow::Context;
use clap::{Parser, Subcommand};

/// Multi-provider health information search
#[derive(Parser, Debug)]
#[command(name = "ansimssi-search")]
#[command(about = "Multi-provider health information search", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "ANSIMSSI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregated web search with knowledge-base and catalog fallback
    Search {
        /// Query text
        #[arg(required = true)]
        query: Vec<String>,

        /// Answer given for this query; learned if the results were live
        #[arg(long)]
        answer: Option<String>,
    },

    /// Academic and institutional document search
    Academic {
        /// Query text
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Write a config file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("ansimssi=info,ansimssi_search=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { force } => {
            let path = cli.config.unwrap_or_else(AppConfig::default_config_path);
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            AppConfig::default()
                .save_to_file(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote default config");
        }
        Commands::Search { query, answer } => {
            let query = query.join(" ");
            let service = build_service(cli.config.as_deref())?;
            let response = service.search(&query).await?;
            if let Some(answer) = answer {
                service.learn(&query, answer, &response);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
            service.shutdown().await;
        }
        Commands::Academic { query } => {
            let query = query.join(" ");
            let service = build_service(cli.config.as_deref())?;
            let papers = service.academic(&query).await;
            println!("{}", serde_json::to_string_pretty(&papers)?);
            service.shutdown().await;
        }
    }

    Ok(())
}

fn build_service(config_path: Option<&std::path::Path>) -> anyhow::Result<SearchService> {
    let config = AppConfig::load_or_default(config_path).context("failed to load config")?;
    let service = SearchService::from_config(&config, &ApiKeys::from_env())
        .context("failed to initialise search service")?;
    Ok(service)
}
