mod config;
mod normalize_cmd;
mod server;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use coresync_core::exercise::ExerciseSearchClient;
use coresync_core::generator::OpenAiCompatibleGenerator;
use coresync_core::nutrition::FatSecretClient;
use coresync_db::pool;

use config::CoresyncConfig;
use server::AppState;

#[derive(Parser)]
#[command(name = "coresync", about = "Fitness tracking API with AI-generated workout plans")]
struct Cli {
    /// Database URL (overrides CORESYNC_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a coresync config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/coresync")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database if needed and run migrations
    DbInit,
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
    /// Normalize a plan file (JSON or free text) and print the result
    Normalize {
        /// Path to the plan file
        file: PathBuf,
        /// Goal label used when the plan does not name one
        #[arg(long, default_value = "")]
        goal: String,
    },
}

/// Execute the `coresync init` command: write a config file with a fresh
/// token secret.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let token_secret = config::generate_token_secret();

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
            max_connections: None,
        },
        auth: config::AuthSection {
            token_secret: token_secret.clone(),
        },
        services: config::ServicesSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  auth.token_secret = {}...{}", &token_secret[..8], &token_secret[56..]);
    println!();
    println!("Add a [services] section for the LLM, FatSecret and ExerciseDB settings.");
    println!("Next: run `coresync db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `coresync db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = CoresyncConfig::resolve(cli_db_url)?;

    println!("Initializing coresync database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("coresync db-init complete.");
    Ok(())
}

/// Execute the `coresync serve` command.
async fn cmd_serve(cli_db_url: Option<&str>, bind: &str, port: u16) -> anyhow::Result<()> {
    let resolved = CoresyncConfig::resolve(cli_db_url)?;

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    if resolved.generator.api_key.is_none() {
        tracing::warn!("no LLM API key configured; plan generation will fail");
    }
    if resolved.fatsecret.is_none() {
        tracing::info!("FatSecret not configured; food search uses the built-in table");
    }

    let state = AppState {
        pool: db_pool.clone(),
        token_config: Arc::new(resolved.token_config),
        generator: Arc::new(OpenAiCompatibleGenerator::new(resolved.generator)?),
        foods: Arc::new(FatSecretClient::new(resolved.fatsecret)?),
        exercises: Arc::new(ExerciseSearchClient::new(resolved.exercisedb_base_url)?),
    };

    let result = server::run_serve(state, bind, port).await;
    db_pool.close().await;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            cmd_serve(cli.database_url.as_deref(), &bind, port).await?;
        }
        Commands::Normalize { file, goal } => {
            if let Err(e) = normalize_cmd::run_normalize(&file, &goal) {
                eprintln!("{e:#}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
