//! Maintenance CLI for the Family Moments database
//!
//! Each command prints a single JSON line so scripts can parse the result.

use anyhow::Result;
use clap::{Parser, Subcommand};
use family_core::config::DatabaseConfig;
use family_core::domains::family::reconcile_family_links;
use family_core::domains::users::PgUserStore;
use family_core::kernel::db;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "family_admin")]
#[command(about = "Database maintenance for the Family Moments server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending SQL migrations
    Migrate,

    /// Add the missing reverse edge for every one-sided family membership
    ReconcileFamilies {
        /// Only count one-sided memberships
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dry_run: Option<bool>,
}

fn output(resp: Response) -> Result<()> {
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => cmd_migrate().await,
        Commands::ReconcileFamilies { dry_run } => cmd_reconcile(dry_run).await,
    };

    if let Err(e) = &result {
        output(Response {
            success: false,
            message: Some(format!("{:#}", e)),
            count: None,
            dry_run: None,
        })?;
    }
    result
}

async fn get_pool() -> Result<PgPool> {
    let config = DatabaseConfig::from_env()?;
    db::connect(&config.database_url, config.db_timeout).await
}

async fn cmd_migrate() -> Result<()> {
    let pool = get_pool().await?;
    db::migrate(&pool).await?;

    output(Response {
        success: true,
        message: Some("Migrations applied".to_string()),
        count: None,
        dry_run: None,
    })
}

async fn cmd_reconcile(dry_run: bool) -> Result<()> {
    let pool = get_pool().await?;
    let users = PgUserStore::new(pool);
    let count = reconcile_family_links(&users, dry_run).await?;

    output(Response {
        success: true,
        message: None,
        count: Some(count),
        dry_run: Some(dry_run),
    })
}
