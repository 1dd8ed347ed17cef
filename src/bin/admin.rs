//! CLI administration tool for url-mapper.
//!
//! Inspects and deletes mappings, prints store statistics and runs database
//! diagnostics without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a mapping
//! cargo run --bin admin -- mapping show aB3xK9q
//!
//! # Delete a mapping (asks for confirmation unless -y)
//! cargo run --bin admin -- mapping delete aB3xK9q
//!
//! # Store statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `REDIS_URL` (optional): cache to invalidate on delete
//! - `PUBLIC_PROTOCOL`, `PUBLIC_DOMAIN`, `PUBLIC_PORT`: used to print short URLs

use url_mapper::domain::repositories::MappingStore;
use url_mapper::infrastructure::cache::{CacheService, RedisCache};
use url_mapper::infrastructure::persistence::PgMappingStore;
use url_mapper::utils::short_url::PublicSite;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing url-mapper.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or delete mappings
    Mapping {
        #[command(subcommand)]
        action: MappingAction,
    },

    /// Show store statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum MappingAction {
    /// Show a mapping and its hit counters
    Show {
        /// Mapping token
        token: String,
    },

    /// Delete a mapping
    Delete {
        /// Mapping token
        token: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Mapping { action } => handle_mapping_action(action, pool).await?,
        Commands::Stats => handle_stats(pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn public_site() -> PublicSite {
    let protocol = std::env::var("PUBLIC_PROTOCOL").unwrap_or_else(|_| "http".to_string());
    let domain = std::env::var("PUBLIC_DOMAIN").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("PUBLIC_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    PublicSite::new(protocol, domain, port)
}

async fn handle_mapping_action(action: MappingAction, pool: PgPool) -> Result<()> {
    let store = PgMappingStore::new(Arc::new(pool));

    match action {
        MappingAction::Show { token } => show_mapping(&store, &token).await,
        MappingAction::Delete { token, yes } => delete_mapping(&store, &token, yes).await,
    }
}

async fn show_mapping(store: &PgMappingStore, token: &str) -> Result<()> {
    let record = store
        .find_by_mapping(token)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Mapping '{}' not found", token))?;

    let limit = if record.has_hit_limit() {
        record.max_hit_count.to_string()
    } else {
        "unlimited".to_string()
    };

    let access = if record.is_protected() {
        "password".yellow()
    } else {
        "public".green()
    };

    println!("{}", "🔗 Mapping".bright_blue().bold());
    println!();
    println!("  Token:     {}", record.mapping.cyan());
    println!("  Short URL: {}", public_site().short_url(&record.mapping).bright_white());
    println!("  Target:    {}", record.url.bright_white());
    println!("  Access:    {}", access);
    println!(
        "  Hits:      {} / {}",
        record.hit_count.to_string().bright_green().bold(),
        limit
    );
    if record.limit_reached() {
        println!("  {}", "Hit limit reached".red());
    }
    println!(
        "  Created:   {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

async fn delete_mapping(store: &PgMappingStore, token: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Mapping".bright_blue().bold());
    println!();

    let record = store
        .find_by_mapping(token)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Mapping '{}' not found", token))?;

    println!("  Token:  {}", record.mapping.cyan());
    println!("  Target: {}", record.url.bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this mapping?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = store
        .delete(token)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete mapping: {}", e))?;

    if !deleted {
        println!("{}", "⚠️  Mapping was already gone".yellow());
        return Ok(());
    }

    invalidate_cache(token).await;

    println!("{}", "✅ Mapping deleted".green().bold());
    println!();

    Ok(())
}

/// Drops the token from Redis so running servers stop resolving it.
async fn invalidate_cache(token: &str) {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        return;
    };

    match RedisCache::connect(&redis_url, 60).await {
        Ok(cache) => {
            if cache.invalidate(token).await.is_ok() {
                println!("{}", "  Cache entry invalidated".bright_black());
            }
        }
        Err(e) => {
            println!(
                "{} {}",
                "⚠️  Could not reach Redis, cached entry will expire on its own:".yellow(),
                e
            );
        }
    }
}

async fn handle_stats(pool: PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let store = PgMappingStore::new(Arc::new(pool));
    let stats = store
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Mappings:  {}",
        stats.total.to_string().bright_green().bold()
    );
    println!(
        "  Protected: {}",
        stats.protected.to_string().bright_green().bold()
    );
    println!(
        "  Hits:      {}",
        stats.total_hits.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
