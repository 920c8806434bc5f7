//! Command-line interface for school-sync
//!
//! # Usage Examples
//!
//! ```bash
//! # Sync the whole dataset in one request
//! school-sync --config school-sync.toml full
//!
//! # Paginated sync, 100 records per page, page-number cursor
//! school-sync --config school-sync.toml paginated --limit 100 --mode page
//!
//! # Record-offset cursor, skip the confirmation prompt
//! school-sync paginated --mode record --yes
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use school_sync::config::SyncConfig;
use school_sync::sync::{AssumeYes, StdinConfirm, SyncDriver};
use school_sync_giga_source::{GigaSource, SourceOpts};
use school_sync_postgres_store::{PostgresStore, StoreOpts};
use std::path::PathBuf;
use sync_core::{Confirm, PaginationMode};
use tracing::info;

#[derive(Parser)]
#[command(name = "school-sync")]
#[command(about = "Sync school records from the Giga school-master API into PostgreSQL")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, env = "SCHOOL_SYNC_CONFIG", default_value = "school-sync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the whole dataset in a single request and sync it
    Full {
        #[command(flatten)]
        overrides: RunOverrides,
    },
    /// Walk the source page by page and sync each page
    Paginated {
        #[command(flatten)]
        overrides: RunOverrides,

        /// Page size
        #[arg(long)]
        limit: Option<u64>,

        /// How the cursor advances between pages
        #[arg(long, value_enum)]
        mode: Option<CursorMode>,

        /// Answer yes to the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Args)]
struct RunOverrides {
    /// Destination database connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Source API endpoint URL
    #[arg(long, env = "SOURCE_API_URL")]
    source_url: Option<String>,

    /// Source API bearer token
    #[arg(long, env = "SOURCE_API_TOKEN")]
    source_token: Option<String>,

    /// Report what would be inserted without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CursorMode {
    /// Offset increases by 1 per page (page numbers)
    Page,
    /// Offset increases by the page size (record offsets)
    Record,
}

impl From<CursorMode> for PaginationMode {
    fn from(mode: CursorMode) -> Self {
        match mode {
            CursorMode::Page => PaginationMode::PageAdvance,
            CursorMode::Record => PaginationMode::RecordAdvance,
        }
    }
}

impl RunOverrides {
    fn apply(self, config: &mut SyncConfig) {
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }
        if let Some(source_url) = self.source_url {
            config.source.url = source_url;
        }
        if let Some(source_token) = self.source_token {
            config.source.token = source_token;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = SyncConfig::from_file(&cli.config)?;

    let (paginated, confirm): (bool, Box<dyn Confirm>) = match cli.command {
        Commands::Full { overrides } => {
            overrides.apply(&mut config);
            (false, Box::new(AssumeYes))
        }
        Commands::Paginated {
            overrides,
            limit,
            mode,
            yes,
        } => {
            overrides.apply(&mut config);
            if let Some(limit) = limit {
                config.source.limit = limit;
            }
            if let Some(mode) = mode {
                config.source.mode = mode.into();
            }
            let confirm: Box<dyn Confirm> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(StdinConfirm)
            };
            (true, confirm)
        }
    };

    config.validate().context("Invalid configuration")?;

    let source = GigaSource::new(SourceOpts {
        url: config.source.url.clone(),
        token: config.source.token.clone(),
        offset_param: config.source.offset_param.clone(),
        limit_param: config.source.limit_param.clone(),
    })?;

    let store = PostgresStore::connect(&StoreOpts {
        database_url: config.database_url.clone(),
        table: config.table.clone(),
        batch_size: config.batch_size,
    })
    .await?;

    let driver = SyncDriver::new(&source, &store, confirm.as_ref(), &config);
    let report = if paginated {
        driver.run_paginated().await?
    } else {
        driver.run_full().await?
    };

    if report.aborted {
        info!(
            "Sync aborted by operator: {} fetched, {} invalid, nothing inserted",
            report.fetched, report.invalid
        );
    } else {
        info!(
            "Sync complete: {} page(s), {} fetched, {} invalid, {} already present, {} inserted",
            report.pages, report.fetched, report.invalid, report.already_present, report.inserted
        );
    }
    Ok(())
}
