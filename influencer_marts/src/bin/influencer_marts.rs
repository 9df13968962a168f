use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use influencer_marts::cache::MartCache;
use influencer_marts::config::{MartsConfig, load_config_path};
use influencer_marts::db::{connection, migrate, views};
use influencer_marts::filter::Selection;
use influencer_marts::import::{ImportOptions, import_snapshot, load_snapshot_path};
use influencer_marts::report::Report;

#[derive(Parser)]
#[command(version, about = "Influencer campaign marts CLI")]
struct Cli {
    /// TOML config; DATABASE_URL is used when it names no database.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create or upgrade the raw tables.
    Migrate,
    /// Replace the raw tables with a JSON snapshot.
    Import {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild the SQL reporting views.
    Views,
    /// Print KPIs and breakdowns for a selection.
    Report {
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<NaiveDate>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<NaiveDate>,
        #[arg(long = "brand", value_name = "BRAND")]
        brands: Vec<String>,
        #[arg(long = "product", value_name = "PRODUCT")]
        products: Vec<String>,
        #[arg(long = "platform", value_name = "PLATFORM")]
        platforms: Vec<String>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn narrow(all: HashSet<String>, chosen: Vec<String>) -> HashSet<String> {
    if chosen.is_empty() { all } else { chosen.into_iter().collect() }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => MartsConfig::default(),
    };
    cfg.logging.init();
    let db_url = cfg.database_url()?;

    match cli.cmd {
        Cmd::Migrate => {
            migrate::run_all(&db_url)?;
        }
        Cmd::Import { file, dry_run } => {
            let snapshot = load_snapshot_path(&file)?;
            let mut conn = connection::connect_sqlite(&db_url)?;
            let summary = import_snapshot(&mut conn, &snapshot, ImportOptions { dry_run })?;
            println!("{summary}");
        }
        Cmd::Views => {
            let mut conn = connection::connect_sqlite(&db_url)?;
            views::rebuild_views(&mut conn, &cfg.rates)?;
            let counts = views::view_row_counts(&mut conn)?;
            println!(
                "payments_log: {}  enriched_orders: {}  influencer_performance: {}",
                counts.payments_log, counts.enriched_orders, counts.influencer_performance
            );
        }
        Cmd::Report {
            start,
            end,
            brands,
            products,
            platforms,
            format,
        } => {
            let mut conn = connection::connect_sqlite(&db_url)?;
            let cache = MartCache::new();
            let marts = cache.refresh(&mut conn, &cfg.rates)?;

            let all = Selection::everything(&marts);
            let selection = Selection {
                start: start.unwrap_or(all.start),
                end: end.unwrap_or(all.end),
                brands: narrow(all.brands, brands),
                products: narrow(all.products, products),
                platforms: narrow(all.platforms, platforms),
            };

            let report = Report::build(&marts, &selection, cfg.rates.profit_margin_factor);
            match format {
                Format::Text => println!("{report}"),
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("serialize report")?
                ),
            }
        }
    }

    Ok(())
}
