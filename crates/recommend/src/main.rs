//! Storefront Recommend - batch-train, query-from-the-command-line driver
//!
//! Loads a CSV event export, trains the neighbor model and prints
//! recommendations for the requested users.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use storefront_core::{init_tracing, load_dotenv, ConfigLoader, TelemetryConfig};
use storefront_recommend::{EngineConfig, EventTable, RecommendError, RecommendationService};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "storefront-recommend", version, about)]
struct Cli {
    /// CSV event log with user, item and event columns
    #[arg(short, long, env = "RECOMMENDER_EVENTS_PATH")]
    events: PathBuf,

    /// User to recommend for; repeat for several users
    #[arg(short, long = "user", required = true)]
    users: Vec<String>,

    /// Number of items per user (zero or negative returns nothing)
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    top_n: Option<i64>,

    /// Also print the neighbor users behind each list
    #[arg(long)]
    similar: bool,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    load_dotenv();

    let telemetry = TelemetryConfig::from_env()?;
    init_tracing(&telemetry)?;

    let cli = Cli::parse();

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;

    let table = EventTable::from_path(&cli.events)
        .with_context(|| format!("Failed to read event log {}", cli.events.display()))?;
    info!(rows = table.len(), path = %cli.events.display(), "Loaded event log");

    let service =
        RecommendationService::new(&config).context("Invalid engine configuration")?;
    let model = service
        .train_from_table(&table)
        .context("Failed to train recommendation model")?;

    let top_n = match cli.top_n {
        Some(n) => usize::try_from(n).unwrap_or(0),
        None => model.default_top_n(),
    };

    let mut report = Vec::with_capacity(cli.users.len());
    for user in &cli.users {
        let similar = if cli.similar {
            model.similar_users(user).unwrap_or_default()
        } else {
            Vec::new()
        };

        match cli.format {
            OutputFormat::Text => {
                let items = model.recommend(user, top_n);
                println!("{}: {}", user, items.join(", "));
                for neighbor in &similar {
                    println!("  ~ {} (distance {:.4})", neighbor.user_id, neighbor.distance);
                }
            }
            OutputFormat::Json => {
                let items = match service.recommend_scored(user, top_n) {
                    Err(RecommendError::UnknownUser(_)) => Vec::new(),
                    other => other?,
                };
                report.push(serde_json::json!({
                    "user_id": user,
                    "recommendations": items,
                    "similar_users": similar,
                }));
            }
        }
    }

    if let OutputFormat::Json = cli.format {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
