use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use csvdash::{
    config::Config,
    dashboard::{prepare_charts, DashboardFilter},
    process::Value,
    sample::{self, Profile},
    storage::{DashboardSlot, FileStorage},
    upload,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Load CSV sales data into the dashboard slot and render its views as JSON.
#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse, validate and process a CSV file, then store it for the dashboard
    Upload { file: PathBuf },
    /// Print a generated demo dataset (retail, ecommerce, marketing, sales)
    Sample { profile: Option<Profile> },
    /// Chart series for the stored dataset, or the default sample if none
    Dashboard {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) config + args ────────────────────────────────────────────
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.cmd {
        Command::Upload { file } => run_upload(&file, &config).await,
        Command::Sample { profile } => {
            let profile = profile.unwrap_or(config.default_profile);
            let data = sample::sample_dashboard(profile, &mut rand::thread_rng());
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Command::Dashboard { category, region } => {
            let filter = DashboardFilter {
                category: category.map(Value::text),
                region: region.map(Value::text),
            };
            run_dashboard(&filter, &config)
        }
    }
}

async fn run_upload(path: &Path, config: &Config) -> Result<()> {
    // ─── 3) parse → validate → process ───────────────────────────────
    let upload = match upload::ingest_file(path, config).await {
        Ok(u) => u,
        Err(e) => {
            error!("{} rejected: {}", path.display(), e);
            return Err(e.into());
        }
    };

    // ─── 4) hand off to the dashboard slot ───────────────────────────
    let slot = DashboardSlot::new(FileStorage::new(&config.data_dir)?);
    slot.save(&upload.data)?;
    info!(dir = %config.data_dir.display(), "dashboard data stored");

    println!("{}", serde_json::to_string_pretty(&upload.preview)?);
    println!("{}", serde_json::to_string_pretty(&upload.data.summary)?);
    Ok(())
}

fn run_dashboard(filter: &DashboardFilter, config: &Config) -> Result<()> {
    let slot = DashboardSlot::new(FileStorage::new(&config.data_dir)?);
    let data = slot.load_or_sample(
        config.default_profile,
        Utc::now().date_naive(),
        &mut rand::thread_rng(),
    );
    let charts = prepare_charts(&data.raw_data, filter);
    println!("{}", serde_json::to_string_pretty(&charts)?);
    Ok(())
}
