use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use alumni_dashboard::assistant::{Assistant, CompletionClient, OpenAiClient};
use alumni_dashboard::config::Config;
use alumni_dashboard::dataset::{self, Dataset, DatasetCache};
use alumni_dashboard::export;
use alumni_dashboard::logging;
use alumni_dashboard::observability::metrics;
use alumni_dashboard::query::{DirectoryView, FilterSpec, InsightsView};
use alumni_dashboard::server::{self, AppState};
use alumni_dashboard::types::AlumniRecord;

#[derive(Parser)]
#[command(name = "alumni_dashboard")]
#[command(about = "Alumni directory: normalize survey responses, browse, export and ask")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Survey CSV or workbook to load, overriding config and environment
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP dashboard API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the filtered directory
    List {
        /// Case-insensitive match on name, company and position
        #[arg(long)]
        search: Option<String>,
        /// Industry to include (repeatable)
        #[arg(long)]
        industry: Vec<String>,
        /// Location to include (repeatable)
        #[arg(long)]
        location: Vec<String>,
        #[arg(long)]
        year_min: Option<i32>,
        #[arg(long)]
        year_max: Option<i32>,
    },
    /// Print summary cards and chart series
    Insights,
    /// Write the consenting alumni to a CSV file, or a workbook for `.xlsx`
    Export {
        #[arg(long, default_value = alumni_dashboard::constants::DEFAULT_EXPORT_FILENAME)]
        output: PathBuf,
    },
    /// Ask the assistant a question about the data
    Ask { question: String },
}

fn build_spec(
    search: Option<String>,
    industries: Vec<String>,
    locations: Vec<String>,
    year_min: Option<i32>,
    year_max: Option<i32>,
) -> FilterSpec {
    let mut spec = FilterSpec::new();
    if let Some(text) = search {
        spec = spec.with_search(text);
    }
    for industry in industries {
        spec = spec.with_industry(industry);
    }
    for location in locations {
        spec = spec.with_location(location);
    }
    if year_min.is_some() || year_max.is_some() {
        spec = spec.with_year_range(year_min.unwrap_or(i32::MIN), year_max.unwrap_or(i32::MAX));
    }
    spec
}

fn build_assistant(config: &Config) -> Option<Assistant<dyn CompletionClient>> {
    match OpenAiClient::from_config(&config.assistant) {
        Ok(client) => {
            let client: Box<dyn CompletionClient> = Box::new(client);
            Some(Assistant::new(client))
        }
        Err(e) => {
            warn!("Assistant disabled: {}", e);
            None
        }
    }
}

/// One question with no history. A failed request is an error so the process
/// exits non-zero.
async fn ask_once<C: CompletionClient + ?Sized>(
    assistant: &Assistant<C>,
    records: &[AlumniRecord],
    question: &str,
) -> Result<String> {
    assistant
        .ask(records, &[], question)
        .await
        .context("Assistant request failed")
}

/// Load the dataset or report why it is unavailable and exit non-zero.
fn require_dataset(cache: &DatasetCache) -> Arc<Dataset> {
    match cache.get() {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ Could not load alumni data from {}", e.path);
            eprintln!("   Reason: {}", e.reason);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = cli.data {
        config.data.path = path;
    }
    let locations = config.location_table().context("Failed to load location table")?;
    let cache = dataset::init_global(DatasetCache::new(config.data.path.clone(), locations));

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{}:{}", config.server.host, port)
                .parse()
                .with_context(|| format!("Invalid listen address {}:{}", config.server.host, port))?;

            let mut state = AppState::new(cache.clone());
            match metrics::init() {
                Ok(handle) => state = state.with_metrics(handle),
                Err(e) => warn!("Metrics disabled: {}", e),
            }
            if let Some(assistant) = build_assistant(&config) {
                state = state.with_assistant(assistant);
            }

            // Warm the cache so a bad file shows up in the startup log
            match cache.get() {
                Ok(dataset) => info!(records = dataset.len(), "Dataset loaded"),
                Err(e) => warn!("Starting without data: {}", e),
            }

            server::start_server(state, addr)
                .await
                .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;
        }
        Commands::List {
            search,
            industry,
            location,
            year_min,
            year_max,
        } => {
            let dataset = require_dataset(&cache);
            let spec = build_spec(search, industry, location, year_min, year_max);
            let view = DirectoryView::evaluate(dataset.records(), &spec);

            println!("📇 {}", view.summary());
            for row in &view.rows {
                let year = row.graduation_year.map(|y| y.to_string()).unwrap_or_default();
                println!(
                    "   {} <{}> | {} | {} | {} | {} | {}",
                    row.name, row.email, year, row.company, row.position, row.industry, row.current_location
                );
            }
        }
        Commands::Insights => {
            let dataset = require_dataset(&cache);
            let view = InsightsView::from_records(dataset.records());

            println!("\n📊 Alumni insights:");
            println!("   Total alumni: {}", view.total);
            println!("   Top industry: {}", view.top_industry);
            println!("   Most popular position: {}", view.top_position);

            println!("\n🏢 Industries:");
            for entry in &view.industry_chart {
                println!("   {}: {}", entry.value, entry.count);
            }
            println!("\n🗺️  Regions:");
            for entry in &view.region_counts {
                println!("   {}: {}", entry.value, entry.count);
            }
            println!("\n🎓 Graduation years:");
            for entry in &view.year_counts {
                println!("   {}: {}", entry.value, entry.count);
            }
        }
        Commands::Export { output } => {
            export::ensure_not_source(&output, &config.data.path)?;
            let dataset = require_dataset(&cache);
            let written = export::export_to_file(dataset.records(), &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✅ Exported {} alumni to {}", written, output.display());
        }
        Commands::Ask { question } => {
            let dataset = require_dataset(&cache);
            let Some(assistant) = build_assistant(&config) else {
                println!("❌ The assistant needs OPENAI_API_KEY to be set");
                std::process::exit(1);
            };

            let answer = ask_once(&assistant, dataset.records(), &question).await?;
            println!("🤖 {}", answer);
        }
    }

    Ok(())
}
