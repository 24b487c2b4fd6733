//! CLI for running one extraction from the terminal
//!
//! Fetches a listing (or reads saved HTML) and prints the summary, or the
//! full record as JSON with `--json`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use listing_extraction::{ExtractOptions, ListingRecord};
use listing_server::{server::build_extractor, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "extract_cli")]
#[command(about = "Extract a marketplace listing into a structured record")]
struct Cli {
    /// Listing URL to fetch
    #[arg(value_name = "URL", required_unless_present = "file")]
    listing_url: Option<String>,

    /// Fetch through the rendering proxy (needs RENDERING_PROXY_API_KEY)
    #[arg(long, conflicts_with = "file")]
    render: bool,

    /// Print the full record as JSON instead of the summary
    #[arg(long)]
    json: bool,

    /// Read HTML from a saved page instead of fetching
    #[arg(long, value_name = "PATH", conflicts_with = "listing_url")]
    file: Option<PathBuf>,

    /// URL the saved page came from (with --file)
    #[arg(long = "url", value_name = "URL", requires = "file")]
    page_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,listing_extraction=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let extractor = build_extractor(&config)?;

    let record = match (&cli.file, &cli.listing_url) {
        (Some(path), _) => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            extractor
                .extract_from_html(cli.page_url.as_deref(), &html)
                .await?
        }
        (None, Some(url)) => {
            let options = ExtractOptions {
                use_rendering_proxy: cli.render,
            };
            extractor.extract_listing(url, options).await?
        }
        (None, None) => bail!("either a URL or --file is required"),
    };

    print_record(&record, cli.json)
}

fn print_record(record: &ListingRecord, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(record).context("Failed to serialize record")?
        );
    } else {
        println!("{}", record.summary);
        if !record.missing_fields.is_empty() {
            eprintln!("\nmissing: {}", record.missing_fields.join(", "));
        }
    }
    Ok(())
}
