use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use lostprop::config::Config;
use lostprop::export::{write_csv, write_flare};
use lostprop::feed::{fetch, parse_feed};
use lostprop::server;

#[derive(Parser, Debug)]
#[command(
    name = "lostprop",
    about = "Exports the MTA lost property feed as CSV and flare JSON"
)]
struct Args {
    /// Path to the TOML config file
    #[arg(long, value_name = "FILE", default_value = "lostprop.toml")]
    config: PathBuf,

    /// Serve the output directory over HTTP instead of running the export
    #[arg(long)]
    serve: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config).context("Failed to load configuration")?;

    if args.serve {
        server::serve(config.port, &config.output_dir)
            .await
            .context("File server failed")?;
        return Ok(());
    }

    run_pipeline(&config).await
}

/// Fetch, parse once, then write both exports from the same tree.
async fn run_pipeline(config: &Config) -> Result<()> {
    let client = reqwest::Client::new();
    let xml = fetch(&client, &config.feed_url)
        .await
        .context("Failed to fetch the lost property feed")?;
    let categories = parse_feed(&xml).context("Failed to parse the lost property feed")?;

    let csv_path = config.csv_path();
    write_csv(&categories, &csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    let json_path = config.json_path();
    write_flare(&categories, &json_path)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    let subcategories: usize = categories.iter().map(|c| c.subcategories.len()).sum();
    tracing::info!(
        categories = categories.len(),
        subcategories = subcategories,
        csv = %csv_path.display(),
        json = %json_path.display(),
        "Export complete"
    );
    Ok(())
}
