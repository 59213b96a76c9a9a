//! Command-line interface for geo-enrich
//!
//! # Usage Examples
//!
//! ```bash
//! # Enrich records from 'message' into 'messageWithCountry'
//! geo-enrich \
//!   --brokers localhost:9092 \
//!   --dataset-path /var/lib/geoip/GeoLite2-Country.mmdb
//!
//! # Bounded run with an explicit group identity and two consumers
//! geo-enrich \
//!   --application-id telnet-enricher \
//!   --brokers kafka-1:9092,kafka-2:9092 \
//!   --dataset-path ./GeoLite2-Country.mmdb \
//!   --num-consumers 2 \
//!   --max-messages 10000 --timeout 600
//! ```
//!
//! The process runs until stopped. Startup failures (missing or corrupt
//! database, consumer creation failure) exit with a non-zero status.

use anyhow::Context;
use clap::Parser;
use geo_enrich::{run_enrichment, Config};
use geo_enrich_geoip::CountryDb;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "geo-enrich")]
#[command(about = "Tags Kafka event records with the country of their source IP")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let db = CountryDb::open(&cli.config.dataset_path).with_context(|| {
        format!(
            "Failed to load country database from {:?}",
            cli.config.dataset_path
        )
    })?;
    tracing::info!(
        "Loaded country database from {:?}",
        cli.config.dataset_path
    );

    run_enrichment(cli.config, Arc::new(db)).await
}
