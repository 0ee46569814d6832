// Writes a synthetic lathe fleet into the configured record source
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lathe_health::infrastructure::config::{load_app_config_from, StoreBackend};
use lathe_health::infrastructure::store;

#[derive(Debug, Parser)]
#[command(about = "Generate synthetic lathe histories and write them to the record source.")]
struct Args {
    /// Config file path, without extension.
    #[arg(long, default_value = "config/lathe_health")]
    config: String,

    /// Records generated per lathe (one per hour, newest now).
    #[arg(long)]
    records_per_machine: Option<usize>,

    /// RNG seed for deterministic generation.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let app_config = load_app_config_from(&args.config)?;

    let mut store_settings = app_config.store.clone();
    if store_settings.backend == StoreBackend::Memory {
        tracing::warn!("store.backend is \"memory\"; generated records are discarded on exit");
    }
    // Seeding is explicit here, not a side effect of connecting.
    store_settings.seed.enabled = false;

    let repository = store::connect(&store_settings).await?;
    let records_per_machine = args
        .records_per_machine
        .unwrap_or(app_config.store.seed.records_per_machine);
    let rng_seed = args.seed.unwrap_or(app_config.store.seed.rng_seed);

    let written = store::seed_fleet(repository.as_ref(), records_per_machine, rng_seed)
        .await
        .context("Seeding failed")?;
    tracing::info!(records = written, "Data generation and upload complete");

    Ok(())
}
