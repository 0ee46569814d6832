// Record source wiring from configuration
use crate::application::record_repository::RecordRepository;
use crate::infrastructure::config::{StoreBackend, StoreSettings};
use crate::infrastructure::fleet_generator::FleetGenerator;
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::infrastructure::memory_repository::InMemoryRepository;
use anyhow::Context;
use std::sync::Arc;

/// Build the configured record source; an in-memory store is seeded with a
/// synthetic fleet when seeding is enabled.
pub async fn connect(settings: &StoreSettings) -> anyhow::Result<Arc<dyn RecordRepository>> {
    match settings.backend {
        StoreBackend::Influx => {
            let influx = settings
                .influx
                .as_ref()
                .context("store.influx settings are required for the influx backend")?;
            tracing::info!(host = %influx.host, database = %influx.database, "Using InfluxDB record source");
            Ok(Arc::new(InfluxRepository::new(influx)))
        }
        StoreBackend::Memory => {
            let repository = Arc::new(InMemoryRepository::new());
            if settings.seed.enabled {
                seed_fleet(repository.as_ref(), settings.seed.records_per_machine, settings.seed.rng_seed).await?;
            }
            Ok(repository)
        }
    }
}

/// Generate a synthetic fleet and write every lathe's history to `repository`
pub async fn seed_fleet(
    repository: &dyn RecordRepository,
    records_per_machine: usize,
    rng_seed: u64,
) -> anyhow::Result<usize> {
    let fleet = FleetGenerator::new(rng_seed)?.generate(records_per_machine, chrono::Utc::now());

    let mut written = 0;
    for (machine_id, records) in &fleet {
        repository
            .write_records(*machine_id, records)
            .await
            .with_context(|| format!("Failed to seed lathe {}", machine_id))?;
        written += records.len();
    }

    tracing::info!(machines = fleet.len(), records = written, rng_seed, "Seeded synthetic fleet");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::SeedSettings;

    #[tokio::test]
    async fn test_memory_backend_is_seeded() {
        let settings = StoreSettings {
            backend: StoreBackend::Memory,
            influx: None,
            seed: SeedSettings {
                enabled: true,
                records_per_machine: 20,
                rng_seed: 42,
            },
        };
        let repository = connect(&settings).await.unwrap();

        assert_eq!(repository.list_machine_ids().await.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(repository.fetch_all(4).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let settings = StoreSettings {
            seed: SeedSettings {
                enabled: false,
                ..SeedSettings::default()
            },
            ..StoreSettings::default()
        };
        let repository = connect(&settings).await.unwrap();
        assert!(repository.list_machine_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_influx_backend_requires_settings() {
        let settings = StoreSettings {
            backend: StoreBackend::Influx,
            ..StoreSettings::default()
        };
        assert!(connect(&settings).await.is_err());
    }
}
