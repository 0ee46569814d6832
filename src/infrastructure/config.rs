use serde::Deserialize;

const CONFIG_FILE: &str = "config/lathe_health";
const ENV_PREFIX: &str = "LATHE_HEALTH";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub aggregation: AggregationSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct AggregationSettings {
    #[serde(default = "default_summary_window")]
    pub summary_window: usize,
    #[serde(default = "default_detail_window")]
    pub detail_window: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            summary_window: default_summary_window(),
            detail_window: default_detail_window(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Influx,
    #[default]
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub influx: Option<InfluxSettings>,
    #[serde(default)]
    pub seed: SeedSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SeedSettings {
    #[serde(default = "default_seed_enabled")]
    pub enabled: bool,
    #[serde(default = "default_records_per_machine")]
    pub records_per_machine: usize,
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            enabled: default_seed_enabled(),
            records_per_machine: default_records_per_machine(),
            rng_seed: default_rng_seed(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_summary_window() -> usize {
    50
}

fn default_detail_window() -> usize {
    100
}

fn default_measurement() -> String {
    "lathe_records".to_string()
}

fn default_seed_enabled() -> bool {
    true
}

fn default_records_per_machine() -> usize {
    1000
}

fn default_rng_seed() -> u64 {
    42
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.aggregation.summary_window == 0 || self.aggregation.detail_window == 0 {
            anyhow::bail!("aggregation windows must hold at least one record");
        }
        if self.store.backend == StoreBackend::Influx && self.store.influx.is_none() {
            anyhow::bail!("store.backend = \"influx\" requires a [store.influx] section");
        }
        Ok(())
    }
}

/// Load `config/lathe_health.*` (optional) overlaid with `LATHE_HEALTH__*` variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(CONFIG_FILE)
}

pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> anyhow::Result<AppConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    #[test]
    fn test_defaults() {
        let cfg = from_toml("").unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8000");
        assert_eq!(cfg.aggregation.summary_window, 50);
        assert_eq!(cfg.aggregation.detail_window, 100);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert!(cfg.store.seed.enabled);
        assert_eq!(cfg.store.seed.rng_seed, 42);
    }

    #[test]
    fn test_influx_section() {
        let cfg = from_toml(
            r#"
            [aggregation]
            summary_window = 25

            [store]
            backend = "influx"

            [store.influx]
            host = "http://influx:8086/"
            token = "secret"
            database = "lathe_maintenance"
            retention_policy = "autogen"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.aggregation.summary_window, 25);
        assert_eq!(cfg.aggregation.detail_window, 100);
        assert_eq!(cfg.store.backend, StoreBackend::Influx);
        let influx = cfg.store.influx.unwrap();
        assert_eq!(influx.database, "lathe_maintenance");
        assert_eq!(influx.measurement, "lathe_records");
    }

    #[test]
    fn test_rejects_invalid_settings() {
        assert!(from_toml("[aggregation]\ndetail_window = 0\n").is_err());
        assert!(from_toml("[store]\nbackend = \"influx\"\n").is_err());
    }
}
