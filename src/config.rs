use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::convert::ConvertOptions;
use crate::promql::QueryOptions;

/// Top-level config loaded from `converter.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ConverterConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub datasource: DatasourceConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Directory holding PrometheusRule `*.yaml` files.
    #[serde(default = "default_alerts_dir")]
    pub alerts_dir: PathBuf,
    /// Directory the Grafana provisioning files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            alerts_dir: default_alerts_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_alerts_dir() -> PathBuf {
    PathBuf::from("alerts")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("grafana-alerts")
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatasourceConfig {
    /// Grafana uid of the Prometheus datasource. Usually templated per environment.
    #[serde(default = "default_datasource_uid")]
    pub uid: String,
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: u64,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_data_points")]
    pub max_data_points: u64,
}

impl Default for DatasourceConfig {
    fn default() -> Self {
        Self {
            uid: default_datasource_uid(),
            lookback_secs: default_lookback_secs(),
            interval_ms: default_interval_ms(),
            max_data_points: default_max_data_points(),
        }
    }
}

fn default_datasource_uid() -> String {
    "prometheus".to_string()
}

fn default_lookback_secs() -> u64 {
    600
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_data_points() -> u64 {
    43200
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    #[serde(default = "default_group_interval")]
    pub group_interval: String,
    #[serde(default = "default_for_duration")]
    pub for_duration: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            group_interval: default_group_interval(),
            for_duration: default_for_duration(),
        }
    }
}

fn default_group_interval() -> String {
    "30s".to_string()
}

fn default_for_duration() -> String {
    "0s".to_string()
}

impl ConverterConfig {
    /// Load config from a TOML file. Returns defaults if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: ConverterConfig = toml::from_str(&contents)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `ALERTS_DIR`, `GRAFANA_ALERTS_DIR` and `PROMETHEUS_DATASOURCE_UID`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("ALERTS_DIR") {
            self.paths.alerts_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("GRAFANA_ALERTS_DIR") {
            self.paths.output_dir = PathBuf::from(dir);
        }
        if let Some(uid) = lookup("PROMETHEUS_DATASOURCE_UID") {
            self.datasource.uid = uid;
        }
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            query: QueryOptions {
                datasource_uid: self.datasource.uid.clone(),
                lookback_secs: self.datasource.lookback_secs,
                interval_ms: self.datasource.interval_ms,
                max_data_points: self.datasource.max_data_points,
            },
            default_for: self.defaults.for_duration.clone(),
            default_interval: self.defaults.group_interval.clone(),
        }
    }
}
