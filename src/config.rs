use serde::Deserialize;

use crate::engine::YearWindow;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub period: PeriodConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMode {
    /// Entry 0 of the provider's batch already is the "all servers" snapshot.
    #[default]
    Provided,
    /// The provider lists real servers only; the aggregate is merged here.
    Merge,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// JSON file holding the per-server volume records.
    pub path: String,
    #[serde(default)]
    pub aggregate: AggregateMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    pub interval_ms: u64,
    /// How often to log refresh stats (successes, failures, live clients) at INFO level.
    pub stats_log_interval_secs: u64,
}

/// Valid-year window for manually entered periods.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodConfig {
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

fn default_min_year() -> i32 {
    YearWindow::default().min_year
}

fn default_max_year() -> i32 {
    YearWindow::default().max_year
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl PeriodConfig {
    pub fn year_window(&self) -> YearWindow {
        YearWindow {
            min_year: self.min_year,
            max_year: self.max_year,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.provider.path.is_empty(),
            "provider.path must be non-empty"
        );
        anyhow::ensure!(
            self.refresh.interval_ms > 0,
            "refresh.interval_ms must be > 0, got {}",
            self.refresh.interval_ms
        );
        anyhow::ensure!(
            self.refresh.stats_log_interval_secs > 0,
            "refresh.stats_log_interval_secs must be > 0, got {}",
            self.refresh.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.period.min_year <= self.period.max_year,
            "period.min_year ({}) must not exceed period.max_year ({})",
            self.period.min_year,
            self.period.max_year
        );
        Ok(())
    }
}
