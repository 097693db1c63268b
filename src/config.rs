use crate::profitability::{DEFAULT_LIMIT, DEFAULT_MIN_PROFIT_PERCENTAGE};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {1}: {0}")]
    Read(#[source] std::io::Error, String),
    #[error("could not parse config file {1}: {0}")]
    Parse(#[source] serde_yaml::Error, String),
    #[error("invalid PORT value: {0}")]
    Port(String),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Table holding one row per item and city.
    pub table: String,
    pub min_profit_percentage: f64,
    pub result_limit: usize,
    pub reconnect_delay_secs: u64,
    pub health_check_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite:albion-data.db".to_string(),
            table: "items".to_string(),
            min_profit_percentage: DEFAULT_MIN_PROFIT_PERCENTAGE,
            result_limit: DEFAULT_LIMIT,
            reconnect_delay_secs: 5,
            health_check_secs: 30,
            fetch_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Reads the YAML file named by `CONFIG_PATH` (or `config.yaml`), then
    /// applies the `PORT` and `DATABASE_URL` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = lookup("CONFIG_PATH").unwrap_or(DEFAULT_CONFIG_PATH.to_string());

        Self::from_file(Path::new(&path))?.apply_env(lookup)
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().map_err(|_| ConfigError::Port(port))?;
        }
        if let Some(database_url) = lookup("DATABASE_URL") {
            self.database_url = database_url;
        }

        Ok(self)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", display);
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Read(e, display)),
        };

        Self::from_yaml(&contents).map_err(|e| ConfigError::Parse(e, display))
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("port: 8080\ntable: item_prices\n").unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.table, "item_prices");
        assert_eq!(config.min_profit_percentage, 15.0);
        assert_eq!(config.result_limit, 100);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::from_file(Path::new("./does-not-exist.yaml")).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(AppConfig::from_yaml("port: [not a number]").is_err());
    }

    #[test]
    fn port_variable_overrides_the_file() {
        let config = AppConfig::default().apply_env(env(&[("PORT", "8080")])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite:albion-data.db");
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let result = AppConfig::default().apply_env(env(&[("PORT", "abc")]));

        assert!(matches!(result, Err(ConfigError::Port(port)) if port == "abc"));
    }

    #[test]
    fn database_url_variable_replaces_the_store() {
        let config = AppConfig::default()
            .apply_env(env(&[("DATABASE_URL", "sqlite:/data/market.db")]))
            .unwrap();

        assert_eq!(config.database_url, "sqlite:/data/market.db");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn config_path_variable_selects_the_file() {
        let path = std::env::temp_dir().join(format!("albion-margins-{}.yaml", std::process::id()));
        std::fs::write(&path, "port: 4000
table: market
").unwrap();

        let config = AppConfig::load_with(env(&[
            ("CONFIG_PATH", path.to_str().unwrap()),
            ("PORT", "4100"),
        ]));
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.table, "market");
        assert_eq!(config.port, 4100);
    }
}
