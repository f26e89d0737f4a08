//! Server configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use srs_core::SchedulerConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub save_debounce: Duration,
    pub save_max_wait: Duration,
    pub scheduler: SchedulerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: PathBuf::from("./data"),
            save_debounce: Duration::from_millis(500),
            save_max_wait: Duration::from_secs(5),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - HOST, PORT: bind address
    /// - SRS_DATA_DIR: directory holding `catalog.json` and `history.json`
    /// - SRS_SAVE_DEBOUNCE_MS: quiet period before history is written
    /// - SRS_SAVE_MAX_WAIT_MS: longest a change waits under steady traffic
    /// - SRS_CONFIG: optional path to a scheduler config JSON file
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?,
            None => defaults.port,
        };

        let millis = |name: &str, default: Duration| -> anyhow::Result<Duration> {
            match var(name) {
                Some(ms) => Ok(Duration::from_millis(ms.parse().with_context(|| {
                    format!("{name} must be milliseconds, got {ms:?}")
                })?)),
                None => Ok(default),
            }
        };
        let save_debounce = millis("SRS_SAVE_DEBOUNCE_MS", defaults.save_debounce)?;
        let save_max_wait = millis("SRS_SAVE_MAX_WAIT_MS", defaults.save_max_wait)?;

        let scheduler = match var("SRS_CONFIG") {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read scheduler config {path}"))?;
                SchedulerConfig::from_json(&json)
                    .with_context(|| format!("invalid scheduler config {path}"))?
            }
            None => defaults.scheduler,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            data_dir: var("SRS_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            save_debounce,
            save_max_wait,
            scheduler,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.save_debounce, Duration::from_millis(500));
        assert_eq!(config.save_max_wait, Duration::from_secs(5));
        assert_eq!(config.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn test_overrides_from_env() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("SRS_DATA_DIR", "/var/lib/srs"),
            ("SRS_SAVE_DEBOUNCE_MS", "50"),
            ("SRS_SAVE_MAX_WAIT_MS", "2000"),
        ]))
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/srs"));
        assert_eq!(config.save_debounce, Duration::from_millis(50));
        assert_eq!(config.save_max_wait, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_scheduler_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduler.json");
        std::fs::write(&path, r#"{ "default_queue_limit": 20 }"#).unwrap();

        let config =
            ServerConfig::from_lookup(lookup(&[("SRS_CONFIG", path.to_str().unwrap())])).unwrap();
        assert_eq!(config.scheduler.default_queue_limit, 20);
    }
}
