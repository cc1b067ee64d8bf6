// src/config.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};
use tracing::{debug, info, warn};

use crate::table::EmptyTablePolicy;

pub const DEFAULT_NASDAQ_BASE_URL: &str = "https://www.nasdaq.com";
pub const DEFAULT_ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

/// Runtime settings: defaults, then an optional YAML file, then environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub alphavantage_api_key: Option<String>,
    pub alphavantage_base_url: String,
    pub nasdaq_base_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub empty_table_policy: EmptyTablePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alphavantage_api_key: None,
            alphavantage_base_url: DEFAULT_ALPHAVANTAGE_BASE_URL.into(),
            nasdaq_base_url: DEFAULT_NASDAQ_BASE_URL.into(),
            http_timeout_secs: 30,
            user_agent: concat!("stockscraper/", env!("CARGO_PKG_VERSION")).into(),
            empty_table_policy: EmptyTablePolicy::default(),
        }
    }
}

impl Config {
    /// Loads `path` if given (a missing file is an error), then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| env::var(key).ok())?;
        debug!(nasdaq = %cfg.nasdaq_base_url, alphavantage = %cfg.alphavantage_base_url, "config loaded");
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let cfg: Self =
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;
        info!(path = %path.display(), "read config file");
        Ok(cfg)
    }

    /// Overrides fields from `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ALPHAVANTAGE_API_KEY").filter(|k| !k.is_empty()) {
            self.alphavantage_api_key = Some(key);
        }
        if let Some(url) = lookup("ALPHAVANTAGE_BASE_URL") {
            self.alphavantage_base_url = url;
        }
        if let Some(url) = lookup("NASDAQ_BASE_URL") {
            self.nasdaq_base_url = url;
        }
        if let Some(secs) = lookup("STOCKSCRAPER_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("STOCKSCRAPER_HTTP_TIMEOUT_SECS={secs:?}"))?;
        }
        if let Some(policy) = lookup("STOCKSCRAPER_EMPTY_TABLE_POLICY") {
            self.empty_table_policy = policy
                .parse()
                .with_context(|| format!("STOCKSCRAPER_EMPTY_TABLE_POLICY={policy:?}"))?;
        }
        if self.alphavantage_api_key.is_none() {
            warn!("ALPHAVANTAGE_API_KEY not set; daily price requests will fail");
        }
        Ok(())
    }

    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .context("building HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_without_file_or_env() {
        let mut cfg = Config::default();
        cfg.apply_env(|_| None).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.empty_table_policy, EmptyTablePolicy::Lenient);
    }

    #[test]
    fn yaml_then_env_overrides() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "nasdaq_base_url: http://localhost:9000\nhttp_timeout_secs: 5\nempty_table_policy: strict"
        )
        .unwrap();

        let mut cfg = Config::from_yaml_file(tmp.path()).unwrap();
        assert_eq!(cfg.nasdaq_base_url, "http://localhost:9000");
        assert_eq!(cfg.http_timeout_secs, 5);
        assert_eq!(cfg.empty_table_policy, EmptyTablePolicy::Strict);
        assert_eq!(cfg.alphavantage_base_url, DEFAULT_ALPHAVANTAGE_BASE_URL);

        let env: HashMap<&str, &str> = HashMap::from([
            ("ALPHAVANTAGE_API_KEY", "demo"),
            ("STOCKSCRAPER_HTTP_TIMEOUT_SECS", "12"),
            ("STOCKSCRAPER_EMPTY_TABLE_POLICY", "lenient"),
        ]);
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.alphavantage_api_key.as_deref(), Some("demo"));
        assert_eq!(cfg.http_timeout_secs, 12);
        assert_eq!(cfg.empty_table_policy, EmptyTablePolicy::Lenient);
        assert_eq!(cfg.nasdaq_base_url, "http://localhost:9000");
    }

    #[test]
    fn bad_env_values_are_errors() {
        let mut cfg = Config::default();
        assert!(cfg
            .apply_env(|k| (k == "STOCKSCRAPER_HTTP_TIMEOUT_SECS").then(|| "soon".to_string()))
            .is_err());
        assert!(cfg
            .apply_env(|k| (k == "STOCKSCRAPER_EMPTY_TABLE_POLICY").then(|| "maybe".to_string()))
            .is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/stockscraper.yaml"))).is_err());
    }
}
