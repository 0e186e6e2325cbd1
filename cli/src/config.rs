//! Simulator configuration with TOML file support.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tcr_params::config::serde_amount;
use tcr_params::ParamsConfig;
use tcr_types::tokens;
use tcr_utils::LogFormat;

/// Configuration for a simulated registry.
///
/// Can be loaded from a TOML file via [`TcrConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TcrConfig {
    /// Registry parameters (`[params]` table, camelCase keys).
    #[serde(default)]
    pub params: ParamsConfig,

    /// Subject categories registered before the script runs.
    #[serde(default = "default_subjects")]
    pub subjects: Vec<String>,

    /// Genesis token balances. Every genesis account has approved both
    /// escrows for an unlimited amount.
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,

    /// Simulation start time in Unix seconds. Defaults to the system clock.
    #[serde(default)]
    pub start_time: Option<u64>,

    /// Token display name.
    #[serde(default = "default_token_name")]
    pub token_name: String,

    /// Token symbol.
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisAccount {
    pub name: String,
    #[serde(with = "serde_amount")]
    pub balance: u128,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_subjects() -> Vec<String> {
    vec!["Algebra".to_string()]
}

fn default_token_name() -> String {
    "Registry Token".to_string()
}

fn default_token_symbol() -> String {
    "TCR".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TcrConfig {
    fn default() -> Self {
        Self {
            params: ParamsConfig::default(),
            subjects: default_subjects(),
            accounts: ["alice", "bob", "carol", "dave"]
                .into_iter()
                .map(|name| GenesisAccount {
                    name: name.to_string(),
                    balance: tokens(1_000),
                })
                .collect(),
            start_time: None,
            token_name: default_token_name(),
            token_symbol: default_token_symbol(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

impl TcrConfig {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid simulator config")?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = TcrConfig::from_toml_str("").unwrap();
        assert_eq!(config.subjects, vec!["Algebra"]);
        assert!(config.accounts.is_empty());
        assert_eq!(config.params, ParamsConfig::default());
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn parses_full_config() {
        let config = TcrConfig::from_toml_str(
            r#"
            subjects = ["Algebra", "Geometry"]
            start_time = 1000
            log_format = "json"

            [params]
            minDeposit = "5_000_000_000_000_000_000"
            voteQuorum = 66

            [[accounts]]
            name = "alice"
            balance = "1_000_000_000_000_000_000_000"
            "#,
        )
        .unwrap();
        assert_eq!(config.subjects.len(), 2);
        assert_eq!(config.start_time, Some(1000));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.params.min_deposit, tokens(5));
        assert_eq!(config.params.vote_quorum, 66);
        assert_eq!(config.accounts[0].balance, tokens(1_000));
    }

    #[test]
    fn invalid_params_rejected() {
        assert!(TcrConfig::from_toml_str("[params]\nvoteQuorum = 101").is_err());
        assert!(TcrConfig::from_toml_str("unknown = 1").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "subjects = [\"History\"]").unwrap();
        let config = TcrConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.subjects, vec!["History"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(TcrConfig::from_toml_file(Path::new("/nonexistent/tcr.toml")).is_err());
    }
}
