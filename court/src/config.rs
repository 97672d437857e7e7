//! Court configuration with TOML file support.

use crate::error::CourtError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tribunal_types::{CourtParams, StakeAmount};
use tribunal_utils::LogFormat;

/// Configuration for a court instance.
///
/// Can be loaded from a TOML file via [`CourtConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Stake amounts are `u64` here
/// because TOML integers are 64-bit; [`CourtConfig::params`] widens them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtConfig {
    /// Smallest total stake a participant may hold after a deposit.
    #[serde(default = "default_min_stake")]
    pub min_stake: u64,

    /// Stake locked per selection slot won.
    #[serde(default = "default_min_stake_per_slot")]
    pub min_stake_per_slot: u64,

    /// Draws per dispute. Must be odd.
    #[serde(default = "default_selection_slots")]
    pub selection_slots: u32,

    #[serde(default = "default_commit_duration_secs")]
    pub commit_duration_secs: u64,

    #[serde(default = "default_reveal_duration_secs")]
    pub reveal_duration_secs: u64,

    /// Resampling budget per slot, as a multiple of the participant count.
    #[serde(default = "default_draw_retry_factor")]
    pub draw_retry_factor: u32,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_min_stake() -> u64 {
    100
}

fn default_min_stake_per_slot() -> u64 {
    100
}

fn default_selection_slots() -> u32 {
    5
}

fn default_commit_duration_secs() -> u64 {
    86_400
}

fn default_reveal_duration_secs() -> u64 {
    86_400
}

fn default_draw_retry_factor() -> u32 {
    CourtParams::DEFAULT_DRAW_RETRY_FACTOR
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CourtConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CourtError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CourtError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, CourtError> {
        let config: Self = toml::from_str(s).map_err(|e| CourtError::Config(e.to_string()))?;
        config.params()?;
        config.log_format()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, CourtError> {
        toml::to_string_pretty(self).map_err(|e| CourtError::Config(e.to_string()))
    }

    /// The validated court parameters.
    pub fn params(&self) -> Result<CourtParams, CourtError> {
        let params = CourtParams {
            min_stake: StakeAmount::from(self.min_stake),
            min_stake_per_slot: StakeAmount::from(self.min_stake_per_slot),
            selection_slots: self.selection_slots,
            commit_duration_secs: self.commit_duration_secs,
            reveal_duration_secs: self.reveal_duration_secs,
            draw_retry_factor: self.draw_retry_factor,
        };
        params.validate()?;
        Ok(params)
    }

    /// Install the global tracing subscriber with this file's format and level.
    pub fn init_logging(&self) -> Result<(), CourtError> {
        tribunal_utils::try_init_logging(self.log_format()?, &self.log_level)
            .map_err(|e| CourtError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, CourtError> {
        self.log_format
            .parse()
            .map_err(|e: tribunal_utils::LoggingError| CourtError::Config(e.to_string()))
    }
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            min_stake: default_min_stake(),
            min_stake_per_slot: default_min_stake_per_slot(),
            selection_slots: default_selection_slots(),
            commit_duration_secs: default_commit_duration_secs(),
            reveal_duration_secs: default_reveal_duration_secs(),
            draw_retry_factor: default_draw_retry_factor(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tribunal_types::ParamsError;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = CourtConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = CourtConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn default_config_matches_default_params() {
        assert_eq!(CourtConfig::default().params().unwrap(), CourtParams::default());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = CourtConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.selection_slots, 5);
        assert_eq!(config.draw_retry_factor, 10);
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            selection_slots = 7
            min_stake_per_slot = 250
            log_format = "json"
        "#;
        let config = CourtConfig::from_toml_str(toml).expect("should parse");
        let params = config.params().unwrap();
        assert_eq!(params.selection_slots, 7);
        assert_eq!(params.min_stake_per_slot, 250);
        assert_eq!(params.commit_duration_secs, 86_400);
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
    }

    #[test]
    fn even_slot_count_is_rejected_at_load() {
        let err = CourtConfig::from_toml_str("selection_slots = 4").unwrap_err();
        assert!(matches!(
            err,
            CourtError::InvalidConfig(ParamsError::InvalidSlotCount(4))
        ));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = CourtConfig::from_toml_str(r#"log_format = "xml""#).unwrap_err();
        assert!(matches!(err, CourtError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reveal_duration_secs = 3600").unwrap();
        let config = CourtConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.reveal_duration_secs, 3600);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = CourtConfig::from_toml_file("/nonexistent/tribunal.toml");
        assert!(matches!(result, Err(CourtError::Config(_))));
    }
}
