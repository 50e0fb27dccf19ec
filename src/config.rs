//! Configuration for the Neurostate Agent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the classification agent.
///
/// Constructed once at startup and immutable for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the persisted classifier model
    pub model_path: PathBuf,

    /// Path to the training matrix CSV used for feature selection
    pub training_matrix_path: PathBuf,

    /// Bluetooth address of the headset; prompted interactively if absent
    pub device_address: Option<String>,

    /// Address of the local streaming bridge the headset is paired through
    pub bridge_addr: String,

    /// Sample rate of the source in Hz
    pub sample_rate_hz: f64,

    /// Duration of each classification window in seconds
    pub window_secs: f64,

    /// Channel labels in wire order, including any trailing auxiliary channels
    pub channel_labels: Vec<String>,

    /// Number of trailing channels to drop before feature extraction
    /// (the Right AUX column on a stock headset)
    pub drop_trailing_channels: usize,

    /// Number of top-ranked features the classifier was trained on
    pub selected_feature_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neurostate-agent");

        Self {
            model_path: data_dir.join("models").join("classifier.json"),
            training_matrix_path: data_dir.join("training_matrix.csv"),
            device_address: None,
            bridge_addr: "127.0.0.1:16571".to_string(),
            sample_rate_hz: 256.0,
            window_secs: 2.0,
            channel_labels: vec![
                "tp9".to_string(),
                "af7".to_string(),
                "af8".to_string(),
                "tp10".to_string(),
                "aux".to_string(),
            ],
            drop_trailing_channels: 1,
            selected_feature_count: 10,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neurostate-agent")
            .join("config.json")
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_rate_hz, 256.0);
        assert_eq!(config.window_secs, 2.0);
        assert_eq!(config.channel_labels.len(), 5);
        assert_eq!(config.drop_trailing_channels, 1);
        assert!(config.device_address.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip_via_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.channel_labels, config.channel_labels);
        assert_eq!(parsed.window_secs, config.window_secs);
    }
}
