//! Stream sources for the Neurostate Agent.
//!
//! This module abstracts where multichannel samples come from: a hardware
//! headset reached through a local streaming bridge, or a synthetic noise
//! generator used when no hardware is available.

pub mod connection;
pub mod hardware;
pub mod synthetic;

use chrono::{DateTime, Utc};

// Re-export commonly used types
pub use connection::{ConnectionManager, ConnectionState, RecoveryChoice, TROUBLESHOOTING};
pub use hardware::HardwareSource;
pub use synthetic::SyntheticSource;

/// One time-stamped reading across all channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Timestamp when the reading was taken
    pub timestamp: DateTime<Utc>,
    /// One value per channel, in channel-label order
    pub channels: Vec<f64>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, channels: Vec<f64>) -> Self {
        Self {
            timestamp,
            channels,
        }
    }
}

/// A live data source yielding fixed-rate multichannel samples on demand.
///
/// `pull` blocks until the requested duration of samples is available.
/// Implementations keep a fixed sample rate and channel schema for their
/// whole lifetime.
pub trait StreamSource {
    /// Pull exactly `duration_secs` worth of samples at the source's rate.
    ///
    /// Returns fewer samples only at end-of-stream for bounded sources.
    fn pull(&mut self, duration_secs: f64) -> Result<Vec<Sample>, SourceError>;

    /// Fixed sample rate of this source in Hz.
    fn sample_rate_hz(&self) -> f64;

    /// Channel labels in wire order.
    fn channel_labels(&self) -> &[String];
}

/// Errors raised by stream sources.
#[derive(Debug)]
pub enum SourceError {
    /// The source could not be reached or the handshake failed.
    /// Recoverable: the operator may retry or fall back to synthetic data.
    Connection(String),
    /// The stream dropped or produced malformed data after connection.
    /// Fatal for the current run.
    Pull(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Connection(e) => write!(f, "Connection error: {e}"),
            SourceError::Pull(e) => write!(f, "Stream pull failed: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}
