//! Connection state machine for acquiring a stream source.
//!
//! Connecting to the headset can fail for mundane reasons (pairing mode,
//! Bluetooth off, distance), so failures surface to the operator with
//! troubleshooting guidance and an explicit choice: retry the connection
//! or fall back to synthetic data. There is no automatic retry loop and no
//! silent reconnection once a source is chosen.

use crate::source::{HardwareSource, SourceError, SyntheticSource};

/// Troubleshooting guidance shown to the operator after a failed attempt.
pub const TROUBLESHOOTING: &str = "\
Troubleshooting steps:
1. Check if Bluetooth is enabled
2. Make sure the headset is in pairing mode (blinking light)
3. Try moving closer to the headset
4. Restart the headset
5. Restart your computer's Bluetooth";

/// States of the connection lifecycle.
///
/// `Disconnected → Connecting → Connected | Failed`. From `Failed` the
/// caller either retries (back to `Connecting`) or falls back to the
/// synthetic source (directly to `Connected`). Once `Connected`, the
/// manager is inert for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

/// Operator recovery choice after a failed connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    Retry,
    Fallback,
}

/// Manages the transition from "no source" to "one connected source".
pub struct ConnectionManager {
    bridge_addr: String,
    state: ConnectionState,
}

impl ConnectionManager {
    /// Create a manager targeting the given streaming bridge.
    pub fn new(bridge_addr: impl Into<String>) -> Self {
        Self {
            bridge_addr: bridge_addr.into(),
            state: ConnectionState::Disconnected,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Attempt to connect to the headset through the bridge.
    ///
    /// Each attempt is independent: on failure the manager moves to
    /// `Failed` and the caller decides the next step. The attempt leaves no
    /// other side effects behind.
    pub fn connect(&mut self, device_address: &str) -> Result<HardwareSource, SourceError> {
        self.state = ConnectionState::Connecting;
        match HardwareSource::connect(&self.bridge_addr, device_address) {
            Ok(source) => {
                self.state = ConnectionState::Connected;
                Ok(source)
            }
            Err(e) => {
                self.state = ConnectionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Fall back to a synthetic source with the given schema.
    ///
    /// Transitions directly to `Connected`.
    pub fn fall_back(&mut self, sample_rate_hz: f64, channel_labels: Vec<String>) -> SyntheticSource {
        self.state = ConnectionState::Connected;
        SyntheticSource::new(sample_rate_hz, channel_labels)
    }
}
