//! Neurostate Agent - real-time mental-state classification for EEG streams.
//!
//! This library classifies a live multichannel brain-signal stream into
//! discrete mental states ("relaxed" / "concentrating") using a previously
//! trained classifier. It covers the acquisition, windowing, feature
//! extraction, feature alignment and classification loop, together with the
//! connection-retry / synthetic-fallback resilience logic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Neurostate Agent                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Source    │──▶│  Windowing  │──▶│  Features   │        │
//! │  │ (hw/synth)  │   │  (2s bins)  │   │ (extract)   │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │         │                                   │               │
//! │         ▼                                   ▼               │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │ Connection  │   │  Selection  │──▶│ Prediction  │        │
//! │  │   Manager   │   │  (align)    │   │ (classify)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline is single-threaded and synchronous: exactly one window is in
//! flight at a time, and the only blocking point is the source pull. Feature
//! columns are aligned by name against the schema the classifier was trained
//! on, and any mismatch is a hard failure before the loop starts.
//!
//! # Example
//!
//! ```no_run
//! use neurostate_agent::{
//!     core::{extract_features, select, Windower},
//!     source::SyntheticSource,
//! };
//!
//! let labels = vec!["tp9".to_string(), "af7".to_string()];
//! let source = SyntheticSource::new(256.0, labels);
//! let mut windower = Windower::new(Box::new(source), 2.0, 0);
//!
//! let window = windower.next_window().expect("synthetic pull cannot fail");
//! let features = extract_features(&window);
//! let aligned = select(&features, &["tp9_mean".to_string()]).unwrap();
//! # let _ = aligned;
//! ```

pub mod config;
pub mod core;
pub mod model;
pub mod runner;
pub mod source;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    extract_features, feature_names, rank_features, select, validate_schema, FeatureVector,
    MentalState, Prediction, SelectionError, Window, WindowError, Windower, MAX_ODDS,
};
pub use model::{ForestModel, ModelError};
pub use runner::{classify_once, run_loop};
pub use source::{
    ConnectionManager, ConnectionState, HardwareSource, Sample, SourceError, StreamSource,
    SyntheticSource,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
