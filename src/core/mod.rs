//! Core pipeline for the Neurostate Agent.
//!
//! This module contains:
//! - Windowing of raw samples into fixed-duration blocks
//! - Feature extraction from windows
//! - Feature selection and schema alignment against the trained model
//! - Prediction derivation (state, confidence, odds)

pub mod features;
pub mod prediction;
pub mod selection;
pub mod windowing;

// Re-export commonly used types
pub use features::{extract_features, feature_names, FeatureVector, STATISTICS};
pub use prediction::{MentalState, Prediction, MAX_ODDS};
pub use selection::{rank_features, select, validate_schema, SelectionError};
pub use windowing::{Window, WindowError, Windower};
