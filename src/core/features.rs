//! Feature extraction from sample windows.
//!
//! For each retained channel a fixed battery of statistical descriptors is
//! computed and named `{channel}_{statistic}`. Extraction is pure and
//! order-stable: the same window always yields the same vector with the
//! same column ordering, because downstream alignment selects columns by
//! name, never by position.

use crate::core::windowing::Window;
use statrs::statistics::Statistics;

/// The statistic battery, in output order.
///
/// `logpow` is the log band power, ln(variance + epsilon) - variance of a
/// mean-removed EEG window is its power, and the log makes the scale usable
/// for threshold-style models.
pub const STATISTICS: &[&str] = &[
    "mean", "var", "std", "min", "max", "ptp", "skew", "kurt", "logpow",
];

/// Guard against ln(0) for a flat channel.
const LOG_POWER_EPSILON: f64 = 1e-6;

/// An order-preserving mapping from feature name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a named feature. Order of insertion is the column order.
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.entries.push((name.into(), value));
    }

    /// Look up a feature by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Column values in order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, f64)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full feature-name battery for a set of channel labels.
///
/// Derivable without any samples, which lets startup validate the trained
/// schema against the live channel configuration before pulling a window.
pub fn feature_names(channel_labels: &[String]) -> Vec<String> {
    let mut names = Vec::with_capacity(channel_labels.len() * STATISTICS.len());
    for label in channel_labels {
        for stat in STATISTICS {
            names.push(format!("{label}_{stat}"));
        }
    }
    names
}

/// Compute the feature vector for a window, one battery per channel.
pub fn extract_features(window: &Window) -> FeatureVector {
    let mut vector = FeatureVector::with_capacity(window.channel_labels.len() * STATISTICS.len());

    for (index, label) in window.channel_labels.iter().enumerate() {
        let series = window.channel(index);
        for (stat, value) in channel_statistics(&series) {
            vector.push(format!("{label}_{stat}"), value);
        }
    }

    vector
}

/// Compute the statistic battery for one channel series, in battery order.
fn channel_statistics(series: &[f64]) -> Vec<(&'static str, f64)> {
    if series.is_empty() {
        return STATISTICS.iter().map(|s| (*s, 0.0)).collect();
    }

    let mean = Statistics::mean(series.iter());
    let var = Statistics::population_variance(series.iter());
    let std = var.sqrt();
    let min = series.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let skew = standardized_moment(series, mean, std, 3);
    let kurt = standardized_moment(series, mean, std, 4) - if std > 0.0 { 3.0 } else { 0.0 };
    let logpow = (var + LOG_POWER_EPSILON).ln();

    vec![
        ("mean", mean),
        ("var", var),
        ("std", std),
        ("min", min),
        ("max", max),
        ("ptp", max - min),
        ("skew", skew),
        ("kurt", kurt),
        ("logpow", logpow),
    ]
}

/// Standardized central moment of the given order; 0.0 for a flat series.
fn standardized_moment(series: &[f64], mean: f64, std: f64, order: i32) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    let n = series.len() as f64;
    series
        .iter()
        .map(|&v| ((v - mean) / std).powi(order))
        .sum::<f64>()
        / n
}
