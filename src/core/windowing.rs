//! Windowing of raw samples into fixed-duration blocks.
//!
//! Each window is an independent consecutive block pulled from the stream
//! source; there is no overlap or smoothing beyond what the source returns.
//! Trailing auxiliary channels (the Right AUX column on a stock headset)
//! are dropped here, before feature extraction.

use crate::source::{Sample, SourceError, StreamSource};
use chrono::{DateTime, Utc};

/// A fixed-duration block of consecutive multichannel samples.
#[derive(Debug, Clone)]
pub struct Window {
    /// Timestamp of the first sample
    pub start: DateTime<Utc>,
    /// Labels of the retained channels
    pub channel_labels: Vec<String>,
    /// Sample rate of the originating source
    pub sample_rate_hz: f64,
    /// Retained-channel samples, in pull order
    pub samples: Vec<Sample>,
}

impl Window {
    /// Number of samples in this window.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the window has any samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration covered by this window in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz
    }

    /// Extract one channel as a contiguous series.
    pub fn channel(&self, index: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s.channels[index]).collect()
    }
}

/// Errors raised while assembling windows.
#[derive(Debug)]
pub enum WindowError {
    /// The underlying source failed.
    Source(SourceError),
    /// The source returned fewer samples than the window requires.
    ShortRead { expected: usize, actual: usize },
    /// A sample's channel count does not match the source schema.
    ChannelMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::Source(e) => write!(f, "{e}"),
            WindowError::ShortRead { expected, actual } => {
                write!(f, "short read: got {actual} samples, expected {expected}")
            }
            WindowError::ChannelMismatch { expected, actual } => {
                write!(
                    f,
                    "channel mismatch: sample has {actual} channels, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for WindowError {}

impl From<SourceError> for WindowError {
    fn from(e: SourceError) -> Self {
        WindowError::Source(e)
    }
}

/// Produces consecutive windows from a stream source.
///
/// For a live source this is a lazy, infinite sequence; for a bounded
/// source the sequence ends with a `ShortRead` once the stream runs out.
pub struct Windower {
    source: Box<dyn StreamSource>,
    window_secs: f64,
    drop_trailing_channels: usize,
}

impl Windower {
    pub fn new(
        source: Box<dyn StreamSource>,
        window_secs: f64,
        drop_trailing_channels: usize,
    ) -> Self {
        Self {
            source,
            window_secs,
            drop_trailing_channels,
        }
    }

    /// Labels of the channels retained after dropping trailing ones.
    pub fn channel_labels(&self) -> Vec<String> {
        let labels = self.source.channel_labels();
        let keep = labels.len().saturating_sub(self.drop_trailing_channels);
        labels[..keep].to_vec()
    }

    /// Number of samples each window must contain.
    pub fn expected_samples(&self) -> usize {
        (self.window_secs * self.source.sample_rate_hz()).round() as usize
    }

    /// Pull the next window from the source. Blocks on the source pull.
    pub fn next_window(&mut self) -> Result<Window, WindowError> {
        let expected = self.expected_samples();
        let full_channels = self.source.channel_labels().len();
        let keep = full_channels.saturating_sub(self.drop_trailing_channels);

        let mut samples = self.source.pull(self.window_secs)?;
        if samples.len() < expected {
            return Err(WindowError::ShortRead {
                expected,
                actual: samples.len(),
            });
        }
        samples.truncate(expected);

        for sample in &mut samples {
            if sample.channels.len() != full_channels {
                return Err(WindowError::ChannelMismatch {
                    expected: full_channels,
                    actual: sample.channels.len(),
                });
            }
            sample.channels.truncate(keep);
        }

        let start = samples
            .first()
            .map(|s| s.timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Window {
            start,
            channel_labels: self.channel_labels(),
            sample_rate_hz: self.source.sample_rate_hz(),
            samples,
        })
    }
}
