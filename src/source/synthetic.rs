//! Synthetic stream source producing plausible multichannel noise.
//!
//! Used when no headset is available so the rest of the pipeline can run
//! deterministically, and as the test double for the hardware source.

use crate::source::{Sample, SourceError, StreamSource};
use chrono::{Duration, Utc};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

/// Standard deviation of the generated noise, in microvolt-scale units.
const NOISE_STD: f64 = 50.0;

/// Amplitude of the slow per-channel drift added on top of the noise.
const DRIFT_AMPLITUDE: f64 = 15.0;

/// Drift frequency in Hz (slow alpha-band-adjacent oscillation).
const DRIFT_FREQ_HZ: f64 = 0.8;

/// A stream source generating artificial samples without blocking.
pub struct SyntheticSource {
    sample_rate_hz: f64,
    channel_labels: Vec<String>,
    noise: Normal,
    rng: StdRng,
    /// Running phase so consecutive pulls produce a continuous drift signal
    phase: f64,
}

impl SyntheticSource {
    /// Create a new synthetic source with the given rate and channel schema.
    pub fn new(sample_rate_hz: f64, channel_labels: Vec<String>) -> Self {
        Self::seeded(sample_rate_hz, channel_labels, rand::random())
    }

    /// Create a synthetic source with a fixed seed for deterministic output.
    pub fn seeded(sample_rate_hz: f64, channel_labels: Vec<String>, seed: u64) -> Self {
        Self {
            sample_rate_hz,
            channel_labels,
            noise: Normal::new(0.0, NOISE_STD).expect("valid noise distribution parameters"),
            rng: StdRng::seed_from_u64(seed),
            phase: 0.0,
        }
    }
}

impl StreamSource for SyntheticSource {
    fn pull(&mut self, duration_secs: f64) -> Result<Vec<Sample>, SourceError> {
        let count = (duration_secs * self.sample_rate_hz).round() as usize;
        let start = Utc::now();
        let step_us = 1_000_000.0 / self.sample_rate_hz;

        let mut samples = Vec::with_capacity(count);
        for i in 0..count {
            self.phase += DRIFT_FREQ_HZ / self.sample_rate_hz;
            let channels = (0..self.channel_labels.len())
                .map(|ch| {
                    // Offset the drift per channel so channels are not identical
                    let drift = DRIFT_AMPLITUDE
                        * (std::f64::consts::TAU * (self.phase + ch as f64 * 0.25)).sin();
                    drift + self.noise.sample(&mut self.rng)
                })
                .collect();
            let timestamp = start + Duration::microseconds((i as f64 * step_us) as i64);
            samples.push(Sample::new(timestamp, channels));
        }

        Ok(samples)
    }

    fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    fn channel_labels(&self) -> &[String] {
        &self.channel_labels
    }
}
