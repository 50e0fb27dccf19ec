//! Hardware stream source backed by a local streaming bridge.
//!
//! Headset discovery and pairing happen outside this crate: a bridge
//! process (e.g. a BlueMuse-style relay) owns the Bluetooth connection and
//! re-exposes the sample stream over a local TCP socket. The wire protocol
//! is line-based:
//!
//! ```text
//! -> start <device-address>\n
//! <- <rate_hz>,<label1>,<label2>,...\n
//! <- <v1>,<v2>,...\n          (one line per sample, repeated forever)
//! ```

use crate::source::{Sample, SourceError, StreamSource};
use chrono::Utc;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

/// A stream source reading samples from a paired headset via the bridge.
#[derive(Debug)]
pub struct HardwareSource {
    reader: BufReader<TcpStream>,
    sample_rate_hz: f64,
    channel_labels: Vec<String>,
}

impl HardwareSource {
    /// Connect to the bridge and start streaming from the given headset.
    ///
    /// Blocks until the bridge acknowledges with the stream header. Fails
    /// with `SourceError::Connection` if the bridge is unreachable, rejects
    /// the device address, or sends a malformed header.
    pub fn connect(bridge_addr: &str, device_address: &str) -> Result<Self, SourceError> {
        let stream = TcpStream::connect(bridge_addr).map_err(|e| {
            SourceError::Connection(format!("could not reach bridge at {bridge_addr}: {e}"))
        })?;

        let mut write_half = stream
            .try_clone()
            .map_err(|e| SourceError::Connection(format!("socket clone failed: {e}")))?;
        write_half
            .write_all(format!("start {device_address}\n").as_bytes())
            .map_err(|e| SourceError::Connection(format!("handshake write failed: {e}")))?;

        let mut reader = BufReader::new(stream);
        let mut header = String::new();
        reader
            .read_line(&mut header)
            .map_err(|e| SourceError::Connection(format!("handshake read failed: {e}")))?;
        if header.trim().is_empty() {
            return Err(SourceError::Connection(
                "bridge closed the connection before sending a stream header".to_string(),
            ));
        }

        let (sample_rate_hz, channel_labels) = parse_header(header.trim())?;

        Ok(Self {
            reader,
            sample_rate_hz,
            channel_labels,
        })
    }
}

/// Parse the `rate,label1,label2,...` header line.
fn parse_header(header: &str) -> Result<(f64, Vec<String>), SourceError> {
    let mut parts = header.split(',');
    let rate: f64 = parts
        .next()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(|_| SourceError::Connection(format!("invalid stream header: {header:?}")))?;
    if rate <= 0.0 {
        return Err(SourceError::Connection(format!(
            "invalid sample rate in stream header: {rate}"
        )));
    }

    let labels: Vec<String> = parts.map(|l| l.trim().to_string()).collect();
    if labels.is_empty() || labels.iter().any(|l| l.is_empty()) {
        return Err(SourceError::Connection(format!(
            "invalid channel labels in stream header: {header:?}"
        )));
    }

    Ok((rate, labels))
}

impl StreamSource for HardwareSource {
    fn pull(&mut self, duration_secs: f64) -> Result<Vec<Sample>, SourceError> {
        let expected = (duration_secs * self.sample_rate_hz).round() as usize;
        let mut samples = Vec::with_capacity(expected);
        let mut line = String::new();

        while samples.len() < expected {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| SourceError::Pull(format!("read from bridge failed: {e}")))?;
            if read == 0 {
                return Err(SourceError::Pull(format!(
                    "stream ended after {} of {} samples",
                    samples.len(),
                    expected
                )));
            }
            if line.trim().is_empty() {
                continue;
            }

            let channels: Vec<f64> = line
                .trim()
                .split(',')
                .map(|v| v.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| SourceError::Pull(format!("malformed sample frame: {line:?}")))?;

            if channels.len() != self.channel_labels.len() {
                return Err(SourceError::Pull(format!(
                    "sample frame has {} channels, expected {}",
                    channels.len(),
                    self.channel_labels.len()
                )));
            }

            samples.push(Sample::new(Utc::now(), channels));
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
