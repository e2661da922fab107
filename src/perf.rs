//! Performance harness: repeated transforms over generated random buffers,
//! timed with a monotonic clock. The per-chunk delay is cosmetic and
//! configurable; aggregates are descriptive only.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Serialize, Deserialize};
use tokio::time::{sleep, Duration};
use tracing::info;

use crate::cipher;

pub const PERF_CHUNK_SIZE: usize = 1024 * 1024;
pub const DEFAULT_DELAY_MS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfConfig {
  pub size_mb: usize,
  pub key: u8,
  pub iterations: usize,
  pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfSample {
  pub iteration: usize,
  pub bytes: usize,
  pub key: u8,
  pub elapsed_ms: f64,
  pub speed_mbps: f64,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBandSpeeds {
  pub weak: f64,
  pub medium: f64,
  pub strong: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfSummary {
  pub best_mbps: f64,
  pub worst_mbps: f64,
  pub average_mbps: f64,
  pub key_bands: KeyBandSpeeds,
  pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfReport {
  pub config: PerfConfig,
  pub samples: Vec<PerfSample>,
  pub summary: PerfSummary,
}

pub fn generate_buffer(size_mb: usize) -> Vec<u8> {
  let mut data = vec![0u8; size_mb.max(1) * 1024 * 1024];
  rand::thread_rng().fill(&mut data[..]);
  data
}

/// Key grouping for the throughput summary. The bands are cosmetic; the
/// shift value has no effect on the transform's cost.
pub fn key_band(key: u8) -> &'static str {
  match key {
    1..=50 => "weak",
    51..=150 => "medium",
    _ => "strong",
  }
}

pub async fn run_iteration(config: &PerfConfig, iteration: usize) -> PerfSample {
  let data = generate_buffer(config.size_mb);
  let started = Instant::now();

  let mut output = Vec::with_capacity(data.len());
  for chunk in data.chunks(PERF_CHUNK_SIZE) {
    output.extend_from_slice(&cipher::encrypt(chunk, config.key));
    if config.delay_ms > 0 {
      sleep(Duration::from_millis(config.delay_ms)).await;
    }
  }

  let elapsed = started.elapsed();
  let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
  let speed_mbps = output.len() as f64 / (1024.0 * 1024.0) / elapsed.as_secs_f64().max(1e-9);

  PerfSample {
    iteration,
    bytes: output.len(),
    key: config.key,
    elapsed_ms,
    speed_mbps,
    timestamp: Utc::now(),
  }
}

pub async fn run(config: &PerfConfig) -> PerfReport {
  let mut samples = Vec::with_capacity(config.iterations);
  for i in 0..config.iterations {
    let sample = run_iteration(config, i + 1).await;
    info!(
      "test {}/{}: {:.2} MB in {:.1} ms ({:.2} MB/s)",
      sample.iteration,
      config.iterations,
      sample.bytes as f64 / (1024.0 * 1024.0),
      sample.elapsed_ms,
      sample.speed_mbps
    );
    samples.push(sample);
  }
  let summary = summarize(&samples);
  PerfReport { config: config.clone(), samples, summary }
}

pub fn summarize(samples: &[PerfSample]) -> PerfSummary {
  if samples.is_empty() {
    return PerfSummary {
      best_mbps: 0.0,
      worst_mbps: 0.0,
      average_mbps: 0.0,
      key_bands: KeyBandSpeeds { weak: 0.0, medium: 0.0, strong: 0.0 },
      recommendation: "No samples recorded".into(),
    };
  }

  let speeds: Vec<f64> = samples.iter().map(|s| s.speed_mbps).collect();
  let best = speeds.iter().cloned().fold(f64::MIN, f64::max);
  let worst = speeds.iter().cloned().fold(f64::MAX, f64::min);
  let average = speeds.iter().sum::<f64>() / speeds.len() as f64;

  let band_average = |band: &str| {
    let matching: Vec<f64> = samples
      .iter()
      .filter(|s| key_band(s.key) == band)
      .map(|s| s.speed_mbps)
      .collect();
    if matching.is_empty() {
      0.0
    } else {
      matching.iter().sum::<f64>() / matching.len() as f64
    }
  };

  let mut notes = Vec::new();
  if average < 10.0 {
    notes.push("Consider smaller test buffers or a lower delay for quicker runs");
  }
  if average > 50.0 {
    notes.push("Excellent throughput for the demo transform");
  }
  if samples.iter().any(|s| s.bytes > 100 * 1024 * 1024) {
    notes.push("Large buffers dominate memory; consider fewer iterations");
  }
  let recommendation = if notes.is_empty() {
    "Performance is within normal ranges".into()
  } else {
    notes.join(". ")
  };

  PerfSummary {
    best_mbps: best,
    worst_mbps: worst,
    average_mbps: average,
    key_bands: KeyBandSpeeds {
      weak: band_average("weak"),
      medium: band_average("medium"),
      strong: band_average("strong"),
    },
    recommendation,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn buffer_size_matches_request() {
    assert_eq!(generate_buffer(1).len(), 1024 * 1024);
    assert_eq!(generate_buffer(0).len(), 1024 * 1024);
  }

  #[test]
  fn key_bands_cover_range() {
    assert_eq!(key_band(1), "weak");
    assert_eq!(key_band(50), "weak");
    assert_eq!(key_band(51), "medium");
    assert_eq!(key_band(150), "medium");
    assert_eq!(key_band(151), "strong");
    assert_eq!(key_band(255), "strong");
  }

  #[tokio::test]
  async fn harness_produces_consistent_aggregates() {
    let config = PerfConfig { size_mb: 1, key: 42, iterations: 3, delay_ms: 0 };
    let report = run(&config).await;

    assert_eq!(report.samples.len(), 3);
    for sample in &report.samples {
      assert_eq!(sample.bytes, 1024 * 1024);
      assert!(sample.speed_mbps > 0.0);
      assert!(sample.elapsed_ms >= 0.0);
    }

    let summary = &report.summary;
    assert!(summary.worst_mbps <= summary.average_mbps);
    assert!(summary.average_mbps <= summary.best_mbps);
    assert!(summary.key_bands.weak > 0.0);
    assert_eq!(summary.key_bands.medium, 0.0);
    assert!(!summary.recommendation.is_empty());
  }

  #[test]
  fn empty_sample_set() {
    let summary = summarize(&[]);
    assert_eq!(summary.average_mbps, 0.0);
    assert_eq!(summary.recommendation, "No samples recorded");
  }
}
