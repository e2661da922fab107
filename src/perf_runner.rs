use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use encrypty::cipher;
use encrypty::perf::{self, PerfConfig, DEFAULT_DELAY_MS};

#[derive(Parser)]
#[command(name = "encrypty_perf", version, about = "Throughput harness for the demo transform")]
struct Cli {
  /// Test buffer size in MB
  #[arg(long, default_value_t = 1)]
  size_mb: usize,

  /// Shift key, 1-255 (out-of-range values are clamped)
  #[arg(long)]
  key: Option<i64>,

  /// Number of timed iterations
  #[arg(long, default_value_t = 5)]
  iterations: usize,

  /// Cosmetic per-chunk delay in ms; 0 gives an undelayed measurement
  #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
  delay_ms: u64,

  /// Write the full results document as JSON
  #[arg(long)]
  export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();
  let cli = Cli::parse();

  let config = PerfConfig {
    size_mb: cli.size_mb.max(1),
    key: cli.key.map(cipher::clamp_key).unwrap_or(cipher::DEFAULT_KEY),
    iterations: cli.iterations.max(1),
    delay_ms: cli.delay_ms,
  };

  info!(
    "running {} iterations over {} MB buffers (key {}, {} band, {} ms chunk delay)",
    config.iterations,
    config.size_mb,
    config.key,
    perf::key_band(config.key),
    config.delay_ms
  );

  let report = perf::run(&config).await;

  println!();
  println!("Results");
  println!("-------");
  for sample in &report.samples {
    println!(
      "  test {:>2}: {:>9.1} ms  {:>8.2} MB/s",
      sample.iteration, sample.elapsed_ms, sample.speed_mbps
    );
  }
  println!();
  println!("  best    : {:>8.2} MB/s", report.summary.best_mbps);
  println!("  average : {:>8.2} MB/s", report.summary.average_mbps);
  println!("  worst   : {:>8.2} MB/s", report.summary.worst_mbps);
  println!("  note    : {}", report.summary.recommendation);

  if let Some(path) = cli.export {
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, json)?;
    info!("exported results to {}", path.display());
  }
  Ok(())
}
