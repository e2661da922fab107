use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::time::{sleep, Duration};
use tracing::info;

use encrypty::cipher::{self, Transform};
use encrypty::config::Config;
use encrypty::fileio::{self, Preview};
use encrypty::scheduler::{ProcessingMode, SimTiming, WorkerPool};

#[derive(Parser)]
#[command(name = "encrypty", version, about = "Educational file cipher with a simulated multiprocessing pool")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Encrypt a file through the chunked worker simulation
  Encrypt {
    input: PathBuf,
    /// Shift key, 1-255 (out-of-range values are clamped)
    #[arg(short, long)]
    key: Option<i64>,
    /// Output path; defaults to encrypted_<name> next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Worker lane count, 1-8
    #[arg(long)]
    workers: Option<usize>,
    /// Animation pacing: fast, balanced, or cinematic
    #[arg(long)]
    mode: Option<String>,
    /// Print a before/after text preview of the first bytes
    #[arg(long)]
    preview: bool,
  },
  /// Decrypt a file (single pass, no worker grid)
  Decrypt {
    input: PathBuf,
    #[arg(short, long)]
    key: Option<i64>,
    /// Output path; defaults to decrypted_<name> next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Generate a random key and report its strength band
  Genkey,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();
  let cli = Cli::parse();
  let config = Config::from_env();

  match cli.command {
    Commands::Encrypt { input, key, output, workers, mode, preview } => {
      encrypt_file(&config, input, key, output, workers, mode, preview).await
    }
    Commands::Decrypt { input, key, output } => decrypt_file(input, key, output).await,
    Commands::Genkey => {
      let key = cipher::random_key();
      println!("key: {}", key);
      println!("strength: {}", cipher::key_strength(key).label());
      Ok(())
    }
  }
}

fn resolve_key(raw: Option<i64>) -> u8 {
  raw.map(cipher::clamp_key).unwrap_or(cipher::DEFAULT_KEY)
}

async fn encrypt_file(
  config: &Config,
  input: PathBuf,
  key: Option<i64>,
  output: Option<PathBuf>,
  workers: Option<usize>,
  mode: Option<String>,
  preview: bool,
) -> Result<()> {
  let key = resolve_key(key);
  let workers = workers.unwrap_or(config.worker_count).clamp(1, encrypty::config::MAX_WORKERS);
  let mode = mode.map(|m| ProcessingMode::parse(&m)).unwrap_or(config.mode);

  let data = fileio::read_buffer(&input)?;
  info!(
    "read {} ({}), key strength {}",
    input.display(),
    fileio::human_size(data.len() as u64),
    cipher::key_strength(key).label()
  );

  let pool = WorkerPool::new(workers, SimTiming::from_mode(mode));
  let report = pool.run(&data, key, Transform::Encrypt).await;

  let out_path = output.unwrap_or_else(|| fileio::encrypted_name(&input));
  fileio::write_buffer(&out_path, &report.output)?;

  for worker in &report.workers {
    info!(
      "{}: {} chunks, {} ms simulated work",
      worker.name, worker.tasks_completed, worker.total_work_ms
    );
  }
  info!(
    "encrypted {} chunks in {} ms ({} mode) -> {}",
    report.total_chunks,
    report.elapsed_ms,
    mode.label(),
    out_path.display()
  );

  if preview {
    print_preview("original", &data);
    print_preview("encrypted", &report.output);
  }
  Ok(())
}

async fn decrypt_file(input: PathBuf, key: Option<i64>, output: Option<PathBuf>) -> Result<()> {
  let key = resolve_key(key);

  info!("reading encrypted file...");
  sleep(Duration::from_millis(500)).await;
  let data = fileio::read_buffer(&input)?;

  info!("applying decryption...");
  sleep(Duration::from_millis(800)).await;
  let decrypted = cipher::decrypt(&data, key);

  info!("writing output...");
  sleep(Duration::from_millis(300)).await;
  let out_path = output.unwrap_or_else(|| fileio::decrypted_name(&input));
  fileio::write_buffer(&out_path, &decrypted)?;

  info!(
    "decrypted {} -> {}",
    fileio::human_size(data.len() as u64),
    out_path.display()
  );
  Ok(())
}

fn print_preview(label: &str, data: &[u8]) {
  match fileio::preview(data) {
    Preview::Text(text) => {
      println!("--- {} (first {} bytes) ---", label, fileio::PREVIEW_LIMIT);
      println!("{}", text);
    }
    Preview::Binary => println!("--- {}: preview unavailable for binary data ---", label),
  }
}
