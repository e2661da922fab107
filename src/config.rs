use std::env;

use crate::scheduler::ProcessingMode;

pub const DEFAULT_WORKERS: usize = 4;
pub const MAX_WORKERS: usize = 8;
pub const DEFAULT_TICK_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
  pub worker_count: usize,
  pub mode: ProcessingMode,
  pub tick_ms: u64,
}

impl Config {
  pub fn from_env() -> Self {
    Self {
      worker_count: env::var("ENCRYPTY_WORKERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_WORKERS)
        .clamp(1, MAX_WORKERS),
      mode: env::var("ENCRYPTY_MODE")
        .map(|v| ProcessingMode::parse(&v))
        .unwrap_or(ProcessingMode::Balanced),
      tick_ms: env::var("ENCRYPTY_TICK_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TICK_MS),
    }
  }
}
