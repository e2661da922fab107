//! Timer-driven simulation of a multiprocessing pool. The chunk transforms
//! are applied synchronously and instantly; the randomized delays only pace
//! the worker state machine and the timeline that the visualizations read.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::info;

use crate::chunking::{Chunk, reassemble, split_chunks};
use crate::cipher::Transform;
use crate::models::{RunReport, RunSummary, SyntheticTask, TimelineEvent, VirtualWorker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
  Fast,
  Balanced,
  Cinematic,
}

impl ProcessingMode {
  /// Unknown names fall back to the balanced profile.
  pub fn parse(raw: &str) -> Self {
    match raw.to_ascii_lowercase().as_str() {
      "fast" => ProcessingMode::Fast,
      "cinematic" => ProcessingMode::Cinematic,
      _ => ProcessingMode::Balanced,
    }
  }

  pub fn multiplier(self) -> f64 {
    match self {
      ProcessingMode::Fast => 0.35,
      ProcessingMode::Balanced => 1.0,
      ProcessingMode::Cinematic => 1.8,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ProcessingMode::Fast => "fast",
      ProcessingMode::Balanced => "balanced",
      ProcessingMode::Cinematic => "cinematic",
    }
  }
}

/// Scales the fabricated dispatch and processing delays. A multiplier of
/// zero removes every pause, which is what the tests run with.
#[derive(Debug, Clone, Copy)]
pub struct SimTiming {
  pub multiplier: f64,
}

impl SimTiming {
  pub fn from_mode(mode: ProcessingMode) -> Self {
    Self { multiplier: mode.multiplier() }
  }

  pub fn instant() -> Self {
    Self { multiplier: 0.0 }
  }

  fn dispatch_delay(&self, rng: &mut impl Rng) -> Duration {
    Duration::from_secs_f64(rng.gen_range(0.0..100.0) * self.multiplier / 1000.0)
  }

  fn processing_time(&self, rng: &mut impl Rng) -> Duration {
    Duration::from_secs_f64((200.0 + rng.gen_range(0.0..300.0)) * self.multiplier / 1000.0)
  }
}

#[derive(Debug, Clone)]
struct PoolState {
  workers: Vec<VirtualWorker>,
  tasks: Vec<SyntheticTask>,
  timeline: Vec<TimelineEvent>,
}

struct ChunkPlan {
  chunk: Chunk,
  dispatch: Duration,
  processing: Duration,
  task_id: uuid::Uuid,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
  pub output: Vec<u8>,
  pub workers: Vec<VirtualWorker>,
  pub tasks: Vec<SyntheticTask>,
  pub timeline: Vec<TimelineEvent>,
  pub elapsed_ms: u64,
  pub total_chunks: usize,
}

impl PipelineReport {
  pub fn to_run_report(&self) -> RunReport {
    RunReport {
      simulation: RunSummary {
        total_time_ms: self.elapsed_ms,
        total_tasks: self.tasks.len(),
        workers: self.workers.len(),
      },
      workers: self.workers.clone(),
      tasks: self.tasks.clone(),
      timeline: self.timeline.clone(),
    }
  }
}

pub struct WorkerPool {
  worker_count: usize,
  timing: SimTiming,
}

impl WorkerPool {
  pub fn new(worker_count: usize, timing: SimTiming) -> Self {
    Self { worker_count: worker_count.max(1), timing }
  }

  /// Run the transform over the buffer through the simulated pool. Chunk
  /// completion order is randomized by the drawn delays; reassembly goes by
  /// chunk index, so the output always matches the whole-buffer transform.
  pub async fn run(&self, data: &[u8], key: u8, transform: Transform) -> PipelineReport {
    let started = Instant::now();
    let chunks = split_chunks(data, self.worker_count);
    let total_chunks = chunks.len();

    let mut tasks = Vec::with_capacity(total_chunks);
    let mut plans = Vec::with_capacity(total_chunks);
    {
      // Draw all delays up front so the rng never crosses an await.
      let mut rng = rand::thread_rng();
      for chunk in chunks {
        let dispatch = self.timing.dispatch_delay(&mut rng);
        let processing = self.timing.processing_time(&mut rng);
        let task = SyntheticTask::new(
          format!("Chunk {}", chunk.index + 1),
          transform.label(),
          processing.as_millis() as u64,
        );
        plans.push(ChunkPlan { chunk, dispatch, processing, task_id: task.id });
        tasks.push(task);
      }
    }

    let state = Arc::new(Mutex::new(PoolState {
      workers: (0..self.worker_count).map(VirtualWorker::new).collect(),
      tasks,
      timeline: Vec::new(),
    }));

    info!(
      "dispatching {} chunks across {} workers ({} bytes)",
      total_chunks,
      self.worker_count,
      data.len()
    );

    let futs = plans.into_iter().map(|plan| {
      let state = Arc::clone(&state);
      async move {
        sleep(plan.dispatch).await;

        let index = plan.chunk.index;
        let worker_id = plan.chunk.worker_id;
        {
          let mut st = state.lock().await;
          let now = Utc::now();
          st.tasks[index].begin(worker_id, now);
          let event = TimelineEvent::started(&st.tasks[index], worker_id, now);
          st.timeline.push(event);
          st.workers[worker_id].begin(plan.task_id);
        }

        let step = plan.processing / 4;
        for pct in [25u8, 50, 75] {
          sleep(step).await;
          state.lock().await.tasks[index].progress = pct;
        }

        // The real work: instant, regardless of the animated duration.
        let output = transform.apply(&plan.chunk.data, key);
        sleep(step).await;

        {
          let mut st = state.lock().await;
          let now = Utc::now();
          let work_ms = st.tasks[index].complete(now);
          let event = TimelineEvent::completed(&st.tasks[index], worker_id, now, work_ms);
          st.timeline.push(event);
          st.workers[worker_id].finish(plan.task_id, work_ms);
          info!("worker {} finished chunk {} in {} ms", worker_id + 1, index + 1, work_ms);
        }

        (index, output)
      }
    });

    let parts = join_all(futs).await;
    let output = reassemble(parts);
    debug_assert_eq!(output.len(), data.len());

    let st = match Arc::try_unwrap(state) {
      Ok(mutex) => mutex.into_inner(),
      Err(shared) => shared.lock().await.clone(),
    };

    PipelineReport {
      output,
      workers: st.workers,
      tasks: st.tasks,
      timeline: st.timeline,
      elapsed_ms: started.elapsed().as_millis() as u64,
      total_chunks,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cipher;
  use crate::models::{TaskStatus, TimelineEventKind, WorkerStatus};

  #[tokio::test]
  async fn pool_output_matches_whole_buffer_transform() {
    let data: Vec<u8> = (0..=255).cycle().take(8192).collect();
    let pool = WorkerPool::new(4, SimTiming::instant());
    let report = pool.run(&data, 13, Transform::Encrypt).await;
    assert_eq!(report.output, cipher::encrypt(&data, 13));
    assert_eq!(report.output.len(), data.len());
    assert_eq!(report.total_chunks, 4);
  }

  #[tokio::test]
  async fn randomized_delays_do_not_reorder_output() {
    // Small but nonzero multiplier so chunk completion order is shuffled.
    let data: Vec<u8> = (0..200).cycle().take(16384).collect();
    let pool = WorkerPool::new(4, SimTiming { multiplier: 0.02 });
    let report = pool.run(&data, 200, Transform::Encrypt).await;
    assert_eq!(report.output, cipher::encrypt(&data, 200));
  }

  #[tokio::test]
  async fn pool_round_trip() {
    let data = b"the quick brown fox jumps over the lazy dog".repeat(100);
    let pool = WorkerPool::new(3, SimTiming::instant());
    let encrypted = pool.run(&data, 77, Transform::Encrypt).await;
    let decrypted = pool.run(&encrypted.output, 77, Transform::Decrypt).await;
    assert_eq!(decrypted.output, data);
  }

  #[tokio::test]
  async fn run_records_lifecycle_per_chunk() {
    let data = vec![1u8; 4096];
    let pool = WorkerPool::new(2, SimTiming::instant());
    let report = pool.run(&data, 5, Transform::Encrypt).await;

    assert!(report.tasks.iter().all(|t| t.status == TaskStatus::Completed));
    assert!(report.workers.iter().all(|w| w.status == WorkerStatus::Idle));

    let starts = report
      .timeline
      .iter()
      .filter(|e| e.kind == TimelineEventKind::TaskStart)
      .count();
    let completes = report
      .timeline
      .iter()
      .filter(|e| e.kind == TimelineEventKind::TaskComplete)
      .count();
    assert_eq!(starts, report.total_chunks);
    assert_eq!(completes, report.total_chunks);

    let completed: u32 = report.workers.iter().map(|w| w.tasks_completed).sum();
    assert_eq!(completed as usize, report.total_chunks);
  }

  #[tokio::test]
  async fn empty_input_runs_clean() {
    let pool = WorkerPool::new(4, SimTiming::instant());
    let report = pool.run(&[], 50, Transform::Encrypt).await;
    assert!(report.output.is_empty());
    assert_eq!(report.total_chunks, 0);
    assert!(report.timeline.is_empty());
  }

  #[test]
  fn mode_parsing() {
    assert_eq!(ProcessingMode::parse("fast"), ProcessingMode::Fast);
    assert_eq!(ProcessingMode::parse("CINEMATIC"), ProcessingMode::Cinematic);
    assert_eq!(ProcessingMode::parse("anything"), ProcessingMode::Balanced);
  }
}
