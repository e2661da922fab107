//! The educational multiprocessing run behind the gantt dashboard. A fixed
//! task set is dispatched to virtual workers on a 100 ms-class tick; progress
//! is derived from wall-clock elapsed time against each task's fabricated
//! duration. Nothing here computes anything.

use std::sync::mpsc::Receiver;
use std::time::Instant;

use chrono::Utc;
use tokio::time::{sleep, Duration};

use crate::config::MAX_WORKERS;
use crate::models::{
  RunReport, RunSummary, SyntheticTask, TaskStatus, TimelineEvent, VirtualWorker, WorkerStatus,
};

const TASK_SET: &[(&str, &str, u64)] = &[
  ("Initialize Workers", "System", 500),
  ("Load Configuration", "System", 400),
  ("File Chunk 1", "File Read", 1500),
  ("File Chunk 2", "File Read", 1400),
  ("File Chunk 3", "File Read", 1600),
  ("File Chunk 4", "File Read", 1450),
  ("File Chunk 5", "File Read", 1550),
  ("File Chunk 6", "File Read", 1480),
  ("Encrypt Chunk 1", "Encryption", 2500),
  ("Encrypt Chunk 2", "Encryption", 2400),
  ("Encrypt Chunk 3", "Encryption", 2600),
  ("Encrypt Chunk 4", "Encryption", 2450),
  ("Encrypt Chunk 5", "Encryption", 2550),
  ("Encrypt Chunk 6", "Encryption", 2480),
  ("Validate Data", "Validation", 1200),
  ("Compress Result", "Compression", 2000),
  ("Write Output", "File Write", 1000),
  ("Cleanup Resources", "System", 500),
];

pub fn educational_tasks() -> Vec<SyntheticTask> {
  TASK_SET
    .iter()
    .map(|&(name, task_type, duration_ms)| SyntheticTask::new(name, task_type, duration_ms))
    .collect()
}

#[derive(Debug, Clone, Copy)]
pub enum SimCommand {
  Start,
  Reset,
  SetWorkers(usize),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimStats {
  pub elapsed_ms: u64,
  pub completed_tasks: usize,
  pub total_tasks: usize,
  pub active_workers: usize,
  pub efficiency_pct: u8,
}

#[derive(Debug, Clone)]
pub struct SimSnapshot {
  pub running: bool,
  pub workers: Vec<VirtualWorker>,
  pub tasks: Vec<SyntheticTask>,
  pub timeline: Vec<TimelineEvent>,
  pub stats: SimStats,
}

pub struct Simulation {
  worker_count: usize,
  tick_ms: u64,
  time_scale: f64,
  running: bool,
  started: Option<Instant>,
  workers: Vec<VirtualWorker>,
  tasks: Vec<SyntheticTask>,
  timeline: Vec<TimelineEvent>,
}

impl Simulation {
  pub fn new(worker_count: usize, tick_ms: u64) -> Self {
    let worker_count = worker_count.clamp(1, MAX_WORKERS);
    Self {
      worker_count,
      tick_ms: tick_ms.max(1),
      time_scale: 1.0,
      running: false,
      started: None,
      workers: (0..worker_count).map(VirtualWorker::new).collect(),
      tasks: educational_tasks(),
      timeline: Vec::new(),
    }
  }

  /// Stretch or shrink every fabricated duration. Below 1.0 the run plays
  /// faster than the canonical timings.
  pub fn with_time_scale(mut self, time_scale: f64) -> Self {
    self.time_scale = time_scale.max(0.0);
    self
  }

  pub fn worker_count(&self) -> usize {
    self.worker_count
  }

  pub fn set_worker_count(&mut self, count: usize) {
    if self.running {
      return;
    }
    self.worker_count = count.clamp(1, MAX_WORKERS);
    self.reset();
  }

  pub fn reset(&mut self) {
    self.running = false;
    self.started = None;
    self.workers = (0..self.worker_count).map(VirtualWorker::new).collect();
    self.tasks = educational_tasks();
    self.timeline.clear();
  }

  /// Drive one run to completion, emitting a snapshot per tick. A `Reset`
  /// command aborts the run and drops all pending timers with it.
  pub async fn run(&mut self, commands: &Receiver<SimCommand>, mut emit: impl FnMut(SimSnapshot)) {
    self.reset();
    self.running = true;
    self.started = Some(Instant::now());
    emit(self.snapshot());

    loop {
      match commands.try_recv() {
        Ok(SimCommand::Reset) => {
          self.reset();
          emit(self.snapshot());
          return;
        }
        _ => {}
      }

      self.assign_pending();
      self.advance();
      emit(self.snapshot());

      if self.tasks.iter().all(|t| t.status == TaskStatus::Completed) {
        break;
      }
      sleep(Duration::from_millis(self.tick_ms)).await;
    }

    self.running = false;
    emit(self.snapshot());
  }

  fn assign_pending(&mut self) {
    let now = Utc::now();
    for worker in self.workers.iter_mut() {
      if worker.status != WorkerStatus::Idle {
        continue;
      }
      if let Some(task) = self.tasks.iter_mut().find(|t| t.status == TaskStatus::Pending) {
        task.begin(worker.id, now);
        worker.begin(task.id);
        self.timeline.push(TimelineEvent::started(task, worker.id, now));
      }
    }
  }

  fn advance(&mut self) {
    let now = Utc::now();
    for task in self.tasks.iter_mut() {
      if task.status != TaskStatus::Processing {
        continue;
      }
      let scaled = ((task.duration_ms as f64 * self.time_scale) as u64).max(1);
      let elapsed = task.elapsed_since_start(now);
      if elapsed >= scaled {
        let work_ms = task.complete(now);
        if let Some(worker_id) = task.worker_id {
          self.timeline.push(TimelineEvent::completed(task, worker_id, now, work_ms));
          if let Some(worker) = self.workers.get_mut(worker_id) {
            worker.finish(task.id, work_ms);
          }
        }
      } else {
        task.progress = ((elapsed * 100 / scaled) as u8).min(99);
      }
    }
  }

  pub fn snapshot(&self) -> SimSnapshot {
    SimSnapshot {
      running: self.running,
      workers: self.workers.clone(),
      tasks: self.tasks.clone(),
      timeline: self.timeline.clone(),
      stats: self.stats(),
    }
  }

  fn stats(&self) -> SimStats {
    let elapsed_ms = self
      .started
      .map(|s| s.elapsed().as_millis() as u64)
      .unwrap_or(0);
    let busy_ms: u64 = self.workers.iter().map(|w| w.total_work_ms).sum();
    let capacity_ms = elapsed_ms * self.worker_count as u64;
    SimStats {
      elapsed_ms,
      completed_tasks: self.tasks.iter().filter(|t| t.status == TaskStatus::Completed).count(),
      total_tasks: self.tasks.len(),
      active_workers: self
        .workers
        .iter()
        .filter(|w| w.status == WorkerStatus::Processing)
        .count(),
      efficiency_pct: if capacity_ms > 0 {
        ((busy_ms * 100 / capacity_ms) as u8).min(100)
      } else {
        0
      },
    }
  }

  pub fn report(&self) -> RunReport {
    RunReport {
      simulation: RunSummary {
        total_time_ms: self.stats().elapsed_ms,
        total_tasks: self.tasks.len(),
        workers: self.worker_count,
      },
      workers: self.workers.clone(),
      tasks: self.tasks.clone(),
      timeline: self.timeline.clone(),
    }
  }
}

pub fn report_from_snapshot(snapshot: &SimSnapshot, worker_count: usize) -> RunReport {
  RunReport {
    simulation: RunSummary {
      total_time_ms: snapshot.stats.elapsed_ms,
      total_tasks: snapshot.tasks.len(),
      workers: worker_count,
    },
    workers: snapshot.workers.clone(),
    tasks: snapshot.tasks.clone(),
    timeline: snapshot.timeline.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::TimelineEventKind;
  use std::sync::mpsc;

  #[test]
  fn task_set_shape() {
    let tasks = educational_tasks();
    assert_eq!(tasks.len(), 18);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
    assert!(tasks.iter().any(|t| t.task_type == "Encryption"));
    assert!(tasks.iter().any(|t| t.task_type == "Compression"));
  }

  #[tokio::test]
  async fn run_completes_all_tasks() {
    let (_tx, rx) = mpsc::channel();
    let mut sim = Simulation::new(4, 5).with_time_scale(0.01);
    let mut snapshots = Vec::new();
    sim.run(&rx, |s| snapshots.push(s)).await;

    let last = snapshots.last().expect("at least one snapshot");
    assert!(!last.running);
    assert_eq!(last.stats.completed_tasks, 18);
    assert!(last.workers.iter().all(|w| w.status == WorkerStatus::Idle));

    let starts = last
      .timeline
      .iter()
      .filter(|e| e.kind == TimelineEventKind::TaskStart)
      .count();
    let completes = last
      .timeline
      .iter()
      .filter(|e| e.kind == TimelineEventKind::TaskComplete)
      .count();
    assert_eq!(starts, 18);
    assert_eq!(completes, 18);
    assert!(last.stats.efficiency_pct <= 100);
  }

  #[tokio::test]
  async fn reset_command_aborts_run() {
    let (tx, rx) = mpsc::channel();
    tx.send(SimCommand::Reset).expect("send reset");
    let mut sim = Simulation::new(2, 5).with_time_scale(0.01);
    let mut last = None;
    sim.run(&rx, |s| last = Some(s)).await;

    let snapshot = last.expect("snapshot emitted");
    assert!(!snapshot.running);
    assert_eq!(snapshot.stats.completed_tasks, 0);
    assert!(snapshot.timeline.is_empty());
  }

  #[test]
  fn worker_count_is_clamped_and_locked_while_running() {
    let mut sim = Simulation::new(20, 50);
    assert_eq!(sim.worker_count(), MAX_WORKERS);
    sim.set_worker_count(0);
    assert_eq!(sim.worker_count(), 1);
  }
}
