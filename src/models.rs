use serde::{Serialize, Deserialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
  Pending,
  Processing,
  Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
  Idle,
  Processing,
}

/// A fabricated unit of work. Only the visualization consumes these records;
/// the byte transform itself never waits on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticTask {
  pub id: Uuid,
  pub name: String,
  pub task_type: String,
  pub duration_ms: u64,
  pub started_at: Option<DateTime<Utc>>,
  pub ended_at: Option<DateTime<Utc>>,
  pub worker_id: Option<usize>,
  pub status: TaskStatus,
  pub progress: u8,
}

impl SyntheticTask {
  pub fn new(name: impl Into<String>, task_type: impl Into<String>, duration_ms: u64) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      task_type: task_type.into(),
      duration_ms,
      started_at: None,
      ended_at: None,
      worker_id: None,
      status: TaskStatus::Pending,
      progress: 0,
    }
  }

  pub fn begin(&mut self, worker_id: usize, now: DateTime<Utc>) {
    self.worker_id = Some(worker_id);
    self.started_at = Some(now);
    self.status = TaskStatus::Processing;
    self.progress = 0;
  }

  /// Marks the task finished and returns the recorded wall-clock duration.
  pub fn complete(&mut self, now: DateTime<Utc>) -> u64 {
    self.ended_at = Some(now);
    self.status = TaskStatus::Completed;
    self.progress = 100;
    self.elapsed_since_start(now)
  }

  pub fn elapsed_since_start(&self, now: DateTime<Utc>) -> u64 {
    match self.started_at {
      Some(start) => now.signed_duration_since(start).num_milliseconds().max(0) as u64,
      None => 0,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualWorker {
  pub id: usize,
  pub name: String,
  pub status: WorkerStatus,
  pub current_task: Option<Uuid>,
  pub tasks_completed: u32,
  pub total_work_ms: u64,
}

impl VirtualWorker {
  pub fn new(id: usize) -> Self {
    Self {
      id,
      name: format!("Worker {}", id + 1),
      status: WorkerStatus::Idle,
      current_task: None,
      tasks_completed: 0,
      total_work_ms: 0,
    }
  }

  pub fn begin(&mut self, task_id: Uuid) {
    self.status = WorkerStatus::Processing;
    self.current_task = Some(task_id);
  }

  pub fn finish(&mut self, task_id: Uuid, work_ms: u64) {
    self.tasks_completed += 1;
    self.total_work_ms += work_ms;
    if self.current_task == Some(task_id) {
      self.status = WorkerStatus::Idle;
      self.current_task = None;
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
  TaskStart,
  TaskComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
  pub timestamp: DateTime<Utc>,
  pub kind: TimelineEventKind,
  pub worker_id: usize,
  pub task_id: Uuid,
  pub task_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<u64>,
}

impl TimelineEvent {
  pub fn started(task: &SyntheticTask, worker_id: usize, now: DateTime<Utc>) -> Self {
    Self {
      timestamp: now,
      kind: TimelineEventKind::TaskStart,
      worker_id,
      task_id: task.id,
      task_name: task.name.clone(),
      duration_ms: None,
    }
  }

  pub fn completed(task: &SyntheticTask, worker_id: usize, now: DateTime<Utc>, duration_ms: u64) -> Self {
    Self {
      timestamp: now,
      kind: TimelineEventKind::TaskComplete,
      worker_id,
      task_id: task.id,
      task_name: task.name.clone(),
      duration_ms: Some(duration_ms),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
  pub total_time_ms: u64,
  pub total_tasks: usize,
  pub workers: usize,
}

/// The exportable description of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
  pub simulation: RunSummary,
  pub workers: Vec<VirtualWorker>,
  pub tasks: Vec<SyntheticTask>,
  pub timeline: Vec<TimelineEvent>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn task_lifecycle() {
    let mut task = SyntheticTask::new("Encrypt Chunk 1", "Encryption", 2500);
    assert_eq!(task.status, TaskStatus::Pending);

    let start = Utc::now();
    task.begin(2, start);
    assert_eq!(task.status, TaskStatus::Processing);
    assert_eq!(task.worker_id, Some(2));

    let end = start + Duration::milliseconds(2400);
    let recorded = task.complete(end);
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100);
    assert_eq!(recorded, 2400);
  }

  #[test]
  fn worker_finish_clears_only_its_own_task() {
    let mut worker = VirtualWorker::new(0);
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    worker.begin(first);
    worker.begin(second);
    worker.finish(first, 300);
    assert_eq!(worker.status, WorkerStatus::Processing);
    assert_eq!(worker.current_task, Some(second));

    worker.finish(second, 200);
    assert_eq!(worker.status, WorkerStatus::Idle);
    assert_eq!(worker.tasks_completed, 2);
    assert_eq!(worker.total_work_ms, 500);
  }

  #[test]
  fn report_serializes_to_expected_shape() {
    let task = SyntheticTask::new("Validate Data", "Validation", 1200);
    let report = RunReport {
      simulation: RunSummary { total_time_ms: 5000, total_tasks: 1, workers: 4 },
      workers: vec![VirtualWorker::new(0)],
      tasks: vec![task],
      timeline: Vec::new(),
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["simulation"]["workers"], 4);
    assert_eq!(json["tasks"][0]["status"], "pending");
    assert_eq!(json["workers"][0]["name"], "Worker 1");
  }
}
