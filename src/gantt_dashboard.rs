//! Workers (virtual worker lanes and live progress)
//! Gantt (duration-scaled task bars per worker)
//! Timeline (event log with relative offsets)

use std::{
  error::Error,
  io,
  sync::mpsc,
  thread,
  time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use crossterm::{
  event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode},
  execute,
  terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
  backend::{Backend, CrosstermBackend},
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Span, Spans},
  widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
  Terminal,
};
use tokio::runtime::Runtime;

use encrypty::config::{Config, MAX_WORKERS};
use encrypty::models::{SyntheticTask, TaskStatus, TimelineEventKind, WorkerStatus};
use encrypty::simulation::{report_from_snapshot, SimCommand, SimSnapshot, Simulation};

const SIM_TICK_MS: u64 = 100;

#[derive(Clone, Copy)]
enum DashboardTab {
  Workers,
  Gantt,
  Timeline,
}

struct App {
  current_tab: DashboardTab,
  snapshot: SimSnapshot,
  worker_count: usize,
  notice: Option<String>,
}

impl App {
  fn new(snapshot: SimSnapshot) -> Self {
    let worker_count = snapshot.workers.len();
    Self {
      current_tab: DashboardTab::Workers,
      snapshot,
      worker_count,
      notice: None,
    }
  }

  fn next_tab(&mut self) {
    self.current_tab = match self.current_tab {
      DashboardTab::Workers => DashboardTab::Gantt,
      DashboardTab::Gantt => DashboardTab::Timeline,
      DashboardTab::Timeline => DashboardTab::Workers,
    }
  }

  fn previous_tab(&mut self) {
    self.current_tab = match self.current_tab {
      DashboardTab::Workers => DashboardTab::Timeline,
      DashboardTab::Gantt => DashboardTab::Workers,
      DashboardTab::Timeline => DashboardTab::Gantt,
    }
  }

  fn apply(&mut self, snapshot: SimSnapshot) {
    self.worker_count = snapshot.workers.len();
    self.snapshot = snapshot;
  }

  fn export(&mut self) {
    let report = report_from_snapshot(&self.snapshot, self.worker_count);
    let path = format!("gantt-chart-{}.json", Utc::now().timestamp_millis());
    let result = serde_json::to_string_pretty(&report)
      .map_err(|e| e.to_string())
      .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
    self.notice = Some(match result {
      Ok(()) => format!("Exported {}", path),
      Err(e) => format!("Export failed: {}", e),
    });
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  enable_raw_mode()?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend)?;

  let config = Config::from_env();

  let (cmd_tx, cmd_rx) = mpsc::channel::<SimCommand>();
  let (snap_tx, snap_rx) = mpsc::channel::<SimSnapshot>();

  {
    let worker_count = config.worker_count;
    thread::spawn(move || {
      let rt = Runtime::new().expect("Failed to start simulation runtime");
      let mut sim = Simulation::new(worker_count, SIM_TICK_MS);
      let _ = snap_tx.send(sim.snapshot());
      loop {
        match cmd_rx.recv() {
          Ok(SimCommand::Start) => {
            rt.block_on(sim.run(&cmd_rx, |s| {
              let _ = snap_tx.send(s);
            }));
          }
          Ok(SimCommand::Reset) => {
            sim.reset();
            let _ = snap_tx.send(sim.snapshot());
          }
          Ok(SimCommand::SetWorkers(count)) => {
            sim.set_worker_count(count);
            let _ = snap_tx.send(sim.snapshot());
          }
          Err(_) => break,
        }
      }
    });
  }

  let mut app = App::new(SimSnapshot {
    running: false,
    workers: Vec::new(),
    tasks: Vec::new(),
    timeline: Vec::new(),
    stats: Default::default(),
  });
  if let Ok(snapshot) = snap_rx.recv_timeout(Duration::from_secs(1)) {
    app.apply(snapshot);
  }

  let tick_rate = Duration::from_millis(config.tick_ms);
  let mut last_tick = Instant::now();

  loop {
    while let Ok(snapshot) = snap_rx.try_recv() {
      app.apply(snapshot);
    }
    terminal.draw(|f| ui(f, &app))?;

    let timeout = tick_rate
      .checked_sub(last_tick.elapsed())
      .unwrap_or_else(|| Duration::from_secs(0));
    if event::poll(timeout)? {
      if let CEvent::Key(key) = event::read()? {
        match key.code {
          KeyCode::Char('q') => break,
          KeyCode::Right => app.next_tab(),
          KeyCode::Left => app.previous_tab(),
          KeyCode::Char('s') => {
            if !app.snapshot.running {
              let _ = cmd_tx.send(SimCommand::Start);
            }
          }
          KeyCode::Char('r') => {
            let _ = cmd_tx.send(SimCommand::Reset);
          }
          KeyCode::Char('e') => app.export(),
          KeyCode::Up => {
            if !app.snapshot.running && app.worker_count < MAX_WORKERS {
              let _ = cmd_tx.send(SimCommand::SetWorkers(app.worker_count + 1));
            }
          }
          KeyCode::Down => {
            if !app.snapshot.running && app.worker_count > 1 {
              let _ = cmd_tx.send(SimCommand::SetWorkers(app.worker_count - 1));
            }
          }
          _ => {}
        }
      }
    }
    if last_tick.elapsed() >= tick_rate {
      last_tick = Instant::now();
    }
  }

  disable_raw_mode()?;
  execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
  terminal.show_cursor()?;
  Ok(())
}

fn ui<B: Backend>(f: &mut tui::Frame<B>, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .margin(1)
    .constraints([
      Constraint::Length(3),
      Constraint::Min(0),
      Constraint::Length(3),
    ].as_ref())
    .split(f.size());

  let tab_titles = vec!["Workers", "Gantt", "Timeline"];
  let tabs = Tabs::new(
    tab_titles
      .iter()
      .map(|t| Spans::from(Span::styled(*t, Style::default().fg(Color::Yellow))))
      .collect(),
  )
    .block(Block::default().borders(Borders::ALL).title("Multiprocessing Simulation"))
    .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .select(match app.current_tab {
      DashboardTab::Workers => 0,
      DashboardTab::Gantt => 1,
      DashboardTab::Timeline => 2,
    });
  f.render_widget(tabs, chunks[0]);

  match app.current_tab {
    DashboardTab::Workers => render_workers(f, app, chunks[1]),
    DashboardTab::Gantt => render_gantt(f, app, chunks[1]),
    DashboardTab::Timeline => render_timeline(f, app, chunks[1]),
  }

  let help = "s: Start | r: Reset | e: Export JSON | ↑/↓: Workers | ←/→: Tabs | q: Quit";
  let footer_text = match &app.notice {
    Some(notice) => format!("{} | {}", help, notice),
    None => help.to_string(),
  };
  let footer = Paragraph::new(footer_text)
    .style(Style::default().fg(Color::White))
    .block(Block::default().borders(Borders::ALL));
  f.render_widget(footer, chunks[2]);
}

fn stats_line(app: &App) -> String {
  let stats = &app.snapshot.stats;
  format!(
    "Elapsed: {:.2}s | Tasks: {}/{} | Active Workers: {} | Efficiency: {}% | Lanes: {}",
    stats.elapsed_ms as f64 / 1000.0,
    stats.completed_tasks,
    stats.total_tasks,
    stats.active_workers,
    stats.efficiency_pct,
    app.worker_count
  )
}

fn render_workers<B: Backend>(f: &mut tui::Frame<B>, app: &App, area: Rect) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
    .split(area);

  let stats = Paragraph::new(stats_line(app))
    .block(Block::default().borders(Borders::ALL).title("Run Statistics"));
  f.render_widget(stats, chunks[0]);

  let columns = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
    .split(chunks[1]);

  let worker_items: Vec<ListItem> = app.snapshot.workers.iter().map(|w| {
    let task_info = match w.current_task.and_then(|id| {
      app.snapshot.tasks.iter().find(|t| t.id == id)
    }) {
      Some(task) => format!("Task: {} ({}%)", task.name, task.progress),
      None => "No current task".into(),
    };
    let status_style = match w.status {
      WorkerStatus::Processing => Style::default().fg(Color::Cyan),
      WorkerStatus::Idle => Style::default().fg(Color::DarkGray),
    };
    let lines = vec![
      Spans::from(Span::styled(w.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
      Spans::from(Span::styled(format!("Status: {:?}", w.status), status_style)),
      Spans::from(Span::raw(task_info)),
      Spans::from(Span::raw(format!(
        "Completed: {} | Work: {} ms",
        w.tasks_completed, w.total_work_ms
      ))),
    ];
    ListItem::new(lines)
  }).collect();

  let workers_list = List::new(worker_items)
    .block(Block::default().borders(Borders::ALL).title("Virtual Workers"));
  f.render_widget(workers_list, columns[0]);

  let active_tasks: Vec<ListItem> = app.snapshot.tasks.iter()
    .filter(|t| t.status == TaskStatus::Processing)
    .map(|t| {
      let worker = t.worker_id
        .and_then(|id| app.snapshot.workers.get(id))
        .map(|w| w.name.clone())
        .unwrap_or_else(|| "?".into());
      ListItem::new(Spans::from(vec![
        Span::styled(format!("{} ", t.name), Style::default().fg(Color::Yellow)),
        Span::raw(format!("[{}] {}% on {}", t.task_type, t.progress, worker)),
      ]))
    })
    .collect();
  let tasks_list = List::new(if active_tasks.is_empty() {
    vec![ListItem::new(Spans::from(Span::raw("No active tasks")))]
  } else {
    active_tasks
  })
    .block(Block::default().borders(Borders::ALL).title("Active Tasks"));
  f.render_widget(tasks_list, columns[1]);
}

fn task_color(task_type: &str) -> Color {
  match task_type {
    "System" => Color::DarkGray,
    "File Read" => Color::Blue,
    "File Write" => Color::LightBlue,
    "Encryption" => Color::Green,
    "Validation" => Color::Red,
    "Compression" => Color::Magenta,
    _ => Color::Gray,
  }
}

fn timeline_origin(app: &App) -> Option<DateTime<Utc>> {
  app.snapshot.timeline.first().map(|e| e.timestamp)
}

fn lane_spans(
  tasks: &[SyntheticTask],
  worker_id: usize,
  origin: DateTime<Utc>,
  span_ms: u64,
  width: usize,
) -> Spans<'static> {
  let mut cells: Vec<Option<Color>> = vec![None; width];
  for task in tasks.iter().filter(|t| t.worker_id == Some(worker_id)) {
    let Some(started) = task.started_at else { continue };
    let start_off = started.signed_duration_since(origin).num_milliseconds().max(0) as u64;
    let end_off = task
      .ended_at
      .map(|e| e.signed_duration_since(origin).num_milliseconds().max(0) as u64)
      .unwrap_or(span_ms);
    let from = (start_off as usize * width / span_ms as usize).min(width.saturating_sub(1));
    let to = (end_off as usize * width / span_ms as usize).clamp(from + 1, width);
    for cell in cells[from..to].iter_mut() {
      *cell = Some(task_color(&task.task_type));
    }
  }

  // Collapse adjacent same-colored cells into single styled spans.
  let mut spans = Vec::new();
  let mut run_start = 0;
  for i in 1..=width {
    let boundary = i == width || cells[i] != cells[run_start];
    if boundary {
      let len = i - run_start;
      match cells[run_start] {
        Some(color) => spans.push(Span::styled("█".repeat(len), Style::default().fg(color))),
        None => spans.push(Span::raw(" ".repeat(len))),
      }
      run_start = i;
    }
  }
  Spans::from(spans)
}

fn render_gantt<B: Backend>(f: &mut tui::Frame<B>, app: &App, area: Rect) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
    .split(area);

  let stats = Paragraph::new(stats_line(app))
    .block(Block::default().borders(Borders::ALL).title("Run Statistics"));
  f.render_widget(stats, chunks[0]);

  let label_width = 12usize;
  let lane_width = (chunks[1].width as usize).saturating_sub(label_width + 4).max(10);
  let span_ms = app.snapshot.stats.elapsed_ms.max(1);

  let rows: Vec<ListItem> = match timeline_origin(app) {
    Some(origin) => app.snapshot.workers.iter().map(|w| {
      let mut label = format!("{:<width$}", w.name, width = label_width);
      label.truncate(label_width);
      let mut line = vec![Span::styled(label, Style::default().add_modifier(Modifier::BOLD))];
      line.extend(lane_spans(&app.snapshot.tasks, w.id, origin, span_ms, lane_width).0);
      ListItem::new(Spans::from(line))
    }).collect(),
    None => vec![ListItem::new(Spans::from(Span::raw(
      "No simulation data yet. Press 's' to start.",
    )))],
  };

  let title = format!("Gantt ({:.1}s window)", span_ms as f64 / 1000.0);
  let chart = List::new(rows)
    .block(Block::default().borders(Borders::ALL).title(title));
  f.render_widget(chart, chunks[1]);
}

fn render_timeline<B: Backend>(f: &mut tui::Frame<B>, app: &App, area: Rect) {
  let origin = timeline_origin(app);
  let items: Vec<ListItem> = app.snapshot.timeline.iter().map(|e| {
    let relative = origin
      .map(|o| e.timestamp.signed_duration_since(o).num_milliseconds().max(0) as f64 / 1000.0)
      .unwrap_or(0.0);
    let kind = match e.kind {
      TimelineEventKind::TaskStart => ("START", Color::Cyan),
      TimelineEventKind::TaskComplete => ("DONE ", Color::Green),
    };
    let worker = app.snapshot.workers.get(e.worker_id)
      .map(|w| w.name.clone())
      .unwrap_or_else(|| format!("Worker {}", e.worker_id + 1));
    let duration = e.duration_ms.map(|d| format!(" ({} ms)", d)).unwrap_or_default();
    ListItem::new(Spans::from(vec![
      Span::styled(format!("+{:7.2}s ", relative), Style::default().fg(Color::Green)),
      Span::styled(kind.0, Style::default().fg(kind.1).add_modifier(Modifier::BOLD)),
      Span::raw(format!(" {} on {}{}", e.task_name, worker, duration)),
    ]))
  }).collect();

  let list = List::new(items)
    .block(Block::default().borders(Borders::ALL).title("Timeline Events"));
  f.render_widget(list, area);
}
