use crate::models::{ChartPoint, LogEntry, ProgressAggregate, TaskItem};
use crate::progress::{chart_points, timeline};
use chrono::NaiveDate;

/// Everything the page shows, read fresh from storage per request.
pub struct PageView {
    pub today: NaiveDate,
    pub progress: ProgressAggregate,
    pub logs: Vec<LogEntry>,
    pub tasks: Vec<TaskItem>,
    pub notice: Option<Notice>,
}

/// One-shot banner shown after a form action redirects back to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LogSaved,
    LogDeleted,
    TaskAdded,
    TaskDeleted,
    WeekUpdated,
    Imported,
    Reset,
    MissingFields,
    MissingTask,
    InvalidPercentage,
}

impl Notice {
    const ALL: [Notice; 10] = [
        Notice::LogSaved,
        Notice::LogDeleted,
        Notice::TaskAdded,
        Notice::TaskDeleted,
        Notice::WeekUpdated,
        Notice::Imported,
        Notice::Reset,
        Notice::MissingFields,
        Notice::MissingTask,
        Notice::InvalidPercentage,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Notice::LogSaved => "log-saved",
            Notice::LogDeleted => "log-deleted",
            Notice::TaskAdded => "task-added",
            Notice::TaskDeleted => "task-deleted",
            Notice::WeekUpdated => "week-updated",
            Notice::Imported => "imported",
            Notice::Reset => "reset",
            Notice::MissingFields => "missing-fields",
            Notice::MissingTask => "missing-task",
            Notice::InvalidPercentage => "invalid-percentage",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::LogSaved => "Log saved successfully!",
            Notice::LogDeleted => "Log deleted",
            Notice::TaskAdded => "Task added",
            Notice::TaskDeleted => "Task deleted",
            Notice::WeekUpdated => "Week progress updated",
            Notice::Imported => "Progress imported successfully!",
            Notice::Reset => "All progress has been reset",
            Notice::MissingFields => "Please fill in all fields",
            Notice::MissingTask => "Please enter a task",
            Notice::InvalidPercentage => "Percentage must be a number",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Notice::LogSaved | Notice::TaskAdded | Notice::WeekUpdated | Notice::Imported => {
                "success"
            }
            Notice::LogDeleted | Notice::TaskDeleted | Notice::Reset => "info",
            Notice::MissingFields | Notice::MissingTask | Notice::InvalidPercentage => "error",
        }
    }
}

pub fn render_index(view: &PageView) -> String {
    let progress = &view.progress;
    let notice = view
        .notice
        .map(|notice| {
            format!(
                r#"<div class="notice" data-type="{}">{}</div>"#,
                notice.kind(),
                escape_html(notice.message())
            )
        })
        .unwrap_or_default();

    INDEX_HTML
        .replace("{{NOTICE}}", &notice)
        .replace("{{DAYS}}", &progress.days_completed.to_string())
        .replace("{{HOURS}}", &format_hours(progress.hours_logged))
        .replace("{{TASKS}}", &progress.tasks_completed.to_string())
        .replace("{{PROJECTS}}", &progress.projects_done.to_string())
        .replace("{{CHART}}", &render_chart(&chart_points(progress)))
        .replace("{{TIMELINE}}", &render_timeline(progress))
        .replace("{{TODAY}}", &view.today.format("%Y-%m-%d").to_string())
        .replace("{{LOGS}}", &render_logs(&view.logs))
        .replace("{{TASK_LIST}}", &render_tasks(&view.tasks))
}

/// Bar chart on a fixed 0-100 axis.
pub fn render_chart(points: &[ChartPoint]) -> String {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 260.0;
    const PAD_X: f64 = 44.0;
    const PAD_Y: f64 = 34.0;
    const TOP: f64 = 20.0;

    let plot_height = HEIGHT - TOP - PAD_Y;
    let y = |value: f64| HEIGHT - PAD_Y - value / 100.0 * plot_height;
    let mut svg = String::new();

    for tick in (0..=100).step_by(25) {
        let y_pos = y(f64::from(tick));
        svg.push_str(&format!(
            r#"<line class="chart-grid" x1="{PAD_X}" y1="{y_pos:.1}" x2="{}" y2="{y_pos:.1}" /><text class="chart-label" x="{}" y="{:.1}" text-anchor="end">{tick}%</text>"#,
            WIDTH - PAD_X,
            PAD_X - 8.0,
            y_pos + 4.0,
        ));
    }

    if !points.is_empty() {
        let slot = (WIDTH - PAD_X * 2.0) / points.len() as f64;
        let bar_width = slot * 0.6;
        for (index, point) in points.iter().enumerate() {
            let value = f64::from(point.percentage.min(100));
            let x = PAD_X + slot * index as f64 + (slot - bar_width) / 2.0;
            let top = y(value);
            let center = x + bar_width / 2.0;
            svg.push_str(&format!(
                r#"<rect class="chart-bar bar-{index}" x="{x:.1}" y="{top:.1}" width="{bar_width:.1}" height="{:.1}" rx="6"><title>{}% Complete</title></rect><text class="chart-label" x="{center:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                HEIGHT - PAD_Y - top,
                point.percentage,
                HEIGHT - PAD_Y + 18.0,
                escape_html(&point.label),
            ));
        }
    }

    format!(
        r#"<svg id="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Weekly progress">{svg}</svg>"#
    )
}

fn render_timeline(progress: &ProgressAggregate) -> String {
    timeline(progress)
        .into_iter()
        .map(|row| {
            let number = row.week.trim_start_matches("week");
            format!(
                r#"<li class="timeline-item" data-week="{number}">
          <span class="timeline-week">Week {number}</span>
          <span class="timeline-progress">{}% Complete</span>
          <form method="post" action="/weeks/{}" class="inline">
            <input type="number" name="percentage" min="0" max="100" value="{}" aria-label="Week {number} percentage" />
            <button type="submit" class="btn-small">Set</button>
          </form>
        </li>"#,
                row.percentage, row.week, row.percentage
            )
        })
        .collect()
}

fn render_logs(logs: &[LogEntry]) -> String {
    if logs.is_empty() {
        return r#"<p class="empty">No logs yet. Start logging your learning!</p>"#.to_string();
    }

    logs.iter()
        .map(|log| {
            format!(
                r#"<div class="log-entry">
          <div class="log-entry-header">
            <span>{}</span>
            <span>{} hours</span>
          </div>
          <div class="log-entry-notes">{}</div>
          <form method="post" action="/logs/{}/delete" onsubmit="return confirm('Are you sure you want to delete this log?');">
            <button type="submit" class="btn-delete">Delete</button>
          </form>
        </div>"#,
                escape_html(&format_date(&log.date)),
                format_hours(log.hours),
                escape_html(&log.notes),
                log.id
            )
        })
        .collect()
}

fn render_tasks(tasks: &[TaskItem]) -> String {
    if tasks.is_empty() {
        return r#"<p class="empty">No tasks yet.</p>"#.to_string();
    }

    tasks
        .iter()
        .map(|task| {
            let id = escape_html(&task.id);
            format!(
                r#"<div class="task-item">
          <form method="post" action="/tasks/{id}/toggle" class="inline">
            <input type="checkbox" id="{id}" class="task-checkbox" onchange="this.form.submit()"{} />
            <label for="{id}">{}</label>
          </form>
          <form method="post" action="/tasks/{id}/delete" class="inline">
            <button type="submit" class="btn-delete">Delete</button>
          </form>
        </div>"#,
                if task.completed { " checked" } else { "" },
                escape_html(&task.text)
            )
        })
        .collect()
}

/// `2024-01-05` becomes `Jan 5, 2024`; anything unparsable is shown as-is.
pub fn format_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 100.0).round() / 100.0;
    format!("{rounded}")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Bootcamp Progress</title>
  <style>
    :root {
      --bg-1: #eef1fb;
      --ink: #24283b;
      --accent: #667eea;
      --accent-2: #2f4858;
      --danger: #c63b2b;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #f7f0ff 60%, #eef7ff 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(920px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      margin: 0;
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .chart-card, .card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .chart-bar {
      fill: rgba(102, 126, 234, 0.8);
      stroke: rgb(102, 126, 234);
      stroke-width: 2;
    }

    .bar-1 { fill: rgba(240, 147, 251, 0.8); stroke: rgb(240, 147, 251); }
    .bar-2 { fill: rgba(79, 172, 254, 0.8); stroke: rgb(79, 172, 254); }
    .bar-3 { fill: rgba(67, 233, 123, 0.8); stroke: rgb(67, 233, 123); }
    .bar-4 { fill: rgba(250, 112, 154, 0.8); stroke: rgb(250, 112, 154); }
    .bar-5 { fill: rgba(48, 207, 208, 0.8); stroke: rgb(48, 207, 208); }
    .bar-6 { fill: rgba(255, 216, 155, 0.8); stroke: rgb(255, 216, 155); }

    .timeline {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    .timeline-item, .task-item, .log-entry-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .log-entry {
      border-top: 1px solid rgba(47, 72, 88, 0.08);
      padding: 12px 0;
      display: grid;
      gap: 6px;
    }

    .log-form, .task-form {
      display: grid;
      gap: 10px;
    }

    .inline {
      display: inline-flex;
      gap: 8px;
      align-items: center;
    }

    input, textarea {
      font: inherit;
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    input[type="number"] {
      width: 5.5em;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .btn-small {
      padding: 6px 12px;
    }

    .btn-delete {
      background: transparent;
      color: var(--danger);
      padding: 4px 8px;
    }

    .btn-danger {
      background: var(--danger);
    }

    .data-actions {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: center;
    }

    .empty {
      text-align: center;
      color: #999;
    }

    .notice {
      position: fixed;
      top: 20px;
      right: 20px;
      padding: 1rem 1.5rem;
      border-radius: 8px;
      color: white;
      background: #2196f3;
      box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15);
      animation: fade 3.3s ease forwards;
    }

    .notice[data-type="success"] {
      background: #4caf50;
    }

    .notice[data-type="error"] {
      background: var(--danger);
    }

    @keyframes fade {
      0%, 90% { opacity: 1; }
      100% { opacity: 0; visibility: hidden; }
    }
  </style>
</head>
<body>
  {{NOTICE}}
  <main class="app">
    <header>
      <h1>Bootcamp Progress</h1>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Days completed</span><span id="days-completed" class="value">{{DAYS}}</span></div>
      <div class="stat"><span class="label">Hours logged</span><span id="hours-logged" class="value">{{HOURS}}</span></div>
      <div class="stat"><span class="label">Tasks completed</span><span id="tasks-completed" class="value">{{TASKS}}</span></div>
      <div class="stat"><span class="label">Projects done</span><span id="projects-done" class="value">{{PROJECTS}}</span></div>
    </section>

    <section class="chart-card">
      <h2>Weekly progress</h2>
      {{CHART}}
    </section>

    <section class="card">
      <h2>Timeline</h2>
      <ul class="timeline">
        {{TIMELINE}}
      </ul>
    </section>

    <section class="card" id="log">
      <h2>Learning log</h2>
      <form class="log-form" method="post" action="/logs">
        <input type="date" id="log-date" name="date" value="{{TODAY}}" />
        <input type="number" id="log-hours" name="hours" step="0.25" min="0" placeholder="Hours" />
        <textarea id="log-notes" name="notes" rows="3" placeholder="What did you learn?"></textarea>
        <button type="submit">Save log</button>
      </form>
      <div id="log-history">
        {{LOGS}}
      </div>
    </section>

    <section class="card" id="tasks">
      <h2>Daily tasks</h2>
      <div id="daily-tasks">
        {{TASK_LIST}}
      </div>
      <form class="task-form inline" method="post" action="/tasks">
        <input type="text" name="text" placeholder="Enter your task" />
        <button type="submit">Add task</button>
      </form>
    </section>

    <section class="card">
      <h2>Your data</h2>
      <div class="data-actions">
        <a href="/api/export"><button type="button">Export progress</button></a>
        <label>Import <input type="file" id="import-file" accept="application/json,.json" /></label>
        <form method="post" action="/reset" onsubmit="return confirm('Are you sure you want to reset all progress? This cannot be undone!') && confirm('This will delete all your logs, tasks, and progress. Are you absolutely sure?');">
          <button type="submit" class="btn-danger">Reset</button>
        </form>
      </div>
    </section>
  </main>
  <script>
    document.getElementById('import-file').addEventListener('change', async (event) => {
      const file = event.target.files[0];
      if (!file) {
        return;
      }
      const res = await fetch('/api/import', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: await file.text()
      });
      if (!res.ok) {
        alert('Error importing progress. Please check the file format.');
        return;
      }
      window.location.href = '/?notice=imported';
    });
  </script>
</body>
</html>
"#;
