use crate::layout::TimeWindow;
use crate::model::{EventColor, Planner, ScheduledEvent, TodoItem};
use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct PlannerLocation {
    pub path: PathBuf,
    pub scope: PlannerScope,
}

/// Wire form of the planner file. Schedule times travel as `HH:MM`
/// strings; fractional offsets are re-derived against the window on load.
#[derive(Serialize, Deserialize)]
struct PlannerFile {
    todo_list: Vec<TaskRecord>,
    schedule: Vec<EventRecord>,
}

#[derive(Serialize, Deserialize)]
struct TaskRecord {
    task: String,
    completed: bool,
}

#[derive(Serialize, Deserialize)]
struct EventRecord {
    title: String,
    start: String,
    end: String,
    color: EventColor,
}

pub fn init_project_planner() -> Result<PlannerLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(".dayplan");
    fs::create_dir_all(&dir).context("failed to create .dayplan directory")?;
    let path = dir.join("planner.json");
    let location = PlannerLocation {
        path: path.clone(),
        scope: PlannerScope::Project,
    };
    if !path.exists() {
        save_planner(&location, &Planner::default(), &TimeWindow::default())?;
    }
    Ok(location)
}

/// Nearest `.dayplan/planner.json` walking up from `start`, else the
/// per-user global file.
pub fn locate_planner(start: &Path) -> Result<PlannerLocation> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(".dayplan/planner.json");
        if candidate.exists() {
            return Ok(PlannerLocation {
                path: candidate,
                scope: PlannerScope::Project,
            });
        }
        dir = current.parent();
    }
    let dirs = ProjectDirs::from("", "", "dayplan").context("locating data directory")?;
    Ok(PlannerLocation {
        path: dirs.data_dir().join("planner.json"),
        scope: PlannerScope::Global,
    })
}

pub fn load_planner(location: &PlannerLocation, window: &TimeWindow) -> Result<Planner> {
    if location.path.exists() {
        read_planner(&location.path, window)
    } else {
        Ok(Planner::default())
    }
}

pub fn read_planner(path: &Path, window: &TimeWindow) -> Result<Planner> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let file: PlannerFile = serde_json::from_str(&data).context("parsing planner file")?;

    let mut planner = Planner::default();
    for record in file.todo_list {
        planner.tasks.push(TodoItem {
            text: record.task,
            completed: record.completed,
        });
    }
    for record in file.schedule {
        let start = parse_offset(&record.start, window)
            .with_context(|| format!("event \"{}\"", record.title))?;
        let end = parse_offset(&record.end, window)
            .with_context(|| format!("event \"{}\"", record.title))?;
        let event = ScheduledEvent::new(record.title, start, end, record.color)?;
        planner.add_event(event);
    }
    Ok(planner)
}

pub fn save_planner(
    location: &PlannerLocation,
    planner: &Planner,
    window: &TimeWindow,
) -> Result<()> {
    write_planner(&location.path, planner, window)
}

pub fn write_planner(path: &Path, planner: &Planner, window: &TimeWindow) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let file = PlannerFile {
        todo_list: planner
            .tasks
            .iter()
            .map(|task| TaskRecord {
                task: task.text.clone(),
                completed: task.completed,
            })
            .collect(),
        schedule: planner
            .events
            .iter()
            .map(|event| EventRecord {
                title: event.title.clone(),
                start: format_clock(window, event.start),
                end: format_clock(window, event.end),
                color: event.color,
            })
            .collect(),
    };
    let serialized = serde_json::to_string_pretty(&file).context("serializing planner")?;
    fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

/// Parses an `HH:MM` wall-clock string into a window offset, rejecting
/// times that fall outside the window.
pub fn parse_offset(clock: &str, window: &TimeWindow) -> Result<f64> {
    let (hour, minute) = parse_clock(clock)?;
    if hour < window.start_hour || hour > window.end_hour {
        bail!(
            "time {} is outside the schedule window {:02}:00-{:02}:00",
            clock,
            window.start_hour,
            window.end_hour
        );
    }
    let offset = window.offset(hour, minute);
    if offset > window.span() {
        bail!(
            "time {} is outside the schedule window {:02}:00-{:02}:00",
            clock,
            window.start_hour,
            window.end_hour
        );
    }
    Ok(offset)
}

pub fn parse_clock(clock: &str) -> Result<(u32, u32)> {
    let (hour, minute) = clock
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("invalid time (use HH:MM): {}", clock))?;
    let hour: u32 = hour
        .parse()
        .map_err(|_| anyhow!("invalid time (use HH:MM): {}", clock))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| anyhow!("invalid time (use HH:MM): {}", clock))?;
    if hour > 23 || minute > 59 {
        bail!("invalid time (use HH:MM): {}", clock);
    }
    Ok((hour, minute))
}

pub fn format_clock(window: &TimeWindow, offset: f64) -> String {
    let (hour, minute) = window.clock_of(offset);
    format!("{hour:02}:{minute:02}")
}

/// Writes the to-do list alone as CSV with a `Completed,Task` header and
/// `Yes`/`No` flags.
pub fn save_tasks_csv(path: &Path, tasks: &[TodoItem]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {:?}", path))?;
    writer.write_record(["Completed", "Task"])?;
    for task in tasks {
        writer.write_record([if task.completed { "Yes" } else { "No" }, task.text.as_str()])?;
    }
    writer.flush().context("flushing csv")?;
    Ok(())
}

pub fn load_tasks_csv(path: &Path) -> Result<Vec<TodoItem>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("reading {:?}", path))?;
    let mut tasks = Vec::new();
    for record in reader.records() {
        let record = record.context("reading csv record")?;
        let completed = record
            .get(0)
            .map(|v| v.trim().eq_ignore_ascii_case("yes"))
            .unwrap_or(false);
        let text = record
            .get(1)
            .ok_or_else(|| anyhow!("csv row missing task column"))?
            .to_string();
        tasks.push(TodoItem { text, completed });
    }
    Ok(tasks)
}
