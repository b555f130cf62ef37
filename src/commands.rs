use crate::calendar;
use crate::layout::TimeWindow;
use crate::model::{EventColor, Planner, ScheduledEvent};
use crate::storage::{
    format_clock, init_project_planner, load_planner, load_tasks_csv, locate_planner,
    parse_offset, save_planner, save_tasks_csv, PlannerLocation, PlannerScope,
};
use crate::ui;
use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use std::env;
use std::path::PathBuf;

pub fn init() -> Result<()> {
    let location = init_project_planner()?;
    println!("Initialized planner at {}", location.path.display());
    Ok(())
}

pub fn add(text: String) -> Result<()> {
    let window = TimeWindow::default();
    let (mut planner, location) = load_current_planner(&window)?;
    let task = planner.add_task(&text)?.clone();
    save_planner(&location, &planner, &window)?;
    println!("Added task: {}", task.text);
    Ok(())
}

pub fn list() -> Result<()> {
    let window = TimeWindow::default();
    let (planner, location) = load_current_planner(&window)?;
    println!(
        "Planner: {} ({})",
        location.path.display(),
        match location.scope {
            PlannerScope::Project => "project",
            PlannerScope::Global => "global",
        }
    );
    println!("To-Do:");
    if planner.tasks.is_empty() {
        println!("  (empty)");
    }
    for (idx, task) in planner.tasks.iter().enumerate() {
        let mark = if task.completed { "x" } else { " " };
        println!("  {}. [{}] {}", idx + 1, mark, task.text);
    }
    println!("Schedule:");
    if planner.events.is_empty() {
        println!("  (empty)");
    }
    for (idx, event) in planner.events.iter().enumerate() {
        println!(
            "  {}. {}-{}  {}  ({})",
            idx + 1,
            format_clock(&window, event.start),
            format_clock(&window, event.end),
            event.title,
            event.color
        );
    }
    Ok(())
}

pub fn toggle(index: usize) -> Result<()> {
    if index == 0 {
        bail!("task positions start at 1");
    }
    let window = TimeWindow::default();
    let (mut planner, location) = load_current_planner(&window)?;
    let task = planner.toggle_task(index - 1)?.clone();
    save_planner(&location, &planner, &window)?;
    println!(
        "Marked \"{}\" {}",
        task.text,
        if task.completed { "done" } else { "not done" }
    );
    Ok(())
}

pub fn remove(index: usize) -> Result<()> {
    if index == 0 {
        bail!("task positions start at 1");
    }
    let window = TimeWindow::default();
    let (mut planner, location) = load_current_planner(&window)?;
    let task = planner.remove_task(index - 1)?;
    save_planner(&location, &planner, &window)?;
    println!("Removed task: {}", task.text);
    Ok(())
}

pub fn event(title: String, start: String, end: String, color: String) -> Result<()> {
    let window = TimeWindow::default();
    let (mut planner, location) = load_current_planner(&window)?;
    let color: EventColor = color.parse()?;
    let start = parse_offset(&start, &window)?;
    let end = parse_offset(&end, &window)?;
    let event = ScheduledEvent::new(title, start, end, color)?;
    let summary = format!(
        "{}-{}  {}",
        format_clock(&window, event.start),
        format_clock(&window, event.end),
        event.title
    );
    planner.add_event(event);
    save_planner(&location, &planner, &window)?;
    println!("Scheduled {}", summary);
    Ok(())
}

pub fn calendar(month: Option<u32>, year: Option<i32>) -> Result<()> {
    let now = Local::now().date_naive();
    let month = month.unwrap_or_else(|| now.month());
    let year = year.unwrap_or_else(|| now.year());
    if !(1..=12).contains(&month) {
        bail!("month must be 1-12, got {}", month);
    }
    for line in calendar::month_grid(year, month, calendar::today_in(year, month)) {
        println!("{}", line);
    }
    Ok(())
}

pub fn export_csv(path: PathBuf) -> Result<()> {
    let window = TimeWindow::default();
    let (planner, _) = load_current_planner(&window)?;
    save_tasks_csv(&path, &planner.tasks)
        .with_context(|| format!("exporting tasks to {:?}", path))?;
    println!("Exported {} task(s) to {}", planner.tasks.len(), path.display());
    Ok(())
}

pub fn import_csv(path: PathBuf) -> Result<()> {
    let window = TimeWindow::default();
    let (mut planner, location) = load_current_planner(&window)?;
    let tasks = load_tasks_csv(&path).with_context(|| format!("importing tasks from {:?}", path))?;
    let count = tasks.len();
    planner.tasks = tasks;
    save_planner(&location, &planner, &window)?;
    println!("Imported {} task(s) from {}", count, path.display());
    Ok(())
}

pub fn tui() -> Result<()> {
    let window = TimeWindow::default();
    let (planner, location) = load_current_planner(&window)?;
    ui::run(planner, location, window)
}

fn load_current_planner(window: &TimeWindow) -> Result<(Planner, PlannerLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_planner(&cwd)?;
    let planner = load_planner(&location, window)?;
    Ok((planner, location))
}
