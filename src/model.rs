use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::layout;

/// The fixed palette offered by the add-event form and accepted in save
/// files. Tokens are the lowercase names.
pub const PALETTE: [EventColor; 6] = [
    EventColor::LightBlue,
    EventColor::LightGreen,
    EventColor::Yellow,
    EventColor::Pink,
    EventColor::Orange,
    EventColor::Grey,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    #[serde(rename = "lightblue")]
    LightBlue,
    #[serde(rename = "lightgreen")]
    LightGreen,
    Yellow,
    Pink,
    Orange,
    Grey,
}

impl EventColor {
    pub fn token(&self) -> &'static str {
        match self {
            EventColor::LightBlue => "lightblue",
            EventColor::LightGreen => "lightgreen",
            EventColor::Yellow => "yellow",
            EventColor::Pink => "pink",
            EventColor::Orange => "orange",
            EventColor::Grey => "grey",
        }
    }
}

impl fmt::Display for EventColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for EventColor {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        PALETTE
            .iter()
            .copied()
            .find(|c| c.token() == token)
            .ok_or(PlannerError::UnknownColor(token))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    #[error("task text must not be empty")]
    EmptyTask,
    #[error("event title must not be empty")]
    EmptyTitle,
    #[error("end time must be after start time")]
    InvalidRange,
    #[error("unknown color: {0} (expected one of lightblue, lightgreen, yellow, pink, orange, grey)")]
    UnknownColor(String),
    #[error("no task at position {0}")]
    TaskNotFound(usize),
    #[error("no event at position {0}")]
    EventNotFound(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: String,
    pub completed: bool,
}

impl TodoItem {
    pub fn new(text: impl Into<String>) -> Self {
        TodoItem {
            text: text.into(),
            completed: false,
        }
    }
}

/// A scheduled block of time. `start` and `end` are fractional hours
/// measured from the window's start hour, so the layout engine can place
/// the event without knowing about clock formats.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub title: String,
    pub start: f64,
    pub end: f64,
    pub color: EventColor,
}

impl ScheduledEvent {
    pub fn new(
        title: impl Into<String>,
        start: f64,
        end: f64,
        color: EventColor,
    ) -> Result<Self, PlannerError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(PlannerError::EmptyTitle);
        }
        layout::validate_range(start, end)?;
        Ok(ScheduledEvent {
            title,
            start,
            end,
            color,
        })
    }
}

/// All planner state, owned by whichever front end is running. Views
/// receive it by reference; key handlers and CLI commands mutate it
/// through these methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Planner {
    pub tasks: Vec<TodoItem>,
    pub events: Vec<ScheduledEvent>,
}

impl Planner {
    pub fn add_task(&mut self, text: &str) -> Result<&TodoItem, PlannerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PlannerError::EmptyTask);
        }
        self.tasks.push(TodoItem::new(text));
        Ok(self.tasks.last().expect("just pushed"))
    }

    pub fn toggle_task(&mut self, index: usize) -> Result<&TodoItem, PlannerError> {
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(PlannerError::TaskNotFound(index))?;
        task.completed = !task.completed;
        Ok(task)
    }

    pub fn remove_task(&mut self, index: usize) -> Result<TodoItem, PlannerError> {
        if index >= self.tasks.len() {
            return Err(PlannerError::TaskNotFound(index));
        }
        Ok(self.tasks.remove(index))
    }

    pub fn add_event(&mut self, event: ScheduledEvent) -> &ScheduledEvent {
        self.events.push(event);
        self.events.last().expect("just pushed")
    }

    pub fn remove_event(&mut self, index: usize) -> Result<ScheduledEvent, PlannerError> {
        if index >= self.events.len() {
            return Err(PlannerError::EventNotFound(index));
        }
        Ok(self.events.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_tokens_round_trip() {
        for color in PALETTE {
            assert_eq!(color.token().parse::<EventColor>().unwrap(), color);
        }
    }

    #[test]
    fn unknown_color_is_rejected() {
        assert!(matches!(
            "mauve".parse::<EventColor>(),
            Err(PlannerError::UnknownColor(_))
        ));
    }

    #[test]
    fn event_requires_title_and_valid_range() {
        assert!(matches!(
            ScheduledEvent::new("  ", 1.0, 2.0, EventColor::Yellow),
            Err(PlannerError::EmptyTitle)
        ));
        assert!(matches!(
            ScheduledEvent::new("Standup", 2.0, 2.0, EventColor::Yellow),
            Err(PlannerError::InvalidRange)
        ));
        assert!(ScheduledEvent::new("Standup", 1.0, 1.5, EventColor::Yellow).is_ok());
    }

    #[test]
    fn toggle_flips_completed() {
        let mut planner = Planner::default();
        planner.add_task("write report").unwrap();
        assert!(!planner.tasks[0].completed);
        planner.toggle_task(0).unwrap();
        assert!(planner.tasks[0].completed);
        planner.toggle_task(0).unwrap();
        assert!(!planner.tasks[0].completed);
    }

    #[test]
    fn empty_task_is_rejected() {
        let mut planner = Planner::default();
        assert!(matches!(
            planner.add_task("   "),
            Err(PlannerError::EmptyTask)
        ));
        assert!(planner.tasks.is_empty());
    }

    #[test]
    fn remove_out_of_range_reports_position() {
        let mut planner = Planner::default();
        assert!(matches!(
            planner.remove_task(3),
            Err(PlannerError::TaskNotFound(3))
        ));
        assert!(matches!(
            planner.remove_event(0),
            Err(PlannerError::EventNotFound(0))
        ));
    }
}
