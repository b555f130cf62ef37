use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dayplan", version, about = "Terminal day planner: to-dos, schedule, notes, calendar")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project planner file in the current directory
    Init,
    /// Add a to-do item
    Add {
        /// Task text
        text: String,
    },
    /// List tasks and scheduled events
    List,
    /// Toggle a task's completed flag (1-based position from `list`)
    Toggle {
        index: usize,
    },
    /// Remove a task (1-based position from `list`)
    Remove {
        index: usize,
    },
    /// Add an event to the day schedule
    Event {
        /// Event title
        title: String,
        /// Start time, HH:MM within the schedule window
        #[arg(long)]
        start: String,
        /// End time, HH:MM within the schedule window
        #[arg(long)]
        end: String,
        /// Color token (lightblue, lightgreen, yellow, pink, orange, grey)
        #[arg(long, default_value = "lightblue")]
        color: String,
    },
    /// Print a month calendar
    Calendar {
        /// Month 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Export the to-do list as CSV
    ExportCsv {
        path: PathBuf,
    },
    /// Replace the to-do list from a CSV file
    ImportCsv {
        path: PathBuf,
    },
    /// Launch the interactive TUI
    Tui,
}
