pub mod calendar;
pub mod cli;
pub mod commands;
pub mod layout;
pub mod model;
pub mod notes;
pub mod storage;
pub mod ui;

pub use layout::TimeWindow;
pub use model::Planner;
