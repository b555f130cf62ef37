use anyhow::Result;
use clap::Parser;
use dayplan::{cli, commands};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::Add { text } => commands::add(text),
        cli::Command::List => commands::list(),
        cli::Command::Toggle { index } => commands::toggle(index),
        cli::Command::Remove { index } => commands::remove(index),
        cli::Command::Event {
            title,
            start,
            end,
            color,
        } => commands::event(title, start, end, color),
        cli::Command::Calendar { month, year } => commands::calendar(month, year),
        cli::Command::ExportCsv { path } => commands::export_csv(path),
        cli::Command::ImportCsv { path } => commands::import_csv(path),
        cli::Command::Tui => commands::tui(),
    }
}
