use dayplan::model::{EventColor, Planner, ScheduledEvent, TodoItem};
use dayplan::notes;
use dayplan::storage::{load_tasks_csv, read_planner, save_tasks_csv, write_planner};
use dayplan::TimeWindow;
use std::fs;
use tempfile::tempdir;

fn build_sample_planner(window: &TimeWindow) -> Planner {
    let mut planner = Planner::default();
    planner.add_task("write report").unwrap();
    planner.add_task("call the dentist").unwrap();
    planner.toggle_task(1).unwrap();
    planner.add_event(
        ScheduledEvent::new(
            "Standup",
            window.offset(9, 0),
            window.offset(9, 30),
            EventColor::LightBlue,
        )
        .unwrap(),
    );
    planner.add_event(
        ScheduledEvent::new(
            "Design review",
            window.offset(13, 15),
            window.offset(14, 45),
            EventColor::Pink,
        )
        .unwrap(),
    );
    planner
}

#[test]
fn planner_json_round_trip() {
    let window = TimeWindow::default();
    let planner = build_sample_planner(&window);
    let dir = tempdir().unwrap();
    let path = dir.path().join("planner.json");

    write_planner(&path, &planner, &window).unwrap();
    let loaded = read_planner(&path, &window).unwrap();

    assert_eq!(loaded, planner);
}

#[test]
fn planner_json_stores_clock_strings() {
    let window = TimeWindow::default();
    let planner = build_sample_planner(&window);
    let dir = tempdir().unwrap();
    let path = dir.path().join("planner.json");

    write_planner(&path, &planner, &window).unwrap();
    let raw = fs::read_to_string(&path).unwrap();

    assert!(raw.contains("\"todo_list\""));
    assert!(raw.contains("\"schedule\""));
    assert!(raw.contains("\"09:00\""));
    assert!(raw.contains("\"09:30\""));
    assert!(raw.contains("\"13:15\""));
    assert!(raw.contains("\"lightblue\""));
    // Fractional offsets never reach the file.
    assert!(!raw.contains("1.0"));
}

#[test]
fn planner_load_rejects_times_outside_window() {
    let window = TimeWindow::default();
    let dir = tempdir().unwrap();
    let path = dir.path().join("planner.json");
    fs::write(
        &path,
        r#"{
  "todo_list": [],
  "schedule": [
    { "title": "Early bird", "start": "07:00", "end": "08:30", "color": "yellow" }
  ]
}"#,
    )
    .unwrap();

    let err = read_planner(&path, &window).unwrap_err();
    assert!(err.to_string().contains("Early bird"));
}

#[test]
fn tasks_csv_round_trip() {
    let tasks = vec![
        TodoItem {
            text: "write report".into(),
            completed: false,
        },
        TodoItem {
            text: "call the dentist, again".into(),
            completed: true,
        },
    ];
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");

    save_tasks_csv(&path, &tasks).unwrap();
    let loaded = load_tasks_csv(&path).unwrap();

    assert_eq!(loaded, tasks);
}

#[test]
fn tasks_csv_uses_yes_no_flags() {
    let tasks = vec![
        TodoItem {
            text: "done thing".into(),
            completed: true,
        },
        TodoItem {
            text: "open thing".into(),
            completed: false,
        },
    ];
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");

    save_tasks_csv(&path, &tasks).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    let mut lines = raw.lines();

    assert_eq!(lines.next(), Some("Completed,Task"));
    assert_eq!(lines.next(), Some("Yes,done thing"));
    assert_eq!(lines.next(), Some("No,open thing"));
}

#[test]
fn note_resave_preserves_creation_timestamp() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meeting.md");
    let first = "2025-03-01 09:00:00";
    let second = "2025-03-02 17:30:00";

    let doc = notes::save_note(&path, "Meeting notes", "# Agenda", first).unwrap();
    assert_eq!(doc.created, first);
    assert_eq!(doc.modified, first);

    let doc = notes::save_note(&path, "Meeting notes v2", "# Agenda\n\n- roadmap", second).unwrap();
    assert_eq!(doc.created, first);
    assert_eq!(doc.modified, second);
    assert_eq!(doc.title, "Meeting notes v2");

    let reopened = notes::open_note(&path).unwrap();
    assert_eq!(reopened, doc);
}

#[test]
fn note_save_defaults_empty_title() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scratch.md");
    let doc = notes::save_note(&path, "   ", "quick thought", "2025-03-01 09:00:00").unwrap();
    assert_eq!(doc.title, "Untitled");
    assert_eq!(doc.body, "quick thought");
}
