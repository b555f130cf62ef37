use crate::calendar;
use crate::layout::{layout_events, TimeWindow};
use crate::model::{EventColor, Planner, ScheduledEvent, PALETTE};
use crate::notes;
use crate::storage::{read_planner, write_planner, PlannerLocation, PlannerScope};
use anyhow::Result;
use chrono::{Datelike, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// The current-time marker is recomputed on this cadence. The check runs
/// inside the event loop, so quitting the TUI also stops the timer.
const MARKER_REFRESH: Duration = Duration::from_secs(60);

pub fn run(planner: Planner, location: PlannerLocation, window: TimeWindow) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(planner, location, window);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    planner: Planner,
    location: PlannerLocation,
    window: TimeWindow,
    view: ViewMode,
    mode: Mode,
    focus: PlannerFocus,
    selected_task: usize,
    selected_event: usize,
    notes: NotesState,
    calendar: CalendarState,
    night: bool,
    marker: Option<f64>,
    marker_tick: Instant,
    status: String,
}

enum Mode {
    Normal,
    TaskEntry(FieldValue),
    EventEntry(EventForm),
    ConfirmRemove(RemoveTarget),
    PathPrompt {
        action: PathAction,
        input: FieldValue,
    },
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum ViewMode {
    Planner,
    Notes,
    Calendar,
}

impl ViewMode {
    fn label(&self) -> &'static str {
        match self {
            ViewMode::Planner => "Planner",
            ViewMode::Notes => "Notes",
            ViewMode::Calendar => "Calendar",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum PlannerFocus {
    Tasks,
    Schedule,
}

#[derive(Copy, Clone)]
enum RemoveTarget {
    Task(usize),
    Event(usize),
}

#[derive(Copy, Clone)]
enum PathAction {
    SavePlanner,
    LoadPlanner,
    SaveNote,
    OpenNote,
}

impl PathAction {
    fn title(&self) -> &'static str {
        match self {
            PathAction::SavePlanner => "Save planner to",
            PathAction::LoadPlanner => "Load planner from",
            PathAction::SaveNote => "Save note to (.md)",
            PathAction::OpenNote => "Open note from",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum NotesFocus {
    Title,
    Body,
}

struct NotesState {
    title: FieldValue,
    body: FieldValue,
    path: Option<PathBuf>,
    created: Option<String>,
    modified: Option<String>,
    focus: NotesFocus,
}

impl NotesState {
    fn new() -> Self {
        NotesState {
            title: FieldValue::new(""),
            body: FieldValue::new(""),
            path: None,
            created: None,
            modified: None,
            focus: NotesFocus::Title,
        }
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.focus {
            NotesFocus::Title => &mut self.title,
            NotesFocus::Body => &mut self.body,
        }
    }
}

struct CalendarState {
    year: i32,
    month: u32,
}

impl CalendarState {
    fn now() -> Self {
        let today = Local::now().date_naive();
        CalendarState {
            year: today.year(),
            month: today.month(),
        }
    }
}

struct EventForm {
    title: FieldValue,
    hours: Vec<u32>,
    minutes: Vec<u32>,
    start_hour: usize,
    start_minute: usize,
    end_hour: usize,
    end_minute: usize,
    color: usize,
    field: EventField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum EventField {
    Title,
    StartHour,
    StartMinute,
    EndHour,
    EndMinute,
    Color,
}

impl EventForm {
    fn new(window: &TimeWindow) -> Self {
        let hours = window.selectable_hours();
        let minutes = window.selectable_minutes();
        let start_hour = hours.iter().position(|h| *h == 9).unwrap_or(0);
        let end_hour = hours.iter().position(|h| *h == 10).unwrap_or(start_hour);
        EventForm {
            title: FieldValue::new(""),
            hours,
            minutes,
            start_hour,
            start_minute: 0,
            end_hour,
            end_minute: 0,
            color: 0,
            field: EventField::Title,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            EventField::Title => EventField::StartHour,
            EventField::StartHour => EventField::StartMinute,
            EventField::StartMinute => EventField::EndHour,
            EventField::EndHour => EventField::EndMinute,
            EventField::EndMinute => EventField::Color,
            EventField::Color => EventField::Title,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            EventField::Title => EventField::Color,
            EventField::StartHour => EventField::Title,
            EventField::StartMinute => EventField::StartHour,
            EventField::EndHour => EventField::StartMinute,
            EventField::EndMinute => EventField::EndHour,
            EventField::Color => EventField::EndMinute,
        };
    }

    /// Steps the active selector through its fixed value set. The title
    /// field ignores this; it is edited with character input.
    fn cycle(&mut self, delta: isize) {
        let step = |idx: usize, len: usize| -> usize {
            if len == 0 {
                return 0;
            }
            (idx as isize + delta).rem_euclid(len as isize) as usize
        };
        match self.field {
            EventField::Title => {}
            EventField::StartHour => self.start_hour = step(self.start_hour, self.hours.len()),
            EventField::StartMinute => {
                self.start_minute = step(self.start_minute, self.minutes.len())
            }
            EventField::EndHour => self.end_hour = step(self.end_hour, self.hours.len()),
            EventField::EndMinute => self.end_minute = step(self.end_minute, self.minutes.len()),
            EventField::Color => self.color = step(self.color, PALETTE.len()),
        }
    }

    fn start(&self, window: &TimeWindow) -> f64 {
        window.offset(self.hours[self.start_hour], self.minutes[self.start_minute])
    }

    fn end(&self, window: &TimeWindow) -> f64 {
        window.offset(self.hours[self.end_hour], self.minutes[self.end_minute])
    }

    fn chosen_color(&self) -> EventColor {
        PALETTE[self.color % PALETTE.len()]
    }
}

struct Theme {
    bg: Color,
    text: Color,
    panel: Color,
    accent: Color,
}

impl App {
    fn new(planner: Planner, location: PlannerLocation, window: TimeWindow) -> Self {
        let status = format!("Loaded planner from {}", location.path.display());
        let marker = window.marker(Local::now().time());
        App {
            planner,
            location,
            window,
            view: ViewMode::Planner,
            mode: Mode::Normal,
            focus: PlannerFocus::Tasks,
            selected_task: 0,
            selected_event: 0,
            notes: NotesState::new(),
            calendar: CalendarState::now(),
            night: false,
            marker,
            marker_tick: Instant::now(),
            status,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            if self.marker_tick.elapsed() >= MARKER_REFRESH {
                self.refresh_marker();
            }
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn refresh_marker(&mut self) {
        self.marker = self.window.marker(Local::now().time());
        self.marker_tick = Instant::now();
    }

    fn theme(&self) -> Theme {
        if self.night {
            Theme {
                bg: Color::Rgb(35, 17, 35),
                text: Color::Rgb(218, 65, 103),
                panel: Color::Rgb(62, 15, 6),
                accent: Color::Rgb(59, 83, 96),
            }
        } else {
            Theme {
                bg: Color::Rgb(16, 18, 24),
                text: Color::Rgb(221, 221, 210),
                panel: Color::Rgb(38, 70, 83),
                accent: Color::Rgb(136, 213, 211),
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::TaskEntry(_) => self.handle_task_entry_key(key),
            Mode::EventEntry(_) => self.handle_event_form_key(key),
            Mode::ConfirmRemove(_) => self.handle_confirm_key(key),
            Mode::PathPrompt { .. } => self.handle_path_prompt_key(key),
        }
        Ok(false)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        // The notes editor consumes printable characters, so global keys
        // do not apply there; Esc leaves the editor instead.
        if self.view == ViewMode::Notes {
            self.handle_notes_key(key);
            return Ok(false);
        }
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('1') => self.set_view(ViewMode::Planner),
            KeyCode::Char('2') => self.set_view(ViewMode::Notes),
            KeyCode::Char('3') => self.set_view(ViewMode::Calendar),
            KeyCode::Char('t') => {
                self.night = !self.night;
                self.status = format!(
                    "Switched to {} mode",
                    if self.night { "night" } else { "day" }
                );
            }
            _ => match self.view {
                ViewMode::Planner => self.handle_planner_key(key),
                ViewMode::Calendar => self.handle_calendar_key(key),
                ViewMode::Notes => {}
            },
        }
        Ok(false)
    }

    fn handle_planner_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char('h')
            | KeyCode::Char('l') => {
                self.focus = match self.focus {
                    PlannerFocus::Tasks => PlannerFocus::Schedule,
                    PlannerFocus::Schedule => PlannerFocus::Tasks,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char(' ') => {
                if self.focus == PlannerFocus::Tasks {
                    match self.planner.toggle_task(self.selected_task) {
                        Ok(task) => {
                            self.status = format!(
                                "\"{}\" marked {}",
                                task.text,
                                if task.completed { "done" } else { "not done" }
                            );
                        }
                        Err(_) => self.status = "No task selected".into(),
                    }
                }
            }
            KeyCode::Char('a') => {
                self.mode = Mode::TaskEntry(FieldValue::new(""));
                self.status = "New task (Enter add, Esc cancel)".into();
            }
            KeyCode::Char('e') => {
                self.mode = Mode::EventEntry(EventForm::new(&self.window));
                self.status =
                    "New event (Tab move, Up/Down change value, Enter add, Esc cancel)".into();
            }
            KeyCode::Char('d') => self.request_remove(),
            KeyCode::Char('s') => {
                let path = self.location.path.display().to_string();
                self.mode = Mode::PathPrompt {
                    action: PathAction::SavePlanner,
                    input: FieldValue::new(&path),
                };
            }
            KeyCode::Char('o') => {
                let path = self.location.path.display().to_string();
                self.mode = Mode::PathPrompt {
                    action: PathAction::LoadPlanner,
                    input: FieldValue::new(&path),
                };
            }
            _ => {}
        }
        self.ensure_bounds();
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.shift_calendar(-1),
            KeyCode::Right | KeyCode::Char('l') => self.shift_calendar(1),
            KeyCode::Up | KeyCode::Char('k') => self.calendar.year += 1,
            KeyCode::Down | KeyCode::Char('j') => self.calendar.year -= 1,
            KeyCode::Home => self.calendar = CalendarState::now(),
            _ => {}
        }
    }

    fn handle_notes_key(&mut self, key: KeyEvent) {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.set_view(ViewMode::Planner),
            KeyCode::Char('s') if control => self.request_note_save(),
            KeyCode::Char('o') if control => {
                self.mode = Mode::PathPrompt {
                    action: PathAction::OpenNote,
                    input: FieldValue::new(""),
                };
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.notes.focus = match self.notes.focus {
                    NotesFocus::Title => NotesFocus::Body,
                    NotesFocus::Body => NotesFocus::Title,
                };
            }
            KeyCode::Left => self.notes.active_field_mut().move_left(),
            KeyCode::Right => self.notes.active_field_mut().move_right(),
            KeyCode::Up => self.notes.active_field_mut().move_up(),
            KeyCode::Down => self.notes.active_field_mut().move_down(),
            KeyCode::Backspace => self.notes.active_field_mut().backspace(),
            KeyCode::Enter => match self.notes.focus {
                NotesFocus::Title => self.notes.focus = NotesFocus::Body,
                NotesFocus::Body => self.notes.body.insert_char('\n'),
            },
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.notes.active_field_mut().insert_char(c);
                }
            }
            _ => {}
        }
    }

    fn handle_task_entry_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let mut close = false;
        if let Mode::TaskEntry(field) = &mut mode {
            match key.code {
                KeyCode::Esc => {
                    close = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Enter => match self.planner.add_task(&field.value) {
                    Ok(task) => {
                        self.status = format!("Added task: {}", task.text);
                        self.selected_task = self.planner.tasks.len().saturating_sub(1);
                        close = true;
                    }
                    Err(err) => self.status = format!("Could not add: {}", err),
                },
                KeyCode::Left => field.move_left(),
                KeyCode::Right => field.move_right(),
                KeyCode::Backspace => field.backspace(),
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        field.insert_char(c);
                    }
                }
                _ => {}
            }
        }
        self.mode = if close { Mode::Normal } else { mode };
    }

    fn handle_event_form_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let mut close = false;
        if let Mode::EventEntry(form) = &mut mode {
            match key.code {
                KeyCode::Esc => {
                    close = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Tab => form.next_field(),
                KeyCode::BackTab => form.prev_field(),
                KeyCode::Up => form.cycle(-1),
                KeyCode::Down => form.cycle(1),
                KeyCode::Left => {
                    if form.field == EventField::Title {
                        form.title.move_left();
                    } else {
                        form.cycle(-1);
                    }
                }
                KeyCode::Right => {
                    if form.field == EventField::Title {
                        form.title.move_right();
                    } else {
                        form.cycle(1);
                    }
                }
                KeyCode::Backspace => {
                    if form.field == EventField::Title {
                        form.title.backspace();
                    }
                }
                KeyCode::Enter => {
                    let start = form.start(&self.window);
                    let end = form.end(&self.window);
                    match ScheduledEvent::new(&form.title.value, start, end, form.chosen_color()) {
                        Ok(event) => {
                            self.status = format!("Added event: {}", event.title);
                            self.planner.add_event(event);
                            self.selected_event = self.planner.events.len().saturating_sub(1);
                            close = true;
                        }
                        // Input stays as typed; the form reopens for correction.
                        Err(err) => self.status = format!("Could not add: {}", err),
                    }
                }
                KeyCode::Char(c) => {
                    if form.field == EventField::Title
                        && !key
                            .modifiers
                            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        form.title.insert_char(c);
                    }
                }
                _ => {}
            }
        }
        self.mode = if close { Mode::Normal } else { mode };
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let target = match self.mode {
            Mode::ConfirmRemove(target) => target,
            _ => return,
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let outcome = match target {
                    RemoveTarget::Task(idx) => self
                        .planner
                        .remove_task(idx)
                        .map(|task| format!("Removed task: {}", task.text)),
                    RemoveTarget::Event(idx) => self
                        .planner
                        .remove_event(idx)
                        .map(|event| format!("Removed event: {}", event.title)),
                };
                self.status = match outcome {
                    Ok(message) => message,
                    Err(err) => format!("Remove failed: {}", err),
                };
                self.mode = Mode::Normal;
                self.ensure_bounds();
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Remove canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn handle_path_prompt_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let mut close = false;
        if let Mode::PathPrompt { action, input } = &mut mode {
            match key.code {
                KeyCode::Esc => {
                    close = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Enter => {
                    let path = PathBuf::from(input.value.trim());
                    if path.as_os_str().is_empty() {
                        self.status = "A file path is required".into();
                    } else {
                        self.run_path_action(*action, path);
                        close = true;
                    }
                }
                KeyCode::Left => input.move_left(),
                KeyCode::Right => input.move_right(),
                KeyCode::Backspace => input.backspace(),
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        input.insert_char(c);
                    }
                }
                _ => {}
            }
        }
        self.mode = if close { Mode::Normal } else { mode };
    }

    fn run_path_action(&mut self, action: PathAction, path: PathBuf) {
        match action {
            PathAction::SavePlanner => {
                match write_planner(&path, &self.planner, &self.window) {
                    Ok(()) => self.status = format!("Saved planner to {}", path.display()),
                    Err(err) => self.status = format!("Save failed: {:#}", err),
                }
            }
            PathAction::LoadPlanner => match read_planner(&path, &self.window) {
                Ok(planner) => {
                    self.planner = planner;
                    self.selected_task = 0;
                    self.selected_event = 0;
                    self.status = format!("Loaded planner from {}", path.display());
                }
                Err(err) => self.status = format!("Load failed: {:#}", err),
            },
            PathAction::SaveNote => self.save_note_to(path),
            PathAction::OpenNote => match notes::open_note(&path) {
                Ok(doc) => {
                    self.notes.title = FieldValue::new(&doc.title);
                    self.notes.body = FieldValue::new(&doc.body);
                    self.notes.created = Some(doc.created);
                    self.notes.modified = Some(doc.modified);
                    self.notes.path = Some(path.clone());
                    self.notes.focus = NotesFocus::Body;
                    self.status = format!("Opened {}", path.display());
                }
                // Nothing is loaded on a bad header; the warning is the
                // only effect.
                Err(err) => self.status = format!("Could not open note: {}", err),
            },
        }
    }

    fn request_note_save(&mut self) {
        match self.notes.path.clone() {
            Some(path) => self.save_note_to(path),
            None => {
                self.mode = Mode::PathPrompt {
                    action: PathAction::SaveNote,
                    input: FieldValue::new(""),
                };
            }
        }
    }

    fn save_note_to(&mut self, path: PathBuf) {
        let now = notes::timestamp_now();
        match notes::save_note(&path, &self.notes.title.value, &self.notes.body.value, &now) {
            Ok(doc) => {
                self.notes.created = Some(doc.created);
                self.notes.modified = Some(doc.modified);
                self.notes.path = Some(path.clone());
                // The markdown write stands regardless of what pandoc does.
                match notes::export_pdf(&path) {
                    Ok(pdf) => {
                        self.status = format!(
                            "Saved {} and exported {}",
                            path.display(),
                            pdf.display()
                        );
                    }
                    Err(err) => {
                        self.status =
                            format!("Saved {} (pdf export failed: {})", path.display(), err);
                    }
                }
            }
            Err(err) => self.status = format!("Could not save note: {}", err),
        }
    }

    fn request_remove(&mut self) {
        match self.focus {
            PlannerFocus::Tasks => {
                if self.planner.tasks.get(self.selected_task).is_some() {
                    self.mode = Mode::ConfirmRemove(RemoveTarget::Task(self.selected_task));
                } else {
                    self.status = "No task selected".into();
                }
            }
            PlannerFocus::Schedule => {
                if self.planner.events.get(self.selected_event).is_some() {
                    self.mode = Mode::ConfirmRemove(RemoveTarget::Event(self.selected_event));
                } else {
                    self.status = "No event selected".into();
                }
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let (selected, len) = match self.focus {
            PlannerFocus::Tasks => (&mut self.selected_task, self.planner.tasks.len()),
            PlannerFocus::Schedule => (&mut self.selected_event, self.planner.events.len()),
        };
        if len == 0 {
            *selected = 0;
            return;
        }
        let next = (*selected as isize + delta).clamp(0, len as isize - 1);
        *selected = next as usize;
    }

    fn ensure_bounds(&mut self) {
        self.selected_task = self
            .selected_task
            .min(self.planner.tasks.len().saturating_sub(1));
        self.selected_event = self
            .selected_event
            .min(self.planner.events.len().saturating_sub(1));
    }

    fn set_view(&mut self, view: ViewMode) {
        if self.view != view {
            self.view = view;
            self.status = match view {
                ViewMode::Notes => "Notes (Ctrl+S save, Ctrl+O open, Esc back)".into(),
                other => format!("Switched to {} view", other.label()),
            };
        }
        if view == ViewMode::Planner {
            self.refresh_marker();
        }
    }

    fn shift_calendar(&mut self, delta: i32) {
        let (year, month) = calendar::step_month(self.calendar.year, self.calendar.month, delta);
        self.calendar.year = year;
        self.calendar.month = month;
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        match self.view {
            ViewMode::Planner => self.draw_planner(f, layout[1]),
            ViewMode::Notes => self.draw_notes(f, layout[1]),
            ViewMode::Calendar => self.draw_calendar(f, layout[1]),
        }
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::TaskEntry(field) => self.draw_task_entry(f, field),
            Mode::EventEntry(form) => self.draw_event_form(f, form),
            Mode::ConfirmRemove(target) => self.draw_confirm(f, *target),
            Mode::PathPrompt { action, input } => self.draw_path_prompt(f, *action, input),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let theme = self.theme();
        let scope = match self.location.scope {
            PlannerScope::Project => "project",
            PlannerScope::Global => "global",
        };
        let title = Line::from(vec![
            Span::styled(
                "dayplan ",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                Local::now().format("%B %d, %Y | %A").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(scope, Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("view {}", self.view.label().to_lowercase()),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("  •  "),
            Span::styled(
                if self.night { "night" } else { "day" },
                Style::default().fg(Color::Gray),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_planner(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);
        self.draw_tasks(f, chunks[0]);
        self.draw_schedule(f, chunks[1]);
    }

    fn draw_tasks(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let theme = self.theme();
        let focused = self.focus == PlannerFocus::Tasks;
        let items = if self.planner.tasks.is_empty() {
            vec![ListItem::new("No tasks yet (press a)")]
        } else {
            self.planner
                .tasks
                .iter()
                .map(|task| {
                    let mark = if task.completed { "[x] " } else { "[ ] " };
                    let mut style = Style::default().fg(theme.text);
                    if task.completed {
                        style = style
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT);
                    }
                    ListItem::new(Line::from(vec![
                        Span::styled(mark, Style::default().fg(theme.accent)),
                        Span::styled(task.text.clone(), style),
                    ]))
                })
                .collect()
        };

        let mut state = ListState::default();
        if focused && !self.planner.tasks.is_empty() {
            state.select(Some(self.selected_task));
        }

        let block = Block::default()
            .title(Span::styled(
                format!("To-Do List ({})", self.planner.tasks.len()),
                Style::default()
                    .fg(if focused { theme.accent } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                theme.accent
            } else {
                Color::DarkGray
            }))
            .style(Style::default().bg(theme.bg));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(theme.panel)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_schedule(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let theme = self.theme();
        let focused = self.focus == PlannerFocus::Schedule;
        let block = Block::default()
            .title(Span::styled(
                format!(
                    "Schedule {:02}:00-{:02}:00 ({})",
                    self.window.start_hour,
                    self.window.end_hour,
                    self.planner.events.len()
                ),
                Style::default()
                    .fg(if focused { theme.accent } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                theme.accent
            } else {
                Color::DarkGray
            }))
            .style(Style::default().bg(theme.bg));
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let height = f64::from(inner.height);
        let gutter = 7.min(inner.width);

        // Hour labels down the left edge, one per selectable hour, each
        // at its normalized position scaled to the pane height.
        for hour in self.window.selectable_hours() {
            let frac = self.window.normalized(self.window.offset(hour, 0));
            let y = inner.y + scale(frac, height).min(inner.height - 1);
            let rect = Rect {
                x: inner.x,
                y,
                width: gutter,
                height: 1,
            };
            let label = Paragraph::new(format!("{hour:02}:00"))
                .style(Style::default().fg(theme.text).bg(theme.panel));
            f.render_widget(label, rect);
        }

        // Event rectangles, insertion order: a later event drawn over an
        // earlier one wins, which is the documented overlap behavior.
        let lane_x = inner.x + gutter;
        let lane_width = inner.width.saturating_sub(gutter);
        if lane_width > 0 {
            for (idx, event_block) in layout_events(&self.window, &self.planner.events)
                .iter()
                .enumerate()
            {
                let top = scale(event_block.top, height).min(inner.height - 1);
                let rows = scale(event_block.height, height)
                    .max(1)
                    .min(inner.height - top);
                let rect = Rect {
                    x: lane_x,
                    y: inner.y + top,
                    width: lane_width,
                    height: rows,
                };
                let mut style = Style::default()
                    .bg(event_color(event_block.color))
                    .fg(Color::Black);
                if focused && idx == self.selected_event {
                    style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                f.render_widget(Clear, rect);
                f.render_widget(
                    Paragraph::new(event_block.label.clone())
                        .style(style)
                        .wrap(Wrap { trim: true }),
                    rect,
                );
            }
        }

        // Current-time marker, drawn last so it stays visible on top of
        // any event it crosses.
        if let Some(frac) = self.marker {
            let y = inner.y + scale(frac, height).min(inner.height - 1);
            let rect = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: 1,
            };
            let line = Paragraph::new("─".repeat(inner.width as usize))
                .style(Style::default().fg(Color::Red));
            f.render_widget(line, rect);
        }
    }

    fn draw_notes(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let theme = self.theme();
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let title_lines = field_lines(
            "Title",
            &self.notes.title,
            self.notes.focus == NotesFocus::Title,
        );
        f.render_widget(Paragraph::new(title_lines), sections[0]);

        let metadata = match (&self.notes.created, &self.notes.modified) {
            (Some(created), Some(modified)) => {
                format!("Created: {} | Last Modified: {}", created, modified)
            }
            _ => "(unsaved note)".to_string(),
        };
        f.render_widget(
            Paragraph::new(metadata).style(Style::default().fg(Color::Gray)),
            sections[1],
        );

        let body_focused = self.notes.focus == NotesFocus::Body;
        let body_text = if body_focused {
            self.notes.body.with_caret()
        } else {
            self.notes.body.value.clone()
        };
        let body = Paragraph::new(body_text)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(theme.text))
            .block(
                Block::default()
                    .title(Span::styled(
                        "Markdown",
                        Style::default()
                            .fg(if body_focused { theme.accent } else { Color::Gray })
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if body_focused {
                        theme.accent
                    } else {
                        Color::DarkGray
                    }))
                    .style(Style::default().bg(theme.bg)),
            );
        f.render_widget(body, sections[2]);

        let path_line = match &self.notes.path {
            Some(path) => format!("File: {}", path.display()),
            None => "File: (none)".to_string(),
        };
        f.render_widget(
            Paragraph::new(path_line).style(Style::default().fg(Color::DarkGray)),
            sections[3],
        );
    }

    fn draw_calendar(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let theme = self.theme();
        let today = calendar::today_in(self.calendar.year, self.calendar.month);
        let mut lines: Vec<Line<'static>> = Vec::new();
        for (idx, text) in calendar::month_grid(self.calendar.year, self.calendar.month, today)
            .into_iter()
            .enumerate()
        {
            let style = match idx {
                0 => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                2 => Style::default().fg(Color::Gray),
                _ => Style::default().fg(theme.text),
            };
            lines.push(Line::from(Span::styled(text, style)));
        }

        let block = Block::default()
            .title(Span::styled(
                "Calendar",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg));
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = |text: &str| Span::styled(text.to_string(), Style::default().fg(Color::LightCyan));
        let mut spans = match self.view {
            ViewMode::Planner => vec![
                key("1/2/3"),
                Span::raw(" view  "),
                key("Tab"),
                Span::raw(" pane  "),
                key("↑↓"),
                Span::raw(" select  "),
                key("Space"),
                Span::raw(" toggle  "),
                key("a"),
                Span::raw(" task  "),
                key("e"),
                Span::raw(" event  "),
                key("d"),
                Span::raw(" remove  "),
                key("s/o"),
                Span::raw(" save/load  "),
            ],
            ViewMode::Notes => vec![
                key("Ctrl+S"),
                Span::raw(" save  "),
                key("Ctrl+O"),
                Span::raw(" open  "),
                key("Tab"),
                Span::raw(" title/body  "),
                key("Esc"),
                Span::raw(" back  "),
            ],
            ViewMode::Calendar => vec![
                key("1/2/3"),
                Span::raw(" view  "),
                key("←→"),
                Span::raw(" month  "),
                key("↑↓"),
                Span::raw(" year  "),
                key("Home"),
                Span::raw(" today  "),
            ],
        };
        if self.view != ViewMode::Notes {
            spans.extend([
                key("t"),
                Span::raw(" theme  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]);
        }
        Line::from(spans)
    }

    fn draw_task_entry(&self, f: &mut ratatui::Frame<'_>, field: &FieldValue) {
        let theme = self.theme();
        let area = centered_rect(50, 20, f.size());
        let mut lines = field_lines("Task", field, true);
        lines.push(Line::from(Span::styled(
            "Enter to add • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(Span::styled(
                    "New Task",
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_event_form(&self, f: &mut ratatui::Frame<'_>, form: &EventForm) {
        let theme = self.theme();
        let area = centered_rect(60, 50, f.size());
        let mut lines = field_lines("Title", &form.title, form.field == EventField::Title);
        lines.push(Line::from(""));
        lines.push(selector_line(
            "Start",
            format!("{:02}", form.hours[form.start_hour]),
            format!("{:02}", form.minutes[form.start_minute]),
            form.field == EventField::StartHour,
            form.field == EventField::StartMinute,
        ));
        lines.push(selector_line(
            "End  ",
            format!("{:02}", form.hours[form.end_hour]),
            format!("{:02}", form.minutes[form.end_minute]),
            form.field == EventField::EndHour,
            form.field == EventField::EndMinute,
        ));
        let color = form.chosen_color();
        let color_active = form.field == EventField::Color;
        lines.push(Line::from(vec![
            Span::styled(
                "Color: ",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD | Modifier::DIM),
            ),
            Span::styled(
                format!(" {} ", color.token()),
                Style::default()
                    .bg(event_color(color))
                    .fg(Color::Black)
                    .add_modifier(if color_active {
                        Modifier::BOLD | Modifier::UNDERLINED
                    } else {
                        Modifier::empty()
                    }),
            ),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab/Shift-Tab move • Up/Down change • Enter add • Esc cancel",
            Style::default().fg(Color::Gray),
        )));

        let dialog = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(Span::styled(
                    "Add Event",
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, target: RemoveTarget) {
        let area = centered_rect(50, 30, f.size());
        let name = match target {
            RemoveTarget::Task(idx) => self
                .planner
                .tasks
                .get(idx)
                .map(|t| t.text.clone())
                .unwrap_or_default(),
            RemoveTarget::Event(idx) => self
                .planner
                .events
                .get(idx)
                .map(|e| e.title.clone())
                .unwrap_or_default(),
        };
        let body = vec![
            Line::from(Span::styled(
                format!("Remove \"{}\"?", name),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Remove",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_path_prompt(&self, f: &mut ratatui::Frame<'_>, action: PathAction, input: &FieldValue) {
        let theme = self.theme();
        let area = centered_rect(60, 20, f.size());
        let mut lines = field_lines("Path", input, true);
        lines.push(Line::from(Span::styled(
            "Enter to confirm • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(Span::styled(
                    action.title(),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

/// Scales a `[0, 1]` fraction to a row count within a pane of `height`
/// rows.
fn scale(frac: f64, height: f64) -> u16 {
    (frac * height).round().max(0.0) as u16
}

fn event_color(color: EventColor) -> Color {
    match color {
        EventColor::LightBlue => Color::LightBlue,
        EventColor::LightGreen => Color::LightGreen,
        EventColor::Yellow => Color::Yellow,
        EventColor::Pink => Color::LightMagenta,
        EventColor::Orange => Color::Rgb(255, 165, 0),
        EventColor::Grey => Color::Gray,
    }
}

fn selector_line(
    label: &str,
    hour: String,
    minute: String,
    hour_active: bool,
    minute_active: bool,
) -> Line<'static> {
    let piece = |text: String, active: bool| {
        Span::styled(
            text,
            if active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            },
        )
    };
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD | Modifier::DIM),
        ),
        piece(hour, hour_active),
        Span::raw(" : "),
        piece(minute, minute_active),
    ])
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_grapheme(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_grapheme(self.cursor, &self.value);
    }

    fn move_up(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx == 0 {
            return;
        }
        let target_start = line_starts[line_idx - 1];
        self.cursor = index_at_col(&self.value, target_start, col);
    }

    fn move_down(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx + 1 >= line_starts.len() {
            return;
        }
        let target_start = line_starts[line_idx + 1];
        self.cursor = index_at_col(&self.value, target_start, col);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_grapheme(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let prefix = format!("{}: ", label);
    let spacer = " ".repeat(prefix.chars().count());
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    let segments: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.split('\n').collect()
    };
    segments
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let mut spans = Vec::new();
            spans.push(Span::styled(
                if idx == 0 {
                    prefix.clone()
                } else {
                    spacer.clone()
                },
                label_style,
            ));
            spans.push(Span::styled((*line).to_string(), value_style));
            Line::from(spans)
        })
        .collect()
}

fn prev_grapheme(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_grapheme(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn line_state(text: &str, cursor: usize) -> (Vec<usize>, usize, usize) {
    let mut starts = vec![0];
    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            starts.push(idx + 1);
        }
    }
    let mut line_idx = 0;
    for (i, start) in starts.iter().enumerate() {
        if *start <= cursor {
            line_idx = i;
        } else {
            break;
        }
    }
    let col = text[starts[line_idx]..cursor].chars().count();
    (starts, line_idx, col)
}

fn index_at_col(text: &str, start: usize, target_col: usize) -> usize {
    let slice = &text[start..];
    let limit = slice.find('\n').unwrap_or(slice.len());
    let mut col = 0;
    for (idx, _) in slice[..limit].char_indices() {
        if col == target_col {
            return start + idx;
        }
        col += 1;
    }
    start + limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_form_cycles_through_discrete_sets() {
        let window = TimeWindow::default();
        let mut form = EventForm::new(&window);
        assert_eq!(form.hours[form.start_hour], 9);
        assert_eq!(form.hours[form.end_hour], 10);

        form.field = EventField::StartMinute;
        form.cycle(1);
        assert_eq!(form.minutes[form.start_minute], 15);
        form.cycle(-2);
        assert_eq!(form.minutes[form.start_minute], 45);

        form.field = EventField::Color;
        for _ in 0..PALETTE.len() {
            form.cycle(1);
        }
        assert_eq!(form.chosen_color(), PALETTE[0]);
    }

    #[test]
    fn event_form_offsets_follow_selection() {
        let window = TimeWindow::default();
        let form = EventForm::new(&window);
        assert_eq!(form.start(&window), 1.0);
        assert_eq!(form.end(&window), 2.0);
    }

    #[test]
    fn field_value_editing() {
        let mut field = FieldValue::new("ab");
        field.insert_char('c');
        assert_eq!(field.value, "abc");
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "ac");
        field.move_right();
        field.insert_char('!');
        assert_eq!(field.value, "ac!");
    }

    #[test]
    fn field_value_vertical_moves_keep_column() {
        let mut field = FieldValue::new("alpha\nbeta\ngamma");
        // Cursor at end of "gamma"; two moves up lands on "alpha".
        field.move_up();
        field.move_up();
        let (_, line_idx, _) = line_state(&field.value, field.cursor);
        assert_eq!(line_idx, 0);
        field.move_down();
        let (_, line_idx, _) = line_state(&field.value, field.cursor);
        assert_eq!(line_idx, 1);
    }
}
