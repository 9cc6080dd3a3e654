//! Headless mode for scripted runs and automated tests.
//!
//! Drives the same [`App`] and [`Session`] as the interactive UI against a
//! ratatui `TestBackend`, executing a script of events and capturing the
//! rendered screen.

mod events;
mod output;

pub use events::{parse_script, parse_size, Assertion, CompareOp, Event};
pub use output::{format_report, screen_text, OutputFormat};

use crate::app::Session;
use crate::cli::Cli;
use crate::config::UiConfig;
use crate::error::{AppError, Result};
use crate::tui::app::App;
use crate::tui::ui;
use crate::view::GridView;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Upper bound on how long a `wait` event waits for a remote fetch.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub width: u16,
    pub height: u16,
    pub output_format: OutputFormat,
    /// Stop at the first failed assertion.
    pub fail_fast: bool,
    /// Where to write the report (None = stdout).
    pub output_file: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: 40,
            output_format: OutputFormat::Text,
            fail_fast: false,
            output_file: None,
        }
    }
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = parse_size(&cli.size)?;

        Ok(Self {
            width,
            height,
            output_format: cli.output,
            fail_fast: cli.fail_fast,
            output_file: cli.output_file.clone(),
        })
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    pub events_executed: usize,
    pub duration: Duration,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    /// State after the last event.
    pub state: HeadlessState,
    /// Screens captured after each event (frames output only).
    pub frames: Vec<Frame>,
}

/// Snapshot of application state, addressable by `assert:state:` events.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct HeadlessState {
    /// `Editor` or `Grid`.
    pub focus: String,
    /// Editor text.
    pub query: String,
    /// `local` or `remote`.
    pub source: String,
    /// Displayed error text, if any.
    pub error: Option<String>,
    /// Rows in the active result.
    pub row_count: usize,
    /// Rows left after the quick filter.
    pub visible_rows: usize,
    /// `rows`, `empty` or `loading`.
    pub grid: String,
    /// One-based page number.
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    /// Sorted column and direction, e.g. `Employee:desc`.
    pub sort: Option<String>,
    pub filter: String,
    pub remote_loading: bool,
    pub running: bool,
}

impl HeadlessState {
    /// Captures the state of the app.
    pub fn from_app(app: &App) -> Self {
        let view = app.grid_view();
        let (grid, visible_rows, sort) = match &view {
            GridView::Rows(grid) => {
                let sort = app.grid.sort.and_then(|key| {
                    grid.columns.get(key.column).map(|column| {
                        let direction = match key.direction {
                            crate::tui::grid::SortDirection::Ascending => "asc",
                            crate::tui::grid::SortDirection::Descending => "desc",
                        };
                        format!("{}:{}", column.field, direction)
                    })
                });
                ("rows", app.grid.visible_rows(grid).len(), sort)
            }
            GridView::Empty => ("empty", 0, None),
            GridView::Loading => ("loading", 0, None),
        };
        let page_count = app.grid.page_count(visible_rows);

        Self {
            focus: format!("{:?}", app.focus),
            query: app.editor.text().to_string(),
            source: app.view.source().as_str().to_string(),
            error: app.view.error().map(|e| e.text(app.locale)),
            row_count: view.row_count(),
            visible_rows,
            grid: grid.to_string(),
            page: app.grid.page.min(page_count - 1) + 1,
            page_count,
            page_size: app.grid.page_size,
            sort,
            filter: app.grid.filter.clone(),
            remote_loading: app.remote.is_loading(),
            running: app.running,
        }
    }

    /// Looks up a field as text. A missing optional value reads as "".
    pub fn field(&self, name: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        match value.get(name)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }
}

/// A captured frame (screen state after an event).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number (0 = initial state).
    pub number: usize,
    /// Event that produced this frame (None for initial).
    pub event: Option<String>,
    pub screen: String,
}

/// Runs the UI in headless mode.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    terminal: Terminal<TestBackend>,
    app: App,
    session: Session,
    events: Vec<Event>,
    frames: Vec<Frame>,
    assertions_passed: usize,
    assertions_failed: usize,
}

impl HeadlessRunner {
    /// Creates a runner over the given session.
    pub fn new(config: HeadlessConfig, ui_config: &UiConfig, session: Session) -> Result<Self> {
        let backend = TestBackend::new(config.width, config.height);
        let terminal = Terminal::new(backend)
            .map_err(|e| AppError::internal(format!("Failed to create test terminal: {e}")))?;
        let app = App::new(ui_config, session.endpoint());

        Ok(Self {
            config,
            terminal,
            app,
            session,
            events: Vec::new(),
            frames: Vec::new(),
            assertions_passed: 0,
            assertions_failed: 0,
        })
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = parse_script(input)?;
        Ok(())
    }

    /// Loads events from a script file, or stdin for `-`.
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            std::io::read_to_string(std::io::stdin())
                .map_err(|e| AppError::internal(format!("Failed to read stdin: {e}")))?
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| AppError::config(format!("Failed to read script file: {e}")))?
        };

        self.load_events(&content)
    }

    /// Runs the events and returns the result. Closes the session.
    pub async fn run(mut self) -> Result<HeadlessResult> {
        let start_time = Instant::now();
        self.session.start(&mut self.app);
        self.capture_frame(None)?;

        let events = std::mem::take(&mut self.events);
        let mut events_executed = 0;

        for event in events {
            debug!("Headless event: {}", event);
            let failed = !self.handle(&event).await?;
            events_executed += 1;

            self.draw()?;
            if self.config.output_format == OutputFormat::Frames {
                self.capture_frame(Some(event.to_string()))?;
            }

            if (failed && self.config.fail_fast) || !self.app.running {
                break;
            }
        }

        self.draw()?;
        let screen = self.screen();
        let state = HeadlessState::from_app(&self.app);

        if let Err(e) = self.session.close().await {
            warn!("Error closing session: {}", e);
        }

        Ok(HeadlessResult {
            screen,
            events_executed,
            duration: start_time.elapsed(),
            assertions_passed: self.assertions_passed,
            assertions_failed: self.assertions_failed,
            state,
            frames: self.frames,
        })
    }

    /// Executes one event. Returns false if it was a failed assertion.
    async fn handle(&mut self, event: &Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.press(*key).await,
            Event::Type(text) => {
                for c in text.chars() {
                    self.press(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                        .await;
                }
            }
            Event::Wait(duration) => {
                tokio::time::sleep(*duration).await;
                self.session.settle(&mut self.app, SETTLE_TIMEOUT).await;
            }
            // The next draw picks up the new size.
            Event::Resize(width, height) => self.terminal.backend_mut().resize(*width, *height),
            Event::Snapshot(_) => {}
            Event::Assert(assertion) => {
                self.draw()?;
                let passed = assertion.check(&self.screen(), &HeadlessState::from_app(&self.app));
                if passed {
                    self.assertions_passed += 1;
                } else {
                    warn!("Assertion failed: {}", event);
                    self.assertions_failed += 1;
                }
                return Ok(passed);
            }
        }
        Ok(true)
    }

    async fn press(&mut self, key: KeyEvent) {
        if let Some(action) = self.app.handle_key(key) {
            self.session.perform(&mut self.app, action).await;
        }
    }

    fn draw(&mut self) -> Result<()> {
        self.app.sync_spinner();
        let app = &self.app;
        self.terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| AppError::internal(format!("Failed to render: {e}")))?;
        Ok(())
    }

    fn screen(&self) -> String {
        screen_text(self.terminal.backend().buffer())
    }

    fn capture_frame(&mut self, event: Option<String>) -> Result<()> {
        self.draw()?;
        let screen = self.screen();
        self.frames.push(Frame {
            number: self.frames.len(),
            event,
            screen,
        });
        Ok(())
    }
}

/// Runs headless mode from CLI arguments. Returns the process exit code.
pub async fn run_headless(cli: &Cli, ui_config: &UiConfig, session: Session) -> Result<i32> {
    let config = HeadlessConfig::from_cli(cli)?;
    let mut runner = HeadlessRunner::new(config.clone(), ui_config, session)?;

    if let Some(ref events) = cli.events {
        runner.load_events(events)?;
    } else if let Some(ref script) = cli.script {
        runner.load_script(script)?;
    }

    let result = runner.run().await?;
    let report = format_report(&result, config.output_format)?;

    match config.output_file {
        Some(ref path) => std::fs::write(path, &report)
            .map_err(|e| AppError::internal(format!("Failed to write output file: {e}")))?,
        None => print!("{}", report),
    }

    Ok(if result.assertions_failed > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_field_lookup() {
        let state = HeadlessState {
            focus: "Grid".to_string(),
            row_count: 4,
            remote_loading: true,
            ..HeadlessState::default()
        };
        assert_eq!(state.field("focus").as_deref(), Some("Grid"));
        assert_eq!(state.field("row_count").as_deref(), Some("4"));
        assert_eq!(state.field("remote_loading").as_deref(), Some("true"));
        assert_eq!(state.field("error").as_deref(), Some(""));
        assert_eq!(state.field("nope"), None);
    }

    #[test]
    fn test_state_from_new_app() {
        let app = App::new(&UiConfig::default(), None);
        let state = HeadlessState::from_app(&app);
        assert_eq!(state.focus, "Editor");
        assert_eq!(state.source, "local");
        assert_eq!(state.grid, "empty");
        assert_eq!(state.page, 1);
        assert_eq!(state.page_count, 1);
        assert!(state.running);
    }
}
