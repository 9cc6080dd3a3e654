//! Application state for the TUI.
//!
//! Contains the main App struct: editor, query view, remote state and grid
//! interaction state. Key handling is synchronous; anything that needs the
//! database or the network is returned as an [`Action`] for the session.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::editor::EditorState;
use super::grid::GridState;
use super::widgets::header::RemoteStatus;
use super::widgets::spinner::Spinner;
use crate::analytics::RemoteState;
use crate::config::{Locale, UiConfig};
use crate::view::{derive_grid, i18n, ActiveSource, GridView, QueryView};

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Grid,
}

impl Focus {
    /// Cycles to the next focus panel.
    pub fn next(self) -> Self {
        match self {
            Self::Editor => Self::Grid,
            Self::Grid => Self::Editor,
        }
    }
}

/// Work the session performs on behalf of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Run the editor text against the local database.
    ExecuteLocal,
    /// Show the remote result.
    SwitchToRemote,
    /// Show the last local result.
    ShowLocal,
    /// Re-issue the remote query.
    RefreshRemote,
}

/// Content of the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Error(String),
    Info(String),
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    pub focus: Focus,
    pub editor: EditorState,
    pub view: QueryView,
    pub remote: RemoteState,
    pub grid: GridState,
    pub locale: Locale,
    /// Remote endpoint for the header, without secrets.
    pub endpoint: Option<String>,
    /// Spinner shown while the remote query runs.
    pub spinner: Option<Spinner>,
}

impl App {
    /// Creates a new App instance.
    pub fn new(ui: &UiConfig, endpoint: Option<String>) -> Self {
        let view = QueryView::new();
        let editor = EditorState::new(view.query());

        Self {
            running: true,
            focus: Focus::default(),
            editor,
            view,
            remote: RemoteState::default(),
            grid: GridState::new(ui.page_size),
            locale: ui.locale,
            endpoint,
            spinner: None,
        }
    }

    /// Copies the editor text into the view before execution.
    pub fn commit_query(&mut self) {
        self.view.set_query(self.editor.text());
    }

    /// What the grid shows right now.
    pub fn grid_view(&self) -> GridView {
        derive_grid(self.view.active(&self.remote), self.locale)
    }

    /// Resets grid interaction state when the displayed columns change.
    pub fn sync_grid(&mut self) {
        if let GridView::Rows(grid) = self.grid_view() {
            self.grid.sync_shape(&grid);
        }
    }

    /// The current error, or a summary of what the grid shows.
    pub fn status(&self) -> Status {
        if let Some(error) = self.view.error() {
            return Status::Error(error.text(self.locale));
        }
        match self.view.source() {
            ActiveSource::Local => {
                let result = self.view.local_result();
                Status::Info(i18n::local_summary(
                    self.locale,
                    result.row_count(),
                    result.execution_time.as_millis(),
                ))
            }
            ActiveSource::Remote if self.remote.is_loading() => {
                Status::Info(i18n::loading(self.locale).to_string())
            }
            ActiveSource::Remote => Status::Info(i18n::remote_summary(
                self.locale,
                self.remote.result().map_or(0, |r| r.len()),
            )),
        }
    }

    /// Status dot shown next to the remote endpoint.
    pub fn remote_status(&self) -> RemoteStatus {
        if self.endpoint.is_none() {
            RemoteStatus::Disabled
        } else if self.remote.error().is_some() {
            RemoteStatus::Failed
        } else {
            RemoteStatus::Ready
        }
    }

    /// Keeps the spinner in step with the remote loading flag.
    pub fn sync_spinner(&mut self) {
        match (self.remote.is_loading(), self.spinner.is_some()) {
            (true, false) => self.spinner = Some(Spinner::loading("Cube.js")),
            (false, true) => self.spinner = None,
            _ => {}
        }
    }

    /// Handles a key press. Returns the action the session must perform, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global shortcuts
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.running = false;
                return None;
            }
            KeyCode::F(5) => return Some(Action::ExecuteLocal),
            KeyCode::Char('e') if ctrl => return Some(Action::ExecuteLocal),
            KeyCode::F(6) => return Some(Action::SwitchToRemote),
            KeyCode::Char('r') if ctrl => return Some(Action::SwitchToRemote),
            KeyCode::F(7) => return Some(Action::ShowLocal),
            KeyCode::Char('l') if ctrl => return Some(Action::ShowLocal),
            KeyCode::F(8) => return Some(Action::RefreshRemote),
            KeyCode::Tab if !self.grid.filter_editing => {
                self.focus = self.focus.next();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Editor => self.handle_editor_key(key),
            Focus::Grid => self.handle_grid_key(key),
        }
        None
    }

    /// Handles key events when the editor is focused.
    fn handle_editor_key(&mut self, key: KeyEvent) {
        // Unbound chords must not type their letter
        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Char(_) if chord => {}
            KeyCode::Char(c) => self.editor.insert(c),
            KeyCode::Enter => self.editor.newline(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Up => self.editor.move_up(),
            KeyCode::Down => self.editor.move_down(),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            _ => {}
        }
    }

    /// Handles key events when the grid is focused.
    fn handle_grid_key(&mut self, key: KeyEvent) {
        if self.grid.filter_editing {
            match key.code {
                KeyCode::Char(c) => self.grid.push_filter(c),
                KeyCode::Backspace => self.grid.pop_filter(),
                KeyCode::Enter | KeyCode::Tab => self.grid.end_filter(),
                KeyCode::Esc => self.grid.clear_filter(),
                _ => {}
            }
            return;
        }

        let GridView::Rows(grid) = self.grid_view() else {
            return;
        };
        self.grid.sync_shape(&grid);

        let visible = self.grid.visible_rows(&grid).len();
        let (start, end) = self.grid.page_bounds(visible);

        match key.code {
            KeyCode::Up => self.grid.select_up(),
            KeyCode::Down => self.grid.select_down(end - start),
            KeyCode::Left => self.grid.select_left(),
            KeyCode::Right => self.grid.select_right(grid.columns.len()),
            KeyCode::Char('s') => self.grid.cycle_sort(),
            KeyCode::Char('/') => self.grid.begin_filter(),
            KeyCode::PageDown => self.grid.next_page(visible),
            KeyCode::PageUp => self.grid.prev_page(),
            KeyCode::Char('+') => self.grid.grow_page_size(),
            KeyCode::Char('-') => self.grid.shrink_page_size(),
            KeyCode::Esc => self.grid.clear_filter(),
            _ => {}
        }
    }

    /// Label of the active source for the header.
    pub fn source_label(&self) -> &'static str {
        match self.view.source() {
            ActiveSource::Local => "SQLite",
            ActiveSource::Remote => "Cube.js",
        }
    }
}
