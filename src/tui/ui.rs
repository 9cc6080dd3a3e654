//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus, Status};
use super::widgets::{editor::EditorPanel, grid::ResultGrid, header::Header};
use crate::config::Locale;
use crate::view::{i18n, GridView};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, content, status, key hints
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(8),    // Content (editor + grid)
            Constraint::Length(1), // Status
            Constraint::Length(1), // Hints
        ])
        .split(area);

    // Content layout: editor above the grid
    let content_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_layout[1]);

    render_header(frame, main_layout[0], app);
    render_editor(frame, content_layout[0], app);
    render_grid(frame, content_layout[1], app);
    render_status(frame, main_layout[2], app);
    render_hints(frame, main_layout[3], app.locale);
}

/// Renders the header bar.
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let widget = Header::new(
        app.source_label(),
        app.endpoint.as_deref(),
        app.spinner.as_ref(),
        app.remote_status(),
    );
    frame.render_widget(widget, area);
}

/// Renders the SQL editor.
fn render_editor(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Editor;
    let title = match app.locale {
        Locale::Ru => "SQL запрос",
        Locale::En => "SQL query",
    };
    let widget = EditorPanel::new(&app.editor, focused, title);

    // Position cursor in the editor when focused
    if focused {
        frame.set_cursor_position(widget.cursor_position(area));
    }
    frame.render_widget(widget, area);
}

/// Renders the result grid, or a placeholder when there are no rows.
fn render_grid(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Grid;
    let title = match app.locale {
        Locale::Ru => "Результаты",
        Locale::En => "Results",
    };

    let message = match app.grid_view() {
        GridView::Rows(grid) => {
            frame.render_widget(ResultGrid::new(&grid, &app.grid, focused, title), area);
            return;
        }
        GridView::Loading => i18n::loading(app.locale),
        GridView::Empty => i18n::empty_state(app.locale),
    };

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", title));
    let placeholder = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(placeholder, area);
}

/// Renders the status line: the current error in red, otherwise a summary.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.status() {
        Status::Error(text) => Span::styled(format!(" {}", text), Style::default().fg(Color::Red)),
        Status::Info(text) => Span::styled(format!(" {}", text), Style::default().fg(Color::Gray)),
    };
    frame.render_widget(Paragraph::new(Line::from(line)), area);
}

/// Renders the key hints.
fn render_hints(frame: &mut Frame, area: Rect, locale: Locale) {
    let hints = match locale {
        Locale::Ru => {
            " F5 выполнить  F6 Cube.js  F7 SQLite  F8 обновить  Tab фокус  s сортировка  / фильтр  PgUp/PgDn страницы  +/- размер  Ctrl+Q выход"
        }
        Locale::En => {
            " F5 run  F6 Cube.js  F7 SQLite  F8 refresh  Tab focus  s sort  / filter  PgUp/PgDn pages  +/- page size  Ctrl+Q quit"
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        area,
    );
}
