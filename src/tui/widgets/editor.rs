//! SQL editor widget for the TUI.
//!
//! Renders the multiline editor buffer inside a bordered block, scrolled so
//! the cursor stays visible.

use crate::tui::editor::EditorState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Calculates the scroll offset needed to keep `cursor` visible in `available` cells.
pub fn calculate_scroll_offset(cursor: usize, available: usize) -> usize {
    if cursor < available {
        0
    } else {
        cursor + 1 - available
    }
}

/// Editor panel widget.
pub struct EditorPanel<'a> {
    editor: &'a EditorState,
    focused: bool,
    title: &'a str,
}

impl<'a> EditorPanel<'a> {
    /// Creates a new editor widget.
    pub fn new(editor: &'a EditorState, focused: bool, title: &'a str) -> Self {
        Self {
            editor,
            focused,
            title,
        }
    }

    /// Inner size of the block (without borders).
    fn inner_size(area: Rect) -> (usize, usize) {
        (
            area.width.saturating_sub(2) as usize,
            area.height.saturating_sub(2) as usize,
        )
    }

    /// Offsets (rows, columns) the text is scrolled by.
    fn scroll(&self, area: Rect) -> (usize, usize) {
        let (width, height) = Self::inner_size(area);
        let (row, col) = self.editor.cursor_position();
        (
            calculate_scroll_offset(row, height),
            calculate_scroll_offset(col, width),
        )
    }

    /// Screen position of the cursor inside `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let (row, col) = self.editor.cursor_position();
        let (scroll_y, scroll_x) = self.scroll(area);
        (
            area.x + 1 + (col - scroll_x) as u16,
            area.y + 1 + (row - scroll_y) as u16,
        )
    }
}

impl Widget for EditorPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", self.title));

        let (scroll_y, scroll_x) = self.scroll(area);
        let (width, height) = Self::inner_size(area);

        let lines: Vec<Line> = self
            .editor
            .lines()
            .into_iter()
            .skip(scroll_y)
            .take(height)
            .map(|line| Line::raw(line.chars().skip(scroll_x).take(width).collect::<String>()))
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
