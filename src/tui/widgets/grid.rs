//! Result grid widget for the TUI.
//!
//! Renders a [`Grid`] page by page with wrapped two-line headers, sort
//! markers, right-aligned numeric columns and a paging footer.

use crate::tui::grid::GridState;
use crate::view::{ColumnDef, ColumnWidth, Grid};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Lines reserved for the header.
const HEADER_LINES: u16 = 2;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: u16 = 4;

/// Distributes `available` cells over the columns.
///
/// Fixed columns get their width; flexible columns share what is left by
/// weight and never shrink below their minimum. One cell separates columns.
pub fn layout_widths(columns: &[ColumnDef], available: u16) -> Vec<u16> {
    let separators = columns.len().saturating_sub(1) as u16;
    let fixed: u16 = columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Flex { .. } => 0,
        })
        .sum();
    let total_weight: u16 = columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Flex { weight, .. } => weight,
            ColumnWidth::Fixed(_) => 0,
        })
        .sum();
    let leftover = available.saturating_sub(separators).saturating_sub(fixed);

    columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Fixed(w) => w.max(MIN_COLUMN_WIDTH),
            ColumnWidth::Flex { weight, min } => {
                let share = if total_weight == 0 {
                    0
                } else {
                    (u32::from(leftover) * u32::from(weight) / u32::from(total_weight)) as u16
                };
                share.max(min).max(MIN_COLUMN_WIDTH)
            }
        })
        .collect()
}

/// Word-wraps a header label into at most two lines of `width` cells.
pub fn wrap_header(text: &str, width: usize) -> [String; 2] {
    let mut lines = [String::new(), String::new()];
    let mut line = 0;

    for word in text.split_whitespace() {
        let current = lines[line].chars().count();
        let needed = if current == 0 {
            word.chars().count()
        } else {
            current + 1 + word.chars().count()
        };

        if needed > width && current > 0 && line == 0 {
            line = 1;
        }
        if !lines[line].is_empty() {
            lines[line].push(' ');
        }
        lines[line].push_str(word);
    }

    lines.map(|l| truncate(&l, width))
}

/// Truncates a string to fit within the given width, adding an ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        s.chars().take(max_width).collect()
    } else {
        let mut out: String = s.chars().take(max_width - 1).collect();
        out.push('…');
        out
    }
}

fn pad(s: &str, width: usize, right_align: bool) -> String {
    let text = truncate(s, width);
    if right_align {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

/// Widget for rendering the result grid.
pub struct ResultGrid<'a> {
    grid: &'a Grid,
    state: &'a GridState,
    focused: bool,
    title: &'a str,
}

impl<'a> ResultGrid<'a> {
    /// Creates a new grid widget.
    pub fn new(grid: &'a Grid, state: &'a GridState, focused: bool, title: &'a str) -> Self {
        Self {
            grid,
            state,
            focused,
            title,
        }
    }

    fn header_lines(&self, widths: &[u16]) -> Vec<Line<'static>> {
        let separator = Span::styled("│", Style::default().fg(Color::DarkGray));

        (0..HEADER_LINES as usize)
            .map(|line| {
                let mut spans = Vec::new();
                for (i, (column, &width)) in self.grid.columns.iter().zip(widths).enumerate() {
                    if i > 0 {
                        spans.push(separator.clone());
                    }

                    let marker = match self.state.sort {
                        Some(key) if key.column == i => format!(" {}", key.direction.indicator()),
                        _ => String::new(),
                    };
                    let label_width = (width as usize).saturating_sub(marker.chars().count());
                    let wrapped = wrap_header(&column.header, label_width);
                    let text = if line == 0 {
                        format!("{}{}", wrapped[0], marker)
                    } else {
                        wrapped[1].clone()
                    };

                    let mut style = Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                    if self.focused && i == self.state.selected_column {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    spans.push(Span::styled(
                        pad(&text, width as usize, column.format.is_numeric()),
                        style,
                    ));
                }
                Line::from(spans)
            })
            .collect()
    }

    fn border_line(widths: &[u16]) -> Line<'static> {
        let text = widths
            .iter()
            .map(|&w| "─".repeat(w as usize))
            .collect::<Vec<_>>()
            .join("┼");
        Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
    }

    fn data_line(&self, row: usize, widths: &[u16], selected: bool) -> Line<'static> {
        let mut spans = Vec::new();
        let values = &self.grid.rows[row];

        for (i, (column, &width)) in self.grid.columns.iter().zip(widths).enumerate() {
            if i > 0 {
                spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
            }
            let value = values.get(i);
            let text = value.map(|v| column.format_cell(v)).unwrap_or_default();
            let mut style = if value.map_or(true, |v| v.is_null()) {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };
            if selected {
                style = style.bg(Color::DarkGray).fg(Color::White);
            }
            spans.push(Span::styled(
                pad(&text, width as usize, column.format.is_numeric()),
                style,
            ));
        }

        Line::from(spans)
    }

    /// Footer text: shown range, page and page size.
    pub fn footer_text(&self, visible: usize) -> String {
        let (start, end) = self.state.page_bounds(visible);
        let page = self.state.page.min(self.state.page_count(visible) - 1) + 1;
        let mut text = format!(
            "{}-{} of {} | Page {}/{} | Page size {}",
            if visible == 0 { 0 } else { start + 1 },
            end,
            visible,
            page,
            self.state.page_count(visible),
            self.state.page_size
        );
        if !self.state.filter.is_empty() || self.state.filter_editing {
            text.push_str(&format!(" | Filter: {}", self.state.filter));
            if self.state.filter_editing {
                text.push('_');
            }
        }
        text
    }
}

impl Widget for ResultGrid<'_> {
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
        let inner = block.inner(area);
        block.render(area, buf);

        // Header, separator and footer need four lines.
        if inner.height < HEADER_LINES + 2 || inner.width == 0 {
            return;
        }

        let widths = layout_widths(&self.grid.columns, inner.width);
        let visible_rows = self.state.visible_rows(self.grid);
        let (start, end) = self.state.page_bounds(visible_rows.len());
        let page_rows = &visible_rows[start..end];

        let mut y = inner.y;
        for line in self.header_lines(&widths) {
            buf.set_line(inner.x, y, &line, inner.width);
            y += 1;
        }
        buf.set_line(inner.x, y, &Self::border_line(&widths), inner.width);
        y += 1;

        let body_height = (inner.bottom() - 1).saturating_sub(y) as usize;
        let scroll = super::editor::calculate_scroll_offset(self.state.selected_row, body_height);
        for (offset, &row) in page_rows.iter().enumerate().skip(scroll).take(body_height) {
            let selected = self.focused && offset == self.state.selected_row;
            buf.set_line(inner.x, y, &self.data_line(row, &widths, selected), inner.width);
            y += 1;
        }

        let footer = Line::from(Span::styled(
            self.footer_text(visible_rows.len()),
            Style::default().fg(Color::DarkGray),
        ));
        buf.set_line(inner.x, inner.bottom() - 1, &footer, inner.width);
    }
}
