//! Header widget for the TUI.
//!
//! Displays the application name, version, the active source and the remote
//! endpoint with its status.

use super::spinner::Spinner;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Status of the remote source as shown by the header dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Ready,
    Failed,
    Disabled,
}

/// Header bar widget.
pub struct Header<'a> {
    source: &'a str,
    endpoint: Option<&'a str>,
    spinner: Option<&'a Spinner>,
    status: RemoteStatus,
}

impl<'a> Header<'a> {
    /// Creates a new header widget.
    pub fn new(
        source: &'a str,
        endpoint: Option<&'a str>,
        spinner: Option<&'a Spinner>,
        status: RemoteStatus,
    ) -> Self {
        Self {
            source,
            endpoint,
            spinner,
            status,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        // Left side: app name, version and source
        let left_text = format!(
            " doc-analytics v{} [{}]",
            env!("CARGO_PKG_VERSION"),
            self.source
        );
        let left_span = Span::styled(left_text, style);
        buf.set_span(area.x, area.y, &left_span, area.width);

        // Center: spinner if active
        if let Some(spinner) = self.spinner {
            let spinner_text = spinner.display();
            let spinner_style = Style::default()
                .bg(Color::Blue)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD);
            let spinner_width = spinner_text.chars().count() as u16;
            let spinner_x = area.x + (area.width.saturating_sub(spinner_width)) / 2;
            buf.set_string(spinner_x, area.y, &spinner_text, spinner_style);
        }

        // Right side: remote status dot and endpoint
        let info = self.endpoint.unwrap_or("off");
        let (status_dot, status_color) = match self.status {
            RemoteStatus::Ready => ("●", Color::Green),
            RemoteStatus::Failed => ("●", Color::Red),
            RemoteStatus::Disabled => ("○", Color::Gray),
        };
        let status_style = Style::default().bg(Color::Blue).fg(status_color);

        let cube_text = format!(" [cube: {}] ", info);
        let right_width = cube_text.chars().count() as u16 + 2;
        if right_width < area.width {
            let right_x = area.right().saturating_sub(right_width);
            buf.set_string(right_x, area.y, " ", style);
            buf.set_string(right_x + 1, area.y, status_dot, status_style);
            buf.set_string(right_x + 2, area.y, &cube_text, style);
        }
    }
}
