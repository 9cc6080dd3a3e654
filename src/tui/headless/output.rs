//! Output formatting for headless mode: final screen text, a JSON report,
//! or every captured frame.

use super::{HeadlessResult, HeadlessState};
use crate::error::{AppError, Result};
use ratatui::buffer::Buffer;
use serde::Serialize;

/// Output format for headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Final screen plus a summary line.
    #[default]
    Text,
    /// Screen, state snapshot and assertion counts as JSON.
    Json,
    /// The screen after every event.
    Frames,
}

/// Renders a buffer as text, one line per row, trailing blanks removed.
pub fn screen_text(buffer: &Buffer) -> String {
    let area = buffer.area;

    let mut lines: Vec<String> = (0..area.height)
        .map(|y| {
            let line: String = (0..area.width)
                .filter_map(|x| buffer.cell((area.x + x, area.y + y)))
                .map(|cell| cell.symbol())
                .collect();
            line.trim_end().to_string()
        })
        .collect();

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    format!("{}\n", lines.join("\n"))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    screen_lines: Vec<&'a str>,
    events_executed: usize,
    duration_ms: u128,
    assertions: AssertionCounts,
    state: &'a HeadlessState,
}

#[derive(Serialize)]
struct AssertionCounts {
    passed: usize,
    failed: usize,
}

fn summary(result: &HeadlessResult) -> Option<String> {
    (result.assertions_passed + result.assertions_failed > 0).then(|| {
        format!(
            "Assertions: {} passed, {} failed",
            result.assertions_passed, result.assertions_failed
        )
    })
}

/// Formats the run result.
pub fn format_report(result: &HeadlessResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = format!(
                "{}\nEvents: {} executed in {}ms",
                result.screen,
                result.events_executed,
                result.duration.as_millis()
            );
            if let Some(summary) = summary(result) {
                out.push_str(" | ");
                out.push_str(&summary);
            }
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Json => {
            let report = JsonReport {
                screen_lines: result.screen.lines().collect(),
                events_executed: result.events_executed,
                duration_ms: result.duration.as_millis(),
                assertions: AssertionCounts {
                    passed: result.assertions_passed,
                    failed: result.assertions_failed,
                },
                state: &result.state,
            };
            serde_json::to_string_pretty(&report)
                .map_err(|e| AppError::internal(format!("Failed to serialize report: {e}")))
        }
        OutputFormat::Frames => {
            let mut out = String::new();
            for frame in &result.frames {
                out.push_str(&format!(
                    "=== FRAME {} ({}) ===\n{}\n",
                    frame.number,
                    frame.event.as_deref().unwrap_or("initial"),
                    frame.screen
                ));
            }
            out.push_str(&format!(
                "Total: {} frames, {} events executed in {}ms\n",
                result.frames.len(),
                result.events_executed,
                result.duration.as_millis()
            ));
            if let Some(summary) = summary(result) {
                out.push_str(&summary);
                out.push('\n');
            }
            Ok(out)
        }
    }
}
