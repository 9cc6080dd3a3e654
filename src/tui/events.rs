//! Event handling for the TUI.
//!
//! Processes keyboard and terminal events using crossterm.

use crate::error::{AppError, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// A periodic tick (for animations/updates).
    Tick,
}

/// Handles terminal events.
#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    /// Timeout for polling events.
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new event handler with default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    /// Creates a new event handler with a custom tick rate.
    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Polls for the next event.
    ///
    /// Blocks for at most the tick rate; returns `Event::Tick` when nothing arrived.
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)
            .map_err(|e| AppError::internal(format!("Failed to poll events: {e}")))?
        {
            return Ok(Event::Tick);
        }

        let event =
            event::read().map_err(|e| AppError::internal(format!("Failed to read event: {e}")))?;

        Ok(match event {
            // Key release events are reported on some platforms.
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Event::Key(key),
            CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
            _ => Event::Tick,
        })
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
