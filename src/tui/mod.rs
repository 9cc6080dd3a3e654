//! Terminal User Interface for doc-analytics.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
pub mod editor;
mod events;
pub mod grid;
pub mod headless;
mod ui;
pub mod widgets;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::app::Session;
use crate::config::UiConfig;
use crate::error::{AppError, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
    /// Cancelled when the UI shuts down.
    shutdown: CancellationToken,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;

        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| AppError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .map_err(|e| AppError::internal(format!("Failed to enter alternate screen: {e}")))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)
            .map_err(|e| AppError::internal(format!("Failed to create terminal: {e}")))?;

        Ok(terminal)
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| AppError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .map_err(|e| AppError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| AppError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the event loop until the user quits, then closes the session.
    pub async fn run(&mut self, ui_config: &UiConfig, mut session: Session) -> Result<()> {
        // Set up panic hook to restore terminal on panic
        let original_hook = panic::take_hook();
        let shutdown = self.shutdown.clone();
        panic::set_hook(Box::new(move |panic_info| {
            shutdown.cancel();
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        let mut app_state = App::new(ui_config, session.endpoint());
        session.start(&mut app_state);

        let result = self.run_event_loop(&mut app_state, &mut session).await;

        self.shutdown.cancel();

        if let Err(e) = session.close().await {
            warn!("Error closing session: {}", e);
        }

        // Restore panic hook
        let _ = panic::take_hook();

        result
    }

    /// The main event loop, separated for cleaner error handling.
    async fn run_event_loop(&mut self, app_state: &mut App, session: &mut Session) -> Result<()> {
        loop {
            app_state.sync_spinner();

            self.terminal
                .draw(|frame| ui::render(frame, app_state))
                .map_err(|e| AppError::internal(format!("Failed to draw: {e}")))?;

            if !app_state.running || self.shutdown.is_cancelled() {
                break;
            }

            let handler = self.event_handler;
            tokio::select! {
                // Terminal events; a tick redraws the spinner
                event = tokio::task::spawn_blocking(move || handler.next()) => {
                    match event {
                        Ok(Ok(event)) => self.handle_event(event, app_state, session).await,
                        Ok(Err(e)) => return Err(e),
                        Err(e) => {
                            error!("Event task failed: {}", e);
                            return Err(AppError::internal(format!("Event task failed: {e}")));
                        }
                    }
                }

                // Remote fetches finishing in the background
                Some(message) = session.next_remote() => {
                    session.apply(app_state, message);
                }
            }
        }

        info!("TUI event loop finished");
        Ok(())
    }

    /// Handles a terminal event.
    async fn handle_event(&mut self, event: Event, app_state: &mut App, session: &mut Session) {
        match event {
            Event::Key(key) => {
                if let Some(action) = app_state.handle_key(key) {
                    session.perform(app_state, action).await;
                }
            }
            Event::Resize(width, height) => {
                info!("Terminal resized to {}x{}", width, height);
            }
            Event::Tick => {}
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the TUI application.
pub async fn run(ui_config: &UiConfig, session: Session) -> Result<()> {
    let mut tui = Tui::new()?;
    tui.run(ui_config, session).await
}
