//! doc-analytics: ad-hoc SQL over an embedded document database, side by side
//! with a fixed Cube.js report, in a terminal UI.
//!
//! This library exposes the core modules for use in integration tests.

pub mod analytics;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod tui;
pub mod view;
