//! TUI widgets for doc-analytics.
//!
//! Contains reusable UI components.

pub mod editor;
pub mod grid;
pub mod header;
pub mod spinner;
