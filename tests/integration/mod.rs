//! Library-level integration tests.

pub mod analytics_test;
pub mod bootstrap_test;
pub mod config_test;
pub mod view_test;
