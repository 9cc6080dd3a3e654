//! Headless UI tests, in-process and through the binary.

pub mod common;
pub mod headless_test;
pub mod session_test;
