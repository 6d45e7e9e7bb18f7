//! FPL Scout — weekly single-transfer upgrade recommendations
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod sources;
pub mod optimiser;
pub mod notify;
pub mod engine;
