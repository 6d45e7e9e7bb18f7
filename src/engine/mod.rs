//! Core engine — one fetch → optimise → deliver cycle.

pub mod cycle;

pub use cycle::run_cycle;
