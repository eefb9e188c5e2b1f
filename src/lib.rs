pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod language;
pub mod report;
pub mod stats;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
