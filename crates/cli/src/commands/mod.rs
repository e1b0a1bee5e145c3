//! CLI subcommand implementations.

pub mod config;
pub mod stats;
pub mod sync;
pub mod validate;
