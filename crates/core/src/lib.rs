//! Kiyoh Sync Core - Shared types library.
//!
//! This crate provides the common types used across the Kiyoh sync components:
//! - `engine` - Catalog synchronization and review-invitation engine
//! - `cli` - Command-line tools for sync runs and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only plain data types - no I/O, no configuration
//! access, no HTTP clients. Product and order records are transient snapshots
//! read from the host commerce platform; result types are built per run and
//! never persisted here.
//!
//! # Modules
//!
//! - [`types`] - Store scope, catalog records, order records, and run reports

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
