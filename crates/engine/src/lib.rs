//! Kiyoh Sync Engine - catalog synchronization and review invitations.
//!
//! This crate reconciles a commerce catalog with the Kiyoh/Klantenvertellen
//! review platform and dispatches post-purchase review invitations. The host
//! platform provides the collaborators (configuration store, product catalog,
//! locale resolver); the engine provides the decisions and the single network
//! boundary.
//!
//! # Architecture
//!
//! - [`config`] - Scope-qualified configuration access ([`config::ConfigSource`])
//! - [`catalog`] - Paged catalog reads ([`catalog::ProductCatalog`])
//! - [`locale`] - Locale-to-language mapping and the host locale resolver
//! - [`payload`] - Wire payload builders for products and invitations
//! - [`client`] - The review-platform HTTP client ([`client::KiyohClient`])
//! - [`eligibility`] - Per-product sync exclusion rules
//! - [`sync`] - Batched full-catalog sync orchestration
//! - [`dispatcher`] - Order-event invitation dispatch with conditional retry
//! - [`events`] - Catalog save/delete event handlers
//!
//! Every invocation runs to completion on the calling task with sequential,
//! bounded-timeout requests. The engine keeps no state between invocations;
//! concurrent runs are independent and safe, but not deduplicated.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod eligibility;
pub mod events;
pub mod locale;
pub mod payload;
pub mod sync;

pub use client::KiyohClient;
pub use dispatcher::InvitationDispatcher;
pub use sync::ProductSyncService;
