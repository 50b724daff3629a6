//! # sane-psh
//!
//! A command-line tool that drains a puush.me upload history: it fetches the
//! account's history, then deletes every entry one by one, reconciling its
//! in-memory view against the service's responses until nothing remains.
//!
//! The history API is observed to be unreliable: read-after-delete responses
//! re-list entries that were just deleted, and listings can contain stale or
//! duplicate items. The [`engine`] module therefore keeps a ledger of every
//! identifier it has deleted during the run and filters each response against
//! it, converging on an empty history without double-deleting or looping on
//! phantom entries.
//!
//! ## Architecture
//!
//! - Configuration loading ([`config`]) and logging setup ([`logger`])
//! - The wire model and line codec ([`entry`], [`protocol`])
//! - The HTTP request primitive ([`transport`])
//! - The reconciliation loop that drives everything ([`engine`])
//! - Error types shared across the API surface ([`error`])

/// Runtime configuration loaded from `config.json`, plus platform config
/// directory resolution.
pub mod config;

/// The reconciliation engine: owns the working entry list and the deleted-ID
/// ledger, and drives the fetch, delete, merge cycle to completion.
pub mod engine;

/// The history entry record and its comma-separated wire representation.
pub mod entry;

/// Typed failures for the puush API client.
pub mod error;

/// Logging configuration and utilities.
///
/// Sets up console logging (configurable via `RUST_LOG`) and an append-only
/// log file in the config directory.
pub mod logger;

/// Decoding of raw API response bodies: status-line mapping and entry lines.
pub mod protocol;

/// The HTTP request primitive and the endpoint set of the puush service.
pub mod transport;
