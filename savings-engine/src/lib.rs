//! Savings Engine
//!
//! Self-custodial time-locked holds, keyed by (account, index).
//!
//! Each account owns an append-only sequence of entries; the index assigned
//! at creation is stable for the entry's lifetime and entries are never
//! removed. An entry releases its full amount exactly once, and only after
//! its unlock time has passed.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod engine;
pub mod types;

// Re-exports
pub use engine::SavingsEngine;
pub use types::{SavingsEntry, MIN_LOCK_DAYS, SECONDS_PER_DAY};
