//! Vault Engine
//!
//! Free-standing multi-token balance ledger keyed by (account, asset).
//!
//! No time lock: any balance is withdrawable at any time by its owner only.
//! Concurrent deposits and withdrawals on one `(account, asset)` pair
//! serialize; the final balance is the sum of all committed deltas in
//! commit order and never goes negative.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod engine;

// Re-exports
pub use engine::VaultEngine;
