//! Escrow Engine
//!
//! Two-party conditional transfer state machine keyed by trade id.
//!
//! # State machine
//!
//! ```text
//! Pending --confirm_trade(by buyer)--> Completed (terminal)
//! Pending --cancel_trade(by seller)--> Cancelled (terminal)
//! ```
//!
//! Funds are pulled from the seller atomically with trade creation and
//! released exactly once: to the buyer on confirmation, or back to the
//! seller on cancellation. Confirm and cancel racing for the same trade
//! resolve to a single winner; the loser observes `AlreadyFinalized`.

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
pub use engine::EscrowEngine;
pub use types::{Trade, TradeStatus};
