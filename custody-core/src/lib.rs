//! DivaSave Custody Core
//!
//! Shared primitives for the custody and settlement engines.
//!
//! # Architecture
//!
//! - **Typed identifiers**: Opaque account and asset newtypes
//! - **Integer money**: Smallest-unit amounts with checked arithmetic
//! - **Transfer seam**: Trait boundary to the external token-transfer service
//! - **Audit events**: Every committed mutation emits one structured event
//!
//! # Invariants
//!
//! - No floating point anywhere in settlement logic
//! - Funds pull and custody record commit or fail as a unit
//! - Errors surface to the caller; the core never retries silently

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod bank;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod transfer;
pub mod types;

// Re-exports
pub use bank::InMemoryBank;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{CustodyEvent, EventKind, EventSink, MemorySink, NullSink};
pub use metrics::Metrics;
pub use transfer::TokenTransfer;
pub use types::{AccountId, Amount, AssetId};
