//! Structured audit events
//!
//! Every committed mutation emits exactly one event naming the operation,
//! the entity affected, and the resulting state. Events feed the external
//! history/indexing collaborator; the core never reads them back.

use crate::types::{AccountId, Amount, AssetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Audit event emitted after a committed mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Emission timestamp
    pub timestamp: DateTime<Utc>,

    /// Operation and resulting state
    pub kind: EventKind,
}

impl CustodyEvent {
    /// Create a new event stamped now
    pub fn new(kind: EventKind) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Operation-specific event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "operation")]
pub enum EventKind {
    /// Trade created, funds pulled into escrow custody
    TradeCreated {
        /// Allocated trade id
        trade_id: u64,
        /// Seller (creator, depositor)
        seller: AccountId,
        /// Buyer (may confirm)
        buyer: AccountId,
        /// Escrowed asset
        asset: AssetId,
        /// Escrowed amount
        amount: Amount,
    },

    /// Trade confirmed by buyer, escrowed funds released to buyer
    TradeCompleted {
        /// Trade id
        trade_id: u64,
        /// Buyer that received the funds
        buyer: AccountId,
        /// Released amount
        amount: Amount,
    },

    /// Trade cancelled by seller, escrowed funds returned to seller
    TradeCancelled {
        /// Trade id
        trade_id: u64,
        /// Seller refunded
        seller: AccountId,
        /// Refunded amount
        amount: Amount,
    },

    /// Savings entry created, funds pulled into custody
    SavingCreated {
        /// Owning account
        owner: AccountId,
        /// Stable index within the owner's sequence
        index: u64,
        /// Locked asset
        asset: AssetId,
        /// Locked amount
        amount: Amount,
        /// Unix seconds at which the entry unlocks
        unlock_time: i64,
    },

    /// Savings entry withdrawn after unlock
    SavingWithdrawn {
        /// Owning account
        owner: AccountId,
        /// Entry index
        index: u64,
        /// Returned amount
        amount: Amount,
    },

    /// Vault deposit committed
    VaultDeposited {
        /// Account credited
        account: AccountId,
        /// Asset
        asset: AssetId,
        /// Deposited amount
        amount: Amount,
        /// Resulting vault balance
        balance: Amount,
    },

    /// Vault withdrawal committed
    VaultWithdrawn {
        /// Account debited
        account: AccountId,
        /// Asset
        asset: AssetId,
        /// Withdrawn amount
        amount: Amount,
        /// Resulting vault balance
        balance: Amount,
    },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::TradeCreated { trade_id, .. } => write!(f, "TRADE_CREATED {}", trade_id),
            EventKind::TradeCompleted { trade_id, .. } => write!(f, "TRADE_COMPLETED {}", trade_id),
            EventKind::TradeCancelled { trade_id, .. } => write!(f, "TRADE_CANCELLED {}", trade_id),
            EventKind::SavingCreated { owner, index, .. } => {
                write!(f, "SAVING_CREATED {}/{}", owner, index)
            }
            EventKind::SavingWithdrawn { owner, index, .. } => {
                write!(f, "SAVING_WITHDRAWN {}/{}", owner, index)
            }
            EventKind::VaultDeposited { account, asset, .. } => {
                write!(f, "VAULT_DEPOSITED {}/{}", account, asset)
            }
            EventKind::VaultWithdrawn { account, asset, .. } => {
                write!(f, "VAULT_WITHDRAWN {}/{}", account, asset)
            }
        }
    }
}

/// Sink consuming audit events
///
/// Implementations must not block the calling engine; delivery is
/// fire-and-forget from the core's point of view.
pub trait EventSink: Send + Sync {
    /// Consume one event
    fn emit(&self, event: CustodyEvent);
}

/// Sink that drops all events
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: CustodyEvent) {}
}

/// Sink that buffers events in memory (tests, demo)
#[derive(Debug, Default)]
pub struct MemorySink {
    events: parking_lot::Mutex<Vec<CustodyEvent>>,
}

impl MemorySink {
    /// Create empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far
    pub fn events(&self) -> Vec<CustodyEvent> {
        self.events.lock().clone()
    }

    /// Number of events emitted so far
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True if no events were emitted
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: CustodyEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_buffers_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.emit(CustodyEvent::new(EventKind::TradeCreated {
            trade_id: 1,
            seller: AccountId::new("alice"),
            buyer: AccountId::new("bob"),
            asset: AssetId::new("USDC"),
            amount: Amount::new(100),
        }));
        sink.emit(CustodyEvent::new(EventKind::TradeCompleted {
            trade_id: 1,
            buyer: AccountId::new("bob"),
            amount: Amount::new(100),
        }));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].kind, EventKind::TradeCreated { trade_id: 1, .. }));
        assert!(matches!(events[1].kind, EventKind::TradeCompleted { trade_id: 1, .. }));
    }

    #[test]
    fn test_event_serialization_tags_operation() {
        let event = CustodyEvent::new(EventKind::VaultDeposited {
            account: AccountId::new("alice"),
            asset: AssetId::new("USDC"),
            amount: Amount::new(5),
            balance: Amount::new(5),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("VAULT_DEPOSITED"));
    }
}
