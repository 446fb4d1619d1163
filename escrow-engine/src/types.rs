//! Trade record and status

use custody_core::{AccountId, Amount, AssetId};
use serde::{Deserialize, Serialize};

/// Two-party conditional transfer
///
/// Terminal records are never deleted; completed and cancelled trades stay
/// queryable forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Unique, monotonically assigned trade id
    pub id: u64,

    /// Seller (creator, deposited the escrowed funds)
    pub seller: AccountId,

    /// Buyer (the only account that may confirm)
    pub buyer: AccountId,

    /// Escrowed asset
    pub asset: AssetId,

    /// Escrowed amount
    pub amount: Amount,

    /// Free-form trade description
    pub description: String,

    /// Funds moved into escrow custody (true from creation onwards)
    pub seller_deposited: bool,

    /// Buyer confirmed receipt
    pub buyer_confirmed: bool,

    /// Escrowed funds released to the buyer (terminal)
    pub completed: bool,

    /// Escrowed funds returned to the seller (terminal)
    pub cancelled: bool,
}

impl Trade {
    /// Check if the trade is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.completed || self.cancelled
    }

    /// Derived status
    pub fn status(&self) -> TradeStatus {
        if self.completed {
            TradeStatus::Completed
        } else if self.cancelled {
            TradeStatus::Cancelled
        } else {
            TradeStatus::Pending
        }
    }
}

/// Trade status derived from the terminal flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    /// Awaiting buyer confirmation or seller cancellation
    Pending,
    /// Buyer confirmed, funds released to buyer (terminal)
    Completed,
    /// Seller cancelled, funds returned to seller (terminal)
    Cancelled,
}
