//! Escrow engine
//!
//! Trades live in a sharded map keyed by trade id. Mutations hold the
//! trade's entry guard across the funds movement and the state write, so
//! concurrent calls targeting one trade observe a strict commit order while
//! unrelated trades proceed without mutual blocking.

use crate::types::{Trade, TradeStatus};
use custody_core::config::EscrowConfig;
use custody_core::{
    AccountId, Amount, AssetId, CustodyEvent, Error, EventKind, EventSink, Metrics, Result,
    TokenTransfer,
};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Escrow engine
pub struct EscrowEngine {
    /// Trade records, never deleted
    trades: DashMap<u64, Trade>,

    /// Next trade id to allocate
    next_id: AtomicU64,

    /// Account under which escrowed funds are held
    custody: AccountId,

    /// External transfer primitive
    bank: Arc<dyn TokenTransfer>,

    /// Audit event sink
    events: Arc<dyn EventSink>,

    /// Operation counters
    metrics: Metrics,
}

impl EscrowEngine {
    /// Create new escrow engine
    pub fn new(
        config: &EscrowConfig,
        bank: Arc<dyn TokenTransfer>,
        events: Arc<dyn EventSink>,
        metrics: Metrics,
    ) -> Self {
        Self {
            trades: DashMap::new(),
            next_id: AtomicU64::new(1),
            custody: AccountId::new(config.custody_account.clone()),
            bank,
            events,
            metrics,
        }
    }

    /// Create a trade; the caller becomes the seller
    ///
    /// Pulls `amount` of `asset` from the caller's allowance into escrow
    /// custody atomically with trade creation: if the pull fails, no trade
    /// record persists.
    pub fn create_trade(
        &self,
        caller: &AccountId,
        buyer: &AccountId,
        asset: &AssetId,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<u64> {
        if amount.is_zero() {
            return Err(self.reject("create_trade", Error::InvalidArgument(
                "amount must be positive".to_string(),
            )));
        }
        if !caller.is_valid() || !buyer.is_valid() {
            return Err(self.reject("create_trade", Error::InvalidArgument(
                "malformed account identifier".to_string(),
            )));
        }
        if buyer == caller {
            return Err(self.reject("create_trade", Error::InvalidArgument(
                "buyer must differ from seller".to_string(),
            )));
        }

        self.bank
            .transfer_from(&self.custody, caller, &self.custody, asset, amount)
            .map_err(|e| self.reject("create_trade", e))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.trades.insert(
            id,
            Trade {
                id,
                seller: caller.clone(),
                buyer: buyer.clone(),
                asset: asset.clone(),
                amount,
                description: description.into(),
                seller_deposited: true,
                buyer_confirmed: false,
                completed: false,
                cancelled: false,
            },
        );

        self.metrics.trades_created.inc();
        tracing::info!(trade_id = id, seller = %caller, buyer = %buyer, %asset, %amount, "trade created");
        self.events.emit(CustodyEvent::new(EventKind::TradeCreated {
            trade_id: id,
            seller: caller.clone(),
            buyer: buyer.clone(),
            asset: asset.clone(),
            amount,
        }));

        Ok(id)
    }

    /// Create a trade escrowing the chain-native asset
    pub fn create_trade_native(
        &self,
        caller: &AccountId,
        buyer: &AccountId,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<u64> {
        self.create_trade(caller, buyer, &AssetId::native(), amount, description)
    }

    /// Confirm a trade; the caller must be the buyer
    ///
    /// Releases the escrowed amount to the buyer and marks the trade
    /// completed. A trade already completed or cancelled fails with
    /// `AlreadyFinalized`, regardless of which transition won.
    pub fn confirm_trade(&self, caller: &AccountId, trade_id: u64) -> Result<()> {
        let mut trade = self
            .trades
            .get_mut(&trade_id)
            .ok_or_else(|| self.reject("confirm_trade", Error::NotFound(format!("trade {}", trade_id))))?;

        if caller != &trade.buyer {
            return Err(self.reject("confirm_trade", Error::Unauthorized(format!(
                "{} is not the buyer of trade {}",
                caller, trade_id
            ))));
        }
        if trade.is_terminal() {
            return Err(self.reject("confirm_trade", Error::AlreadyFinalized(format!(
                "trade {} is {:?}",
                trade_id,
                trade.status()
            ))));
        }

        self.bank
            .transfer(&trade.asset, &self.custody, &trade.buyer, trade.amount)
            .map_err(|e| self.reject("confirm_trade", e))?;
        trade.buyer_confirmed = true;
        trade.completed = true;

        let (buyer, amount) = (trade.buyer.clone(), trade.amount);
        drop(trade);

        self.metrics.trades_completed.inc();
        tracing::info!(trade_id, buyer = %buyer, %amount, "trade completed");
        self.events.emit(CustodyEvent::new(EventKind::TradeCompleted {
            trade_id,
            buyer,
            amount,
        }));

        Ok(())
    }

    /// Cancel a trade; the caller must be the seller
    ///
    /// Only permitted before the buyer has confirmed. Returns the escrowed
    /// amount to the seller and marks the trade cancelled.
    pub fn cancel_trade(&self, caller: &AccountId, trade_id: u64) -> Result<()> {
        let mut trade = self
            .trades
            .get_mut(&trade_id)
            .ok_or_else(|| self.reject("cancel_trade", Error::NotFound(format!("trade {}", trade_id))))?;

        if caller != &trade.seller {
            return Err(self.reject("cancel_trade", Error::Unauthorized(format!(
                "{} is not the seller of trade {}",
                caller, trade_id
            ))));
        }
        if trade.buyer_confirmed || trade.is_terminal() {
            return Err(self.reject("cancel_trade", Error::AlreadyFinalized(format!(
                "trade {} is {:?}",
                trade_id,
                trade.status()
            ))));
        }

        self.bank
            .transfer(&trade.asset, &self.custody, &trade.seller, trade.amount)
            .map_err(|e| self.reject("cancel_trade", e))?;
        trade.cancelled = true;

        let (seller, amount) = (trade.seller.clone(), trade.amount);
        drop(trade);

        self.metrics.trades_cancelled.inc();
        tracing::info!(trade_id, seller = %seller, %amount, "trade cancelled");
        self.events.emit(CustodyEvent::new(EventKind::TradeCancelled {
            trade_id,
            seller,
            amount,
        }));

        Ok(())
    }

    /// Look up a trade by id
    pub fn get_trade(&self, trade_id: u64) -> Result<Trade> {
        self.trades
            .get(&trade_id)
            .map(|t| t.clone())
            .ok_or_else(|| Error::NotFound(format!("trade {}", trade_id)))
    }

    /// All trades in which `account` participates, ordered by id
    pub fn trades_for(&self, account: &AccountId) -> Vec<Trade> {
        let mut trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|t| &t.seller == account || &t.buyer == account)
            .map(|t| t.clone())
            .collect();
        trades.sort_by_key(|t| t.id);
        trades
    }

    /// Number of trades ever created
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    fn reject(&self, operation: &str, error: Error) -> Error {
        self.metrics.rejected_operations.inc();
        tracing::warn!(operation, error = %error, "escrow operation rejected");
        error
    }
}

impl fmt::Debug for EscrowEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscrowEngine")
            .field("custody", &self.custody)
            .field("trades", &self.trades.len())
            .finish()
    }
}
