//! Savings engine
//!
//! Entries live in a sharded map keyed by owning account; each account's
//! sequence is mutated under its entry guard, so creates and withdrawals for
//! one owner observe a strict commit order while other owners proceed
//! independently.

use crate::types::{SavingsEntry, MIN_LOCK_DAYS, SECONDS_PER_DAY};
use custody_core::config::SavingsConfig;
use custody_core::{
    AccountId, Amount, AssetId, Clock, CustodyEvent, Error, EventKind, EventSink, Metrics,
    Result, TokenTransfer,
};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Savings engine
pub struct SavingsEngine {
    /// Append-only entry sequences per owner
    entries: DashMap<AccountId, Vec<SavingsEntry>>,

    /// Account under which locked funds are held
    custody: AccountId,

    /// External transfer primitive
    bank: Arc<dyn TokenTransfer>,

    /// Time source for unlock checks
    clock: Arc<dyn Clock>,

    /// Audit event sink
    events: Arc<dyn EventSink>,

    /// Operation counters
    metrics: Metrics,
}

impl SavingsEngine {
    /// Create new savings engine
    pub fn new(
        config: &SavingsConfig,
        bank: Arc<dyn TokenTransfer>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
        metrics: Metrics,
    ) -> Self {
        Self {
            entries: DashMap::new(),
            custody: AccountId::new(config.custody_account.clone()),
            bank,
            clock,
            events,
            metrics,
        }
    }

    /// Create a time-locked hold; the caller becomes the owner
    ///
    /// Pulls `amount` of `asset` from the caller's allowance into custody and
    /// appends a new entry unlocking after `lock_days` days. Returns the
    /// entry's stable index. If the pull fails, no entry persists.
    pub fn create_saving(
        &self,
        caller: &AccountId,
        asset: &AssetId,
        amount: Amount,
        lock_days: u64,
        goal_name: impl Into<String>,
    ) -> Result<u64> {
        if amount.is_zero() {
            return Err(self.reject("create_saving", Error::InvalidArgument(
                "amount must be positive".to_string(),
            )));
        }
        if !caller.is_valid() {
            return Err(self.reject("create_saving", Error::InvalidArgument(
                "malformed account identifier".to_string(),
            )));
        }
        if lock_days < MIN_LOCK_DAYS {
            return Err(self.reject("create_saving", Error::InvalidArgument(format!(
                "lock period {} days is below the {} day minimum",
                lock_days, MIN_LOCK_DAYS
            ))));
        }

        let unlock_time = i64::try_from(lock_days)
            .ok()
            .and_then(|days| days.checked_mul(SECONDS_PER_DAY))
            .and_then(|seconds| self.clock.now_unix().checked_add(seconds))
            .ok_or_else(|| {
                self.reject("create_saving", Error::InvalidArgument(format!(
                    "lock period {} days overflows the unlock time",
                    lock_days
                )))
            })?;
        let goal_name = goal_name.into();

        // The index is assigned under the owner's entry guard, after the
        // funds pull has succeeded, so a failed pull leaves no record.
        self.bank
            .transfer_from(&self.custody, caller, &self.custody, asset, amount)
            .map_err(|e| self.reject("create_saving", e))?;

        let index = {
            let mut sequence = self.entries.entry(caller.clone()).or_default();
            sequence.push(SavingsEntry {
                amount,
                unlock_time,
                asset: asset.clone(),
                withdrawn: false,
                goal_name: goal_name.clone(),
            });
            (sequence.len() - 1) as u64
        };

        self.metrics.savings_created.inc();
        tracing::info!(owner = %caller, index, %asset, %amount, unlock_time, goal = %goal_name, "saving created");
        self.events.emit(CustodyEvent::new(EventKind::SavingCreated {
            owner: caller.clone(),
            index,
            asset: asset.clone(),
            amount,
            unlock_time,
        }));

        Ok(index)
    }

    /// Withdraw an unlocked entry; the caller must own it
    ///
    /// Returns the full amount to the owner and marks the entry withdrawn.
    /// Fails `NotYetUnlocked` before the unlock time and `AlreadyFinalized`
    /// on any repeat attempt.
    pub fn withdraw_saving(&self, caller: &AccountId, index: u64) -> Result<()> {
        let mut sequence = self
            .entries
            .get_mut(caller)
            .ok_or_else(|| self.reject("withdraw_saving", Error::NotFound(format!(
                "no savings for {}",
                caller
            ))))?;

        let now = self.clock.now_unix();
        let entry = sequence.get_mut(index as usize).ok_or_else(|| {
            self.reject(
                "withdraw_saving",
                Error::NotFound(format!("saving {}/{}", caller, index)),
            )
        })?;

        if entry.withdrawn {
            return Err(self.reject("withdraw_saving", Error::AlreadyFinalized(format!(
                "saving {}/{} already withdrawn",
                caller, index
            ))));
        }
        if !entry.is_unlocked(now) {
            return Err(self.reject(
                "withdraw_saving",
                Error::NotYetUnlocked(entry.time_until_unlock(now)),
            ));
        }

        self.bank
            .transfer(&entry.asset, &self.custody, caller, entry.amount)
            .map_err(|e| self.reject("withdraw_saving", e))?;
        entry.withdrawn = true;

        let amount = entry.amount;
        drop(sequence);

        self.metrics.savings_withdrawn.inc();
        tracing::info!(owner = %caller, index, %amount, "saving withdrawn");
        self.events.emit(CustodyEvent::new(EventKind::SavingWithdrawn {
            owner: caller.clone(),
            index,
            amount,
        }));

        Ok(())
    }

    /// All entries of `account` in creation order, withdrawn ones included
    pub fn get_user_savings(&self, account: &AccountId) -> Vec<SavingsEntry> {
        self.entries
            .get(account)
            .map(|sequence| sequence.clone())
            .unwrap_or_default()
    }

    /// Seconds until the entry at `index` unlocks, zero once unlocked
    pub fn time_until_unlock(&self, account: &AccountId, index: u64) -> Result<u64> {
        let sequence = self
            .entries
            .get(account)
            .ok_or_else(|| Error::NotFound(format!("no savings for {}", account)))?;
        let entry = sequence
            .get(index as usize)
            .ok_or_else(|| Error::NotFound(format!("saving {}/{}", account, index)))?;

        Ok(entry.time_until_unlock(self.clock.now_unix()))
    }

    fn reject(&self, operation: &str, error: Error) -> Error {
        self.metrics.rejected_operations.inc();
        tracing::warn!(operation, error = %error, "savings operation rejected");
        error
    }
}

impl fmt::Debug for SavingsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavingsEngine")
            .field("custody", &self.custody)
            .field("accounts", &self.entries.len())
            .finish()
    }
}
