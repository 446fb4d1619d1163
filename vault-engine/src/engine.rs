//! Vault engine
//!
//! Balances live in a sharded map keyed by (account, asset). Mutations hold
//! the pair's entry guard across the funds movement and the balance write,
//! so deposits and withdrawals on one pair commit in a strict order while
//! other pairs proceed independently.

use custody_core::config::VaultConfig;
use custody_core::{
    AccountId, Amount, AssetId, CustodyEvent, Error, EventKind, EventSink, Metrics, Result,
    TokenTransfer,
};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Vault engine
pub struct VaultEngine {
    /// Free balance per (account, asset)
    balances: DashMap<(AccountId, AssetId), Amount>,

    /// Account under which vaulted funds are held
    custody: AccountId,

    /// External transfer primitive
    bank: Arc<dyn TokenTransfer>,

    /// Audit event sink
    events: Arc<dyn EventSink>,

    /// Operation counters
    metrics: Metrics,
}

impl VaultEngine {
    /// Create new vault engine
    pub fn new(
        config: &VaultConfig,
        bank: Arc<dyn TokenTransfer>,
        events: Arc<dyn EventSink>,
        metrics: Metrics,
    ) -> Self {
        Self {
            balances: DashMap::new(),
            custody: AccountId::new(config.custody_account.clone()),
            bank,
            events,
            metrics,
        }
    }

    /// Deposit `amount` of `asset`; the caller is the credited account
    ///
    /// Pulls the funds from the caller's allowance into custody and credits
    /// the vault balance as one unit: a failed pull leaves the balance
    /// untouched.
    pub fn deposit(&self, caller: &AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Err(self.reject("deposit", Error::InvalidArgument(
                "amount must be positive".to_string(),
            )));
        }
        if !caller.is_valid() {
            return Err(self.reject("deposit", Error::InvalidArgument(
                "malformed account identifier".to_string(),
            )));
        }

        let mut balance = self
            .balances
            .entry((caller.clone(), asset.clone()))
            .or_insert(Amount::ZERO);

        // Validate the credit before moving any funds
        let credited = balance.checked_add(amount).ok_or_else(|| {
            self.reject("deposit", Error::InvalidArgument("balance overflow".to_string()))
        })?;

        self.bank
            .transfer_from(&self.custody, caller, &self.custody, asset, amount)
            .map_err(|e| self.reject("deposit", e))?;
        *balance = credited;

        drop(balance);

        self.metrics.vault_deposits.inc();
        tracing::info!(account = %caller, %asset, %amount, balance = %credited, "vault deposit");
        self.events.emit(CustodyEvent::new(EventKind::VaultDeposited {
            account: caller.clone(),
            asset: asset.clone(),
            amount,
            balance: credited,
        }));

        Ok(())
    }

    /// Withdraw `amount` of `asset`; the caller is the debited account
    ///
    /// Fails `InsufficientFunds` if the vault balance is below `amount`;
    /// otherwise pushes the funds out of custody and debits the balance as
    /// one unit.
    pub fn withdraw(&self, caller: &AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Err(self.reject("withdraw", Error::InvalidArgument(
                "amount must be positive".to_string(),
            )));
        }
        if !caller.is_valid() {
            return Err(self.reject("withdraw", Error::InvalidArgument(
                "malformed account identifier".to_string(),
            )));
        }

        let mut balance = self
            .balances
            .get_mut(&(caller.clone(), asset.clone()))
            .ok_or_else(|| {
                self.reject("withdraw", Error::InsufficientFunds(format!(
                    "{} has no {} vault balance",
                    caller, asset
                )))
            })?;

        let debited = balance.checked_sub(amount).ok_or_else(|| {
            self.reject("withdraw", Error::InsufficientFunds(format!(
                "{} vault holds {} {}, needs {}",
                caller, *balance, asset, amount
            )))
        })?;

        self.bank
            .transfer(asset, &self.custody, caller, amount)
            .map_err(|e| self.reject("withdraw", e))?;
        *balance = debited;

        drop(balance);

        self.metrics.vault_withdrawals.inc();
        tracing::info!(account = %caller, %asset, %amount, balance = %debited, "vault withdrawal");
        self.events.emit(CustodyEvent::new(EventKind::VaultWithdrawn {
            account: caller.clone(),
            asset: asset.clone(),
            amount,
            balance: debited,
        }));

        Ok(())
    }

    /// Current vault balance, zero for unknown pairs
    pub fn balance(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.balances
            .get(&(account.clone(), asset.clone()))
            .map(|b| *b)
            .unwrap_or(Amount::ZERO)
    }

    fn reject(&self, operation: &str, error: Error) -> Error {
        self.metrics.rejected_operations.inc();
        tracing::warn!(operation, error = %error, "vault operation rejected");
        error
    }
}

impl fmt::Debug for VaultEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultEngine")
            .field("custody", &self.custody)
            .field("pairs", &self.balances.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_core::{InMemoryBank, MemorySink};

    struct Fixture {
        bank: Arc<InMemoryBank>,
        sink: Arc<MemorySink>,
        engine: VaultEngine,
    }

    fn fixture() -> Fixture {
        let bank = Arc::new(InMemoryBank::new());
        let sink = Arc::new(MemorySink::new());
        let engine = VaultEngine::new(
            &VaultConfig::default(),
            bank.clone(),
            sink.clone(),
            Metrics::new().unwrap(),
        );
        Fixture { bank, sink, engine }
    }

    fn fund(fx: &Fixture, account: &str, units: u128) {
        let account = AccountId::new(account);
        let asset = AssetId::new("USDC");
        fx.bank.mint(&account, &asset, Amount::new(units)).unwrap();
        fx.bank.approve(
            &account,
            &AccountId::new("custody.vault"),
            &asset,
            Amount::new(units),
        );
    }

    #[test]
    fn test_deposit_credits_balance() {
        let fx = fixture();
        fund(&fx, "alice", 100);
        let alice = AccountId::new("alice");
        let usdc = AssetId::new("USDC");

        fx.engine.deposit(&alice, &usdc, Amount::new(60)).unwrap();
        fx.engine.deposit(&alice, &usdc, Amount::new(40)).unwrap();

        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::new(100));
        assert_eq!(fx.bank.balance_of(&alice, &usdc), Amount::ZERO);
        assert_eq!(
            fx.bank
                .balance_of(&AccountId::new("custody.vault"), &usdc),
            Amount::new(100)
        );
    }

    #[test]
    fn test_deposit_rejects_zero_and_unfunded() {
        let fx = fixture();
        let alice = AccountId::new("alice");
        let usdc = AssetId::new("USDC");

        assert!(matches!(
            fx.engine.deposit(&alice, &usdc, Amount::ZERO),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            fx.engine.deposit(&alice, &usdc, Amount::new(5)),
            Err(Error::InsufficientFunds(_))
        ));
        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::ZERO);
        assert!(fx.sink.is_empty());
    }

    #[test]
    fn test_malformed_caller_rejected_on_both_sides() {
        let fx = fixture();
        let nobody = AccountId::new("");
        let usdc = AssetId::new("USDC");

        assert!(matches!(
            fx.engine.deposit(&nobody, &usdc, Amount::new(1)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            fx.engine.withdraw(&nobody, &usdc, Amount::new(1)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_withdraw_over_balance_fails_then_exact_succeeds() {
        let fx = fixture();
        fund(&fx, "alice", 5);
        let alice = AccountId::new("alice");
        let usdc = AssetId::new("USDC");

        fx.engine.deposit(&alice, &usdc, Amount::new(5)).unwrap();

        // Six out of five: rejected, balance untouched
        assert!(matches!(
            fx.engine.withdraw(&alice, &usdc, Amount::new(6)),
            Err(Error::InsufficientFunds(_))
        ));
        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::new(5));

        // Exact amount drains the pair to zero
        fx.engine.withdraw(&alice, &usdc, Amount::new(5)).unwrap();
        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::ZERO);
        assert_eq!(fx.bank.balance_of(&alice, &usdc), Amount::new(5));
    }

    #[test]
    fn test_round_trip_restores_wallet() {
        let fx = fixture();
        fund(&fx, "alice", 100);
        let alice = AccountId::new("alice");
        let usdc = AssetId::new("USDC");

        let wallet_before = fx.bank.balance_of(&alice, &usdc);
        fx.engine.deposit(&alice, &usdc, Amount::new(100)).unwrap();
        fx.engine.withdraw(&alice, &usdc, Amount::new(100)).unwrap();

        assert_eq!(fx.bank.balance_of(&alice, &usdc), wallet_before);
        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::ZERO);
    }

    #[test]
    fn test_withdraw_only_touches_callers_pair() {
        let fx = fixture();
        fund(&fx, "alice", 10);
        fund(&fx, "bob", 20);
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");
        let usdc = AssetId::new("USDC");

        fx.engine.deposit(&alice, &usdc, Amount::new(10)).unwrap();
        fx.engine.deposit(&bob, &usdc, Amount::new(20)).unwrap();

        // A stranger with no pair cannot withdraw anyone's funds
        assert!(matches!(
            fx.engine
                .withdraw(&AccountId::new("mallory"), &usdc, Amount::new(1)),
            Err(Error::InsufficientFunds(_))
        ));

        fx.engine.withdraw(&bob, &usdc, Amount::new(20)).unwrap();
        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::new(10));
    }

    #[test]
    fn test_balances_scoped_per_asset() {
        let fx = fixture();
        let alice = AccountId::new("alice");
        let usdc = AssetId::new("USDC");
        let native = AssetId::native();

        fund(&fx, "alice", 10);
        fx.bank.mint(&alice, &native, Amount::new(7)).unwrap();
        fx.bank.approve(
            &alice,
            &AccountId::new("custody.vault"),
            &native,
            Amount::new(7),
        );

        fx.engine.deposit(&alice, &usdc, Amount::new(10)).unwrap();
        fx.engine.deposit(&alice, &native, Amount::new(7)).unwrap();

        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::new(10));
        assert_eq!(fx.engine.balance(&alice, &native), Amount::new(7));

        fx.engine.withdraw(&alice, &native, Amount::new(7)).unwrap();
        assert_eq!(fx.engine.balance(&alice, &usdc), Amount::new(10));
    }

    #[test]
    fn test_events_carry_resulting_balance() {
        let fx = fixture();
        fund(&fx, "alice", 10);
        let alice = AccountId::new("alice");
        let usdc = AssetId::new("USDC");

        fx.engine.deposit(&alice, &usdc, Amount::new(10)).unwrap();
        fx.engine.withdraw(&alice, &usdc, Amount::new(4)).unwrap();

        let events = fx.sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].kind,
            EventKind::VaultDeposited { balance, .. } if balance == Amount::new(10)
        ));
        assert!(matches!(
            events[1].kind,
            EventKind::VaultWithdrawn { balance, .. } if balance == Amount::new(6)
        ));
    }
}
