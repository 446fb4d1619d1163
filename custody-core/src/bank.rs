//! In-memory reference bank
//!
//! A linearizable implementation of the transfer primitive, used by tests
//! and the demo orchestrator in place of the real token-transfer service.
//! Balances and allowances live in sharded maps keyed by composite ids;
//! no global lock is taken across accounts.

use crate::error::{Error, Result};
use crate::transfer::TokenTransfer;
use crate::types::{AccountId, Amount, AssetId};
use dashmap::DashMap;

/// In-memory balances and allowances
#[derive(Debug, Default)]
pub struct InMemoryBank {
    /// Free balance per (account, asset)
    balances: DashMap<(AccountId, AssetId), Amount>,

    /// Remaining allowance per (owner, spender, asset)
    allowances: DashMap<(AccountId, AccountId, AssetId), Amount>,

    /// Minted supply per asset; caps every balance below u128::MAX
    supply: DashMap<AssetId, Amount>,
}

impl InMemoryBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` of `asset` into `account`
    pub fn mint(&self, account: &AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        {
            let mut supply = self.supply.entry(asset.clone()).or_insert(Amount::ZERO);
            *supply = supply
                .checked_add(amount)
                .ok_or_else(|| Error::InvalidArgument("asset supply overflow".to_string()))?;
        }

        let mut balance = self
            .balances
            .entry((account.clone(), asset.clone()))
            .or_insert(Amount::ZERO);
        // Cannot overflow: balance <= minted supply, which was just checked
        *balance = balance.checked_add(amount).unwrap_or(*balance);

        tracing::debug!(%account, %asset, %amount, "minted");
        Ok(())
    }

    /// Set the allowance `owner` grants to `spender` for `asset`
    ///
    /// Overwrite semantics: a second approval replaces the first.
    pub fn approve(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) {
        self.allowances
            .insert((owner.clone(), spender.clone(), asset.clone()), amount);
        tracing::debug!(%owner, %spender, %asset, %amount, "allowance granted");
    }

    /// Current free balance of `account` in `asset`
    pub fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.balances
            .get(&(account.clone(), asset.clone()))
            .map(|b| *b)
            .unwrap_or(Amount::ZERO)
    }

    /// Remaining allowance `owner` has granted to `spender` for `asset`
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId, asset: &AssetId) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone(), asset.clone()))
            .map(|a| *a)
            .unwrap_or(Amount::ZERO)
    }

    /// Debit `amount` from `account`, failing on insufficient balance
    fn debit(&self, account: &AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        let mut balance = self
            .balances
            .entry((account.clone(), asset.clone()))
            .or_insert(Amount::ZERO);

        *balance = balance.checked_sub(amount).ok_or_else(|| {
            Error::InsufficientFunds(format!(
                "{} holds {} {}, needs {}",
                account, *balance, asset, amount
            ))
        })?;
        Ok(())
    }

    /// Credit `amount` to `account`
    fn credit(&self, account: &AccountId, asset: &AssetId, amount: Amount) {
        let mut balance = self
            .balances
            .entry((account.clone(), asset.clone()))
            .or_insert(Amount::ZERO);
        // Cannot overflow: every balance is bounded by the minted supply
        *balance = balance.checked_add(amount).unwrap_or(*balance);
    }
}

impl TokenTransfer for InMemoryBank {
    fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        // Debit first; the guard is dropped before the credit takes a new
        // entry, so two entries of the same shard are never held at once.
        self.debit(from, asset, amount)?;
        self.credit(to, asset, amount);

        tracing::debug!(%asset, %from, %to, %amount, "transferred");
        Ok(())
    }

    fn transfer_from(
        &self,
        spender: &AccountId,
        owner: &AccountId,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        // Consume allowance up front; restored if the funding debit fails.
        {
            let mut allowance = self
                .allowances
                .entry((owner.clone(), spender.clone(), asset.clone()))
                .or_insert(Amount::ZERO);

            *allowance = allowance.checked_sub(amount).ok_or_else(|| {
                Error::InsufficientFunds(format!(
                    "{} allowed {} only {} {}, needs {}",
                    owner, spender, *allowance, asset, amount
                ))
            })?;
        }

        if let Err(e) = self.transfer(asset, owner, to, amount) {
            let mut allowance = self
                .allowances
                .entry((owner.clone(), spender.clone(), asset.clone()))
                .or_insert(Amount::ZERO);
            *allowance = allowance.checked_add(amount).unwrap_or(*allowance);
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn usdc() -> AssetId {
        AssetId::new("USDC")
    }

    #[test]
    fn test_mint_and_balance() {
        let bank = InMemoryBank::new();
        bank.mint(&acct("alice"), &usdc(), Amount::new(1_000)).unwrap();

        assert_eq!(bank.balance_of(&acct("alice"), &usdc()), Amount::new(1_000));
        assert_eq!(bank.balance_of(&acct("bob"), &usdc()), Amount::ZERO);
    }

    #[test]
    fn test_transfer_moves_funds() {
        let bank = InMemoryBank::new();
        bank.mint(&acct("alice"), &usdc(), Amount::new(100)).unwrap();

        bank.transfer(&usdc(), &acct("alice"), &acct("bob"), Amount::new(40))
            .unwrap();

        assert_eq!(bank.balance_of(&acct("alice"), &usdc()), Amount::new(60));
        assert_eq!(bank.balance_of(&acct("bob"), &usdc()), Amount::new(40));
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let bank = InMemoryBank::new();
        bank.mint(&acct("alice"), &usdc(), Amount::new(10)).unwrap();

        let result = bank.transfer(&usdc(), &acct("alice"), &acct("bob"), Amount::new(11));
        assert!(matches!(result, Err(Error::InsufficientFunds(_))));

        // Nothing moved
        assert_eq!(bank.balance_of(&acct("alice"), &usdc()), Amount::new(10));
        assert_eq!(bank.balance_of(&acct("bob"), &usdc()), Amount::ZERO);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let bank = InMemoryBank::new();
        bank.mint(&acct("alice"), &usdc(), Amount::new(100)).unwrap();
        bank.approve(&acct("alice"), &acct("escrow"), &usdc(), Amount::new(70));

        bank.transfer_from(
            &acct("escrow"),
            &acct("alice"),
            &acct("escrow-custody"),
            &usdc(),
            Amount::new(70),
        )
        .unwrap();

        assert_eq!(bank.balance_of(&acct("alice"), &usdc()), Amount::new(30));
        assert_eq!(
            bank.balance_of(&acct("escrow-custody"), &usdc()),
            Amount::new(70)
        );
        assert_eq!(
            bank.allowance(&acct("alice"), &acct("escrow"), &usdc()),
            Amount::ZERO
        );
    }

    #[test]
    fn test_transfer_from_without_allowance() {
        let bank = InMemoryBank::new();
        bank.mint(&acct("alice"), &usdc(), Amount::new(100)).unwrap();

        let result = bank.transfer_from(
            &acct("escrow"),
            &acct("alice"),
            &acct("escrow-custody"),
            &usdc(),
            Amount::new(1),
        );
        assert!(matches!(result, Err(Error::InsufficientFunds(_))));
        assert_eq!(bank.balance_of(&acct("alice"), &usdc()), Amount::new(100));
    }

    #[test]
    fn test_transfer_from_restores_allowance_on_balance_failure() {
        let bank = InMemoryBank::new();
        bank.mint(&acct("alice"), &usdc(), Amount::new(10)).unwrap();
        bank.approve(&acct("alice"), &acct("escrow"), &usdc(), Amount::new(50));

        let result = bank.transfer_from(
            &acct("escrow"),
            &acct("alice"),
            &acct("escrow-custody"),
            &usdc(),
            Amount::new(50),
        );
        assert!(matches!(result, Err(Error::InsufficientFunds(_))));

        // Allowance is back to the granted value
        assert_eq!(
            bank.allowance(&acct("alice"), &acct("escrow"), &usdc()),
            Amount::new(50)
        );
        assert_eq!(bank.balance_of(&acct("alice"), &usdc()), Amount::new(10));
    }

    #[test]
    fn test_approve_overwrites() {
        let bank = InMemoryBank::new();
        bank.approve(&acct("alice"), &acct("vault"), &usdc(), Amount::new(10));
        bank.approve(&acct("alice"), &acct("vault"), &usdc(), Amount::new(3));

        assert_eq!(
            bank.allowance(&acct("alice"), &acct("vault"), &usdc()),
            Amount::new(3)
        );
    }
}
