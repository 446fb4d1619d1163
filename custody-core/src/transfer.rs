//! Transfer primitive boundary
//!
//! The engines never do token accounting for externally-custodied assets;
//! they call this seam to move value and trust it to fail atomically.

use crate::error::Result;
use crate::types::{AccountId, Amount, AssetId};

/// External token-transfer service
///
/// Moves a fixed amount of a named asset between owners, or fails the whole
/// operation with [`crate::Error::InsufficientFunds`]. Implementations must
/// be linearizable per `(account, asset)` pair: a successful call has fully
/// moved the funds before it returns.
pub trait TokenTransfer: Send + Sync {
    /// Move `amount` of `asset` from `from` to `to`
    ///
    /// Used by the engines to release custody they hold directly.
    fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()>;

    /// Move `amount` of `asset` from `owner` to `to`, funded by the
    /// allowance `owner` previously granted to `spender`
    ///
    /// Used by the engines to pull funds into custody. Fails if either the
    /// allowance or the owner's balance is insufficient; on failure nothing
    /// has moved and no allowance has been consumed.
    fn transfer_from(
        &self,
        spender: &AccountId,
        owner: &AccountId,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()>;
}
