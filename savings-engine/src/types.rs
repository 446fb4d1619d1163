//! Savings entry record

use custody_core::{Amount, AssetId};
use serde::{Deserialize, Serialize};

/// Minimum lock period in days
pub const MIN_LOCK_DAYS: u64 = 3;

/// Seconds per day for unlock arithmetic
pub const SECONDS_PER_DAY: i64 = 86_400;

/// One time-locked hold in an account's append-only sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsEntry {
    /// Locked amount, released in full exactly once
    pub amount: Amount,

    /// Unix seconds at which withdrawal becomes permitted
    pub unlock_time: i64,

    /// Locked asset
    pub asset: AssetId,

    /// One-way flag, false until the single withdrawal
    pub withdrawn: bool,

    /// Free-form goal label, may be empty
    pub goal_name: String,
}

impl SavingsEntry {
    /// Seconds remaining until unlock at time `now`, zero once unlocked
    pub fn time_until_unlock(&self, now: i64) -> u64 {
        self.unlock_time.saturating_sub(now).max(0) as u64
    }

    /// Whether the entry may be withdrawn at time `now`
    pub fn is_unlocked(&self, now: i64) -> bool {
        now >= self.unlock_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(unlock_time: i64) -> SavingsEntry {
        SavingsEntry {
            amount: Amount::new(10),
            unlock_time,
            asset: AssetId::new("USDC"),
            withdrawn: false,
            goal_name: "vacation".to_string(),
        }
    }

    #[test]
    fn test_time_until_unlock_clamps_at_zero() {
        let e = entry(1_000);
        assert_eq!(e.time_until_unlock(400), 600);
        assert_eq!(e.time_until_unlock(1_000), 0);
        assert_eq!(e.time_until_unlock(5_000), 0);
    }

    #[test]
    fn test_unlock_boundary_is_inclusive() {
        let e = entry(1_000);
        assert!(!e.is_unlocked(999));
        assert!(e.is_unlocked(1_000));
        assert!(e.is_unlocked(1_001));
    }
}
