//! Metrics collection for observability
//!
//! Prometheus counters for the custody operation surface.
//!
//! # Metrics
//!
//! - `custody_trades_created_total` - Trades created
//! - `custody_trades_completed_total` - Trades confirmed by buyers
//! - `custody_trades_cancelled_total` - Trades cancelled by sellers
//! - `custody_savings_created_total` - Savings entries created
//! - `custody_savings_withdrawn_total` - Savings entries withdrawn
//! - `custody_vault_deposits_total` - Vault deposits
//! - `custody_vault_withdrawals_total` - Vault withdrawals
//! - `custody_rejected_operations_total` - Operations rejected with an error

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Trades created
    pub trades_created: IntCounter,

    /// Trades completed
    pub trades_completed: IntCounter,

    /// Trades cancelled
    pub trades_cancelled: IntCounter,

    /// Savings entries created
    pub savings_created: IntCounter,

    /// Savings entries withdrawn
    pub savings_withdrawn: IntCounter,

    /// Vault deposits
    pub vault_deposits: IntCounter,

    /// Vault withdrawals
    pub vault_withdrawals: IntCounter,

    /// Rejected operations
    pub rejected_operations: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with a private registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let trades_created =
            IntCounter::new("custody_trades_created_total", "Trades created")?;
        registry.register(Box::new(trades_created.clone()))?;

        let trades_completed =
            IntCounter::new("custody_trades_completed_total", "Trades confirmed by buyers")?;
        registry.register(Box::new(trades_completed.clone()))?;

        let trades_cancelled =
            IntCounter::new("custody_trades_cancelled_total", "Trades cancelled by sellers")?;
        registry.register(Box::new(trades_cancelled.clone()))?;

        let savings_created =
            IntCounter::new("custody_savings_created_total", "Savings entries created")?;
        registry.register(Box::new(savings_created.clone()))?;

        let savings_withdrawn =
            IntCounter::new("custody_savings_withdrawn_total", "Savings entries withdrawn")?;
        registry.register(Box::new(savings_withdrawn.clone()))?;

        let vault_deposits =
            IntCounter::new("custody_vault_deposits_total", "Vault deposits")?;
        registry.register(Box::new(vault_deposits.clone()))?;

        let vault_withdrawals =
            IntCounter::new("custody_vault_withdrawals_total", "Vault withdrawals")?;
        registry.register(Box::new(vault_withdrawals.clone()))?;

        let rejected_operations = IntCounter::new(
            "custody_rejected_operations_total",
            "Operations rejected with an error",
        )?;
        registry.register(Box::new(rejected_operations.clone()))?;

        Ok(Self {
            trades_created,
            trades_completed,
            trades_cancelled,
            savings_created,
            savings_withdrawn,
            vault_deposits,
            vault_withdrawals,
            rejected_operations,
            registry,
        })
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.trades_created.get(), 0);
        assert_eq!(metrics.vault_deposits.get(), 0);
    }

    #[test]
    fn test_counters_increment() {
        let metrics = Metrics::new().unwrap();
        metrics.trades_created.inc();
        metrics.trades_created.inc();
        metrics.rejected_operations.inc();

        assert_eq!(metrics.trades_created.get(), 2);
        assert_eq!(metrics.rejected_operations.get(), 1);
    }

    #[test]
    fn test_private_registries_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();

        a.trades_created.inc();
        assert_eq!(a.trades_created.get(), 1);
        assert_eq!(b.trades_created.get(), 0);
    }
}
