//! Configuration for the custody engines

use serde::{Deserialize, Serialize};

/// Custody configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Escrow engine configuration
    pub escrow: EscrowConfig,

    /// Savings engine configuration
    pub savings: SavingsConfig,

    /// Vault engine configuration
    pub vault: VaultConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "custody-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            escrow: EscrowConfig::default(),
            savings: SavingsConfig::default(),
            vault: VaultConfig::default(),
        }
    }
}

/// Escrow engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Account under which the escrow engine holds custody
    pub custody_account: String,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            custody_account: "custody.escrow".to_string(),
        }
    }
}

/// Savings engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsConfig {
    /// Account under which the savings engine holds custody
    pub custody_account: String,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self {
            custody_account: "custody.savings".to_string(),
        }
    }
}

/// Vault engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Account under which the vault engine holds custody
    pub custody_account: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            custody_account: "custody.vault".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(account) = std::env::var("CUSTODY_ESCROW_ACCOUNT") {
            config.escrow.custody_account = account;
        }

        if let Ok(account) = std::env::var("CUSTODY_SAVINGS_ACCOUNT") {
            config.savings.custody_account = account;
        }

        if let Ok(account) = std::env::var("CUSTODY_VAULT_ACCOUNT") {
            config.vault.custody_account = account;
        }

        Ok(config)
    }
}
