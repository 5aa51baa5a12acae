//! Ledger configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Amount, AssetId, Result, RollupError, TokenAddress, constants};

/// A net-deposit ceiling for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCap {
    pub asset: AssetId,
    pub cap: Amount,
}

/// Configuration for a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Wrapped token used for native-currency deposits and withdrawals.
    pub native_token: TokenAddress,
    /// Per-asset net-deposit caps. Assets without an entry are uncapped.
    #[serde(default)]
    pub deposit_caps: Vec<DepositCap>,
    /// Maximum number of transactions accepted in one committed block.
    #[serde(default = "default_max_block_transactions")]
    pub max_block_transactions: usize,
}

fn default_max_block_transactions() -> usize {
    constants::DEFAULT_MAX_BLOCK_TRANSACTIONS
}

impl LedgerConfig {
    /// Configuration with no caps and default limits.
    #[must_use]
    pub fn new(native_token: TokenAddress) -> Self {
        Self {
            native_token,
            deposit_caps: Vec::new(),
            max_block_transactions: constants::DEFAULT_MAX_BLOCK_TRANSACTIONS,
        }
    }

    /// Add (or replace) a deposit cap.
    #[must_use]
    pub fn with_cap(mut self, asset: AssetId, cap: Amount) -> Self {
        self.deposit_caps.retain(|c| c.asset != asset);
        self.deposit_caps.push(DepositCap { asset, cap });
        self
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RollupError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_block_transactions == 0 {
            return Err(RollupError::Configuration(
                "max_block_transactions must be > 0".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for cap in &self.deposit_caps {
            if !seen.insert(cap.asset) {
                return Err(RollupError::Configuration(format!(
                    "duplicate deposit cap for {}",
                    cap.asset
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let json = format!(r#"{{"native_token": {:?}}}"#, [7u8; 20]);
        let cfg = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg.native_token, TokenAddress([7; 20]));
        assert!(cfg.deposit_caps.is_empty());
        assert_eq!(cfg.max_block_transactions, 10_000);
    }

    #[test]
    fn with_cap_replaces_existing() {
        let cfg = LedgerConfig::new(TokenAddress([0; 20]))
            .with_cap(AssetId(1), 10)
            .with_cap(AssetId(1), 20);
        assert_eq!(cfg.deposit_caps, vec![DepositCap { asset: AssetId(1), cap: 20 }]);
    }

    #[test]
    fn duplicate_caps_rejected() {
        let mut cfg = LedgerConfig::new(TokenAddress([0; 20]));
        cfg.deposit_caps = vec![
            DepositCap { asset: AssetId(1), cap: 1 },
            DepositCap { asset: AssetId(1), cap: 2 },
        ];
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, RollupError::Configuration(_)));
    }

    #[test]
    fn zero_block_size_rejected() {
        let mut cfg = LedgerConfig::new(TokenAddress([0; 20]));
        cfg.max_block_transactions = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = LedgerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, RollupError::Configuration(_)));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = LedgerConfig::new(TokenAddress([5; 20])).with_cap(AssetId(2), 1_000);
        let json = serde_json::to_string(&cfg).unwrap();
        let back = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn from_file_loads_json() {
        let path = std::env::temp_dir().join(format!(
            "rollup-ledger-config-{:016x}.json",
            rand::random::<u64>()
        ));
        let cfg = LedgerConfig::new(TokenAddress([9; 20])).with_cap(AssetId(3), 77);
        std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();

        let loaded = LedgerConfig::from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), cfg);
    }

    #[test]
    fn from_file_missing_path_is_io_error() {
        let path = std::env::temp_dir().join(format!(
            "rollup-ledger-missing-{:016x}.json",
            rand::random::<u64>()
        ));
        let err = LedgerConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, RollupError::Io(_)));
    }
}
