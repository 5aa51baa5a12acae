//! System-wide constants for the rollup ledger.

/// Reason carried by `CommitMismatch` when a deposit acknowledgement does
/// not match the next deposit queue entry.
pub const DEPOSIT_MISMATCH: &str = "invalid deposit transition, mismatch or wrong ordering";

/// Reason carried by `CommitMismatch` when a balance-sync acknowledgement
/// does not match the next balance-sync queue entry.
pub const BALANCE_SYNC_MISMATCH: &str =
    "invalid balance sync transition, mismatch or wrong ordering";

/// Default maximum number of transactions in a single committed block.
pub const DEFAULT_MAX_BLOCK_TRANSACTIONS: usize = 10_000;

/// Width in bytes of an encoded account or token address.
pub const ADDRESS_WIDTH: usize = 20;

/// Width in bytes of an encoded asset ID (big-endian `u16`).
pub const ASSET_ID_WIDTH: usize = 2;

/// Width in bytes of an encoded amount (big-endian `u128`).
pub const AMOUNT_WIDTH: usize = 16;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "RollupLedger";
