//! Ledger events, the append-only audit trail of state transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, BlockId, SlotIndex};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Funds entered custody and were queued for acknowledgement.
    AssetDeposited {
        account: AccountId,
        asset: AssetId,
        amount: Amount,
        /// The block the deposit is expected to land in (next to commit).
        block_id: BlockId,
        slot: SlotIndex,
    },
    /// A strategy balance report was queued.
    BalanceSynced {
        asset: AssetId,
        amount: Amount,
        slot: SlotIndex,
    },
    RollupBlockCommitted { block_id: BlockId, transactions: usize },
    RollupBlockExecuted { block_id: BlockId },
    RollupBlockReverted { block_id: BlockId },
    /// Accumulated withdrawals were paid out of custody.
    WithdrawalClaimed {
        account: AccountId,
        asset: AssetId,
        amount: Amount,
    },
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AssetDeposited { .. } => write!(f, "ASSET_DEPOSITED"),
            Self::BalanceSynced { .. } => write!(f, "BALANCE_SYNCED"),
            Self::RollupBlockCommitted { .. } => write!(f, "ROLLUP_BLOCK_COMMITTED"),
            Self::RollupBlockExecuted { .. } => write!(f, "ROLLUP_BLOCK_EXECUTED"),
            Self::RollupBlockReverted { .. } => write!(f, "ROLLUP_BLOCK_REVERTED"),
            Self::WithdrawalClaimed { .. } => write!(f, "WITHDRAWAL_CLAIMED"),
        }
    }
}

/// A timestamped event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub kind: EventKind,
    pub emitted_at: DateTime<Utc>,
}

impl LedgerEvent {
    #[must_use]
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            emitted_at: Utc::now(),
        }
    }
}
