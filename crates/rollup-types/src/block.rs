//! Rollup block lifecycle types.
//!
//! Blocks are committed in strictly increasing ID order and executed in
//! the same order:
//! **COMMITTED → EXECUTED**
//!
//! A committed block records which contiguous queue ranges it consumed so
//! execution can clear exactly those slots without scanning the queues.

use std::{fmt, ops::Range};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, BlockId, RollupTx, SlotIndex};

/// Two-phase finality state of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockState {
    Committed { committed_at: DateTime<Utc> },
    Executed {
        committed_at: DateTime<Utc>,
        executed_at: DateTime<Utc>,
    },
}

impl BlockState {
    #[must_use]
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }

    #[must_use]
    pub fn committed_at(&self) -> DateTime<Utc> {
        match *self {
            Self::Committed { committed_at } | Self::Executed { committed_at, .. } => committed_at,
        }
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed { .. } => write!(f, "COMMITTED"),
            Self::Executed { .. } => write!(f, "EXECUTED"),
        }
    }
}

/// A withdrawal recorded at commit time, credited at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawCommit {
    pub account: AccountId,
    pub asset: AssetId,
    pub amount: Amount,
}

/// A committed rollup block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupBlock {
    pub id: BlockId,
    /// The transactions in the order they were committed.
    pub transactions: Vec<RollupTx>,
    pub state: BlockState,
    /// Deposit queue slots acknowledged by this block.
    pub deposit_slots: Range<SlotIndex>,
    /// Balance-sync queue slots acknowledged by this block.
    pub balance_sync_slots: Range<SlotIndex>,
}

impl RollupBlock {
    /// Create a freshly committed block.
    #[must_use]
    pub fn committed(
        id: BlockId,
        transactions: Vec<RollupTx>,
        deposit_slots: Range<SlotIndex>,
        balance_sync_slots: Range<SlotIndex>,
    ) -> Self {
        Self {
            id,
            transactions,
            state: BlockState::Committed {
                committed_at: Utc::now(),
            },
            deposit_slots,
            balance_sync_slots,
        }
    }

    #[must_use]
    pub fn is_executed(&self) -> bool {
        self.state.is_executed()
    }

    /// Transition COMMITTED → EXECUTED. Returns `false` if already executed.
    pub fn mark_executed(&mut self) -> bool {
        match self.state {
            BlockState::Committed { committed_at } => {
                self.state = BlockState::Executed {
                    committed_at,
                    executed_at: Utc::now(),
                };
                true
            }
            BlockState::Executed { .. } => false,
        }
    }
}
