//! The single owned ledger state.
//!
//! Created once at genesis and mutated by every subsequent call. The
//! commit and execution engines take it by `&mut`, so at most one
//! mutation is ever in flight.

use std::collections::HashMap;

use rollup_ingress::{BalanceSyncTracker, DepositTracker};
use rollup_types::{
    AccountId, Amount, AssetId, BlockId, DepositCap, LedgerEvent, PendingCommitment, RollupBlock,
    SlotIndex, WithdrawCommit, constants,
};

use crate::withdrawals::WithdrawalAccumulator;

/// Everything the commit/execute state machine owns.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub(crate) deposits: DepositTracker,
    pub(crate) balance_syncs: BalanceSyncTracker,
    /// Committed blocks; index == block ID.
    pub(crate) blocks: Vec<RollupBlock>,
    /// Withdraw requests per committed, not-yet-executed block.
    pub(crate) withdraw_commits: HashMap<BlockId, Vec<WithdrawCommit>>,
    pub(crate) withdrawals: WithdrawalAccumulator,
    /// Next block ID eligible to execute.
    pub(crate) next_execute: BlockId,
    pub(crate) max_block_transactions: usize,
    events: Vec<LedgerEvent>,
}

impl LedgerState {
    /// Genesis state with default limits and no caps.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(&[], constants::DEFAULT_MAX_BLOCK_TRANSACTIONS)
    }

    #[must_use]
    pub fn with_limits(deposit_caps: &[DepositCap], max_block_transactions: usize) -> Self {
        Self {
            deposits: DepositTracker::with_caps(deposit_caps),
            balance_syncs: BalanceSyncTracker::new(),
            blocks: Vec::new(),
            withdraw_commits: HashMap::new(),
            withdrawals: WithdrawalAccumulator::new(),
            next_execute: BlockId::GENESIS,
            max_block_transactions,
            events: Vec::new(),
        }
    }

    /// ID the next committed block must carry (count of committed blocks).
    #[must_use]
    pub fn next_block_id(&self) -> BlockId {
        BlockId(self.blocks.len() as u64)
    }

    /// ID of the next block to execute.
    #[must_use]
    pub fn next_execute_id(&self) -> BlockId {
        self.next_execute
    }

    /// Number of blocks committed but not yet executed.
    #[must_use]
    pub fn unexecuted_blocks(&self) -> u64 {
        self.next_block_id().0 - self.next_execute.0
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&RollupBlock> {
        usize::try_from(id.0).ok().and_then(|i| self.blocks.get(i))
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> Option<&mut RollupBlock> {
        usize::try_from(id.0).ok().and_then(|i| self.blocks.get_mut(i))
    }

    #[must_use]
    pub fn pending_deposit(&self, index: SlotIndex) -> Option<PendingCommitment> {
        self.deposits.queue().peek(index).copied()
    }

    #[must_use]
    pub fn pending_balance_sync(&self, index: SlotIndex) -> Option<PendingCommitment> {
        self.balance_syncs.queue().peek(index).copied()
    }

    /// First deposit slot not yet acknowledged by a committed block.
    #[must_use]
    pub fn deposit_cursor(&self) -> SlotIndex {
        self.deposits.queue().cursor()
    }

    /// First balance-sync slot not yet acknowledged by a committed block.
    #[must_use]
    pub fn balance_sync_cursor(&self) -> SlotIndex {
        self.balance_syncs.queue().cursor()
    }

    /// The `index`-th withdraw request of a committed, unexecuted block.
    #[must_use]
    pub fn pending_withdraw_commit(&self, block: BlockId, index: usize) -> Option<WithdrawCommit> {
        self.withdraw_commits
            .get(&block)
            .and_then(|commits| commits.get(index))
            .copied()
    }

    /// Claimable withdrawal balance.
    #[must_use]
    pub fn pending_withdraw(&self, account: AccountId, asset: AssetId) -> Amount {
        self.withdrawals.pending(account, asset)
    }

    #[must_use]
    pub fn deposits(&self) -> &DepositTracker {
        &self.deposits
    }

    pub(crate) fn deposits_mut(&mut self) -> &mut DepositTracker {
        &mut self.deposits
    }

    #[must_use]
    pub fn balance_syncs(&self) -> &BalanceSyncTracker {
        &self.balance_syncs
    }

    pub(crate) fn balance_syncs_mut(&mut self) -> &mut BalanceSyncTracker {
        &mut self.balance_syncs
    }

    #[must_use]
    pub fn withdrawals(&self) -> &WithdrawalAccumulator {
        &self.withdrawals
    }

    pub(crate) fn withdrawals_mut(&mut self) -> &mut WithdrawalAccumulator {
        &mut self.withdrawals
    }

    pub(crate) fn push_event(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}
