//! Block commit engine.
//!
//! Committing a block is two passes over the transactions:
//! 1. **Plan**: check the block ID, then walk the transactions in order and
//!    match every acknowledgement against the next unconsumed slot of its
//!    queue by content hash. Read-only.
//! 2. **Apply**: consume the planned slots, record withdraw requests, store
//!    the block as COMMITTED.
//!
//! A mismatch anywhere in pass 1 rejects the whole block, so no partial
//! commit is ever persisted.

use std::ops::Range;

use rollup_types::{
    BlockId, Commitment, EventKind, LedgerEvent, Result, RollupBlock, RollupError, RollupTx,
    SlotIndex, WithdrawCommit, constants,
};

use crate::state::LedgerState;

/// The validated effects of a commit, computed without mutating state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    pub block_id: BlockId,
    pub deposit_slots: Range<SlotIndex>,
    pub balance_sync_slots: Range<SlotIndex>,
    pub withdraw_commits: Vec<WithdrawCommit>,
}

/// Validate `transactions` as block `block_id` against the current queues.
///
/// # Errors
/// - `InvalidBlockId` if `block_id` is not the next expected ID
/// - `BlockTooLarge` if the block exceeds the transaction limit
/// - `CommitMismatch` if an acknowledgement does not match the next slot
/// - `ZeroAmount` for zero-value withdraw requests
pub fn plan_commit(
    state: &LedgerState,
    block_id: BlockId,
    transactions: &[RollupTx],
) -> Result<CommitPlan> {
    let expected = state.next_block_id();
    if block_id != expected {
        return Err(RollupError::InvalidBlockId {
            expected,
            got: block_id,
        });
    }
    if transactions.len() > state.max_block_transactions {
        return Err(RollupError::BlockTooLarge {
            count: transactions.len(),
            max: state.max_block_transactions,
        });
    }

    let deposit_queue = state.deposits.queue();
    let sync_queue = state.balance_syncs.queue();
    let mut next_deposit = deposit_queue.cursor();
    let mut next_sync = sync_queue.cursor();
    let mut withdraw_commits = Vec::new();

    for (position, tx) in transactions.iter().enumerate() {
        match tx {
            RollupTx::DepositAck { .. } => {
                let claimed = tx.as_deposit().map(|p| p.content_hash());
                let matches = deposit_queue
                    .peek(next_deposit)
                    .is_some_and(|slot| slot.is_pending() && Some(slot.content_hash) == claimed);
                if !matches {
                    tracing::warn!(
                        block = block_id.0,
                        position,
                        kind = tx.kind(),
                        slot = next_deposit,
                        "Deposit acknowledgement does not match next pending deposit"
                    );
                    return Err(RollupError::CommitMismatch(
                        constants::DEPOSIT_MISMATCH.to_string(),
                    ));
                }
                next_deposit += 1;
            }
            RollupTx::BalanceSyncAck { .. } => {
                let claimed = tx.as_balance_sync().map(|p| p.content_hash());
                let matches = sync_queue
                    .peek(next_sync)
                    .is_some_and(|slot| slot.is_pending() && Some(slot.content_hash) == claimed);
                if !matches {
                    tracing::warn!(
                        block = block_id.0,
                        position,
                        kind = tx.kind(),
                        slot = next_sync,
                        "Balance sync acknowledgement does not match next pending sync"
                    );
                    return Err(RollupError::CommitMismatch(
                        constants::BALANCE_SYNC_MISMATCH.to_string(),
                    ));
                }
                next_sync += 1;
            }
            RollupTx::WithdrawRequest {
                account,
                asset,
                amount,
            } => {
                if *amount == 0 {
                    tracing::warn!(
                        block = block_id.0,
                        position,
                        kind = tx.kind(),
                        "Zero-amount withdraw request"
                    );
                    return Err(RollupError::ZeroAmount);
                }
                withdraw_commits.push(WithdrawCommit {
                    account: *account,
                    asset: *asset,
                    amount: *amount,
                });
            }
            RollupTx::Opaque(_) => {}
        }
    }

    Ok(CommitPlan {
        block_id,
        deposit_slots: deposit_queue.cursor()..next_deposit,
        balance_sync_slots: sync_queue.cursor()..next_sync,
        withdraw_commits,
    })
}

/// Commit `transactions` as block `block_id`.
///
/// # Errors
/// See [`plan_commit`]. On error the state is unchanged.
pub fn commit_block(
    state: &mut LedgerState,
    block_id: BlockId,
    transactions: Vec<RollupTx>,
) -> Result<()> {
    let plan = plan_commit(state, block_id, &transactions)?;

    for _ in plan.deposit_slots.clone() {
        state.deposits.queue_mut().consume(block_id)?;
    }
    for _ in plan.balance_sync_slots.clone() {
        state.balance_syncs.queue_mut().consume(block_id)?;
    }
    if !plan.withdraw_commits.is_empty() {
        state
            .withdraw_commits
            .insert(block_id, plan.withdraw_commits.clone());
    }

    let tx_count = transactions.len();
    state.blocks.push(RollupBlock::committed(
        block_id,
        transactions,
        plan.deposit_slots.clone(),
        plan.balance_sync_slots.clone(),
    ));

    tracing::info!(
        block = block_id.0,
        transactions = tx_count,
        deposits = plan.deposit_slots.end - plan.deposit_slots.start,
        balance_syncs = plan.balance_sync_slots.end - plan.balance_sync_slots.start,
        withdrawals = plan.withdraw_commits.len(),
        deposits_waiting = state.deposits.queue().unconsumed(),
        balance_syncs_waiting = state.balance_syncs.queue().unconsumed(),
        "Rollup block committed"
    );

    state.push_event(LedgerEvent::now(EventKind::RollupBlockCommitted {
        block_id,
        transactions: tx_count,
    }));
    Ok(())
}

/// Un-commit the newest committed block, provided it has not executed.
///
/// Its slots go back to PENDING, the queue cursors rewind and its withdraw
/// requests are dropped. Returns the reverted block's ID.
///
/// # Errors
/// Returns `NoBlockToRevert` if there is no unexecuted block.
pub fn revert_last_block(state: &mut LedgerState) -> Result<BlockId> {
    if state.unexecuted_blocks() == 0 {
        return Err(RollupError::NoBlockToRevert);
    }
    let Some(block) = state.blocks.last() else {
        return Err(RollupError::NoBlockToRevert);
    };
    let block_id = block.id;
    let deposit_slots = block.deposit_slots.clone();
    let sync_slots = block.balance_sync_slots.clone();

    if deposit_slots.end != state.deposits.queue().cursor()
        || sync_slots.end != state.balance_syncs.queue().cursor()
    {
        return Err(RollupError::Internal(format!(
            "{block_id} slot ranges do not end at the queue cursors"
        )));
    }

    state.deposits.queue_mut().release(deposit_slots)?;
    state.balance_syncs.queue_mut().release(sync_slots)?;
    state.withdraw_commits.remove(&block_id);
    state.blocks.pop();

    tracing::info!(block = block_id.0, "Rollup block reverted");

    state.push_event(LedgerEvent::now(EventKind::RollupBlockReverted { block_id }));
    Ok(block_id)
}
