//! Block execution engine.
//!
//! Finalizes the oldest committed-but-unexecuted block, one block per
//! call:
//! 1. Resolve the block at the execute cursor (`NoBlockToExecute` if none)
//! 2. Verify its queue slots are still COMMITTED to it, and dry-run every
//!    strategy intent against its strategy
//! 3. Apply strategy intents
//! 4. Clear its deposit and balance-sync slots
//! 5. Credit its withdraw requests to the accumulator
//! 6. Mark it EXECUTED and advance the cursor

use std::collections::{BTreeMap, HashMap};

use rollup_types::{
    AssetId, BlockId, CommitmentStatus, EventKind, IntentAction, LedgerEvent, PendingCommitment,
    Result, RollupError, SlotIndex, Strategy, StrategyIntent,
};

use crate::state::LedgerState;

/// Strategies attached to assets.
pub type StrategySet = HashMap<AssetId, Box<dyn Strategy>>;

/// Execute the next committed block. Returns its ID.
///
/// # Errors
/// - `NoBlockToExecute` if every committed block has executed
/// - `StrategyNotFound` if an intent names an asset without a strategy
/// - `Strategy` if a strategy rejects an intent
///
/// Every intent of the block is checked with [`Strategy::check_intents`]
/// before the first one is applied, so a rejected intent list leaves every
/// strategy untouched.
pub fn execute_block(
    state: &mut LedgerState,
    strategies: &mut StrategySet,
    intents: &[StrategyIntent],
) -> Result<BlockId> {
    let block_id = state.next_execute;
    let block = state.block(block_id).ok_or(RollupError::NoBlockToExecute)?;
    let deposit_slots = block.deposit_slots.clone();
    let sync_slots = block.balance_sync_slots.clone();

    for index in deposit_slots.clone() {
        check_slot(state.pending_deposit(index), index, block_id)?;
    }
    for index in sync_slots.clone() {
        check_slot(state.pending_balance_sync(index), index, block_id)?;
    }
    check_intents(strategies, intents)?;
    let withdraw_commits = state.withdraw_commits.remove(&block_id).unwrap_or_default();
    if let Err(err) = state.withdrawals.check_credits(&withdraw_commits) {
        state.withdraw_commits.insert(block_id, withdraw_commits);
        return Err(err);
    }

    // Intents are external calls and run before any internal effect of
    // this block is written.
    for intent in intents {
        if let Some(strategy) = strategies.get_mut(&intent.asset) {
            if let Err(err) = strategy.apply_intent(&intent.action) {
                tracing::warn!(
                    block = block_id.0,
                    asset = %intent.asset,
                    error = %err,
                    "Strategy intent rejected"
                );
                state.withdraw_commits.insert(block_id, withdraw_commits);
                return Err(err);
            }
        }
    }

    for index in deposit_slots.clone() {
        state.deposits.queue_mut().clear(index)?;
    }
    for index in sync_slots.clone() {
        state.balance_syncs.queue_mut().clear(index)?;
    }
    for commit in &withdraw_commits {
        state.withdrawals.credit(commit)?;
    }

    if let Some(block) = state.block_mut(block_id) {
        block.mark_executed();
    }
    state.next_execute = block_id.next();

    tracing::info!(
        block = block_id.0,
        intents = intents.len(),
        deposits_cleared = deposit_slots.end - deposit_slots.start,
        balance_syncs_cleared = sync_slots.end - sync_slots.start,
        withdrawals_credited = withdraw_commits.len(),
        "Rollup block executed"
    );

    state.push_event(LedgerEvent::now(EventKind::RollupBlockExecuted { block_id }));
    Ok(block_id)
}

/// Resolve every intent's strategy and dry-run each asset's actions in
/// block order.
fn check_intents(strategies: &StrategySet, intents: &[StrategyIntent]) -> Result<()> {
    let mut per_asset: BTreeMap<AssetId, Vec<IntentAction>> = BTreeMap::new();
    for intent in intents {
        if !strategies.contains_key(&intent.asset) {
            return Err(RollupError::StrategyNotFound(intent.asset));
        }
        per_asset.entry(intent.asset).or_default().push(intent.action);
    }
    for (asset, actions) in &per_asset {
        if let Some(strategy) = strategies.get(asset) {
            if let Err(err) = strategy.check_intents(actions) {
                tracing::warn!(asset = %asset, error = %err, "Strategy intents rejected");
                return Err(err);
            }
        }
    }
    Ok(())
}

fn check_slot(slot: Option<PendingCommitment>, index: SlotIndex, block_id: BlockId) -> Result<()> {
    match slot {
        Some(s) if s.status == CommitmentStatus::Committed && s.block_id == block_id => Ok(()),
        Some(s) => Err(RollupError::InvalidCommitmentState {
            slot: index,
            reason: format!("expected COMMITTED to {block_id}, found {} to {}", s.status, s.block_id),
        }),
        None => Err(RollupError::InvalidCommitmentState {
            slot: index,
            reason: "no such slot".to_string(),
        }),
    }
}
