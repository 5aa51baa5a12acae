//! End-to-end integration tests across the ledger.
//!
//! These tests drive the full two-phase lifecycle through `RollupLedger`:
//! deposit / balance sync (PENDING) -> commit_block (COMMITTED) ->
//! execute_block (EXECUTED) -> withdraw.
//!
//! They cover FIFO acknowledgement ordering, commitment hashing, atomic
//! rejection of bad blocks, execution ordering, revert, and deposit caps.

use rand::Rng;
use rollup_settlement::RollupLedger;
use rollup_types::*;
use sha2::{Digest, Sha256};

type Ledger = RollupLedger<InMemoryRegistry, InMemoryCustody>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Helper: a ledger with one registered ERC-20 style token and a funded user.
struct Pipeline {
    ledger: Ledger,
    token: TokenAddress,
    asset: AssetId,
    user: AccountId,
}

impl Pipeline {
    fn new() -> Self {
        Self::with_config(LedgerConfig::new)
    }

    fn with_config(build: impl FnOnce(TokenAddress) -> LedgerConfig) -> Self {
        init_tracing();
        let config = build(TokenAddress::random());
        let mut ledger = Ledger::new(config, InMemoryRegistry::new(), InMemoryCustody::new())
            .expect("valid config");
        let token = TokenAddress::random();
        let asset = ledger.register_asset(token).expect("fresh token");
        let user = AccountId::random();
        ledger.custody_mut().mint(user, token, 1_000_000);
        Self {
            ledger,
            token,
            asset,
            user,
        }
    }

    fn deposit_ack(&self, amount: Amount) -> RollupTx {
        RollupTx::DepositAck {
            account: self.user,
            asset: self.asset,
            amount,
        }
    }

    fn withdraw_req(&self, amount: Amount) -> RollupTx {
        RollupTx::WithdrawRequest {
            account: self.user,
            asset: self.asset,
            amount,
        }
    }

    fn next_block(&self) -> BlockId {
        self.ledger.state().next_block_id()
    }

    fn commit(&mut self, txs: Vec<RollupTx>) -> Result<()> {
        let id = self.next_block();
        self.ledger.commit_block(id, txs)
    }
}

fn sha256(bytes: &[u8]) -> CommitmentHash {
    CommitmentHash(Sha256::digest(bytes).into())
}

// =========================================================================
// Deposit -> withdraw round trip
// =========================================================================

#[test]
fn e2e_deposit_then_withdraw() {
    let mut p = Pipeline::new();

    let slot = p.ledger.deposit(p.user, p.token, 1).unwrap();
    assert_eq!(slot, 0);
    assert!(p.ledger.pending_deposit(0).unwrap().is_pending());

    // Block 0 acknowledges the deposit, block 1 requests the withdrawal.
    p.commit(vec![p.deposit_ack(1)]).unwrap();
    p.commit(vec![p.withdraw_req(1)]).unwrap();
    let commit = p.ledger.pending_withdraw_commit(BlockId(1), 0).unwrap();
    assert_eq!(commit.amount, 1);

    assert_eq!(p.ledger.execute_block(&[]).unwrap(), BlockId(0));
    assert!(p.ledger.pending_deposit(0).unwrap().is_cleared());
    assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 0);

    assert_eq!(p.ledger.execute_block(&[]).unwrap(), BlockId(1));
    assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 1);

    let before = p.ledger.custody().wallet_balance(p.user, p.token);
    assert_eq!(p.ledger.withdraw(p.user, p.token).unwrap(), 1);
    assert_eq!(p.ledger.custody().wallet_balance(p.user, p.token), before + 1);
    assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 0);
    assert_eq!(p.ledger.state().deposits().net_deposits(p.asset), 0);

    assert!(matches!(
        p.ledger.withdraw(p.user, p.token),
        Err(RollupError::NothingToWithdraw)
    ));
}

#[test]
fn e2e_events_follow_lifecycle() {
    let mut p = Pipeline::new();
    p.ledger.deposit(p.user, p.token, 10).unwrap();
    p.commit(vec![p.deposit_ack(10), p.withdraw_req(10)]).unwrap();
    p.ledger.execute_block(&[]).unwrap();
    p.ledger.withdraw(p.user, p.token).unwrap();

    let kinds: Vec<_> = p.ledger.take_events().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds.len(), 4);
    assert!(matches!(kinds[0], EventKind::AssetDeposited { amount: 10, slot: 0, .. }));
    assert!(matches!(
        kinds[1],
        EventKind::RollupBlockCommitted { block_id: BlockId(0), transactions: 2 }
    ));
    assert!(matches!(kinds[2], EventKind::RollupBlockExecuted { block_id: BlockId(0) }));
    assert!(matches!(kinds[3], EventKind::WithdrawalClaimed { amount: 10, .. }));
    assert!(p.ledger.take_events().is_empty());
}

// =========================================================================
// Commitment hashing
// =========================================================================

#[test]
fn e2e_deposit_hashes_cover_fields() {
    let mut p = Pipeline::new();
    let mut rng = rand::thread_rng();

    for slot in 0..32u64 {
        let amount: Amount = rng.gen_range(1..=10_000);
        assert_eq!(p.ledger.deposit(p.user, p.token, amount).unwrap(), slot);

        let mut bytes = p.user.as_bytes().to_vec();
        bytes.extend_from_slice(&p.asset.0.to_be_bytes());
        bytes.extend_from_slice(&amount.to_be_bytes());
        assert_eq!(bytes.len(), 38);

        let entry = p.ledger.pending_deposit(slot).unwrap();
        assert_eq!(entry.content_hash, sha256(&bytes));
        assert_eq!(entry.status, CommitmentStatus::Pending);
        assert_eq!(entry.block_id, BlockId(0));
    }
}

#[test]
fn e2e_deposit_block_id_tracks_commits() {
    let mut p = Pipeline::new();
    p.commit(vec![]).unwrap();
    p.commit(vec![]).unwrap();
    p.ledger.deposit(p.user, p.token, 5).unwrap();
    assert!(matches!(
        p.ledger.take_events().last().map(|e| &e.kind),
        Some(EventKind::AssetDeposited { block_id: BlockId(2), .. })
    ));
}

// =========================================================================
// Balance sync ordering
// =========================================================================

#[test]
fn e2e_balance_sync_order_enforced() {
    let mut p = Pipeline::new();
    let other_token = TokenAddress::random();
    let other = p.ledger.register_asset(other_token).unwrap();
    p.ledger
        .attach_strategy(p.asset, Box::new(StaticStrategy::new(100)))
        .unwrap();
    p.ledger
        .attach_strategy(other, Box::new(StaticStrategy::new(7)))
        .unwrap();

    // Queue: A, A, B
    p.ledger.sync_balance(p.asset).unwrap();
    p.ledger.sync_balance(p.asset).unwrap();
    p.ledger.sync_balance(other).unwrap();

    let a = RollupTx::BalanceSyncAck {
        asset: p.asset,
        amount: 100,
    };
    let b = RollupTx::BalanceSyncAck {
        asset: other,
        amount: 7,
    };

    // Acknowledged out of order: A, B, A
    let err = p.commit(vec![a.clone(), b.clone(), a.clone()]).unwrap_err();
    match err {
        RollupError::CommitMismatch(msg) => assert_eq!(msg, constants::BALANCE_SYNC_MISMATCH),
        other => panic!("unexpected error: {other}"),
    }
    for slot in 0..3 {
        assert!(p.ledger.pending_balance_sync(slot).unwrap().is_pending());
    }
    assert_eq!(p.next_block(), BlockId(0));

    p.commit(vec![a.clone(), a, b]).unwrap();
    for slot in 0..3 {
        let entry = p.ledger.pending_balance_sync(slot).unwrap();
        assert_eq!(entry.status, CommitmentStatus::Committed);
        assert_eq!(entry.block_id, BlockId(0));
    }

    p.ledger.execute_block(&[]).unwrap();
    for slot in 0..3 {
        assert!(p.ledger.pending_balance_sync(slot).unwrap().is_cleared());
    }
}

#[test]
fn e2e_stale_balance_rejected() {
    let mut p = Pipeline::new();
    p.ledger
        .attach_strategy(p.asset, Box::new(StaticStrategy::new(50)))
        .unwrap();
    p.ledger.sync_balance(p.asset).unwrap();

    let err = p
        .commit(vec![RollupTx::BalanceSyncAck {
            asset: p.asset,
            amount: 49,
        }])
        .unwrap_err();
    assert!(matches!(err, RollupError::CommitMismatch(_)));
    assert_eq!(err.class(), ErrorClass::Ordering);
}

// =========================================================================
// Atomic commit rejection
// =========================================================================

#[test]
fn e2e_mismatched_deposit_leaves_queue_untouched() {
    let mut p = Pipeline::new();
    p.ledger.deposit(p.user, p.token, 3).unwrap();
    p.ledger.deposit(p.user, p.token, 4).unwrap();

    // First ack matches, second does not: nothing may be consumed.
    let err = p.commit(vec![p.deposit_ack(3), p.deposit_ack(5)]).unwrap_err();
    match err {
        RollupError::CommitMismatch(msg) => assert_eq!(msg, constants::DEPOSIT_MISMATCH),
        other => panic!("unexpected error: {other}"),
    }
    assert!(p.ledger.pending_deposit(0).unwrap().is_pending());
    assert!(p.ledger.pending_deposit(1).unwrap().is_pending());
    assert_eq!(p.ledger.state().deposit_cursor(), 0);
    assert_eq!(p.next_block(), BlockId(0));
}

#[test]
fn e2e_ack_beyond_queue_rejected() {
    let mut p = Pipeline::new();
    let err = p.commit(vec![p.deposit_ack(1)]).unwrap_err();
    assert!(matches!(err, RollupError::CommitMismatch(_)));
}

#[test]
fn e2e_wrong_block_id_rejected() {
    let mut p = Pipeline::new();
    let err = p.ledger.commit_block(BlockId(1), vec![]).unwrap_err();
    assert!(matches!(
        err,
        RollupError::InvalidBlockId {
            expected: BlockId(0),
            got: BlockId(1)
        }
    ));

    p.commit(vec![]).unwrap();
    assert!(matches!(
        p.ledger.commit_block(BlockId(0), vec![]),
        Err(RollupError::InvalidBlockId { .. })
    ));
}

#[test]
fn e2e_opaque_transactions_ignored() {
    let mut p = Pipeline::new();
    p.ledger.deposit(p.user, p.token, 8).unwrap();
    p.commit(vec![
        RollupTx::Opaque(vec![0xde, 0xad]),
        p.deposit_ack(8),
        RollupTx::Opaque(vec![]),
    ])
    .unwrap();
    assert_eq!(
        p.ledger.pending_deposit(0).unwrap().status,
        CommitmentStatus::Committed
    );
    assert_eq!(p.ledger.block(BlockId(0)).unwrap().transactions.len(), 3);
}

// =========================================================================
// Execution
// =========================================================================

#[test]
fn e2e_execution_clears_only_executed_block() {
    let mut p = Pipeline::new();
    for amount in [1, 2, 3] {
        p.ledger.deposit(p.user, p.token, amount).unwrap();
    }
    p.commit(vec![p.deposit_ack(1), p.deposit_ack(2)]).unwrap();
    p.commit(vec![p.deposit_ack(3)]).unwrap();

    p.ledger.execute_block(&[]).unwrap();
    assert!(p.ledger.pending_deposit(0).unwrap().is_cleared());
    assert!(p.ledger.pending_deposit(1).unwrap().is_cleared());
    let third = p.ledger.pending_deposit(2).unwrap();
    assert_eq!(third.status, CommitmentStatus::Committed);
    assert_eq!(third.block_id, BlockId(1));
}

#[test]
fn e2e_blocks_execute_in_commit_order() {
    let mut p = Pipeline::new();
    assert!(matches!(
        p.ledger.execute_block(&[]),
        Err(RollupError::NoBlockToExecute)
    ));
    for _ in 0..4 {
        p.commit(vec![]).unwrap();
    }
    for expected in 0..4 {
        assert_eq!(p.ledger.execute_block(&[]).unwrap(), BlockId(expected));
        assert!(p.ledger.block(BlockId(expected)).unwrap().is_executed());
    }
    assert!(matches!(
        p.ledger.execute_block(&[]),
        Err(RollupError::NoBlockToExecute)
    ));
}

#[test]
fn e2e_withdrawals_accumulate() {
    let mut p = Pipeline::new();
    p.ledger.deposit(p.user, p.token, 100).unwrap();
    p.commit(vec![p.deposit_ack(100), p.withdraw_req(10)]).unwrap();
    p.commit(vec![p.withdraw_req(20), p.withdraw_req(30)]).unwrap();

    p.ledger.execute_block(&[]).unwrap();
    assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 10);
    p.ledger.execute_block(&[]).unwrap();
    assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 60);

    assert_eq!(p.ledger.withdraw(p.user, p.token).unwrap(), 60);
    assert_eq!(p.ledger.custody().vault_balance(p.token), 40);
}

#[test]
fn e2e_strategy_intents_run_at_execution() {
    let mut p = Pipeline::new();
    p.ledger
        .attach_strategy(p.asset, Box::new(StaticStrategy::new(0).with_harvest_yield(5)))
        .unwrap();
    p.commit(vec![]).unwrap();

    let intents = [
        StrategyIntent {
            asset: p.asset,
            action: IntentAction::Invest(20),
        },
        StrategyIntent {
            asset: p.asset,
            action: IntentAction::Harvest,
        },
    ];
    p.ledger.execute_block(&intents).unwrap();
    assert_eq!(p.ledger.strategy(p.asset).unwrap().current_balance(), 25);

    // The next sync picks up the new balance.
    p.ledger.sync_balance(p.asset).unwrap();
    p.commit(vec![RollupTx::BalanceSyncAck {
        asset: p.asset,
        amount: 25,
    }])
    .unwrap();
}

// =========================================================================
// Revert
// =========================================================================

#[test]
fn e2e_revert_then_recommit() {
    let mut p = Pipeline::new();
    p.ledger.deposit(p.user, p.token, 9).unwrap();
    p.commit(vec![p.deposit_ack(9), p.withdraw_req(9)]).unwrap();

    assert_eq!(p.ledger.revert_last_block().unwrap(), BlockId(0));
    assert!(p.ledger.pending_deposit(0).unwrap().is_pending());
    assert!(p.ledger.pending_withdraw_commit(BlockId(0), 0).is_none());
    assert_eq!(p.next_block(), BlockId(0));

    p.commit(vec![p.deposit_ack(9)]).unwrap();
    p.ledger.execute_block(&[]).unwrap();
    assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 0);

    // Executed blocks can never be reverted.
    assert!(matches!(
        p.ledger.revert_last_block(),
        Err(RollupError::NoBlockToRevert)
    ));
}

#[test]
fn e2e_revert_after_previous_block_executed() {
    let mut p = Pipeline::new();
    p.ledger.deposit(p.user, p.token, 1).unwrap();
    p.ledger.deposit(p.user, p.token, 2).unwrap();
    p.commit(vec![p.deposit_ack(1)]).unwrap();
    p.ledger.execute_block(&[]).unwrap();
    assert!(p.ledger.pending_deposit(0).unwrap().is_cleared());

    // Block 1 consumes slot 1, directly after block 0's cleared slot.
    p.commit(vec![p.deposit_ack(2), p.withdraw_req(2)]).unwrap();
    assert_eq!(p.ledger.revert_last_block().unwrap(), BlockId(1));

    assert!(p.ledger.pending_deposit(0).unwrap().is_cleared());
    assert!(p.ledger.pending_deposit(1).unwrap().is_pending());
    assert_eq!(p.ledger.state().deposit_cursor(), 1);
    assert_eq!(p.next_block(), BlockId(1));
    assert_eq!(p.ledger.state().next_execute_id(), BlockId(1));

    // A second revert would touch the executed block and is refused.
    assert!(matches!(
        p.ledger.revert_last_block(),
        Err(RollupError::NoBlockToRevert)
    ));

    p.commit(vec![p.deposit_ack(2), p.withdraw_req(2)]).unwrap();
    assert_eq!(p.ledger.execute_block(&[]).unwrap(), BlockId(1));
    assert!(p.ledger.pending_deposit(1).unwrap().is_cleared());
    assert_eq!(p.ledger.withdraw(p.user, p.token).unwrap(), 2);
}

#[test]
fn e2e_failed_intents_leave_strategy_untouched() {
    let mut p = Pipeline::new();
    p.ledger
        .attach_strategy(p.asset, Box::new(StaticStrategy::new(0)))
        .unwrap();
    p.ledger.deposit(p.user, p.token, 3).unwrap();
    p.commit(vec![p.deposit_ack(3), p.withdraw_req(3)]).unwrap();

    let intents = [
        StrategyIntent {
            asset: p.asset,
            action: IntentAction::Invest(50),
        },
        StrategyIntent {
            asset: p.asset,
            action: IntentAction::Divest(1000),
        },
    ];
    for _ in 0..2 {
        assert!(matches!(
            p.ledger.execute_block(&intents),
            Err(RollupError::Strategy { .. })
        ));
        assert_eq!(p.ledger.strategy(p.asset).unwrap().current_balance(), 0);
        assert_eq!(p.ledger.state().next_execute_id(), BlockId(0));
        assert_eq!(
            p.ledger.pending_deposit(0).unwrap().status,
            CommitmentStatus::Committed
        );
        assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 0);
    }

    assert_eq!(p.ledger.execute_block(&intents[..1]).unwrap(), BlockId(0));
    assert_eq!(p.ledger.strategy(p.asset).unwrap().current_balance(), 50);
    assert_eq!(p.ledger.pending_withdraw(p.user, p.asset), 3);
}

// =========================================================================
// Caps and configuration
// =========================================================================

#[test]
fn e2e_deposit_cap_from_config() {
    // The first registered ERC-20 after the native token is asset 2.
    let mut p = Pipeline::with_config(|native| LedgerConfig::new(native).with_cap(AssetId(2), 50));
    p.ledger.deposit(p.user, p.token, 30).unwrap();
    let err = p.ledger.deposit(p.user, p.token, 21).unwrap_err();
    assert!(matches!(
        err,
        RollupError::LimitExceeded {
            cap: 50,
            attempted: 51,
            ..
        }
    ));
    assert_eq!(err.class(), ErrorClass::Validation);

    // Paying out a withdrawal frees cap headroom.
    p.commit(vec![p.deposit_ack(30), p.withdraw_req(30)]).unwrap();
    p.ledger.execute_block(&[]).unwrap();
    p.ledger.withdraw(p.user, p.token).unwrap();
    p.ledger.deposit(p.user, p.token, 50).unwrap();
}

#[test]
fn e2e_config_from_json() {
    init_tracing();
    let native = TokenAddress::random();
    let json = serde_json::json!({
        "native_token": native,
        "max_block_transactions": 2,
    })
    .to_string();
    let config = LedgerConfig::from_json_str(&json).unwrap();
    let mut ledger = Ledger::new(config, InMemoryRegistry::new(), InMemoryCustody::new()).unwrap();

    let err = ledger
        .commit_block(
            BlockId(0),
            vec![RollupTx::Opaque(vec![]), RollupTx::Opaque(vec![]), RollupTx::Opaque(vec![])],
        )
        .unwrap_err();
    assert!(matches!(err, RollupError::BlockTooLarge { count: 3, max: 2 }));
}

#[test]
fn e2e_native_deposit_and_withdraw() {
    let mut p = Pipeline::new();
    let native = p.ledger.config().native_token;
    let native_asset = p.ledger.native_asset().unwrap();
    p.ledger.custody_mut().mint(p.user, native, 42);

    p.ledger.deposit_native(p.user, 42).unwrap();
    p.commit(vec![
        RollupTx::DepositAck {
            account: p.user,
            asset: native_asset,
            amount: 42,
        },
        RollupTx::WithdrawRequest {
            account: p.user,
            asset: native_asset,
            amount: 42,
        },
    ])
    .unwrap();
    p.ledger.execute_block(&[]).unwrap();

    assert_eq!(p.ledger.withdraw_native(p.user).unwrap(), 42);
    assert_eq!(p.ledger.custody().wallet_balance(p.user, native), 42);
    assert_eq!(p.ledger.custody().vault_balance(native), 0);
}

#[test]
fn e2e_zero_deposit_rejected() {
    let mut p = Pipeline::new();
    assert!(matches!(
        p.ledger.deposit(p.user, p.token, 0),
        Err(RollupError::ZeroAmount)
    ));
}
