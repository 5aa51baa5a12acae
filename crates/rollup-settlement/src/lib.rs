//! # rollup-settlement
//!
//! **Finality Plane**: block commit, block execution, withdrawal
//! accumulation and claims.
//!
//! ## Architecture
//!
//! A single owned [`LedgerState`] is threaded by `&mut` through:
//! 1. **Commit engine**: checks the block ID, matches acknowledgements
//!    against the pending queues in FIFO order, stores the block COMMITTED
//! 2. **Execution engine**: finalizes the oldest COMMITTED block, clears its
//!    queue slots and credits its withdrawals
//! 3. **WithdrawalAccumulator**: claimable balances, paid out once
//!
//! [`RollupLedger`] wraps the state with the asset registry, custody and
//! strategy collaborators.
//!
//! ## Two-Phase Finality
//!
//! ```text
//! deposit/sync → PENDING slot
//! commit_block → slot COMMITTED to block N, block N COMMITTED
//! execute_block → slot cleared, withdrawals claimable, block N EXECUTED
//! withdraw → accumulator zeroed, custody pays out
//! ```

pub mod commit;
pub mod execute;
pub mod ledger;
pub mod state;
pub mod withdrawals;

pub use commit::{CommitPlan, commit_block, plan_commit, revert_last_block};
pub use execute::{StrategySet, execute_block};
pub use ledger::RollupLedger;
pub use state::LedgerState;
pub use withdrawals::WithdrawalAccumulator;
