//! # rollup-ingress
//!
//! **Intake Plane**: pending commitment queues, deposit tracking and
//! strategy balance-sync tracking.
//!
//! ## Architecture
//!
//! 1. **PendingQueue**: append-only, FIFO-consumable queue of hashed commitments
//! 2. **DepositTracker**: queues deposits, enforces per-asset net-deposit caps
//! 3. **BalanceSyncTracker**: queues strategy balance reports
//!
//! ## Deposit Flow
//!
//! ```text
//! Custody.transfer_in() → DepositTracker.deposit() → PendingQueue.append()
//!     → (later) CommitEngine consumes the slot → ExecutionEngine clears it
//! ```

pub mod balance_sync_tracker;
pub mod deposit_tracker;
pub mod pending_queue;

pub use balance_sync_tracker::BalanceSyncTracker;
pub use deposit_tracker::DepositTracker;
pub use pending_queue::PendingQueue;
