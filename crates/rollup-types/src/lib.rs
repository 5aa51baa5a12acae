//! # rollup-types
//!
//! Shared types, errors, and configuration for the **RollupLedger**
//! settlement state machine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`TokenAddress`], [`AssetId`], [`BlockId`]
//! - **Commitment model**: [`PendingCommitment`], [`CommitmentStatus`], [`CommitmentHash`], [`Commitment`]
//! - **Block model**: [`RollupBlock`], [`BlockState`], [`WithdrawCommit`]
//! - **Transactions**: [`RollupTx`], [`StrategyIntent`], [`IntentAction`]
//! - **Events**: [`LedgerEvent`], [`EventKind`]
//! - **Collaborators**: [`AssetRegistry`], [`Strategy`], [`Custody`] and in-memory stand-ins
//! - **Configuration**: [`LedgerConfig`], [`DepositCap`]
//! - **Errors**: [`RollupError`] with `RL_ERR_` prefix codes
//! - **Constants**: system-wide limits and commit mismatch reasons

pub mod block;
pub mod collaborators;
pub mod commitment;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod transaction;

pub use block::*;
pub use collaborators::*;
pub use commitment::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use transaction::*;

// Constants are accessed via `rollup_types::constants::FOO`
// (not re-exported to avoid name collisions).
