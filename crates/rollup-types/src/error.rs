//! Error types for the rollup ledger.
//!
//! All errors use the `RL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by class:
//! - 1xx: Validation errors (rejected before any state mutation)
//! - 2xx: Ordering errors (commit does not match the pending queues)
//! - 3xx: State errors (operation precondition not met)
//! - 4xx: External collaborator errors (custody, strategy)
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AssetId, BlockId, TokenAddress};

/// Coarse classification of a [`RollupError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Validation,
    Ordering,
    State,
    External,
    Internal,
}

/// Central error enum for all ledger operations.
#[derive(Debug, Error)]
pub enum RollupError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The committed block ID is not the next expected one.
    #[error("RL_ERR_100: Invalid block ID: expected {expected}, got {got}")]
    InvalidBlockId { expected: BlockId, got: BlockId },

    /// The token has no asset ID in the registry.
    #[error("RL_ERR_101: Asset not registered: {0}")]
    AssetNotRegistered(TokenAddress),

    /// The asset ID is unknown to the registry.
    #[error("RL_ERR_102: Unknown asset ID: {0}")]
    UnknownAssetId(AssetId),

    /// The token already has an asset ID.
    #[error("RL_ERR_103: Asset already registered: {0}")]
    AssetAlreadyRegistered(TokenAddress),

    /// The deposit would push the asset's net deposits above its cap.
    #[error("RL_ERR_104: Deposit limit exceeded for {asset}: cap {cap}, would reach {attempted}")]
    LimitExceeded {
        asset: AssetId,
        cap: u128,
        attempted: u128,
    },

    /// Zero-value deposits and withdraw requests are not accepted.
    #[error("RL_ERR_105: Amount must be non-zero")]
    ZeroAmount,

    /// The block carries more transactions than allowed.
    #[error("RL_ERR_106: Block too large: {count} transactions, max {max}")]
    BlockTooLarge { count: usize, max: usize },

    /// No strategy is attached to this asset.
    #[error("RL_ERR_107: No strategy attached to {0}")]
    StrategyNotFound(AssetId),

    // =================================================================
    // Ordering Errors (2xx)
    // =================================================================
    /// An acknowledgement in the committed block does not match the next
    /// pending queue entry.
    #[error("RL_ERR_200: Commit mismatch: {0}")]
    CommitMismatch(String),

    // =================================================================
    // State Errors (3xx)
    // =================================================================
    /// The accumulated withdrawable amount is zero.
    #[error("RL_ERR_300: Nothing to withdraw")]
    NothingToWithdraw,

    /// Every committed block has already been executed.
    #[error("RL_ERR_301: No committed block to execute")]
    NoBlockToExecute,

    /// There is no committed-but-unexecuted block to revert.
    #[error("RL_ERR_302: No committed block to revert")]
    NoBlockToRevert,

    /// A queue slot was not in the state the operation requires.
    #[error("RL_ERR_303: Invalid commitment state at slot {slot}: {reason}")]
    InvalidCommitmentState { slot: u64, reason: String },

    // =================================================================
    // External Collaborator Errors (4xx)
    // =================================================================
    /// The custody collaborator refused a transfer.
    #[error("RL_ERR_400: Custody transfer failed: {reason}")]
    Custody { reason: String },

    /// A strategy refused an intent.
    #[error("RL_ERR_401: Strategy call failed: {reason}")]
    Strategy { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("RL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("RL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("RL_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("RL_ERR_903: I/O error: {0}")]
    Io(String),
}

impl RollupError {
    /// Which class of failure this is.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidBlockId { .. }
            | Self::AssetNotRegistered(_)
            | Self::UnknownAssetId(_)
            | Self::AssetAlreadyRegistered(_)
            | Self::LimitExceeded { .. }
            | Self::ZeroAmount
            | Self::BlockTooLarge { .. }
            | Self::StrategyNotFound(_) => ErrorClass::Validation,
            Self::CommitMismatch(_) => ErrorClass::Ordering,
            Self::NothingToWithdraw
            | Self::NoBlockToExecute
            | Self::NoBlockToRevert
            | Self::InvalidCommitmentState { .. } => ErrorClass::State,
            Self::Custody { .. } | Self::Strategy { .. } => ErrorClass::External,
            Self::Internal(_) | Self::Serialization(_) | Self::Configuration(_) | Self::Io(_) => {
                ErrorClass::Internal
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RollupError>;

impl From<std::io::Error> for RollupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RollupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_block_id_display() {
        let err = RollupError::InvalidBlockId {
            expected: BlockId(3),
            got: BlockId(5),
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("RL_ERR_100"), "Got: {msg}");
        assert!(msg.contains("block:3"));
        assert!(msg.contains("block:5"));
    }

    #[test]
    fn commit_mismatch_carries_reason() {
        let err = RollupError::CommitMismatch(
            crate::constants::DEPOSIT_MISMATCH.to_string(),
        );
        let msg = format!("{err}");
        assert!(msg.contains("RL_ERR_200"));
        assert!(msg.contains("invalid deposit transition, mismatch or wrong ordering"));
    }

    #[test]
    fn classes_follow_code_groups() {
        assert_eq!(RollupError::ZeroAmount.class(), ErrorClass::Validation);
        assert_eq!(
            RollupError::CommitMismatch("x".into()).class(),
            ErrorClass::Ordering
        );
        assert_eq!(RollupError::NothingToWithdraw.class(), ErrorClass::State);
        assert_eq!(RollupError::NoBlockToExecute.class(), ErrorClass::State);
        assert_eq!(
            RollupError::Custody { reason: "x".into() }.class(),
            ErrorClass::External
        );
        assert_eq!(
            RollupError::Configuration("x".into()).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn all_errors_have_rl_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(RollupError::NothingToWithdraw),
            Box::new(RollupError::NoBlockToExecute),
            Box::new(RollupError::NoBlockToRevert),
            Box::new(RollupError::StrategyNotFound(AssetId(1))),
            Box::new(RollupError::Internal("test".into())),
            Box::new(RollupError::LimitExceeded {
                asset: AssetId(1),
                cap: 10,
                attempted: 11,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("RL_ERR_"),
                "Error missing RL_ERR_ prefix: {msg}"
            );
        }
    }
}
