//! # Pending commitments
//!
//! Deposits and strategy balance reports are queued as hashed commitments.
//! A later committed block must acknowledge them in queue order; the only
//! thing compared is the content hash.
//!
//! ## Slot lifecycle
//!
//! ```text
//!   ┌─────────┐  commit consumes   ┌───────────┐  owning block executes  ┌─────────┐
//!   │ PENDING ├───────────────────▶│ COMMITTED ├────────────────────────▶│ CLEARED │
//!   └─────────┘                    └─────┬─────┘                         └─────────┘
//!        ▲        owning block reverted  │
//!        └───────────────────────────────┘
//! ```
//!
//! A cleared slot reads as the default commitment (zero hash, block 0,
//! PENDING) and is never reused.
//!
//! ## Canonical encoding
//!
//! `H` is SHA-256 over the raw concatenation of fixed-width fields, with no
//! domain separator or length prefix:
//!
//! - deposit: `account (20) ‖ asset_id (2, BE) ‖ amount (16, BE)`
//! - balance sync: `asset_id (2, BE) ‖ amount (16, BE)`

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountId, Amount, AssetId, BlockId};

/// SHA-256 content hash of a commitment payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentHash(pub [u8; 32]);

impl CommitmentHash {
    /// Hash of a cleared slot.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Anything that can be queued as a pending commitment.
pub trait Commitment {
    /// Canonical byte encoding hashed into the commitment.
    fn canonical_bytes(&self) -> Vec<u8>;

    fn content_hash(&self) -> CommitmentHash {
        let digest = Sha256::digest(self.canonical_bytes());
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        CommitmentHash(hash)
    }
}

/// Whether a slot has been acknowledged by a committed block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitmentStatus {
    #[default]
    Pending,
    Committed,
}

impl fmt::Display for CommitmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Committed => write!(f, "COMMITTED"),
        }
    }
}

/// One slot of a pending queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommitment {
    pub content_hash: CommitmentHash,
    /// The committed block that consumed this slot (0 until consumed).
    pub block_id: BlockId,
    pub status: CommitmentStatus,
}

impl PendingCommitment {
    /// A fresh, unconsumed slot.
    #[must_use]
    pub fn new(content_hash: CommitmentHash) -> Self {
        Self {
            content_hash,
            block_id: BlockId::GENESIS,
            status: CommitmentStatus::Pending,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == CommitmentStatus::Pending
    }

    /// Whether this slot has been retired by execution.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }
}

/// A deposit awaiting acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPayload {
    pub account: AccountId,
    pub asset: AssetId,
    pub amount: Amount,
}

impl Commitment for DepositPayload {
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            crate::constants::ADDRESS_WIDTH
                + crate::constants::ASSET_ID_WIDTH
                + crate::constants::AMOUNT_WIDTH,
        );
        bytes.extend_from_slice(self.account.as_bytes());
        bytes.extend_from_slice(&self.asset.0.to_be_bytes());
        bytes.extend_from_slice(&self.amount.to_be_bytes());
        bytes
    }
}

/// A strategy balance report awaiting acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSyncPayload {
    pub asset: AssetId,
    pub amount: Amount,
}

impl Commitment for BalanceSyncPayload {
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(crate::constants::ASSET_ID_WIDTH + crate::constants::AMOUNT_WIDTH);
        bytes.extend_from_slice(&self.asset.0.to_be_bytes());
        bytes.extend_from_slice(&self.amount.to_be_bytes());
        bytes
    }
}
