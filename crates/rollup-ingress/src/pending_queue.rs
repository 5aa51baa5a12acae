//! Append-only queue of pending commitments.
//!
//! Slots are assigned sequentially and consumed strictly in index order
//! starting at the cursor. A slot is never removed: execution clears it
//! back to the default commitment and it stays retired.

use std::{marker::PhantomData, ops::Range};

use rollup_types::{
    BlockId, Commitment, CommitmentStatus, PendingCommitment, Result, RollupError, SlotIndex,
};
use serde::{Deserialize, Serialize};

/// Sequentially consumable queue of [`PendingCommitment`]s over payload `P`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingQueue<P> {
    /// All slots ever appended, by index.
    slots: Vec<PendingCommitment>,
    /// First slot not yet consumed by a committed block.
    cursor: SlotIndex,
    #[serde(skip)]
    _payload: PhantomData<P>,
}

impl<P: Commitment> PendingQueue<P> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            _payload: PhantomData,
        }
    }

    /// Append a payload, returning its slot index. Always succeeds.
    pub fn append(&mut self, payload: &P) -> SlotIndex {
        let index = self.slots.len() as SlotIndex;
        self.slots.push(PendingCommitment::new(payload.content_hash()));
        index
    }

    /// Read a slot without mutating it.
    #[must_use]
    pub fn peek(&self, index: SlotIndex) -> Option<&PendingCommitment> {
        usize::try_from(index).ok().and_then(|i| self.slots.get(i))
    }

    /// First not-yet-consumed index.
    #[must_use]
    pub fn cursor(&self) -> SlotIndex {
        self.cursor
    }

    /// Number of slots still waiting to be consumed.
    #[must_use]
    pub fn unconsumed(&self) -> u64 {
        self.len() - self.cursor
    }

    /// Consume the slot at the cursor for `block_id` and advance the cursor.
    ///
    /// # Errors
    /// - `InvalidCommitmentState` if there is no slot at the cursor or it
    ///   is not PENDING
    pub fn consume(&mut self, block_id: BlockId) -> Result<SlotIndex> {
        let index = self.cursor;
        let slot = self.slot_mut(index)?;
        if slot.status != CommitmentStatus::Pending {
            return Err(RollupError::InvalidCommitmentState {
                slot: index,
                reason: format!("expected PENDING, found {}", slot.status),
            });
        }
        slot.status = CommitmentStatus::Committed;
        slot.block_id = block_id;
        self.cursor += 1;
        Ok(index)
    }

    /// Retire a slot: zero hash, block 0, PENDING.
    ///
    /// # Errors
    /// Returns `InvalidCommitmentState` if the slot does not exist.
    pub fn clear(&mut self, index: SlotIndex) -> Result<()> {
        *self.slot_mut(index)? = PendingCommitment::default();
        Ok(())
    }

    /// Hand a trailing range of consumed slots back to PENDING and rewind
    /// the cursor to its start.
    ///
    /// # Errors
    /// Returns `InvalidCommitmentState` unless `range` ends exactly at the
    /// cursor and every slot in it is COMMITTED.
    pub fn release(&mut self, range: Range<SlotIndex>) -> Result<()> {
        if range.end != self.cursor || range.start > range.end {
            return Err(RollupError::InvalidCommitmentState {
                slot: range.start,
                reason: format!(
                    "release range {}..{} does not end at cursor {}",
                    range.start, range.end, self.cursor
                ),
            });
        }
        for index in range.clone() {
            let slot = self.peek(index).copied().unwrap_or_default();
            if slot.status != CommitmentStatus::Committed {
                return Err(RollupError::InvalidCommitmentState {
                    slot: index,
                    reason: format!("expected COMMITTED, found {}", slot.status),
                });
            }
        }
        for index in range.clone() {
            let slot = self.slot_mut(index)?;
            slot.status = CommitmentStatus::Pending;
            slot.block_id = BlockId::GENESIS;
        }
        self.cursor = range.start;
        Ok(())
    }

    /// Total slots ever appended.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.slots.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot_mut(&mut self, index: SlotIndex) -> Result<&mut PendingCommitment> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.slots.get_mut(i))
            .ok_or_else(|| RollupError::InvalidCommitmentState {
                slot: index,
                reason: "no such slot".to_string(),
            })
    }
}

impl<P: Commitment> Default for PendingQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}
