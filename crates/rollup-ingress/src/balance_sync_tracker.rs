//! Strategy balance reports.
//!
//! One queue is shared by every asset. Ordering is checked at commit time,
//! so an unacknowledged report for one asset holds back acknowledgement of
//! every later report, whatever its asset.

use rollup_types::{
    Amount, AssetId, BalanceSyncPayload, EventKind, LedgerEvent, SlotIndex, Strategy,
};

use crate::pending_queue::PendingQueue;

/// Queues strategy balance reports for acknowledgement.
#[derive(Debug, Clone, Default)]
pub struct BalanceSyncTracker {
    queue: PendingQueue<BalanceSyncPayload>,
}

impl BalanceSyncTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query `strategy` for its balance and queue the report.
    pub fn sync(&mut self, asset: AssetId, strategy: &dyn Strategy) -> (SlotIndex, LedgerEvent) {
        self.record(asset, strategy.current_balance())
    }

    /// Queue an already-obtained report.
    pub fn record(&mut self, asset: AssetId, amount: Amount) -> (SlotIndex, LedgerEvent) {
        let slot = self.queue.append(&BalanceSyncPayload { asset, amount });

        tracing::debug!(asset = %asset, amount, slot, "Balance sync queued");

        let event = LedgerEvent::now(EventKind::BalanceSynced {
            asset,
            amount,
            slot,
        });
        (slot, event)
    }

    #[must_use]
    pub fn queue(&self) -> &PendingQueue<BalanceSyncPayload> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut PendingQueue<BalanceSyncPayload> {
        &mut self.queue
    }
}
