//! Deposit tracking for the intake plane.
//!
//! Every accepted deposit gets a deposit queue slot holding
//! `H(account ‖ asset ‖ amount)`, and bumps the asset's net-deposit
//! counter. Caps bound the net deposits per asset:
//! ```text
//! ∀ asset with cap: Σ(deposits) - Σ(paid withdrawals) <= cap
//! ```

use std::collections::HashMap;

use rollup_types::{
    AccountId, Amount, AssetId, BlockId, DepositCap, DepositPayload, EventKind, LedgerEvent,
    Result, RollupError, SlotIndex,
};

use crate::pending_queue::PendingQueue;

/// Accepts deposits into the deposit queue and enforces per-asset caps.
#[derive(Debug, Clone, Default)]
pub struct DepositTracker {
    queue: PendingQueue<DepositPayload>,
    /// Net deposits per asset since genesis.
    net_deposits: HashMap<AssetId, Amount>,
    /// Configured caps. Assets without an entry are uncapped.
    caps: HashMap<AssetId, Amount>,
}

impl DepositTracker {
    /// Create a tracker with no caps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with the given caps.
    #[must_use]
    pub fn with_caps(caps: &[DepositCap]) -> Self {
        Self {
            caps: caps.iter().map(|c| (c.asset, c.cap)).collect(),
            ..Self::default()
        }
    }

    /// Set or replace the cap for an asset.
    pub fn set_cap(&mut self, asset: AssetId, cap: Amount) {
        self.caps.insert(asset, cap);
    }

    /// Check that depositing `amount` of `asset` is allowed, without
    /// changing anything.
    ///
    /// # Errors
    /// - `ZeroAmount` if `amount` is zero
    /// - `LimitExceeded` if the cap would be breached
    pub fn check(&self, asset: AssetId, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Err(RollupError::ZeroAmount);
        }
        let current = self.net_deposits(asset);
        let attempted = current.checked_add(amount).ok_or(RollupError::LimitExceeded {
            asset,
            cap: self.caps.get(&asset).copied().unwrap_or(Amount::MAX),
            attempted: Amount::MAX,
        })?;
        if let Some(&cap) = self.caps.get(&asset) {
            if attempted > cap {
                return Err(RollupError::LimitExceeded {
                    asset,
                    cap,
                    attempted,
                });
            }
        }
        Ok(())
    }

    /// Queue a deposit.
    ///
    /// Returns the assigned slot and the `AssetDeposited` event. Nothing
    /// changes if the check fails.
    ///
    /// # Errors
    /// Same as [`check`](Self::check).
    pub fn deposit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: Amount,
        current_block: BlockId,
    ) -> Result<(SlotIndex, LedgerEvent)> {
        self.check(asset, amount)?;
        *self.net_deposits.entry(asset).or_insert(0) += amount;

        let slot = self.queue.append(&DepositPayload {
            account,
            asset,
            amount,
        });

        tracing::debug!(
            account = %account,
            asset = %asset,
            amount,
            slot,
            block = current_block.0,
            "Deposit queued"
        );

        let event = LedgerEvent::now(EventKind::AssetDeposited {
            account,
            asset,
            amount,
            block_id: current_block,
            slot,
        });
        Ok((slot, event))
    }

    /// Record that `amount` of `asset` left custody. Saturates at zero.
    pub fn record_withdrawal(&mut self, asset: AssetId, amount: Amount) {
        if let Some(net) = self.net_deposits.get_mut(&asset) {
            *net = net.saturating_sub(amount);
        }
    }

    /// Net deposits currently counted against the asset's cap.
    #[must_use]
    pub fn net_deposits(&self, asset: AssetId) -> Amount {
        self.net_deposits.get(&asset).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn cap(&self, asset: AssetId) -> Option<Amount> {
        self.caps.get(&asset).copied()
    }

    #[must_use]
    pub fn queue(&self) -> &PendingQueue<DepositPayload> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut PendingQueue<DepositPayload> {
        &mut self.queue
    }
}
