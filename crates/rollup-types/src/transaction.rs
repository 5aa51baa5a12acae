//! Typed rollup transactions, as handed over by the batch decoder.
//!
//! The ledger only interprets the variants that touch on-chain state;
//! everything else is carried through as [`RollupTx::Opaque`].

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, BalanceSyncPayload, DepositPayload};

/// One transaction inside a committed rollup block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollupTx {
    /// Acknowledges the next pending deposit.
    DepositAck {
        account: AccountId,
        asset: AssetId,
        amount: Amount,
    },
    /// Requests that `amount` becomes claimable once the block executes.
    WithdrawRequest {
        account: AccountId,
        asset: AssetId,
        amount: Amount,
    },
    /// Acknowledges the next pending strategy balance report.
    BalanceSyncAck { asset: AssetId, amount: Amount },
    /// Any L2-only operation (transfer, trade, ...). Not interpreted here.
    Opaque(Vec<u8>),
}

impl RollupTx {
    /// The deposit commitment this transaction claims to acknowledge.
    #[must_use]
    pub fn as_deposit(&self) -> Option<DepositPayload> {
        match *self {
            Self::DepositAck {
                account,
                asset,
                amount,
            } => Some(DepositPayload {
                account,
                asset,
                amount,
            }),
            _ => None,
        }
    }

    /// The balance-sync commitment this transaction claims to acknowledge.
    #[must_use]
    pub fn as_balance_sync(&self) -> Option<BalanceSyncPayload> {
        match *self {
            Self::BalanceSyncAck { asset, amount } => Some(BalanceSyncPayload { asset, amount }),
            _ => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DepositAck { .. } => "deposit_ack",
            Self::WithdrawRequest { .. } => "withdraw_request",
            Self::BalanceSyncAck { .. } => "balance_sync_ack",
            Self::Opaque(_) => "opaque",
        }
    }
}

/// What a strategy is asked to do during block execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentAction {
    /// Move `amount` from custody into the strategy.
    Invest(Amount),
    /// Pull `amount` back from the strategy into custody.
    Divest(Amount),
    /// Realise accrued yield.
    Harvest,
}

/// A strategy interaction applied before a block's custody effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyIntent {
    pub asset: AssetId,
    pub action: IntentAction,
}
