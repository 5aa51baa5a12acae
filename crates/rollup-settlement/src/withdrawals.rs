//! Withdrawal accumulator.
//!
//! Executed blocks credit claimable amounts per (account, asset). A claim
//! takes the whole accumulated amount at once; a second claim finds zero
//! and fails with [`RollupError::NothingToWithdraw`].

use std::collections::HashMap;

use rollup_types::{AccountId, Amount, AssetId, Result, RollupError, WithdrawCommit};

/// Claimable withdrawal balances.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalAccumulator {
    pending: HashMap<(AccountId, AssetId), Amount>,
}

impl WithdrawalAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that every commit can be credited without overflow.
    ///
    /// # Errors
    /// Returns `Internal` if any (account, asset) total would overflow.
    pub fn check_credits(&self, commits: &[WithdrawCommit]) -> Result<()> {
        let mut totals: HashMap<(AccountId, AssetId), Amount> = HashMap::new();
        for commit in commits {
            let key = (commit.account, commit.asset);
            let base = totals
                .get(&key)
                .copied()
                .unwrap_or_else(|| self.pending(commit.account, commit.asset));
            let next = base.checked_add(commit.amount).ok_or_else(|| {
                RollupError::Internal(format!(
                    "withdrawal accumulator overflow for {} / {}",
                    commit.account, commit.asset
                ))
            })?;
            totals.insert(key, next);
        }
        Ok(())
    }

    /// Add a committed withdrawal to the claimable balance.
    ///
    /// # Errors
    /// Returns `Internal` on overflow; the balance is unchanged.
    pub fn credit(&mut self, commit: &WithdrawCommit) -> Result<()> {
        let entry = self
            .pending
            .entry((commit.account, commit.asset))
            .or_insert(0);
        *entry = entry.checked_add(commit.amount).ok_or_else(|| {
            RollupError::Internal(format!(
                "withdrawal accumulator overflow for {} / {}",
                commit.account, commit.asset
            ))
        })?;
        Ok(())
    }

    /// Amount currently claimable.
    #[must_use]
    pub fn pending(&self, account: AccountId, asset: AssetId) -> Amount {
        self.pending.get(&(account, asset)).copied().unwrap_or(0)
    }

    /// The amount a claim would pay, without changing anything.
    ///
    /// # Errors
    /// Returns `NothingToWithdraw` if nothing is claimable.
    pub fn claimable(&self, account: AccountId, asset: AssetId) -> Result<Amount> {
        match self.pending(account, asset) {
            0 => Err(RollupError::NothingToWithdraw),
            amount => Ok(amount),
        }
    }

    /// Zero the accumulator and return what it held.
    ///
    /// # Errors
    /// Returns `NothingToWithdraw` if nothing is claimable.
    pub fn take(&mut self, account: AccountId, asset: AssetId) -> Result<Amount> {
        self.pending
            .remove(&(account, asset))
            .filter(|amount| *amount > 0)
            .ok_or(RollupError::NothingToWithdraw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(account: AccountId, amount: Amount) -> WithdrawCommit {
        WithdrawCommit {
            account,
            asset: AssetId(1),
            amount,
        }
    }

    #[test]
    fn credits_are_additive() {
        let mut acc = WithdrawalAccumulator::new();
        let alice = AccountId::random();
        acc.credit(&commit(alice, 3)).unwrap();
        acc.credit(&commit(alice, 4)).unwrap();
        assert_eq!(acc.pending(alice, AssetId(1)), 7);
        assert_eq!(acc.pending(alice, AssetId(2)), 0);
    }

    #[test]
    fn take_pays_exactly_once() {
        let mut acc = WithdrawalAccumulator::new();
        let alice = AccountId::random();
        acc.credit(&commit(alice, 5)).unwrap();

        assert_eq!(acc.claimable(alice, AssetId(1)).unwrap(), 5);
        assert_eq!(acc.take(alice, AssetId(1)).unwrap(), 5);
        assert_eq!(acc.pending(alice, AssetId(1)), 0);

        let err = acc.take(alice, AssetId(1)).unwrap_err();
        assert!(matches!(err, RollupError::NothingToWithdraw));
        assert!(acc.claimable(alice, AssetId(1)).is_err());
    }

    #[test]
    fn overflow_rejected() {
        let mut acc = WithdrawalAccumulator::new();
        let alice = AccountId::random();
        acc.credit(&commit(alice, Amount::MAX)).unwrap();
        assert!(acc.check_credits(&[commit(alice, 1)]).is_err());
        assert!(acc.credit(&commit(alice, 1)).is_err());
        assert_eq!(acc.pending(alice, AssetId(1)), Amount::MAX);
    }

    #[test]
    fn check_credits_sums_within_batch() {
        let acc = WithdrawalAccumulator::new();
        let alice = AccountId::random();
        let half = Amount::MAX / 2 + 1;
        assert!(acc.check_credits(&[commit(alice, half)]).is_ok());
        assert!(acc.check_credits(&[commit(alice, half), commit(alice, half)]).is_err());
    }
}
