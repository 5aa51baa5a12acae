//! External collaborators the ledger core depends on.
//!
//! The registry, strategies and custody are modeled as traits. The
//! in-memory implementations here back tests and single-process
//! deployments.

use std::collections::HashMap;

use crate::{AccountId, Amount, AssetId, IntentAction, Result, RollupError, TokenAddress};

/// Maps token addresses to registry-assigned asset IDs.
pub trait AssetRegistry {
    /// Assign the next asset ID to `token`.
    fn register_asset(&mut self, token: TokenAddress) -> Result<AssetId>;

    fn lookup(&self, token: &TokenAddress) -> Option<AssetId>;

    /// Reverse lookup.
    fn token_of(&self, asset: AssetId) -> Option<TokenAddress>;
}

/// An external yield source holding part of an asset's custody.
pub trait Strategy {
    /// Total balance the strategy currently reports.
    fn current_balance(&self) -> Amount;

    /// Check that `actions`, applied in order, would all succeed. Read-only.
    fn check_intents(&self, actions: &[IntentAction]) -> Result<()>;

    fn apply_intent(&mut self, action: &IntentAction) -> Result<()>;
}

/// Moves real tokens in and out of the settlement layer.
pub trait Custody {
    fn transfer_in(&mut self, account: AccountId, token: TokenAddress, amount: Amount)
    -> Result<()>;

    fn transfer_out(
        &mut self,
        account: AccountId,
        token: TokenAddress,
        amount: Amount,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// InMemoryRegistry
// ---------------------------------------------------------------------------

/// Sequential registry. Asset IDs start at 1; 0 is never assigned.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    by_token: HashMap<TokenAddress, AssetId>,
    tokens: Vec<TokenAddress>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl AssetRegistry for InMemoryRegistry {
    fn register_asset(&mut self, token: TokenAddress) -> Result<AssetId> {
        if self.by_token.contains_key(&token) {
            return Err(RollupError::AssetAlreadyRegistered(token));
        }
        let next = u16::try_from(self.tokens.len() + 1)
            .map_err(|_| RollupError::Internal("asset ID space exhausted".into()))?;
        let id = AssetId(next);
        self.by_token.insert(token, id);
        self.tokens.push(token);
        Ok(id)
    }

    fn lookup(&self, token: &TokenAddress) -> Option<AssetId> {
        self.by_token.get(token).copied()
    }

    fn token_of(&self, asset: AssetId) -> Option<TokenAddress> {
        let index = usize::from(asset.0).checked_sub(1)?;
        self.tokens.get(index).copied()
    }
}

// ---------------------------------------------------------------------------
// StaticStrategy
// ---------------------------------------------------------------------------

/// A strategy whose balance moves only through intents or `set_balance`.
#[derive(Debug, Default)]
pub struct StaticStrategy {
    balance: Amount,
    /// Yield added to the balance on every harvest.
    harvest_yield: Amount,
    applied: Vec<IntentAction>,
}

impl StaticStrategy {
    #[must_use]
    pub fn new(balance: Amount) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_harvest_yield(mut self, harvest_yield: Amount) -> Self {
        self.harvest_yield = harvest_yield;
        self
    }

    pub fn set_balance(&mut self, balance: Amount) {
        self.balance = balance;
    }

    /// Intents applied so far, in order.
    #[must_use]
    pub fn applied(&self) -> &[IntentAction] {
        &self.applied
    }
}

impl StaticStrategy {
    fn step(&self, balance: Amount, action: IntentAction) -> Result<Amount> {
        match action {
            IntentAction::Invest(amount) => {
                balance.checked_add(amount).ok_or_else(|| RollupError::Strategy {
                    reason: "balance overflow".into(),
                })
            }
            IntentAction::Divest(amount) => {
                balance.checked_sub(amount).ok_or_else(|| RollupError::Strategy {
                    reason: format!("divest {amount} exceeds strategy balance {balance}"),
                })
            }
            IntentAction::Harvest => Ok(balance.saturating_add(self.harvest_yield)),
        }
    }
}

impl Strategy for StaticStrategy {
    fn current_balance(&self) -> Amount {
        self.balance
    }

    fn check_intents(&self, actions: &[IntentAction]) -> Result<()> {
        actions
            .iter()
            .try_fold(self.balance, |balance, action| self.step(balance, *action))
            .map(|_| ())
    }

    fn apply_intent(&mut self, action: &IntentAction) -> Result<()> {
        self.balance = self.step(self.balance, *action)?;
        self.applied.push(*action);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// InMemoryCustody
// ---------------------------------------------------------------------------

/// Custody backed by per-(account, token) wallet balances.
///
/// `transfer_in` debits the account's wallet into the vault; `transfer_out`
/// pays from the vault back to the wallet.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    wallets: HashMap<(AccountId, TokenAddress), Amount>,
    vault: HashMap<TokenAddress, Amount>,
}

impl InMemoryCustody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give an account tokens outside the ledger.
    pub fn mint(&mut self, account: AccountId, token: TokenAddress, amount: Amount) {
        *self.wallets.entry((account, token)).or_insert(0) += amount;
    }

    #[must_use]
    pub fn wallet_balance(&self, account: AccountId, token: TokenAddress) -> Amount {
        self.wallets.get(&(account, token)).copied().unwrap_or(0)
    }

    /// Tokens currently held by the ledger.
    #[must_use]
    pub fn vault_balance(&self, token: TokenAddress) -> Amount {
        self.vault.get(&token).copied().unwrap_or(0)
    }
}

impl Custody for InMemoryCustody {
    fn transfer_in(
        &mut self,
        account: AccountId,
        token: TokenAddress,
        amount: Amount,
    ) -> Result<()> {
        let wallet = self.wallet_balance(account, token);
        if wallet < amount {
            return Err(RollupError::Custody {
                reason: format!("{account} holds {wallet} of {token}, needs {amount}"),
            });
        }
        self.wallets.insert((account, token), wallet - amount);
        *self.vault.entry(token).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_out(
        &mut self,
        account: AccountId,
        token: TokenAddress,
        amount: Amount,
    ) -> Result<()> {
        let held = self.vault_balance(token);
        if held < amount {
            return Err(RollupError::Custody {
                reason: format!("vault holds {held} of {token}, cannot pay {amount}"),
            });
        }
        self.vault.insert(token, held - amount);
        self.mint(account, token, amount);
        Ok(())
    }
}
