//! `RollupLedger`: the settlement layer's public surface.
//!
//! Owns the [`LedgerState`] together with the external collaborators and
//! routes every operation through them. Each call takes `&mut self` and
//! either fully succeeds or leaves the ledger unchanged: all checks run
//! before custody is touched, and internal state is written only after
//! custody succeeds.

use rollup_types::{
    AccountId, Amount, AssetId, AssetRegistry, BlockId, Custody, EventKind, LedgerConfig,
    LedgerEvent, PendingCommitment, Result, RollupBlock, RollupError, RollupTx, SlotIndex,
    Strategy, StrategyIntent, TokenAddress, WithdrawCommit,
};

use crate::{
    commit,
    execute::{self, StrategySet},
    state::LedgerState,
};

/// The rollup settlement ledger.
pub struct RollupLedger<R, C> {
    config: LedgerConfig,
    state: LedgerState,
    registry: R,
    custody: C,
    strategies: StrategySet,
}

impl<R: AssetRegistry, C: Custody> RollupLedger<R, C> {
    /// Create a ledger at genesis. Registers the native token if the
    /// registry does not know it yet.
    ///
    /// # Errors
    /// Returns `Configuration` if the config is invalid.
    pub fn new(config: LedgerConfig, mut registry: R, custody: C) -> Result<Self> {
        config.validate()?;
        if registry.lookup(&config.native_token).is_none() {
            registry.register_asset(config.native_token)?;
        }
        let state = LedgerState::with_limits(&config.deposit_caps, config.max_block_transactions);
        tracing::info!(
            native_token = %config.native_token,
            caps = config.deposit_caps.len(),
            max_block_transactions = config.max_block_transactions,
            "Rollup ledger initialized"
        );
        Ok(Self {
            config,
            state,
            registry,
            custody,
            strategies: StrategySet::new(),
        })
    }

    // -----------------------------------------------------------------
    // Assets and strategies
    // -----------------------------------------------------------------

    /// Register a token with the asset registry.
    pub fn register_asset(&mut self, token: TokenAddress) -> Result<AssetId> {
        let asset = self.registry.register_asset(token)?;
        tracing::info!(token = %token, asset = %asset, "Asset registered");
        Ok(asset)
    }

    /// Attach (or replace) the strategy reporting for `asset`.
    pub fn attach_strategy(&mut self, asset: AssetId, strategy: Box<dyn Strategy>) -> Result<()> {
        self.token_of(asset)?;
        self.strategies.insert(asset, strategy);
        Ok(())
    }

    /// Set or replace the net-deposit cap for an asset.
    pub fn set_deposit_cap(&mut self, asset: AssetId, cap: Amount) -> Result<()> {
        self.token_of(asset)?;
        self.state.deposits_mut().set_cap(asset, cap);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Deposits and balance syncs
    // -----------------------------------------------------------------

    /// Deposit `amount` of `token` from `account` into custody and queue it.
    ///
    /// # Errors
    /// - `AssetNotRegistered` if the token is unknown
    /// - `ZeroAmount`, `LimitExceeded` from the deposit tracker
    /// - `Custody` if the transfer in fails
    pub fn deposit(
        &mut self,
        account: AccountId,
        token: TokenAddress,
        amount: Amount,
    ) -> Result<SlotIndex> {
        let asset = self
            .registry
            .lookup(&token)
            .ok_or(RollupError::AssetNotRegistered(token))?;
        self.state.deposits().check(asset, amount)?;
        self.custody.transfer_in(account, token, amount)?;

        let current_block = self.state.next_block_id();
        let (slot, event) = self
            .state
            .deposits_mut()
            .deposit(account, asset, amount, current_block)?;
        self.state.push_event(event);
        Ok(slot)
    }

    /// Deposit native currency, held as the configured wrapped token.
    pub fn deposit_native(&mut self, account: AccountId, amount: Amount) -> Result<SlotIndex> {
        self.deposit(account, self.config.native_token, amount)
    }

    /// Queue the current balance reported by `asset`'s strategy.
    ///
    /// # Errors
    /// - `UnknownAssetId` if the asset is not registered. This is the
    ///   asset-ID form of `AssetNotRegistered`, which carries a token
    ///   address and is returned by the token-keyed calls.
    /// - `StrategyNotFound` if no strategy is attached
    pub fn sync_balance(&mut self, asset: AssetId) -> Result<SlotIndex> {
        self.token_of(asset)?;
        let strategy = self
            .strategies
            .get(&asset)
            .ok_or(RollupError::StrategyNotFound(asset))?;
        let (slot, event) = self
            .state
            .balance_syncs_mut()
            .sync(asset, strategy.as_ref());
        self.state.push_event(event);
        Ok(slot)
    }

    // -----------------------------------------------------------------
    // Commit / execute / revert
    // -----------------------------------------------------------------

    /// Commit the next rollup block.
    ///
    /// # Errors
    /// - `UnknownAssetId` if a withdraw request names an unregistered asset
    /// - everything [`commit::plan_commit`] can return
    pub fn commit_block(&mut self, block_id: BlockId, transactions: Vec<RollupTx>) -> Result<()> {
        for tx in &transactions {
            if let RollupTx::WithdrawRequest { asset, .. } = tx {
                self.token_of(*asset)?;
            }
        }
        commit::commit_block(&mut self.state, block_id, transactions)
    }

    /// Execute the oldest committed-but-unexecuted block.
    pub fn execute_block(&mut self, intents: &[StrategyIntent]) -> Result<BlockId> {
        execute::execute_block(&mut self.state, &mut self.strategies, intents)
    }

    /// Un-commit the newest unexecuted block.
    pub fn revert_last_block(&mut self) -> Result<BlockId> {
        commit::revert_last_block(&mut self.state)
    }

    // -----------------------------------------------------------------
    // Withdrawals
    // -----------------------------------------------------------------

    /// Pay out everything `account` can claim in `token`.
    ///
    /// # Errors
    /// - `AssetNotRegistered` if the token is unknown
    /// - `NothingToWithdraw` if nothing is claimable
    /// - `Custody` if the transfer out fails (the claim stays intact)
    pub fn withdraw(&mut self, account: AccountId, token: TokenAddress) -> Result<Amount> {
        let asset = self
            .registry
            .lookup(&token)
            .ok_or(RollupError::AssetNotRegistered(token))?;
        let amount = self.state.withdrawals().claimable(account, asset)?;
        self.custody.transfer_out(account, token, amount)?;

        let paid = self.state.withdrawals_mut().take(account, asset)?;
        self.state.deposits_mut().record_withdrawal(asset, paid);

        tracing::debug!(account = %account, asset = %asset, amount = paid, "Withdrawal claimed");

        self.state
            .push_event(LedgerEvent::now(EventKind::WithdrawalClaimed {
                account,
                asset,
                amount: paid,
            }));
        Ok(paid)
    }

    /// Claim native-currency withdrawals.
    pub fn withdraw_native(&mut self, account: AccountId) -> Result<Amount> {
        self.withdraw(account, self.config.native_token)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn pending_deposit(&self, index: SlotIndex) -> Option<PendingCommitment> {
        self.state.pending_deposit(index)
    }

    #[must_use]
    pub fn pending_balance_sync(&self, index: SlotIndex) -> Option<PendingCommitment> {
        self.state.pending_balance_sync(index)
    }

    #[must_use]
    pub fn pending_withdraw_commit(&self, block: BlockId, index: usize) -> Option<WithdrawCommit> {
        self.state.pending_withdraw_commit(block, index)
    }

    #[must_use]
    pub fn pending_withdraw(&self, account: AccountId, asset: AssetId) -> Amount {
        self.state.pending_withdraw(account, asset)
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&RollupBlock> {
        self.state.block(id)
    }

    #[must_use]
    pub fn asset_id(&self, token: &TokenAddress) -> Option<AssetId> {
        self.registry.lookup(token)
    }

    #[must_use]
    pub fn native_asset(&self) -> Option<AssetId> {
        self.registry.lookup(&self.config.native_token)
    }

    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    #[must_use]
    pub fn strategy(&self, asset: AssetId) -> Option<&dyn Strategy> {
        self.strategies.get(&asset).map(|s| s.as_ref())
    }

    /// Events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.state.take_events()
    }

    fn token_of(&self, asset: AssetId) -> Result<TokenAddress> {
        self.registry
            .token_of(asset)
            .ok_or(RollupError::UnknownAssetId(asset))
    }
}
