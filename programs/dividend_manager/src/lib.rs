use anchor_lang::prelude::*;

declare_id!("7KbfsseNtfpc1VGe4LutvGrXRnd8EzzwfMGimi7cMsa8");

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod event;
pub mod instructions;
pub mod state;
pub mod utils;

#[cfg(test)]
pub mod test;

use config::DividendConfig;
use context::{ModuleBinding, OperatorContext};
use instructions::*;
use state::*;
use utils::{BalanceOracle, LedgerClient, UnixClock};

/**
 * Dividend Manager
 *
 * Operator core for checkpoint-based dividend distributions on a security
 * token. The issuer deposits a value pool into a dividend module; holders are
 * paid pro rata to their balance at a checkpoint, minus withholding tax.
 *
 * Key Features:
 * - Checkpoints freeze holder balances; checkpoint 0 tracks live balances
 * - Standing or one-time exclusion lists, frozen into each dividend
 * - Per-holder withholding percentages, last write wins
 * - Idempotent batched payouts with per-holder outcomes
 * - Independent recovery of unclaimed principal and withheld tax
 *
 * Architecture:
 * - Dividend module: on-ledger program holding dividend and claim records
 * - LedgerClient: submits actions and returns receipts with typed events
 * - BalanceOracle: live and checkpoint balances of the security token
 * - DividendSession: local mirror of the module state for one issuer
 *
 * Workflow:
 * 1. Bind a session to the dividend module of a currency
 * 2. Optionally set default exclusions and withholding percentages
 * 3. Create a dividend against a new, existing or live checkpoint
 * 4. Push payouts to holders once the dividend matures
 * 5. Reclaim the remaining principal after expiry, withdraw withholding any time
 */
#[derive(Clone, Debug)]
pub struct DividendSession {
    /// Account funding dividends and receiving reclaimed amounts
    pub issuer: Pubkey,
    pub binding: ModuleBinding,
    pub config: DividendConfig,
    pub checkpoints: CheckpointRegistry,
    pub exclusions: ExclusionSetManager,
    pub withholding: WithholdingCalculator,
    pub dividends: DividendLedger,
}

impl DividendSession {
    /**
     * Opens a session on the dividend module paying out in `currency`
     *
     * @param issuer - Account acting on the module
     * @param currency - Payout currency
     * @param config - Runtime configuration
     * @param ledger - Ledger client used to find (or attach) the module
     * @param oracle - Balance oracle used to load existing checkpoints
     *
     * Loads the module state already on the ledger: checkpoints, the default
     * exclusion list, withholding percentages and every dividend record.
     *
     * Fails with `ModuleNotAttached` when the module is missing and
     * `auto_attach_module` is off. No other operation can run without a
     * bound module.
     */
    pub fn bind(
        issuer: Pubkey,
        currency: Currency,
        config: DividendConfig,
        ledger: &mut dyn LedgerClient,
        oracle: &dyn BalanceOracle,
    ) -> Result<Self> {
        let binding = handle_bind_module(ledger, &issuer, currency, &config)?;
        let mut session = Self {
            issuer,
            binding,
            config,
            checkpoints: CheckpointRegistry::default(),
            exclusions: ExclusionSetManager::new(config.max_excluded),
            withholding: WithholdingCalculator::default(),
            dividends: DividendLedger::default(),
        };
        session.checkpoints.sync(oracle)?;
        session.load_module_state(&*ledger)?;

        msg!(
            "Session bound: issuer={}, module={}, checkpoints={}, dividends={}",
            issuer,
            binding.module,
            session.checkpoints.current_id(),
            session.dividends.len()
        );

        Ok(session)
    }

    /// Reloads settings and dividend records changed by other participants
    pub fn sync_module(&mut self, ctx: &OperatorContext) -> Result<()> {
        self.checkpoints.sync(ctx.oracle)?;
        self.load_module_state(&*ctx.ledger)
    }

    fn load_module_state(&mut self, ledger: &dyn LedgerClient) -> Result<()> {
        let module = self.binding.module;
        let settings = ModuleSettings::load(ledger, &module)?;
        self.exclusions
            .replace_default(ExclusionSet::from_addresses(settings.default_excluded));
        self.withholding.load(&settings.withholding)?;
        self.dividends.sync(ledger, &module)?;
        Ok(())
    }

    /// Builds the context for one operation
    pub fn context<'a>(
        &self,
        ledger: &'a mut dyn LedgerClient,
        oracle: &'a dyn BalanceOracle,
        clock: &'a dyn UnixClock,
    ) -> OperatorContext<'a> {
        OperatorContext::new(self.issuer, self.binding, self.config, ledger, oracle, clock)
    }

    pub fn currency(&self) -> Currency {
        self.binding.currency
    }

    // ===== CHECKPOINTS =====

    pub fn create_checkpoint(&mut self, ctx: &mut OperatorContext) -> Result<Checkpoint> {
        handle_create_checkpoint(ctx, &mut self.checkpoints)
    }

    /// Picks up checkpoints created by other participants
    pub fn sync_checkpoints(&mut self, ctx: &OperatorContext) -> Result<()> {
        self.checkpoints.sync(ctx.oracle)
    }

    pub fn explore_account(
        &self,
        ctx: &OperatorContext,
        holder: &Pubkey,
        checkpoint_id: u32,
    ) -> Result<BalanceView> {
        self.checkpoints.explore_account(ctx.oracle, holder, checkpoint_id)
    }

    pub fn explore_total_supply(&self, ctx: &OperatorContext, checkpoint_id: u32) -> Result<BalanceView> {
        self.checkpoints.explore_total_supply(ctx.oracle, checkpoint_id)
    }

    // ===== EXCLUSIONS AND WITHHOLDING =====

    pub fn set_default_exclusions<S: AsRef<str>>(
        &mut self,
        ctx: &mut OperatorContext,
        raw: &[S],
    ) -> Result<ExclusionReport> {
        handle_set_default_exclusions(ctx, &mut self.exclusions, raw)
    }

    /// Validates a one-time exclusion list for a single dividend
    pub fn materialize_override<S: AsRef<str>>(&self, raw: &[S]) -> Result<ExclusionReport> {
        self.exclusions.materialize_override(raw)
    }

    pub fn materialize_from(&self, source: &dyn ExclusionSource) -> Result<ExclusionReport> {
        self.exclusions.materialize_from(source)
    }

    pub fn set_withholding_fixed(
        &mut self,
        ctx: &mut OperatorContext,
        payees: &[Pubkey],
        percentage: u8,
    ) -> Result<()> {
        handle_set_withholding_fixed(ctx, &mut self.withholding, payees, percentage)
    }

    pub fn calculate_dividend(
        &self,
        ctx: &OperatorContext,
        index: u32,
        payee: &Pubkey,
    ) -> Result<DividendSplit> {
        handle_calculate_dividend(ctx, &self.dividends, &self.withholding, index, payee)
    }

    pub fn explore_dividend_balance(
        &self,
        ctx: &OperatorContext,
        index: u32,
        payee: &Pubkey,
    ) -> Result<DividendBalance> {
        handle_explore_dividend_balance(ctx, &self.dividends, &self.withholding, index, payee)
    }

    // ===== DIVIDEND LIFECYCLE =====

    pub fn create_dividend(&mut self, ctx: &mut OperatorContext, params: DividendParams) -> Result<u32> {
        handle_create_dividend(
            ctx,
            &mut self.checkpoints,
            &self.exclusions,
            &mut self.dividends,
            params,
        )
    }

    pub fn push_dividend_payment(
        &mut self,
        ctx: &mut OperatorContext,
        index: u32,
        payees: &[Pubkey],
    ) -> Result<Vec<PushResult>> {
        handle_push_dividend_payment(ctx, &mut self.dividends, &self.withholding, index, payees)
    }

    pub fn reclaim_dividend(&mut self, ctx: &mut OperatorContext, index: u32) -> Result<u64> {
        handle_reclaim_dividend(ctx, &mut self.dividends, index)
    }

    pub fn withdraw_withholding(&mut self, ctx: &mut OperatorContext, index: u32) -> Result<u64> {
        handle_withdraw_withholding(ctx, &mut self.dividends, index)
    }

    /// Re-reads a dividend record from the ledger
    pub fn refresh_dividend(&mut self, ctx: &OperatorContext, index: u32) -> Result<&Dividend> {
        let module = ctx.module();
        self.dividends.refresh(&*ctx.ledger, &module, index)
    }

    // ===== QUERIES =====

    pub fn dividend(&self, index: u32) -> Result<&Dividend> {
        self.dividends.get(index)
    }

    pub fn status(&self, ctx: &OperatorContext, index: u32) -> Result<DividendStatus> {
        self.dividends.status(index, ctx.now())
    }

    /// Dividends matching `filter` at the current time, ascending by index
    pub fn select_dividends(&self, ctx: &OperatorContext, filter: DividendFilter) -> Vec<&Dividend> {
        self.dividends.select(filter, ctx.now()).collect()
    }

    pub fn dividends_by_checkpoint(&self, checkpoint_id: u32) -> Vec<&Dividend> {
        self.dividends.by_checkpoint(checkpoint_id).collect()
    }
}
