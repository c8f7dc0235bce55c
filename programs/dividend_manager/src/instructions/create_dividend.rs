use anchor_lang::prelude::*;

use crate::constants::*;
use crate::context::OperatorContext;
use crate::error::*;
use crate::event::*;
use crate::instructions::handle_create_checkpoint;
use crate::state::*;
use crate::utils::{currency_balance, DividendAction};

/// Which balances a new dividend is computed against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckpointSelection {
    /// Live balances at payout time (checkpoint 0)
    Live,
    /// An existing checkpoint
    Existing(u32),
    /// A checkpoint taken right before the deposit
    #[default]
    CreateNew,
}

/// Which exclusion list a new dividend copies
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExclusionChoice {
    /// The module's standing default
    #[default]
    Default,
    /// A one-time list that leaves the default untouched
    Override(ExclusionSet),
}

/// Operator input for a new dividend
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DividendParams {
    pub name: String,
    /// Amount in the smallest unit of the currency
    pub amount: u64,
    pub maturity: i64,
    /// Defaults to maturity + `default_expiry_window`
    pub expiry: Option<i64>,
    pub checkpoint: CheckpointSelection,
    pub exclusions: ExclusionChoice,
}

/**
 * Deposits a new dividend into the bound dividend module
 *
 * @param ctx - Operation context
 * @param checkpoints - Checkpoint registry; extended when a checkpoint is created
 * @param exclusions - Exclusion manager providing the standing default
 * @param dividends - Local dividend ledger, extended on success
 * @param params - Name, amount, window, checkpoint and exclusion choice
 *
 * @returns Index of the new dividend, as confirmed by the deposit event
 *
 * Validation Rules:
 * - Name is 1 to 32 bytes, amount is non-zero
 * - expiry > maturity, expiry > now, maturity >= now - maturity_grace
 * - The exclusion list holds at most `max_excluded` addresses
 * - The checkpoint exists (checked before any submission); ids past the
 *   local registry are re-read from the ledger first
 * - The issuer holds at least `amount` of the currency
 *
 * With `refresh_before_commit`, `ExclusionChoice::Default` copies the default
 * list currently held by the module rather than the local copy.
 *
 * `CheckpointSelection::CreateNew` takes the checkpoint in its own submission
 * once every other precondition has passed. If the deposit then fails, the
 * checkpoint stays on the ledger and in `checkpoints`, and can be reused
 * through `CheckpointSelection::Existing`.
 */
pub fn handle_create_dividend(
    ctx: &mut OperatorContext,
    checkpoints: &mut CheckpointRegistry,
    exclusions: &ExclusionSetManager,
    dividends: &mut DividendLedger,
    params: DividendParams,
) -> Result<u32> {
    // ===== VALIDATION PHASE =====

    require!(
        !params.name.is_empty() && params.name.len() <= MAX_NAME_LEN,
        DividendError::InvalidName
    );
    require!(params.amount > 0, DividendError::InvalidAmount);

    let now = ctx.now();
    let maturity = params.maturity;
    let expiry = params
        .expiry
        .unwrap_or_else(|| ctx.config.default_expiry(maturity));
    require!(expiry > maturity, DividendError::InvalidWindow);
    require!(expiry > now, DividendError::InvalidWindow);
    require!(
        maturity >= now.saturating_sub(ctx.config.maturity_grace),
        DividendError::InvalidWindow
    );

    let excluded = match params.exclusions {
        ExclusionChoice::Default if ctx.config.refresh_before_commit => {
            let settings = ModuleSettings::load(&*ctx.ledger, &ctx.module())?;
            ExclusionSet::from_addresses(settings.default_excluded)
        }
        ExclusionChoice::Default => exclusions.get_default().clone(),
        ExclusionChoice::Override(set) => set,
    };
    require!(
        excluded.len() <= ctx.config.max_excluded,
        DividendError::TooManyExclusions
    );

    // ===== PRECONDITION PHASE =====

    if let CheckpointSelection::Existing(id) = params.checkpoint {
        if id > checkpoints.current_id() {
            checkpoints.sync(ctx.oracle)?;
        }
        checkpoints.get(id)?;
    }

    let balance = currency_balance(
        ctx.oracle,
        &ctx.issuer,
        ctx.binding.currency,
        &ctx.binding.currency_mint,
    )?;
    if balance < params.amount {
        msg!(
            "Insufficient funds: balance {}, required {}, short by {}",
            balance,
            params.amount,
            params.amount - balance
        );
        return err!(DividendError::InsufficientFunds);
    }

    // ===== SUBMISSION PHASE =====

    let checkpoint_id = match params.checkpoint {
        CheckpointSelection::Live => LIVE_CHECKPOINT_ID,
        CheckpointSelection::Existing(id) => id,
        CheckpointSelection::CreateNew => handle_create_checkpoint(ctx, checkpoints)?.id,
    };

    let receipt = ctx.submit(DividendAction::CreateDividend {
        module: ctx.module(),
        name: params.name,
        checkpoint_id,
        amount: params.amount,
        maturity,
        expiry,
        excluded: excluded.as_slice().to_vec(),
    })?;
    let deposit: DepositPayload = receipt.decode_one(ctx.events().deposited)?;

    let dividend = Dividend {
        index: deposit.dividend_index,
        name: deposit.name,
        currency: ctx.binding.currency,
        checkpoint_id: deposit.checkpoint_id,
        created_at: deposit.created_at,
        maturity: deposit.maturity,
        expiry: deposit.expiry,
        total_amount: deposit.amount,
        exclusions: ExclusionSet::from_addresses(deposit.excluded),
        ..Dividend::default()
    };
    let index = dividend.index;

    msg!(
        "Dividend {} deposited: amount={}, checkpoint={}, maturity={}, expiry={}",
        index,
        dividend.total_amount,
        dividend.checkpoint_id,
        dividend.maturity,
        dividend.expiry
    );

    dividends.insert(dividend);
    Ok(index)
}
