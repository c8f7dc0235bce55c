use anchor_lang::prelude::*;

use crate::context::OperatorContext;
use crate::error::*;
use crate::event::*;
use crate::state::*;
use crate::utils::DividendAction;

/**
 * Withdraws the withheld tax of a dividend to the issuer
 *
 * @param ctx - Operation context
 * @param dividends - Local dividend ledger
 * @param index - Dividend to withdraw from
 *
 * @returns Amount withdrawn
 *
 * Business Logic:
 * - Allowed at any time, independent of expiry and of the principal reclaim
 * - Repeatable; each call withdraws what was withheld since the previous one
 * - Fails with `NothingToReclaim` when everything withheld was withdrawn
 */
pub fn handle_withdraw_withholding(
    ctx: &mut OperatorContext,
    dividends: &mut DividendLedger,
    index: u32,
) -> Result<u64> {
    // ===== PRECONDITION PHASE =====

    let module = ctx.module();
    if ctx.config.refresh_before_commit {
        dividends.refresh(&*ctx.ledger, &module, index)?;
    }
    let dividend = dividends.get(index)?;
    require!(dividend.remaining_withheld() > 0, DividendError::NothingToReclaim);

    // ===== SUBMISSION PHASE =====

    let receipt = ctx.submit(DividendAction::WithdrawWithholding {
        module,
        dividend_index: index,
    })?;
    let withdrawal: WithholdingPayload =
        receipt.decode_one(ctx.events().withholding_withdrawn)?;
    require!(
        withdrawal.dividend_index == index,
        DividendError::MalformedReceiptEvent
    );

    // ===== BOOKING PHASE =====

    dividends
        .get_mut(index)?
        .apply_withholding_withdrawal(withdrawal.withheld_amount)?;

    msg!(
        "Dividend {} withholding withdrawn: {} to {}",
        index,
        withdrawal.withheld_amount,
        withdrawal.claimer
    );

    Ok(withdrawal.withheld_amount)
}
