use anchor_lang::prelude::*;

use crate::context::OperatorContext;
use crate::error::*;
use crate::event::*;
use crate::state::*;
use crate::utils::DividendAction;

/**
 * Returns the unclaimed principal of an expired dividend to the issuer
 *
 * @param ctx - Operation context
 * @param dividends - Local dividend ledger
 * @param index - Dividend to reclaim
 *
 * @returns Amount returned to the issuer
 *
 * Validation Rules:
 * - The dividend expired strictly before now
 * - It has not been reclaimed yet
 * - Some principal is left (total - claimed - withheld > 0)
 *
 * Business Logic:
 * - Withheld tax is not part of the reclaim; it is recovered through
 *   withholding withdrawal, before or after the reclaim
 * - The reclaimed flag latches and is never cleared
 */
pub fn handle_reclaim_dividend(
    ctx: &mut OperatorContext,
    dividends: &mut DividendLedger,
    index: u32,
) -> Result<u64> {
    // ===== PRECONDITION PHASE =====

    let module = ctx.module();
    if ctx.config.refresh_before_commit {
        dividends.refresh(&*ctx.ledger, &module, index)?;
    }
    let now = ctx.now();
    let dividend = dividends.get(index)?;
    require!(now > dividend.expiry, DividendError::DividendNotExpired);
    require!(!dividend.reclaimed, DividendError::AlreadyReclaimed);
    require!(dividend.remaining_principal() > 0, DividendError::NothingToReclaim);

    // ===== SUBMISSION PHASE =====

    let receipt = ctx.submit(DividendAction::ReclaimDividend {
        module,
        dividend_index: index,
    })?;
    let reclaim: ReclaimPayload = receipt.decode_one(ctx.events().reclaimed)?;
    require!(
        reclaim.dividend_index == index,
        DividendError::MalformedReceiptEvent
    );

    // ===== BOOKING PHASE =====

    let dividend = dividends.get_mut(index)?;
    require!(
        reclaim.amount <= dividend.remaining_principal(),
        DividendError::AccountingInvariant
    );
    dividend.reclaimed = true;

    msg!("Dividend {} reclaimed: {} returned to {}", index, reclaim.amount, reclaim.claimer);

    Ok(reclaim.amount)
}
