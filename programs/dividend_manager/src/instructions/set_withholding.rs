use anchor_lang::prelude::*;

use crate::constants::*;
use crate::context::OperatorContext;
use crate::error::*;
use crate::event::*;
use crate::state::*;
use crate::utils::DividendAction;

/**
 * Sets a fixed withholding percentage for one or more holders
 *
 * @param ctx - Operation context
 * @param withholding - Local withholding table, updated on success
 * @param payees - Holders the percentage applies to
 * @param percentage - Whole percentage in [0, 100]
 *
 * Business Logic:
 * - The last confirmed write for a holder wins
 * - Setting 0 clears withholding for the holder
 * - Applies to payouts made after the write, including payouts from
 *   dividends created before it
 */
pub fn handle_set_withholding_fixed(
    ctx: &mut OperatorContext,
    withholding: &mut WithholdingCalculator,
    payees: &[Pubkey],
    percentage: u8,
) -> Result<()> {
    // ===== VALIDATION PHASE =====

    require!(percentage <= MAX_WITHHOLDING_PERCENT, DividendError::InvalidPercentage);
    require!(!payees.is_empty(), DividendError::EmptyBatch);
    require!(
        payees.iter().all(|payee| *payee != Pubkey::default()),
        DividendError::InvalidAddress
    );

    // ===== SUBMISSION PHASE =====

    let receipt = ctx.submit(DividendAction::SetWithholdingFixed {
        module: ctx.module(),
        payees: payees.to_vec(),
        percentage,
    })?;
    let confirmed: WithholdingSet = receipt.event()?;
    require!(
        confirmed.module == ctx.module(),
        DividendError::MalformedReceiptEvent
    );

    withholding.record(&confirmed.payees, confirmed.percentage)?;

    msg!(
        "Withholding set to {}% for {} holder(s)",
        confirmed.percentage,
        confirmed.payees.len()
    );

    Ok(())
}
