use anchor_lang::prelude::*;

use crate::context::OperatorContext;
use crate::state::*;
use crate::utils::currency_balance;

/// A holder's currency balance next to its share of one dividend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DividendBalance {
    pub payee: Pubkey,
    /// Balance held in the dividend currency
    pub currency_balance: u64,
    pub split: DividendSplit,
    /// Whether the holder has already been paid from the dividend
    pub claimed: bool,
}

/**
 * Computes what a holder is entitled to from a dividend
 *
 * @param ctx - Operation context
 * @param dividends - Local dividend ledger
 * @param withholding - Withholding table of the module
 * @param index - Dividend to compute against
 * @param payee - Holder
 *
 * Read-only; nothing is submitted.
 */
pub fn handle_calculate_dividend(
    ctx: &OperatorContext,
    dividends: &DividendLedger,
    withholding: &WithholdingCalculator,
    index: u32,
    payee: &Pubkey,
) -> Result<DividendSplit> {
    let dividend = dividends.get(index)?;
    withholding.calculate(ctx.oracle, dividend, payee)
}

pub fn handle_explore_dividend_balance(
    ctx: &OperatorContext,
    dividends: &DividendLedger,
    withholding: &WithholdingCalculator,
    index: u32,
    payee: &Pubkey,
) -> Result<DividendBalance> {
    let split = handle_calculate_dividend(ctx, dividends, withholding, index, payee)?;
    let currency_balance = currency_balance(
        ctx.oracle,
        payee,
        ctx.binding.currency,
        &ctx.binding.currency_mint,
    )?;
    Ok(DividendBalance {
        payee: *payee,
        currency_balance,
        split,
        claimed: dividends.has_claimed(index, payee),
    })
}
