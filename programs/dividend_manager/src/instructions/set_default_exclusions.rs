use anchor_lang::prelude::*;

use crate::context::OperatorContext;
use crate::error::*;
use crate::event::*;
use crate::state::*;
use crate::utils::DividendAction;

/**
 * Replaces the standing default exclusion list of the dividend module
 *
 * @param ctx - Operation context
 * @param exclusions - Exclusion manager holding the standing default
 * @param raw - Candidate addresses as supplied by the operator
 *
 * @returns The validation report; `set` is the list confirmed by the ledger
 *
 * Business Logic:
 * - Malformed entries are dropped and counted, duplicates collapse
 * - The local default only changes once `DefaultExclusionsSet` is confirmed
 * - Dividends already created keep the list they were created with
 */
pub fn handle_set_default_exclusions<S: AsRef<str>>(
    ctx: &mut OperatorContext,
    exclusions: &mut ExclusionSetManager,
    raw: &[S],
) -> Result<ExclusionReport> {
    // ===== VALIDATION PHASE =====

    let report = exclusions.materialize_override(raw)?;
    if report.rejected > 0 {
        msg!("Dropped {} malformed exclusion entries", report.rejected);
    }

    // ===== SUBMISSION PHASE =====

    let receipt = ctx.submit(DividendAction::SetDefaultExcluded {
        module: ctx.module(),
        excluded: report.set.as_slice().to_vec(),
    })?;
    let confirmed: DefaultExclusionsSet = receipt.event()?;
    require!(
        confirmed.module == ctx.module(),
        DividendError::MalformedReceiptEvent
    );

    let set = ExclusionSet::from_addresses(confirmed.excluded);
    exclusions.replace_default(set.clone());

    msg!("Default exclusions set: {} address(es)", set.len());

    Ok(ExclusionReport {
        set,
        rejected: report.rejected,
    })
}
