use std::collections::{BTreeMap, HashSet};

use anchor_lang::prelude::*;

use crate::context::OperatorContext;
use crate::error::*;
use crate::event::*;
use crate::state::*;
use crate::utils::DividendAction;

/// Why a payee was left out of the submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyClaimed,
    Excluded,
    /// Entitlement rounds down to nothing
    ZeroBalance,
    /// Listed earlier in the same batch
    DuplicateInBatch,
}

/// Why a submitted payout was not confirmed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The module reported the transfer as failed
    TransferRejected,
    /// The receipt holds neither a payout nor a failure for the payee
    Unconfirmed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Paid { net: u64, withheld: u64 },
    Skipped(SkipReason),
    Failed(FailureReason),
}

/// Outcome for one payee of a push
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PushResult {
    pub payee: Pubkey,
    pub outcome: PushOutcome,
}

impl PushResult {
    pub fn is_paid(&self) -> bool {
        matches!(self.outcome, PushOutcome::Paid { .. })
    }
}

/// Parses a comma separated list of payee addresses
pub fn parse_payees(raw: &str) -> Result<Vec<Pubkey>> {
    let payees = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_address)
        .collect::<Result<Vec<_>>>()?;
    require!(!payees.is_empty(), DividendError::EmptyBatch);
    Ok(payees)
}

/**
 * Pushes dividend payouts to a batch of holders
 *
 * @param ctx - Operation context
 * @param dividends - Local dividend ledger
 * @param withholding - Withholding table used to split each entitlement
 * @param index - Dividend to pay out from
 * @param payees - Holders to pay, in the order results are reported
 *
 * @returns One result per requested payee, in request order
 *
 * Validation Rules:
 * - The batch is non-empty and at most `max_push_batch` long
 * - The dividend is claimable (matured, not expired) and not reclaimed
 *
 * Business Logic:
 * - Holders already paid, excluded holders and zero entitlements are skipped
 *   without a submission; pushing the same batch twice pays nothing twice
 * - Payable holders go out in a single submission
 * - Native coin modules report failed transfers per holder and commit the
 *   rest; token modules revert the whole batch, in which case the ledger
 *   error is returned and nothing is booked
 */
pub fn handle_push_dividend_payment(
    ctx: &mut OperatorContext,
    dividends: &mut DividendLedger,
    withholding: &WithholdingCalculator,
    index: u32,
    payees: &[Pubkey],
) -> Result<Vec<PushResult>> {
    // ===== VALIDATION PHASE =====

    require!(!payees.is_empty(), DividendError::EmptyBatch);
    require!(
        payees.len() <= ctx.config.max_push_batch,
        DividendError::BatchTooLarge
    );
    require!(
        payees.iter().all(|payee| *payee != Pubkey::default()),
        DividendError::InvalidAddress
    );

    // ===== PRECONDITION PHASE =====

    let module = ctx.module();
    if ctx.config.refresh_before_commit {
        dividends.refresh(&*ctx.ledger, &module, index)?;
    }
    let now = ctx.now();
    let dividend = dividends.get(index)?;
    require!(!dividend.reclaimed, DividendError::AlreadyReclaimed);
    match dividend.status(now) {
        DividendStatus::PendingMaturity => return err!(DividendError::DividendNotMatured),
        DividendStatus::Expired => return err!(DividendError::DividendExpired),
        DividendStatus::Claimable => {}
    }

    let mut seen = HashSet::new();
    let mut outcomes: Vec<Option<PushOutcome>> = Vec::with_capacity(payees.len());
    let mut payable = Vec::new();

    for payee in payees {
        let claimed = if ctx.config.refresh_before_commit {
            dividends.refresh_claim(&*ctx.ledger, &module, index, payee)?
        } else {
            dividends.has_claimed(index, payee)
        };
        let dividend = dividends.get(index)?;

        let skip = if !seen.insert(*payee) {
            Some(SkipReason::DuplicateInBatch)
        } else if claimed {
            Some(SkipReason::AlreadyClaimed)
        } else if dividend.is_excluded(payee) {
            Some(SkipReason::Excluded)
        } else if withholding.calculate(ctx.oracle, dividend, payee)?.is_zero() {
            Some(SkipReason::ZeroBalance)
        } else {
            None
        };

        match skip {
            Some(reason) => outcomes.push(Some(PushOutcome::Skipped(reason))),
            None => {
                payable.push(*payee);
                outcomes.push(None);
            }
        }
    }

    if payable.is_empty() {
        msg!("Dividend {}: nothing to push", index);
        return Ok(collect_results(payees, outcomes));
    }

    // ===== SUBMISSION PHASE =====

    let payable_count = payable.len();
    let receipt = ctx.submit(DividendAction::PushDividendPayment {
        module,
        dividend_index: index,
        payees: payable,
    })?;

    // ===== BOOKING PHASE =====

    let events = ctx.events();
    let mut confirmed: BTreeMap<Pubkey, PushOutcome> = BTreeMap::new();

    let claims: Vec<ClaimPayload> = receipt.decode(events.claimed)?;
    for claim in claims.into_iter().filter(|c| c.dividend_index == index) {
        dividends.record_claim(index, claim.payee, claim.amount, claim.withheld)?;
        confirmed.insert(
            claim.payee,
            PushOutcome::Paid {
                net: claim.amount,
                withheld: claim.withheld,
            },
        );
    }

    if let Some(claim_failed) = events.claim_failed {
        let failures: Vec<ClaimPayload> = receipt.decode(claim_failed)?;
        for failure in failures.into_iter().filter(|c| c.dividend_index == index) {
            msg!("Dividend {}: transfer to {} failed", index, failure.payee);
            confirmed
                .entry(failure.payee)
                .or_insert(PushOutcome::Failed(FailureReason::TransferRejected));
        }
    }

    for (payee, outcome) in payees.iter().zip(outcomes.iter_mut()) {
        if outcome.is_none() {
            *outcome = Some(
                confirmed
                    .get(payee)
                    .copied()
                    .unwrap_or(PushOutcome::Failed(FailureReason::Unconfirmed)),
            );
        }
    }

    let results = collect_results(payees, outcomes);
    let paid = results.iter().filter(|r| r.is_paid()).count();
    msg!(
        "Dividend {}: {} of {} submitted payout(s) confirmed",
        index,
        paid,
        payable_count
    );

    Ok(results)
}

fn collect_results(payees: &[Pubkey], outcomes: Vec<Option<PushOutcome>>) -> Vec<PushResult> {
    payees
        .iter()
        .zip(outcomes)
        .map(|(payee, outcome)| PushResult {
            payee: *payee,
            outcome: outcome.unwrap_or(PushOutcome::Failed(FailureReason::Unconfirmed)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payees() {
        let a = Pubkey::new_from_array([1; 32]);
        let b = Pubkey::new_from_array([2; 32]);
        let raw = format!("{}, {} ,", a, b);
        assert_eq!(parse_payees(&raw).unwrap(), vec![a, b]);

        assert!(parse_payees(" , ").is_err());
        assert!(parse_payees(&format!("{},nope", a)).is_err());
    }
}
