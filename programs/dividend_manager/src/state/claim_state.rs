use anchor_lang::prelude::*;

use crate::constants::*;

/**
 * Claim record
 *
 * Tracks the payout made to one holder from one dividend. Its existence is what
 * makes a repeated push to the same holder a no-op.
 *
 * Derivation: ["claim", dividend_key, payee_key]
 *
 * Lifecycle:
 * 1. Created when a payout to the holder is confirmed
 * 2. Never updated afterwards; a holder is paid at most once per dividend
 */
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct ClaimStatus {
    /// Dividend the payout belongs to
    pub dividend_index: u32,

    /// Holder that was paid
    pub payee: Pubkey,

    /// Net amount transferred to the holder
    pub claimed_amount: u64,

    /// Amount withheld from the holder's entitlement
    pub withheld_amount: u64,
}

impl ClaimStatus {
    /// Address of the record for `payee` under the dividend record `dividend`
    pub fn address(dividend: &Pubkey, payee: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[CLAIM_SEED.as_bytes(), dividend.as_ref(), payee.as_ref()],
            &crate::ID,
        )
        .0
    }
}
