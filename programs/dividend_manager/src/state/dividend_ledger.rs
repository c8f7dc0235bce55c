use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::error::DividendError;
use crate::state::{ClaimStatus, Dividend, DividendFilter, DividendStatus};
use crate::utils::LedgerClient;

/**
 * Dividend ledger
 *
 * Local mirror of the dividend records and claim records kept by the bound
 * dividend module. Entries are only inserted or updated from confirmed
 * receipts, or replaced wholesale by a `refresh` from the ledger.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DividendLedger {
    dividends: BTreeMap<u32, Dividend>,
    claims: BTreeMap<(u32, Pubkey), ClaimStatus>,
}

impl DividendLedger {
    pub fn get(&self, index: u32) -> Result<&Dividend> {
        self.dividends
            .get(&index)
            .ok_or_else(|| error!(DividendError::DividendNotFound))
    }

    pub fn get_mut(&mut self, index: u32) -> Result<&mut Dividend> {
        self.dividends
            .get_mut(&index)
            .ok_or_else(|| error!(DividendError::DividendNotFound))
    }

    /// Every known dividend, ascending by index
    pub fn iter(&self) -> impl Iterator<Item = &Dividend> {
        self.dividends.values()
    }

    pub fn len(&self) -> usize {
        self.dividends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dividends.is_empty()
    }

    /// Index the module will most likely assign to the next deposit
    pub fn next_index(&self) -> u32 {
        self.dividends
            .keys()
            .next_back()
            .map_or(0, |index| index + 1)
    }

    pub fn status(&self, index: u32, now: i64) -> Result<DividendStatus> {
        Ok(self.get(index)?.status(now))
    }

    pub fn select(&self, filter: DividendFilter, now: i64) -> impl Iterator<Item = &Dividend> {
        self.iter().filter(move |dividend| filter.matches(dividend, now))
    }

    pub fn by_checkpoint(&self, checkpoint_id: u32) -> impl Iterator<Item = &Dividend> {
        self.iter()
            .filter(move |dividend| dividend.checkpoint_id == checkpoint_id)
    }

    pub fn claim_of(&self, index: u32, payee: &Pubkey) -> Option<&ClaimStatus> {
        self.claims.get(&(index, *payee))
    }

    pub fn has_claimed(&self, index: u32, payee: &Pubkey) -> bool {
        self.claims.contains_key(&(index, *payee))
    }

    /// Claim records of one dividend, ordered by payee
    pub fn claims_of(&self, index: u32) -> impl Iterator<Item = &ClaimStatus> {
        self.claims
            .range((index, Pubkey::default())..)
            .take_while(move |((claim_index, _), _)| *claim_index == index)
            .map(|(_, claim)| claim)
    }

    /// Stores a dividend confirmed by a deposit receipt
    pub fn insert(&mut self, dividend: Dividend) {
        self.dividends.insert(dividend.index, dividend);
    }

    /// Books a confirmed payout on the dividend and records the claim
    ///
    /// A payee already recorded is left untouched.
    pub fn record_claim(&mut self, index: u32, payee: Pubkey, net: u64, withheld: u64) -> Result<()> {
        if self.has_claimed(index, &payee) {
            return Ok(());
        }
        self.get_mut(index)?.apply_claim(net, withheld)?;
        self.claims.insert(
            (index, payee),
            ClaimStatus {
                dividend_index: index,
                payee,
                claimed_amount: net,
                withheld_amount: withheld,
            },
        );
        Ok(())
    }

    /// Replaces the local mirror with the record held by `module`
    ///
    /// Counters and the reclaimed latch may have moved since the last receipt
    /// if another participant acted on the dividend.
    pub fn refresh(&mut self, ledger: &dyn LedgerClient, module: &Pubkey, index: u32) -> Result<&Dividend> {
        let data = ledger
            .fetch_account(&Dividend::address(module, index))?
            .ok_or_else(|| error!(DividendError::DividendNotFound))?;
        let dividend = Dividend::try_deserialize(&mut data.as_slice())?;
        require!(dividend.index == index, DividendError::AccountingInvariant);

        #[cfg(feature = "verbose")]
        msg!(
            "Dividend {} refreshed: claimed={}, withheld={}, reclaimed={}",
            index,
            dividend.claimed_amount,
            dividend.withheld_amount,
            dividend.reclaimed
        );

        self.dividends.insert(index, dividend);
        self.get(index)
    }

    /// Loads every dividend record held by `module`
    ///
    /// Indexes are sequential, so the walk stops at the first missing record.
    /// Returns the number of dividends known afterwards.
    pub fn sync(&mut self, ledger: &dyn LedgerClient, module: &Pubkey) -> Result<usize> {
        let mut index = 0;
        while let Some(data) = ledger.fetch_account(&Dividend::address(module, index))? {
            let dividend = Dividend::try_deserialize(&mut data.as_slice())?;
            require!(dividend.index == index, DividendError::AccountingInvariant);
            self.dividends.insert(index, dividend);
            index += 1;
        }

        #[cfg(feature = "verbose")]
        msg!("Dividends synced: {} on module {}", index, module);

        Ok(self.len())
    }

    /// Picks up a claim record created outside this session
    ///
    /// Returns true if `payee` has been paid from the dividend.
    pub fn refresh_claim(
        &mut self,
        ledger: &dyn LedgerClient,
        module: &Pubkey,
        index: u32,
        payee: &Pubkey,
    ) -> Result<bool> {
        if self.has_claimed(index, payee) {
            return Ok(true);
        }
        let address = ClaimStatus::address(&Dividend::address(module, index), payee);
        match ledger.fetch_account(&address)? {
            Some(data) => {
                let claim = ClaimStatus::try_deserialize(&mut data.as_slice())?;
                self.claims.insert((index, *payee), claim);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
