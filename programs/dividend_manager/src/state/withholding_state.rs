use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::DividendError;
use crate::state::{balance_at_checkpoint, supply_at_checkpoint, Dividend, WithholdingEntry};
use crate::utils::BalanceOracle;

/// A holder's share of a dividend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DividendSplit {
    /// Amount paid to the holder
    pub net: u64,
    /// Amount retained as withholding tax
    pub withheld: u64,
}

impl DividendSplit {
    pub const ZERO: DividendSplit = DividendSplit { net: 0, withheld: 0 };

    pub fn is_zero(&self) -> bool {
        self.net == 0 && self.withheld == 0
    }

    /// Full entitlement before withholding
    pub fn entitlement(&self) -> u64 {
        self.net.saturating_add(self.withheld)
    }
}

/// Splits a holder's pro-rata entitlement into net and withheld amounts
///
/// entitlement = total_amount * balance / supply
/// withheld    = entitlement * percentage / 100
/// net         = entitlement - withheld
///
/// Integer arithmetic in u128, rounding down at each division.
pub fn split_entitlement(
    total_amount: u64,
    balance: u64,
    supply: u64,
    percentage: u8,
) -> Result<DividendSplit> {
    require!(percentage <= MAX_WITHHOLDING_PERCENT, DividendError::InvalidPercentage);
    if supply == 0 || balance == 0 {
        return Ok(DividendSplit::ZERO);
    }
    require!(balance <= supply, DividendError::AccountingInvariant);

    let entitlement = (total_amount as u128)
        .checked_mul(balance as u128)
        .ok_or(DividendError::ArithmeticOverflow)?
        / supply as u128;
    let withheld = entitlement
        .checked_mul(percentage as u128)
        .ok_or(DividendError::ArithmeticOverflow)?
        / MAX_WITHHOLDING_PERCENT as u128;
    let net = entitlement - withheld;

    Ok(DividendSplit {
        net: u64::try_from(net).map_err(|_| DividendError::ArithmeticOverflow)?,
        withheld: u64::try_from(withheld).map_err(|_| DividendError::ArithmeticOverflow)?,
    })
}

/// Parses an operator supplied percentage ("0" to "100")
pub fn parse_percentage(raw: &str) -> Result<u8> {
    let percentage: u8 = raw
        .trim()
        .parse()
        .map_err(|_| error!(DividendError::InvalidPercentage))?;
    require!(percentage <= MAX_WITHHOLDING_PERCENT, DividendError::InvalidPercentage);
    Ok(percentage)
}

/**
 * Withholding calculator
 *
 * Per-holder withholding percentages of the bound dividend module. The last
 * confirmed write for an address wins; unset addresses withhold nothing.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WithholdingCalculator {
    percentages: BTreeMap<Pubkey, u8>,
}

impl WithholdingCalculator {
    pub fn percentage_of(&self, payee: &Pubkey) -> u8 {
        self.percentages.get(payee).copied().unwrap_or(0)
    }

    /// Stores a percentage confirmed by the ledger
    pub fn record(&mut self, payees: &[Pubkey], percentage: u8) -> Result<()> {
        require!(percentage <= MAX_WITHHOLDING_PERCENT, DividendError::InvalidPercentage);
        for payee in payees {
            self.percentages.insert(*payee, percentage);
        }
        Ok(())
    }

    /// Replaces the whole table with the entries held by the module
    pub fn load(&mut self, entries: &[WithholdingEntry]) -> Result<()> {
        let mut percentages = BTreeMap::new();
        for entry in entries {
            require!(
                entry.percentage <= MAX_WITHHOLDING_PERCENT,
                DividendError::InvalidPercentage
            );
            percentages.insert(entry.payee, entry.percentage);
        }
        self.percentages = percentages;
        Ok(())
    }

    /// Net and withheld amounts `payee` is entitled to from `dividend`
    ///
    /// Uses balances frozen at the dividend's checkpoint, or live balances when
    /// the dividend was created against checkpoint 0. Excluded addresses get
    /// nothing.
    pub fn calculate(
        &self,
        oracle: &dyn BalanceOracle,
        dividend: &Dividend,
        payee: &Pubkey,
    ) -> Result<DividendSplit> {
        if dividend.is_excluded(payee) {
            return Ok(DividendSplit::ZERO);
        }

        let balance = balance_at_checkpoint(oracle, payee, dividend.checkpoint_id)?;
        let supply = supply_at_checkpoint(oracle, dividend.checkpoint_id)?;

        #[cfg(feature = "verbose")]
        msg!(
            "calculate_dividend: index={}, balance={}, supply={}, percentage={}",
            dividend.index,
            balance,
            supply,
            self.percentage_of(payee)
        );

        split_entitlement(dividend.total_amount, balance, supply, self.percentage_of(payee))
    }
}
