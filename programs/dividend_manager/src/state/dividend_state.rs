use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::DividendError;
use crate::event::{EventKinds, NATIVE_DIVIDEND_EVENTS, TOKEN_DIVIDEND_EVENTS};
use crate::state::ExclusionSet;

/// Currency a dividend is paid out in
///
/// Each currency is served by its own dividend module, which emits its own
/// set of receipt events.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Currency {
    #[default]
    PrimaryToken,
    NativeCoin,
}

impl Currency {
    pub fn module_name(self) -> &'static str {
        match self {
            Currency::PrimaryToken => TOKEN_DIVIDEND_MODULE,
            Currency::NativeCoin => NATIVE_DIVIDEND_MODULE,
        }
    }

    pub fn events(self) -> &'static EventKinds {
        match self {
            Currency::PrimaryToken => &TOKEN_DIVIDEND_EVENTS,
            Currency::NativeCoin => &NATIVE_DIVIDEND_EVENTS,
        }
    }
}

/// Position of a dividend in its claim window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DividendStatus {
    /// now < maturity
    PendingMaturity,
    /// maturity <= now < expiry
    Claimable,
    /// now >= expiry
    Expired,
}

/**
 * Dividend record
 *
 * One value pool distributed to the holders of a checkpoint. Mirrors the record
 * kept by the dividend module on the ledger.
 *
 * Derivation: ["dividend", module, index]
 *
 * Lifecycle:
 * 1. Created once, when the deposit is confirmed
 * 2. claimed_amount/withheld_amount grow with every confirmed payout
 * 3. withheld_reclaimed_amount grows with every withholding withdrawal
 * 4. reclaimed latches to true when the remaining principal is recovered
 *
 * Status is never stored; it is derived from the clock on every query.
 */
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Dividend {
    /// Sequential index within the dividend module
    pub index: u32,

    /// Name given by the issuer (1 to 32 bytes)
    pub name: String,

    pub currency: Currency,

    /// Checkpoint whose balances decide entitlement
    /// - 0 means live balances are used
    pub checkpoint_id: u32,

    /// Creation time (Unix timestamp)
    pub created_at: i64,

    /// Payouts are allowed from this time on (Unix timestamp)
    pub maturity: i64,

    /// Payouts stop and reclaim opens at this time (Unix timestamp)
    /// - Always strictly greater than maturity
    pub expiry: i64,

    /// Amount deposited for distribution
    pub total_amount: u64,

    /// Net amount paid out to holders
    pub claimed_amount: u64,

    /// Amount withheld as tax from holders' entitlements
    pub withheld_amount: u64,

    /// Part of the withheld amount already returned to the issuer
    pub withheld_reclaimed_amount: u64,

    /// Set once the remaining principal has been reclaimed
    pub reclaimed: bool,

    /// Addresses ineligible for this dividend, frozen at creation
    pub exclusions: ExclusionSet,
}

impl Dividend {
    /// Address of the record kept by `module`
    pub fn address(module: &Pubkey, index: u32) -> Pubkey {
        Pubkey::find_program_address(
            &[DIVIDEND_SEED.as_bytes(), module.as_ref(), &index.to_le_bytes()],
            &crate::ID,
        )
        .0
    }

    pub fn status(&self, now: i64) -> DividendStatus {
        if now < self.maturity {
            DividendStatus::PendingMaturity
        } else if now < self.expiry {
            DividendStatus::Claimable
        } else {
            DividendStatus::Expired
        }
    }

    pub fn is_matured(&self, now: i64) -> bool {
        self.status(now) != DividendStatus::PendingMaturity
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.status(now) == DividendStatus::Expired
    }

    pub fn is_excluded(&self, address: &Pubkey) -> bool {
        self.exclusions.contains(address)
    }

    /// Principal neither paid out nor withheld
    /// - Withheld amounts are recovered through withholding withdrawal instead
    pub fn remaining_principal(&self) -> u64 {
        self.total_amount
            .saturating_sub(self.claimed_amount)
            .saturating_sub(self.withheld_amount)
    }

    /// Withheld tax not yet returned to the issuer
    pub fn remaining_withheld(&self) -> u64 {
        self.withheld_amount
            .saturating_sub(self.withheld_reclaimed_amount)
    }

    /// Books one confirmed payout
    pub fn apply_claim(&mut self, net: u64, withheld: u64) -> Result<()> {
        let claimed_amount = self
            .claimed_amount
            .checked_add(net)
            .ok_or(DividendError::ArithmeticOverflow)?;
        let withheld_amount = self
            .withheld_amount
            .checked_add(withheld)
            .ok_or(DividendError::ArithmeticOverflow)?;
        let allocated = claimed_amount
            .checked_add(withheld_amount)
            .ok_or(DividendError::ArithmeticOverflow)?;
        require!(allocated <= self.total_amount, DividendError::AccountingInvariant);

        self.claimed_amount = claimed_amount;
        self.withheld_amount = withheld_amount;
        Ok(())
    }

    /// Books one confirmed withholding withdrawal
    pub fn apply_withholding_withdrawal(&mut self, amount: u64) -> Result<()> {
        let withheld_reclaimed_amount = self
            .withheld_reclaimed_amount
            .checked_add(amount)
            .ok_or(DividendError::ArithmeticOverflow)?;
        require!(
            withheld_reclaimed_amount <= self.withheld_amount,
            DividendError::AccountingInvariant
        );

        self.withheld_reclaimed_amount = withheld_reclaimed_amount;
        Ok(())
    }
}

type Predicate = fn(&Dividend, i64) -> bool;

/// Structured dividend filter
///
/// Each field left `None` matches any dividend; a `Some(b)` field only matches
/// dividends whose corresponding predicate evaluates to `b`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DividendFilter {
    pub matured: Option<bool>,
    pub expired: Option<bool>,
    pub reclaimed: Option<bool>,
    pub with_remaining: Option<bool>,
    pub with_remaining_withheld: Option<bool>,
}

impl DividendFilter {
    /// Dividends payouts can currently be pushed to
    pub fn pushable() -> Self {
        Self {
            matured: Some(true),
            expired: Some(false),
            reclaimed: Some(false),
            with_remaining: Some(true),
            ..Self::default()
        }
    }

    /// Expired dividends whose principal has not been reclaimed
    pub fn reclaimable() -> Self {
        Self {
            expired: Some(true),
            reclaimed: Some(false),
            ..Self::default()
        }
    }

    /// Dividends with withheld tax left to withdraw
    pub fn with_withholding() -> Self {
        Self {
            with_remaining_withheld: Some(true),
            ..Self::default()
        }
    }

    fn checks(&self) -> [(Option<bool>, Predicate); 5] {
        [
            (self.matured, |d: &Dividend, now: i64| d.is_matured(now)),
            (self.expired, |d: &Dividend, now: i64| d.is_expired(now)),
            (self.reclaimed, |d: &Dividend, _: i64| d.reclaimed),
            (self.with_remaining, |d: &Dividend, _: i64| d.remaining_principal() > 0),
            (
                self.with_remaining_withheld,
                |d: &Dividend, _: i64| d.remaining_withheld() > 0,
            ),
        ]
    }

    pub fn matches(&self, dividend: &Dividend, now: i64) -> bool {
        self.checks().iter().all(|(expected, predicate)| {
            expected.map_or(true, |want| predicate(dividend, now) == want)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dividend(maturity: i64, expiry: i64) -> Dividend {
        Dividend {
            name: "Q3".to_string(),
            maturity,
            expiry,
            total_amount: 100,
            ..Dividend::default()
        }
    }

    #[test]
    fn test_status_follows_the_clock() {
        let d = dividend(100, 200);
        assert_eq!(d.status(99), DividendStatus::PendingMaturity);
        assert_eq!(d.status(100), DividendStatus::Claimable);
        assert_eq!(d.status(199), DividendStatus::Claimable);
        assert_eq!(d.status(200), DividendStatus::Expired);
    }

    #[test]
    fn test_apply_claim_keeps_allocation_within_total() {
        let mut d = dividend(0, 10);
        d.apply_claim(30, 0).unwrap();
        d.apply_claim(18, 2).unwrap();
        assert_eq!((d.claimed_amount, d.withheld_amount), (48, 2));
        assert_eq!(d.remaining_principal(), 50);

        assert!(d.apply_claim(50, 1).is_err());
        assert_eq!((d.claimed_amount, d.withheld_amount), (48, 2));
    }

    #[test]
    fn test_withholding_withdrawal_is_bounded() {
        let mut d = dividend(0, 10);
        d.apply_claim(18, 2).unwrap();
        assert!(d.apply_withholding_withdrawal(3).is_err());
        d.apply_withholding_withdrawal(2).unwrap();
        assert_eq!(d.remaining_withheld(), 0);
    }

    #[test]
    fn test_filter_absent_fields_match_anything() {
        let d = dividend(100, 200);
        assert!(DividendFilter::default().matches(&d, 0));
        assert!(DividendFilter::default().matches(&d, 500));
    }

    #[test]
    fn test_filter_presets() {
        let mut d = dividend(100, 200);
        assert!(!DividendFilter::pushable().matches(&d, 50));
        assert!(DividendFilter::pushable().matches(&d, 150));
        assert!(!DividendFilter::pushable().matches(&d, 250));

        assert!(DividendFilter::reclaimable().matches(&d, 250));
        d.reclaimed = true;
        assert!(!DividendFilter::reclaimable().matches(&d, 250));

        assert!(!DividendFilter::with_withholding().matches(&d, 150));
        d.apply_claim(9, 1).unwrap();
        assert!(DividendFilter::with_withholding().matches(&d, 150));
    }

    #[test]
    fn test_filter_negated_field() {
        let d = dividend(100, 200);
        let not_matured = DividendFilter {
            matured: Some(false),
            ..DividendFilter::default()
        };
        assert!(not_matured.matches(&d, 10));
        assert!(!not_matured.matches(&d, 100));
    }

    #[test]
    fn test_currency_event_tables_differ() {
        assert_ne!(
            Currency::PrimaryToken.events().claimed,
            Currency::NativeCoin.events().claimed
        );
        assert!(Currency::PrimaryToken.events().claim_failed.is_none());
        assert!(Currency::NativeCoin.events().claim_failed.is_some());
    }
}
