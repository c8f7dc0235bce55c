use anchor_lang::prelude::*;
use anchor_spl::token::spl_token::native_mint;

use crate::config::DividendConfig;
use crate::error::DividendError;
use crate::event::EventKinds;
use crate::state::Currency;
use crate::utils::{BalanceOracle, DividendAction, LedgerClient, ModuleInfo, Receipt, UnixClock};

/// The dividend module a session operates on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleBinding {
    pub currency: Currency,
    /// Address of the dividend module
    pub module: Pubkey,
    /// Mint of the payout currency
    /// - The native mint for native coin modules
    pub currency_mint: Pubkey,
}

impl ModuleBinding {
    /// Binds to a module found on the security token
    ///
    /// The module's currency mint has to agree with the requested currency.
    pub fn from_module(currency: Currency, info: ModuleInfo) -> Result<Self> {
        let is_native_mint = info.currency_mint == native_mint::ID;
        match currency {
            Currency::NativeCoin => require!(is_native_mint, DividendError::CurrencyMismatch),
            Currency::PrimaryToken => require!(!is_native_mint, DividendError::CurrencyMismatch),
        }
        Ok(Self {
            currency,
            module: info.address,
            currency_mint: info.currency_mint,
        })
    }

    pub fn events(&self) -> &'static EventKinds {
        self.currency.events()
    }
}

/**
 * Per-call operation context
 *
 * Carries copies of the session facts (issuer, module binding, configuration)
 * and the collaborators one operation talks to. Built fresh for every call by
 * `DividendSession::context`.
 */
pub struct OperatorContext<'a> {
    /// Account that funds dividends and receives reclaimed amounts
    pub issuer: Pubkey,
    pub binding: ModuleBinding,
    pub config: DividendConfig,
    pub ledger: &'a mut dyn LedgerClient,
    pub oracle: &'a dyn BalanceOracle,
    pub clock: &'a dyn UnixClock,
}

impl<'a> OperatorContext<'a> {
    pub fn new(
        issuer: Pubkey,
        binding: ModuleBinding,
        config: DividendConfig,
        ledger: &'a mut dyn LedgerClient,
        oracle: &'a dyn BalanceOracle,
        clock: &'a dyn UnixClock,
    ) -> Self {
        Self {
            issuer,
            binding,
            config,
            ledger,
            oracle,
            clock,
        }
    }

    /// Current time, read from the clock on every call
    pub fn now(&self) -> i64 {
        self.clock.unix_timestamp()
    }

    pub fn module(&self) -> Pubkey {
        self.binding.module
    }

    pub fn events(&self) -> &'static EventKinds {
        self.binding.events()
    }

    /// Submits one state-changing action on behalf of the issuer
    ///
    /// Collaborator errors are returned unchanged.
    pub fn submit(&mut self, action: DividendAction) -> Result<Receipt> {
        #[cfg(feature = "verbose")]
        msg!("Submitting {:?}", action);

        let receipt = self
            .ledger
            .submit(&self.issuer, &action, &self.config.fee_policy)?;

        #[cfg(feature = "verbose")]
        msg!(
            "Confirmed {} with {} event(s)",
            receipt.signature,
            receipt.events.len()
        );

        Ok(receipt)
    }
}
