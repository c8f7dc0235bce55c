use anchor_lang::prelude::*;

use crate::constants::*;
use crate::utils::LedgerClient;

/// Withholding percentage the module holds for one payee
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WithholdingEntry {
    pub payee: Pubkey,
    pub percentage: u8,
}

/**
 * Module settings record
 *
 * Standing configuration of a dividend module that outlives any operator
 * session: the default exclusion list copied into new dividends and the
 * per-payee withholding percentages.
 *
 * Derivation: ["settings", module]
 *
 * Lifecycle:
 * 1. Absent until the first exclusion list or withholding percentage is set
 * 2. Rewritten by every confirmed SetDefaultExcluded / SetWithholdingFixed
 */
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct ModuleSettings {
    /// Standing default exclusion list, in submission order
    pub default_excluded: Vec<Pubkey>,

    /// One entry per payee with a percentage set, last write wins
    pub withholding: Vec<WithholdingEntry>,
}

impl ModuleSettings {
    pub fn address(module: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[SETTINGS_SEED.as_bytes(), module.as_ref()], &crate::ID).0
    }

    /// Reads the settings of `module`; a missing record means nothing was set
    pub fn load(ledger: &dyn LedgerClient, module: &Pubkey) -> Result<Self> {
        match ledger.fetch_account(&Self::address(module))? {
            Some(data) => Self::try_deserialize(&mut data.as_slice()),
            None => Ok(Self::default()),
        }
    }

    /// Sets `percentage` for every payee, replacing earlier entries
    pub fn set_withholding(&mut self, payees: &[Pubkey], percentage: u8) {
        for payee in payees {
            match self.withholding.iter_mut().find(|entry| entry.payee == *payee) {
                Some(entry) => entry.percentage = percentage,
                None => self.withholding.push(WithholdingEntry {
                    payee: *payee,
                    percentage,
                }),
            }
        }
    }
}
