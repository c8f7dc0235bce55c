use anchor_lang::prelude::*;

use crate::config::DividendConfig;
use crate::context::ModuleBinding;
use crate::error::*;
use crate::event::*;
use crate::state::*;
use crate::utils::{DividendAction, LedgerClient, ModuleInfo};

/**
 * Locates the dividend module for a currency, attaching it if allowed
 *
 * @param ledger - Ledger client used for the lookup and the optional attach
 * @param issuer - Account the attach action is submitted for
 * @param currency - Payout currency; decides which module is looked up
 * @param config - Session configuration (`auto_attach_module`, `fee_policy`)
 *
 * Business Logic:
 * - An attached module is bound directly
 * - A missing module is attached only when `auto_attach_module` is set, and
 *   is bound from the confirmed `ModuleAttached` event
 * - Otherwise the session cannot start (`ModuleNotAttached`)
 */
pub fn handle_bind_module(
    ledger: &mut dyn LedgerClient,
    issuer: &Pubkey,
    currency: Currency,
    config: &DividendConfig,
) -> Result<ModuleBinding> {
    let module_name = currency.module_name();

    if let Some(info) = ledger.find_module(module_name)? {
        #[cfg(feature = "verbose")]
        msg!("Found {} at {}", module_name, info.address);
        return ModuleBinding::from_module(currency, info);
    }

    require!(config.auto_attach_module, DividendError::ModuleNotAttached);

    let action = DividendAction::AttachModule {
        module_name: module_name.to_string(),
    };
    let receipt = ledger.submit(issuer, &action, &config.fee_policy)?;
    let attached: ModuleAttached = receipt.event()?;
    require!(
        attached.module_name == module_name,
        DividendError::MalformedReceiptEvent
    );

    msg!("Attached {} at {}", module_name, attached.module);

    ModuleBinding::from_module(
        currency,
        ModuleInfo {
            address: attached.module,
            currency_mint: attached.currency_mint,
        },
    )
}
