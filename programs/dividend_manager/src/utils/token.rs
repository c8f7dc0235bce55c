use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;

use crate::state::Currency;

/// Read-only view of the security token and currency balances
///
/// `balance_at`/`total_supply_at` return balances frozen at a checkpoint,
/// `balance_of`/`total_supply` return live balances.
pub trait BalanceOracle {
    fn balance_of(&self, holder: &Pubkey) -> Result<u64>;

    fn total_supply(&self) -> Result<u64>;

    fn balance_at(&self, holder: &Pubkey, checkpoint_id: u32) -> Result<u64>;

    fn total_supply_at(&self, checkpoint_id: u32) -> Result<u64>;

    /// Timestamps of every checkpoint, position i holding checkpoint i + 1
    fn checkpoint_times(&self) -> Result<Vec<i64>>;

    /// Amount held by a token account
    fn token_balance(&self, token_account: &Pubkey) -> Result<u64>;

    /// Native coin held by a wallet
    fn lamports(&self, owner: &Pubkey) -> Result<u64>;
}

/// Balance of `owner` in the dividend currency
///
/// Primary token balances are read from the owner's associated token account,
/// native coin balances from the wallet itself.
pub fn currency_balance(
    oracle: &dyn BalanceOracle,
    owner: &Pubkey,
    currency: Currency,
    currency_mint: &Pubkey,
) -> Result<u64> {
    match currency {
        Currency::PrimaryToken => {
            let token_account = get_associated_token_address(owner, currency_mint);
            oracle.token_balance(&token_account)
        }
        Currency::NativeCoin => oracle.lamports(owner),
    }
}
