use crate::constants::*;
use crate::utils::FeePolicy;

/**
 * Runtime configuration of a dividend session
 *
 * Defaults come from `constants.rs`. The operator may override any field
 * before binding a session; the values are copied into every operation
 * context and never change while an operation runs.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DividendConfig {
    /// Seconds a requested maturity may lie in the past
    pub maturity_grace: i64,

    /// Claim window used when a dividend is created without an explicit expiry
    pub default_expiry_window: i64,

    /// Maximum payees per push submission
    pub max_push_batch: usize,

    /// Maximum addresses in an exclusion list
    pub max_excluded: usize,

    /// Re-read the dividend record from the ledger before each submission
    /// - Catches payouts and reclaims made by other participants
    pub refresh_before_commit: bool,

    /// Attach the dividend module when the security token has none
    pub auto_attach_module: bool,

    /// Passed through to the ledger client on every submission
    pub fee_policy: FeePolicy,
}

impl Default for DividendConfig {
    fn default() -> Self {
        Self {
            maturity_grace: DEFAULT_MATURITY_GRACE,
            default_expiry_window: DEFAULT_EXPIRY_WINDOW,
            max_push_batch: MAX_PUSH_BATCH,
            max_excluded: MAX_EXCLUDED_ADDRESSES,
            refresh_before_commit: true,
            auto_attach_module: false,
            fee_policy: FeePolicy::default(),
        }
    }
}

impl DividendConfig {
    /// Expiry for a dividend maturing at `maturity` when none is given
    pub fn default_expiry(&self, maturity: i64) -> i64 {
        maturity.saturating_add(self.default_expiry_window)
    }
}
