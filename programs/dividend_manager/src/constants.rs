use anchor_lang::prelude::*;

/**
 * Dividend Manager Constants
 *
 * Default limits and seeds used by the operator core. Runtime overrides for the
 * timing and batch limits live in `DividendConfig`.
 */

#[constant]
/// ===== TIMING CONSTANTS =====

/// Tolerance for maturity times slightly in the past (5 minutes)
/// - A dividend whose maturity is older than now - grace is rejected
/// - Absorbs the delay between the operator choosing "now" and the submission
pub const DEFAULT_MATURITY_GRACE: i64 = 5 * 60; // 5 minutes in seconds

/// Default claim window when the operator only supplies a maturity (10 minutes)
/// - expiry = maturity + DEFAULT_EXPIRY_WINDOW
pub const DEFAULT_EXPIRY_WINDOW: i64 = 10 * 60; // 10 minutes in seconds

/// ===== LIMIT CONSTANTS =====

/// Withholding percentages are whole numbers in [0, MAX_WITHHOLDING_PERCENT]
pub const MAX_WITHHOLDING_PERCENT: u8 = 100;

/// Maximum number of addresses a dividend can exclude
/// - Applies to the standing default and to per-dividend overrides
pub const MAX_EXCLUDED_ADDRESSES: usize = 50;

/// Maximum number of payees pushed in a single submission
pub const MAX_PUSH_BATCH: usize = 32;

/// Dividend names are stored in a 32 byte field on the ledger
pub const MAX_NAME_LEN: usize = 32;

/// Checkpoint id that means "no snapshot, use live balances"
pub const LIVE_CHECKPOINT_ID: u32 = 0;

/// ===== MODULE NAMES =====

/// Dividend module paying out in the primary token
pub const TOKEN_DIVIDEND_MODULE: &str = "TokenDividendCheckpoint";

/// Dividend module paying out in the native coin
pub const NATIVE_DIVIDEND_MODULE: &str = "NativeDividendCheckpoint";

/// ===== PDA SEED CONSTANTS =====

/// Seed for dividend record PDA derivation
/// - Used in: ["dividend", module, index]
pub const DIVIDEND_SEED: &str = "dividend";

/// Seed for claim record PDA derivation
/// - Used in: ["claim", dividend_key, payee_key]
/// - One record per (dividend, payee) pair, prevents double payment
pub const CLAIM_SEED: &str = "claim";

/// Seed for the module settings PDA derivation
/// - Used in: ["settings", module]
/// - Holds the default exclusion list and withholding percentages
pub const SETTINGS_SEED: &str = "settings";
