use anchor_lang::prelude::*;
use anchor_lang::Discriminator;

// ══════════════════════════════════════════════════════════════════════════════
// RECEIPT PAYLOADS
// ══════════════════════════════════════════════════════════════════════════════
//
// Both dividend modules emit the same payload layout under currency-specific
// event names. Each currency event wraps exactly one payload, so the bytes after
// the discriminator decode into the payload type whichever module emitted them.

/// Payload of a dividend deposit confirmation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DepositPayload {
    /// Index assigned to the dividend by the module
    pub dividend_index: u32,
    /// Checkpoint the dividend is bound to (0 = live balances)
    pub checkpoint_id: u32,
    /// Ledger time of the deposit
    pub created_at: i64,
    pub maturity: i64,
    pub expiry: i64,
    /// Amount deposited into the module
    pub amount: u64,
    pub name: String,
    /// Exclusions frozen into the dividend
    pub excluded: Vec<Pubkey>,
}

/// Payload of a payout (or failed payout) to one holder
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClaimPayload {
    pub dividend_index: u32,
    /// Holder the payout was addressed to
    pub payee: Pubkey,
    /// Net amount transferred to the holder
    pub amount: u64,
    /// Amount retained as withholding tax
    pub withheld: u64,
}

/// Payload of a principal reclaim
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReclaimPayload {
    pub dividend_index: u32,
    /// Account that received the remaining principal
    pub claimer: Pubkey,
    /// Principal returned to the issuer
    pub amount: u64,
}

/// Payload of a withholding withdrawal
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithholdingPayload {
    pub dividend_index: u32,
    /// Account that received the withheld tax
    pub claimer: Pubkey,
    /// Withheld amount returned to the issuer
    pub withheld_amount: u64,
}

// ══════════════════════════════════════════════════════════════════════════════
// SECURITY TOKEN EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Event emitted when the security token takes a balance snapshot
#[event]
pub struct CheckpointCreated {
    /// Sequential checkpoint id, starting at 1
    pub checkpoint_id: u32,
    /// Ledger time of the snapshot
    pub timestamp: i64,
}

/// Event emitted when a dividend module is attached to the security token
#[event]
pub struct ModuleAttached {
    /// Address of the attached module
    pub module: Pubkey,
    /// Module name it is registered under
    pub module_name: String,
    /// Mint of the currency the module pays out in
    pub currency_mint: Pubkey,
}

// ══════════════════════════════════════════════════════════════════════════════
// MODULE SETTINGS EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Event emitted when the standing exclusion list is replaced
#[event]
pub struct DefaultExclusionsSet {
    pub module: Pubkey,
    /// New standing exclusion list
    pub excluded: Vec<Pubkey>,
}

/// Event emitted when a withholding percentage is set
#[event]
pub struct WithholdingSet {
    pub module: Pubkey,
    /// Holders the percentage applies to
    pub payees: Vec<Pubkey>,
    /// Percentage in [0, 100]
    pub percentage: u8,
}

// ══════════════════════════════════════════════════════════════════════════════
// PRIMARY TOKEN DIVIDEND EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Event emitted when a token dividend is deposited
#[event]
pub struct TokenDividendDeposited {
    pub deposit: DepositPayload,
}

/// Event emitted for each holder paid from a token dividend
#[event]
pub struct TokenDividendClaimed {
    pub claim: ClaimPayload,
}

/// Event emitted when remaining token principal is reclaimed
#[event]
pub struct TokenDividendReclaimed {
    pub reclaim: ReclaimPayload,
}

/// Event emitted when token withholding is withdrawn
#[event]
pub struct TokenDividendWithholdingWithdrawn {
    pub withdrawal: WithholdingPayload,
}

// ══════════════════════════════════════════════════════════════════════════════
// NATIVE COIN DIVIDEND EVENTS
// ══════════════════════════════════════════════════════════════════════════════

/// Event emitted when a native coin dividend is deposited
#[event]
pub struct NativeDividendDeposited {
    pub deposit: DepositPayload,
}

/// Event emitted for each holder paid from a native coin dividend
#[event]
pub struct NativeDividendClaimed {
    pub claim: ClaimPayload,
}

/// Event emitted when a native transfer to a holder fails
/// - The rest of the batch is still committed
#[event]
pub struct NativeDividendClaimFailed {
    pub claim: ClaimPayload,
}

/// Event emitted when remaining native principal is reclaimed
#[event]
pub struct NativeDividendReclaimed {
    pub reclaim: ReclaimPayload,
}

/// Event emitted when native withholding is withdrawn
#[event]
pub struct NativeDividendWithholdingWithdrawn {
    pub withdrawal: WithholdingPayload,
}

// ══════════════════════════════════════════════════════════════════════════════
// EVENT KIND TABLES
// ══════════════════════════════════════════════════════════════════════════════

/// Discriminators of the events a dividend module emits
#[derive(Debug, PartialEq, Eq)]
pub struct EventKinds {
    pub deposited: &'static [u8],
    pub claimed: &'static [u8],
    /// Only modules with per-holder failure reporting emit this
    pub claim_failed: Option<&'static [u8]>,
    pub reclaimed: &'static [u8],
    pub withholding_withdrawn: &'static [u8],
}

pub static TOKEN_DIVIDEND_EVENTS: EventKinds = EventKinds {
    deposited: TokenDividendDeposited::DISCRIMINATOR,
    claimed: TokenDividendClaimed::DISCRIMINATOR,
    claim_failed: None,
    reclaimed: TokenDividendReclaimed::DISCRIMINATOR,
    withholding_withdrawn: TokenDividendWithholdingWithdrawn::DISCRIMINATOR,
};

pub static NATIVE_DIVIDEND_EVENTS: EventKinds = EventKinds {
    deposited: NativeDividendDeposited::DISCRIMINATOR,
    claimed: NativeDividendClaimed::DISCRIMINATOR,
    claim_failed: Some(NativeDividendClaimFailed::DISCRIMINATOR),
    reclaimed: NativeDividendReclaimed::DISCRIMINATOR,
    withholding_withdrawn: NativeDividendWithholdingWithdrawn::DISCRIMINATOR,
};
