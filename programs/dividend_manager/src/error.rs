use anchor_lang::error::Error;
use anchor_lang::prelude::*;

#[error_code]
#[derive(PartialEq, Eq)]
pub enum DividendError {
    // Validation errors
    #[msg("Malformed address")]
    InvalidAddress,
    #[msg("Withholding percentage must be between 0 and 100")]
    InvalidPercentage,
    #[msg("Invalid maturity/expiry window")]
    InvalidWindow,
    #[msg("Invalid amount")]
    InvalidAmount,
    #[msg("Dividend name must be 1 to 32 bytes")]
    InvalidName,
    #[msg("No addresses to push")]
    EmptyBatch,
    #[msg("Too many addresses in a single push")]
    BatchTooLarge,
    #[msg("Too many excluded addresses")]
    TooManyExclusions,

    // Precondition errors
    #[msg("Checkpoint not found")]
    CheckpointNotFound,
    #[msg("Dividend not found")]
    DividendNotFound,
    #[msg("Issuer balance is lower than the dividend amount")]
    InsufficientFunds,
    #[msg("Dividend has not matured yet")]
    DividendNotMatured,
    #[msg("Dividend has expired")]
    DividendExpired,
    #[msg("Dividend has not expired yet")]
    DividendNotExpired,
    #[msg("Dividend already reclaimed")]
    AlreadyReclaimed,
    #[msg("Nothing to reclaim")]
    NothingToReclaim,
    #[msg("Dividend module is not attached")]
    ModuleNotAttached,
    #[msg("Currency does not match the bound dividend module")]
    CurrencyMismatch,

    // Ledger/receipt errors
    #[msg("Expected event missing from receipt")]
    MissingReceiptEvent,
    #[msg("Receipt event could not be decoded")]
    MalformedReceiptEvent,
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
    #[msg("Confirmed amounts would break dividend accounting")]
    AccountingInvariant,
}

/// Which stage of an operation rejected it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any collaborator call.
    Validation,
    /// Rejected after a read-check, before any state-changing call.
    Precondition,
    /// The ledger call itself failed, or its receipt could not be trusted.
    Collaborator,
}

impl DividendError {
    pub fn kind(&self) -> ErrorKind {
        use DividendError::*;
        match self {
            InvalidAddress | InvalidPercentage | InvalidWindow | InvalidAmount | InvalidName
            | EmptyBatch | BatchTooLarge | TooManyExclusions => ErrorKind::Validation,
            CheckpointNotFound | DividendNotFound | InsufficientFunds | DividendNotMatured
            | DividendExpired | DividendNotExpired | AlreadyReclaimed | NothingToReclaim
            | ModuleNotAttached | CurrencyMismatch => ErrorKind::Precondition,
            MissingReceiptEvent | MalformedReceiptEvent | ArithmeticOverflow
            | AccountingInvariant => ErrorKind::Collaborator,
        }
    }

    const ALL: [DividendError; 22] = {
        use DividendError::*;
        [
            InvalidAddress,
            InvalidPercentage,
            InvalidWindow,
            InvalidAmount,
            InvalidName,
            EmptyBatch,
            BatchTooLarge,
            TooManyExclusions,
            CheckpointNotFound,
            DividendNotFound,
            InsufficientFunds,
            DividendNotMatured,
            DividendExpired,
            DividendNotExpired,
            AlreadyReclaimed,
            NothingToReclaim,
            ModuleNotAttached,
            CurrencyMismatch,
            MissingReceiptEvent,
            MalformedReceiptEvent,
            ArithmeticOverflow,
            AccountingInvariant,
        ]
    };

    /// Recovers the dividend error carried by an anchor error, if any.
    pub fn from_anchor(err: &Error) -> Option<DividendError> {
        match err {
            Error::AnchorError(anchor_error) => Self::ALL
                .iter()
                .copied()
                .find(|code| u32::from(*code) == anchor_error.error_code_number),
            Error::ProgramError(_) => None,
        }
    }
}

/// Classifies any error returned by this crate.
///
/// Errors that did not originate here were raised by a collaborator and are
/// reported as `Collaborator`.
pub fn classify(err: &Error) -> ErrorKind {
    DividendError::from_anchor(err)
        .map(|code| code.kind())
        .unwrap_or(ErrorKind::Collaborator)
}
