use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, Event};

use crate::error::DividendError;

/// Caller-supplied fee settings, passed to the ledger client untouched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeePolicy {
    /// Priority fee in micro-lamports per compute unit
    pub compute_unit_price: Option<u64>,
    /// Compute unit limit requested for the transaction
    pub compute_unit_limit: Option<u32>,
}

/// A dividend module found on the security token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    pub address: Pubkey,
    /// Mint of the currency the module pays out in
    pub currency_mint: Pubkey,
}

/// State-changing actions the operator can submit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DividendAction {
    AttachModule {
        module_name: String,
    },
    CreateCheckpoint,
    SetDefaultExcluded {
        module: Pubkey,
        excluded: Vec<Pubkey>,
    },
    SetWithholdingFixed {
        module: Pubkey,
        payees: Vec<Pubkey>,
        percentage: u8,
    },
    CreateDividend {
        module: Pubkey,
        name: String,
        checkpoint_id: u32,
        amount: u64,
        maturity: i64,
        expiry: i64,
        excluded: Vec<Pubkey>,
    },
    PushDividendPayment {
        module: Pubkey,
        dividend_index: u32,
        payees: Vec<Pubkey>,
    },
    ReclaimDividend {
        module: Pubkey,
        dividend_index: u32,
    },
    WithdrawWithholding {
        module: Pubkey,
        dividend_index: u32,
    },
}

/// Ledger client used to submit actions and read module accounts
///
/// `submit` is a single blocking call. An `Ok` receipt means the action was
/// committed as a whole; an `Err` means nothing was committed.
pub trait LedgerClient {
    fn submit(
        &mut self,
        issuer: &Pubkey,
        action: &DividendAction,
        fee_policy: &FeePolicy,
    ) -> Result<Receipt>;

    fn find_module(&self, module_name: &str) -> Result<Option<ModuleInfo>>;

    /// Raw account data, `None` if the account does not exist
    fn fetch_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;
}

/// Confirmation of a committed submission
///
/// Holds the raw event data emitted by the transaction, each entry being an
/// anchor event discriminator followed by its borsh payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Receipt {
    pub signature: String,
    pub events: Vec<Vec<u8>>,
}

impl Receipt {
    pub fn new(signature: impl Into<String>, events: Vec<Vec<u8>>) -> Self {
        Self {
            signature: signature.into(),
            events,
        }
    }

    /// Payload bytes of every event carrying `discriminator`, in emission order
    pub fn payloads<'a>(&'a self, discriminator: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.events
            .iter()
            .filter(move |data| data.starts_with(discriminator))
            .map(move |data| &data[discriminator.len()..])
    }

    pub fn decode<T: AnchorDeserialize>(&self, discriminator: &[u8]) -> Result<Vec<T>> {
        self.payloads(discriminator)
            .map(|mut payload| {
                T::deserialize(&mut payload)
                    .map_err(|_| error!(DividendError::MalformedReceiptEvent))
            })
            .collect()
    }

    /// First event carrying `discriminator`; fails if the receipt has none
    pub fn decode_one<T: AnchorDeserialize>(&self, discriminator: &[u8]) -> Result<T> {
        self.decode(discriminator)?
            .into_iter()
            .next()
            .ok_or_else(|| error!(DividendError::MissingReceiptEvent))
    }

    pub fn event<E: Event>(&self) -> Result<E> {
        self.decode_one(E::DISCRIMINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{classify, ErrorKind};
    use crate::event::*;

    #[test]
    fn test_decode_filters_by_discriminator() {
        let checkpoint = CheckpointCreated { checkpoint_id: 3, timestamp: 1_700_000_000 };
        let claim = ClaimPayload {
            dividend_index: 0,
            payee: Pubkey::new_from_array([7; 32]),
            amount: 18,
            withheld: 2,
        };
        let receipt = Receipt::new(
            "sig",
            vec![checkpoint.data(), NativeDividendClaimed { claim: claim.clone() }.data()],
        );

        let decoded: CheckpointCreated = receipt.event().unwrap();
        assert_eq!(decoded.checkpoint_id, 3);

        let claims: Vec<ClaimPayload> = receipt.decode(NATIVE_DIVIDEND_EVENTS.claimed).unwrap();
        assert_eq!(claims, vec![claim]);

        // Same payload layout, different event name: not matched
        let token_claims: Vec<ClaimPayload> = receipt.decode(TOKEN_DIVIDEND_EVENTS.claimed).unwrap();
        assert!(token_claims.is_empty());
    }

    #[test]
    fn test_missing_and_malformed_events() {
        let receipt = Receipt::default();
        let err = receipt.event::<CheckpointCreated>().err().unwrap();
        assert_eq!(classify(&err), ErrorKind::Collaborator);

        let mut truncated = CheckpointCreated { checkpoint_id: 1, timestamp: 5 }.data();
        truncated.truncate(truncated.len() - 4);
        let receipt = Receipt::new("sig", vec![truncated]);
        assert!(receipt.event::<CheckpointCreated>().is_err());
    }
}
