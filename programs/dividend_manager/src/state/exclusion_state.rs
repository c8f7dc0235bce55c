use std::collections::HashSet;
use std::str::FromStr;

use anchor_lang::prelude::*;

use crate::error::DividendError;

/**
 * Exclusion set
 *
 * Ordered, deduplicated list of well-formed addresses that are not entitled to a
 * dividend. Only built through validation, and never mutated once bound to a
 * dividend.
 */
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    addresses: Vec<Pubkey>,
}

impl ExclusionSet {
    /// Builds a set from already parsed addresses, keeping the first occurrence
    /// of each and dropping the all-zero address
    pub fn from_addresses(addresses: impl IntoIterator<Item = Pubkey>) -> Self {
        let mut seen = HashSet::new();
        let addresses = addresses
            .into_iter()
            .filter(|address| *address != Pubkey::default() && seen.insert(*address))
            .collect();
        Self { addresses }
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.addresses.contains(address)
    }

    pub fn as_slice(&self) -> &[Pubkey] {
        &self.addresses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pubkey> {
        self.addresses.iter()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Outcome of validating a raw address list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionReport {
    pub set: ExclusionSet,
    /// Number of malformed entries that were dropped
    pub rejected: usize,
}

/// External list of candidate addresses, one per record
pub trait ExclusionSource {
    fn records(&self) -> Result<Vec<String>>;
}

/// Exclusion records held in memory as text, one address per line
///
/// Blank lines are skipped and surrounding whitespace is trimmed.
#[derive(Clone, Copy, Debug)]
pub struct LineSource<'a> {
    text: &'a str,
}

impl<'a> LineSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl ExclusionSource for LineSource<'_> {
    fn records(&self) -> Result<Vec<String>> {
        Ok(self
            .text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

/// Parses one raw address, rejecting malformed and all-zero addresses
pub fn parse_address(raw: &str) -> Result<Pubkey> {
    let address = Pubkey::from_str(raw.trim()).map_err(|_| error!(DividendError::InvalidAddress))?;
    require!(address != Pubkey::default(), DividendError::InvalidAddress);
    Ok(address)
}

/// Validates a raw address list
///
/// Malformed entries are dropped and counted, duplicates keep their first
/// position. Fails only if more than `limit` valid addresses remain.
pub fn validate_exclusions<S: AsRef<str>>(raw: &[S], limit: usize) -> Result<ExclusionReport> {
    let mut rejected = 0;
    let parsed: Vec<Pubkey> = raw
        .iter()
        .filter_map(|entry| match parse_address(entry.as_ref()) {
            Ok(address) => Some(address),
            Err(_) => {
                rejected += 1;
                None
            }
        })
        .collect();

    let set = ExclusionSet::from_addresses(parsed);
    require!(set.len() <= limit, DividendError::TooManyExclusions);

    #[cfg(feature = "verbose")]
    msg!("Exclusions validated: {} kept, {} rejected", set.len(), rejected);

    Ok(ExclusionReport { set, rejected })
}

/**
 * Exclusion set manager
 *
 * Holds the standing default exclusion list of the bound dividend module and
 * materializes one-time override lists. Dividends copy whichever list they are
 * created with, so replacing the default never affects existing dividends.
 */
#[derive(Clone, Debug)]
pub struct ExclusionSetManager {
    default: ExclusionSet,
    max_excluded: usize,
}

impl ExclusionSetManager {
    pub fn new(max_excluded: usize) -> Self {
        Self {
            default: ExclusionSet::default(),
            max_excluded,
        }
    }

    pub fn get_default(&self) -> &ExclusionSet {
        &self.default
    }

    pub fn max_excluded(&self) -> usize {
        self.max_excluded
    }

    /// Validates a per-dividend list without touching the standing default
    pub fn materialize_override<S: AsRef<str>>(&self, raw: &[S]) -> Result<ExclusionReport> {
        validate_exclusions(raw, self.max_excluded)
    }

    pub fn materialize_from(&self, source: &dyn ExclusionSource) -> Result<ExclusionReport> {
        let records = source.records()?;
        self.materialize_override(&records)
    }

    /// Replaces the standing default with a list confirmed by the ledger
    pub fn replace_default(&mut self, set: ExclusionSet) {
        self.default = set;
    }
}
