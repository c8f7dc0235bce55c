use anchor_lang::prelude::*;

use crate::constants::LIVE_CHECKPOINT_ID;
use crate::error::DividendError;
use crate::utils::BalanceOracle;

/// Snapshot of every holder's balance and the total supply
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    /// Sequential id, starting at 1
    pub id: u32,
    /// Time the snapshot was taken (Unix timestamp)
    pub timestamp: i64,
}

/// Balance reference a dividend is computed against
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckpointRef {
    /// No snapshot, live balances
    Live,
    Snapshot(Checkpoint),
}

impl CheckpointRef {
    pub fn id(&self) -> u32 {
        match self {
            CheckpointRef::Live => LIVE_CHECKPOINT_ID,
            CheckpointRef::Snapshot(checkpoint) => checkpoint.id,
        }
    }

    pub fn balance_of(&self, oracle: &dyn BalanceOracle, holder: &Pubkey) -> Result<u64> {
        balance_at_checkpoint(oracle, holder, self.id())
    }

    pub fn total_supply(&self, oracle: &dyn BalanceOracle) -> Result<u64> {
        supply_at_checkpoint(oracle, self.id())
    }
}

/// Holder balance frozen at `checkpoint_id`, or the live balance for id 0
pub fn balance_at_checkpoint(
    oracle: &dyn BalanceOracle,
    holder: &Pubkey,
    checkpoint_id: u32,
) -> Result<u64> {
    match checkpoint_id {
        LIVE_CHECKPOINT_ID => oracle.balance_of(holder),
        id => oracle.balance_at(holder, id),
    }
}

/// Total supply frozen at `checkpoint_id`, or the live supply for id 0
pub fn supply_at_checkpoint(oracle: &dyn BalanceOracle, checkpoint_id: u32) -> Result<u64> {
    match checkpoint_id {
        LIVE_CHECKPOINT_ID => oracle.total_supply(),
        id => oracle.total_supply_at(id),
    }
}

/// Live and checkpoint values side by side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceView {
    pub live: u64,
    pub at_checkpoint: u64,
    pub checkpoint: CheckpointRef,
}

/**
 * Checkpoint registry
 *
 * Local record of the security token's checkpoints. Position i of `times`
 * holds the timestamp of checkpoint i + 1.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckpointRegistry {
    times: Vec<i64>,
}

impl CheckpointRegistry {
    pub fn from_times(times: Vec<i64>) -> Self {
        Self { times }
    }

    /// Highest allocated id, 0 when no checkpoint exists
    pub fn current_id(&self) -> u32 {
        self.times.len() as u32
    }

    pub fn latest(&self) -> Option<Checkpoint> {
        self.list().last()
    }

    /// Resolves an id; 0 is the live sentinel and needs no lookup
    pub fn get(&self, id: u32) -> Result<CheckpointRef> {
        if id == LIVE_CHECKPOINT_ID {
            return Ok(CheckpointRef::Live);
        }
        let timestamp = self
            .times
            .get(id as usize - 1)
            .ok_or(DividendError::CheckpointNotFound)?;
        Ok(CheckpointRef::Snapshot(Checkpoint {
            id,
            timestamp: *timestamp,
        }))
    }

    /// Every checkpoint, ascending by id
    ///
    /// The iterator borrows the registry and can be cloned to restart it.
    pub fn list(&self) -> CheckpointIter<'_> {
        CheckpointIter {
            times: &self.times,
            position: 0,
        }
    }

    /// Appends a confirmed checkpoint
    ///
    /// Returns false if the id does not directly follow the highest known id,
    /// in which case the registry needs a `sync`.
    pub fn record(&mut self, checkpoint: Checkpoint) -> bool {
        if checkpoint.id == self.current_id() + 1 {
            self.times.push(checkpoint.timestamp);
            true
        } else {
            checkpoint.id != 0 && checkpoint.id <= self.current_id()
        }
    }

    /// Reloads checkpoint times from the oracle
    ///
    /// Checkpoints are never removed, so a shorter list than the one already
    /// known is ignored.
    pub fn sync(&mut self, oracle: &dyn BalanceOracle) -> Result<()> {
        let times = oracle.checkpoint_times()?;
        if times.len() >= self.times.len() {
            self.times = times;
        }
        Ok(())
    }

    pub fn explore_account(
        &self,
        oracle: &dyn BalanceOracle,
        holder: &Pubkey,
        id: u32,
    ) -> Result<BalanceView> {
        let checkpoint = self.get(id)?;
        Ok(BalanceView {
            live: oracle.balance_of(holder)?,
            at_checkpoint: checkpoint.balance_of(oracle, holder)?,
            checkpoint,
        })
    }

    pub fn explore_total_supply(&self, oracle: &dyn BalanceOracle, id: u32) -> Result<BalanceView> {
        let checkpoint = self.get(id)?;
        Ok(BalanceView {
            live: oracle.total_supply()?,
            at_checkpoint: checkpoint.total_supply(oracle)?,
            checkpoint,
        })
    }
}

/// Finite, restartable walk over the registry's checkpoints
#[derive(Clone, Debug)]
pub struct CheckpointIter<'a> {
    times: &'a [i64],
    position: usize,
}

impl Iterator for CheckpointIter<'_> {
    type Item = Checkpoint;

    fn next(&mut self) -> Option<Checkpoint> {
        let timestamp = *self.times.get(self.position)?;
        self.position += 1;
        Some(Checkpoint {
            id: self.position as u32,
            timestamp,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.times.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CheckpointIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{classify, ErrorKind};

    #[test]
    fn test_get_resolves_live_sentinel_without_checkpoints() {
        let registry = CheckpointRegistry::default();
        assert_eq!(registry.get(0).unwrap(), CheckpointRef::Live);
        assert_eq!(registry.current_id(), 0);
    }

    #[test]
    fn test_get_beyond_highest_id_fails() {
        let registry = CheckpointRegistry::from_times(vec![10, 20]);
        assert_eq!(
            registry.get(2).unwrap(),
            CheckpointRef::Snapshot(Checkpoint { id: 2, timestamp: 20 })
        );
        let err = registry.get(3).unwrap_err();
        assert_eq!(classify(&err), ErrorKind::Precondition);
    }

    #[test]
    fn test_list_is_ordered_and_restartable() {
        let registry = CheckpointRegistry::from_times(vec![10, 20, 30]);
        let walk = registry.list();
        let ids: Vec<u32> = walk.clone().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(walk.len(), 3);

        // Cloning left the first walk unconsumed
        let times: Vec<i64> = walk.map(|c| c.timestamp).collect();
        assert_eq!(times, vec![10, 20, 30]);
        assert_eq!(registry.latest().map(|c| c.id), Some(3));
    }

    #[test]
    fn test_record_detects_gaps() {
        let mut registry = CheckpointRegistry::default();
        assert!(registry.record(Checkpoint { id: 1, timestamp: 5 }));
        assert!(registry.record(Checkpoint { id: 1, timestamp: 5 }));
        assert!(!registry.record(Checkpoint { id: 3, timestamp: 9 }));
        assert_eq!(registry.current_id(), 1);
    }
}
