use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use serde::Serialize;
use thiserror::Error as ThisError;

use super::InventoryItem;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum BusinessInvariantError {
    #[error("pending reward coexists with a scheduled drop (next_drop_at={next_drop_at})")]
    PendingWithSchedule { next_drop_at: u64 },
    #[error("active business has a zero target")]
    ZeroTarget,
    #[error("inactive business still holds a pending reward")]
    InactiveWithPending,
}

/// Persisted passive-income ("business") state.
///
/// At most one unclaimed reward exists at a time: while `pending_reward` is set, no drop is
/// scheduled (`next_drop_at` is `None`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BusinessState {
    pub active: bool,
    pub investment: u64,
    pub target_total: u64,
    pub earned_total: u64,
    pub next_drop_at: Option<u64>,
    pub pending_reward: Option<InventoryItem>,
    pub completed_at: Option<u64>,
    pub rewards_count: u32,
}

impl BusinessState {
    /// True once the business has paid out past its target and stopped.
    pub fn is_completed(&self) -> bool {
        !self.active && self.completed_at.is_some()
    }

    /// True when nothing has ever been started (or the state was reset).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True if a drop is scheduled and its time has passed.
    pub fn is_drop_due(&self, now: u64) -> bool {
        self.active
            && self.pending_reward.is_none()
            && self.next_drop_at.is_some_and(|at| at <= now)
    }

    pub fn validate_invariants(&self) -> Result<(), BusinessInvariantError> {
        if let (Some(_), Some(next_drop_at)) = (&self.pending_reward, self.next_drop_at) {
            return Err(BusinessInvariantError::PendingWithSchedule { next_drop_at });
        }
        if self.active && self.target_total == 0 {
            return Err(BusinessInvariantError::ZeroTarget);
        }
        if !self.active && self.pending_reward.is_some() {
            return Err(BusinessInvariantError::InactiveWithPending);
        }
        Ok(())
    }
}

impl Write for BusinessState {
    fn write(&self, writer: &mut impl BufMut) {
        self.active.write(writer);
        self.investment.write(writer);
        self.target_total.write(writer);
        self.earned_total.write(writer);
        self.next_drop_at.write(writer);
        self.pending_reward.write(writer);
        self.completed_at.write(writer);
        self.rewards_count.write(writer);
    }
}

impl Read for BusinessState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            active: bool::read(reader)?,
            investment: u64::read(reader)?,
            target_total: u64::read(reader)?,
            earned_total: u64::read(reader)?,
            next_drop_at: Option::<u64>::read(reader)?,
            pending_reward: Option::<InventoryItem>::read(reader)?,
            completed_at: Option::<u64>::read(reader)?,
            rewards_count: u32::read(reader)?,
        })
    }
}

impl EncodeSize for BusinessState {
    fn encode_size(&self) -> usize {
        self.active.encode_size()
            + self.investment.encode_size()
            + self.target_total.encode_size()
            + self.earned_total.encode_size()
            + self.next_drop_at.encode_size()
            + self.pending_reward.encode_size()
            + self.completed_at.encode_size()
            + self.rewards_count.encode_size()
    }
}
