use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use serde::Serialize;
use thiserror::Error as ThisError;
use uuid::Uuid;

use super::{BusinessInvariantError, BusinessState, InventoryItem, INITIAL_BALANCE, MAX_INVENTORY_ITEMS};

/// Balance or inventory operation that was refused. No state changes when one is returned.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error("item {0} not found in inventory")]
    ItemNotFound(Uuid),
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum PlayerInvariantError {
    #[error("inventory too large (len={len}, max={max})")]
    InventoryTooLarge { len: usize, max: usize },
    #[error("duplicate inventory item {0}")]
    DuplicateItem(Uuid),
    #[error("business: {0}")]
    Business(#[from] BusinessInvariantError),
}

/// Lifetime counters. Only ever incremented.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub cases_opened: u64,
    pub total_spent: u64,
    pub total_won: u64,
}

impl Stats {
    pub fn record_cases_opened(&mut self, count: u64) {
        self.cases_opened = self.cases_opened.saturating_add(count);
    }

    pub fn record_spend(&mut self, amount: u64) {
        self.total_spent = self.total_spent.saturating_add(amount);
    }

    pub fn record_win(&mut self, amount: u64) {
        self.total_won = self.total_won.saturating_add(amount);
    }
}

impl Write for Stats {
    fn write(&self, writer: &mut impl BufMut) {
        self.cases_opened.write(writer);
        self.total_spent.write(writer);
        self.total_won.write(writer);
    }
}

impl Read for Stats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            cases_opened: u64::read(reader)?,
            total_spent: u64::read(reader)?,
            total_won: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Stats {
    fn encode_size(&self) -> usize {
        self.cases_opened.encode_size()
            + self.total_spent.encode_size()
            + self.total_won.encode_size()
    }
}

/// Everything persisted for one player: the currency/inventory ledger, stats and business.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Player {
    pub balance: u64,
    /// Most recently obtained first.
    pub inventory: Vec<InventoryItem>,
    pub stats: Stats,
    pub business: BusinessState,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(INITIAL_BALANCE)
    }
}

impl Player {
    pub fn new(initial_balance: u64) -> Self {
        Self {
            balance: initial_balance,
            inventory: Vec::new(),
            stats: Stats::default(),
            business: BusinessState::default(),
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    pub fn debit(&mut self, amount: u64) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                have: self.balance,
                need: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Whether `count` more items fit under [`MAX_INVENTORY_ITEMS`].
    pub fn has_room_for(&self, count: usize) -> bool {
        self.inventory.len().saturating_add(count) <= MAX_INVENTORY_ITEMS
    }

    /// Add an item to the front of the inventory.
    pub fn add_item(&mut self, item: InventoryItem) {
        self.inventory.insert(0, item);
    }

    pub fn find_item(&self, unique_id: &Uuid) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| &item.unique_id == unique_id)
    }

    pub fn remove_item(&mut self, unique_id: &Uuid) -> Result<InventoryItem, LedgerError> {
        let index = self
            .inventory
            .iter()
            .position(|item| &item.unique_id == unique_id)
            .ok_or(LedgerError::ItemNotFound(*unique_id))?;
        Ok(self.inventory.remove(index))
    }

    /// Total catalog value of the inventory.
    pub fn inventory_value(&self) -> u64 {
        self.inventory
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.price()))
    }

    pub fn validate_invariants(&self) -> Result<(), PlayerInvariantError> {
        if self.inventory.len() > MAX_INVENTORY_ITEMS {
            return Err(PlayerInvariantError::InventoryTooLarge {
                len: self.inventory.len(),
                max: MAX_INVENTORY_ITEMS,
            });
        }
        let mut seen = std::collections::HashSet::with_capacity(self.inventory.len());
        for item in &self.inventory {
            if !seen.insert(item.unique_id) {
                return Err(PlayerInvariantError::DuplicateItem(item.unique_id));
            }
        }
        self.business.validate_invariants()?;
        Ok(())
    }
}

impl Write for Player {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        self.inventory.write(writer);
        self.stats.write(writer);
        self.business.write(writer);
    }
}

impl Read for Player {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balance: u64::read(reader)?,
            inventory: Vec::<InventoryItem>::read_range(reader, 0..=MAX_INVENTORY_ITEMS)?,
            stats: Stats::read(reader)?,
            business: BusinessState::read(reader)?,
        })
    }
}

impl EncodeSize for Player {
    fn encode_size(&self) -> usize {
        self.balance.encode_size()
            + self.inventory.encode_size()
            + self.stats.encode_size()
            + self.business.encode_size()
    }
}
