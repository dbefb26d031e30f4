use super::super::*;
use std::collections::HashSet;
use tracing::info;

impl<'a, R: Randomness> Layer<'a, R> {
    // === Selling to the house ===

    /// Sell the selected items at catalog price. All-or-nothing: any missing or locked item
    /// aborts the sale before anything is removed. Duplicate ids are sold once.
    ///
    /// Returns `(items sold, proceeds)`.
    pub fn sell_items(&mut self, items: &[Uuid]) -> Result<(usize, u64), GameError> {
        let mut selected = HashSet::with_capacity(items.len());
        let mut proceeds = 0u64;
        for id in items {
            if !selected.insert(*id) {
                continue;
            }
            self.ensure_unlocked(id)?;
            let item = self
                .player
                .find_item(id)
                .ok_or(GameError::ItemNotFound(*id))?;
            proceeds = proceeds.saturating_add(item.price());
        }

        for id in &selected {
            self.player.remove_item(id)?;
        }
        self.player.credit(proceeds);
        if !selected.is_empty() {
            self.touch();
        }
        info!(count = selected.len(), proceeds, "sold items");
        Ok((selected.len(), proceeds))
    }

    /// Sell every unlocked item in the inventory.
    pub fn sell_all(&mut self) -> (usize, u64) {
        let locked = self.locked_item();
        let (kept, sold): (Vec<_>, Vec<_>) = std::mem::take(&mut self.player.inventory)
            .into_iter()
            .partition(|item| Some(item.unique_id) == locked);
        self.player.inventory = kept;

        let proceeds = sold
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.price()));
        self.player.credit(proceeds);
        if !sold.is_empty() {
            self.touch();
        }
        info!(count = sold.len(), proceeds, "sold inventory");
        (sold.len(), proceeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casino::GameRng;
    use crate::mocks::{test_catalog, ScriptedRandomness};

    #[test]
    fn test_sell_items_all_or_nothing() {
        let catalog = test_catalog();
        let config = GameConfig::default();
        let mut layer = Layer::new(&catalog, &config, GameRng::new(3, 3), Player::new(1_000));
        let items = layer.open_case("starter", 3, 0).unwrap();
        let value: u64 = items.iter().map(|item| item.price()).sum();
        assert_eq!(layer.player().balance(), 700);

        let missing = Uuid::from_u64_pair(1, 2);
        assert_eq!(
            layer.sell_items(&[items[0].unique_id, missing]),
            Err(GameError::ItemNotFound(missing))
        );
        assert_eq!(layer.player().inventory.len(), 3);
        assert_eq!(layer.player().balance(), 700);

        let ids: Vec<Uuid> = items.iter().map(|item| item.unique_id).collect();
        let (count, proceeds) = layer.sell_items(&[ids[0], ids[1], ids[2], ids[0]]).unwrap();
        assert_eq!(count, 3);
        assert_eq!(proceeds, value);
        assert_eq!(layer.player().balance(), 700 + value);
        assert!(layer.player().inventory.is_empty());
    }

    #[test]
    fn test_sell_all_keeps_crash_stake() {
        let catalog = test_catalog();
        let config = GameConfig::default();
        // two starter draws -> item 4 (100) and item 6 (200); crash point r = 0.9
        let rng = ScriptedRandomness::new(vec![0.1, 0.9, 0.9]);
        let mut layer = Layer::new(&catalog, &config, rng, Player::new(1_000));
        let items = layer.open_case("starter", 2, 0).unwrap();
        layer.start_crash(&items[0].unique_id, 0).unwrap();

        assert_eq!(layer.sell_all(), (1, 200));
        assert_eq!(layer.player().inventory.len(), 1);
        assert_eq!(layer.player().inventory[0].unique_id, items[0].unique_id);
        assert_eq!(layer.player().balance(), 800 + 200);
    }
}
