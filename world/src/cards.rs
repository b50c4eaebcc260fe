//! Seeded card dealing.

use card_defence_core::{Card, CardId, CardKind, TowerType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deals cards uniformly from the static catalog.
#[derive(Debug)]
pub(crate) struct CardDealer {
    rng: ChaCha8Rng,
    catalog: Vec<CardKind>,
    next_card: u64,
}

impl CardDealer {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            catalog: CardKind::catalog(),
            next_card: 0,
        }
    }

    fn mint(&mut self, kind: CardKind) -> Card {
        let card = Card::new(CardId::new(self.next_card), kind);
        self.next_card += 1;
        card
    }

    /// Draws `count` cards with replacement.
    pub(crate) fn deal(&mut self, count: usize) -> Vec<Card> {
        (0..count)
            .map(|_| {
                let kind = self.catalog[self.rng.gen_range(0..self.catalog.len())];
                self.mint(kind)
            })
            .collect()
    }

    /// Exactly one tower card per tower type.
    pub(crate) fn starting_inventory(&mut self) -> Vec<Card> {
        TowerType::ALL
            .iter()
            .map(|kind| self.mint(CardKind::Tower(*kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_inventory_holds_every_tower_once() {
        let mut dealer = CardDealer::new(1);
        let inventory = dealer.starting_inventory();
        let kinds: Vec<_> = inventory.iter().map(|card| card.kind).collect();
        let expected: Vec<_> = TowerType::ALL.iter().copied().map(CardKind::Tower).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn dealt_cards_have_unique_ids_and_replay_with_the_seed() {
        let mut first = CardDealer::new(42);
        let mut second = CardDealer::new(42);
        let hand = first.deal(12);
        assert_eq!(hand, second.deal(12));

        let mut ids: Vec<_> = hand.iter().map(|card| card.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }
}
