//! Authoritative card-position model of one epoch.
//!
//! Every card sits in exactly one stack, either on a board slot or in a hand, and
//! the reverse index always agrees with the stacks. Z values only carry relative
//! order; orientations stay within `[MIN_ORIENTATION, MAX_ORIENTATION]`.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::config::table::{
    DEFAULT_ORIENTATION, FIRST_DECK_SLOT, MAX_ORIENTATION, MIN_ORIENTATION, SECOND_DECK_SLOT,
};
use crate::error::TableError;
use crate::game::types::{CardId, Location, Orientation};

#[derive(Debug, Clone, Default, Serialize)]
pub struct GameState {
    board: BTreeMap<i64, Vec<CardId>>,
    hands: BTreeMap<String, Vec<CardId>>,
    #[serde(rename = "zIndex")]
    z_index: BTreeMap<CardId, i64>,
    orientations: BTreeMap<CardId, Orientation>,
    #[serde(skip)]
    index: BTreeMap<CardId, Location>,
}

impl GameState {
    /// Deals two decks onto their board slots.
    ///
    /// Cards `0..first_len` form the first stack and `first_len..first_len + second_len`
    /// the second. Each board stack is shuffled while z values are handed out, then z
    /// is renumbered from 0 along the board-then-hands traversal.
    pub fn initialize<R: Rng + ?Sized>(first_len: usize, second_len: usize, rng: &mut R) -> Self {
        let first_len = first_len as CardId;
        let total = first_len + second_len as CardId;

        let mut state = GameState::default();
        if first_len > 0 {
            state.board.insert(FIRST_DECK_SLOT, (0..first_len).collect());
        }
        if total > first_len {
            state.board.insert(SECOND_DECK_SLOT, (first_len..total).collect());
        }
        state.build_index();
        state.shuffle_and_assign_z(rng);
        state.renumber_z();
        state
    }

    fn build_index(&mut self) {
        self.index.clear();
        for (slot, stack) in &self.board {
            for card in stack {
                self.index.insert(*card, Location::Board(*slot));
            }
        }
        for (owner, hand) in &self.hands {
            for card in hand {
                self.index.insert(*card, Location::Hand(owner.clone()));
            }
        }
    }

    fn shuffle_and_assign_z<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut next_z = self.z_index.values().copied().max().unwrap_or(0);
        for stack in self.board.values_mut() {
            stack.shuffle(rng);
            for card in stack.iter() {
                self.z_index.entry(*card).or_insert_with(|| {
                    next_z += 1;
                    next_z - 1
                });
                self.orientations.entry(*card).or_insert(DEFAULT_ORIENTATION);
            }
        }
        for hand in self.hands.values() {
            for card in hand {
                self.z_index.entry(*card).or_insert_with(|| {
                    next_z += 1;
                    next_z - 1
                });
                self.orientations.entry(*card).or_insert(DEFAULT_ORIENTATION);
            }
        }
    }

    fn renumber_z(&mut self) {
        let mut next_z = 0;
        for card in self.board.values().chain(self.hands.values()).flatten() {
            self.z_index.insert(*card, next_z);
            next_z += 1;
        }
    }

    /// Moves `card` to `dest` and gives it orientation `orient`, returning where it was.
    ///
    /// A real move, or re-affirming the current orientation in place, appends the card
    /// to the destination stack and raises it above every other card. A pure rotation
    /// or flip leaves stack position and z alone.
    pub fn move_card(
        &mut self,
        card: CardId,
        dest: Location,
        orient: Orientation,
    ) -> Result<Location, TableError> {
        if !(MIN_ORIENTATION..=MAX_ORIENTATION).contains(&orient) {
            return Err(TableError::InvalidOrientation(orient));
        }
        let prior = self
            .index
            .get(&card)
            .cloned()
            .ok_or(TableError::UnknownCard(card))?;

        let same_orient = self.orientations.get(&card) == Some(&orient);
        if prior != dest || same_orient {
            self.detach(card, &prior);
            self.stack_entry(&dest).push(card);
            self.index.insert(card, dest);
            let top = self.max_z() + 1;
            self.z_index.insert(card, top);
        }
        self.orientations.insert(card, orient);

        Ok(prior)
    }

    fn detach(&mut self, card: CardId, from: &Location) {
        match from {
            Location::Board(slot) => remove_card(&mut self.board, slot, card),
            Location::Hand(owner) => remove_card(&mut self.hands, owner, card),
        }
    }

    fn stack_entry(&mut self, at: &Location) -> &mut Vec<CardId> {
        match at {
            Location::Board(slot) => self.board.entry(*slot).or_default(),
            Location::Hand(owner) => self.hands.entry(owner.clone()).or_default(),
        }
    }

    fn stack_mut(&mut self, at: &Location) -> Result<&mut Vec<CardId>, TableError> {
        let stack = match at {
            Location::Board(slot) => self.board.get_mut(slot),
            Location::Hand(owner) => self.hands.get_mut(owner),
        };
        stack.ok_or_else(|| TableError::UnknownStack(at.clone()))
    }

    fn max_z(&self) -> i64 {
        self.z_index.values().copied().max().unwrap_or(0)
    }

    /// The stack at `at`, bottom card first.
    pub fn stack(&self, at: &Location) -> Option<&[CardId]> {
        let stack = match at {
            Location::Board(slot) => self.board.get(slot),
            Location::Hand(owner) => self.hands.get(owner),
        };
        stack.map(Vec::as_slice)
    }

    fn members(&self, at: &Location) -> Result<Vec<CardId>, TableError> {
        self.stack(at)
            .map(<[CardId]>::to_vec)
            .ok_or_else(|| TableError::UnknownStack(at.clone()))
    }

    /// Renumbers z along the stack order, starting at the lowest z any member holds.
    pub fn reassign_z(&mut self, at: &Location) -> Result<(), TableError> {
        let members = self.members(at)?;
        let Some(mut next_z) = members.iter().filter_map(|c| self.z_index.get(c)).min().copied()
        else {
            return Ok(());
        };
        for card in members {
            self.z_index.insert(card, next_z);
            next_z += 1;
        }
        Ok(())
    }

    /// Flips the facing of every card in the stack.
    pub fn reverse_orientations(&mut self, at: &Location) -> Result<(), TableError> {
        for card in self.members(at)? {
            if let Some(orient) = self.orientations.get_mut(&card) {
                *orient = -*orient;
            }
        }
        Ok(())
    }

    /// Gives every card in the stack the orientation of its top card.
    pub fn reset_orientations(&mut self, at: &Location) -> Result<(), TableError> {
        let members = self.members(at)?;
        let Some(canonical) = members.last().and_then(|c| self.orientations.get(c)).copied() else {
            return Ok(());
        };
        for card in members {
            self.orientations.insert(card, canonical);
        }
        Ok(())
    }

    pub fn reverse_stack(&mut self, at: &Location) -> Result<(), TableError> {
        self.stack_mut(at)?.reverse();
        Ok(())
    }

    pub fn shuffle_stack<R: Rng + ?Sized>(
        &mut self,
        at: &Location,
        rng: &mut R,
    ) -> Result<(), TableError> {
        self.stack_mut(at)?.shuffle(rng);
        Ok(())
    }

    pub fn location_of(&self, card: CardId) -> Option<&Location> {
        self.index.get(&card)
    }

    #[cfg(test)]
    pub fn orientation_of(&self, card: CardId) -> Option<Orientation> {
        self.orientations.get(&card).copied()
    }

    pub fn z_of(&self, card: CardId) -> Option<i64> {
        self.z_index.get(&card).copied()
    }

    /// Z values of the stack members, in stack order.
    pub fn z_values(&self, at: &Location) -> Vec<i64> {
        self.stack(at)
            .unwrap_or_default()
            .iter()
            .map(|c| self.z_index.get(c).copied().unwrap_or_default())
            .collect()
    }

    /// Orientations of the stack members, in stack order.
    pub fn orientations(&self, at: &Location) -> Vec<Orientation> {
        self.stack(at)
            .unwrap_or_default()
            .iter()
            .map(|c| self.orientations.get(c).copied().unwrap_or(DEFAULT_ORIENTATION))
            .collect()
    }

    pub fn card_count(&self) -> usize {
        self.index.len()
    }

    #[cfg(test)]
    pub fn board_slots(&self) -> impl Iterator<Item = i64> + '_ {
        self.board.keys().copied()
    }

    #[cfg(test)]
    pub fn hand_owners(&self) -> impl Iterator<Item = &str> {
        self.hands.keys().map(String::as_str)
    }
}

fn remove_card<K: Ord>(stacks: &mut BTreeMap<K, Vec<CardId>>, key: &K, card: CardId) {
    if let Some(stack) = stacks.get_mut(key) {
        if let Some(pos) = stack.iter().position(|c| *c == card) {
            stack.remove(pos);
        }
        if stack.is_empty() {
            stacks.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dealt(first: usize, second: usize) -> GameState {
        GameState::initialize(first, second, &mut StdRng::seed_from_u64(7))
    }

    /// Every card is in exactly one stack and the index points at it.
    fn assert_consistent(state: &GameState) {
        let mut seen = BTreeMap::new();
        for (slot, stack) in &state.board {
            assert!(!stack.is_empty(), "empty board stack {slot}");
            for card in stack {
                assert!(seen.insert(*card, Location::Board(*slot)).is_none(), "card {card} twice");
            }
        }
        for (owner, hand) in &state.hands {
            assert!(!hand.is_empty(), "empty hand {owner}");
            for card in hand {
                let fresh = seen.insert(*card, Location::Hand(owner.clone())).is_none();
                assert!(fresh, "card {card} twice");
            }
        }
        assert_eq!(seen, state.index);
    }

    #[test]
    fn test_initialize_deals_both_decks() {
        let state = dealt(60, 60);
        let mut first = state.stack(&Location::Board(FIRST_DECK_SLOT)).unwrap().to_vec();
        let mut second = state.stack(&Location::Board(SECOND_DECK_SLOT)).unwrap().to_vec();
        first.sort();
        second.sort();
        assert_eq!(first, (0..60).collect::<Vec<_>>());
        assert_eq!(second, (60..120).collect::<Vec<_>>());
        assert_eq!(state.hand_owners().count(), 0);
        assert!(state.orientations.values().all(|o| *o == -1));
        assert_eq!(state.card_count(), 120);
        assert_consistent(&state);
    }

    #[test]
    fn test_initialize_z_follows_traversal() {
        let state = dealt(10, 5);
        let zs: Vec<i64> = state
            .board
            .values()
            .flatten()
            .map(|c| state.z_of(*c).unwrap())
            .collect();
        assert_eq!(zs, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_initialize_skips_empty_deck() {
        let state = dealt(4, 0);
        assert_eq!(state.board_slots().collect::<Vec<_>>(), vec![FIRST_DECK_SLOT]);
        assert_consistent(&state);
    }

    #[test]
    fn test_move_between_slots() {
        let mut state = dealt(10, 10);
        state.move_card(5, Location::Board(3), -1).unwrap();
        assert_eq!(state.stack(&Location::Board(3)), Some(&[5][..]));
        let max_before = state.max_z();

        let prior = state.move_card(5, Location::Board(7), -1).unwrap();

        assert_eq!(prior, Location::Board(3));
        assert!(state.stack(&Location::Board(3)).is_none());
        assert_eq!(state.stack(&Location::Board(7)), Some(&[5][..]));
        assert_eq!(state.z_of(5), Some(max_before + 1));
        assert_eq!(state.orientation_of(5), Some(-1));
        assert_eq!(state.location_of(5), Some(&Location::Board(7)));
        assert_consistent(&state);
    }

    #[test]
    fn test_move_in_place_same_orientation_restacks() {
        let mut state = dealt(6, 0);
        let slot = Location::Board(FIRST_DECK_SLOT);
        let bottom = state.stack(&slot).unwrap()[0];
        let max_before = state.max_z();

        state.move_card(bottom, slot.clone(), -1).unwrap();

        assert_eq!(state.stack(&slot).unwrap().last(), Some(&bottom));
        assert_eq!(state.stack(&slot).unwrap().len(), 6);
        assert_eq!(state.z_of(bottom), Some(max_before + 1));
        assert_consistent(&state);
    }

    #[test]
    fn test_move_in_place_rotation_keeps_position() {
        let mut state = dealt(6, 0);
        let slot = Location::Board(FIRST_DECK_SLOT);
        let before = state.stack(&slot).unwrap().to_vec();
        let card = before[2];
        let z_before = state.z_of(card);

        state.move_card(card, slot.clone(), 2).unwrap();

        assert_eq!(state.stack(&slot).unwrap(), &before[..]);
        assert_eq!(state.z_of(card), z_before);
        assert_eq!(state.orientation_of(card), Some(2));
    }

    #[test]
    fn test_move_into_hand_creates_hand() {
        let mut state = dealt(3, 3);
        let prior = state.move_card(4, Location::Hand("alice".into()), 1).unwrap();
        assert_eq!(prior, Location::Board(SECOND_DECK_SLOT));
        assert_eq!(state.stack(&Location::Hand("alice".into())), Some(&[4][..]));
        assert_consistent(&state);
    }

    #[test]
    fn test_move_rejects_bad_input_without_change() {
        let mut state = dealt(3, 3);
        let snapshot = state.clone();
        assert!(matches!(
            state.move_card(99, Location::Board(1), 1),
            Err(TableError::UnknownCard(99))
        ));
        assert!(matches!(
            state.move_card(1, Location::Board(1), 5),
            Err(TableError::InvalidOrientation(5))
        ));
        assert_eq!(state.index, snapshot.index);
        assert_eq!(state.z_index, snapshot.z_index);
    }

    #[test]
    fn test_double_invert_restores_stack() {
        let mut state = dealt(8, 0);
        let slot = Location::Board(FIRST_DECK_SLOT);
        let card = state.stack(&slot).unwrap()[3];
        state.move_card(card, slot.clone(), 3).unwrap();
        let order = state.stack(&slot).unwrap().to_vec();
        let orients = state.orientations(&slot);

        for _ in 0..2 {
            state.reverse_stack(&slot).unwrap();
            state.reverse_orientations(&slot).unwrap();
            state.reassign_z(&slot).unwrap();
        }

        assert_eq!(state.stack(&slot).unwrap(), &order[..]);
        assert_eq!(state.orientations(&slot), orients);
    }

    #[test]
    fn test_reassign_z_starts_at_stack_minimum() {
        let mut state = dealt(5, 5);
        let slot = Location::Board(SECOND_DECK_SLOT);
        let min_before = state.z_values(&slot).into_iter().min().unwrap();
        state.reverse_stack(&slot).unwrap();
        state.reassign_z(&slot).unwrap();
        let zs = state.z_values(&slot);
        assert_eq!(zs, (min_before..min_before + 5).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_keeps_cards_and_unifies_orientation() {
        let mut state = dealt(12, 0);
        let slot = Location::Board(FIRST_DECK_SLOT);
        let top = *state.stack(&slot).unwrap().last().unwrap();
        state.move_card(top, slot.clone(), 1).unwrap();
        let mut before = state.stack(&slot).unwrap().to_vec();

        state.reset_orientations(&slot).unwrap();
        state.shuffle_stack(&slot, &mut StdRng::seed_from_u64(3)).unwrap();
        state.reassign_z(&slot).unwrap();

        let mut after = state.stack(&slot).unwrap().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert!(state.orientations(&slot).iter().all(|o| *o == 1));
        assert_consistent(&state);
    }

    #[test]
    fn test_stack_ops_on_missing_stack_fail() {
        let mut state = dealt(2, 2);
        let nowhere = Location::Hand("nobody".into());
        assert!(matches!(state.reverse_stack(&nowhere), Err(TableError::UnknownStack(_))));
        assert!(matches!(state.reassign_z(&nowhere), Err(TableError::UnknownStack(_))));
    }

    #[test]
    fn test_serializes_wire_fields() {
        let state = dealt(1, 1);
        let value = serde_json::to_value(&state).unwrap();
        assert!(value.get("zIndex").is_some());
        assert!(value.get("orientations").is_some());
        assert!(value.get("index").is_none());
        assert_eq!(value["board"][FIRST_DECK_SLOT.to_string()], serde_json::json!([0]));
    }
}
