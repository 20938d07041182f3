//! One dealt table: the card model plus the resolved deck it was dealt from.
//!
//! Epochs are never patched from one deck pair to another: reset and deck selection
//! deal a complete new epoch and swap it in only once it is fully built.

use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::error::TableError;
use crate::game::assets::DeckResolver;
use crate::game::deck::{DeckCatalog, TableDeck};
use crate::game::state::GameState;

#[derive(Debug, Clone)]
pub struct Epoch {
    /// Catalog index of the deck on the first board slot.
    pub first: usize,
    /// Catalog index of the deck on the second board slot.
    pub second: usize,
    pub deck: TableDeck,
    pub state: GameState,
}

#[derive(Serialize)]
struct EpochView<'a> {
    #[serde(flatten)]
    deck: &'a TableDeck,
    #[serde(flatten)]
    state: &'a GameState,
}

impl Epoch {
    pub fn deal<R: Rng + ?Sized>(
        catalog: &DeckCatalog,
        resolver: &dyn DeckResolver,
        first: usize,
        second: usize,
        rng: &mut R,
    ) -> Result<Self, TableError> {
        let first_len = catalog.get(first)?.cards.len();
        let second_len = catalog.get(second)?.cards.len();
        let deck = resolver.resolve(catalog.combine(first, second)?)?;
        let state = GameState::initialize(first_len, second_len, rng);
        Ok(Self { first, second, deck, state })
    }

    /// Client snapshot: `[state, seqno]`.
    pub fn snapshot(&self, seqno: u64) -> Result<Value, TableError> {
        let view = EpochView {
            deck: &self.deck,
            state: &self.state,
        };
        Ok(serde_json::to_value((view, seqno))?)
    }
}
