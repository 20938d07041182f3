//! Card model: ids, locations, the per-epoch state and the decks it is dealt from.

pub mod assets;
pub mod deck;
pub mod epoch;
pub mod state;
pub mod types;
