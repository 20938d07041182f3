/// Table configuration constants.
///
/// This module defines the card-model parameters such as the orientation range,
/// the board slots the two decks are dealt to, and the first sequence number.
use crate::game::types::Orientation;

/// First sequence number handed out by a fresh session.
pub const INITIAL_SEQNO: u64 = 1000;

/// Lowest orientation a card may take (face down, rotated three quarters).
pub const MIN_ORIENTATION: Orientation = -4;

/// Highest orientation a card may take.
pub const MAX_ORIENTATION: Orientation = 4;

/// Orientation of a card nobody has looked at yet.
pub const DEFAULT_ORIENTATION: Orientation = -1;

/// Board slot receiving the first deck. Slots pack grid cells as `y << 16 | x`.
pub const FIRST_DECK_SLOT: i64 = 70321710;

/// Board slot receiving the second deck.
pub const SECOND_DECK_SLOT: i64 = 44892300;

/// Catalog index of the first deck dealt to a new room.
pub const DEFAULT_FIRST_DECK: usize = 0;

// The second deck of a new room is the catalog entry after the first one, which
// is the first deck again when the catalog holds a single deck.
