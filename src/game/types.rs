use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TableError;

/// Card identity inside one epoch. Ids run from 0 and are reassigned on every reset.
pub type CardId = u32;

/// Facing and rotation of a card. The sign is the facing, the magnitude the rotation.
pub type Orientation = i8;

/// Wire name of a location family, as sent in `dest_type` / `old_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Board,
    Hands,
}

/// Where a stack lives: a shared board slot or a player's private hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Board(i64),
    Hand(String),
}

impl Location {
    /// Builds a location from its wire pair. Board keys are integers (numeric strings
    /// are accepted), hand keys must be strings.
    pub fn from_wire(kind: LocationKind, key: &Value) -> Result<Self, TableError> {
        match kind {
            LocationKind::Board => {
                let slot = match key {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                };
                slot.map(Location::Board)
                    .ok_or_else(|| TableError::InvalidLocation(format!("board slot {key}")))
            }
            LocationKind::Hands => match key {
                Value::String(owner) => Ok(Location::Hand(owner.clone())),
                _ => Err(TableError::InvalidLocation(format!("hand owner {key}"))),
            },
        }
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Board(_) => LocationKind::Board,
            Location::Hand(_) => LocationKind::Hands,
        }
    }

    /// The `dest_key` / `old_key` value clients expect for this location.
    pub fn key(&self) -> Value {
        match self {
            Location::Board(slot) => Value::from(*slot),
            Location::Hand(owner) => Value::from(owner.as_str()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Board(slot) => write!(f, "board {slot}"),
            Location::Hand(owner) => write!(f, "hands {owner}"),
        }
    }
}

/// Whole-stack operations a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    /// Reverse the order and flip every card.
    Invert,
    /// Reverse the order only.
    Reverse,
    /// Give every card the top card's orientation, then permute.
    Shuffle,
}

impl FromStr for StackOp {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invert" => Ok(StackOp::Invert),
            "reverse" => Ok(StackOp::Reverse),
            "shuffle" => Ok(StackOp::Shuffle),
            other => Err(TableError::UnknownStackOp(other.to_string())),
        }
    }
}
