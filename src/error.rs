//! Error type shared by the card model, the sessions and the connection protocol.
//!
//! Every variant is fatal to a single request only: the connection that sent it
//! receives an error frame and keeps going.

use crate::game::types::{CardId, Location, Orientation};

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Unexpected request type '{0}'")]
    UnexpectedRequest(String),

    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Unknown card {0}")]
    UnknownCard(CardId),

    #[error("Orientation {0} outside [-4, 4]")]
    InvalidOrientation(Orientation),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("No stack at {0}")]
    UnknownStack(Location),

    #[error("invalid stackop type '{0}'")]
    UnknownStackOp(String),

    #[error("Deck catalog is empty")]
    EmptyCatalog,

    #[error("No deck at catalog index {0}")]
    MissingDeck(usize),

    #[error("Asset resolution failed: {0}")]
    Asset(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session unavailable: {0}")]
    Mailbox(#[from] actix::MailboxError),
}

impl TableError {
    /// Wraps a decoding failure for the named request type.
    pub fn malformed(kind: &str, err: impl std::fmt::Display) -> Self {
        TableError::Malformed(format!("{kind}: {err}"))
    }
}
