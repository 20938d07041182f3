use actix::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::server::GameSession;
use crate::error::TableError;
use crate::game::types::{CardId, LocationKind, Orientation};

/// Identity of one WebSocket connection.
pub type ConnectionId = Uuid;

// ---- client -> server payloads ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub gameid: String,
    pub user: String,
}

/// A single card move as sent by clients and echoed back in updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMove {
    pub card: CardId,
    pub dest_type: LocationKind,
    pub dest_key: Value,
    pub dest_orient: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_prev_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub card_move: CardMove,
}

/// Entries stay undecoded so one bad entry cannot sink the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkMoveRequest {
    pub moves: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackOpRequest {
    pub dest_type: LocationKind,
    pub dest_key: Value,
    pub op_type: String,
}

/// Requests served by a session once a connection has joined it.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRequest {
    Relay(Value),
    Move(CardMove),
    BulkMove(Vec<Value>),
    StackOp(StackOpRequest),
    Resync,
    Reset,
    Select,
}

// ---- server -> client payloads ----

#[derive(Debug, Clone, Serialize)]
pub struct MoveUpdate {
    #[serde(rename = "move")]
    pub card_move: CardMove,
    pub z_stack: Vec<CardId>,
    pub z_index: i64,
    pub seqno: u64,
    pub old_type: LocationKind,
    pub old_key: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedMove {
    #[serde(rename = "move")]
    pub card_move: CardMove,
    pub old_type: LocationKind,
    pub old_key: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackGroup {
    pub dest_type: LocationKind,
    pub dest_key: Value,
    pub updates: Vec<AppliedMove>,
    pub z_stack: Vec<CardId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdate {
    pub stacks: Vec<StackGroup>,
    pub seqno: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackUpdate {
    pub op: StackOpRequest,
    pub z_stack: Vec<CardId>,
    pub z_index: Vec<i64>,
    pub orient: Vec<Orientation>,
    pub seqno: u64,
}

// ---- actor messages ----

/// An encoded frame for one connection.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Outbound(pub String);

/// Registers a connection with a session and returns the snapshot `[state, seqno]`.
#[derive(Message)]
#[rtype(result = "Result<Value, TableError>")]
pub struct Join {
    pub conn: ConnectionId,
    pub user: String,
    pub peer: Recipient<Outbound>,
}

/// A request from a joined connection. `Ok(Some(data))` is replied to the sender.
#[derive(Message)]
#[rtype(result = "Result<Option<Value>, TableError>")]
pub struct SessionRequest {
    pub conn: ConnectionId,
    pub request: TableRequest,
}

/// Asks the registry for the room's session, creating it on first use.
#[derive(Message)]
#[rtype(result = "Result<Addr<GameSession>, TableError>")]
pub struct Connect {
    pub room: String,
    pub user: String,
}
