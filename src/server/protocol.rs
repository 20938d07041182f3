//! Wire envelope and request routing.
//!
//! Inbound frames are `{"type", "data"}`. Replies go back as `<type>_resp`,
//! broadcasts under their event name, both stamped with the server time. Which
//! request types a connection may send depends only on its handler state.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TableError;
use crate::server::game_session::messages::{
    BulkMoveRequest, ConnectRequest, MoveRequest, StackOpRequest, TableRequest,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn decode(text: &str) -> Result<Self, TableError> {
        serde_json::from_str(text).map_err(|e| TableError::malformed("frame", e))
    }
}

#[derive(Serialize)]
struct Frame<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: &'a T,
    time: f64,
}

fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Direct reply to a request of type `kind`.
pub fn reply_frame<T: Serialize>(kind: &str, data: &T) -> Result<String, TableError> {
    event_frame(&format!("{kind}_resp"), data)
}

/// Broadcast frame for `event`.
pub fn event_frame<T: Serialize>(event: &str, data: &T) -> Result<String, TableError> {
    Ok(serde_json::to_string(&Frame {
        kind: event,
        data,
        time: epoch_seconds(),
    })?)
}

/// Which handler serves a connection. Starts at `Registry`; a successful connect
/// moves it to `InSession` for good.
#[derive(Debug, Clone)]
pub enum HandlerState<S> {
    Registry,
    InSession { room: String, session: S },
}

/// What to do with a decoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Pong,
    Connect(ConnectRequest),
    Session(TableRequest),
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, data: Value) -> Result<T, TableError> {
    serde_json::from_value(data).map_err(|e| TableError::malformed(kind, e))
}

pub fn route<S>(state: &HandlerState<S>, envelope: Envelope) -> Result<Dispatch, TableError> {
    let Envelope { kind, data } = envelope;
    if kind == "ping" {
        return Ok(Dispatch::Pong);
    }
    match state {
        HandlerState::Registry => match kind.as_str() {
            "connect" => Ok(Dispatch::Connect(decode(&kind, data)?)),
            _ => Err(TableError::UnexpectedRequest(kind)),
        },
        HandlerState::InSession { .. } => {
            let request = match kind.as_str() {
                "broadcast" => TableRequest::Relay(data),
                "move" => TableRequest::Move(decode::<MoveRequest>(&kind, data)?.card_move),
                "bulkmove" => TableRequest::BulkMove(decode::<BulkMoveRequest>(&kind, data)?.moves),
                "stackop" => TableRequest::StackOp(decode::<StackOpRequest>(&kind, data)?),
                "resync" => TableRequest::Resync,
                "reset" => TableRequest::Reset,
                "select" => TableRequest::Select,
                _ => return Err(TableError::UnexpectedRequest(kind)),
            };
            Ok(Dispatch::Session(request))
        }
    }
}
