//! Game session actor: one per room.
//!
//! The actor mailbox is the session lock. Every request, joins included, runs to
//! completion before the next one starts, so sequence numbers minted here follow
//! the true order of operations. Sessions of different rooms run in parallel.

use actix::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use log::{debug, info, warn};
use rand::rng;
use serde::Serialize;
use serde_json::Value;

use crate::config::table::{DEFAULT_FIRST_DECK, INITIAL_SEQNO};
use crate::error::TableError;
use crate::game::assets::DeckResolver;
use crate::game::deck::DeckCatalog;
use crate::game::epoch::Epoch;
use crate::game::types::{Location, Orientation, StackOp};
use crate::server::game_session::messages::{
    AppliedMove, BulkUpdate, CardMove, ConnectionId, Join, MoveUpdate, Outbound, SessionRequest,
    StackGroup, StackOpRequest, StackUpdate, TableRequest,
};
use crate::server::protocol::event_frame;

/// Monotonic per-session counter attached to every mutating broadcast.
#[derive(Debug, Clone, Copy)]
pub struct SequenceCounter(u64);

impl SequenceCounter {
    pub fn new() -> Self {
        Self(INITIAL_SEQNO)
    }

    pub fn current(&self) -> u64 {
        self.0
    }

    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A joined connection: display name and where its frames go.
pub struct Participant {
    pub user: String,
    pub peer: Recipient<Outbound>,
}

pub struct GameSession {
    pub room: String,
    epoch: Epoch,
    seqno: SequenceCounter,
    participants: HashMap<ConnectionId, Participant>,
    catalog: Arc<DeckCatalog>,
    resolver: Arc<dyn DeckResolver>,
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(
            "[GameSession] {}: started with '{}' ({} cards)",
            self.room,
            self.epoch.deck.deck_name,
            self.epoch.state.card_count()
        );
    }
}

impl GameSession {
    /// Deals the default deck pair for a new room: the first catalog deck against
    /// the one after it.
    pub fn new(
        room: String,
        catalog: Arc<DeckCatalog>,
        resolver: Arc<dyn DeckResolver>,
    ) -> Result<Self, TableError> {
        let epoch = Epoch::deal(
            &catalog,
            resolver.as_ref(),
            DEFAULT_FIRST_DECK,
            catalog.next_index(DEFAULT_FIRST_DECK),
            &mut rng(),
        )?;
        Ok(Self {
            room,
            epoch,
            seqno: SequenceCounter::new(),
            participants: HashMap::new(),
            catalog,
            resolver,
        })
    }

    #[cfg(test)]
    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    pub fn seqno(&self) -> u64 {
        self.seqno.current()
    }

    #[cfg(test)]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn snapshot(&self) -> Result<Value, TableError> {
        self.epoch.snapshot(self.seqno.current())
    }

    /// Registers `conn` under `user`; joining twice just refreshes the entry.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        user: String,
        peer: Recipient<Outbound>,
    ) -> Result<Value, TableError> {
        info!("[GameSession] {}: '{}' joined as {}", self.room, user, conn);
        self.participants.insert(conn, Participant { user, peer });
        self.snapshot()
    }

    /// Serves one request from a joined connection.
    pub fn serve(
        &mut self,
        conn: ConnectionId,
        request: TableRequest,
    ) -> Result<Option<Value>, TableError> {
        match request {
            TableRequest::Relay(payload) => self.relay(conn, payload).map(Some),
            TableRequest::Move(card_move) => self.move_card(card_move).map(|_| None),
            TableRequest::BulkMove(moves) => self.bulk_move(moves).map(|_| None),
            TableRequest::StackOp(op) => self.stack_op(op).map(|_| None),
            TableRequest::Resync => self.snapshot().map(Some),
            TableRequest::Reset => self.reset().map(|_| None),
            TableRequest::Select => self.select().map(|_| None),
        }
    }

    /// Validates and applies one move, normalizing hand orientation first.
    /// Returns (destination, prior location).
    fn apply(&mut self, card_move: &mut CardMove) -> Result<(Location, Location), TableError> {
        let dest = Location::from_wire(card_move.dest_type, &card_move.dest_key)?;
        if let Location::Hand(_) = dest {
            let prior = self.epoch.state.location_of(card_move.card);
            card_move.dest_orient = hand_orientation(prior, card_move.dest_orient);
        }
        card_move.dest_key = dest.key();
        let prior = self
            .epoch
            .state
            .move_card(card_move.card, dest.clone(), card_move.dest_orient)?;
        Ok((dest, prior))
    }

    pub fn move_card(&mut self, mut card_move: CardMove) -> Result<(), TableError> {
        let (dest, prior) = self.apply(&mut card_move)?;
        let seqno = self.seqno.advance();
        info!(
            "[GameSession] {}: card {} moved {} -> {} (seqno {})",
            self.room, card_move.card, prior, dest, seqno
        );

        let state = &self.epoch.state;
        let update = MoveUpdate {
            z_stack: state.stack(&dest).map(<[_]>::to_vec).unwrap_or_default(),
            z_index: state.z_of(card_move.card).unwrap_or_default(),
            seqno,
            old_type: prior.kind(),
            old_key: prior.key(),
            card_move,
        };
        self.broadcast("update", &update, None)
    }

    /// Applies every decodable move; bad entries are logged and skipped.
    pub fn bulk_move(&mut self, moves: Vec<Value>) -> Result<(), TableError> {
        info!("[GameSession] {}: bulk move of {} cards", self.room, moves.len());

        let mut groups: Vec<(Location, Vec<AppliedMove>)> = Vec::new();
        for raw in moves {
            let applied = serde_json::from_value::<CardMove>(raw.clone())
                .map_err(|e| TableError::malformed("move", e))
                .and_then(|mut card_move| {
                    let (dest, prior) = self.apply(&mut card_move)?;
                    Ok((dest, prior, card_move))
                });
            let (dest, prior, card_move) = match applied {
                Ok(applied) => applied,
                Err(e) => {
                    warn!("[GameSession] {}: ignoring bad move {}: {}", self.room, raw, e);
                    continue;
                }
            };
            let entry = AppliedMove {
                card_move,
                old_type: prior.kind(),
                old_key: prior.key(),
            };
            match groups.iter_mut().find(|(at, _)| *at == dest) {
                Some((_, updates)) => updates.push(entry),
                None => groups.push((dest, vec![entry])),
            }
        }

        let seqno = self.seqno.advance();
        let state = &self.epoch.state;
        let stacks = groups
            .into_iter()
            .map(|(dest, updates)| StackGroup {
                dest_type: dest.kind(),
                dest_key: dest.key(),
                z_stack: state.stack(&dest).map(<[_]>::to_vec).unwrap_or_default(),
                updates,
            })
            .collect();
        self.broadcast("bulkupdate", &BulkUpdate { stacks, seqno }, None)
    }

    pub fn stack_op(&mut self, request: StackOpRequest) -> Result<(), TableError> {
        let op: StackOp = request.op_type.parse()?;
        let at = Location::from_wire(request.dest_type, &request.dest_key)?;

        let state = &mut self.epoch.state;
        if state.stack(&at).is_none() {
            return Err(TableError::UnknownStack(at));
        }
        match op {
            StackOp::Invert => {
                state.reverse_stack(&at)?;
                state.reverse_orientations(&at)?;
            }
            StackOp::Reverse => state.reverse_stack(&at)?,
            StackOp::Shuffle => {
                state.reset_orientations(&at)?;
                state.shuffle_stack(&at, &mut rng())?;
            }
        }
        state.reassign_z(&at)?;

        let seqno = self.seqno.advance();
        let update = StackUpdate {
            z_stack: state.stack(&at).map(<[_]>::to_vec).unwrap_or_default(),
            z_index: state.z_values(&at),
            orient: state.orientations(&at),
            seqno,
            op: request,
        };
        debug!("[GameSession] {}: {:?} on {} (seqno {})", self.room, op, at, seqno);
        self.broadcast("stackupdate", &update, None)
    }

    /// Redeals the current deck pair.
    pub fn reset(&mut self) -> Result<(), TableError> {
        self.redeal(self.epoch.first, self.epoch.second)
    }

    /// Redeals with the next catalog deck on the first slot.
    pub fn select(&mut self) -> Result<(), TableError> {
        let first = self.catalog.next_index(self.epoch.first);
        self.redeal(first, self.epoch.second)
    }

    fn redeal(&mut self, first: usize, second: usize) -> Result<(), TableError> {
        let epoch = Epoch::deal(&self.catalog, self.resolver.as_ref(), first, second, &mut rng())?;
        info!("[GameSession] {}: new epoch '{}'", self.room, epoch.deck.deck_name);
        self.epoch = epoch;
        let snapshot = self.snapshot()?;
        self.broadcast("reset", &snapshot, None)
    }

    /// Passes `payload` to everyone except the sender.
    pub fn relay(&mut self, from: ConnectionId, payload: Value) -> Result<Value, TableError> {
        self.broadcast("broadcast_message", &payload, Some(from))?;
        Ok(Value::from("ok"))
    }

    /// Sends one event frame to every participant but `except`.
    ///
    /// Iterates over a copy of the id set; a peer whose mailbox is closed is dropped
    /// from the session and never retried.
    fn broadcast<T: Serialize>(
        &mut self,
        event: &str,
        data: &T,
        except: Option<ConnectionId>,
    ) -> Result<(), TableError> {
        let frame = event_frame(event, data)?;
        let started = Instant::now();
        let targets: Vec<ConnectionId> = self
            .participants
            .keys()
            .copied()
            .filter(|conn| Some(*conn) != except)
            .collect();

        for conn in &targets {
            let Some(participant) = self.participants.get(conn) else {
                continue;
            };
            match participant.peer.try_send(Outbound(frame.clone())) {
                Ok(()) => {}
                Err(SendError::Full(msg)) => participant.peer.do_send(msg),
                Err(SendError::Closed(_)) => {
                    warn!(
                        "[GameSession] {}: removing broken connection {} ('{}')",
                        self.room, conn, participant.user
                    );
                    self.participants.remove(conn);
                }
            }
        }
        debug!(
            "[GameSession] {}: broadcast {} to {} peers in {:?}",
            self.room,
            event,
            targets.len(),
            started.elapsed()
        );
        Ok(())
    }
}

/// Orientation a card takes when it lands in a hand: face up when drawn from the
/// board, otherwise the requested facing with rotation dropped.
pub fn hand_orientation(prior: Option<&Location>, requested: Orientation) -> Orientation {
    match prior {
        Some(Location::Board(_)) => 1,
        _ if requested > 0 => 1,
        _ => -1,
    }
}

impl Handler<Join> for GameSession {
    type Result = Result<Value, TableError>;

    fn handle(&mut self, msg: Join, _: &mut Context<Self>) -> Self::Result {
        self.join(msg.conn, msg.user, msg.peer)
    }
}

impl Handler<SessionRequest> for GameSession {
    type Result = Result<Option<Value>, TableError>;

    fn handle(&mut self, msg: SessionRequest, _: &mut Context<Self>) -> Self::Result {
        let result = self.serve(msg.conn, msg.request);
        if let Err(e) = &result {
            warn!("[GameSession] {}: request from {} failed: {}", self.room, msg.conn, e);
        }
        result
    }
}
