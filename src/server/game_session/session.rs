//! WebSocket actor for one client connection.
//!
//! Frames are handled strictly one at a time: while a request is in flight to the
//! registry or a session the actor waits, so a later frame can never overtake an
//! earlier one. Errors are answered on this connection only and never close it.

use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::error::TableError;
use crate::server::game_session::manager::GameSessionManager;
use crate::server::game_session::messages::{
    Connect, ConnectRequest, ConnectionId, Join, Outbound, SessionRequest, TableRequest,
};
use crate::server::game_session::server::GameSession;
use crate::server::protocol::{Dispatch, Envelope, HandlerState, reply_frame, route};
use crate::server::ws_error::ws_error_message;

pub struct TableConnection {
    pub id: ConnectionId,
    pub state: HandlerState<Addr<GameSession>>,
    pub manager: Addr<GameSessionManager>,
}

impl TableConnection {
    pub fn new(manager: Addr<GameSessionManager>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: HandlerState::Registry,
            manager,
        }
    }

    fn send_reply<T: Serialize>(&self, ctx: &mut ws::WebsocketContext<Self>, kind: &str, data: &T) {
        match reply_frame(kind, data) {
            Ok(text) => ctx.text(text),
            Err(e) => self.send_error(ctx, &e),
        }
    }

    fn send_error(&self, ctx: &mut ws::WebsocketContext<Self>, err: &TableError) {
        warn!("[Connection] {}: {}", self.id, err);
        ctx.text(ws_error_message(&err.to_string()));
    }

    fn dispatch(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let envelope = match Envelope::decode(text) {
            Ok(envelope) => envelope,
            Err(e) => return self.send_error(ctx, &e),
        };
        let kind = envelope.kind.clone();
        debug!("[Connection] {}: serving {}", self.id, kind);

        match route(&self.state, envelope) {
            Ok(Dispatch::Pong) => self.send_reply(ctx, &kind, &"pong"),
            Ok(Dispatch::Connect(request)) => self.connect(request, ctx),
            Ok(Dispatch::Session(request)) => self.forward(kind, request, ctx),
            Err(e) => self.send_error(ctx, &e),
        }
    }

    /// Looks the room up in the registry, then joins its session.
    fn connect(&mut self, request: ConnectRequest, ctx: &mut ws::WebsocketContext<Self>) {
        info!("[Connection] {}: '{}' connecting to '{}'", self.id, request.user, request.gameid);
        self.manager
            .send(Connect {
                room: request.gameid.clone(),
                user: request.user.clone(),
            })
            .into_actor(self)
            .then(move |res, act, ctx| {
                match res.map_err(TableError::from).and_then(|session| session) {
                    Ok(session) => act.join(request, session, ctx),
                    Err(e) => act.send_error(ctx, &e),
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    /// Registers with the session and switches to it once the snapshot arrives.
    fn join(
        &mut self,
        request: ConnectRequest,
        session: Addr<GameSession>,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        session
            .send(Join {
                conn: self.id,
                user: request.user,
                peer: ctx.address().recipient(),
            })
            .into_actor(self)
            .then(move |res, act, ctx| {
                match res.map_err(TableError::from).and_then(|snapshot| snapshot) {
                    Ok(snapshot) => {
                        act.state = HandlerState::InSession {
                            room: request.gameid,
                            session,
                        };
                        act.send_reply(ctx, "connect", &snapshot);
                    }
                    Err(e) => act.send_error(ctx, &e),
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn forward(
        &mut self,
        kind: String,
        request: TableRequest,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        let HandlerState::InSession { session, .. } = &self.state else {
            return self.send_error(ctx, &TableError::UnexpectedRequest(kind));
        };
        session
            .send(SessionRequest {
                conn: self.id,
                request,
            })
            .into_actor(self)
            .then(move |res, act, ctx| {
                match res.map_err(TableError::from).and_then(|served| served) {
                    Ok(Some(data)) => act.send_reply(ctx, &kind, &data),
                    Ok(None) => {}
                    Err(e) => act.send_error(ctx, &e),
                }
                fut::ready(())
            })
            .wait(ctx);
    }
}

impl Actor for TableConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Connection] {}: opened", self.id);
    }

    /// The session notices on its next broadcast and prunes this connection.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        match &self.state {
            HandlerState::InSession { room, .. } => {
                info!("[Connection] {}: closed (game '{}')", self.id, room)
            }
            HandlerState::Registry => info!("[Connection] {}: closed", self.id),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for TableConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => self.dispatch(&text, ctx),
            Ok(ws::Message::Binary(_)) => {
                let err = TableError::Malformed("binary frames are not supported".into());
                self.send_error(ctx, &err)
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[Connection] {}: protocol error: {}", self.id, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

// Frames produced by sessions for this client.
impl Handler<Outbound> for TableConnection {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0);
    }
}

/// WebSocket endpoint for card tables. Every connection starts in the registry
/// state and joins a game with its first `connect` request.
pub async fn ws_table(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(TableConnection::new(data.session_manager.clone()), &req, stream)
}
