//! Registry of game sessions, keyed by room id.
//!
//! Get-or-create runs inside this actor's handler, so two first joiners of the same
//! room can never create two sessions. The connection then joins the session
//! directly; the registry never sees game traffic.

use actix::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use log::{debug, info, warn};

use crate::error::TableError;
use crate::game::assets::DeckResolver;
use crate::game::deck::DeckCatalog;
use crate::server::game_session::messages::Connect;
use crate::server::game_session::server::GameSession;

pub struct GameSessionManager {
    sessions: HashMap<String, Addr<GameSession>>,
    catalog: Arc<DeckCatalog>,
    resolver: Arc<dyn DeckResolver>,
}

impl GameSessionManager {
    pub fn new(catalog: Arc<DeckCatalog>, resolver: Arc<dyn DeckResolver>) -> Self {
        Self {
            sessions: HashMap::new(),
            catalog,
            resolver,
        }
    }

    fn get_or_create(&mut self, room: &str) -> Result<Addr<GameSession>, TableError> {
        if let Some(session) = self.sessions.get(room) {
            debug!("[SessionManager] Joining existing game '{}'", room);
            return Ok(session.clone());
        }
        info!("[SessionManager] Creating new game '{}'", room);
        let catalog = self.catalog.clone();
        let session = GameSession::new(room.to_string(), catalog, self.resolver.clone())?.start();
        self.sessions.insert(room.to_string(), session.clone());
        Ok(session)
    }
}

impl Actor for GameSessionManager {
    type Context = Context<Self>;
}

impl Handler<Connect> for GameSessionManager {
    type Result = Result<Addr<GameSession>, TableError>;

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) -> Self::Result {
        self.get_or_create(&msg.room).inspect_err(|e| {
            warn!("[SessionManager] Cannot open game '{}' for '{}': {}", msg.room, msg.user, e);
        })
    }
}
