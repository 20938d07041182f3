// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the address of the session registry, shared by every WebSocket upgrade.

use actix::Addr;
use crate::server::game_session::manager::GameSessionManager;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the registry actor (maps room ids to game sessions).
    pub session_manager: Addr<GameSessionManager>,
}

impl AppState {
    /// Create a new AppState with the given registry address.
    pub fn new(session_manager: Addr<GameSessionManager>) -> Self {
        AppState { session_manager }
    }
}
