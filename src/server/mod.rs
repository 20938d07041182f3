// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - The wire protocol (envelopes, frames, request routing)
//! - Game sessions, their registry and the per-connection actors

pub mod state;
pub mod router;
pub mod protocol;
pub mod game_session;
pub mod ws_error;
