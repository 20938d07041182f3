//! HTTP and WebSocket routing configuration.
//!
//! Card tables are served on a single WebSocket endpoint. `/kansas` is the path the
//! browser client connects to; `/ws` is an alias.

use actix_web::web;
use crate::server::game_session::session::ws_table;

/// Configure the application's HTTP/WebSocket routes.
///
/// Every connection starts in the registry state and is handed to its game
/// session by its first `connect` request.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/kansas")
            .to(ws_table)
    )
    .service(
        web::resource("/ws")
            .to(ws_table)
    );
}
