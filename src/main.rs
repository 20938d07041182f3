//! Main entry point for the card-table server.
//!
//! Parses arguments, loads the deck catalog, starts the session registry actor and
//! launches the HTTP server with the WebSocket endpoint.

use std::sync::Arc;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;

use config::args::Args;
use game::assets::UrlResolver;
use game::deck::DeckCatalog;
use server::game_session::GameSessionManager;

pub mod config;
mod error;
mod game;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Initialize logger from RUST_LOG (default to info, or debug with --debug).
    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let catalog = match &args.decks {
        Some(path) => DeckCatalog::load(path),
        None => DeckCatalog::builtin(),
    }
    .map_err(std::io::Error::other)?;
    info!("[Main] {} decks in catalog", catalog.len());

    let resolver = UrlResolver::new(args.serving_prefix.clone(), args.local_address.clone());

    // Start the registry actor (creates game sessions on first connect).
    let session_manager = GameSessionManager::new(Arc::new(catalog), Arc::new(resolver)).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(session_manager));

    info!("[Main] Listening on {}", args.listen);
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(args.listen.as_str())?
    .run()
    .await
}
