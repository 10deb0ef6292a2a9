//! Main entry point for the backend server.
//!
//! Initializes the actor system, configures application state, and launches the
//! HTTP server with the WebSocket endpoint players connect to.

use actix::Actor;
use actix_web::{web, App, HttpServer};
use server::registry::server::GameRegistry;

pub mod config;
mod game;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::init();

    // Start the GameRegistry actor (owns all games and the waiting pool).
    let registry_addr = GameRegistry::new().start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(registry_addr));

    // Start the HTTP server with the WebSocket endpoint.
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
    .bind((config::server::HOST, config::server::PORT))?
    .run()
    .await
}
