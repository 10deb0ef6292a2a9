// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the address of the game registry actor. Used to share state between
//! HTTP/WebSocket handlers and the actor system; injecting the address here
//! (instead of a module-level singleton) lets tests run independent registries.

use actix::Addr;
use crate::server::registry::server::GameRegistry;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the game registry actor (matchmaking, games, broadcast).
    pub registry_addr: Addr<GameRegistry>,
}

impl AppState {
    /// Create a new AppState with the given registry address.
    pub fn new(registry_addr: Addr<GameRegistry>) -> Self {
        AppState { registry_addr }
    }
}
