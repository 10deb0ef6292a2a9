//! HTTP and WebSocket routing configuration.
//!
//! Defines the single WebSocket endpoint clients connect to. The connection
//! is handled by a dedicated session actor; player identity is established
//! in-band by the `join` action.

use actix_web::web;
use crate::server::registry::session::ws_connect;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws")
            .to(ws_connect)
    );
}
