/// WebSocket session handler for a connected player.
///
/// This actor manages a single client connection: it decodes inbound JSON
/// actions, scopes them to the player id established by the `join` action,
/// relays them to the game registry, and serializes server events back to the
/// client. When the connection drops, the registry is told to disconnect the
/// player.
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, warn};

use super::messages::{ClientRequest, ServerEvent};
use super::server::{GameRegistry, Join, PlayerMove, MatchFound, NextTurn, Disconnect};
use crate::server::ws_error::ws_error_message;

/// Represents a player's WebSocket connection.
pub struct ClientSession {
    /// Player id bound to this connection by its `join` action. Actions that
    /// arrive before a join are ignored.
    pub player_id: Option<String>,
    pub registry_addr: Addr<GameRegistry>,
}

impl ClientSession {
    pub fn new(registry_addr: Addr<GameRegistry>) -> Self {
        Self {
            player_id: None,
            registry_addr,
        }
    }
}

impl Actor for ClientSession {
    type Context = ws::WebsocketContext<Self>;

    /// Called when the connection goes away for any reason. The registry
    /// treats this exactly like an explicit leave.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(player_id) = self.player_id.take() {
            self.registry_addr.do_send(Disconnect { player_id });
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ClientSession {
    /// Handles incoming WebSocket messages from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                match serde_json::from_str::<ClientRequest>(&text) {
                    Ok(ClientRequest::Join { player_id, player_name, grid_size }) => {
                        if let Some(existing) = &self.player_id {
                            if existing != &player_id {
                                // One connection, one identity.
                                ctx.text(ws_error_message(
                                    "ALREADY_JOINED",
                                    "This connection already joined with another player id",
                                    Some(existing.as_str()),
                                ));
                                return;
                            }
                        }
                        self.player_id = Some(player_id.clone());
                        self.registry_addr.do_send(Join {
                            player_id,
                            player_name,
                            grid_size,
                            addr: ctx.address().recipient(),
                        });
                    }
                    Ok(request) => {
                        let Some(player_id) = self.player_id.clone() else {
                            debug!("[Session] Action before join ignored");
                            return;
                        };
                        match request {
                            ClientRequest::Move { card_id, flip_count } => {
                                self.registry_addr.do_send(PlayerMove {
                                    player_id,
                                    card_id,
                                    flip_count,
                                });
                            }
                            ClientRequest::MatchFound { cards } => {
                                self.registry_addr.do_send(MatchFound { player_id, cards });
                            }
                            ClientRequest::NextTurn => {
                                self.registry_addr.do_send(NextTurn { player_id });
                            }
                            ClientRequest::Leave => {
                                // Clearing the binding lets the client join a
                                // fresh game on the same connection.
                                self.player_id = None;
                                self.registry_addr.do_send(Disconnect { player_id });
                            }
                            ClientRequest::Join { .. } => {}
                        }
                    }
                    Err(_e) => {
                        // Invalid client message format.
                        ctx.text(ws_error_message("INVALID_ACTION", "Invalid client message", None));
                    }
                }
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(_)) => ctx.stop(),
            _ => (),
        }
    }
}

impl Handler<ServerEvent> for ClientSession {
    type Result = ();

    /// Relays a server event to the client as JSON.
    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                // Serialization error: notify client and close connection.
                warn!("[Session] Failed to serialize server event: {}", e);
                ctx.text(ws_error_message("INTERNAL", "Internal server error", None));
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }
}

/// WebSocket endpoint players connect to.
///
/// Identity is established in-band: the first decoded `join` action carries
/// the player id, name, and requested grid size.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ClientSession::new(data.registry_addr.clone()),
        &req,
        stream,
    )
}
