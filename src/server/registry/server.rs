/// Game registry actor.
///
/// Owns every game, the waiting pool, and the per-player outbound connection
/// handles. All mutations go through this actor's mailbox, so each operation
/// is atomic with respect to every other one: no observer can see a game with
/// two players still in `Waiting` state, or a waiting player without a game.

use actix::prelude::*;
use actix::MessageResult;
use actix::dev::SendError;
use std::collections::HashMap;
use uuid::Uuid;
use log::{info, debug, warn};

use crate::game::deck;
use crate::game::state::Game;
use crate::game::types::{GamePhase, Player};
use super::messages::ServerEvent;

/// Main game registry actor.
pub struct GameRegistry {
    /// All games, waiting and in progress.
    games: HashMap<Uuid, Game>,
    /// Index from player id to the game holding that player.
    player_to_game: HashMap<String, Uuid>,
    /// Players waiting for an opponent, in join order. Matchmaking scans this
    /// in order, so the longest-waiting compatible player is paired first.
    waiting_players: Vec<String>,
    /// Outbound handles for connected players, kept apart from the pure game
    /// state so games stay serializable.
    connections: HashMap<String, Recipient<ServerEvent>>,
}

impl GameRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
            player_to_game: HashMap::new(),
            waiting_players: Vec::new(),
            connections: HashMap::new(),
        }
    }

    /// Send an event to every player of a game.
    ///
    /// A closed connection is not fatal to the broadcast: failed recipients
    /// are collected and disconnected after the pass, which may itself
    /// broadcast a `player_left` to the survivors. The cascade is bounded
    /// because every disconnect shrinks the game.
    fn broadcast(&mut self, game_id: Uuid, event: ServerEvent) {
        let member_ids: Vec<String> = match self.games.get(&game_id) {
            Some(game) => game.players.iter().map(|p| p.id.clone()).collect(),
            None => return,
        };

        let mut dropped: Vec<String> = Vec::new();
        for player_id in member_ids {
            let Some(addr) = self.connections.get(&player_id) else {
                continue;
            };
            match addr.try_send(event.clone()) {
                Ok(()) => {}
                Err(SendError::Closed(_)) => {
                    debug!("[Registry] Connection of player {} is closed, scheduling cleanup", player_id);
                    dropped.push(player_id);
                }
                Err(SendError::Full(_)) => {
                    // A saturated mailbox is a slow client, not a dead one.
                    warn!("[Registry] Outbound mailbox full for player {}, event dropped", player_id);
                }
            }
        }

        for player_id in dropped {
            self.remove_player(&player_id);
        }
    }

    /// Send an event to a single player.
    fn send_to(&mut self, player_id: &str, event: ServerEvent) {
        let Some(addr) = self.connections.get(player_id).cloned() else {
            return;
        };
        if let Err(SendError::Closed(_)) = addr.try_send(event) {
            self.remove_player(player_id);
        }
    }

    /// Remove a player from the registry: waiting pool, connection handle,
    /// index, and game membership.
    ///
    /// An emptied game is destroyed; otherwise the game transitions to
    /// `Finished` and the remaining players are told who left. No-op for
    /// unknown ids, so duplicate disconnect notifications are harmless.
    fn remove_player(&mut self, player_id: &str) {
        self.waiting_players.retain(|id| id != player_id);
        self.connections.remove(player_id);

        let Some(game_id) = self.player_to_game.remove(player_id) else {
            return;
        };
        let Some(game) = self.games.get_mut(&game_id) else {
            return;
        };

        game.remove_player(player_id);

        if game.is_empty() {
            self.games.remove(&game_id);
            info!("[Registry] Game {} destroyed (last player {} left)", game_id, player_id);
        } else {
            game.finish();
            let snapshot = game.clone();
            info!("[Registry] Player {} left game {}, game finished", player_id, game_id);
            self.broadcast(game_id, ServerEvent::player_left(player_id.to_string(), snapshot));
        }
    }

    /// Find a waiting game with the requested grid size, scanning the waiting
    /// pool in join order.
    fn find_waiting_game(&self, grid_size: u32) -> Option<Uuid> {
        self.waiting_players.iter().find_map(|waiting_id| {
            self.player_to_game
                .get(waiting_id)
                .and_then(|game_id| self.games.get(game_id))
                .filter(|game| game.state == GamePhase::Waiting && game.grid_size == grid_size)
                .map(|game| game.id)
        })
    }
}

/// Message: player joins, asking for an opponent on the given grid size.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Join {
    pub player_id: String,
    pub player_name: String,
    pub grid_size: u32,
    pub addr: Recipient<ServerEvent>,
}

/// Message: turn holder flipped a card.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PlayerMove {
    pub player_id: String,
    pub card_id: u32,
    pub flip_count: u32,
}

/// Message: player reports a matched pair.
#[derive(Message)]
#[rtype(result = "()")]
pub struct MatchFound {
    pub player_id: String,
    pub cards: Vec<u32>,
}

/// Message: advance the turn cycle of the player's game.
#[derive(Message)]
#[rtype(result = "()")]
pub struct NextTurn {
    pub player_id: String,
}

/// Message: player left or the connection dropped (same semantics).
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub player_id: String,
}

/// Query: snapshot of a game by id, if it still exists.
#[derive(Message)]
#[rtype(result = "Option<Game>")]
pub struct LookupGame {
    pub game_id: Uuid,
}

impl Actor for GameRegistry {
    type Context = Context<Self>;
}

impl Handler<Join> for GameRegistry {
    type Result = ();

    /// Handles a player joining: pair with a compatible waiting player, or
    /// open a new waiting game.
    fn handle(&mut self, msg: Join, _ctx: &mut Self::Context) -> Self::Result {
        // A player id already bound to a game cannot join again; absorbed
        // silently, matching the tolerant treatment of stray client actions.
        if self.player_to_game.contains_key(&msg.player_id) {
            warn!("[Registry] Player {} tried to join but is already in a game", msg.player_id);
            return;
        }
        // The deck needs an even dimension so every card has a partner.
        if !deck::is_valid_grid_size(msg.grid_size) {
            warn!("[Registry] Player {} requested invalid grid size {}", msg.player_id, msg.grid_size);
            let _ = msg.addr.try_send(ServerEvent::error("Invalid grid size"));
            return;
        }

        let player = Player::new(msg.player_id.clone(), msg.player_name);

        match self.find_waiting_game(msg.grid_size) {
            Some(game_id) => {
                let Some(game) = self.games.get_mut(&game_id) else {
                    return;
                };
                game.begin_play(player);
                let first_player_id = match game.players.first() {
                    Some(first) => first.id.clone(),
                    None => return,
                };
                let snapshot = game.clone();

                self.connections.insert(msg.player_id.clone(), msg.addr);
                self.player_to_game.insert(msg.player_id.clone(), game_id);
                self.waiting_players.retain(|id| id != &first_player_id);

                info!(
                    "[Registry] Game {} started: {} vs {} on grid {}",
                    game_id, first_player_id, msg.player_id, msg.grid_size
                );
                self.broadcast(game_id, ServerEvent::game_start(snapshot));
            }
            None => {
                let game_id = Uuid::new_v4();
                let game = Game::new(game_id, msg.grid_size, player);
                let snapshot = game.clone();

                self.games.insert(game_id, game);
                self.connections.insert(msg.player_id.clone(), msg.addr);
                self.player_to_game.insert(msg.player_id.clone(), game_id);
                self.waiting_players.push(msg.player_id.clone());

                debug!(
                    "[Registry] Player {} waiting in game {} (grid {})",
                    msg.player_id, game_id, msg.grid_size
                );
                self.send_to(&msg.player_id, ServerEvent::waiting(snapshot));
            }
        }
    }
}

impl Handler<PlayerMove> for GameRegistry {
    type Result = ();

    /// Handles a card flip. Rejected with an error event when the sender is
    /// not the turn holder; the turn itself only changes via `NextTurn`.
    fn handle(&mut self, msg: PlayerMove, _ctx: &mut Self::Context) -> Self::Result {
        let Some(&game_id) = self.player_to_game.get(&msg.player_id) else {
            debug!("[Registry] Move from player {} with no active game", msg.player_id);
            return;
        };
        let Some(game) = self.games.get(&game_id) else {
            return;
        };

        let is_turn_holder = game.current_turn_player_id.as_deref() == Some(msg.player_id.as_str());
        if !is_turn_holder {
            debug!("[Registry] Player {} moved out of turn in game {}", msg.player_id, game_id);
            self.send_to(&msg.player_id, ServerEvent::error("Not your turn"));
            return;
        }

        self.broadcast(
            game_id,
            ServerEvent::Move {
                player_id: msg.player_id,
                card_id: msg.card_id,
                flip_count: msg.flip_count,
            },
        );
    }
}

impl Handler<MatchFound> for GameRegistry {
    type Result = ();

    /// Handles a reported pair: score the player and fan the update out.
    ///
    /// The cards are not checked against the stored card order; the client is
    /// trusted here, a deliberate simplification of this protocol.
    fn handle(&mut self, msg: MatchFound, _ctx: &mut Self::Context) -> Self::Result {
        let Some(&game_id) = self.player_to_game.get(&msg.player_id) else {
            debug!("[Registry] match_found from player {} with no active game", msg.player_id);
            return;
        };
        let Some(game) = self.games.get_mut(&game_id) else {
            return;
        };

        if let Some(player) = game.player_mut(&msg.player_id) {
            player.score += 1;
        }
        let snapshot = game.clone();

        self.broadcast(game_id, ServerEvent::match_found(msg.player_id, msg.cards, snapshot));
    }
}

impl Handler<NextTurn> for GameRegistry {
    type Result = ();

    /// Handles a turn-advance signal. Any member of the game may send it, not
    /// just the current holder: the client that finished its flips reports
    /// completion, whichever side it is on.
    fn handle(&mut self, msg: NextTurn, _ctx: &mut Self::Context) -> Self::Result {
        let Some(&game_id) = self.player_to_game.get(&msg.player_id) else {
            debug!("[Registry] next_turn from player {} with no active game", msg.player_id);
            return;
        };
        let Some(game) = self.games.get_mut(&game_id) else {
            return;
        };

        let Some(next_id) = game.advance_turn() else {
            // No turn holder yet (still waiting for an opponent).
            debug!("[Registry] next_turn in game {} with no turn to advance", game_id);
            return;
        };
        let snapshot = game.clone();

        self.broadcast(game_id, ServerEvent::turn_change(next_id, snapshot));
    }
}

impl Handler<Disconnect> for GameRegistry {
    type Result = ();

    /// Handles both an explicit `leave` and a dropped connection.
    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        debug!("[Registry] Player {} disconnected", msg.player_id);
        self.remove_player(&msg.player_id);
    }
}

impl Handler<LookupGame> for GameRegistry {
    type Result = MessageResult<LookupGame>;

    fn handle(&mut self, msg: LookupGame, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.games.get(&msg.game_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Stand-in for a client connection: records every event it receives.
    #[derive(Default)]
    struct RecordingSession {
        events: Vec<ServerEvent>,
    }

    impl Actor for RecordingSession {
        type Context = Context<Self>;
    }

    impl Handler<ServerEvent> for RecordingSession {
        type Result = ();

        fn handle(&mut self, msg: ServerEvent, _: &mut Context<Self>) {
            self.events.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<ServerEvent>")]
    struct Drain;

    impl Handler<Drain> for RecordingSession {
        type Result = MessageResult<Drain>;

        fn handle(&mut self, _: Drain, _: &mut Context<Self>) -> Self::Result {
            MessageResult(std::mem::take(&mut self.events))
        }
    }

    #[derive(Message)]
    #[rtype(result = "()")]
    struct Shutdown;

    impl Handler<Shutdown> for RecordingSession {
        type Result = ();

        fn handle(&mut self, _: Shutdown, ctx: &mut Context<Self>) {
            ctx.stop();
        }
    }

    async fn join(
        registry: &Addr<GameRegistry>,
        session: &Addr<RecordingSession>,
        player_id: &str,
        grid_size: u32,
    ) {
        registry
            .send(Join {
                player_id: player_id.to_string(),
                player_name: player_id.to_uppercase(),
                grid_size,
                addr: session.clone().recipient(),
            })
            .await
            .unwrap();
    }

    async fn drain(session: &Addr<RecordingSession>) -> Vec<ServerEvent> {
        session.send(Drain).await.unwrap()
    }

    fn game_id_of(events: &[ServerEvent]) -> Uuid {
        events
            .iter()
            .find_map(|event| match event {
                ServerEvent::Waiting { game } | ServerEvent::GameStart { game } => Some(game.id),
                _ => None,
            })
            .expect("no game id in events")
    }

    #[actix_web::test]
    async fn pairing_same_grid_starts_game() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 4).await;

        let events_a = drain(&session_a).await;
        assert_eq!(events_a.len(), 2);
        match &events_a[0] {
            ServerEvent::Waiting { game } => {
                assert_eq!(game.state, GamePhase::Waiting);
                assert_eq!(game.players.len(), 1);
                assert!(game.card_order.is_none());
            }
            other => panic!("expected waiting, got {:?}", other),
        }
        match &events_a[1] {
            ServerEvent::GameStart { game } => {
                assert_eq!(game.state, GamePhase::Playing);
                assert_eq!(game.players.len(), 2);
                assert_eq!(game.current_turn_player_id.as_deref(), Some("a"));
                assert_eq!(game.card_order.as_ref().map(Vec::len), Some(16));
            }
            other => panic!("expected game_start, got {:?}", other),
        }

        // The second joiner never saw the waiting phase.
        let events_b = drain(&session_b).await;
        assert_eq!(events_b.len(), 1);
        assert!(matches!(events_b[0], ServerEvent::GameStart { .. }));
    }

    #[actix_web::test]
    async fn different_grids_do_not_pair() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 6).await;

        let events_a = drain(&session_a).await;
        let events_b = drain(&session_b).await;
        assert!(matches!(&events_a[..], [ServerEvent::Waiting { .. }]));
        assert!(matches!(&events_b[..], [ServerEvent::Waiting { .. }]));
        assert_ne!(game_id_of(&events_a), game_id_of(&events_b));
    }

    #[actix_web::test]
    async fn duplicate_join_is_absorbed() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_a, "a", 4).await;

        let events_a = drain(&session_a).await;
        assert!(matches!(&events_a[..], [ServerEvent::Waiting { .. }]));

        let game = registry
            .send(LookupGame { game_id: game_id_of(&events_a) })
            .await
            .unwrap()
            .expect("game still registered");
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.state, GamePhase::Waiting);
    }

    #[actix_web::test]
    async fn invalid_grid_size_is_rejected_without_registration() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();

        join(&registry, &session_a, "a", 5).await;
        let events_a = drain(&session_a).await;
        assert!(matches!(&events_a[..], [ServerEvent::Error { .. }]));

        // The rejected join left no trace, so a valid retry goes through.
        join(&registry, &session_a, "a", 4).await;
        let events_a = drain(&session_a).await;
        assert!(matches!(&events_a[..], [ServerEvent::Waiting { .. }]));
    }

    #[actix_web::test]
    async fn out_of_turn_move_is_rejected_without_turn_change() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 4).await;
        let game_id = game_id_of(&drain(&session_a).await);
        drain(&session_b).await;

        registry
            .send(PlayerMove { player_id: "b".to_string(), card_id: 3, flip_count: 1 })
            .await
            .unwrap();

        let events_b = drain(&session_b).await;
        match &events_b[..] {
            [ServerEvent::Error { message }] => assert_eq!(message, "Not your turn"),
            other => panic!("expected error only, got {:?}", other),
        }
        // Rejection was private to the offender and changed nothing.
        assert!(drain(&session_a).await.is_empty());
        let game = registry.send(LookupGame { game_id }).await.unwrap().unwrap();
        assert_eq!(game.current_turn_player_id.as_deref(), Some("a"));
    }

    #[actix_web::test]
    async fn move_by_turn_holder_is_broadcast() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 4).await;
        drain(&session_a).await;
        drain(&session_b).await;

        registry
            .send(PlayerMove { player_id: "a".to_string(), card_id: 9, flip_count: 2 })
            .await
            .unwrap();

        for session in [&session_a, &session_b] {
            let events = drain(session).await;
            match &events[..] {
                [ServerEvent::Move { player_id, card_id, flip_count }] => {
                    assert_eq!(player_id, "a");
                    assert_eq!(*card_id, 9);
                    assert_eq!(*flip_count, 2);
                }
                other => panic!("expected move broadcast, got {:?}", other),
            }
        }
    }

    #[actix_web::test]
    async fn turn_cycles_through_join_order() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 4).await;
        let game_id = game_id_of(&drain(&session_a).await);

        registry.send(NextTurn { player_id: "a".to_string() }).await.unwrap();
        registry.send(NextTurn { player_id: "a".to_string() }).await.unwrap();

        let events_a = drain(&session_a).await;
        let turns: Vec<&str> = events_a
            .iter()
            .filter_map(|event| match event {
                ServerEvent::TurnChange { current_turn_player_id, .. } => {
                    Some(current_turn_player_id.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(turns, ["b", "a"]);

        let game = registry.send(LookupGame { game_id }).await.unwrap().unwrap();
        assert_eq!(game.current_turn_player_id.as_deref(), Some("a"));
    }

    #[actix_web::test]
    async fn disconnect_finishes_then_destroys_game() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 4).await;
        let game_id = game_id_of(&drain(&session_a).await);

        registry.send(Disconnect { player_id: "b".to_string() }).await.unwrap();

        let game = registry.send(LookupGame { game_id }).await.unwrap().unwrap();
        assert_eq!(game.state, GamePhase::Finished);
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.players[0].id, "a");

        let events_a = drain(&session_a).await;
        match &events_a[..] {
            [ServerEvent::PlayerLeft { player_id, game }] => {
                assert_eq!(player_id, "b");
                assert_eq!(game.state, GamePhase::Finished);
            }
            other => panic!("expected player_left, got {:?}", other),
        }

        registry.send(Disconnect { player_id: "a".to_string() }).await.unwrap();
        assert!(registry.send(LookupGame { game_id }).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn closed_connection_is_cleaned_up_on_broadcast() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 4).await;
        let game_id = game_id_of(&drain(&session_a).await);

        // Kill b's connection without telling the registry, then trigger a
        // broadcast. The failed send must convert into a disconnect.
        session_b.send(Shutdown).await.unwrap();
        actix::clock::sleep(Duration::from_millis(20)).await;

        registry.send(NextTurn { player_id: "a".to_string() }).await.unwrap();

        let game = registry.send(LookupGame { game_id }).await.unwrap().unwrap();
        assert_eq!(game.state, GamePhase::Finished);
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.players[0].id, "a");

        let events_a = drain(&session_a).await;
        assert!(matches!(events_a[0], ServerEvent::TurnChange { .. }));
        assert!(
            matches!(&events_a[1], ServerEvent::PlayerLeft { player_id, .. } if player_id == "b")
        );
    }

    #[actix_web::test]
    async fn full_match_scenario() {
        let registry = GameRegistry::new().start();
        let session_a = RecordingSession::default().start();
        let session_b = RecordingSession::default().start();

        join(&registry, &session_a, "a", 4).await;
        join(&registry, &session_b, "b", 4).await;
        let game_id = game_id_of(&drain(&session_a).await);
        drain(&session_b).await;

        // A finds a pair, scores, and hands the turn over.
        registry
            .send(MatchFound { player_id: "a".to_string(), cards: vec![1, 12] })
            .await
            .unwrap();
        registry.send(NextTurn { player_id: "a".to_string() }).await.unwrap();

        let events_b = drain(&session_b).await;
        match &events_b[..] {
            [ServerEvent::MatchFound { player_id, cards, game }, ServerEvent::TurnChange { current_turn_player_id, .. }] =>
            {
                assert_eq!(player_id, "a");
                assert_eq!(cards, &[1, 12]);
                assert_eq!(game.players[0].score, 1);
                assert_eq!(current_turn_player_id, "b");
            }
            other => panic!("unexpected event sequence: {:?}", other),
        }

        registry.send(Disconnect { player_id: "b".to_string() }).await.unwrap();
        let game = registry.send(LookupGame { game_id }).await.unwrap().unwrap();
        assert_eq!(game.state, GamePhase::Finished);
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.players[0].id, "a");
        assert_eq!(game.players[0].score, 1);
    }
}
