//! BingoServer actor implementation
//!
//! The central actor that owns all game state: players, the drawn-number
//! set, the phase machine, and the draw-timer handle. Every external
//! event - client message, draw tick, shutdown - arrives as a command on
//! one mpsc channel and is processed serially, so no event can interleave
//! with another.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::card::Card;
use crate::config::Config;
use crate::error::GameError;
use crate::game::{GamePhase, GameState};
use crate::message::ServerMessage;
use crate::player::Player;
use crate::types::{CardId, PlayerId};
use crate::validator;

/// Commands sent from handlers (and the draw timer) to the BingoServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection asking to join; the reply carries the admission decision
    Admit {
        player_id: PlayerId,
        sender: mpsc::Sender<ServerMessage>,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    /// Player disconnected
    Disconnect { player_id: PlayerId },
    /// Player declared ready with a display name
    Ready { player_id: PlayerId, name: String },
    /// Player claims a completed line
    ClaimLine { player_id: PlayerId },
    /// Player claims a full card
    ClaimBingo { player_id: PlayerId },
    /// Player marks a drawn number
    Mark { player_id: PlayerId, number: u8 },
    /// Player unmarks a number
    Unmark { player_id: PlayerId, number: u8 },
    /// Handler-side parse failure that needs an ERRO reply
    ProtocolError {
        player_id: PlayerId,
        error: GameError,
    },
    /// Periodic tick from the draw scheduler
    DrawTick,
    /// Stop the game and close every connection
    Shutdown,
}

/// The main BingoServer actor
///
/// Processes commands one at a time; this serial loop is the single
/// mutual-exclusion domain guarding the whole session, so the readiness
/// barrier, draws, and claims can never race each other.
pub struct BingoServer {
    config: Config,
    /// All connected players: PlayerId -> Player
    players: HashMap<PlayerId, Player>,
    /// Phase machine plus drawn set and history
    game: GameState,
    /// Draw scheduler handle; Some exactly while the game is in progress
    draw_timer: Option<JoinHandle<()>>,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
    /// Command sender handed to the draw scheduler task
    cmd_tx: mpsc::Sender<ServerCommand>,
}

impl BingoServer {
    /// Create a new BingoServer
    ///
    /// `cmd_tx` must be a sender for the same channel as `receiver`; the
    /// draw scheduler uses it to feed ticks back into the mailbox.
    pub fn new(
        config: Config,
        receiver: mpsc::Receiver<ServerCommand>,
        cmd_tx: mpsc::Sender<ServerCommand>,
    ) -> Self {
        Self {
            config,
            players: HashMap::new(),
            game: GameState::new(),
            draw_timer: None,
            receiver,
            cmd_tx,
        }
    }

    /// Run the BingoServer event loop
    ///
    /// Processes commands until Shutdown arrives or all senders are dropped.
    pub async fn run(mut self) {
        info!("BingoServer started");

        while let Some(cmd) = self.receiver.recv().await {
            if !self.handle_command(cmd).await {
                break;
            }
        }

        info!("BingoServer stopped");
    }

    /// Process a single command; returns false when the actor should stop
    async fn handle_command(&mut self, cmd: ServerCommand) -> bool {
        match cmd {
            ServerCommand::Admit {
                player_id,
                sender,
                reply,
            } => {
                self.handle_admit(player_id, sender, reply);
            }
            ServerCommand::Disconnect { player_id } => {
                self.handle_disconnect(player_id);
            }
            ServerCommand::Ready { player_id, name } => {
                self.handle_ready(player_id, name).await;
            }
            ServerCommand::ClaimLine { player_id } => {
                self.handle_claim_line(player_id).await;
            }
            ServerCommand::ClaimBingo { player_id } => {
                self.handle_claim_bingo(player_id).await;
            }
            ServerCommand::Mark { player_id, number } => {
                self.handle_mark(player_id, number).await;
            }
            ServerCommand::Unmark { player_id, number } => {
                self.handle_unmark(player_id, number);
            }
            ServerCommand::ProtocolError { player_id, error } => {
                self.handle_protocol_error(player_id, error).await;
            }
            ServerCommand::DrawTick => {
                self.handle_draw_tick().await;
            }
            ServerCommand::Shutdown => {
                self.handle_shutdown().await;
                return false;
            }
        }
        true
    }

    /// Admission policy: reject on capacity or once a game is running
    fn handle_admit(
        &mut self,
        player_id: PlayerId,
        sender: mpsc::Sender<ServerMessage>,
        reply: oneshot::Sender<Result<(), GameError>>,
    ) {
        let decision = if self.players.len() >= self.config.max_players {
            Err(GameError::ServerFull)
        } else if self.game.phase() != GamePhase::Waiting {
            Err(GameError::GameInProgress)
        } else {
            Ok(())
        };

        match decision {
            Ok(()) => {
                self.players.insert(player_id, Player::new(player_id, sender));
                info!(
                    "Player {} admitted. Total players: {}",
                    player_id,
                    self.players.len()
                );
                let _ = reply.send(Ok(()));
            }
            Err(e) => {
                warn!("Player {} rejected: {}", player_id, e);
                let _ = reply.send(Err(e));
            }
        }
    }

    /// Handle player disconnection
    ///
    /// The barrier is not re-evaluated here; only a future Ready can
    /// trigger the start.
    fn handle_disconnect(&mut self, player_id: PlayerId) {
        if self.players.remove(&player_id).is_some() {
            info!(
                "Player {} disconnected. Total players: {}",
                player_id,
                self.players.len()
            );
        }
    }

    /// Handle a PRONTO declaration: assign name and card, then check the barrier
    async fn handle_ready(&mut self, player_id: PlayerId, name: String) {
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };

        if name.is_empty() {
            let _ = player.send((&GameError::EmptyName).into()).await;
            return;
        }

        // ready is monotonic and the name is immutable after first use
        if player.ready {
            debug!("Player {} already ready, ignoring", player_id);
            return;
        }

        let card_id = CardId::generate();
        let card = Card::generate();
        player.declare_ready(name.clone(), card_id.clone(), card.clone());

        info!("Player '{}' is ready with card {}", name, card_id);

        // card goes to the declarer before the barrier check
        let _ = player
            .send(ServerMessage::CardAssigned { card_id, card })
            .await;

        self.check_all_ready().await;
    }

    /// Readiness barrier: start when every present player is ready and
    /// the minimum player count is met
    async fn check_all_ready(&mut self) {
        if self.game.phase() != GamePhase::Waiting {
            return;
        }

        if self.players.len() < self.config.min_players {
            info!(
                "Waiting for more players. Current: {}/{}",
                self.players.len(),
                self.config.min_players
            );
            return;
        }

        let ready_count = self.players.values().filter(|p| p.ready).count();
        info!("Players ready: {}/{}", ready_count, self.players.len());

        if ready_count == self.players.len() {
            self.start_game().await;
        }
    }

    async fn start_game(&mut self) {
        if !self.game.start() {
            return;
        }

        info!("All players are ready, the game begins");
        self.broadcast(ServerMessage::GameStarted {
            text: "O jogo começou! Boa sorte!".to_string(),
        })
        .await;

        self.start_draw_timer();
    }

    /// Spawn the draw scheduler
    ///
    /// The task only sends DrawTick commands into the mailbox; the actual
    /// draw runs inside the actor loop, serialized with everything else.
    fn start_draw_timer(&mut self) {
        let cmd_tx = self.cmd_tx.clone();
        let first = self.config.first_draw_delay;
        let every = self.config.draw_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + first, every);
            loop {
                interval.tick().await;
                if cmd_tx.send(ServerCommand::DrawTick).await.is_err() {
                    break;
                }
            }
        });

        self.draw_timer = Some(handle);
    }

    /// One draw step: end on exhaustion, otherwise draw and broadcast
    async fn handle_draw_tick(&mut self) {
        if self.game.phase() != GamePhase::InProgress {
            // stale tick racing the end of the game, drop it
            debug!("Ignoring draw tick outside of a running game");
            return;
        }

        if self.game.exhausted() {
            info!("All numbers drawn, no winner");
            self.broadcast(ServerMessage::GameOver {
                reason: "Todos os números foram sorteados. Sem vencedor.".to_string(),
            })
            .await;
            self.end_game();
            return;
        }

        if let Some(number) = self.game.draw_next() {
            info!(
                "Drew number {} ({} drawn so far)",
                number,
                self.game.drawn().len()
            );
            self.broadcast(ServerMessage::NumberDrawn { number }).await;
        }
    }

    /// Handle a LINHA claim
    ///
    /// A valid line is broadcast to everyone and the game continues;
    /// an invalid one is reported to the claimant only.
    async fn handle_claim_line(&mut self, player_id: PlayerId) {
        let Some(player) = self.players.get(&player_id) else {
            return;
        };

        match self.game.phase() {
            GamePhase::Waiting => {
                let _ = player.send((&GameError::GameNotStarted).into()).await;
            }
            GamePhase::Ended => {
                let _ = player.send((&GameError::GameEnded).into()).await;
            }
            GamePhase::InProgress => {
                let Some(card) = player.card.as_ref() else {
                    let _ = player.send((&GameError::NotReady).into()).await;
                    return;
                };

                if validator::has_line(card, &player.marked, self.game.drawn()) {
                    let winner = player.display_name().to_string();
                    info!("Player '{}' completed a line", winner);
                    self.broadcast(ServerMessage::LineValid { winner }).await;
                } else {
                    debug!("Invalid line claim from {}", player_id);
                    let _ = player.send(ServerMessage::LineInvalid).await;
                }
            }
        }
    }

    /// Handle a BINGO claim
    ///
    /// A valid full card is the only victory path: the claimant gets
    /// BINGO_VALIDO, everyone else BINGO_OUTROS, and the game ends.
    async fn handle_claim_bingo(&mut self, player_id: PlayerId) {
        let Some(player) = self.players.get(&player_id) else {
            return;
        };

        match self.game.phase() {
            GamePhase::Waiting => {
                let _ = player.send((&GameError::GameNotStarted).into()).await;
            }
            GamePhase::Ended => {
                let _ = player.send((&GameError::GameEnded).into()).await;
            }
            GamePhase::InProgress => {
                let Some(card) = player.card.as_ref() else {
                    let _ = player.send((&GameError::NotReady).into()).await;
                    return;
                };

                if validator::has_full_card(card, &player.marked, self.game.drawn()) {
                    let winner = player.display_name().to_string();
                    info!("Player '{}' won with a full card", winner);

                    let _ = player.send(ServerMessage::BingoValid).await;
                    self.broadcast_others(
                        player_id,
                        ServerMessage::BingoOthers {
                            winner: winner.clone(),
                        },
                    )
                    .await;

                    self.end_game();
                } else {
                    debug!("Invalid bingo claim from {}", player_id);
                    let _ = player.send(ServerMessage::BingoInvalid).await;
                }
            }
        }
    }

    /// Handle MARCAR: the number must be on the card and already drawn
    async fn handle_mark(&mut self, player_id: PlayerId, number: u8) {
        if self.game.phase() == GamePhase::Ended {
            if let Some(player) = self.players.get(&player_id) {
                let _ = player.send((&GameError::GameEnded).into()).await;
            }
            return;
        }

        let is_drawn = self.game.is_drawn(number);
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };

        // card membership is checked by the player, the drawn set is
        // coordinator ground truth
        let on_card = player.card.as_ref().map_or(false, |c| c.contains(number));
        let result = if on_card && !is_drawn {
            Err(GameError::NotDrawn(number))
        } else {
            player.mark(number)
        };

        if let Err(e) = result {
            debug!("Mark {} rejected for {}: {}", number, player_id, e);
            let _ = player.send((&e).into()).await;
        }
    }

    /// Handle DESMARCAR: always succeeds, removing an absent number is a no-op
    fn handle_unmark(&mut self, player_id: PlayerId, number: u8) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.unmark(number);
        }
    }

    /// Reply to a malformed line; session state is unaffected
    async fn handle_protocol_error(&self, player_id: PlayerId, error: GameError) {
        if let Some(player) = self.players.get(&player_id) {
            let _ = player.send((&error).into()).await;
        }
    }

    /// Handle server shutdown: notify everyone, drop all connections,
    /// end the game
    async fn handle_shutdown(&mut self) {
        info!("Shutting down, closing {} connections", self.players.len());

        self.broadcast(ServerMessage::Error {
            message: "Servidor encerrado.".to_string(),
        })
        .await;

        // dropping the senders closes every player's write task
        self.players.clear();
        self.end_game();
    }

    /// Transition to Ended exactly once and cancel the draw timer
    fn end_game(&mut self) {
        if self.game.end() {
            info!("Game ended");
        }
        if let Some(timer) = self.draw_timer.take() {
            timer.abort();
        }
    }

    /// Send a message to every connected player
    ///
    /// Best-effort fan-out: a failed send is logged and does not stop
    /// delivery to the rest.
    async fn broadcast(&self, msg: ServerMessage) {
        for player in self.players.values() {
            if player.send(msg.clone()).await.is_err() {
                warn!("Failed to deliver broadcast to {}", player.id);
            }
        }
    }

    /// Send a message to every player except one
    async fn broadcast_others(&self, except: PlayerId, msg: ServerMessage) {
        for player in self.players.values() {
            if player.id == except {
                continue;
            }
            if player.send(msg.clone()).await.is_err() {
                warn!("Failed to deliver broadcast to {}", player.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    /// Config whose real timer never fires; tests inject DrawTick directly
    fn test_config() -> Config {
        Config {
            first_draw_delay: Duration::from_secs(3600),
            draw_interval: Duration::from_secs(3600),
            ..Config::default()
        }
    }

    fn spawn_server(config: Config) -> mpsc::Sender<ServerCommand> {
        let (cmd_tx, cmd_rx) = mpsc::channel(256);
        let server = BingoServer::new(config, cmd_rx, cmd_tx.clone());
        tokio::spawn(server.run());
        cmd_tx
    }

    async fn admit(
        cmd_tx: &mpsc::Sender<ServerCommand>,
    ) -> (PlayerId, mpsc::Receiver<ServerMessage>, Result<(), GameError>) {
        let player_id = PlayerId::new();
        let (msg_tx, msg_rx) = mpsc::channel(256);
        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(ServerCommand::Admit {
                player_id,
                sender: msg_tx,
                reply: reply_tx,
            })
            .await
            .unwrap();
        let decision = reply_rx.await.unwrap();
        (player_id, msg_rx, decision)
    }

    async fn ready(
        cmd_tx: &mpsc::Sender<ServerCommand>,
        player_id: PlayerId,
        name: &str,
        rx: &mut mpsc::Receiver<ServerMessage>,
    ) -> Card {
        cmd_tx
            .send(ServerCommand::Ready {
                player_id,
                name: name.to_string(),
            })
            .await
            .unwrap();
        match rx.recv().await {
            Some(ServerMessage::CardAssigned { card, .. }) => card,
            other => panic!("expected CardAssigned, got {:?}", other),
        }
    }

    /// Tick the scheduler until every target number has been drawn,
    /// returning everything drawn along the way
    async fn draw_until(
        cmd_tx: &mpsc::Sender<ServerCommand>,
        rx: &mut mpsc::Receiver<ServerMessage>,
        targets: &HashSet<u8>,
    ) -> HashSet<u8> {
        let mut drawn = HashSet::new();
        while !targets.is_subset(&drawn) {
            cmd_tx.send(ServerCommand::DrawTick).await.unwrap();
            match rx.recv().await {
                Some(ServerMessage::NumberDrawn { number }) => {
                    drawn.insert(number);
                }
                other => panic!("expected NumberDrawn, got {:?}", other),
            }
        }
        drawn
    }

    #[tokio::test]
    async fn test_admission_capacity() {
        let config = Config {
            max_players: 1,
            ..test_config()
        };
        let cmd_tx = spawn_server(config);

        let (_p1, _rx1, decision) = admit(&cmd_tx).await;
        assert!(decision.is_ok());

        let (_p2, _rx2, decision) = admit(&cmd_tx).await;
        assert!(matches!(decision, Err(GameError::ServerFull)));
    }

    #[tokio::test]
    async fn test_admission_rejected_once_game_started() {
        let cmd_tx = spawn_server(test_config());

        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        assert!(matches!(
            rx1.recv().await,
            Some(ServerMessage::GameStarted { .. })
        ));

        let (_p3, _rx3, decision) = admit(&cmd_tx).await;
        assert!(matches!(decision, Err(GameError::GameInProgress)));
    }

    #[tokio::test]
    async fn test_disconnect_frees_capacity() {
        let config = Config {
            max_players: 1,
            ..test_config()
        };
        let cmd_tx = spawn_server(config);

        let (p1, _rx1, decision) = admit(&cmd_tx).await;
        assert!(decision.is_ok());

        cmd_tx
            .send(ServerCommand::Disconnect { player_id: p1 })
            .await
            .unwrap();

        let (_p2, _rx2, decision) = admit(&cmd_tx).await;
        assert!(decision.is_ok());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;

        cmd_tx
            .send(ServerCommand::Ready {
                player_id: p1,
                name: String::new(),
            })
            .await
            .unwrap();

        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "Nome não pode estar vazio.")
            }
            other => panic!("expected ERRO, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_barrier_requires_all_present_ready() {
        let cmd_tx = spawn_server(test_config());

        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;

        // one of two ready: membership meets the minimum but the game
        // must not start while p2 has not declared. A claim round-trip
        // proves the phase is still Waiting.
        ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        cmd_tx
            .send(ServerCommand::ClaimLine { player_id: p1 })
            .await
            .unwrap();
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "O jogo ainda não começou.")
            }
            other => panic!("game started early: {:?}", other),
        }

        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        assert!(matches!(
            rx1.recv().await,
            Some(ServerMessage::GameStarted { .. })
        ));
        assert!(matches!(
            rx2.recv().await,
            Some(ServerMessage::GameStarted { .. })
        ));
    }

    #[tokio::test]
    async fn test_single_ready_player_does_not_start() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;

        ready(&cmd_tx, p1, "Ana", &mut rx1).await;

        // below the minimum: no start even though everyone present is ready
        cmd_tx
            .send(ServerCommand::ClaimLine { player_id: p1 })
            .await
            .unwrap();
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "O jogo ainda não começou.")
            }
            other => panic!("game started early: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_claim_before_start_rejected() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        ready(&cmd_tx, p1, "Ana", &mut rx1).await;

        cmd_tx
            .send(ServerCommand::ClaimLine { player_id: p1 })
            .await
            .unwrap();
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "O jogo ainda não começou.")
            }
            other => panic!("expected ERRO, got {:?}", other),
        }

        cmd_tx
            .send(ServerCommand::ClaimBingo { player_id: p1 })
            .await
            .unwrap();
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "O jogo ainda não começou.")
            }
            other => panic!("expected ERRO, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_draws_broadcast_to_all_without_duplicates() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        rx1.recv().await.unwrap(); // JOGO_INICIADO
        rx2.recv().await.unwrap();

        let mut seen = HashSet::new();
        for _ in 0..20 {
            cmd_tx.send(ServerCommand::DrawTick).await.unwrap();
            let n1 = match rx1.recv().await {
                Some(ServerMessage::NumberDrawn { number }) => number,
                other => panic!("expected NumberDrawn, got {:?}", other),
            };
            let n2 = match rx2.recv().await {
                Some(ServerMessage::NumberDrawn { number }) => number,
                other => panic!("expected NumberDrawn, got {:?}", other),
            };
            assert_eq!(n1, n2);
            assert!(seen.insert(n1), "number {} drawn twice", n1);
        }
    }

    #[tokio::test]
    async fn test_mark_requires_drawn_number() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        let card = ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        rx1.recv().await.unwrap(); // JOGO_INICIADO

        // nothing drawn yet
        let number = card.numbers()[0];
        cmd_tx
            .send(ServerCommand::Mark {
                player_id: p1,
                number,
            })
            .await
            .unwrap();
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert!(message.contains("ainda não foi sorteado"))
            }
            other => panic!("expected ERRO, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mark_rejects_number_off_card() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        let card = ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        rx1.recv().await.unwrap(); // JOGO_INICIADO

        let off_card = (1..=99).find(|n| !card.contains(*n)).unwrap();
        cmd_tx
            .send(ServerCommand::Mark {
                player_id: p1,
                number: off_card,
            })
            .await
            .unwrap();
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert!(message.contains("não está no seu cartão"))
            }
            other => panic!("expected ERRO, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_line_claim_scenario() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        let card = ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        rx1.recv().await.unwrap(); // JOGO_INICIADO
        rx2.recv().await.unwrap();

        // invalid claim first: nothing marked
        cmd_tx
            .send(ServerCommand::ClaimLine { player_id: p1 })
            .await
            .unwrap();
        assert!(matches!(rx1.recv().await, Some(ServerMessage::LineInvalid)));

        // draw until p1's first row is fully drawn, then mark it
        let row0: HashSet<u8> = card.row(0).iter().copied().collect();
        draw_until(&cmd_tx, &mut rx1, &row0).await;
        for &number in card.row(0) {
            cmd_tx
                .send(ServerCommand::Mark {
                    player_id: p1,
                    number,
                })
                .await
                .unwrap();
        }

        cmd_tx
            .send(ServerCommand::ClaimLine { player_id: p1 })
            .await
            .unwrap();

        // broadcast to everyone, claimant included
        match rx1.recv().await {
            Some(ServerMessage::LineValid { winner }) => assert_eq!(winner, "Ana"),
            other => panic!("expected LINHA_VALIDA, got {:?}", other),
        }
        loop {
            // p2 saw the same draws before the line broadcast
            match rx2.recv().await {
                Some(ServerMessage::NumberDrawn { .. }) => continue,
                Some(ServerMessage::LineValid { winner }) => {
                    assert_eq!(winner, "Ana");
                    break;
                }
                other => panic!("expected LINHA_VALIDA, got {:?}", other),
            }
        }

        // the game continues after a line win: a bad bingo claim is
        // answered with BINGO_INVALIDO, not a game-ended error
        cmd_tx
            .send(ServerCommand::ClaimBingo { player_id: p1 })
            .await
            .unwrap();
        assert!(matches!(rx1.recv().await, Some(ServerMessage::BingoInvalid)));
    }

    #[tokio::test]
    async fn test_bingo_win_scenario() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        let card = ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        rx1.recv().await.unwrap(); // JOGO_INICIADO
        rx2.recv().await.unwrap();

        let all: HashSet<u8> = card.numbers().iter().copied().collect();
        draw_until(&cmd_tx, &mut rx1, &all).await;
        for &number in card.numbers() {
            cmd_tx
                .send(ServerCommand::Mark {
                    player_id: p1,
                    number,
                })
                .await
                .unwrap();
        }

        cmd_tx
            .send(ServerCommand::ClaimBingo { player_id: p1 })
            .await
            .unwrap();

        // claimant gets BINGO_VALIDO, the other player BINGO_OUTROS
        assert!(matches!(rx1.recv().await, Some(ServerMessage::BingoValid)));
        loop {
            match rx2.recv().await {
                Some(ServerMessage::NumberDrawn { .. }) => continue,
                Some(ServerMessage::BingoOthers { winner }) => {
                    assert_eq!(winner, "Ana");
                    break;
                }
                other => panic!("expected BINGO_OUTROS, got {:?}", other),
            }
        }

        // ticks after the win draw nothing: the next message p1 sees is
        // the rejection of a late claim, not a NUMERO_SORTEADO
        cmd_tx.send(ServerCommand::DrawTick).await.unwrap();
        cmd_tx
            .send(ServerCommand::ClaimLine { player_id: p1 })
            .await
            .unwrap();
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "O jogo já terminou.")
            }
            other => panic!("expected ERRO after the game ended, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_simultaneous_bingo_claims_single_winner() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        let card1 = ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        let card2 = ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        rx1.recv().await.unwrap(); // JOGO_INICIADO
        rx2.recv().await.unwrap();

        // draw until both cards are fully covered, then both mark everything
        let mut targets: HashSet<u8> = card1.numbers().iter().copied().collect();
        targets.extend(card2.numbers().iter().copied());
        draw_until(&cmd_tx, &mut rx1, &targets).await;
        for &number in card1.numbers() {
            cmd_tx
                .send(ServerCommand::Mark {
                    player_id: p1,
                    number,
                })
                .await
                .unwrap();
        }
        for &number in card2.numbers() {
            cmd_tx
                .send(ServerCommand::Mark {
                    player_id: p2,
                    number,
                })
                .await
                .unwrap();
        }

        // both claims in the mailbox back to back; only the first may win
        cmd_tx
            .send(ServerCommand::ClaimBingo { player_id: p1 })
            .await
            .unwrap();
        cmd_tx
            .send(ServerCommand::ClaimBingo { player_id: p2 })
            .await
            .unwrap();

        assert!(matches!(rx1.recv().await, Some(ServerMessage::BingoValid)));
        loop {
            match rx2.recv().await {
                Some(ServerMessage::NumberDrawn { .. }) => continue,
                Some(ServerMessage::BingoOthers { winner }) => {
                    assert_eq!(winner, "Ana");
                    break;
                }
                other => panic!("expected BINGO_OUTROS, got {:?}", other),
            }
        }

        // the second claim is rejected: the game already ended
        match rx2.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "O jogo já terminou.")
            }
            other => panic!("expected ERRO for the losing claim, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exhaustion_ends_game_without_winner() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;
        let (p2, mut rx2, _) = admit(&cmd_tx).await;
        ready(&cmd_tx, p1, "Ana", &mut rx1).await;
        ready(&cmd_tx, p2, "Rui", &mut rx2).await;
        rx1.recv().await.unwrap(); // JOGO_INICIADO
        rx2.recv().await.unwrap();

        // 99 draws empty the range; the 100th tick ends the game
        for _ in 0..99 {
            cmd_tx.send(ServerCommand::DrawTick).await.unwrap();
            assert!(matches!(
                rx1.recv().await,
                Some(ServerMessage::NumberDrawn { .. })
            ));
        }
        cmd_tx.send(ServerCommand::DrawTick).await.unwrap();
        match rx1.recv().await {
            Some(ServerMessage::GameOver { reason }) => {
                assert!(reason.contains("Sem vencedor"))
            }
            other => panic!("expected FIM_DE_JOGO, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_protocol_error_gets_erro_reply() {
        let cmd_tx = spawn_server(test_config());
        let (p1, mut rx1, _) = admit(&cmd_tx).await;

        cmd_tx
            .send(ServerCommand::ProtocolError {
                player_id: p1,
                error: GameError::InvalidNumber("abc".to_string()),
            })
            .await
            .unwrap();

        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "Número inválido: abc")
            }
            other => panic!("expected ERRO, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_notifies_and_closes() {
        let cmd_tx = spawn_server(test_config());
        let (_p1, mut rx1, _) = admit(&cmd_tx).await;

        cmd_tx.send(ServerCommand::Shutdown).await.unwrap();

        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "Servidor encerrado.")
            }
            other => panic!("expected shutdown ERRO, got {:?}", other),
        }
        // sender dropped by the actor: the channel closes
        assert!(rx1.recv().await.is_none());
    }
}
