//! The game room - runs the simulation loop and applies commands
//!
//! One tokio task exclusively owns the world, the session registry, and the
//! RNG. Ticks and commands are multiplexed onto that single timeline and
//! each runs to completion, so nothing ever observes a half-updated world
//! and no locking exists anywhere near the game state.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::constants::tick;
use crate::game::state::{GameMode, PlayerSlot, WorldState};
use crate::game::step;
use crate::net::protocol::{ServerMessage, SessionId};
use crate::net::registry::SessionRegistry;

/// Commands accepted by the room task
#[derive(Debug)]
pub enum RoomCommand {
    Connect {
        session_id: SessionId,
        outbound: mpsc::UnboundedSender<String>,
    },
    Disconnect {
        session_id: SessionId,
    },
    StartGame {
        session_id: SessionId,
    },
    MovePaddle {
        session_id: SessionId,
        slot: PlayerSlot,
        delta_x: f32,
    },
}

/// Command rejections. The world is untouched whenever one of these comes
/// back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
    #[error("session {session} does not hold {slot:?}")]
    SlotNotOwned {
        session: SessionId,
        slot: PlayerSlot,
    },
}

/// The room: world + registry + randomness, one owner
pub struct GameRoom {
    world: WorldState,
    registry: SessionRegistry,
    rng: StdRng,
}

impl GameRoom {
    pub fn new(mode: GameMode) -> Self {
        let mut rng = StdRng::from_entropy();
        let world = WorldState::new(mode, &mut rng);
        Self {
            world,
            registry: SessionRegistry::new(mode == GameMode::Volley),
            rng,
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Apply one command. Rejections are logged, never fatal.
    pub fn handle_command(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Connect {
                session_id,
                outbound,
            } => self.connect(session_id, outbound),
            RoomCommand::Disconnect { session_id } => self.disconnect(session_id),
            RoomCommand::StartGame { session_id } => {
                if let Err(error) = self.start_game(session_id) {
                    warn!("Rejected start from {}: {}", session_id, error);
                }
            }
            RoomCommand::MovePaddle {
                session_id,
                slot,
                delta_x,
            } => {
                if let Err(error) = self.move_paddle(session_id, slot, delta_x) {
                    warn!("Rejected paddle move from {}: {}", session_id, error);
                }
            }
        }
    }

    /// One tick: advance the simulation (a no-op while not started) and
    /// publish the snapshot unconditionally so spectators see the idle
    /// board too
    pub fn tick(&mut self) {
        step::step(&mut self.world, &mut self.rng);
        self.broadcast_snapshot();
    }

    fn connect(&mut self, session_id: SessionId, outbound: mpsc::UnboundedSender<String>) {
        let (name, slot) = {
            let session = self.registry.register(session_id, outbound);
            (session.name.clone(), session.slot)
        };
        info!("{} connected as session {} (slot {:?})", name, session_id, slot);

        if let Some(session) = self.registry.get(session_id) {
            session.send(&ServerMessage::Init {
                session_id,
                world: self.world.clone(),
            });
            if let Some(slot) = slot {
                session.send(&ServerMessage::AssignPaddle { slot });
            }
        }
        self.registry
            .broadcast_except(session_id, &ServerMessage::PlayerConnected { session_id, name });
    }

    fn disconnect(&mut self, session_id: SessionId) {
        // A freed slot stays free until some future connection claims it;
        // the world keeps ticking with the paddle unclaimed
        if let Some(session) = self.registry.remove(session_id) {
            info!("{} disconnected (session {})", session.name, session_id);
            self.registry.broadcast(&ServerMessage::PlayerDisconnected {
                session_id,
                name: session.name,
            });
        }
    }

    /// Any session may start; a restart mid-game discards current progress
    fn start_game(&mut self, session_id: SessionId) -> Result<(), CommandError> {
        if self.registry.get(session_id).is_none() {
            return Err(CommandError::UnknownSession(session_id));
        }
        self.world.reset_for_start(&mut self.rng);
        info!("Game started by session {}", session_id);
        self.broadcast_snapshot();
        Ok(())
    }

    /// Only the session holding the slot may move its paddle
    fn move_paddle(
        &mut self,
        session_id: SessionId,
        slot: PlayerSlot,
        delta_x: f32,
    ) -> Result<(), CommandError> {
        let session = self
            .registry
            .get(session_id)
            .ok_or(CommandError::UnknownSession(session_id))?;
        if session.slot != Some(slot) {
            return Err(CommandError::SlotNotOwned {
                session: session_id,
                slot,
            });
        }
        if !self.world.move_paddle(slot, delta_x) {
            debug!("Paddle move from {} clamped to no movement", session_id);
        }
        self.broadcast_snapshot();
        Ok(())
    }

    fn broadcast_snapshot(&self) {
        self.registry
            .broadcast(&ServerMessage::UpdateGameState(self.world.clone()));
    }
}

/// Spawn the room task: a fixed-period ticker multiplexed with the command
/// channel. Returns the channel the transport feeds.
pub fn start_room(mode: GameMode) -> mpsc::UnboundedSender<RoomCommand> {
    let (commands, mut inbox) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut room = GameRoom::new(mode);
        let mut ticker = interval(Duration::from_millis(tick::DURATION_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Game loop started at {} Hz ({:?} mode)", tick::RATE, mode);

        loop {
            tokio::select! {
                _ = ticker.tick() => room.tick(),
                command = inbox.recv() => match command {
                    Some(command) => room.handle_command(command),
                    None => {
                        info!("Command channel closed, game loop stopping");
                        break;
                    }
                },
            }
        }
    });
    commands
}
