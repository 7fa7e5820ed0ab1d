//! WebSocket transport
//!
//! Accepts connections and bridges them onto the room's command channel.
//! Each connection gets a reader task (inbound commands) and a writer task
//! draining the session's outbound queue; neither can stall the room.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::net::protocol::{ClientMessage, SessionId};
use crate::net::room::RoomCommand;

/// The listening endpoint feeding the room task
pub struct GameServer {
    config: ServerConfig,
    commands: mpsc::UnboundedSender<RoomCommand>,
}

impl GameServer {
    pub fn new(config: ServerConfig, commands: mpsc::UnboundedSender<RoomCommand>) -> Self {
        Self { config, commands }
    }

    /// Accept loop; one task per connection
    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = SocketAddr::new(self.config.bind_address, self.config.port);
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on ws://{}", addr);

        loop {
            let (stream, peer) = listener.accept().await?;
            let commands = self.commands.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer, commands).await {
                    debug!("Connection {} closed: {}", peer, e);
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    commands: mpsc::UnboundedSender<RoomCommand>,
) -> anyhow::Result<()> {
    let websocket = accept_async(stream).await?;
    let (mut sink, mut inbound) = websocket.split();

    let session_id = Uuid::new_v4();
    debug!("Accepted {} as session {}", peer, session_id);

    let (outbound, mut outbox) = mpsc::unbounded_channel::<String>();
    commands.send(RoomCommand::Connect {
        session_id,
        outbound,
    })?;

    let writer = tokio::spawn(async move {
        while let Some(text) = outbox.recv().await {
            if sink.send(Message::text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = inbound.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!("Session {} socket error: {}", session_id, e);
                break;
            }
        };
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(command) => {
                    if commands.send(room_command(session_id, command)).is_err() {
                        break;
                    }
                }
                // Malformed frames are no-ops, not faults
                Err(e) => warn!("Session {} sent malformed command: {}", session_id, e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    commands
        .send(RoomCommand::Disconnect { session_id })
        .ok();
    writer.abort();
    Ok(())
}

fn room_command(session_id: SessionId, message: ClientMessage) -> RoomCommand {
    match message {
        ClientMessage::StartGame => RoomCommand::StartGame { session_id },
        ClientMessage::MovePaddle { slot, delta_x } => RoomCommand::MovePaddle {
            session_id,
            slot,
            delta_x,
        },
    }
}
