//! Session registry
//!
//! Tracks connected participants, hands the first two of them a paddle
//! slot, and owns each session's outbound message queue. Mutated only by
//! the room task, so no synchronization is needed around it.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::warn;

use crate::game::state::PlayerSlot;
use crate::net::protocol::{ServerMessage, SessionId};

/// A connected participant: a paddle holder if `slot` is set, otherwise a
/// spectator
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub slot: Option<PlayerSlot>,
    outbound: mpsc::UnboundedSender<String>,
}

impl Session {
    /// Queue a message for this session. Fire-and-forget: a dropped
    /// receiver just means the connection is already on its way out.
    pub fn send(&self, message: &ServerMessage) {
        match serde_json::to_string(message) {
            Ok(text) => self.send_raw(text),
            Err(e) => warn!("Failed to encode message for {}: {}", self.id, e),
        }
    }

    fn send_raw(&self, text: String) {
        let _ = self.outbound.send(text);
    }
}

/// The set of live sessions, keyed by identifier
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    /// Whether connecting sessions compete for paddle slots (volley mode)
    assign_slots: bool,
    next_player_number: u64,
}

impl SessionRegistry {
    pub fn new(assign_slots: bool) -> Self {
        Self {
            sessions: HashMap::new(),
            assign_slots,
            next_player_number: 0,
        }
    }

    /// Add a session, granting it the lowest free slot if one is open.
    /// Connection order decides slot ownership; later sessions spectate.
    pub fn register(
        &mut self,
        id: SessionId,
        outbound: mpsc::UnboundedSender<String>,
    ) -> &Session {
        let slot = if self.assign_slots {
            self.free_slot()
        } else {
            None
        };
        self.next_player_number += 1;
        let name = format!("Player {}", self.next_player_number);
        self.sessions.entry(id).or_insert(Session {
            id,
            name,
            slot,
            outbound,
        })
    }

    /// Remove a session. Its slot becomes free for future connections;
    /// existing spectators are never promoted.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// The slot held by a session, if any
    pub fn slot_of(&self, id: SessionId) -> Option<PlayerSlot> {
        self.sessions.get(&id).and_then(|s| s.slot)
    }

    /// The session currently holding a slot, if any
    pub fn holder_of(&self, slot: PlayerSlot) -> Option<SessionId> {
        self.sessions
            .values()
            .find(|s| s.slot == Some(slot))
            .map(|s| s.id)
    }

    fn free_slot(&self) -> Option<PlayerSlot> {
        PlayerSlot::ALL
            .into_iter()
            .find(|slot| self.holder_of(*slot).is_none())
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Send to every session. The payload is encoded once and cloned per
    /// receiver; a slow or dead receiver cannot stall anyone else.
    pub fn broadcast(&self, message: &ServerMessage) {
        self.broadcast_filtered(message, |_| true);
    }

    /// Send to every session except one (the subject of the event)
    pub fn broadcast_except(&self, except: SessionId, message: &ServerMessage) {
        self.broadcast_filtered(message, |session| session.id != except);
    }

    fn broadcast_filtered(&self, message: &ServerMessage, keep: impl Fn(&Session) -> bool) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode message for broadcast: {}", e);
                return;
            }
        };
        for session in self.sessions.values().filter(|s| keep(s)) {
            session.send_raw(text.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn connect(
        registry: &mut SessionRegistry,
    ) -> (SessionId, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(id, tx);
        (id, rx)
    }

    #[test]
    fn test_first_two_sessions_get_slots_in_order() {
        let mut registry = SessionRegistry::new(true);
        let (first, _rx1) = connect(&mut registry);
        let (second, _rx2) = connect(&mut registry);

        assert_eq!(registry.slot_of(first), Some(PlayerSlot::Slot1));
        assert_eq!(registry.slot_of(second), Some(PlayerSlot::Slot2));
    }

    #[test]
    fn test_third_session_spectates() {
        let mut registry = SessionRegistry::new(true);
        let (_, _rx1) = connect(&mut registry);
        let (_, _rx2) = connect(&mut registry);
        let (third, _rx3) = connect(&mut registry);

        assert_eq!(registry.slot_of(third), None);
        assert_eq!(registry.session_count(), 3);
    }

    #[test]
    fn test_slot_membership_is_injective() {
        let mut registry = SessionRegistry::new(true);
        let (first, _rx1) = connect(&mut registry);
        let (second, _rx2) = connect(&mut registry);

        assert_ne!(
            registry.slot_of(first).unwrap(),
            registry.slot_of(second).unwrap()
        );
        assert_eq!(registry.holder_of(PlayerSlot::Slot1), Some(first));
        assert_eq!(registry.holder_of(PlayerSlot::Slot2), Some(second));
    }

    #[test]
    fn test_no_slots_when_assignment_disabled() {
        let mut registry = SessionRegistry::new(false);
        let (first, _rx) = connect(&mut registry);
        assert_eq!(registry.slot_of(first), None);
    }

    #[test]
    fn test_disconnect_frees_slot_for_new_connections() {
        let mut registry = SessionRegistry::new(true);
        let (first, _rx1) = connect(&mut registry);
        let (_, _rx2) = connect(&mut registry);

        registry.remove(first);
        assert_eq!(registry.holder_of(PlayerSlot::Slot1), None);

        let (late, _rx3) = connect(&mut registry);
        assert_eq!(registry.slot_of(late), Some(PlayerSlot::Slot1));
    }

    #[test]
    fn test_existing_spectators_are_not_promoted() {
        let mut registry = SessionRegistry::new(true);
        let (first, _rx1) = connect(&mut registry);
        let (_, _rx2) = connect(&mut registry);
        let (spectator, _rx3) = connect(&mut registry);

        registry.remove(first);

        assert_eq!(registry.slot_of(spectator), None);
    }

    #[test]
    fn test_player_names_are_not_reused() {
        let mut registry = SessionRegistry::new(true);
        let (first, _rx1) = connect(&mut registry);
        assert_eq!(registry.get(first).unwrap().name, "Player 1");

        registry.remove(first);
        let (second, _rx2) = connect(&mut registry);
        assert_eq!(registry.get(second).unwrap().name, "Player 2");
    }

    #[test]
    fn test_broadcast_reaches_every_session() {
        let mut registry = SessionRegistry::new(true);
        let (_, mut rx1) = connect(&mut registry);
        let (_, mut rx2) = connect(&mut registry);

        registry.broadcast(&ServerMessage::AssignPaddle {
            slot: PlayerSlot::Slot1,
        });

        assert!(rx1.try_recv().unwrap().contains("assignPaddle"));
        assert!(rx2.try_recv().unwrap().contains("assignPaddle"));
    }

    #[test]
    fn test_broadcast_except_skips_the_subject() {
        let mut registry = SessionRegistry::new(true);
        let (first, mut rx1) = connect(&mut registry);
        let (_, mut rx2) = connect(&mut registry);

        registry.broadcast_except(
            first,
            &ServerMessage::PlayerConnected {
                session_id: first,
                name: "Player 1".to_string(),
            },
        );

        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().unwrap().contains("playerConnected"));
    }

    #[test]
    fn test_send_survives_dropped_receiver() {
        let mut registry = SessionRegistry::new(true);
        let (first, rx) = connect(&mut registry);
        drop(rx);

        // Must not panic or error the registry
        registry
            .get(first)
            .unwrap()
            .send(&ServerMessage::AssignPaddle {
                slot: PlayerSlot::Slot1,
            });
    }
}
