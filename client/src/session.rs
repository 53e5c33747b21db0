//! Client-side mirror of the host's session.
//!
//! The client never simulates. It rebuilds the roster from the join
//! handshake, copies authoritative positions from each snapshot and keeps
//! the local player's latest input ready to send.

use log::{debug, info, warn};
use shared::{Entity, InputState, JoinAck, Message, PeerId, Roster, Snapshot, Vec2};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    AwaitingHandshakeAck,
    Synced,
    Failed(String),
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct ClientSession {
    name: String,
    origin: Vec2,
    state: ConnectionState,
    local_id: Option<PeerId>,
    map_selector: Option<u32>,
    roster: Roster,
    last_tick: u64,
    input: InputState,
}

impl ClientSession {
    pub fn new(name: impl Into<String>, origin: Vec2) -> Self {
        Self {
            name: name.into(),
            origin,
            state: ConnectionState::Disconnected,
            local_id: None,
            map_selector: None,
            roster: Roster::new(),
            last_tick: 0,
            input: InputState::default(),
        }
    }

    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Called once `JOIN` has been written.
    pub fn begin_handshake(&mut self) {
        self.state = ConnectionState::AwaitingHandshakeAck;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Session failed: {}", reason);
        self.state = ConnectionState::Failed(reason);
    }

    /// The transport closed. Entities stay in place for display.
    pub fn handle_disconnect(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        info!("Disconnected from host");
        self.state = ConnectionState::Disconnected;
    }

    /// Applies one message from the host. Returns false when it was ignored.
    pub fn handle_message(&mut self, message: Message) -> bool {
        match message {
            Message::JoinAck(ack) => self.handle_join_ack(ack),
            Message::JoinReject(reject) => {
                if self.state != ConnectionState::AwaitingHandshakeAck {
                    return false;
                }
                self.fail(format!("rejected: {}", reject.reason));
                true
            }
            Message::Snapshot(snapshot) => self.handle_snapshot(snapshot),
            Message::PeerJoined(info) => {
                if !self.is_synced() {
                    return false;
                }
                let added = self
                    .roster
                    .push(Entity::new(info.id.clone(), info.name.clone(), self.origin));
                if added {
                    info!("{} ({}) joined", info.name, info.id);
                }
                added
            }
            Message::Leave(leave) => {
                if !self.is_synced() {
                    return false;
                }
                match self.roster.remove(&leave.id) {
                    Some(entity) => {
                        info!("{} ({}) left", entity.display_name, entity.id);
                        true
                    }
                    None => false,
                }
            }
            other => {
                warn!("Ignoring unexpected {} message from host", other.tag());
                false
            }
        }
    }

    fn handle_join_ack(&mut self, ack: JoinAck) -> bool {
        if self.state != ConnectionState::AwaitingHandshakeAck {
            warn!("Ignoring JOIN_ACK outside the handshake");
            return false;
        }

        let mut roster = Roster::new();
        for peer in &ack.peers {
            roster.push(Entity::new(peer.id.clone(), peer.name.clone(), self.origin));
        }
        roster.push(Entity::new(ack.your_id.clone(), self.name.clone(), self.origin));

        info!(
            "Joined as {} on map {}, {} players",
            ack.your_id,
            ack.map_selector,
            roster.len()
        );

        self.roster = roster;
        self.local_id = Some(ack.your_id);
        self.map_selector = Some(ack.map_selector);
        self.state = ConnectionState::Synced;
        true
    }

    fn handle_snapshot(&mut self, snapshot: Snapshot) -> bool {
        if !self.is_synced() {
            return false;
        }

        let report = self.roster.apply_snapshot(&snapshot.entities);
        if !report.is_consistent() {
            debug!(
                "Snapshot {} mismatch: unknown {:?}, missing {:?}",
                snapshot.tick, report.unknown, report.stale
            );
        }
        self.last_tick = snapshot.tick;
        true
    }

    /// Records the local player's input for the next outbound message.
    pub fn set_local_input(&mut self, input: InputState) {
        self.input.merge(input);
    }

    /// The `INPUT` message for this tick, or `None` until synced. Takes the
    /// pending jump request.
    pub fn take_outbound_input(&mut self) -> Option<Message> {
        if !self.is_synced() {
            return None;
        }
        let input = self.input;
        self.input.jump = false;
        Some(Message::Input(input))
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == ConnectionState::Synced
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    pub fn local_entity(&self) -> Option<&Entity> {
        self.roster.get(self.local_id.as_deref()?)
    }

    pub fn map_selector(&self) -> Option<u32> {
        self.map_selector
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn last_tick(&self) -> u64 {
        self.last_tick
    }
}
