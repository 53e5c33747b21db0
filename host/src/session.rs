//! Authoritative world state owned by the host's tick loop.
//!
//! `HostSession` holds the roster and the map and is the only place
//! physics runs. Network handlers call into it between ticks to record
//! joins, leaves and inputs; `tick` then advances every entity in roster
//! order and produces the snapshot to broadcast.

use log::{debug, info, warn};
use shared::physics;
use shared::{
    Entity, InputState, JoinAck, JoinReject, Map, PeerId, PeerInfo, Roster, Snapshot,
};

/// Result of a join request.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// Reply to send to the joiner and the announcement for everyone else.
    Accepted { ack: JoinAck, announce: PeerInfo },
    Rejected(JoinReject),
}

#[derive(Debug, Clone)]
pub struct HostSession {
    map: Map,
    map_selector: u32,
    roster: Roster,
    host_id: PeerId,
    max_players: usize,
    tick: u64,
}

impl HostSession {
    /// Creates the session with the host's own entity at the map origin.
    pub fn new(
        map: Map,
        map_selector: u32,
        host_id: impl Into<PeerId>,
        host_name: impl Into<String>,
        max_players: usize,
    ) -> Self {
        let host_id = host_id.into();
        let mut roster = Roster::new();
        roster.push(Entity::new(host_id.clone(), host_name, map.origin));

        Self {
            map,
            map_selector,
            roster,
            host_id,
            max_players: max_players.max(1),
            tick: 0,
        }
    }

    pub fn handle_join(&mut self, peer: &str, name: &str) -> JoinOutcome {
        let name = name.trim();
        if name.is_empty() {
            return reject(format!("Peer {} sent an empty name", peer));
        }
        if self.roster.contains(peer) {
            return reject(format!("Peer {} has already joined", peer));
        }
        if self.roster.len() >= self.max_players {
            return reject("Lobby full".to_string());
        }

        // The joiner's peer list is the roster before it is appended.
        let ack = JoinAck {
            map_selector: self.map_selector,
            your_id: peer.to_string(),
            peers: self.roster.peers(),
        };

        let entity = Entity::new(peer, name, self.map.origin);
        let announce = PeerInfo::from(&entity);
        self.roster.push(entity);

        info!(
            "{} ({}) joined, {} players in session",
            name,
            peer,
            self.roster.len()
        );
        JoinOutcome::Accepted { ack, announce }
    }

    /// Records the latest input from a remote peer for the next tick.
    pub fn handle_input(&mut self, peer: &str, input: InputState) -> bool {
        if peer == self.host_id {
            warn!("Ignoring remote input claiming the host id {}", peer);
            return false;
        }
        match self.roster.get_mut(peer) {
            Some(entity) => {
                entity.input.merge(input);
                true
            }
            None => {
                warn!("Input from {} which has not joined", peer);
                false
            }
        }
    }

    pub fn handle_disconnect(&mut self, peer: &str) -> Option<Entity> {
        if peer == self.host_id {
            return None;
        }
        let removed = self.roster.remove(peer)?;
        info!(
            "{} ({}) left, {} players in session",
            removed.display_name,
            peer,
            self.roster.len()
        );
        Some(removed)
    }

    /// Records the host player's own input for the next tick.
    pub fn set_local_input(&mut self, input: InputState) {
        if let Some(entity) = self.roster.get_mut(&self.host_id) {
            entity.input.merge(input);
        }
    }

    /// Runs one physics pass over every entity and returns the snapshot.
    pub fn tick(&mut self, delta: f64) -> Snapshot {
        for entity in self.roster.iter_mut() {
            let report = physics::step(entity, delta, &self.map);
            if report.jumped {
                debug!("{} jumped, {} jumps left", entity.id, entity.jumps_remaining);
            }
        }
        self.tick += 1;

        Snapshot {
            tick: self.tick,
            entities: self.roster.snapshot(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }
}

fn reject(reason: String) -> JoinOutcome {
    warn!("Rejecting join: {}", reason);
    JoinOutcome::Rejected(JoinReject { reason })
}
