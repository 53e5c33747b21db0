//! Registry of open peer connections on the host.
//!
//! Each accepted connection gets a fresh peer id and an outbound channel
//! drained by its writer task. A connection only receives snapshots and
//! roster announcements once its join has been accepted.

use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use shared::{Envelope, Message, PeerId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;

/// Length of generated peer ids.
pub const PEER_ID_LEN: usize = 10;

/// Generates a short random alphanumeric peer id.
pub fn generate_peer_id() -> PeerId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PEER_ID_LEN)
        .map(char::from)
        .collect()
}

/// One open connection and its outbound queue.
#[derive(Debug)]
pub struct Connection {
    pub id: PeerId,
    pub addr: SocketAddr,
    pub connected_at: Instant,
    pub joined: bool,
    sender: mpsc::UnboundedSender<Envelope>,
}

impl Connection {
    pub fn new(id: PeerId, addr: SocketAddr, sender: mpsc::UnboundedSender<Envelope>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            joined: false,
            sender,
        }
    }

    /// Queues an envelope for the writer task. False once the writer is gone.
    pub fn send(&self, envelope: Envelope) -> bool {
        self.sender.send(envelope).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<PeerId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, connection: Connection) {
        info!("Peer {} connected from {}", connection.id, connection.addr);
        self.connections.insert(connection.id.clone(), connection);
    }

    /// Drops the connection and with it the writer's queue.
    pub fn remove(&mut self, id: &str) -> Option<Connection> {
        let connection = self.connections.remove(id)?;
        info!(
            "Peer {} disconnected after {:.1?}",
            id,
            connection.connected_at.elapsed()
        );
        Some(connection)
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn mark_joined(&mut self, id: &str) -> bool {
        match self.connections.get_mut(id) {
            Some(connection) => {
                connection.joined = true;
                true
            }
            None => false,
        }
    }

    pub fn is_joined(&self, id: &str) -> bool {
        self.connections.get(id).is_some_and(|c| c.joined)
    }

    pub fn send_to(&self, id: &str, message: &Message) -> bool {
        let Some(connection) = self.connections.get(id) else {
            return false;
        };
        match message.to_envelope() {
            Ok(envelope) => connection.send(envelope),
            Err(e) => {
                warn!("Failed to encode {} for {}: {}", message.tag(), id, e);
                false
            }
        }
    }

    /// Sends to every joined connection except `exclude`. Returns the number
    /// of connections the message was queued for.
    pub fn broadcast(&self, message: &Message, exclude: Option<&str>) -> usize {
        let envelope = match message.to_envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Failed to encode {} for broadcast: {}", message.tag(), e);
                return 0;
            }
        };

        self.connections
            .values()
            .filter(|c| c.joined && Some(c.id.as_str()) != exclude)
            .filter(|c| c.send(envelope.clone()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn joined_count(&self) -> usize {
        self.connections.values().filter(|c| c.joined).count()
    }
}
