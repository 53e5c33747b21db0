//! Host network layer: TCP accept/read/write tasks and the tick loop.

use crate::connections::{generate_peer_id, Connection, ConnectionRegistry};
use crate::session::{HostSession, JoinOutcome};
use log::{debug, error, info, warn};
use shared::clock::FrameClock;
use shared::codec::{recv_message, write_frame};
use shared::{Envelope, InputState, Leave, Message, PeerId, ProtocolError};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// Events delivered to the tick loop by network tasks and the local player.
#[derive(Debug)]
pub enum HostEvent {
    Connected {
        peer: PeerId,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<Envelope>,
    },
    Message {
        peer: PeerId,
        message: Message,
    },
    Disconnected {
        peer: PeerId,
    },
    LocalInput(InputState),
    Shutdown,
}

/// Cloneable handle for feeding the host from outside its task.
#[derive(Debug, Clone)]
pub struct HostHandle {
    events: mpsc::UnboundedSender<HostEvent>,
}

impl HostHandle {
    pub fn set_local_input(&self, input: InputState) -> bool {
        self.events.send(HostEvent::LocalInput(input)).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.events.send(HostEvent::Shutdown).is_ok()
    }
}

/// Authoritative host coordinating connections and the simulation.
pub struct Host {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    session: HostSession,
    connections: ConnectionRegistry,
    tick_duration: Duration,

    events_tx: mpsc::UnboundedSender<HostEvent>,
    events_rx: mpsc::UnboundedReceiver<HostEvent>,
}

impl Host {
    pub async fn bind(addr: &str, session: HostSession, tick_duration: Duration) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Host listening on {}", local_addr);

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Host {
            listener: Some(listener),
            local_addr,
            session,
            connections: ConnectionRegistry::new(),
            tick_duration,
            events_tx,
            events_rx,
        })
    }

    /// Address clients connect to. This is the session identifier.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> HostHandle {
        HostHandle {
            events: self.events_tx.clone(),
        }
    }

    pub fn session(&self) -> &HostSession {
        &self.session
    }

    /// Runs until a shutdown event arrives.
    pub async fn run(&mut self) -> io::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "host is already running"))?;
        let accept_task = tokio::spawn(accept_loop(listener, self.events_tx.clone()));

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = FrameClock::new();

        info!(
            "Host started, session id {}, host player {}, up to {} players",
            self.local_addr,
            self.session.host_id(),
            self.session.max_players()
        );

        loop {
            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => {
                            if !self.handle_event(event) {
                                break;
                            }
                        }
                        None => break,
                    }
                },

                _ = tick_interval.tick() => {
                    let delta = clock.tick();
                    self.run_tick(delta);
                },
            }
        }

        info!("Host shutting down after {} ticks", self.session.tick_count());
        accept_task.abort();
        Ok(())
    }

    fn run_tick(&mut self, delta: f64) {
        let snapshot = self.session.tick(delta);
        let tick = snapshot.tick;

        if self.connections.joined_count() > 0 {
            self.connections.broadcast(&Message::Snapshot(snapshot), None);
        }

        if tick % 60 == 0 {
            debug!(
                "Tick {}: {} players, {} connections, delta {:.2}",
                tick,
                self.session.roster().len(),
                self.connections.len(),
                delta
            );
        }
    }

    /// Applies one event. Returns false when the loop should stop.
    fn handle_event(&mut self, event: HostEvent) -> bool {
        match event {
            HostEvent::Connected { peer, addr, sender } => {
                self.connections.add(Connection::new(peer, addr, sender));
            }
            HostEvent::Message { peer, message } => self.handle_message(&peer, message),
            HostEvent::Disconnected { peer } => self.handle_disconnect(&peer),
            HostEvent::LocalInput(input) => self.session.set_local_input(input),
            HostEvent::Shutdown => return false,
        }
        true
    }

    fn handle_message(&mut self, peer: &str, message: Message) {
        match message {
            Message::Join(join) => {
                if self.connections.get(peer).is_none() {
                    warn!("Join from unregistered connection {}", peer);
                    return;
                }
                match self.session.handle_join(peer, &join.name) {
                    JoinOutcome::Accepted { ack, announce } => {
                        self.connections.send_to(peer, &Message::JoinAck(ack));
                        self.connections.mark_joined(peer);
                        self.connections
                            .broadcast(&Message::PeerJoined(announce), Some(peer));
                    }
                    JoinOutcome::Rejected(reject) => {
                        self.connections.send_to(peer, &Message::JoinReject(reject));
                    }
                }
            }
            Message::Input(input) => {
                if !self.connections.is_joined(peer) {
                    warn!("Dropping input from {} before join", peer);
                    return;
                }
                self.session.handle_input(peer, input);
            }
            other => {
                warn!("Unexpected {} message from {}", other.tag(), peer);
            }
        }
    }

    fn handle_disconnect(&mut self, peer: &str) {
        self.connections.remove(peer);
        if self.session.handle_disconnect(peer).is_some() {
            self.connections.broadcast(
                &Message::Leave(Leave {
                    id: peer.to_string(),
                }),
                None,
            );
        }
    }
}

async fn accept_loop(listener: TcpListener, events: mpsc::UnboundedSender<HostEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
                }

                let peer = generate_peer_id();
                let (reader, writer) = stream.into_split();
                let (sender, outbound) = mpsc::unbounded_channel();

                // Registered before the reader starts so its messages find the connection.
                let connected = HostEvent::Connected {
                    peer: peer.clone(),
                    addr,
                    sender,
                };
                if events.send(connected).is_err() {
                    break;
                }

                tokio::spawn(write_loop(peer.clone(), writer, outbound));
                tokio::spawn(read_loop(peer, reader, events.clone()));
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

async fn read_loop(
    peer: PeerId,
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<HostEvent>,
) {
    loop {
        match recv_message(&mut reader).await {
            Ok(message) => {
                let event = HostEvent::Message {
                    peer: peer.clone(),
                    message,
                };
                if events.send(event).is_err() {
                    return;
                }
            }
            Err(e) if e.is_droppable() => {
                warn!("Dropping message from {}: {}", peer, e);
            }
            Err(ProtocolError::Closed) => break,
            Err(e) => {
                warn!("Connection to {} failed: {}", peer, e);
                break;
            }
        }
    }

    let _ = events.send(HostEvent::Disconnected { peer });
}

async fn write_loop(
    peer: PeerId,
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<Envelope>,
) {
    while let Some(envelope) = outbound.recv().await {
        if let Err(e) = write_frame(&mut writer, &envelope).await {
            debug!("Stopped writing to {}: {}", peer, e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Horizontal, Join, Map, Vec2};

    async fn test_host(max_players: usize) -> Host {
        let session = HostSession::new(Map::new(Vec2::ZERO, vec![]), 0, "h", "Host", max_players);
        Host::bind("127.0.0.1:0", session, Duration::from_millis(16))
            .await
            .unwrap()
    }

    fn connect(host: &mut Host, peer: &str) -> mpsc::UnboundedReceiver<Envelope> {
        let (sender, outbound) = mpsc::unbounded_channel();
        host.handle_event(HostEvent::Connected {
            peer: peer.to_string(),
            addr: "127.0.0.1:9000".parse().unwrap(),
            sender,
        });
        outbound
    }

    fn join(host: &mut Host, peer: &str, name: &str) {
        host.handle_event(HostEvent::Message {
            peer: peer.to_string(),
            message: Message::Join(Join {
                name: name.to_string(),
            }),
        });
    }

    fn next(outbound: &mut mpsc::UnboundedReceiver<Envelope>) -> Message {
        Message::from_envelope(&outbound.try_recv().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_bind_reports_ephemeral_port() {
        let host = test_host(16).await;
        assert_ne!(host.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_join_acks_and_announces() {
        let mut host = test_host(16).await;
        let mut rx_a = connect(&mut host, "a");
        let mut rx_b = connect(&mut host, "b");

        join(&mut host, "a", "Alice");
        match next(&mut rx_a) {
            Message::JoinAck(ack) => {
                assert_eq!(ack.your_id, "a");
                assert_eq!(ack.peers.len(), 1);
                assert_eq!(ack.peers[0].id, "h");
            }
            other => panic!("Expected JoinAck, got {:?}", other),
        }

        join(&mut host, "b", "Bob");
        match next(&mut rx_b) {
            Message::JoinAck(ack) => {
                let ids: Vec<&str> = ack.peers.iter().map(|p| p.id.as_str()).collect();
                assert_eq!(ids, vec!["h", "a"]);
            }
            other => panic!("Expected JoinAck, got {:?}", other),
        }
        match next(&mut rx_a) {
            Message::PeerJoined(info) => assert_eq!(info.name, "Bob"),
            other => panic!("Expected PeerJoined, got {:?}", other),
        }
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_host_rejects_join() {
        let mut host = test_host(1).await;
        let mut rx = connect(&mut host, "a");

        join(&mut host, "a", "Alice");
        assert!(matches!(next(&mut rx), Message::JoinReject(_)));
        assert!(!host.connections.is_joined("a"));
    }

    #[tokio::test]
    async fn test_input_before_join_is_dropped() {
        let mut host = test_host(16).await;
        let _rx = connect(&mut host, "a");

        host.handle_event(HostEvent::Message {
            peer: "a".to_string(),
            message: Message::Input(InputState::new(Horizontal::Right, false)),
        });
        assert_eq!(host.session().roster().len(), 1);
    }

    #[tokio::test]
    async fn test_tick_broadcasts_snapshot_to_joined() {
        let mut host = test_host(16).await;
        let mut rx_a = connect(&mut host, "a");
        let mut rx_idle = connect(&mut host, "idle");
        join(&mut host, "a", "Alice");
        next(&mut rx_a);

        host.run_tick(1.0);

        match next(&mut rx_a) {
            Message::Snapshot(snapshot) => {
                assert_eq!(snapshot.tick, 1);
                assert_eq!(snapshot.entities.len(), 2);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }
        assert!(rx_idle.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_leave() {
        let mut host = test_host(16).await;
        let mut rx_a = connect(&mut host, "a");
        let _rx_b = connect(&mut host, "b");
        join(&mut host, "a", "Alice");
        join(&mut host, "b", "Bob");
        next(&mut rx_a);
        next(&mut rx_a);

        host.handle_event(HostEvent::Disconnected {
            peer: "b".to_string(),
        });

        match next(&mut rx_a) {
            Message::Leave(leave) => assert_eq!(leave.id, "b"),
            other => panic!("Expected Leave, got {:?}", other),
        }
        assert_eq!(host.session().roster().len(), 2);
        assert!(host.connections.get("b").is_none());
    }

    #[tokio::test]
    async fn test_local_input_moves_host_entity() {
        let mut host = test_host(16).await;
        let mut rx_a = connect(&mut host, "a");
        join(&mut host, "a", "Alice");
        next(&mut rx_a);

        assert!(host
            .handle()
            .set_local_input(InputState::new(Horizontal::Right, false)));
        let event = host.events_rx.try_recv().unwrap();
        assert!(host.handle_event(event));

        host.run_tick(1.0);

        match next(&mut rx_a) {
            Message::Snapshot(snapshot) => {
                assert_eq!(snapshot.entities[0].id, "h");
                assert!(snapshot.entities[0].vx > 0.0);
                assert_eq!(snapshot.entities[1].vx, 0.0);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_event_stops_loop() {
        let mut host = test_host(16).await;
        assert!(!host.handle_event(HostEvent::Shutdown));
        assert!(host.handle_event(HostEvent::LocalInput(InputState::default())));
    }
}
