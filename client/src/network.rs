//! Connection to the host: TCP connect, the join handshake and the frame pump.

use crate::error::ClientError;
use crate::session::ClientSession;
use log::{debug, info, warn};
use shared::codec::{recv_message, send_message};
use shared::{Join, JoinAck, Message, ProtocolError};
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{sleep, timeout};

/// How long a client waits from starting the connect to receiving `JOIN_ACK`.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub handshake_timeout: Duration,
    /// Artificial round-trip delay, split between both directions.
    pub fake_ping: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: HANDSHAKE_TIMEOUT,
            fake_ping: Duration::ZERO,
        }
    }
}

/// Channels to the background reader and writer tasks.
#[derive(Debug)]
pub struct Link {
    inbound: mpsc::UnboundedReceiver<Message>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl Link {
    pub fn send(&self, message: Message) -> bool {
        self.outbound.send(message).is_ok()
    }

    /// Applies every message received since the last call. Marks the
    /// session disconnected once the reader has stopped.
    pub fn drain_into(&mut self, session: &mut ClientSession) -> usize {
        let mut applied = 0;
        loop {
            match self.inbound.try_recv() {
                Ok(message) => {
                    if session.handle_message(message) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    session.handle_disconnect();
                    break;
                }
            }
        }
        applied
    }

    /// Sends this tick's input if the session has one to send.
    pub fn send_input(&self, session: &mut ClientSession) -> bool {
        match session.take_outbound_input() {
            Some(message) => self.send(message),
            None => false,
        }
    }
}

/// Connects to `addr`, performs the join handshake and starts the pump.
///
/// The session moves through `Connecting` and `AwaitingHandshakeAck` and
/// ends in `Synced` on success or `Failed` otherwise. The handshake timeout
/// covers the TCP connect as well as the wait for `JOIN_ACK`. A single
/// attempt is made.
pub async fn join(
    session: &mut ClientSession,
    addr: &str,
    config: &NetworkConfig,
) -> Result<Link, ClientError> {
    session.begin_connect();
    info!("Connecting to {}", addr);

    let attempt = timeout(config.handshake_timeout, handshake(session, addr));
    let (reader, writer, ack) = match attempt.await {
        Ok(Ok(parts)) => parts,
        Ok(Err(e)) => {
            session.fail(e.to_string());
            return Err(e);
        }
        Err(_) => {
            session.fail("handshake timed out");
            return Err(ClientError::HandshakeTimeout(config.handshake_timeout));
        }
    };
    session.handle_message(Message::JoinAck(ack));

    let (inbound_tx, inbound) = mpsc::unbounded_channel();
    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let half_ping = config.fake_ping / 2;

    tokio::spawn(read_loop(reader, inbound_tx, half_ping));
    tokio::spawn(write_loop(writer, outbound_rx, half_ping));

    Ok(Link { inbound, outbound })
}

async fn handshake(
    session: &mut ClientSession,
    addr: &str,
) -> Result<(OwnedReadHalf, OwnedWriteHalf, JoinAck), ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY: {}", e);
    }
    let (mut reader, mut writer) = stream.into_split();

    let join = Message::Join(Join {
        name: session.name().to_string(),
    });
    send_message(&mut writer, &join).await?;
    session.begin_handshake();

    let ack = await_ack(&mut reader).await?;
    Ok((reader, writer, ack))
}

async fn await_ack(reader: &mut OwnedReadHalf) -> Result<JoinAck, ClientError> {
    loop {
        match recv_message(reader).await {
            Ok(Message::JoinAck(ack)) => return Ok(ack),
            Ok(Message::JoinReject(reject)) => return Err(ClientError::Rejected(reject.reason)),
            Ok(other) => warn!("Ignoring {} before JOIN_ACK", other.tag()),
            Err(e) if e.is_droppable() => warn!("Dropping message during handshake: {}", e),
            Err(ProtocolError::Closed) => return Err(ClientError::ClosedBeforeAck),
            Err(e) => return Err(e.into()),
        }
    }
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    inbound: mpsc::UnboundedSender<Message>,
    delay: Duration,
) {
    loop {
        match recv_message(&mut reader).await {
            Ok(message) => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                if inbound.send(message).is_err() {
                    break;
                }
            }
            Err(e) if e.is_droppable() => warn!("Dropping message from host: {}", e),
            Err(ProtocolError::Closed) => {
                info!("Host closed the connection");
                break;
            }
            Err(e) => {
                warn!("Connection to host failed: {}", e);
                break;
            }
        }
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    delay: Duration,
) {
    while let Some(message) = outbound.recv().await {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        if let Err(e) = send_message(&mut writer, &message).await {
            debug!("Stopped writing to host: {}", e);
            break;
        }
    }
}
