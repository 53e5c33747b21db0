//! Wire messages exchanged between host and clients.
//!
//! Every message travels as an [`Envelope`]: a tag string plus the bincode
//! encoding of that tag's body. Receivers decode the envelope first and
//! only then the body, so an unknown tag can be logged and skipped without
//! tearing down the session.

use crate::entity::{Entity, InputState, PeerId, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TAG_JOIN: &str = "JOIN";
pub const TAG_JOIN_ACK: &str = "JOIN_ACK";
pub const TAG_JOIN_REJECT: &str = "JOIN_REJECT";
pub const TAG_INPUT: &str = "INPUT";
pub const TAG_SNAPSHOT: &str = "SNAPSHOT";
pub const TAG_PEER_JOINED: &str = "PEER_JOINED";
pub const TAG_LEAVE: &str = "LEAVE";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown message tag {0:?}")]
    UnknownTag(String),
    #[error("malformed {tag} payload: {source}")]
    Payload {
        tag: String,
        #[source]
        source: bincode::Error,
    },
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed")]
    Closed,
}

impl ProtocolError {
    /// True when the offending message can be dropped and the session kept.
    pub fn is_droppable(&self) -> bool {
        matches!(
            self,
            ProtocolError::UnknownTag(_) | ProtocolError::Payload { .. } | ProtocolError::Codec(_)
        )
    }
}

/// Identity of a connected participant as announced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: PeerId,
    pub name: String,
}

impl From<&Entity> for PeerInfo {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.display_name.clone(),
        }
    }
}

/// Authoritative kinematic state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: PeerId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl EntitySnapshot {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            x: entity.position.x,
            y: entity.position.y,
            vx: entity.velocity.x,
            vy: entity.velocity.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinAck {
    pub map_selector: u32,
    /// Identifier the host assigned to the joining connection.
    pub your_id: PeerId,
    /// Roster as it was before the joiner was appended, in roster order.
    pub peers: Vec<PeerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinReject {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    /// One entry per roster entity, in roster order.
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leave {
    pub id: PeerId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Join(Join),
    JoinAck(JoinAck),
    JoinReject(JoinReject),
    Input(InputState),
    Snapshot(Snapshot),
    PeerJoined(PeerInfo),
    Leave(Leave),
}

impl Message {
    pub fn tag(&self) -> &'static str {
        match self {
            Message::Join(_) => TAG_JOIN,
            Message::JoinAck(_) => TAG_JOIN_ACK,
            Message::JoinReject(_) => TAG_JOIN_REJECT,
            Message::Input(_) => TAG_INPUT,
            Message::Snapshot(_) => TAG_SNAPSHOT,
            Message::PeerJoined(_) => TAG_PEER_JOINED,
            Message::Leave(_) => TAG_LEAVE,
        }
    }

    pub fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        let payload = match self {
            Message::Join(body) => bincode::serialize(body)?,
            Message::JoinAck(body) => bincode::serialize(body)?,
            Message::JoinReject(body) => bincode::serialize(body)?,
            Message::Input(body) => bincode::serialize(body)?,
            Message::Snapshot(body) => bincode::serialize(body)?,
            Message::PeerJoined(body) => bincode::serialize(body)?,
            Message::Leave(body) => bincode::serialize(body)?,
        };

        Ok(Envelope {
            tag: self.tag().to_string(),
            payload,
        })
    }

    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        let tag = envelope.tag.as_str();
        let payload = envelope.payload.as_slice();

        let message = match tag {
            TAG_JOIN => Message::Join(decode_body(tag, payload)?),
            TAG_JOIN_ACK => Message::JoinAck(decode_body(tag, payload)?),
            TAG_JOIN_REJECT => Message::JoinReject(decode_body(tag, payload)?),
            TAG_INPUT => Message::Input(decode_body(tag, payload)?),
            TAG_SNAPSHOT => Message::Snapshot(decode_body(tag, payload)?),
            TAG_PEER_JOINED => Message::PeerJoined(decode_body(tag, payload)?),
            TAG_LEAVE => Message::Leave(decode_body(tag, payload)?),
            unknown => return Err(ProtocolError::UnknownTag(unknown.to_string())),
        };
        Ok(message)
    }
}

fn decode_body<T: serde::de::DeserializeOwned>(tag: &str, payload: &[u8]) -> Result<T, ProtocolError> {
    bincode::deserialize(payload).map_err(|source| ProtocolError::Payload {
        tag: tag.to_string(),
        source,
    })
}

/// Two-element `(tag, payload)` wire structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub tag: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
