//! Types and simulation code used by both the host and its clients.

pub mod clock;
pub mod codec;
pub mod entity;
pub mod map;
pub mod physics;
pub mod protocol;
pub mod roster;

pub use entity::{
    Entity, Horizontal, InputState, PeerId, Rect, Tunables, Vec2, ENTITY_HEIGHT, ENTITY_WIDTH,
};
pub use map::{Map, MapCatalog, MapError};
pub use protocol::{
    EntitySnapshot, Envelope, Join, JoinAck, JoinReject, Leave, Message, PeerInfo,
    ProtocolError, Snapshot,
};
pub use roster::{Roster, SnapshotReport};
