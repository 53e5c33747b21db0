//! # Client Library
//!
//! The joining side of a session. A client connects to the host, completes
//! the `JOIN` / `JOIN_ACK` handshake and from then on sends its player's
//! input every frame while mirroring whatever the host broadcasts.
//!
//! ## Architecture Overview
//!
//! The client does no simulation of its own. Every snapshot overwrites the
//! position and velocity of each entity it names, so what is drawn is the
//! host's view of the world one network hop ago.
//!
//! ## Module Organization
//!
//! ### Session Module (`session`)
//! The connection state machine and the local roster:
//! - `Disconnected → Connecting → AwaitingHandshakeAck → Synced`
//! - Roster built from `JOIN_ACK`, kept current by `PEER_JOINED` and `LEAVE`
//! - Snapshot application by entity id
//!
//! ### Network Module (`network`)
//! - TCP connect and the 2000 ms handshake timeout
//! - Background reader and writer tasks behind a [`network::Link`]
//! - Optional artificial latency for testing
//!
//! ### Input Module (`input`)
//! Keyboard sampling: A/D or arrow keys to move, Space/W/Up to jump.
//!
//! ### Rendering Module (`rendering`)
//! Draws platforms and entities with their names, centred on the local player.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::{join, NetworkConfig};
//! use client::session::ClientSession;
//! use shared::Vec2;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = ClientSession::new("Alice", Vec2::ZERO);
//!     let mut link = join(&mut session, "127.0.0.1:8080", &NetworkConfig::default()).await?;
//!
//!     loop {
//!         link.drain_into(&mut session);
//!         link.send_input(&mut session);
//!         if session.state().is_terminal() {
//!             break;
//!         }
//!         tokio::time::sleep(std::time::Duration::from_millis(16)).await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod input;
pub mod network;
pub mod rendering;
pub mod session;

pub use error::ClientError;
