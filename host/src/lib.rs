//! # Host Library
//!
//! The authoritative side of a session. One participant runs the host; it
//! owns the only copy of the simulation that matters, applies every player's
//! input, and broadcasts the resulting positions to everyone else.
//!
//! ## Architecture
//!
//! ### Single Owner Tick Loop
//! A single tokio task owns the [`session::HostSession`] and drives it from a
//! fixed-rate interval. Network tasks never touch the roster directly; they
//! forward [`network::HostEvent`]s over a channel and the tick loop applies
//! them between physics passes, so a pass always sees a consistent roster.
//!
//! ### TCP Transport
//! Each client holds one TCP connection carrying length-prefixed frames
//! (see `shared::codec`). Delivery is reliable and ordered, so a `LEAVE`
//! can never overtake the snapshot that preceded it.
//!
//! ## Module Organization
//!
//! ### Session Module (`session`)
//! - Roster ordering and the join handshake
//! - Latest input per entity
//! - The per-tick physics pass and snapshot production
//!
//! ### Connections Module (`connections`)
//! - Peer id assignment
//! - Per-connection outbound queues
//! - Broadcasting to joined connections
//!
//! ### Network Module (`network`)
//! - Accept, read and write tasks
//! - The `select!` loop combining network events with ticks
//!
//! ### Local Module (`local`)
//! - Scripted input for the host's own player
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use host::network::Host;
//! use host::session::HostSession;
//! use shared::{MapCatalog, Vec2};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = MapCatalog::load("assets/maps.json")?;
//!     let map = catalog.build(0, Vec2::ZERO)?;
//!     let session = HostSession::new(map, 0, "host", "Host", 16);
//!
//!     let mut host = Host::bind("127.0.0.1:8080", session, Duration::from_millis(16)).await?;
//!     host.run().await?;
//!     Ok(())
//! }
//! ```

pub mod connections;
pub mod local;
pub mod network;
pub mod session;
