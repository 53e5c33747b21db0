//! Headless client that joins a session and holds one direction.

use clap::{Parser, ValueEnum};
use client::network::{join, NetworkConfig};
use client::session::ClientSession;
use log::info;
use shared::{Horizontal, InputState, MapCatalog, Vec2};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Direction {
    Left,
    None,
    Right,
}

impl From<Direction> for Horizontal {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => Horizontal::Left,
            Direction::None => Horizontal::Neutral,
            Direction::Right => Horizontal::Right,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session id printed by the host (its ip:port)
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    host: String,

    /// Path to the map catalog
    #[arg(short, long, default_value = "assets/maps.json")]
    maps: String,

    #[arg(short, long, default_value = "Bot")]
    name: String,

    /// Number of 60 Hz ticks to run before leaving
    #[arg(short, long, default_value = "600")]
    ticks: u32,

    #[arg(short, long, value_enum, default_value = "right")]
    direction: Direction,

    /// Jump every this many ticks (0 disables jumping)
    #[arg(long, default_value = "0")]
    jump_every: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }
    env_logger::init();

    let args = Args::parse();
    let catalog = MapCatalog::load(&args.maps)?;

    let mut session = ClientSession::new(args.name.clone(), Vec2::ZERO);
    let mut link = join(&mut session, &args.host, &NetworkConfig::default()).await?;

    if let Some(selector) = session.map_selector() {
        let map = catalog.build(selector as usize, Vec2::ZERO)?;
        info!("Host is running map {} ({} platforms)", selector, map.platforms.len());
    }

    let mut ticker = interval(Duration::from_millis(16));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    for tick in 0..args.ticks {
        ticker.tick().await;

        link.drain_into(&mut session);
        if session.state().is_terminal() {
            info!("Session ended: {:?}", session.state());
            break;
        }

        let jump = args.jump_every > 0 && tick % args.jump_every == 0;
        session.set_local_input(InputState::new(args.direction.into(), jump));
        link.send_input(&mut session);
    }

    match session.local_entity() {
        Some(entity) => println!(
            "{} finished at ({:.1}, {:.1}) with {} players in session",
            entity.display_name,
            entity.position.x,
            entity.position.y,
            session.roster().len()
        ),
        None => println!("{} never joined", args.name),
    }

    Ok(())
}
