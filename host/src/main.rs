use clap::{Parser, ValueEnum};
use host::connections::generate_peer_id;
use host::local::{self, LocalScript};
use host::network::Host;
use host::session::HostSession;
use log::{error, info};
use shared::clock::MAX_FRAME_RATE;
use shared::{Horizontal, MapCatalog, Vec2};
use std::time::Duration;

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
#[clap(author, version, about)]
struct Args {
    /// Address to listen on; clients use it as the session id
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    bind: String,
    /// Path to the map catalog
    #[clap(long, default_value = "assets/maps.json")]
    maps: String,
    /// Map variant to host
    #[clap(short, long, default_value = "0")]
    map: u32,
    /// Display name of the host's own player
    #[clap(short, long, default_value = "Host")]
    name: String,
    /// Ticks per second
    #[clap(short, long, default_value = "60")]
    tick_rate: u32,
    /// Largest roster size, host included
    #[clap(long, default_value = "16")]
    max_players: usize,
    /// Direction the host's own player holds
    #[clap(short, long, value_enum, default_value = "none")]
    direction: Direction,
    /// Host player jumps every this many ticks (0 disables jumping)
    #[clap(long, default_value = "0")]
    jump_every: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Hint: set RUST_LOG=info (or debug) to see host logs");
    }
    env_logger::init();

    let args = Args::parse();

    let catalog = MapCatalog::load(&args.maps)?;
    let map = catalog.build(args.map as usize, Vec2::ZERO)?;
    info!(
        "Loaded map {} with {} platforms from {}",
        args.map,
        map.platforms.len(),
        args.maps
    );

    let session = HostSession::new(map, args.map, generate_peer_id(), args.name, args.max_players);

    let tick_rate = args.tick_rate.clamp(1, MAX_FRAME_RATE);
    let tick_duration = Duration::from_secs_f64(1.0 / tick_rate as f64);

    let mut host = Host::bind(&args.bind, session, tick_duration).await?;
    println!("Session id: {}", host.local_addr());

    let handle = host.handle();
    let script = LocalScript::new(args.direction.into(), args.jump_every);
    let local_task = tokio::spawn(local::drive(handle.clone(), script, tick_duration));
    let mut host_task = tokio::spawn(async move { host.run().await });

    let result = tokio::select! {
        result = &mut host_task => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            handle.shutdown();
            host_task.await
        }
    };
    local_task.abort();

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("Host stopped: {}", e);
            Err(e.into())
        }
        Err(e) => {
            error!("Host task failed: {}", e);
            Err(e.into())
        }
    }
}
