use clap::Parser;
use client::input::InputManager;
use client::network::{join, Link, NetworkConfig};
use client::rendering::Renderer;
use client::session::ClientSession;
use log::{error, info};
use macroquad::prelude::*;
use shared::{Map, MapCatalog, Vec2 as WorldVec};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session id printed by the host (its ip:port)
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    host: String,

    /// Path to the map catalog
    #[arg(short, long, default_value = "assets/maps.json")]
    maps: String,

    /// Display name
    #[arg(short, long, default_value = "Player")]
    name: String,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,
}

type JoinResult = (ClientSession, Option<Link>);

fn window_conf() -> Conf {
    Conf {
        window_title: "Zoo Battles".to_owned(),
        window_width: 1024,
        window_height: 640,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }
    env_logger::init();

    let args = Args::parse();

    let catalog = match MapCatalog::load(&args.maps) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Cannot load maps from {}: {}", args.maps, e);
            return;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start network runtime: {}", e);
            return;
        }
    };

    info!("Connecting to: {}", args.host);
    if args.fake_ping > 0 {
        info!("Simulating {}ms latency", args.fake_ping);
    }
    info!("Controls: A/D or arrows to move, Space to jump, Esc to quit");

    let config = NetworkConfig {
        fake_ping: Duration::from_millis(args.fake_ping),
        ..NetworkConfig::default()
    };
    let mut pending = Some(spawn_join(&runtime, &args, config));

    let mut session = ClientSession::new(args.name.clone(), WorldVec::ZERO);
    session.begin_connect();
    let mut link: Option<Link> = None;
    let mut map: Option<Map> = None;

    let input_manager = InputManager::new();
    let mut renderer = Renderer::new(screen_width(), screen_height());

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if let Some(rx) = pending.as_mut() {
            match rx.try_recv() {
                Ok((joined, joined_link)) => {
                    session = joined;
                    link = joined_link;
                    pending = None;

                    if let Some(selector) = session.map_selector() {
                        match catalog.build(selector as usize, WorldVec::ZERO) {
                            Ok(built) => map = Some(built),
                            Err(e) => {
                                error!("Host selected an unusable map: {}", e);
                                session.fail(e.to_string());
                                link = None;
                            }
                        }
                    }
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    session.fail("network task stopped");
                    pending = None;
                }
            }
        }

        let input = input_manager.update();
        if let Some(link) = link.as_mut() {
            link.drain_into(&mut session);
            session.set_local_input(input);
            link.send_input(&mut session);
        }

        let empty = Map::new(WorldVec::ZERO, Vec::new());
        renderer.render(&session, map.as_ref().unwrap_or(&empty), args.fake_ping);

        next_frame().await;
    }

    info!("Client closed");
}

/// Runs the handshake on the network runtime and hands back the session.
fn spawn_join(
    runtime: &tokio::runtime::Runtime,
    args: &Args,
    config: NetworkConfig,
) -> oneshot::Receiver<JoinResult> {
    let (tx, rx) = oneshot::channel();
    let addr = args.host.clone();
    let mut session = ClientSession::new(args.name.clone(), WorldVec::ZERO);

    runtime.spawn(async move {
        let link = match join(&mut session, &addr, &config).await {
            Ok(link) => Some(link),
            Err(e) => {
                error!("Could not join {}: {}", addr, e);
                None
            }
        };
        let _ = tx.send((session, link));
    });

    rx
}
