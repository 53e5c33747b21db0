//! Performance benchmarks for the simulation and wire format

use host::session::HostSession;
use shared::physics::{self, advance};
use shared::{
    Entity, Envelope, Horizontal, InputState, Map, MapCatalog, Message, Rect, Roster, Snapshot,
    Vec2,
};
use std::time::Instant;

fn platform_field(count: usize) -> Vec<Rect> {
    (0..count)
        .map(|i| Rect::new((i as f64) * 600.0 - 3000.0, 100.0 + (i % 3) as f64 * 150.0, 500.0, 100.0))
        .collect()
}

/// Benchmarks bounding-box overlap tests
#[test]
fn benchmark_overlap_detection() {
    let entity = Entity::new("a", "A", Vec2::new(100.0, 100.0));
    let platform = Rect::new(110.0, 150.0, 500.0, 100.0);

    let iterations = 100_000;
    let start = Instant::now();

    let mut hits = 0;
    for _ in 0..iterations {
        if entity.bounds().overlaps(&platform) {
            hits += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Overlap detection: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(hits, iterations);
    assert!(duration.as_millis() < 100);
}

/// Benchmarks a full physics pass over many entities and platforms
#[test]
fn benchmark_physics_simulation() {
    let platforms = platform_field(20);
    let mut entities: Vec<Entity> = (0..100)
        .map(|i| {
            let mut entity = Entity::new(format!("e{}", i), "bench", Vec2::new(i as f64 * 30.0 - 1500.0, -200.0));
            entity.input = InputState::new(Horizontal::from_axis((i % 3) as i8 - 1), false);
            entity
        })
        .collect();

    let iterations = 1000;
    let start = Instant::now();

    for _ in 0..iterations {
        for entity in &mut entities {
            physics::apply_input(entity, 1.0);
            advance(entity, 1.0, &platforms, Vec2::ZERO);
        }
    }

    let duration = start.elapsed();
    println!(
        "Physics simulation: {} entities x {} ticks in {:?}",
        entities.len(),
        iterations,
        duration
    );

    for entity in &entities {
        assert!(entity.position.y <= physics::RESPAWN_THRESHOLD_Y);
        assert!(entity.jumps_remaining <= entity.tunables.max_jumps);
    }
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks the host tick with a full lobby
#[test]
fn benchmark_host_tick() {
    let catalog = MapCatalog::from_json_str(
        r#"{"maps": [{"largeRects": [{"x": -250, "y": 100}, {"x": 400, "y": 0}],
                       "smallRects": [{"x": -600, "y": -100}]}]}"#,
    )
    .unwrap();
    let map = catalog.build(0, Vec2::ZERO).unwrap();
    let mut session = HostSession::new(map, 0, "host", "Host", 16);
    for i in 0..15 {
        session.handle_join(&format!("p{}", i), &format!("Player {}", i));
    }

    let iterations = 10_000;
    let start = Instant::now();

    for i in 0..iterations {
        let input = InputState::new(Horizontal::Right, i % 30 == 0);
        session.handle_input("p3", input);
        let snapshot = session.tick(1.0);
        assert_eq!(snapshot.entities.len(), 16);
    }

    let duration = start.elapsed();
    println!(
        "Host tick: {} ticks with 16 players in {:?} ({:.2} μs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks snapshot encoding for a full lobby
#[test]
fn benchmark_snapshot_serialization() {
    let mut roster = Roster::new();
    for i in 0..16 {
        roster.push(Entity::new(format!("peer{:06}", i), "p", Vec2::new(i as f64, 0.0)));
    }

    let iterations = 10_000;
    let start = Instant::now();

    let mut bytes = 0;
    for tick in 0..iterations {
        let message = Message::Snapshot(Snapshot {
            tick,
            entities: roster.snapshot(),
        });
        let encoded = message.to_envelope().unwrap().encode().unwrap();
        bytes = encoded.len();

        let decoded = Message::from_envelope(&Envelope::decode(&encoded).unwrap()).unwrap();
        assert!(matches!(decoded, Message::Snapshot(_)));
    }

    let duration = start.elapsed();
    println!(
        "Snapshot encode+decode: {} iterations in {:?} ({} bytes each)",
        iterations, duration, bytes
    );

    assert!(bytes < 2048);
    assert!(duration.as_millis() < 2000);
}

/// Stress test: applying snapshots to a client roster
#[test]
fn stress_test_snapshot_application() {
    let mut host = Roster::new();
    let mut mirror = Roster::new();
    for i in 0..16 {
        let id = format!("p{}", i);
        host.push(Entity::new(id.clone(), "p", Vec2::ZERO));
        mirror.push(Entity::new(id, "p", Vec2::ZERO));
    }
    let map = Map::new(Vec2::ZERO, platform_field(5));

    let start = Instant::now();
    for _ in 0..5_000 {
        for entity in host.iter_mut() {
            physics::step(entity, 1.0, &map);
        }
        let report = mirror.apply_snapshot(&host.snapshot());
        assert!(report.is_consistent());
    }
    let duration = start.elapsed();

    println!("Snapshot application: 5000 rounds in {:?}", duration);
    for (a, b) in host.iter().zip(mirror.iter()) {
        assert_eq!(a.position, b.position);
    }
    assert!(duration.as_millis() < 2000);
}
