//! Load test for the arena server.
//!
//! Spawns multiple fake WebSocket clients that:
//! - Connect to the server
//! - Random-walk with playerMove and fire bullets periodically
//! - Receive and count gameState broadcasts
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N     Number of clients to spawn (default: 100)
//!   --duration S    Test duration in seconds (default: 30)
//!   --move-rate R   Moves per second per client (default: 10)
//!   --fire-rate R   Shots per second per client (default: 1)
//!   --url URL       Server URL (default: ws://127.0.0.1:3000/ws)

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

// === Protocol types (minimal subset) ===

#[derive(Serialize)]
struct Xy {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct PlayerMoveMsg {
    #[serde(rename = "type")]
    msg_type: &'static str,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct BulletFiredMsg {
    #[serde(rename = "type")]
    msg_type: &'static str,
    position: Xy,
    velocity: Xy,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
#[allow(dead_code)]
enum ServerMsg {
    #[serde(rename = "currentPlayers")]
    CurrentPlayers {
        #[serde(rename = "selfId")]
        self_id: u32,
    },
    #[serde(rename = "gameState")]
    GameState {
        bullets: Vec<serde_json::Value>,
    },
    #[serde(rename = "bulletShot")]
    BulletShot {},
    #[serde(rename = "playerKilled")]
    PlayerKilled {},
}

// === Metrics ===

struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    game_states_received: AtomicU64,
    bullet_shots_received: AtomicU64,
    kills_seen: AtomicU64,
    moves_sent: AtomicU64,
    shots_sent: AtomicU64,
    errors: AtomicU64,
    total_bullets_seen: AtomicU64,
}

impl Metrics {
    fn new() -> Self {
        Self {
            connected: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            game_states_received: AtomicU64::new(0),
            bullet_shots_received: AtomicU64::new(0),
            kills_seen: AtomicU64::new(0),
            moves_sent: AtomicU64::new(0),
            shots_sent: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_bullets_seen: AtomicU64::new(0),
        }
    }
}

// === Client task ===

/// Next value in [0, 1) from a simple LCG
fn next_unit(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*state >> 32) as f64 / u32::MAX as f64
}

async fn run_client(
    client_id: u32,
    url: String,
    move_rate: f64,
    fire_rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let ws_result = connect_async(&url).await;
    let (mut ws, _) = match ws_result {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics.connected.fetch_add(1, Ordering::Relaxed);

    // Wait for the currentPlayers catch-up before doing anything else
    let catch_up = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                    if text.contains("\"type\":\"currentPlayers\"") {
                        return true;
                    }
                }
                Ok(Message::Close(_)) | Err(_) => return false,
                _ => {}
            }
        }
        false
    })
    .await;

    if !matches!(catch_up, Ok(true)) {
        if client_id < 3 {
            eprintln!("Client {} never received currentPlayers", client_id);
        }
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        metrics.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    let move_interval = Duration::from_secs_f64(1.0 / move_rate.max(0.01));
    let fire_interval = Duration::from_secs_f64(1.0 / fire_rate.max(0.01));

    let mut move_timer = tokio::time::interval(move_interval);
    move_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut fire_timer = tokio::time::interval(fire_interval);
    fire_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = Instant::now() + duration;
    // Simple LCG, seeded per client
    let mut rng_state: u64 = client_id as u64 * 12345 + 67890;

    let mut x = next_unit(&mut rng_state) * 800.0;
    let mut y = next_unit(&mut rng_state) * 600.0;

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = move_timer.tick() => {
                // random walk, clamped to the arena
                x = (x + next_unit(&mut rng_state) * 20.0 - 10.0).clamp(0.0, 800.0);
                y = (y + next_unit(&mut rng_state) * 20.0 - 10.0).clamp(0.0, 600.0);
                let msg = PlayerMoveMsg { msg_type: "playerMove", x, y };
                let json = serde_json::to_string(&msg).unwrap();
                if ws.send(Message::Text(json.into())).await.is_ok() {
                    metrics.moves_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            _ = fire_timer.tick() => {
                let angle = next_unit(&mut rng_state) * std::f64::consts::TAU;
                let msg = BulletFiredMsg {
                    msg_type: "bulletFired",
                    position: Xy { x, y },
                    velocity: Xy { x: angle.cos() * 10.0, y: angle.sin() * 10.0 },
                };
                let json = serde_json::to_string(&msg).unwrap();
                if ws.send(Message::Text(json.into())).await.is_ok() {
                    metrics.shots_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        if let Ok(server_msg) = serde_json::from_str::<ServerMsg>(&text) {
                            match server_msg {
                                ServerMsg::GameState { bullets } => {
                                    metrics.game_states_received.fetch_add(1, Ordering::Relaxed);
                                    metrics.total_bullets_seen.fetch_add(bullets.len() as u64, Ordering::Relaxed);
                                }
                                ServerMsg::BulletShot {} => {
                                    metrics.bullet_shots_received.fetch_add(1, Ordering::Relaxed);
                                }
                                ServerMsg::PlayerKilled {} => {
                                    metrics.kills_seen.fetch_add(1, Ordering::Relaxed);
                                }
                                _ => {}
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => {
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 100;
    let mut duration_secs: u64 = 30;
    let mut move_rate: f64 = 10.0;
    let mut fire_rate: f64 = 1.0;
    let mut url = "ws://127.0.0.1:3000/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--move-rate" => {
                i += 1;
                move_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(10.0);
            }
            "--fire-rate" => {
                i += 1;
                fire_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(1.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Arena Server Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Duration: {}s", duration_secs);
    println!("Move rate: {}/s per client", move_rate);
    println!("Fire rate: {}/s per client", fire_rate);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::new());
    let duration = Duration::from_secs(duration_secs);

    // Spawn all clients
    let mut handles = Vec::with_capacity(num_clients as usize);

    println!("Spawning {} clients...", num_clients);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let url = url.clone();
        let metrics = Arc::clone(&metrics);

        handles.push(tokio::spawn(async move {
            run_client(client_id, url, move_rate, fire_rate, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());
    println!();

    // Print stats periodically
    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            if elapsed >= duration_secs + 5 {
                break;
            }

            let connected = metrics_clone.connected.load(Ordering::Relaxed);
            let msgs = metrics_clone.messages_received.load(Ordering::Relaxed);
            let game_states = metrics_clone.game_states_received.load(Ordering::Relaxed);
            let moves = metrics_clone.moves_sent.load(Ordering::Relaxed);
            let shots = metrics_clone.shots_sent.load(Ordering::Relaxed);
            let errors = metrics_clone.errors.load(Ordering::Relaxed);
            let bullets = metrics_clone.total_bullets_seen.load(Ordering::Relaxed);
            let avg_bullets = if game_states > 0 {
                bullets / game_states
            } else {
                0
            };

            println!(
                "[{:3}s] connected={}, msgs={}, game_states={}, moves={}, shots={}, errors={}, avg_bullets={}",
                elapsed, connected, msgs, game_states, moves, shots, errors, avg_bullets
            );
        }
    });

    // Wait for all clients to finish
    for handle in handles {
        let _ = handle.await;
    }

    stats_handle.abort();

    // Final stats
    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let game_states = metrics.game_states_received.load(Ordering::Relaxed);
    let bullet_shots = metrics.bullet_shots_received.load(Ordering::Relaxed);
    let kills = metrics.kills_seen.load(Ordering::Relaxed);
    let moves = metrics.moves_sent.load(Ordering::Relaxed);
    let shots = metrics.shots_sent.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);
    let bullets = metrics.total_bullets_seen.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total gameState messages: {}", game_states);
    println!("Total bulletShot messages: {}", bullet_shots);
    println!("Total playerKilled messages: {}", kills);
    println!("Total playerMove sent: {}", moves);
    println!("Total bulletFired sent: {}", shots);
    println!("Total errors: {}", errors);
    println!(
        "Average bullets in flight: {}",
        if game_states > 0 {
            bullets / game_states
        } else {
            0
        }
    );

    let msgs_per_sec = msgs as f64 / duration_secs as f64;
    let game_states_per_client = game_states as f64 / num_clients as f64;

    println!();
    println!("Messages/sec (total): {:.0}", msgs_per_sec);
    println!("Game states per client: {:.1}", game_states_per_client);
    println!(
        "Expected game states per client: {:.1}",
        duration_secs as f64 * 60.0
    ); // 60 Hz broadcast

    let delivery_rate = game_states_per_client / (duration_secs as f64 * 60.0) * 100.0;
    println!("Delivery rate: {:.1}%", delivery_rate);
}
