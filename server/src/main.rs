use arena_server::config::{ArenaConfig, ServerConfig};
use arena_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use arena_server::ws::{ws_handler, AppState};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let arena = ArenaConfig::default();

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = arena.validate() {
        eprintln!("Invalid arena configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let max_connections = config.max_connections;

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(256);

    // Spawn game loop
    let bc_tx = broadcast_tx.clone();
    tokio::spawn(async move {
        run_game_loop(game_rx, bc_tx, config, arena).await;
    });

    // Axum app
    let app_state = AppState {
        game_tx,
        broadcast_tx,
        connection_semaphore: Arc::new(Semaphore::new(max_connections)),
    };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Starting arena server on {}", listen_addr);
    println!("Arena server listening on {}", listen_addr);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
