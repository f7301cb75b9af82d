use crate::config::{ArenaConfig, ServerConfig};
use crate::protocol::{BulletWire, CurrentPlayersMsg, GrenadeWire, PlayerWire, ServerMsg};
use crate::state::{GameState, TickEvent};
use crate::vec2::Vec2;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Upper bound on the dt fed into one tick, so a stalled process does not
/// replay a huge jump in a single simulation step.
const MAX_TICK_DT: f64 = 0.25;

/// Commands from client sessions to the game loop. Applied immediately on
/// receipt, interleaved whole with ticks.
pub enum GameCommand {
    Join {
        response: oneshot::Sender<(u32, CurrentPlayersMsg)>,
    },
    Leave {
        id: u32,
    },
    Move {
        id: u32,
        x: f64,
        y: f64,
    },
    Fire {
        id: u32,
        position: Vec2,
        velocity: Vec2,
    },
    ThrowGrenade {
        id: u32,
        position: Vec2,
    },
    Respawn {
        id: u32,
    },
}

/// Broadcasts from the game loop to all sessions.
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    All(ServerMsg),
    /// Delivered to every session except the originator
    Except { player_id: u32, msg: ServerMsg },
}

/// Run the main game loop. Owns all game state.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
    arena_config: ArenaConfig,
) {
    let mut state = GameState::new(&server_config, arena_config);

    let tick_duration = Duration::from_secs_f64(1.0 / server_config.tick_rate_hz as f64);
    let broadcast_every_n = (server_config.tick_rate_hz / server_config.broadcast_rate_hz).max(1);
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let now = Instant::now();
                // wall-clock dt so fuses and cooldowns stay honest even
                // when ticks are skipped
                let dt = (now - last_tick).as_secs_f64().min(MAX_TICK_DT);
                last_tick = now;

                for event in state.tick(dt) {
                    let msg = match event {
                        TickEvent::PlayerDamaged { id, health } => {
                            ServerMsg::PlayerDamaged { id, health }
                        }
                        TickEvent::PlayerKilled { killed_id, killer_id } => {
                            ServerMsg::PlayerKilled { killed_id, killer_id }
                        }
                        TickEvent::GrenadeExploded { id, pos } => {
                            ServerMsg::GrenadeExploded { id, position: pos }
                        }
                        TickEvent::FragmentSpawned(bullet) => {
                            ServerMsg::BulletShot(BulletWire::from_bullet(&bullet))
                        }
                    };
                    let _ = broadcast_tx.send(GameBroadcast::All(msg));
                }

                tick_count += 1;
                if tick_count % broadcast_every_n as u64 == 0 {
                    let _ = broadcast_tx.send(GameBroadcast::All(
                        ServerMsg::GameState(state.snapshot()),
                    ));
                }

                let busy = now.elapsed();
                if busy > tick_duration {
                    tracing::warn!(
                        "tick {} overran its budget: {:?} > {:?}",
                        tick_count,
                        busy,
                        tick_duration
                    );
                }
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::Join { response } => {
                        let player = state.add_player();
                        let id = player.id;
                        let welcome = state.current_players(id);
                        let _ = response.send((id, welcome));
                        let _ = broadcast_tx.send(GameBroadcast::All(
                            ServerMsg::NewPlayer(PlayerWire::from_player(&player)),
                        ));
                        tracing::info!("Player {} joined as {:?}", id, player.role);
                    }
                    GameCommand::Leave { id } => {
                        if state.remove_player(id) {
                            let _ = broadcast_tx.send(GameBroadcast::All(
                                ServerMsg::PlayerDisconnected { id },
                            ));
                            tracing::info!("Player {} left", id);
                        }
                    }
                    GameCommand::Move { id, x, y } => {
                        if state.apply_move(id, x, y) {
                            let _ = broadcast_tx.send(GameBroadcast::Except {
                                player_id: id,
                                msg: ServerMsg::PlayerMoved { id, x, y },
                            });
                        }
                    }
                    GameCommand::Fire { id, position, velocity } => {
                        if let Some(bullet) = state.fire_bullet(id, position, velocity) {
                            let _ = broadcast_tx.send(GameBroadcast::All(
                                ServerMsg::BulletShot(BulletWire::from_bullet(&bullet)),
                            ));
                        }
                    }
                    GameCommand::ThrowGrenade { id, position } => {
                        if let Some(grenade) = state.throw_grenade(id, position) {
                            let _ = broadcast_tx.send(GameBroadcast::All(
                                ServerMsg::GrenadeCreated(GrenadeWire::from_grenade(&grenade)),
                            ));
                        }
                    }
                    GameCommand::Respawn { id } => {
                        if let Some(player) = state.respawn_player(id) {
                            let _ = broadcast_tx.send(GameBroadcast::All(
                                ServerMsg::PlayerRespawned {
                                    id,
                                    x: player.pos.x,
                                    y: player.pos.y,
                                    health: player.health,
                                },
                            ));
                        }
                    }
                }
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}
