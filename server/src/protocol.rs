use crate::player::{Player, PlayerRole};
use crate::state::{Bullet, Grenade};
use crate::vec2::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMsg {
    /// Unicast full-state catch-up sent once per connection
    #[serde(rename = "currentPlayers")]
    CurrentPlayers(CurrentPlayersMsg),
    #[serde(rename = "newPlayer")]
    NewPlayer(PlayerWire),
    /// Relayed to every session except the mover
    #[serde(rename = "playerMoved")]
    PlayerMoved { id: u32, x: f64, y: f64 },
    #[serde(rename = "bulletShot")]
    BulletShot(BulletWire),
    #[serde(rename = "grenadeCreated")]
    GrenadeCreated(GrenadeWire),
    #[serde(rename = "grenadeExploded")]
    GrenadeExploded { id: u32, position: Vec2 },
    #[serde(rename = "playerRespawned")]
    PlayerRespawned { id: u32, x: f64, y: f64, health: u32 },
    #[serde(rename = "playerKilled")]
    PlayerKilled {
        #[serde(rename = "killedId")]
        killed_id: u32,
        /// May reference a player who has since disconnected
        #[serde(rename = "killerId")]
        killer_id: u32,
    },
    #[serde(rename = "playerDamaged")]
    PlayerDamaged { id: u32, health: u32 },
    #[serde(rename = "playerDisconnected")]
    PlayerDisconnected { id: u32 },
    /// Periodic tick snapshot
    #[serde(rename = "gameState")]
    GameState(GameStateMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlayersMsg {
    pub self_id: u32,
    pub players: HashMap<u32, PlayerWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateMsg {
    pub players: HashMap<u32, PlayerWire>,
    pub bullets: Vec<BulletWire>,
    pub grenades: Vec<GrenadeWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub health: u32,
    #[serde(rename = "type")]
    pub role: PlayerRole,
    pub name: String,
    pub is_dead: bool,
    pub kills: u32,
    pub deaths: u32,
    pub bullets_fired: u32,
    pub special_ability_cooldown: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletWire {
    pub id: u32,
    pub owner_id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrenadeWire {
    pub id: u32,
    pub owner_id: u32,
    pub position: Vec2,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Unvalidated position update (trusted by design)
    #[serde(rename = "playerMove")]
    PlayerMove { x: f64, y: f64 },
    /// The claimed ownerId is accepted on the wire but the server always
    /// attributes the bullet to the sending session.
    #[serde(rename = "bulletFired")]
    BulletFired {
        position: Vec2,
        velocity: Vec2,
        #[serde(rename = "ownerId", default)]
        owner_id: Option<u32>,
    },
    #[serde(rename = "grenadeThrown")]
    GrenadeThrown {
        position: Vec2,
        #[serde(rename = "ownerId", default)]
        owner_id: Option<u32>,
    },
    /// Only meaningful while dead
    #[serde(rename = "playerRespawn")]
    PlayerRespawn,
}

// === Conversion helpers ===

/// Round to 2 decimal places (well below rendering precision, saves JSON size)
#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl PlayerWire {
    pub fn from_player(player: &Player) -> Self {
        Self {
            id: player.id,
            x: round2(player.pos.x),
            y: round2(player.pos.y),
            health: player.health,
            role: player.role,
            name: player.name.clone(),
            is_dead: player.is_dead,
            kills: player.kills,
            deaths: player.deaths,
            bullets_fired: player.bullets_fired,
            special_ability_cooldown: round2(player.special_ability_cooldown),
        }
    }
}

impl BulletWire {
    pub fn from_bullet(bullet: &Bullet) -> Self {
        Self {
            id: bullet.id,
            owner_id: bullet.owner_id,
            position: Vec2::new(round2(bullet.pos.x), round2(bullet.pos.y)),
            velocity: Vec2::new(round2(bullet.vel.x), round2(bullet.vel.y)),
        }
    }
}

impl GrenadeWire {
    pub fn from_grenade(grenade: &Grenade) -> Self {
        Self {
            id: grenade.id,
            owner_id: grenade.owner_id,
            position: Vec2::new(round2(grenade.pos.x), round2(grenade.pos.y)),
        }
    }
}
