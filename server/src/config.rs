/// Combat and arena tuning. Values mirror the original game: three 34-damage
/// hits kill a 100-health player, the last one clamping to exactly 0.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
    /// Distance below which a bullet hits a player
    pub hit_radius: f64,
    pub bullet_damage: u32,
    pub max_health: u32,
    /// Arena units per second per unit of bullet velocity.
    /// 60.0 makes one velocity unit travel one arena unit per 60 Hz tick.
    pub bullet_speed_scale: f64,
    pub grenade_fuse_secs: f64,
    /// Number of bullets a grenade bursts into
    pub grenade_fragments: u32,
    pub fragment_speed: f64,
    pub ability_cooldown_secs: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            hit_radius: 25.0,
            bullet_damage: 34,
            max_health: 100,
            bullet_speed_scale: 60.0,
            grenade_fuse_secs: 3.0,
            grenade_fragments: 20,
            fragment_speed: 5.0,
            ability_cooldown_secs: 15.0,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err("width must be finite and > 0".to_string());
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err("height must be finite and > 0".to_string());
        }
        if !self.hit_radius.is_finite() || self.hit_radius <= 0.0 {
            return Err("hit_radius must be finite and > 0".to_string());
        }
        if self.bullet_damage == 0 {
            return Err("bullet_damage must be > 0".to_string());
        }
        if self.max_health == 0 {
            return Err("max_health must be > 0".to_string());
        }
        if !self.bullet_speed_scale.is_finite() || self.bullet_speed_scale <= 0.0 {
            return Err("bullet_speed_scale must be finite and > 0".to_string());
        }
        if !self.grenade_fuse_secs.is_finite() || self.grenade_fuse_secs < 0.0 {
            return Err("grenade_fuse_secs must be finite and >= 0".to_string());
        }
        if self.grenade_fragments == 0 {
            return Err("grenade_fragments must be > 0".to_string());
        }
        if !self.fragment_speed.is_finite() || self.fragment_speed <= 0.0 {
            return Err("fragment_speed must be finite and > 0".to_string());
        }
        if !self.ability_cooldown_secs.is_finite() || self.ability_cooldown_secs < 0.0 {
            return Err("ability_cooldown_secs must be finite and >= 0".to_string());
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    pub broadcast_rate_hz: u32,
    pub rng_seed: u64,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            tick_rate_hz: 60,
            broadcast_rate_hz: 60,
            rng_seed: 42,
            max_connections: 256,
        }
    }
}

impl ServerConfig {
    /// Default config, with the listen port taken from `PORT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(port) = std::env::var("PORT") {
            if port.parse::<u16>().is_ok() {
                config.listen_addr = format!("0.0.0.0:{}", port);
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err("broadcast_rate_hz must be in 1..=tick_rate_hz".to_string());
        }
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }
        Ok(())
    }
}
