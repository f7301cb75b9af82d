//! Pure combat math: hit tests, damage clamping, grenade bursts.
//!
//! Everything here is a function of its arguments so the resolver can be
//! tested without a running game loop.

use crate::vec2::{distance, Vec2};

/// A bullet hits a player when it is strictly closer than the hit radius.
pub fn in_hit_range(bullet_pos: Vec2, player_pos: Vec2, hit_radius: f64) -> bool {
    distance(bullet_pos, player_pos) < hit_radius
}

/// True once a position has left the arena rectangle.
pub fn out_of_bounds(pos: Vec2, width: f64, height: f64) -> bool {
    pos.x < 0.0 || pos.x > width || pos.y < 0.0 || pos.y > height
}

/// Apply damage, clamping at 0 rather than going negative.
pub fn apply_damage(health: u32, damage: u32) -> u32 {
    health.saturating_sub(damage)
}

/// Velocities for a radial grenade burst: `count` directions at evenly
/// spaced angles, each with magnitude `speed`.
pub fn burst_velocities(count: u32, speed: f64) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / count as f64;
            Vec2::new(angle.cos() * speed, angle.sin() * speed)
        })
        .collect()
}
