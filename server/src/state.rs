use crate::combat;
use crate::config::{ArenaConfig, ServerConfig};
use crate::player::{name_from_id, Player, PlayerRole};
use crate::protocol::{BulletWire, CurrentPlayersMsg, GameStateMsg, GrenadeWire, PlayerWire};
use crate::vec2::{add, scale, Vec2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// In-flight projectile. Velocity is fixed at creation.
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u32,
    /// Kill attribution; may dangle after the owner disconnects
    pub owner_id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Thrown grenade waiting for its fuse to elapse. Never collides.
#[derive(Debug, Clone)]
pub struct Grenade {
    pub id: u32,
    pub owner_id: u32,
    pub pos: Vec2,
    pub fuse_remaining: f64,
}

/// Events produced by one simulation tick, in occurrence order.
#[derive(Debug, Clone)]
pub enum TickEvent {
    /// Emitted on every hit, lethal or not
    PlayerDamaged { id: u32, health: u32 },
    /// Emitted once per life; killer_id may reference a disconnected player
    PlayerKilled { killed_id: u32, killer_id: u32 },
    GrenadeExploded { id: u32, pos: Vec2 },
    /// A bullet synthesized by a grenade burst
    FragmentSpawned(Bullet),
}

/// Central game state owned by the game loop task.
///
/// All mutation flows through this struct on a single task, so snapshot
/// reads can never observe a half-applied tick.
pub struct GameState {
    pub players: HashMap<u32, Player>,
    pub bullets: HashMap<u32, Bullet>,
    pub grenades: HashMap<u32, Grenade>,
    pub config: ArenaConfig,
    pub rng: ChaCha8Rng,
    next_player_id: u32,
    next_bullet_id: u32,
    next_grenade_id: u32,
}

impl GameState {
    pub fn new(server_config: &ServerConfig, config: ArenaConfig) -> Self {
        use rand::SeedableRng;
        Self {
            players: HashMap::new(),
            bullets: HashMap::new(),
            grenades: HashMap::new(),
            config,
            rng: ChaCha8Rng::seed_from_u64(server_config.rng_seed),
            next_player_id: 1,
            next_bullet_id: 1,
            next_grenade_id: 1,
        }
    }

    fn spawn_position(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen::<f64>() * self.config.width,
            self.rng.gen::<f64>() * self.config.height,
        )
    }

    /// Add a new player with a random spawn, full health and a random role.
    pub fn add_player(&mut self) -> Player {
        let id = self.next_player_id;
        self.next_player_id += 1;

        let pos = self.spawn_position();
        let role = PlayerRole::random(&mut self.rng);
        let player = Player {
            id,
            pos,
            health: self.config.max_health,
            role,
            name: name_from_id(id),
            is_dead: false,
            kills: 0,
            deaths: 0,
            bullets_fired: 0,
            special_ability_cooldown: 0.0,
        };

        self.players.insert(id, player.clone());
        player
    }

    /// Remove a player. Bullets they authored stay in flight with a
    /// dangling owner id, which resolves to "no kill credit".
    pub fn remove_player(&mut self, id: u32) -> bool {
        self.players.remove(&id).is_some()
    }

    /// Rewrite a player's position verbatim. No speed or bounds check:
    /// movement is trusted client input (a documented weakness of the
    /// original design, kept as-is).
    pub fn apply_move(&mut self, id: u32, x: f64, y: f64) -> bool {
        if let Some(player) = self.players.get_mut(&id) {
            player.pos = Vec2::new(x, y);
            true
        } else {
            false
        }
    }

    fn spawn_bullet(&mut self, owner_id: u32, pos: Vec2, vel: Vec2) -> Bullet {
        let id = self.next_bullet_id;
        self.next_bullet_id = self.next_bullet_id.wrapping_add(1);
        let bullet = Bullet {
            id,
            owner_id,
            pos,
            vel,
        };
        self.bullets.insert(id, bullet.clone());
        bullet
    }

    /// Create a bullet for a fire request. Position and velocity are taken
    /// from the request; attribution comes from the session, not the payload.
    pub fn fire_bullet(&mut self, owner_id: u32, pos: Vec2, vel: Vec2) -> Option<Bullet> {
        let shooter = self.players.get_mut(&owner_id)?;
        shooter.bullets_fired += 1;
        Some(self.spawn_bullet(owner_id, pos, vel))
    }

    /// Create a grenade if the thrower has the grenade role and a ready
    /// cooldown. Returns None (silently) otherwise.
    pub fn throw_grenade(&mut self, owner_id: u32, pos: Vec2) -> Option<Grenade> {
        let fuse = self.config.grenade_fuse_secs;
        let cooldown = self.config.ability_cooldown_secs;

        let player = self.players.get_mut(&owner_id)?;
        if player.role != PlayerRole::BackendDeveloper || player.special_ability_cooldown > 0.0 {
            return None;
        }
        player.special_ability_cooldown = cooldown;

        let id = self.next_grenade_id;
        self.next_grenade_id = self.next_grenade_id.wrapping_add(1);
        let grenade = Grenade {
            id,
            owner_id,
            pos,
            fuse_remaining: fuse,
        };
        self.grenades.insert(id, grenade.clone());
        Some(grenade)
    }

    /// Respawn a dead player: full health, fresh random position.
    /// Counters survive respawn; only disconnect resets them.
    pub fn respawn_player(&mut self, id: u32) -> Option<Player> {
        if !self.players.get(&id).is_some_and(|p| p.is_dead) {
            return None;
        }
        let max_health = self.config.max_health;
        let pos = self.spawn_position();
        let player = self.players.get_mut(&id)?;
        player.health = max_health;
        player.is_dead = false;
        player.pos = pos;
        Some(player.clone())
    }

    /// Advance the simulation by `dt` seconds: cooldowns, bullet motion,
    /// collision resolution, bounds culling, grenade fuses.
    pub fn tick(&mut self, dt: f64) -> Vec<TickEvent> {
        let mut events = Vec::new();

        for player in self.players.values_mut() {
            if player.special_ability_cooldown > 0.0 {
                player.special_ability_cooldown = (player.special_ability_cooldown - dt).max(0.0);
            }
        }

        let step = self.config.bullet_speed_scale * dt;
        for bullet in self.bullets.values_mut() {
            bullet.pos = add(bullet.pos, scale(bullet.vel, step));
        }

        self.resolve_hits(&mut events);

        let (width, height) = (self.config.width, self.config.height);
        self.bullets
            .retain(|_, b| !combat::out_of_bounds(b.pos, width, height));

        self.expire_grenades(dt, &mut events);

        events
    }

    /// Combat resolution for every live bullet against every live,
    /// non-dead player other than the bullet's owner. The first hit
    /// destroys the bullet, so at most one player is credited per bullet.
    fn resolve_hits(&mut self, events: &mut Vec<TickEvent>) {
        // Sorted ids give a stable iteration order independent of hash state.
        let mut bullet_ids: Vec<u32> = self.bullets.keys().copied().collect();
        bullet_ids.sort_unstable();
        let mut player_ids: Vec<u32> = self.players.keys().copied().collect();
        player_ids.sort_unstable();

        let hit_radius = self.config.hit_radius;
        let damage = self.config.bullet_damage;

        for bullet_id in bullet_ids {
            let (bullet_pos, owner_id) = match self.bullets.get(&bullet_id) {
                Some(b) => (b.pos, b.owner_id),
                None => continue,
            };

            let hit = player_ids.iter().copied().find(|&pid| {
                if pid == owner_id {
                    return false;
                }
                match self.players.get(&pid) {
                    Some(p) => !p.is_dead && combat::in_hit_range(bullet_pos, p.pos, hit_radius),
                    None => false,
                }
            });

            let Some(victim_id) = hit else { continue };
            self.bullets.remove(&bullet_id);

            let Some(victim) = self.players.get_mut(&victim_id) else {
                continue;
            };
            victim.health = combat::apply_damage(victim.health, damage);
            let health = victim.health;
            let lethal = health == 0 && !victim.is_dead;
            if lethal {
                victim.is_dead = true;
                victim.deaths += 1;
            }
            events.push(TickEvent::PlayerDamaged {
                id: victim_id,
                health,
            });
            if lethal {
                // Kill credit only if the shooter is still connected;
                // otherwise the credit is dropped, not reassigned.
                if let Some(shooter) = self.players.get_mut(&owner_id) {
                    shooter.kills += 1;
                }
                events.push(TickEvent::PlayerKilled {
                    killed_id: victim_id,
                    killer_id: owner_id,
                });
            }
        }
    }

    /// Count down fuses and burst elapsed grenades into radial bullets,
    /// all attributed to the thrower whether or not they are still here.
    fn expire_grenades(&mut self, dt: f64, events: &mut Vec<TickEvent>) {
        let mut exploded: Vec<u32> = Vec::new();
        for grenade in self.grenades.values_mut() {
            grenade.fuse_remaining -= dt;
            if grenade.fuse_remaining <= 0.0 {
                exploded.push(grenade.id);
            }
        }
        exploded.sort_unstable();

        let fragments = self.config.grenade_fragments;
        let fragment_speed = self.config.fragment_speed;

        for grenade_id in exploded {
            let Some(grenade) = self.grenades.remove(&grenade_id) else {
                continue;
            };
            events.push(TickEvent::GrenadeExploded {
                id: grenade_id,
                pos: grenade.pos,
            });
            for vel in combat::burst_velocities(fragments, fragment_speed) {
                let bullet = self.spawn_bullet(grenade.owner_id, grenade.pos, vel);
                events.push(TickEvent::FragmentSpawned(bullet));
            }
            if let Some(owner) = self.players.get_mut(&grenade.owner_id) {
                owner.bullets_fired += fragments;
            }
        }
    }

    fn players_wire(&self) -> HashMap<u32, PlayerWire> {
        self.players
            .iter()
            .map(|(&id, p)| (id, PlayerWire::from_player(p)))
            .collect()
    }

    /// Full-state catch-up for a newly connected session.
    pub fn current_players(&self, self_id: u32) -> CurrentPlayersMsg {
        CurrentPlayersMsg {
            self_id,
            players: self.players_wire(),
        }
    }

    /// Aggregate tick snapshot for broadcasting.
    pub fn snapshot(&self) -> GameStateMsg {
        GameStateMsg {
            players: self.players_wire(),
            bullets: self.bullets.values().map(BulletWire::from_bullet).collect(),
            grenades: self
                .grenades
                .values()
                .map(GrenadeWire::from_grenade)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2::vec2;

    const DT: f64 = 1.0 / 60.0;

    fn test_state() -> GameState {
        let server_config = ServerConfig {
            rng_seed: 12345,
            ..Default::default()
        };
        GameState::new(&server_config, ArenaConfig::default())
    }

    fn test_state_with(config: ArenaConfig) -> GameState {
        let server_config = ServerConfig {
            rng_seed: 12345,
            ..Default::default()
        };
        GameState::new(&server_config, config)
    }

    fn place(state: &mut GameState, id: u32, x: f64, y: f64) {
        assert!(state.apply_move(id, x, y));
    }

    fn damaged_ids(events: &[TickEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                TickEvent::PlayerDamaged { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn kills(events: &[TickEvent]) -> Vec<(u32, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                TickEvent::PlayerKilled {
                    killed_id,
                    killer_id,
                } => Some((*killed_id, *killer_id)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn add_player_spawns_inside_arena_with_full_health() {
        let mut state = test_state();
        for _ in 0..20 {
            let player = state.add_player();
            assert!(player.pos.x >= 0.0 && player.pos.x <= 800.0);
            assert!(player.pos.y >= 0.0 && player.pos.y <= 600.0);
            assert_eq!(player.health, 100);
            assert!(!player.is_dead);
            assert_eq!(player.kills, 0);
        }
    }

    #[test]
    fn player_ids_are_unique() {
        let mut state = test_state();
        let a = state.add_player();
        let b = state.add_player();
        let c = state.add_player();
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
    }

    #[test]
    fn move_rewrites_position_verbatim() {
        let mut state = test_state();
        let player = state.add_player();
        // out-of-bounds moves are accepted: movement is not validated
        assert!(state.apply_move(player.id, -50.0, 9999.0));
        let moved = state.players.get(&player.id).unwrap();
        assert_eq!(moved.pos, vec2(-50.0, 9999.0));
    }

    #[test]
    fn move_for_unknown_player_is_dropped() {
        let mut state = test_state();
        assert!(!state.apply_move(999, 1.0, 1.0));
    }

    #[test]
    fn fire_increments_bullets_fired() {
        let mut state = test_state();
        let player = state.add_player();
        let bullet = state
            .fire_bullet(player.id, vec2(10.0, 10.0), vec2(10.0, 0.0))
            .unwrap();
        assert_eq!(bullet.owner_id, player.id);
        assert_eq!(state.players.get(&player.id).unwrap().bullets_fired, 1);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn fire_from_unknown_player_is_dropped() {
        let mut state = test_state();
        assert!(state.fire_bullet(999, vec2(0.0, 0.0), vec2(1.0, 0.0)).is_none());
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn bullets_advance_each_tick() {
        let mut state = test_state();
        let player = state.add_player();
        place(&mut state, player.id, 700.0, 500.0);
        let bullet = state
            .fire_bullet(player.id, vec2(100.0, 100.0), vec2(10.0, 0.0))
            .unwrap();
        state.tick(DT);
        let advanced = state.bullets.get(&bullet.id).unwrap();
        // 10 velocity * 60 scale * (1/60) dt = 10 units per tick
        assert!((advanced.pos.x - 110.0).abs() < 1e-9);
        assert!((advanced.pos.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bullet_leaving_arena_is_removed_without_events() {
        let mut state = test_state();
        let player = state.add_player();
        place(&mut state, player.id, 400.0, 300.0);
        state
            .fire_bullet(player.id, vec2(795.0, 300.0), vec2(10.0, 0.0))
            .unwrap();
        let events = state.tick(DT);
        assert!(state.bullets.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn bullet_does_not_hit_its_owner() {
        let mut state = test_state();
        let player = state.add_player();
        place(&mut state, player.id, 100.0, 100.0);
        state
            .fire_bullet(player.id, vec2(100.0, 100.0), vec2(0.0, 0.0))
            .unwrap();
        let events = state.tick(DT);
        assert!(events.is_empty());
        assert_eq!(state.players.get(&player.id).unwrap().health, 100);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn three_hits_kill_with_exact_health_sequence() {
        let mut state = test_state();
        let victim = state.add_player();
        let shooter = state.add_player();
        place(&mut state, victim.id, 100.0, 100.0);
        place(&mut state, shooter.id, 700.0, 500.0);

        let mut healths = Vec::new();
        for hit in 0..3 {
            state
                .fire_bullet(shooter.id, vec2(110.0, 100.0), vec2(0.0, 0.0))
                .unwrap();
            let events = state.tick(DT);
            let v = state.players.get(&victim.id).unwrap();
            healths.push(v.health);
            let expected_dead = hit == 2;
            assert_eq!(v.is_dead, expected_dead, "after hit {}", hit + 1);
            assert_eq!(kills(&events).is_empty(), !expected_dead);
        }
        assert_eq!(healths, vec![66, 32, 0]);

        let v = state.players.get(&victim.id).unwrap();
        let s = state.players.get(&shooter.id).unwrap();
        assert_eq!(v.deaths, 1);
        assert_eq!(s.kills, 1);
    }

    #[test]
    fn dead_player_is_not_a_collision_target() {
        let mut state = test_state();
        let victim = state.add_player();
        let shooter = state.add_player();
        place(&mut state, victim.id, 100.0, 100.0);
        place(&mut state, shooter.id, 700.0, 500.0);
        state.players.get_mut(&victim.id).unwrap().health = 34;

        state
            .fire_bullet(shooter.id, vec2(110.0, 100.0), vec2(0.0, 0.0))
            .unwrap();
        state.tick(DT);
        assert!(state.players.get(&victim.id).unwrap().is_dead);

        // a bullet sitting on the corpse never connects
        state
            .fire_bullet(shooter.id, vec2(100.0, 100.0), vec2(0.0, 0.0))
            .unwrap();
        let events = state.tick(DT);
        assert!(events.is_empty());
        assert_eq!(state.players.get(&victim.id).unwrap().deaths, 1);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn first_hit_wins_with_overlapping_players() {
        let mut state = test_state();
        let a = state.add_player();
        let b = state.add_player();
        let shooter = state.add_player();
        // two players on the exact same point
        place(&mut state, a.id, 200.0, 200.0);
        place(&mut state, b.id, 200.0, 200.0);
        place(&mut state, shooter.id, 700.0, 500.0);

        state
            .fire_bullet(shooter.id, vec2(205.0, 200.0), vec2(0.0, 0.0))
            .unwrap();
        let events = state.tick(DT);

        // exactly one of the two takes the hit, never both
        let damaged = damaged_ids(&events);
        assert_eq!(damaged.len(), 1);
        assert!(damaged[0] == a.id || damaged[0] == b.id);
        let total_damage: u32 = [a.id, b.id]
            .iter()
            .map(|id| 100 - state.players.get(id).unwrap().health)
            .sum();
        assert_eq!(total_damage, 34);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn kill_credit_dropped_when_shooter_disconnected() {
        let mut state = test_state();
        let victim = state.add_player();
        let shooter = state.add_player();
        let bystander = state.add_player();
        place(&mut state, victim.id, 100.0, 100.0);
        place(&mut state, shooter.id, 700.0, 500.0);
        place(&mut state, bystander.id, 400.0, 300.0);
        state.players.get_mut(&victim.id).unwrap().health = 34;

        state
            .fire_bullet(shooter.id, vec2(110.0, 100.0), vec2(0.0, 0.0))
            .unwrap();
        assert!(state.remove_player(shooter.id));

        let events = state.tick(DT);

        let v = state.players.get(&victim.id).unwrap();
        assert!(v.is_dead);
        assert_eq!(v.deaths, 1);
        // the death event still names the dangling shooter id
        assert_eq!(kills(&events), vec![(victim.id, shooter.id)]);
        // nobody gets the credit
        assert!(state.players.values().all(|p| p.kills == 0));
    }

    #[test]
    fn respawn_resets_health_and_flag_but_not_counters() {
        let mut state = test_state();
        let victim = state.add_player();
        let shooter = state.add_player();
        place(&mut state, victim.id, 100.0, 100.0);
        place(&mut state, shooter.id, 700.0, 500.0);
        state.players.get_mut(&victim.id).unwrap().health = 34;
        state.players.get_mut(&victim.id).unwrap().bullets_fired = 5;

        state
            .fire_bullet(shooter.id, vec2(110.0, 100.0), vec2(0.0, 0.0))
            .unwrap();
        state.tick(DT);
        assert!(state.players.get(&victim.id).unwrap().is_dead);

        let respawned = state.respawn_player(victim.id).unwrap();
        assert_eq!(respawned.health, 100);
        assert!(!respawned.is_dead);
        assert_eq!(respawned.deaths, 1);
        assert_eq!(respawned.bullets_fired, 5);
        assert!(respawned.pos.x >= 0.0 && respawned.pos.x <= 800.0);
        assert!(respawned.pos.y >= 0.0 && respawned.pos.y <= 600.0);
    }

    #[test]
    fn respawn_while_alive_is_rejected() {
        let mut state = test_state();
        let player = state.add_player();
        assert!(state.respawn_player(player.id).is_none());
        assert!(state.respawn_player(999).is_none());
    }

    #[test]
    fn grenade_requires_backend_role_and_ready_cooldown() {
        let mut state = test_state();
        let player = state.add_player();
        state.players.get_mut(&player.id).unwrap().role = PlayerRole::Qa;
        assert!(state.throw_grenade(player.id, vec2(100.0, 100.0)).is_none());

        state.players.get_mut(&player.id).unwrap().role = PlayerRole::BackendDeveloper;
        assert!(state.throw_grenade(player.id, vec2(100.0, 100.0)).is_some());
        assert_eq!(
            state
                .players
                .get(&player.id)
                .unwrap()
                .special_ability_cooldown,
            15.0
        );
        // still cooling down
        assert!(state.throw_grenade(player.id, vec2(100.0, 100.0)).is_none());
    }

    #[test]
    fn cooldown_decrements_and_floors_at_zero() {
        let mut state = test_state();
        let player = state.add_player();
        state.players.get_mut(&player.id).unwrap().role = PlayerRole::BackendDeveloper;
        state.throw_grenade(player.id, vec2(100.0, 100.0)).unwrap();

        state.tick(1.0);
        let cd = state
            .players
            .get(&player.id)
            .unwrap()
            .special_ability_cooldown;
        assert!((cd - 14.0).abs() < 1e-9);

        state.tick(100.0);
        assert_eq!(
            state
                .players
                .get(&player.id)
                .unwrap()
                .special_ability_cooldown,
            0.0
        );
    }

    #[test]
    fn grenade_bursts_into_exact_fragment_count() {
        let mut state = test_state_with(ArenaConfig {
            grenade_fuse_secs: 0.05,
            ..Default::default()
        });
        let thrower = state.add_player();
        state.players.get_mut(&thrower.id).unwrap().role = PlayerRole::BackendDeveloper;
        place(&mut state, thrower.id, 400.0, 300.0);

        state.throw_grenade(thrower.id, vec2(400.0, 300.0)).unwrap();
        assert_eq!(state.grenades.len(), 1);

        let events = state.tick(0.1);
        assert!(state.grenades.is_empty());
        assert_eq!(state.bullets.len(), 20);
        assert!(state
            .bullets
            .values()
            .all(|b| b.owner_id == thrower.id));
        assert!(events
            .iter()
            .any(|e| matches!(e, TickEvent::GrenadeExploded { .. })));
        let fragments = events
            .iter()
            .filter(|e| matches!(e, TickEvent::FragmentSpawned(_)))
            .count();
        assert_eq!(fragments, 20);
        // the 20 synthesized shots count as fired bullets
        assert_eq!(state.players.get(&thrower.id).unwrap().bullets_fired, 20);
    }

    #[test]
    fn grenade_explodes_even_after_thrower_disconnects() {
        let mut state = test_state_with(ArenaConfig {
            grenade_fuse_secs: 0.05,
            ..Default::default()
        });
        let thrower = state.add_player();
        let victim = state.add_player();
        state.players.get_mut(&thrower.id).unwrap().role = PlayerRole::BackendDeveloper;
        place(&mut state, victim.id, 700.0, 500.0);

        state.throw_grenade(thrower.id, vec2(400.0, 300.0)).unwrap();
        state.remove_player(thrower.id);

        state.tick(0.1);
        assert_eq!(state.bullets.len(), 20);
        assert!(state.bullets.values().all(|b| b.owner_id == thrower.id));

        // orphaned fragments can still kill, but credit goes nowhere
        place(&mut state, victim.id, 403.0, 300.0);
        state.players.get_mut(&victim.id).unwrap().health = 34;
        let events = state.tick(DT);
        let killed = kills(&events);
        assert_eq!(killed.len(), 1);
        assert_eq!(killed[0], (victim.id, thrower.id));
        assert!(state.players.values().all(|p| p.kills == 0));
    }

    #[test]
    fn grenade_does_not_collide_before_exploding() {
        let mut state = test_state();
        let thrower = state.add_player();
        let other = state.add_player();
        state.players.get_mut(&thrower.id).unwrap().role = PlayerRole::BackendDeveloper;
        place(&mut state, other.id, 400.0, 300.0);

        // grenade dropped on top of another player
        state.throw_grenade(thrower.id, vec2(400.0, 300.0)).unwrap();
        let events = state.tick(DT);
        assert!(events.is_empty());
        assert_eq!(state.players.get(&other.id).unwrap().health, 100);
        assert_eq!(state.grenades.len(), 1);
    }

    #[test]
    fn snapshot_contains_all_entities() {
        let mut state = test_state_with(ArenaConfig {
            grenade_fuse_secs: 10.0,
            ..Default::default()
        });
        let a = state.add_player();
        let b = state.add_player();
        state.players.get_mut(&a.id).unwrap().role = PlayerRole::BackendDeveloper;
        state
            .fire_bullet(b.id, vec2(10.0, 10.0), vec2(1.0, 0.0))
            .unwrap();
        state.throw_grenade(a.id, vec2(50.0, 50.0)).unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.bullets.len(), 1);
        assert_eq!(snapshot.grenades.len(), 1);
        assert!(snapshot.players.contains_key(&a.id));
        assert!(snapshot.players.contains_key(&b.id));
    }

    #[test]
    fn current_players_carries_self_id() {
        let mut state = test_state();
        let player = state.add_player();
        let msg = state.current_players(player.id);
        assert_eq!(msg.self_id, player.id);
        assert!(msg.players.contains_key(&player.id));
    }

    #[test]
    fn health_never_leaves_valid_range() {
        let mut state = test_state();
        let victim = state.add_player();
        let shooter = state.add_player();
        place(&mut state, victim.id, 100.0, 100.0);
        place(&mut state, shooter.id, 700.0, 500.0);

        for _ in 0..10 {
            state
                .fire_bullet(shooter.id, vec2(110.0, 100.0), vec2(0.0, 0.0))
                .unwrap();
            state.tick(DT);
            let health = state.players.get(&victim.id).unwrap().health;
            assert!(health <= 100);
        }
        assert_eq!(state.players.get(&victim.id).unwrap().health, 0);
        // death happened exactly once despite continued fire
        assert_eq!(state.players.get(&victim.id).unwrap().deaths, 1);
    }
}
