use crate::vec2::Vec2;
use rand::Rng;

/// Player role, assigned at creation and immutable for the session.
/// The wire names are the exact strings the game client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlayerRole {
    #[serde(rename = "Backend Developer")]
    BackendDeveloper,
    #[serde(rename = "Frontend Developer")]
    FrontendDeveloper,
    #[serde(rename = "QA")]
    Qa,
}

impl PlayerRole {
    /// Select a random role
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => PlayerRole::BackendDeveloper,
            1 => PlayerRole::FrontendDeveloper,
            _ => PlayerRole::Qa,
        }
    }
}

/// Authoritative player state owned by the game loop task.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub pos: Vec2,
    /// Always in [0, max_health]; 0 is a state, not "absent"
    pub health: u32,
    pub role: PlayerRole,
    pub name: String,
    /// True between a lethal hit and the subsequent respawn.
    /// Dead players are never collision targets.
    pub is_dead: bool,
    pub kills: u32,
    pub deaths: u32,
    pub bullets_fired: u32,
    /// Seconds until the special ability may be used again, floored at 0
    pub special_ability_cooldown: f64,
}

const CALLSIGNS: &[&str] = &[
    "segfault",
    "nullptr",
    "hotfix",
    "rubberduck",
    "stacktrace",
    "kernelpanic",
    "offbyone",
    "heisenbug",
    "bikeshed",
    "yakshaver",
    "cronjob",
    "regex",
];

/// Generate a display name from a player ID.
pub fn name_from_id(id: u32) -> String {
    let base = CALLSIGNS[(id as usize) % CALLSIGNS.len()];
    format!("{}-{}", base, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn name_from_id_is_deterministic() {
        assert_eq!(name_from_id(7), name_from_id(7));
    }

    #[test]
    fn different_ids_give_different_names() {
        let n1 = name_from_id(1);
        let n2 = name_from_id(2);
        let n3 = name_from_id(13);
        assert_ne!(n1, n2);
        assert_ne!(n1, n3);
    }

    #[test]
    fn random_role_covers_all_roles() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = [false; 3];
        for _ in 0..100 {
            match PlayerRole::random(&mut rng) {
                PlayerRole::BackendDeveloper => seen[0] = true,
                PlayerRole::FrontendDeveloper => seen[1] = true,
                PlayerRole::Qa => seen[2] = true,
            }
        }
        assert!(seen.iter().all(|&s| s), "All roles should appear: {:?}", seen);
    }

    #[test]
    fn role_serializes_to_client_strings() {
        let json = serde_json::to_string(&PlayerRole::BackendDeveloper).unwrap();
        assert_eq!(json, "\"Backend Developer\"");
        let json = serde_json::to_string(&PlayerRole::FrontendDeveloper).unwrap();
        assert_eq!(json, "\"Frontend Developer\"");
        let json = serde_json::to_string(&PlayerRole::Qa).unwrap();
        assert_eq!(json, "\"QA\"");
    }

    #[test]
    fn role_roundtrips() {
        for role in [
            PlayerRole::BackendDeveloper,
            PlayerRole::FrontendDeveloper,
            PlayerRole::Qa,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            let parsed: PlayerRole = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, role);
        }
    }
}
