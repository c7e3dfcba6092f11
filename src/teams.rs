//! Persisted roster configuration and the built-in default rosters.

use crate::catalog::{parse_item_key, parse_move_key, parse_species_key};
use crate::combatant::{create_combatant_by_key, Combatant, MAX_MOVES};
use crate::errors::{BattleResult, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_LEVEL: u8 = 50;

/// One roster slot as stored on disk: catalog keys only, no runtime state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MemberConfig {
    pub species: String,
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(default)]
    pub item: Option<String>,
}

impl MemberConfig {
    pub fn new(species: &str) -> Self {
        Self {
            species: species.to_string(),
            moves: Vec::new(),
            item: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    pub members: Vec<MemberConfig>,
}

impl RosterConfig {
    /// Parse RON or JSON, chosen by the file extension (`.json` is JSON,
    /// anything else is RON).
    pub fn from_str_with_format(text: &str, json: bool) -> ConfigResult<Self> {
        let config: RosterConfig = if json {
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        Self::from_str_with_format(&text, json)
    }

    /// Check every key against the catalog before anything is built from it.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.members.is_empty() {
            return Err(ConfigError::Validation("roster has no members".to_string()));
        }
        for (slot, member) in self.members.iter().enumerate() {
            let invalid = |e: crate::errors::CatalogError| ConfigError::Validation(format!("slot {}: {}", slot, e));
            parse_species_key(&member.species).map_err(invalid)?;
            if member.moves.len() > MAX_MOVES {
                return Err(ConfigError::Validation(format!(
                    "slot {}: {} moves listed, at most {}",
                    slot,
                    member.moves.len(),
                    MAX_MOVES
                )));
            }
            for key in &member.moves {
                parse_move_key(key).map_err(invalid)?;
            }
            if let Some(item) = &member.item {
                parse_item_key(item).map_err(invalid)?;
            }
        }
        Ok(())
    }

    /// Build fresh combatants for one battle.
    pub fn build(&self, level: u8, id_prefix: &str) -> BattleResult<Vec<Combatant>> {
        let roster = self
            .members
            .iter()
            .map(|member| {
                let moves = (!member.moves.is_empty()).then_some(member.moves.as_slice());
                create_combatant_by_key(&member.species, level, id_prefix, moves, member.item.as_deref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(roster)
    }

    pub fn to_ron(&self) -> ConfigResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// The player's roster when nothing usable is configured.
pub fn default_player_roster() -> RosterConfig {
    RosterConfig {
        members: vec![
            MemberConfig::new("TRIANGLE"),
            MemberConfig::new("SQUARE"),
            MemberConfig::new("CIRCLE"),
        ],
    }
}

/// The built-in opponent roster.
pub fn default_opponent_roster() -> RosterConfig {
    RosterConfig {
        members: vec![
            MemberConfig::new("STAR"),
            MemberConfig::new("PENTAGON"),
            MemberConfig::new("SQUARE"),
        ],
    }
}

/// Load a roster, falling back to [`default_player_roster`] when the file is
/// missing or fails validation.
pub fn load_roster_or_default(path: Option<&Path>) -> RosterConfig {
    let Some(path) = path else {
        return default_player_roster();
    };
    match RosterConfig::load(path) {
        Ok(config) => {
            info!(path = %path.display(), members = config.members.len(), "roster loaded");
            config
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "unusable roster file, using the default roster");
            default_player_roster()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{ItemKey, MoveKey, SpeciesKey};
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("shape_arena_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_rosters_build() {
        let player = default_player_roster().build(DEFAULT_LEVEL, "p1").unwrap();
        let species: Vec<_> = player.iter().map(|c| c.species).collect();
        assert_eq!(species, vec![SpeciesKey::Triangle, SpeciesKey::Square, SpeciesKey::Circle]);

        let opponent = default_opponent_roster().build(DEFAULT_LEVEL, "p2").unwrap();
        assert_eq!(opponent.len(), 3);
        assert_eq!(opponent[0].species, SpeciesKey::Star);
    }

    #[test]
    fn test_ron_roster_with_loadout() {
        let text = r#"(members: [
            (species: "SQUARE", moves: ["BOX_BASH", "RECOVER"], item: Some("CUBE_LEFTOVERS")),
            (species: "KITE"),
        ])"#;
        let config = RosterConfig::from_str_with_format(text, false).unwrap();
        let roster = config.build(50, "p1").unwrap();

        let moves: Vec<_> = roster[0].moves.iter().map(|m| m.move_).collect();
        assert_eq!(moves, vec![MoveKey::BoxBash, MoveKey::Recover]);
        assert_eq!(roster[0].item.key(), ItemKey::CubeLeftovers);
        assert_eq!(roster[1].moves.len(), 4);
        assert_eq!(roster[1].item.key(), ItemKey::None);
    }

    #[test]
    fn test_json_roster() {
        let text = r#"{"members": [{"species": "FRACTAL", "moves": ["SHATTER"], "item": "SCOPE_LENS"}]}"#;
        let config = RosterConfig::from_str_with_format(text, true).unwrap();
        assert_eq!(config.members[0].item.as_deref(), Some("SCOPE_LENS"));
    }

    #[rstest]
    #[case(r#"(members: [])"#)]
    #[case(r#"(members: [(species: "DODECAHEDRON")])"#)]
    #[case(r#"(members: [(species: "SQUARE", moves: ["NOT_A_MOVE"])])"#)]
    #[case(r#"(members: [(species: "SQUARE", item: Some("MYSTERY_BOX"))])"#)]
    #[case(r#"(members: [(species: "SQUARE", moves: ["BOX_BASH", "BOX_BASH", "BOX_BASH", "BOX_BASH", "BOX_BASH"])])"#)]
    fn test_invalid_rosters_fail_validation(#[case] text: &str) {
        assert!(matches!(
            RosterConfig::from_str_with_format(text, false),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_text_is_a_parse_error() {
        assert!(matches!(
            RosterConfig::from_str_with_format("members: [", false),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let json = scratch_file("roster.json", r#"{"members": [{"species": "HEXAGON"}]}"#);
        assert_eq!(RosterConfig::load(&json).unwrap().members[0].species, "HEXAGON");

        let ron = scratch_file("roster.ron", r#"(members: [(species: "PENTAGON")])"#);
        assert_eq!(RosterConfig::load(&ron).unwrap().members[0].species, "PENTAGON");

        fs::remove_file(json).ok();
        fs::remove_file(ron).ok();
    }

    #[test]
    fn test_fallback_on_missing_or_invalid_file() {
        assert_eq!(load_roster_or_default(None), default_player_roster());
        assert_eq!(
            load_roster_or_default(Some(Path::new("/definitely/not/here.ron"))),
            default_player_roster()
        );

        let bad = scratch_file("bad_roster.ron", r#"(members: [(species: "BLOB")])"#);
        assert_eq!(load_roster_or_default(Some(&bad)), default_player_roster());
        fs::remove_file(bad).ok();
    }

    #[test]
    fn test_ron_round_trip_of_defaults() {
        let text = default_opponent_roster().to_ron().unwrap();
        assert_eq!(
            RosterConfig::from_str_with_format(&text, false).unwrap(),
            default_opponent_roster()
        );
    }
}
