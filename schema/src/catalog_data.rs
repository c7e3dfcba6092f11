use crate::{AbilityKey, ItemKey, MoveCategory, MoveKey, ShapeType, SpeciesKey, StatType, StatusType};
use serde::{Deserialize, Serialize};

/// Immutable move template.
///
/// `Status` moves carry `power == 0`; their effect is described by the optional
/// fields (`heal_fraction`, `stat_buff`, `status_to_inflict`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub key: MoveKey,
    pub name: String,
    pub move_type: ShapeType,
    pub category: MoveCategory,
    pub power: u16,
    pub accuracy: u8,
    pub base_pp: u8,
    #[serde(default)]
    pub priority: i8,
    pub description: String,
    #[serde(default)]
    pub heal_fraction: Option<f64>,
    #[serde(default)]
    pub stat_buff: Option<StatType>,
    #[serde(default)]
    pub status_to_inflict: Option<StatusType>,
    #[serde(default)]
    pub status_chance: Option<u8>,
    #[serde(default)]
    pub is_draining: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemEffect {
    StatMultiplier,
    PerTurnHeal,
    DamageResist,
    RecoilBoost,
    LowHpHeal,
    CureStatus,
    CritBoost,
    FatalGuard,
}

/// Immutable item template. Combatants hold a copy so single-use flags stay local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub key: ItemKey,
    pub name: String,
    pub description: String,
    pub effect: ItemEffect,
    #[serde(default)]
    pub affected_stat: Option<StatType>,
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub single_use: bool,
}

/// Abilities are pure identity; their behavior lives in the resolver's trigger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityData {
    pub key: AbilityKey,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spd: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub key: SpeciesKey,
    pub display_name: String,
    pub shape_type: ShapeType,
    pub base_stats: BaseStats,
    pub move_pool: Vec<MoveKey>,
    pub default_ability: AbilityKey,
}

impl SpeciesData {
    /// The first four pool entries, used when no loadout override is given.
    pub fn default_moves(&self) -> Vec<MoveKey> {
        self.move_pool.iter().copied().take(4).collect()
    }

    pub fn can_learn_move(&self, move_key: MoveKey) -> bool {
        self.move_pool.contains(&move_key)
    }
}
