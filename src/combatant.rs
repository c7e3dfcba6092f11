use crate::catalog::{get_item_data, get_move_data, get_species_data, parse_item_key, parse_move_key, parse_species_key};
use crate::errors::{CatalogError, CatalogResult};
use schema::{AbilityKey, ItemData, ItemEffect, ItemKey, MoveData, MoveKey, ShapeType, SpeciesKey, StatType, StatusType};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximum number of moves a combatant can carry.
pub const MAX_MOVES: usize = 4;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u16,
    pub max_hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spd: u16,
}

impl Stats {
    pub fn get(&self, stat: StatType) -> u16 {
        match stat {
            StatType::Atk => self.atk,
            StatType::Def => self.def,
            StatType::Spd => self.spd,
        }
    }

    pub fn set(&mut self, stat: StatType, value: u16) {
        match stat {
            StatType::Atk => self.atk = value,
            StatType::Def => self.def = value,
            StatType::Spd => self.spd = value,
        }
    }
}

/// A persistent affliction. `Dormant` carries the turns left before waking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCondition {
    Fragmented,
    Lagging,
    Glitched,
    Dormant(u8),
}

impl StatusCondition {
    pub fn kind(&self) -> StatusType {
        match self {
            StatusCondition::Fragmented => StatusType::Fragmented,
            StatusCondition::Lagging => StatusType::Lagging,
            StatusCondition::Glitched => StatusType::Glitched,
            StatusCondition::Dormant(_) => StatusType::Dormant,
        }
    }

    /// Build a condition from its kind. Dormancy needs a turn count.
    pub fn from_kind(kind: StatusType, dormant_turns: u8) -> Self {
        match kind {
            StatusType::Fragmented => StatusCondition::Fragmented,
            StatusType::Lagging => StatusCondition::Lagging,
            StatusType::Glitched => StatusCondition::Glitched,
            StatusType::Dormant => StatusCondition::Dormant(dormant_turns.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInstance {
    pub move_: MoveKey,
    pub pp: u8,
}

impl MoveInstance {
    /// Create a new move instance with max PP
    pub fn new(data: &MoveData) -> Self {
        MoveInstance {
            move_: data.key,
            pp: data.base_pp,
        }
    }

    pub fn data(&self) -> CatalogResult<&'static MoveData> {
        get_move_data(self.move_)
    }

    /// Use the move (decrease PP)
    pub fn use_move(&mut self) -> bool {
        if self.pp > 0 {
            self.pp -= 1;
            true
        } else {
            false
        }
    }
}

/// A per-combatant copy of an item template; consuming it never touches the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldItem {
    pub data: ItemData,
    pub consumed: bool,
}

impl HeldItem {
    pub fn new(data: &ItemData) -> Self {
        HeldItem {
            data: data.clone(),
            consumed: false,
        }
    }

    pub fn key(&self) -> ItemKey {
        self.data.key
    }

    /// The item's effect, unless it has already been used up.
    pub fn active_effect(&self) -> Option<ItemEffect> {
        if self.data.key == ItemKey::None || self.consumed {
            None
        } else {
            Some(self.data.effect)
        }
    }

    pub fn magnitude_or(&self, default: f64) -> f64 {
        self.data.magnitude.unwrap_or(default)
    }

    pub fn consume(&mut self) {
        if self.data.single_use {
            self.consumed = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub instance_id: String,
    pub species: SpeciesKey,
    pub name: String,
    pub shape_type: ShapeType,
    pub level: u8,
    pub stats: Stats,
    pub moves: Vec<MoveInstance>,
    pub ability: AbilityKey,
    pub item: HeldItem,
    pub status: Option<StatusCondition>,
}

impl Combatant {
    pub fn is_fainted(&self) -> bool {
        self.stats.hp == 0
    }

    pub fn has_full_hp(&self) -> bool {
        self.stats.hp == self.stats.max_hp
    }

    pub fn current_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.max_hp
    }

    /// Reduce HP, never below zero. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let lost = amount.min(self.stats.hp);
        self.stats.hp -= lost;
        lost
    }

    /// Restore HP, never above max. Returns the HP actually gained.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let gained = amount.min(self.stats.max_hp - self.stats.hp);
        self.stats.hp += gained;
        gained
    }

    /// Set HP directly, clamped into `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: u16) {
        self.stats.hp = hp.min(self.stats.max_hp);
    }

    pub fn status_kind(&self) -> Option<StatusType> {
        self.status.map(|s| s.kind())
    }

    pub fn has_status(&self, kind: StatusType) -> bool {
        self.status_kind() == Some(kind)
    }

    pub fn move_at(&self, index: usize) -> Option<&MoveInstance> {
        self.moves.get(index)
    }

    /// Indices of moves that still have PP.
    pub fn usable_move_indices(&self) -> Vec<usize> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| m.pp > 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Fraction of max HP remaining, in `[0.0, 1.0]`.
    pub fn hp_fraction(&self) -> f64 {
        if self.stats.max_hp == 0 {
            0.0
        } else {
            self.stats.hp as f64 / self.stats.max_hp as f64
        }
    }
}

/// `floor(base * 2 * level / 100) + 5`
pub fn flat_stat(base: u16, level: u8) -> u16 {
    let value = base as u32 * 2 * level as u32 / 100 + 5;
    value.min(u16::MAX as u32) as u16
}

/// `floor(base * 2 * level / 100) + level + 10`
pub fn hp_stat(base: u16, level: u8) -> u16 {
    let value = base as u32 * 2 * level as u32 / 100 + level as u32 + 10;
    value.min(u16::MAX as u32) as u16
}

/// Build a battle-ready combatant from a species template and loadout.
///
/// Moves default to the first four pool entries; the item defaults to the
/// catalog's `NONE` entry. The instance id is `<prefix>_<species>_<n>` with a
/// process-wide counter, so it is unique within any battle.
pub fn create_combatant(
    species: SpeciesKey,
    level: u8,
    id_prefix: &str,
    move_overrides: Option<&[MoveKey]>,
    item: Option<ItemKey>,
) -> CatalogResult<Combatant> {
    let species_data = get_species_data(species)?;
    let level = level.clamp(1, 100);

    let move_keys = match move_overrides {
        Some(keys) if !keys.is_empty() => keys.to_vec(),
        _ => species_data.default_moves(),
    };
    if move_keys.len() > MAX_MOVES {
        return Err(CatalogError::TooManyMoves(move_keys.len()));
    }
    let moves = move_keys
        .into_iter()
        .map(|key| get_move_data(key).map(MoveInstance::new))
        .collect::<CatalogResult<Vec<_>>>()?;

    let item = HeldItem::new(get_item_data(item.unwrap_or(ItemKey::None))?);

    let base = &species_data.base_stats;
    let max_hp = hp_stat(base.hp, level);
    let stats = Stats {
        hp: max_hp,
        max_hp,
        atk: flat_stat(base.atk, level),
        def: flat_stat(base.def, level),
        spd: flat_stat(base.spd, level),
    };

    let serial = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
    Ok(Combatant {
        instance_id: format!("{}_{}_{}", id_prefix, species, serial),
        species,
        name: species_data.display_name.clone(),
        shape_type: species_data.shape_type,
        level,
        stats,
        moves,
        ability: species_data.default_ability,
        item,
        status: None,
    })
}

/// String-keyed variant of [`create_combatant`], for configs and wire payloads.
pub fn create_combatant_by_key(
    species: &str,
    level: u8,
    id_prefix: &str,
    move_overrides: Option<&[String]>,
    item: Option<&str>,
) -> CatalogResult<Combatant> {
    let species = parse_species_key(species)?;
    let moves = move_overrides
        .map(|keys| keys.iter().map(|k| parse_move_key(k)).collect::<CatalogResult<Vec<_>>>())
        .transpose()?;
    let item = item.map(parse_item_key).transpose()?;
    create_combatant(species, level, id_prefix, moves.as_deref(), item)
}
