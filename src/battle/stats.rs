use crate::battle::triggers;
use crate::combatant::Combatant;
use schema::{MoveCategory, MoveData, ShapeType, StatType, StatusType};

/// Level term of the damage formula. It does not follow the attacker's level.
pub const DAMAGE_LEVEL: f64 = 50.0;
/// Same-type attack bonus.
pub const STAB_MULTIPLIER: f64 = 1.5;

/// Attack stat after status penalty, held item and ability, in that order.
pub fn effective_attack(attacker: &Combatant, category: MoveCategory) -> f64 {
    let mut attack = attacker.stats.atk as f64;
    if category == MoveCategory::Physical && attacker.has_status(StatusType::Fragmented) {
        attack *= 0.5;
    }
    attack *= triggers::item_stat_multiplier(attacker, StatType::Atk, category);
    attack *= triggers::ability_attack_multiplier(attacker, category);
    attack.max(1.0)
}

/// Defensive stat for a move category. Special moves are resisted with speed,
/// there being no separate special defense.
pub fn effective_defense(defender: &Combatant, category: MoveCategory) -> f64 {
    let stat = match category {
        MoveCategory::Special => StatType::Spd,
        _ => StatType::Def,
    };
    let mut defense = defender.stats.get(stat) as f64;
    defense *= triggers::item_stat_multiplier(defender, stat, category);
    defense.max(1.0)
}

/// Speed used for turn order: base, halved while lagging, then item and ability.
pub fn effective_speed(combatant: &Combatant) -> f64 {
    let mut speed = combatant.stats.spd as f64;
    if combatant.has_status(StatusType::Lagging) {
        speed *= 0.5;
    }
    speed *= triggers::item_stat_multiplier(combatant, StatType::Spd, MoveCategory::Status);
    speed *= triggers::ability_speed_multiplier(combatant);
    speed
}

pub fn stab(attacker: &Combatant, move_data: &MoveData) -> f64 {
    if attacker.shape_type == move_data.move_type {
        STAB_MULTIPLIER
    } else {
        1.0
    }
}

/// `((2*50/5 + 2) * power * atk/def / 50) + 2`, before any multiplier.
pub fn base_damage(power: u16, effective_atk: f64, effective_def: f64) -> f64 {
    let level_factor = (2.0 * DAMAGE_LEVEL / 5.0) + 2.0;
    (level_factor * power as f64 * (effective_atk / effective_def) / 50.0) + 2.0
}

/// Multipliers that scale a hit besides STAB, type and the random factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageModifiers {
    pub defensive: f64,
    pub offensive: f64,
    pub critical: f64,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            defensive: 1.0,
            offensive: 1.0,
            critical: 1.0,
        }
    }
}

/// Final damage of a connecting hit. `roll` is the random factor in percent
/// (85..=100). The result is floored, so a weak enough hit deals 0.
pub fn calculate_damage(
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    type_multiplier: f64,
    modifiers: DamageModifiers,
    roll: u8,
) -> u16 {
    if type_multiplier == 0.0 || move_data.power == 0 {
        return 0;
    }
    let atk = effective_attack(attacker, move_data.category);
    let def = effective_defense(defender, move_data.category);
    let base = base_damage(move_data.power, atk, def);
    let damage = base
        * modifiers.defensive
        * modifiers.offensive
        * modifiers.critical
        * stab(attacker, move_data)
        * type_multiplier
        * (roll as f64 / 100.0);
    damage.floor() as u16
}

pub fn type_multiplier(move_data: &MoveData, defender: &Combatant) -> f64 {
    ShapeType::type_effectiveness(move_data.move_type, defender.shape_type)
}
