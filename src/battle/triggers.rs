//! Ability and item dispatch.
//!
//! Abilities and held items carry no behavior of their own. The resolver calls
//! into these named hooks at fixed points and each hook matches on the key.
//! A new ability or item needs a catalog entry and, at most, one new arm here.

use crate::battle::state::TurnRng;
use crate::combatant::Combatant;
use schema::{AbilityKey, ItemEffect, ItemKey, MoveCategory, ShapeType, StatType};

const STAT_BOOST: f64 = 1.2;
const RECOIL_FRACTION: f64 = 0.1;
const CRIT_CHANCE: u8 = 20;
const FAILSAFE_CHANCE: u8 = 10;

/// Which effect kept a combatant standing at 1 HP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalSave {
    Ability(AbilityKey),
    Item(ItemKey),
}

/// Ability-granted type immunity, checked before any damage is computed.
pub fn is_type_immune(defender: &Combatant, move_type: ShapeType) -> bool {
    matches!((defender.ability, move_type), (AbilityKey::Grounded, ShapeType::Flux))
}

/// Whether the defender shrugs off every status condition.
pub fn is_status_immune(defender: &Combatant) -> bool {
    defender.ability == AbilityKey::Firewall
}

/// Held-item multiplier on a stat, as used in effective stat calculation.
pub fn item_stat_multiplier(holder: &Combatant, stat: StatType, category: MoveCategory) -> f64 {
    if holder.item.active_effect() != Some(ItemEffect::StatMultiplier) {
        return 1.0;
    }
    let applies = match holder.item.key() {
        ItemKey::AttackPrism => stat == StatType::Atk && category == MoveCategory::Physical,
        ItemKey::MindGem => stat == StatType::Atk && category == MoveCategory::Special,
        _ => holder.item.data.affected_stat == Some(stat),
    };
    if applies {
        holder.item.magnitude_or(1.0)
    } else {
        1.0
    }
}

pub fn ability_attack_multiplier(attacker: &Combatant, category: MoveCategory) -> f64 {
    match (attacker.ability, category) {
        (AbilityKey::HonedEdge, MoveCategory::Physical) => STAT_BOOST,
        _ => 1.0,
    }
}

pub fn ability_speed_multiplier(combatant: &Combatant) -> f64 {
    match combatant.ability {
        AbilityKey::Aerodynamics => 1.25,
        _ => 1.0,
    }
}

/// Damage scaling from the defender's ability and held item.
pub fn defensive_multiplier(defender: &Combatant, category: MoveCategory) -> f64 {
    let ability = match (defender.ability, category) {
        (AbilityKey::DenseCore, MoveCategory::Physical) => 0.75,
        _ => 1.0,
    };
    let item = match defender.item.active_effect() {
        Some(ItemEffect::DamageResist) => defender.item.magnitude_or(1.0),
        _ => 1.0,
    };
    ability * item
}

/// Damage scaling from the attacker's held item (outside the attack stat).
pub fn offensive_multiplier(attacker: &Combatant) -> f64 {
    match attacker.item.active_effect() {
        Some(ItemEffect::RecoilBoost) => attacker.item.magnitude_or(1.0),
        _ => 1.0,
    }
}

/// Critical hit multiplier. Only a crit-boosting item can produce one, so no
/// draw is made otherwise.
pub fn critical_multiplier(attacker: &Combatant, rng: &mut TurnRng) -> Option<f64> {
    match attacker.item.active_effect() {
        Some(ItemEffect::CritBoost) if rng.chance(CRIT_CHANCE, "Critical Hit Check") => {
            Some(attacker.item.magnitude_or(1.5))
        }
        _ => None,
    }
}

/// Contact retaliation the attacker takes for hitting `defender` with a
/// physical move.
pub fn contact_retaliation(defender: &Combatant, attacker: &Combatant, category: MoveCategory) -> Option<u16> {
    match (defender.ability, category) {
        (AbilityKey::RoughSkin, MoveCategory::Physical) => Some(attacker.max_hp() / 8).filter(|&amount| amount > 0),
        _ => None,
    }
}

/// Self-inflicted recoil after dealing `damage`.
pub fn recoil_damage(attacker: &Combatant, damage: u16) -> Option<u16> {
    match attacker.item.active_effect() {
        Some(ItemEffect::RecoilBoost) => {
            let recoil = (damage as f64 * RECOIL_FRACTION).floor() as u16;
            (recoil > 0).then_some(recoil)
        }
        _ => None,
    }
}

/// Passive end-of-round healing and its source name. Applied once per round
/// even if both an ability and an item provide it.
pub fn passive_heal(combatant: &Combatant) -> Option<(u16, String)> {
    let amount = combatant.max_hp() / 16;
    if amount == 0 {
        return None;
    }
    if combatant.ability == AbilityKey::Regenerator {
        return Some((amount, "Regenerator".to_string()));
    }
    match combatant.item.active_effect() {
        Some(ItemEffect::PerTurnHeal) => Some((amount, combatant.item.data.name.clone())),
        _ => None,
    }
}

/// Try to keep a combatant that was just reduced to 0 HP standing.
///
/// The full-HP ability save is deterministic and checked first; the item save
/// rolls. At most one applies.
pub fn fatal_save(defender: &Combatant, was_full_hp: bool, rng: &mut TurnRng) -> Option<FatalSave> {
    if defender.ability == AbilityKey::Sturdy && was_full_hp {
        return Some(FatalSave::Ability(AbilityKey::Sturdy));
    }
    match defender.item.active_effect() {
        Some(ItemEffect::FatalGuard) if rng.chance(FAILSAFE_CHANCE, "Failsafe Band Check") => {
            Some(FatalSave::Item(defender.item.key()))
        }
        _ => None,
    }
}
