use crate::battle::state::{Action, BattleEvent, BattleState, EventBus, GameState, Side, TurnRng};
use crate::battle::stats::{calculate_damage, effective_speed, type_multiplier, DamageModifiers};
use crate::battle::triggers::{self, FatalSave};
use crate::combatant::{Combatant, StatusCondition};
use ordered_float::OrderedFloat;
use schema::{ItemEffect, MoveCategory, MoveData, StatusType};
use std::cmp::Ordering;
use tracing::{debug, warn};

const LAG_SKIP_CHANCE: u8 = 25;

/// Combatants that already got a Faint event this round, by side and roster slot.
#[derive(Debug, Default)]
struct FaintLedger {
    fainted: Vec<(Side, usize)>,
}

impl FaintLedger {
    /// Record a faint, returning false if it was already recorded.
    fn record(&mut self, side: Side, slot: usize) -> bool {
        if self.fainted.contains(&(side, slot)) {
            false
        } else {
            self.fainted.push((side, slot));
            true
        }
    }
}

/// Resolve whatever the battle is waiting on using the queued actions.
///
/// In a replacement phase only the owed switches are performed. Otherwise a
/// full round runs and the turn counter advances. The queue is cleared and
/// `game_state` is updated from [`BattleState::assess`] either way.
pub fn resolve_turn(battle_state: &mut BattleState, rng: &mut TurnRng) -> EventBus {
    let actions = std::mem::take(&mut battle_state.action_queue);

    let bus = if battle_state.game_state.is_replacement_phase() {
        resolve_replacements(battle_state, actions)
    } else {
        battle_state.game_state = GameState::TurnInProgress;
        let bus = resolve_actions(battle_state, actions, rng);
        battle_state.turn_number += 1;
        bus
    };

    let outcome = battle_state.assess();
    battle_state.game_state = GameState::from(&outcome);
    debug!(turn = battle_state.turn_number, ?outcome, "resolution finished");
    bus
}

/// Resolve one round from the two sides' actions. `None` means the side does
/// nothing this round.
///
/// Switches first, then moves in priority/speed order, then end-of-round upkeep.
pub fn resolve_actions(battle_state: &mut BattleState, actions: [Option<Action>; 2], rng: &mut TurnRng) -> EventBus {
    let mut bus = EventBus::new();
    let mut ledger = FaintLedger::default();
    debug!(turn = battle_state.turn_number, ?actions, "resolving round");

    // Phase 1: switches, side A then side B
    for side in Side::BOTH {
        if let Some(Action::Switch { roster_index }) = actions[side.index()] {
            execute_switch(battle_state, side, roster_index, &mut bus);
        }
    }

    // Phase 2: ordering
    let movers: Vec<(Side, usize)> = Side::BOTH
        .into_iter()
        .filter_map(|side| match actions[side.index()] {
            Some(Action::Move { move_index }) => Some((side, move_index)),
            _ => None,
        })
        .collect();
    let order = determine_action_order(battle_state, &movers, rng);

    // Phase 3: moves
    for (side, move_index) in order {
        let can_act = battle_state.active(side).is_some_and(|c| !c.is_fainted());
        if !can_act {
            debug!(%side, "skipping move from a fainted combatant");
            continue;
        }
        execute_move(battle_state, side, move_index, rng, &mut bus, &mut ledger);
    }

    // Phase 4: upkeep
    for side in Side::BOTH {
        execute_upkeep(battle_state, side, &mut bus, &mut ledger);
    }

    bus
}

/// Perform the switches owed after a faint. Actions from sides that owe
/// nothing, and non-switch actions, are ignored.
pub fn resolve_replacements(battle_state: &mut BattleState, actions: [Option<Action>; 2]) -> EventBus {
    let mut bus = EventBus::new();
    for side in Side::BOTH {
        if !battle_state.game_state.awaits_replacement_from(side) {
            continue;
        }
        match actions[side.index()] {
            Some(Action::Switch { roster_index }) => {
                execute_switch(battle_state, side, roster_index, &mut bus);
            }
            other => warn!(%side, ?other, "replacement phase without a switch"),
        }
    }
    bus
}

/// Order the moving sides: higher move priority first, then higher effective
/// speed, then a fair coin.
pub fn determine_action_order(battle_state: &BattleState, movers: &[(Side, usize)], rng: &mut TurnRng) -> Vec<(Side, usize)> {
    let key = |&(side, move_index): &(Side, usize)| {
        let Some(combatant) = battle_state.active(side) else {
            return (i8::MIN, OrderedFloat(0.0));
        };
        let priority = combatant
            .move_at(move_index)
            .and_then(|m| m.data().ok())
            .map_or(0, |data| data.priority);
        (priority, OrderedFloat(effective_speed(combatant)))
    };

    let mut order = movers.to_vec();
    if order.len() == 2 {
        let (first_key, second_key) = (key(&order[0]), key(&order[1]));
        let second_goes_first = match second_key.cmp(&first_key) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => !rng.coin_flip(),
        };
        if second_goes_first {
            order.swap(0, 1);
        }
    }
    order
}

fn execute_switch(battle_state: &mut BattleState, side: Side, roster_index: usize, bus: &mut EventBus) -> bool {
    let battle_side = battle_state.side_mut(side);
    if let Err(error) = battle_side.validate_switch(roster_index) {
        warn!(%side, %error, "ignoring invalid switch");
        bus.log(format!("{} couldn't switch: {}", battle_side.player_name, error));
        return false;
    }

    if let Some(outgoing) = battle_side.active().filter(|c| !c.is_fainted()) {
        bus.log(format!("{} withdrew {}!", battle_side.player_name, outgoing.name));
    }
    bus.push(BattleEvent::SwitchAnimation {
        side,
        new_active_index: roster_index,
    });
    battle_side.active_index = roster_index;
    let incoming = &battle_side.roster[roster_index];
    bus.log(format!("{} sent out {}!", battle_side.player_name, incoming.name));
    true
}

/// Mutable access to `side`'s active combatant and its opponent's, at once.
fn active_pair_mut(battle_state: &mut BattleState, side: Side) -> Option<(&mut Combatant, &mut Combatant)> {
    let [side_a, side_b] = &mut battle_state.sides;
    let (own, other) = match side {
        Side::A => (side_a, side_b),
        Side::B => (side_b, side_a),
    };
    let own_active = own.active_index;
    let other_active = other.active_index;
    Some((own.roster.get_mut(own_active)?, other.roster.get_mut(other_active)?))
}

fn active_slot(battle_state: &BattleState, side: Side) -> usize {
    battle_state.side(side).active_index
}

/// Pre-move status check. Returns false if the action is lost this turn.
fn passes_status_gate(attacker: &mut Combatant, side: Side, rng: &mut TurnRng, bus: &mut EventBus) -> bool {
    match attacker.status {
        Some(StatusCondition::Dormant(turns)) => {
            let remaining = turns.saturating_sub(1);
            if remaining == 0 {
                attacker.status = None;
                bus.push(BattleEvent::StatusCured { target: side });
                bus.log(format!("{} woke up!", attacker.name));
                true
            } else {
                attacker.status = Some(StatusCondition::Dormant(remaining));
                bus.log(format!("{} is dormant.", attacker.name));
                false
            }
        }
        Some(StatusCondition::Lagging) if rng.chance(LAG_SKIP_CHANCE, "Lag Skip Check") => {
            bus.log(format!("{} is lagging and couldn't move!", attacker.name));
            false
        }
        _ => true,
    }
}

fn execute_move(
    battle_state: &mut BattleState,
    side: Side,
    move_index: usize,
    rng: &mut TurnRng,
    bus: &mut EventBus,
    ledger: &mut FaintLedger,
) {
    let Some(attacker) = battle_state.active_mut(side) else {
        return;
    };

    let move_data: &'static MoveData = match attacker.move_at(move_index) {
        None => {
            warn!(%side, move_index, "ignoring out-of-range move index");
            bus.log(format!("{} hesitated.", attacker.name));
            return;
        }
        Some(instance) if instance.pp == 0 => {
            bus.log(format!("{} has no PP left for that move!", attacker.name));
            return;
        }
        Some(instance) => match instance.data() {
            Ok(data) => data,
            Err(error) => {
                warn!(%side, %error, "move missing from catalog");
                return;
            }
        },
    };

    if !passes_status_gate(attacker, side, rng, bus) {
        return;
    }

    attacker.moves[move_index].use_move();
    bus.log(format!("{} used {}!", attacker.name, move_data.name));
    bus.push(BattleEvent::AttackAnimation { attacker: side });

    match move_data.category {
        MoveCategory::Status => execute_status_move(battle_state, side, move_data, rng, bus),
        MoveCategory::Physical | MoveCategory::Special => {
            execute_damaging_move(battle_state, side, move_data, rng, bus, ledger)
        }
    }
}

fn execute_status_move(battle_state: &mut BattleState, side: Side, move_data: &MoveData, rng: &mut TurnRng, bus: &mut EventBus) {
    let Some((attacker, defender)) = active_pair_mut(battle_state, side) else {
        return;
    };

    if let Some(fraction) = move_data.heal_fraction {
        let amount = (attacker.max_hp() as f64 * fraction).floor() as u16;
        let gained = attacker.heal(amount);
        if gained > 0 {
            bus.push(BattleEvent::Heal { target: side, amount: gained });
            bus.log(format!("{} regained health!", attacker.name));
        } else {
            bus.log(format!("{}'s HP is already full!", attacker.name));
        }
    } else if let Some(stat) = move_data.stat_buff {
        let raised = (attacker.stats.get(stat) as f64 * 1.5).floor();
        attacker.stats.set(stat, raised.min(u16::MAX as f64) as u16);
        bus.log(format!("{}'s {} rose!", attacker.name, stat));
    }

    if let Some(status) = move_data.status_to_inflict {
        let chance = move_data.status_chance.unwrap_or(100);
        try_inflict_status(defender, side.opponent(), status, chance, rng, bus);
    }
}

fn try_inflict_status(target: &mut Combatant, target_side: Side, status: StatusType, chance: u8, rng: &mut TurnRng, bus: &mut EventBus) {
    if target.is_fainted() || target.status.is_some() {
        return;
    }
    if triggers::is_status_immune(target) {
        bus.log(format!("{}'s Firewall blocked the {}!", target.name, status));
        return;
    }
    if !rng.chance(chance, "Status Chance") {
        return;
    }
    let turns = if status == StatusType::Dormant { rng.dormant_turns() } else { 0 };
    target.status = Some(StatusCondition::from_kind(status, turns));
    bus.push(BattleEvent::StatusApplied { target: target_side, status });
    let message = match status {
        StatusType::Fragmented => format!("{} was fragmented!", target.name),
        StatusType::Lagging => format!("{} is lagging!", target.name),
        StatusType::Glitched => format!("{} was glitched!", target.name),
        StatusType::Dormant => format!("{} went dormant!", target.name),
    };
    bus.log(message);
}

fn execute_damaging_move(
    battle_state: &mut BattleState,
    side: Side,
    move_data: &MoveData,
    rng: &mut TurnRng,
    bus: &mut EventBus,
    ledger: &mut FaintLedger,
) {
    let defender_side = side.opponent();
    let attacker_slot = active_slot(battle_state, side);
    let defender_slot = active_slot(battle_state, defender_side);
    let Some((attacker, defender)) = active_pair_mut(battle_state, side) else {
        return;
    };
    if defender.is_fainted() {
        bus.log("But there was no target...");
        return;
    }

    if triggers::is_type_immune(defender, move_data.move_type) {
        bus.log(format!("It doesn't affect {}...", defender.name));
        return;
    }
    let type_mult = type_multiplier(move_data, defender);
    if type_mult == 0.0 {
        bus.log(format!("It had no effect on {}...", defender.name));
        return;
    }

    let critical = triggers::critical_multiplier(attacker, rng);
    let modifiers = DamageModifiers {
        defensive: triggers::defensive_multiplier(defender, move_data.category),
        offensive: triggers::offensive_multiplier(attacker),
        critical: critical.unwrap_or(1.0),
    };
    let roll = rng.damage_roll();
    let damage = calculate_damage(attacker, defender, move_data, type_mult, modifiers, roll);

    let was_full = defender.has_full_hp();
    let dealt = defender.take_damage(damage);
    bus.push(BattleEvent::Damage {
        target: defender_side,
        amount: dealt,
    });
    if critical.is_some() {
        bus.log("A critical hit!");
    }
    if type_mult > 1.0 {
        bus.log("It's super effective!");
    } else if type_mult < 1.0 {
        bus.log("It's not very effective...");
    }

    if let Some(retaliation) = triggers::contact_retaliation(defender, attacker, move_data.category) {
        if !attacker.is_fainted() {
            let lost = attacker.take_damage(retaliation);
            bus.push(BattleEvent::Damage { target: side, amount: lost });
            bus.log(format!("{} was hurt by {}'s Rough Skin!", attacker.name, defender.name));
        }
    }

    // A defender at 0 HP may still be saved below; its status roll waits for that.
    let secondary = move_data
        .status_to_inflict
        .map(|status| (status, move_data.status_chance.unwrap_or(100)));
    if let Some((status, chance)) = secondary.filter(|_| !defender.is_fainted()) {
        try_inflict_status(defender, defender_side, status, chance, rng, bus);
    }

    if move_data.is_draining && !attacker.is_fainted() {
        let gained = attacker.heal(dealt / 2);
        if gained > 0 {
            bus.push(BattleEvent::Heal { target: side, amount: gained });
            bus.log(format!("{} drained energy from {}!", attacker.name, defender.name));
        }
    }

    if let Some(recoil) = triggers::recoil_damage(attacker, dealt) {
        if !attacker.is_fainted() {
            let lost = attacker.take_damage(recoil);
            bus.push(BattleEvent::Damage { target: side, amount: lost });
            bus.log(format!("{} is damaged by its {}!", attacker.name, attacker.item.data.name));
        }
    }

    if defender.is_fainted() {
        match triggers::fatal_save(defender, was_full, rng) {
            Some(save) => {
                defender.heal(1);
                bus.push(BattleEvent::Heal {
                    target: defender_side,
                    amount: 1,
                });
                let source = match save {
                    FatalSave::Ability(_) => "Sturdy".to_string(),
                    FatalSave::Item(_) => defender.item.data.name.clone(),
                };
                bus.log(format!("{} endured the hit with {}!", defender.name, source));
                if let Some((status, chance)) = secondary {
                    try_inflict_status(defender, defender_side, status, chance, rng, bus);
                }
            }
            None => record_faint(defender, defender_side, defender_slot, bus, ledger),
        }
    }

    if attacker.is_fainted() {
        record_faint(attacker, side, attacker_slot, bus, ledger);
    }
}

fn record_faint(combatant: &Combatant, side: Side, slot: usize, bus: &mut EventBus, ledger: &mut FaintLedger) {
    if ledger.record(side, slot) {
        bus.push(BattleEvent::Faint { target: side });
        bus.log(format!("{} fainted!", combatant.name));
    }
}

/// End-of-round effects for one side's active combatant.
fn execute_upkeep(battle_state: &mut BattleState, side: Side, bus: &mut EventBus, ledger: &mut FaintLedger) {
    let slot = active_slot(battle_state, side);
    let Some(combatant) = battle_state.active_mut(side) else {
        return;
    };
    if combatant.is_fainted() {
        return;
    }

    if !combatant.has_full_hp() {
        if let Some((amount, source)) = triggers::passive_heal(combatant) {
            let gained = combatant.heal(amount);
            bus.push(BattleEvent::Heal { target: side, amount: gained });
            bus.log(format!("{}'s {} restored HP!", combatant.name, source));
        }
    }

    let below_half = (combatant.current_hp() as u32) * 2 < combatant.max_hp() as u32;
    if below_half && combatant.item.active_effect() == Some(ItemEffect::LowHpHeal) {
        let amount = (combatant.max_hp() as f64 * combatant.item.magnitude_or(0.5)).floor() as u16;
        combatant.item.consume();
        bus.push(BattleEvent::ItemConsumed {
            target: side,
            item: combatant.item.key(),
        });
        let gained = combatant.heal(amount);
        bus.push(BattleEvent::Heal { target: side, amount: gained });
        bus.log(format!("{} used its {}!", combatant.name, combatant.item.data.name));
    }

    if combatant.status.is_some() && combatant.item.active_effect() == Some(ItemEffect::CureStatus) {
        combatant.item.consume();
        combatant.status = None;
        bus.push(BattleEvent::ItemConsumed {
            target: side,
            item: combatant.item.key(),
        });
        bus.push(BattleEvent::StatusCured { target: side });
        bus.log(format!("{}'s {} cleared its status!", combatant.name, combatant.item.data.name));
    }

    let dot = match combatant.status {
        Some(StatusCondition::Fragmented) => Some((StatusType::Fragmented, combatant.max_hp() / 16)),
        Some(StatusCondition::Glitched) => Some((StatusType::Glitched, combatant.max_hp() / 8)),
        _ => None,
    };
    if let Some((status, amount)) = dot.filter(|&(_, amount)| amount > 0) {
        let lost = combatant.take_damage(amount);
        bus.push(BattleEvent::StatusDamage {
            target: side,
            amount: lost,
            status,
        });
        bus.log(format!("{} is hurt by {}!", combatant.name, status));
    }

    if combatant.is_fainted() {
        record_faint(combatant, side, slot, bus, ledger);
    }
}
