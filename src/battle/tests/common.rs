use crate::battle::state::{BattleEvent, BattleSide, BattleState, EventBus, Side, TurnRng};
use crate::combatant::{create_combatant, Combatant, StatusCondition};
use schema::{ItemKey, MoveKey, SpeciesKey, StatType};

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let combatant = TestCombatantBuilder::new(SpeciesKey::Square, 50)
///     .with_moves(vec![MoveKey::BoxBash])
///     .with_status(StatusCondition::Lagging)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    species: SpeciesKey,
    level: u8,
    moves: Option<Vec<MoveKey>>,
    item: Option<ItemKey>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
    stats: Vec<(StatType, u16)>,
}

impl TestCombatantBuilder {
    /// Creates a new builder for a given species and level.
    pub fn new(species: SpeciesKey, level: u8) -> Self {
        Self {
            species,
            level,
            moves: None,
            item: None,
            status: None,
            current_hp: None,
            stats: Vec::new(),
        }
    }

    pub fn with_moves(mut self, moves: Vec<MoveKey>) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn with_item(mut self, item: ItemKey) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Overrides a calculated stat, for pinning down damage and ordering.
    pub fn with_stat(mut self, stat: StatType, value: u16) -> Self {
        self.stats.push((stat, value));
        self
    }

    pub fn build(self) -> Combatant {
        let mut combatant = match create_combatant(self.species, self.level, "test", self.moves.as_deref(), self.item) {
            Ok(combatant) => combatant,
            Err(err) => panic!("Failed to build {:?}: {}", self.species, err),
        };
        for (stat, value) in self.stats {
            combatant.stats.set(stat, value);
        }
        combatant.status = self.status;
        if let Some(hp) = self.current_hp {
            combatant.set_hp(hp);
        }
        combatant
    }
}

pub fn create_test_side(id: &str, name: &str, roster: Vec<Combatant>) -> BattleSide {
    BattleSide::new(id, name, roster)
}

/// Creates a standard 1v1 battle state for testing.
pub fn create_test_battle(a: Combatant, b: Combatant) -> BattleState {
    create_team_battle(vec![a], vec![b])
}

pub fn create_team_battle(roster_a: Vec<Combatant>, roster_b: Vec<Combatant>) -> BattleState {
    BattleState::new(
        "test_battle",
        create_test_side("p1", "Player 1", roster_a),
        create_test_side("p2", "Player 2", roster_b),
    )
}

/// A `TurnRng` with a generous buffer of middling values.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 100])
}

/// Position of the first event matching `predicate`, if any.
pub fn position_of(bus: &EventBus, predicate: impl Fn(&BattleEvent) -> bool) -> Option<usize> {
    bus.events().iter().position(predicate)
}

pub fn damage_to(bus: &EventBus, target: Side) -> Vec<u16> {
    bus.events()
        .iter()
        .filter_map(|e| match e {
            BattleEvent::Damage { target: t, amount } if *t == target => Some(*amount),
            _ => None,
        })
        .collect()
}

pub fn faint_count(bus: &EventBus, target: Side) -> usize {
    bus.events()
        .iter()
        .filter(|e| matches!(e, BattleEvent::Faint { target: t } if *t == target))
        .count()
}

pub fn has_log(bus: &EventBus, text: &str) -> bool {
    bus.messages().iter().any(|m| m.contains(text))
}
