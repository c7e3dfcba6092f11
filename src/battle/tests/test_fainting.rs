#[cfg(test)]
mod tests {
    use crate::battle::engine::{resolve_actions, resolve_turn};
    use crate::battle::state::{Action, BattleEvent, GameState, RoundOutcome, Side, TurnRng};
    use crate::battle::tests::common::{
        create_team_battle, create_test_battle, faint_count, has_log, position_of, predictable_rng,
        TestCombatantBuilder,
    };
    use crate::combatant::StatusCondition;
    use crate::errors::ActionError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{ItemKey, MoveKey, SpeciesKey, StatType, StatusType};

    const MOVE_0: Option<Action> = Some(Action::Move { move_index: 0 });

    fn heavy_hitter(moves: Vec<MoveKey>) -> crate::combatant::Combatant {
        TestCombatantBuilder::new(SpeciesKey::Fractal, 50)
            .with_moves(moves)
            .with_stat(StatType::Atk, 9999)
            .build()
    }

    #[test]
    fn test_faint_with_reserve_forces_replacement() {
        let attacker = heavy_hitter(vec![MoveKey::Pierce]);
        let roster_b = vec![
            TestCombatantBuilder::new(SpeciesKey::Circle, 50).with_hp(10).build(),
            TestCombatantBuilder::new(SpeciesKey::Kite, 50).build(),
        ];
        let mut state = create_team_battle(vec![attacker], roster_b);
        state.queue_action(Side::A, Action::Move { move_index: 0 }).unwrap();
        state.queue_action(Side::B, Action::Move { move_index: 0 }).unwrap();

        let bus = resolve_turn(&mut state, &mut predictable_rng());

        assert_eq!(faint_count(&bus, Side::B), 1);
        assert!(has_log(&bus, "Orbulon fainted!"));
        assert_eq!(state.assess(), RoundOutcome::ForcedSwitch(vec![Side::B]));
        assert_eq!(state.game_state, GameState::WaitingForSideBReplacement);
        assert_eq!(state.turn_number, 2);

        // only the fainted side may act, and only by switching
        assert!(matches!(
            state.queue_action(Side::A, Action::Move { move_index: 0 }),
            Err(ActionError::NotAccepted(_))
        ));
        assert!(matches!(
            state.queue_action(Side::B, Action::Move { move_index: 0 }),
            Err(ActionError::NotAccepted(_))
        ));
        assert_eq!(
            state.queue_action(Side::B, Action::Switch { roster_index: 0 }),
            Err(ActionError::SwitchTargetActive(0))
        );
        assert_eq!(state.side(Side::B).valid_replacements(), vec![Action::Switch { roster_index: 1 }]);
        assert!(!state.ready_for_turn_resolution());
        state.queue_action(Side::B, Action::Switch { roster_index: 1 }).unwrap();
        assert!(state.ready_for_turn_resolution());

        let replacement = resolve_turn(&mut state, &mut predictable_rng());

        assert!(replacement.events().contains(&BattleEvent::SwitchAnimation {
            side: Side::B,
            new_active_index: 1
        }));
        assert!(has_log(&replacement, "Player 2 sent out Zephyr!"));
        assert!(!has_log(&replacement, "withdrew"));
        assert_eq!(state.game_state, GameState::WaitingForActions);
        assert_eq!(state.turn_number, 2);
    }

    #[test]
    fn test_last_faint_ends_the_battle() {
        let attacker = heavy_hitter(vec![MoveKey::Pierce]);
        let circle = TestCombatantBuilder::new(SpeciesKey::Circle, 50).with_hp(10).build();
        let mut state = create_test_battle(attacker, circle);
        state.queue_action(Side::A, Action::Move { move_index: 0 }).unwrap();
        state.queue_action(Side::B, Action::Move { move_index: 0 }).unwrap();

        resolve_turn(&mut state, &mut predictable_rng());

        assert_eq!(state.assess(), RoundOutcome::GameOver(Some(Side::A)));
        assert_eq!(state.game_state, GameState::SideAWin);
        assert!(!state.ready_for_turn_resolution());
        assert!(matches!(
            state.queue_action(Side::A, Action::Move { move_index: 0 }),
            Err(ActionError::NotAccepted(_))
        ));
    }

    #[test]
    fn test_fainted_combatant_does_not_act() {
        let kite = TestCombatantBuilder::new(SpeciesKey::Kite, 50)
            .with_moves(vec![MoveKey::AeroSlash])
            .with_stat(StatType::Atk, 9999)
            .build();
        let slow = TestCombatantBuilder::new(SpeciesKey::Fractal, 50)
            .with_moves(vec![MoveKey::PhaseShift])
            .build();
        let mut state = create_test_battle(kite, slow);

        let bus = resolve_actions(&mut state, [MOVE_0, MOVE_0], &mut predictable_rng());

        assert_eq!(faint_count(&bus, Side::B), 1);
        assert!(!bus.events().contains(&BattleEvent::AttackAnimation { attacker: Side::B }));
        assert!(!has_log(&bus, "Fractyl used"));
    }

    #[test]
    fn test_sturdy_survives_from_full_hp_only() {
        let attacker = heavy_hitter(vec![MoveKey::Pierce]);
        let square = TestCombatantBuilder::new(SpeciesKey::Square, 50).build();
        let mut state = create_test_battle(attacker, square);

        let first = resolve_actions(&mut state, [MOVE_0, None], &mut predictable_rng());
        assert_eq!(faint_count(&first, Side::B), 0);
        assert!(first.events().contains(&BattleEvent::Heal { target: Side::B, amount: 1 }));
        assert!(has_log(&first, "Cubix endured the hit with Sturdy!"));
        assert_eq!(state.active(Side::B).unwrap().current_hp(), 1);

        let second = resolve_actions(&mut state, [MOVE_0, None], &mut predictable_rng());
        assert_eq!(faint_count(&second, Side::B), 1);
        assert!(state.active(Side::B).unwrap().is_fainted());
    }

    #[test]
    fn test_saved_defender_still_rolls_secondary_status() {
        let attacker = heavy_hitter(vec![MoveKey::Shatter]);
        let square = TestCombatantBuilder::new(SpeciesKey::Square, 50).build();
        let mut state = create_test_battle(attacker, square);
        let mut rng = TurnRng::new_for_test(vec![100, 1]);

        let bus = resolve_actions(&mut state, [MOVE_0, None], &mut rng);

        let saved = position_of(&bus, |e| *e == BattleEvent::Heal { target: Side::B, amount: 1 }).unwrap();
        let fragmented = position_of(&bus, |e| {
            *e == BattleEvent::StatusApplied {
                target: Side::B,
                status: StatusType::Fragmented,
            }
        })
        .unwrap();
        assert!(saved < fragmented);
        assert!(has_log(&bus, "Cubix was fragmented!"));
    }

    #[rstest]
    #[case(10, true)]
    #[case(11, false)]
    fn test_failsafe_band_may_save(#[case] band_roll: u8, #[case] survives: bool) {
        let attacker = heavy_hitter(vec![MoveKey::Pierce]);
        let circle = TestCombatantBuilder::new(SpeciesKey::Circle, 50)
            .with_item(ItemKey::FailsafeBand)
            .with_hp(10)
            .build();
        let mut state = create_test_battle(attacker, circle);
        let mut rng = TurnRng::new_for_test(vec![100, band_roll]);

        let bus = resolve_actions(&mut state, [MOVE_0, None], &mut rng);

        assert_eq!(faint_count(&bus, Side::B), usize::from(!survives));
        assert_eq!(has_log(&bus, "endured the hit with Failsafe Band"), survives);
        assert_eq!(state.active(Side::B).unwrap().is_fainted(), !survives);
    }

    #[test]
    fn test_damage_over_time_faints_once() {
        let fractal = TestCombatantBuilder::new(SpeciesKey::Fractal, 50)
            .with_status(StatusCondition::Glitched)
            .with_hp(5)
            .build();
        let roster_b = vec![TestCombatantBuilder::new(SpeciesKey::Square, 50).build()];
        let mut state = create_team_battle(vec![fractal], roster_b);

        let bus = resolve_actions(&mut state, [None, None], &mut predictable_rng());

        assert!(bus.events().contains(&BattleEvent::StatusDamage {
            target: Side::A,
            amount: 5,
            status: schema::StatusType::Glitched,
        }));
        assert_eq!(faint_count(&bus, Side::A), 1);
        assert_eq!(state.assess(), RoundOutcome::GameOver(Some(Side::B)));
    }

    #[test]
    fn test_double_knockout_is_a_draw() {
        // Pierce knocks out the Triangle, Rough Skin finishes the attacker
        let attacker = TestCombatantBuilder::new(SpeciesKey::Fractal, 50)
            .with_moves(vec![MoveKey::Pierce])
            .with_stat(StatType::Atk, 9999)
            .with_hp(1)
            .build();
        let triangle = TestCombatantBuilder::new(SpeciesKey::Triangle, 50).build();
        let mut state = create_test_battle(attacker, triangle);

        let bus = resolve_actions(&mut state, [MOVE_0, None], &mut predictable_rng());

        let defender_faint = position_of(&bus, |e| matches!(e, BattleEvent::Faint { target: Side::B })).unwrap();
        let attacker_faint = position_of(&bus, |e| matches!(e, BattleEvent::Faint { target: Side::A })).unwrap();
        assert!(defender_faint < attacker_faint);
        assert_eq!(faint_count(&bus, Side::A), 1);
        assert_eq!(state.assess(), RoundOutcome::GameOver(None));
        assert_eq!(GameState::from(&state.assess()), GameState::Draw);
    }

    #[test]
    fn test_both_sides_replace_together() {
        let roster_a = vec![
            TestCombatantBuilder::new(SpeciesKey::Fractal, 50)
                .with_status(StatusCondition::Glitched)
                .with_hp(1)
                .build(),
            TestCombatantBuilder::new(SpeciesKey::Square, 50).build(),
        ];
        let roster_b = vec![
            TestCombatantBuilder::new(SpeciesKey::Kite, 50)
                .with_status(StatusCondition::Fragmented)
                .with_hp(1)
                .build(),
            TestCombatantBuilder::new(SpeciesKey::Circle, 50).build(),
        ];
        let mut state = create_team_battle(roster_a, roster_b);

        // nothing queued, only the upkeep matters here
        resolve_turn(&mut state, &mut predictable_rng());
        assert_eq!(state.game_state, GameState::WaitingForBothReplacements);

        state.queue_action(Side::A, Action::Switch { roster_index: 1 }).unwrap();
        assert!(!state.ready_for_turn_resolution());
        state.queue_action(Side::B, Action::Switch { roster_index: 1 }).unwrap();
        let bus = resolve_turn(&mut state, &mut predictable_rng());

        let switches: Vec<Side> = bus
            .events()
            .iter()
            .filter_map(|e| match e {
                BattleEvent::SwitchAnimation { side, .. } => Some(*side),
                _ => None,
            })
            .collect();
        assert_eq!(switches, vec![Side::A, Side::B]);
        assert_eq!(state.game_state, GameState::WaitingForActions);
    }
}
