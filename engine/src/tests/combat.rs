use super::*;
use crate::battle::{BattleStatus, BASE_ATTACK_DAMAGE, MAX_HP, STARTING_HP};

#[test]
fn test_seats_ordered_by_ascending_id() {
    let battle = Battle::new(7, 9, full_loadout(), 3, full_loadout());
    assert_eq!(battle.player1, 3);
    assert_eq!(battle.player2, 9);
    assert_eq!(battle.side_of(3), Some(Side::One));
    assert_eq!(battle.side_of(9), Some(Side::Two));
    assert_eq!(battle.side_of(4), None);
}

#[test]
fn test_plain_attack_hits_for_base_damage() {
    let mut battle = fresh_battle();
    let outcome = battle.attack(1, T0).unwrap();

    assert_eq!(outcome.player1_hp, STARTING_HP);
    assert_eq!(outcome.player2_hp, STARTING_HP - BASE_ATTACK_DAMAGE);
    assert!(!outcome.blocked);
    assert!(!outcome.countered);
    assert!(!outcome.finished);
}

#[test]
fn test_both_players_act_independently() {
    // No turn order: both players may attack at any time.
    let mut battle = fresh_battle();
    battle.attack(1, T0).unwrap();
    battle.attack(2, T0).unwrap();
    let outcome = battle.attack(2, T0 + 1).unwrap();

    assert_eq!(outcome.player1_hp, 6);
    assert_eq!(outcome.player2_hp, 8);
}

#[test]
fn test_five_plain_attacks_finish_the_battle() {
    let mut battle = fresh_battle();
    for _ in 0..4 {
        let outcome = battle.attack(1, T0).unwrap();
        assert!(!outcome.finished);
    }
    let outcome = battle.attack(1, T0).unwrap();

    assert_eq!(outcome.player2_hp, 0);
    assert!(outcome.finished);
    assert_eq!(outcome.winner_id, Some(1));
    assert_eq!(battle.status, BattleStatus::Finished);
}

#[test]
fn test_hp_stays_in_bounds() {
    let mut battle = fresh_battle();
    loop {
        let outcome = match battle.attack(1, T0) {
            Ok(o) => o,
            Err(EngineError::BattleFinished) => break,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert!((0..=MAX_HP).contains(&outcome.player1_hp));
        assert!((0..=MAX_HP).contains(&outcome.player2_hp));
    }
}

#[test]
fn test_finished_battle_rejects_all_commands() {
    let mut battle = fresh_battle();
    for _ in 0..5 {
        battle.attack(1, T0).unwrap();
    }

    assert_eq!(battle.attack(1, T0), Err(EngineError::BattleFinished));
    assert_eq!(battle.attack(2, T0), Err(EngineError::BattleFinished));
    assert!(matches!(
        battle.use_power(1, fireball().id, T0),
        Err(EngineError::BattleFinished)
    ));
    // Terminal state is immutable.
    assert_eq!(battle.winner, Some(1));
    assert_eq!(battle.hp(Side::Two), 0);
}

#[test]
fn test_non_participant_rejected() {
    let mut battle = fresh_battle();
    assert_eq!(
        battle.attack(99, T0),
        Err(EngineError::NotAParticipant { player: 99 })
    );
}

#[test]
fn test_counter_reflection_can_finish_the_attacker() {
    // Reflected damage is the only way an attacker loses HP on its own
    // command; the defender wins that finish.
    let heavy_counter = Power::counter(20, "Doom Riposte", "Epic", 0, 50);
    let mut battle = Battle::new(
        1,
        1,
        full_loadout(),
        2,
        Loadout::new(vec![heavy_counter.clone()]),
    );

    battle.use_power(2, heavy_counter.id, T0).unwrap();
    let outcome = battle.attack(1, T0 + 100).unwrap();

    assert!(outcome.countered);
    assert_eq!(outcome.damage_taken, 50);
    // Clamped at the floor, never negative.
    assert_eq!(outcome.player1_hp, 0);
    assert_eq!(outcome.player2_hp, STARTING_HP);
    assert!(outcome.finished);
    assert_eq!(outcome.winner_id, Some(2));
}
