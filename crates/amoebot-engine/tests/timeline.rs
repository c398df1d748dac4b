//! Round marker, history bookkeeping and rejected rounds.

use amoebot_core::{Color, ParticleId};
use amoebot_engine::{ActionError, MovementConflict, ParticleSystem, Phase, RoundError};
use amoebot_space::{Direction, GridCoord};
use amoebot_test_utils::fixtures::{CounterFactory, FailingFactory, ScriptedFactory, Step};
use amoebot_test_utils::{line_config, placed_config, spaced_line_config, system_with};

/// Every history of every particle ends at the system's latest round
/// and has its marker at the current round.
fn assert_histories_in_sync(system: &ParticleSystem) {
    let latest = system.latest_round();
    let current = system.current_round();
    assert_eq!(system.anchor_history().last_round(), latest);
    for p in system.particles() {
        assert_eq!(p.tail_history().last_round(), latest);
        assert_eq!(p.expansion_history().last_round(), latest);
        assert_eq!(p.pin_configuration_history().last_round(), latest);
        assert_eq!(p.received_beep_history().last_round(), latest);
        assert_eq!(p.received_message_history().last_round(), latest);
        assert_eq!(p.main_color_history().last_round(), latest);
        assert_eq!(p.main_color_set_history().last_round(), latest);
        for slot in p.attributes().slots() {
            assert_eq!(slot.history().last_round(), latest, "attribute {}", slot.name());
            assert_eq!(slot.history().marked_round(), current);
        }
        assert_eq!(p.marked_round(), current);
    }
}

/// Tails, colors and attribute values of every particle.
fn snapshot(system: &ParticleSystem) -> Vec<(GridCoord, Option<Direction>, Color, String)> {
    system
        .particles()
        .iter()
        .map(|p| {
            let attrs: Vec<String> = p
                .attributes()
                .slots()
                .iter()
                .map(|s| s.value().to_string())
                .collect();
            (p.tail(), p.global_head_direction(), p.main_color(), attrs.join(","))
        })
        .collect()
}

// ── Bookkeeping ─────────────────────────────────────────────────────

#[test]
fn histories_stay_in_sync_across_rounds_and_rewinds() {
    let mut system = system_with(&line_config(4), &CounterFactory::new(10));
    system.run(5).unwrap();
    assert_histories_in_sync(&system);

    system.set_marker_to_round(2).unwrap();
    assert_histories_in_sync(&system);

    system.simulate_round().unwrap();
    assert_eq!(system.latest_round(), 3);
    assert_histories_in_sync(&system);
}

#[test]
fn counter_runs_until_finished() {
    let mut system = system_with(&line_config(3), &CounterFactory::new(4));
    assert_eq!(system.run(100).unwrap(), 4);
    assert!(system.is_finished());
    for p in system.particles() {
        assert_eq!(p.main_color(), Color::GREEN);
        assert_eq!(p.attributes().slot_by_name("count").unwrap().value().to_string(), "4");
    }
}

#[test]
fn step_back_and_forward_walk_the_rounds() {
    let mut system = system_with(&line_config(2), &CounterFactory::new(10));
    system.run(3).unwrap();
    let at_three = snapshot(&system);

    system.step_back().unwrap();
    system.step_back().unwrap();
    assert_eq!(system.current_round(), 1);
    assert!(!system.is_tracking());
    let count = system.particles()[0].attributes().slot_by_name("count").unwrap();
    assert_eq!(count.value().to_string(), "1");

    system.step_forward().unwrap();
    system.step_forward().unwrap();
    assert_eq!(snapshot(&system), at_three);
    assert!(system.step_forward().is_err());
}

#[test]
fn step_back_stops_at_the_earliest_round() {
    let mut config = line_config(1);
    config.start_round = 7;
    let mut system = system_with(&config, &CounterFactory::new(10));
    assert!(system.step_back().is_err());
    system.simulate_round().unwrap();
    assert_eq!(system.current_round(), 8);
    system.step_back().unwrap();
    assert_eq!(system.current_round(), 7);
}

#[test]
fn rewound_rounds_are_simulated_again_identically() {
    let mut system = system_with(&spaced_line_config(3, 3), &CounterFactory::new(10));
    system.run(4).unwrap();
    let first = snapshot(&system);

    system.set_marker_to_round(1).unwrap();
    system.run(3).unwrap();
    assert_eq!(system.latest_round(), 4);
    assert_eq!(snapshot(&system), first);
}

#[test]
fn cut_off_drops_the_future() {
    let mut system = system_with(&line_config(2), &CounterFactory::new(10));
    system.run(4).unwrap();
    system.set_marker_to_round(2).unwrap();
    system.cut_off_at_marker();
    assert_eq!(system.latest_round(), 2);
    assert_eq!(system.current_round(), 2);
    assert_histories_in_sync(&system);
    assert!(system.step_forward().is_err());

    system.continue_tracking();
    assert!(system.is_tracking());
    system.simulate_round().unwrap();
    assert_eq!(system.latest_round(), 3);
}

// ── Rejected rounds ─────────────────────────────────────────────────

fn assert_rejected(result: Result<amoebot_engine::RoundReport, RoundError>, particle: u32, phase: Phase) {
    match result {
        Err(RoundError::InvalidAction {
            particle: p,
            phase: ph,
            source: ActionError::Algorithm(_),
        }) => {
            assert_eq!(p, ParticleId(particle));
            assert_eq!(ph, phase);
        }
        other => panic!("expected InvalidAction, got {other:?}"),
    }
}

#[test]
fn failure_in_move_phase_changes_nothing() {
    let factory = FailingFactory::new(ParticleId(2), 2, Phase::Move);
    let mut system = system_with(&spaced_line_config(3, 3), &factory);
    system.simulate_round().unwrap();
    let before = snapshot(&system);

    assert_rejected(system.simulate_round(), 2, Phase::Move);
    assert_eq!(factory.failures(), 1);
    assert_eq!(system.current_round(), 1);
    assert_eq!(system.latest_round(), 1);
    assert_eq!(snapshot(&system), before);
    assert_histories_in_sync(&system);
}

#[test]
fn failure_in_beep_phase_changes_nothing() {
    let factory = FailingFactory::new(ParticleId(0), 1, Phase::Beep);
    let mut system = system_with(&spaced_line_config(3, 3), &factory);
    let before = snapshot(&system);

    assert_rejected(system.simulate_round(), 0, Phase::Beep);
    assert_eq!(system.current_round(), 0);
    assert_eq!(snapshot(&system), before);
    for p in system.particles() {
        assert!(p.is_contracted());
        assert_eq!(p.main_color(), Color::BLACK);
    }
    // Retrying fails the same way.
    assert_rejected(system.simulate_round(), 0, Phase::Beep);
    assert_eq!(factory.failures(), 2);
}

#[test]
fn movement_conflict_changes_nothing() {
    // Round 1 commits a move and a color; in round 2 particles 0 and 1
    // both expand into (1, 0).
    let factory = ScriptedFactory::new()
        .at(ParticleId(2), 1, Step::Expand(Direction::W))
        .at(ParticleId(0), 1, Step::SetColor(Color::GREEN))
        .at(ParticleId(0), 2, Step::Expand(Direction::E))
        .at(ParticleId(1), 2, Step::Expand(Direction::W));
    let config = placed_config(&[
        (GridCoord::new(0, 0), None),
        (GridCoord::new(2, 0), None),
        (GridCoord::new(6, 0), None),
    ]);
    let mut system = system_with(&config, &factory);
    system.simulate_round().unwrap();
    assert!(system.particles()[2].is_expanded());
    let before = snapshot(&system);

    for _ in 0..2 {
        match system.simulate_round() {
            Err(RoundError::MovementConflict { conflicts, .. }) => {
                assert!(matches!(conflicts[0], MovementConflict::Overlap { .. }))
            }
            other => panic!("expected MovementConflict, got {other:?}"),
        }
        assert_eq!(system.current_round(), 1);
        assert_eq!(system.latest_round(), 1);
        assert_eq!(snapshot(&system), before);
        assert_histories_in_sync(&system);
    }
    assert_eq!(system.particles()[0].main_color(), Color::GREEN);
    assert!(system.particles()[0].is_contracted());
}

#[test]
fn rejected_round_in_the_past_keeps_the_future() {
    let factory = FailingFactory::new(ParticleId(1), 2, Phase::Beep);
    let mut system = system_with(&spaced_line_config(2, 3), &factory);
    system.simulate_round().unwrap();
    // Round 2 always fails, so build a future by shifting past it.
    system.shift_timescale(5).unwrap();
    assert_eq!(system.current_round(), 6);
    system.simulate_round().unwrap();
    assert_eq!(system.latest_round(), 7);

    system.set_marker_to_round(5).unwrap();
    system.shift_timescale(-4).unwrap();
    assert_eq!(system.current_round(), 1);
    assert_eq!(system.latest_round(), 3);

    assert_rejected(system.simulate_round(), 1, Phase::Beep);
    assert_eq!(system.latest_round(), 3);
    assert!(!system.is_tracking());
    assert_histories_in_sync(&system);
}

#[test]
fn failing_particles_walk_east_when_not_failing() {
    let factory = FailingFactory::new(ParticleId(0), 99, Phase::Move);
    let mut system = system_with(&spaced_line_config(2, 3), &factory);
    system.run(4).unwrap();
    let tails: Vec<GridCoord> = system.particles().iter().map(|p| p.tail()).collect();
    assert_eq!(tails, vec![GridCoord::new(2, 0), GridCoord::new(5, 0)]);
    assert!(system.particles().iter().all(|p| p.main_color() == Color::RED));
}
