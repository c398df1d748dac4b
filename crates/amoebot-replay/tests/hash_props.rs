//! Property tests: a saved run restores to the same state hash and the
//! same recorded histories, whatever the scripted particles did.

use amoebot_circuit::MessageRegistry;
use amoebot_core::{Color, ParticleId};
use amoebot_replay::{compare_runs, load_run, save_run, state_hash};
use amoebot_space::Direction;
use amoebot_test_utils::fixtures::{ScriptedFactory, Step};
use amoebot_test_utils::{spaced_line_config, system_with};
use proptest::prelude::*;

fn step_of(choice: usize) -> Option<Step> {
    match choice {
        0..=5 => Some(Step::Expand(Direction::from_int(choice, true))),
        6 => Some(Step::ContractHead),
        7 => Some(Step::ContractTail),
        8 => Some(Step::MakeAnchor),
        9 => Some(Step::SetColor(Color::RED)),
        _ => None,
    }
}

proptest! {
    #[test]
    fn restored_run_has_the_saved_hash(
        n in 1i32..5,
        spacing in 1i32..4,
        choices in proptest::collection::vec(0usize..12, 24),
        rounds in 1u64..8,
        rewind in 0u64..4,
    ) {
        let mut factory = ScriptedFactory::new();
        for (i, &choice) in choices.iter().enumerate() {
            let particle = (i as i32 % n) as u32;
            let round = (i as u64 / n as u64) % rounds + 1;
            if let Some(step) = step_of(choice) {
                factory = factory.at(ParticleId(particle), round, step);
            }
        }
        let mut system = system_with(&spaced_line_config(n, spacing), &factory);
        for _ in 0..rounds {
            if system.simulate_round().is_err() {
                break;
            }
        }
        let marker = system.current_round().saturating_sub(rewind);
        system.set_marker_to_round(marker).unwrap();

        let mut buf = Vec::new();
        let saved = save_run(&system, &mut buf).unwrap();
        prop_assert_eq!(saved.state_hash, state_hash(&system));

        let (restored, report) = load_run(buf.as_slice())
            .unwrap()
            .restore(&factory, &MessageRegistry::new())
            .unwrap();
        prop_assert!(report.is_clean());
        prop_assert_eq!(restored.current_round(), system.current_round());
        prop_assert_eq!(restored.latest_round(), system.latest_round());
        prop_assert_eq!(state_hash(&restored), state_hash(&system));
        prop_assert_eq!(compare_runs(&system, &restored), None);
    }
}
