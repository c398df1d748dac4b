//! Finding where two runs diverge.
//!
//! Comparison walks the rounds both runs cover in order and, within a
//! round, the anchor and then every particle field by field. The first
//! difference is reported; later ones usually follow from it.

use std::fmt::Debug;

use amoebot_core::ParticleId;
use amoebot_engine::record::HistoryRecord;
use amoebot_engine::{ParticleSystem, SystemRecord};

/// The first point at which two runs differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Divergence {
    /// Round of the differing value, `None` for run-level settings.
    pub round: Option<u64>,
    /// The particle, `None` for system-wide values.
    pub particle: Option<ParticleId>,
    /// Name of the differing field.
    pub field: String,
    /// Value in the first run.
    pub left: String,
    /// Value in the second run.
    pub right: String,
}

impl Divergence {
    fn new(round: Option<u64>, particle: Option<ParticleId>, field: &str, left: impl Debug, right: impl Debug) -> Self {
        Self {
            round,
            particle,
            field: field.to_string(),
            left: format!("{left:?}"),
            right: format!("{right:?}"),
        }
    }
}

/// Compare the complete histories of two systems.
///
/// Returns `None` when both runs cover the same rounds with equal values.
pub fn compare_runs(left: &ParticleSystem, right: &ParticleSystem) -> Option<Divergence> {
    compare_records(&left.to_record(), &right.to_record())
}

/// Compare two run records. See [`compare_runs`].
pub fn compare_records(left: &SystemRecord, right: &SystemRecord) -> Option<Divergence> {
    if let Some(d) = compare_settings(left, right) {
        return Some(d);
    }
    let first = left.earliest_round.max(right.earliest_round);
    let last = left.latest_round.min(right.latest_round);
    for round in first..=last {
        if let Some(d) = compare_round(left, right, round) {
            return Some(d);
        }
    }
    if left.latest_round != right.latest_round {
        return Some(Divergence::new(
            Some(last + 1),
            None,
            "latest_round",
            left.latest_round,
            right.latest_round,
        ));
    }
    None
}

fn compare_settings(left: &SystemRecord, right: &SystemRecord) -> Option<Divergence> {
    let setting = |field: &str, l: &dyn Debug, r: &dyn Debug| Divergence::new(None, None, field, l, r);
    if left.algorithm != right.algorithm {
        return Some(setting("algorithm", &left.algorithm, &right.algorithm));
    }
    if left.pins_per_edge != right.pins_per_edge {
        return Some(setting("pins_per_edge", &left.pins_per_edge, &right.pins_per_edge));
    }
    if left.particles.len() != right.particles.len() {
        return Some(setting(
            "particle_count",
            &left.particles.len(),
            &right.particles.len(),
        ));
    }
    for (i, (l, r)) in left.particles.iter().zip(&right.particles).enumerate() {
        let particle = Some(ParticleId(i as u32));
        if (l.compass, l.chirality) != (r.compass, r.chirality) {
            return Some(Divergence::new(
                None,
                particle,
                "orientation",
                (l.compass, l.chirality),
                (r.compass, r.chirality),
            ));
        }
        let names = |p: &amoebot_engine::record::ParticleRecord| -> Vec<String> {
            p.attributes.iter().map(|a| a.name.clone()).collect()
        };
        if names(l) != names(r) {
            return Some(Divergence::new(None, particle, "attributes", names(l), names(r)));
        }
    }
    None
}

fn compare_round(left: &SystemRecord, right: &SystemRecord, round: u64) -> Option<Divergence> {
    if let Some((l, r)) = differs(&left.anchor, &right.anchor, round) {
        return Some(Divergence::new(Some(round), None, "anchor", l, r));
    }
    for (i, (l, r)) in left.particles.iter().zip(&right.particles).enumerate() {
        let particle = Some(ParticleId(i as u32));
        macro_rules! check {
            ($field:ident) => {
                if let Some((a, b)) = differs(&l.$field, &r.$field, round) {
                    return Some(Divergence::new(Some(round), particle, stringify!($field), a, b));
                }
            };
        }
        check!(tail);
        check!(expansion);
        check!(pin_configuration);
        check!(received_beeps);
        check!(received_messages);
        check!(main_color);
        check!(main_color_set);
        for (la, ra) in l.attributes.iter().zip(&r.attributes) {
            if let Some((a, b)) = differs(&la.history, &ra.history, round) {
                let field = format!("attribute '{}'", la.name);
                return Some(Divergence::new(Some(round), particle, &field, a, b));
            }
        }
    }
    None
}

/// The two values at `round`, if they differ.
fn differs<'a, T: PartialEq>(
    left: &'a HistoryRecord<T>,
    right: &'a HistoryRecord<T>,
    round: u64,
) -> Option<(Option<&'a T>, Option<&'a T>)> {
    let (l, r) = (value_at(left, round), value_at(right, round));
    (l != r).then_some((l, r))
}

/// The value a change-entry history holds in `round`.
fn value_at<T>(history: &HistoryRecord<T>, round: u64) -> Option<&T> {
    let after = history.entries.partition_point(|(r, _)| *r <= round);
    after.checked_sub(1).map(|i| &history.entries[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amoebot_space::Direction;
    use amoebot_test_utils::fixtures::{CounterFactory, ScriptedFactory, Step};
    use amoebot_test_utils::{line_config, system_with};

    #[test]
    fn identical_runs_do_not_diverge() {
        let mut a = system_with(&line_config(3), &CounterFactory::new(4));
        let mut b = system_with(&line_config(3), &CounterFactory::new(4));
        a.run(10).unwrap();
        b.run(10).unwrap();
        assert_eq!(compare_runs(&a, &b), None);
    }

    #[test]
    fn first_differing_move_is_reported() {
        let left = ScriptedFactory::new().at(ParticleId(1), 2, Step::Expand(Direction::Nne));
        let right = ScriptedFactory::new().at(ParticleId(1), 2, Step::Expand(Direction::E));
        let mut a = system_with(&line_config(2), &left);
        let mut b = system_with(&line_config(2), &right);
        a.run(3).unwrap();
        b.run(3).unwrap();

        let d = compare_runs(&a, &b).unwrap();
        assert_eq!(d.round, Some(2));
        assert_eq!(d.particle, Some(ParticleId(1)));
        assert_eq!(d.field, "expansion");
    }

    #[test]
    fn color_is_compared_before_attributes() {
        let mut a = system_with(&line_config(1), &CounterFactory::new(2));
        let mut b = system_with(&line_config(1), &CounterFactory::new(3));
        a.run(5).unwrap();
        b.run(5).unwrap();

        let d = compare_runs(&a, &b).unwrap();
        // Both count to 2; the longer counter is still going in round 3.
        assert_eq!(d.round, Some(2));
        assert_eq!(d.particle, Some(ParticleId(0)));
        assert_eq!(d.field, "main_color");
    }

    #[test]
    fn shorter_run_diverges_after_its_end() {
        let mut a = system_with(&line_config(2), &CounterFactory::new(10));
        let mut b = system_with(&line_config(2), &CounterFactory::new(10));
        a.run(2).unwrap();
        b.run(4).unwrap();
        let d = compare_runs(&a, &b).unwrap();
        assert_eq!(d.round, Some(3));
        assert_eq!(d.field, "latest_round");
    }

    #[test]
    fn particle_count_is_a_setting() {
        let a = system_with(&line_config(2), &CounterFactory::new(1));
        let b = system_with(&line_config(3), &CounterFactory::new(1));
        let d = compare_runs(&a, &b).unwrap();
        assert_eq!(d.round, None);
        assert_eq!(d.field, "particle_count");
        assert_eq!((d.left.as_str(), d.right.as_str()), ("2", "3"));
    }

    #[test]
    fn value_at_reads_change_entries() {
        let history = HistoryRecord {
            entries: vec![(2, 'a'), (5, 'b')],
            last_round: 9,
        };
        assert_eq!(value_at(&history, 1), None);
        assert_eq!(value_at(&history, 2), Some(&'a'));
        assert_eq!(value_at(&history, 4), Some(&'a'));
        assert_eq!(value_at(&history, 9), Some(&'b'));
    }
}
