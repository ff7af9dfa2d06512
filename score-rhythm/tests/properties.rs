use std::collections::BTreeMap;

use itertools::Itertools;
use score_rhythm::{
    error::RhythmicError,
    primitives::{BeamValue, Beat, Duration, NoteType, Pitch, RhythmicItem, Step},
    rhythm::{DurationWriter, RhythmicConfig},
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dur(num: u64, den: u64) -> Duration {
    Duration::new(num, den).unwrap()
}

fn finalized(capacity: Duration, durations: &[(u64, u64)], config: &RhythmicConfig) -> Beat {
    let mut beat = Beat::new(capacity).unwrap();
    for (num, den) in durations {
        let item =
            RhythmicItem::pitched(vec![Pitch::new(Step::G, 1, 4)], dur(*num, *den)).unwrap();
        assert_eq!(beat.push(item).unwrap(), None);
    }
    beat.finalize(config).unwrap();
    beat
}

fn cases() -> Vec<(Duration, Vec<(u64, u64)>)> {
    vec![
        (dur(1, 1), vec![(1, 4), (1, 4), (1, 2)]),
        (dur(1, 1), vec![(5, 6), (1, 6)]),
        (dur(1, 1), vec![(1, 6), (5, 6)]),
        (dur(1, 1), vec![(1, 6), (1, 6), (1, 6), (1, 8), (1, 8), (1, 4)]),
        (dur(1, 1), vec![(1, 5); 5]),
        (dur(1, 1), vec![(1, 7); 7]),
        (dur(1, 1), vec![(15, 16), (1, 16)]),
        (dur(1, 1), vec![(7, 8), (1, 8)]),
        (dur(1, 1), vec![(1, 8); 8]),
        (dur(1, 1), vec![(5, 8), (3, 8)]),
        (dur(1, 1), vec![(3, 8), (5, 8)]),
        (dur(1, 1), vec![(11, 16), (5, 16)]),
        (dur(2, 1), vec![(5, 4), (3, 4)]),
        (dur(2, 1), vec![(2, 3), (2, 3), (2, 3)]),
        (dur(4, 1), vec![(3, 1), (1, 1)]),
        (dur(1, 2), vec![(1, 6); 3]),
        (dur(1, 2), vec![(1, 8), (3, 8)]),
    ]
}

/// Printed length of item, with tuplet applied.
fn printed(item: &RhythmicItem) -> Duration {
    let base = item.printed_duration().unwrap();
    match item.tuplet() {
        Some(tuplet) => tuplet.apply(base),
        None => base,
    }
}

#[test]
fn sum_is_preserved_and_notation_is_exact() {
    init_logger();
    let config = RhythmicConfig::builtin();
    for (capacity, durations) in cases() {
        let beat = finalized(capacity, &durations, config);
        assert_eq!(
            beat.items().iter().map(|i| *i.duration()).sum::<Duration>(),
            capacity,
            "{durations:?}"
        );
        for item in beat.items() {
            assert!(item.dots().unwrap() <= 2);
            assert_eq!(printed(item), *item.duration(), "{durations:?}");
            if let Some(tuplet) = item.tuplet() {
                assert!(tuplet.actual_notes > tuplet.normal_notes);
                assert!(tuplet.normal_notes >= 1);
            }
        }
    }
}

#[test]
fn ties_join_fragments_only() {
    let config = RhythmicConfig::builtin();
    for (capacity, durations) in cases() {
        let beat = finalized(capacity, &durations, config);
        let items = beat.items();
        assert!(!items[0].tied_to_previous());
        assert!(!items.last().unwrap().tied_to_next());
        for (left, right) in items.iter().tuple_windows() {
            assert_eq!(left.tied_to_next(), right.tied_to_previous());
            // continuation of a tie never repeats the accidental
            assert_eq!(
                right.pitches()[0].show_accidental(),
                !right.tied_to_previous()
            );
        }
        let sounding = items.iter().filter(|i| !i.tied_to_previous()).count();
        assert_eq!(sounding, durations.len());
    }
}

#[test]
fn beam_levels_are_closed() {
    let config = RhythmicConfig::builtin();
    for (capacity, durations) in cases() {
        let beat = finalized(capacity, &durations, config);
        let mut open: BTreeMap<u8, bool> = BTreeMap::new();
        for item in beat.items() {
            assert!(item.beams().len() <= item.note_type().unwrap().number_of_beams() as usize);
            for (level, value) in item.beams() {
                let was_open = open.get(level).copied().unwrap_or(false);
                match value {
                    BeamValue::Continue | BeamValue::End => assert!(was_open, "{durations:?}"),
                    _ => assert!(!was_open, "{durations:?}"),
                }
                open.insert(*level, matches!(value, BeamValue::Begin | BeamValue::Continue));
            }
            // levels, open before the item, must be continued by it
            for (level, is_open) in open.iter() {
                if *is_open {
                    assert!(item.beams().contains_key(level), "{durations:?}");
                }
            }
        }
        assert!(open.values().all(|o| !o), "{durations:?}");
    }
}

#[test]
fn eighth_grid_is_beamed_by_halves() {
    let beat = finalized(dur(1, 1), &[(1, 8); 8], RhythmicConfig::builtin());
    let items = beat.items();
    assert!(items.iter().all(|i| i.note_type() == Some(NoteType::N32nd)));
    assert_eq!(
        items[3].beams().values().copied().collect_vec(),
        vec![BeamValue::Continue, BeamValue::End, BeamValue::End]
    );
    assert_eq!(
        items[4].beams().values().copied().collect_vec(),
        vec![BeamValue::Continue, BeamValue::Begin, BeamValue::Begin]
    );
}

#[test]
fn writer_is_deterministic() {
    let writer = DurationWriter::new(RhythmicConfig::builtin());
    for (num, den) in [(1, 3), (3, 4), (7, 8), (2, 5), (3, 16)] {
        let duration = dur(num, den);
        let first = writer.write(duration, None, Duration::from(1));
        for _ in 0..3 {
            assert_eq!(writer.write(duration, None, Duration::from(1)), first);
        }
    }
}

#[test]
fn refinalization_is_rejected() {
    let mut beat = finalized(dur(1, 1), &[(1, 3); 3], RhythmicConfig::builtin());
    let before = beat.clone();
    assert_eq!(
        beat.finalize(RhythmicConfig::builtin()),
        Err(RhythmicError::AlreadyFinalized)
    );
    assert_eq!(beat, before);
}

#[test]
fn failed_finalization_leaves_beat_untouched() {
    let mut beat = Beat::new(dur(1, 1)).unwrap();
    for (num, den) in [(1, 6), (1, 8), (1, 8), (1, 6), (1, 6), (1, 8), (1, 8)] {
        beat.push(RhythmicItem::rest(dur(num, den)).unwrap()).unwrap();
    }
    let before = beat.clone();
    assert!(matches!(
        beat.finalize(RhythmicConfig::builtin()),
        Err(RhythmicError::NotImplemented(_))
    ));
    assert_eq!(beat, before);
    assert!(!beat.is_finalized());
}

#[test]
fn half_note_beat_without_single_grid_is_rejected() {
    let mut beat = Beat::new(dur(2, 1)).unwrap();
    for (num, den) in [(1, 3), (1, 3), (1, 3), (1, 4), (1, 4), (1, 2)] {
        beat.push(RhythmicItem::rest(dur(num, den)).unwrap()).unwrap();
    }
    assert!(beat.is_full());
    let before = beat.clone();
    assert!(matches!(
        beat.finalize(RhythmicConfig::builtin()),
        Err(RhythmicError::NotImplemented(_))
    ));
    assert_eq!(beat, before);
    assert!(!beat.is_finalized());
}

#[test]
fn config_changes_are_local_to_config_value() {
    let mut config = RhythmicConfig::default();
    config
        .set_position_split(Duration::zero(), dur(5, 6), vec![dur(1, 3), dur(1, 2)])
        .unwrap();
    let custom = finalized(dur(1, 1), &[(5, 6), (1, 6)], &config);
    assert_eq!(
        custom.items().iter().map(|i| *i.duration()).collect_vec(),
        vec![dur(1, 3), dur(1, 2), dur(1, 6)]
    );
    let builtin = finalized(dur(1, 1), &[(5, 6), (1, 6)], RhythmicConfig::builtin());
    assert_eq!(
        builtin.items().iter().map(|i| *i.duration()).collect_vec(),
        vec![dur(1, 2), dur(1, 3), dur(1, 6)]
    );
}
