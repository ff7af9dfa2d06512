//! Beams are computed per run of beamable notes.
//!
//! Run is broken by rests, by notes without flags (quarter and longer) and
//! before items with `broken_beam`. Grace items are transparent. Within
//! a run every note compares the levels it shares with the previous note
//! (`open`) and with the next one (`next_open`):
//!
//! | level                          | value                            |
//! |--------------------------------|----------------------------------|
//! | `<= min(open, next_open)`      | Continue                         |
//! | `<= open`                      | End                              |
//! | `<= next_open`                 | Begin                            |
//! | rest of note beams             | hook toward the bigger side      |
//!
//! So, every level is closed in the run it was opened.

use std::cmp::{min, Ordering};

use log::trace;

use crate::{
    error::{RhythmicError, RhythmicResult},
    primitives::{BeamValue, RhythmicItem},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct BeamGrouper;
impl BeamGrouper {
    /// Replace beams of all items.
    ///
    /// Every sounding item must have note type set.
    pub fn beam(items: &mut [RhythmicItem]) -> RhythmicResult<()> {
        Self::check_types(items)?;
        items.iter_mut().for_each(|item| item.clear_beams());
        for run in Self::runs(items) {
            Self::beam_run(items, &run);
        }
        Ok(())
    }

    /// Beam two halves of a beat independently, then join them at the
    /// first level, if both halves are beamed at the border.
    pub fn beam_halves(items: &mut [RhythmicItem], split: usize) -> RhythmicResult<()> {
        Self::check_types(items)?;
        let split = split.min(items.len());
        let (first, second) = items.split_at_mut(split);
        Self::beam(first)?;
        Self::beam(second)?;
        let left = first.iter_mut().rev().find(|i| !i.is_grace());
        let right = second.iter_mut().find(|i| !i.is_grace());
        if let (Some(left), Some(right)) = (left, right) {
            if right.broken_beam() {
                return Ok(());
            }
            if left.beams().get(&1) == Some(&BeamValue::End)
                && right.beams().get(&1) == Some(&BeamValue::Begin)
            {
                trace!("joining beams of beat halves");
                left.set_beam(1, BeamValue::Continue);
                right.set_beam(1, BeamValue::Continue);
            }
        }
        Ok(())
    }

    fn check_types(items: &[RhythmicItem]) -> RhythmicResult<()> {
        match items
            .iter()
            .position(|i| !i.duration().is_zero() && i.note_type().is_none())
        {
            Some(index) => Err(RhythmicError::ChordTypeNotSet { index }),
            None => Ok(()),
        }
    }

    /// Indexes of beamable notes, grouped by runs of two or more.
    fn runs(items: &[RhythmicItem]) -> Vec<Vec<usize>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            if item.is_grace() {
                continue;
            }
            if item.number_of_beams() == 0 || item.broken_beam() {
                runs.push(std::mem::take(&mut current));
            }
            if item.number_of_beams() > 0 {
                current.push(idx);
            }
        }
        runs.push(current);
        runs.into_iter().filter(|run| run.len() > 1).collect()
    }

    fn beam_run(items: &mut [RhythmicItem], run: &[usize]) {
        let beams: Vec<u8> = run.iter().map(|idx| items[*idx].number_of_beams()).collect();
        let last = run.len() - 1;
        for (n, idx) in run.iter().enumerate() {
            let current = beams[n];
            let open = match n {
                0 => 0,
                _ => min(beams[n - 1], current),
            };
            let next_open = match n == last {
                true => 0,
                false => min(current, beams[n + 1]),
            };
            let item = &mut items[*idx];
            for level in 1..=current {
                let value = match level {
                    l if l <= min(open, next_open) => BeamValue::Continue,
                    l if l <= open => BeamValue::End,
                    l if l <= next_open => BeamValue::Begin,
                    _ => match open.cmp(&next_open) {
                        Ordering::Less => BeamValue::ForwardHook,
                        Ordering::Greater => BeamValue::BackwardHook,
                        Ordering::Equal if n == 0 => BeamValue::ForwardHook,
                        Ordering::Equal => BeamValue::BackwardHook,
                    },
                };
                item.set_beam(level, value);
            }
            trace!("beams of item {}: {:?}", idx, item.beams());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::BeamGrouper;
    use crate::{
        error::RhythmicError,
        primitives::{BeamValue, Duration, NoteType, Pitch, RhythmicItem, Step},
    };
    use BeamValue::*;

    fn note(tp: NoteType, dots: u8) -> RhythmicItem {
        let mut item = RhythmicItem::pitched(
            vec![Pitch::new(Step::D, 0, 5)],
            tp.dotted_duration(dots),
        )
        .unwrap();
        item.set_note_type(tp).unwrap();
        item.set_dots(dots);
        item
    }
    fn rest(tp: NoteType) -> RhythmicItem {
        let mut item = RhythmicItem::rest(tp.quarter_duration()).unwrap();
        item.set_note_type(tp).unwrap();
        item
    }
    fn beams(items: &[RhythmicItem]) -> Vec<Vec<BeamValue>> {
        items
            .iter()
            .map(|i| i.beams().values().copied().collect())
            .collect()
    }

    #[test]
    fn four_eighths() {
        let mut items = vec![note(NoteType::Eighth, 0); 4];
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(
            beams(&items),
            vec![vec![Begin], vec![Continue], vec![Continue], vec![End]]
        );
    }

    #[test]
    fn rest_breaks_beam() {
        let mut items = vec![
            note(NoteType::Eighth, 0),
            rest(NoteType::Eighth),
            note(NoteType::Eighth, 0),
            note(NoteType::Eighth, 0),
        ];
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(beams(&items), vec![vec![], vec![], vec![Begin], vec![End]]);
    }

    #[test]
    fn hooks() {
        let mut items = vec![note(NoteType::Eighth, 1), note(NoteType::N16th, 0)];
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(beams(&items), vec![vec![Begin], vec![End, BackwardHook]]);

        let mut items = vec![note(NoteType::N16th, 0), note(NoteType::Eighth, 1)];
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(beams(&items), vec![vec![Begin, ForwardHook], vec![End]]);

        let mut items = vec![
            note(NoteType::N16th, 0),
            note(NoteType::Eighth, 0),
            note(NoteType::N16th, 0),
        ];
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(
            beams(&items),
            vec![vec![Begin, ForwardHook], vec![Continue], vec![End, BackwardHook]]
        );
    }

    #[test]
    fn secondary_beams() {
        let mut items = vec![
            note(NoteType::N16th, 0),
            note(NoteType::N32nd, 0),
            note(NoteType::N32nd, 0),
            note(NoteType::Eighth, 0),
        ];
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(
            beams(&items),
            vec![
                vec![Begin, Begin],
                vec![Continue, Continue, Begin],
                vec![Continue, End, End],
                vec![End],
            ]
        );
    }

    #[test]
    fn broken_beam() {
        let mut items = vec![note(NoteType::N16th, 0); 4];
        items[2].set_broken_beam(true);
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(
            beams(&items),
            vec![vec![Begin, Begin], vec![End, End], vec![Begin, Begin], vec![End, End]]
        );
    }

    #[test]
    fn graces_and_long_notes() {
        let grace = RhythmicItem::grace(vec![Pitch::new(Step::E, 0, 5)]).unwrap();
        let mut items = vec![
            note(NoteType::Eighth, 0),
            grace,
            note(NoteType::Eighth, 0),
            note(NoteType::Quarter, 0),
        ];
        BeamGrouper::beam(&mut items).unwrap();
        assert_eq!(beams(&items), vec![vec![Begin], vec![], vec![End], vec![]]);
    }

    #[test]
    fn halves_are_joined() {
        let mut items = vec![note(NoteType::N16th, 0); 4];
        BeamGrouper::beam_halves(&mut items, 2).unwrap();
        assert_eq!(
            beams(&items),
            vec![
                vec![Begin, Begin],
                vec![Continue, End],
                vec![Continue, Begin],
                vec![End, End]
            ]
        );
        let mut items = vec![
            note(NoteType::Eighth, 0),
            note(NoteType::N16th, 0),
            note(NoteType::N16th, 0),
        ];
        BeamGrouper::beam_halves(&mut items, 1).unwrap();
        assert_eq!(beams(&items), vec![vec![], vec![Begin, Begin], vec![End, End]]);
    }

    #[test]
    fn level_closure() {
        let types = [
            NoteType::N32nd,
            NoteType::Eighth,
            NoteType::N64th,
            NoteType::N16th,
            NoteType::N16th,
            NoteType::N32nd,
        ];
        let mut items: Vec<_> = types.iter().map(|tp| note(*tp, 0)).collect();
        BeamGrouper::beam(&mut items).unwrap();
        let mut open: BTreeMap<u8, bool> = BTreeMap::new();
        for item in items.iter() {
            for (level, value) in item.beams() {
                let is_open = open.get(level).copied().unwrap_or(false);
                match value {
                    Begin => assert!(!is_open),
                    Continue | End => assert!(is_open),
                    ForwardHook | BackwardHook => assert!(!is_open),
                }
                open.insert(*level, matches!(value, Begin | Continue));
            }
        }
        assert!(open.values().all(|o| !o));
    }

    #[test]
    fn type_not_set() {
        let mut items = vec![
            note(NoteType::Eighth, 0),
            RhythmicItem::rest(Duration::new(1, 2).unwrap()).unwrap(),
        ];
        assert_eq!(
            BeamGrouper::beam(&mut items),
            Err(RhythmicError::ChordTypeNotSet { index: 1 })
        );
    }
}
