//! Lookup tables of the rhythmic engine.
//!
//! All tables are keyed by exact values. [RhythmicConfig::default] builds
//! the built-in tables; a config value can be changed only through its
//! setters, and every finalization that receives the value sees the
//! changes. [RhythmicConfig::builtin] gives a shared read-only instance.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    error::{RhythmicError, RhythmicResult},
    primitives::{fraction_tools::power_of_two, Duration, NoteType},
};

/// Biggest subdivision, the note types table is built for.
pub static MAX_SUBDIVISION: u32 = 64;

static BUILTIN: Lazy<RhythmicConfig> = Lazy::new(RhythmicConfig::default);

fn q(numerator: u64, denominator: u64) -> Duration {
    Duration::from(numerator) / denominator
}

#[derive(Debug, Clone, PartialEq)]
pub struct RhythmicConfig {
    note_types: HashMap<(u64, u32), NoteType>,
    type_exceptions: HashMap<(Duration, u32, Duration), (NoteType, u8)>,
    dotted_tuplets: HashMap<u32, (u32, u32)>,
    position_splits: HashMap<(Duration, Duration), Vec<Duration>>,
    numerator_splits: HashMap<u64, Vec<u64>>,
    split_exceptions: HashMap<(Duration, u32, Duration), Vec<Duration>>,
}
impl Default for RhythmicConfig {
    fn default() -> Self {
        let mut note_types = HashMap::new();
        for subdivision in 1..=MAX_SUBDIVISION {
            let normal = Duration::from(power_of_two(subdivision as u64).unwrap_or(1));
            for tp in NoteType::ALL {
                let (num, den) = (tp.quarter_duration() * normal).as_ratio();
                if den == 1 && num >= 1 {
                    note_types.insert((num, subdivision), tp);
                }
            }
        }
        let type_exceptions = HashMap::from([
            ((q(3, 2), 4, q(3, 4)), (NoteType::Eighth, 1)),
            ((q(3, 1), 2, q(3, 2)), (NoteType::Quarter, 1)),
        ]);
        let dotted_tuplets = HashMap::from([
            (3, (3, 2)),
            (5, (5, 4)),
            (6, (6, 4)),
            (7, (7, 4)),
            (9, (9, 8)),
            (10, (10, 8)),
            (12, (12, 8)),
        ]);
        let position_splits = HashMap::from([
            ((q(0, 1), q(5, 6)), vec![q(1, 2), q(1, 3)]),
            ((q(1, 6), q(5, 6)), vec![q(1, 3), q(1, 2)]),
            ((q(0, 1), q(5, 8)), vec![q(1, 2), q(1, 8)]),
            ((q(3, 8), q(5, 8)), vec![q(1, 8), q(1, 2)]),
            ((q(0, 1), q(5, 4)), vec![q(1, 1), q(1, 4)]),
            ((q(3, 4), q(5, 4)), vec![q(1, 4), q(1, 1)]),
        ]);
        let numerator_splits = HashMap::from([
            (5, vec![4, 1]),
            (9, vec![8, 1]),
            (10, vec![8, 2]),
            (11, vec![8, 3]),
            (13, vec![12, 1]),
            (17, vec![16, 1]),
            (19, vec![16, 3]),
            (25, vec![24, 1]),
        ]);
        let split_exceptions = HashMap::from([
            ((q(1, 1), 16, q(15, 16)), vec![q(3, 4), q(3, 16)]),
            ((q(2, 1), 16, q(15, 8)), vec![q(3, 2), q(3, 8)]),
            ((q(4, 1), 16, q(15, 4)), vec![q(3, 1), q(3, 4)]),
            ((q(1, 2), 16, q(15, 32)), vec![q(3, 8), q(3, 32)]),
        ]);
        Self {
            note_types,
            type_exceptions,
            dotted_tuplets,
            position_splits,
            numerator_splits,
            split_exceptions,
        }
    }
}
impl RhythmicConfig {
    /// Shared instance with built-in tables.
    pub fn builtin() -> &'static RhythmicConfig {
        &BUILTIN
    }

    /// Undotted note type of `slots` grid slots, when the beat
    /// (of one quarter) is divided into `subdivision` slots.
    pub fn note_type(&self, slots: u64, subdivision: u32) -> Option<NoteType> {
        self.note_types.get(&(slots, subdivision)).copied()
    }
    pub fn set_note_type(
        &mut self,
        slots: u64,
        subdivision: u32,
        note_type: NoteType,
    ) -> RhythmicResult<&mut Self> {
        if slots == 0 || subdivision == 0 {
            return Err(RhythmicError::InvalidTable(format!(
                "note type key ({slots}, {subdivision}) should be positive"
            )));
        }
        self.note_types.insert((slots, subdivision), note_type);
        Ok(self)
    }

    pub fn type_exception(
        &self,
        beat_total: Duration,
        subdivision: u32,
        duration: Duration,
    ) -> Option<(NoteType, u8)> {
        self.type_exceptions
            .get(&(beat_total, subdivision, duration))
            .copied()
    }
    pub fn set_type_exception(
        &mut self,
        beat_total: Duration,
        subdivision: u32,
        duration: Duration,
        written: (NoteType, u8),
    ) -> RhythmicResult<&mut Self> {
        if written.1 > 2 {
            return Err(RhythmicError::InvalidTable(format!(
                "{} dots are not supported",
                written.1
            )));
        }
        if duration.is_zero() || beat_total.is_zero() || subdivision == 0 {
            return Err(RhythmicError::InvalidTable(format!(
                "type exception key ({beat_total}, {subdivision}, {duration}) \
                should be positive"
            )));
        }
        self.type_exceptions.insert(
            (beat_total.without_context(), subdivision, duration.without_context()),
            written,
        );
        Ok(self)
    }

    /// Tuplet ratio `(actual, normal)` for subdivision of a dotted beat.
    pub fn dotted_tuplet(&self, subdivision: u32) -> Option<(u32, u32)> {
        self.dotted_tuplets.get(&subdivision).copied()
    }
    pub fn set_dotted_tuplet(
        &mut self,
        subdivision: u32,
        ratio: (u32, u32),
    ) -> RhythmicResult<&mut Self> {
        let (actual, normal) = ratio;
        if normal < 1 || actual <= normal {
            return Err(RhythmicError::InvalidTable(format!(
                "tuplet ratio {actual}:{normal} should have more actual notes \
                than normal"
            )));
        }
        self.dotted_tuplets.insert(subdivision, ratio);
        Ok(self)
    }

    pub fn position_split(
        &self,
        offset: Duration,
        duration: Duration,
    ) -> Option<&Vec<Duration>> {
        self.position_splits.get(&(offset, duration))
    }
    pub fn set_position_split(
        &mut self,
        offset: Duration,
        duration: Duration,
        split: Vec<Duration>,
    ) -> RhythmicResult<&mut Self> {
        check_split(duration, &split)?;
        self.position_splits.insert(
            (offset.without_context(), duration.without_context()),
            split.iter().map(|d| d.without_context()).collect(),
        );
        Ok(self)
    }

    /// Split pattern of numerators, applied to any denominator.
    pub fn numerator_split(&self, numerator: u64) -> Option<&Vec<u64>> {
        self.numerator_splits.get(&numerator)
    }
    pub fn set_numerator_split(
        &mut self,
        numerator: u64,
        split: Vec<u64>,
    ) -> RhythmicResult<&mut Self> {
        if split.len() < 2
            || split.contains(&0)
            || split.iter().sum::<u64>() != numerator
        {
            return Err(RhythmicError::InvalidTable(format!(
                "split {split:?} is not a partition of {numerator}"
            )));
        }
        self.numerator_splits.insert(numerator, split);
        Ok(self)
    }

    pub fn split_exception(
        &self,
        beat_total: Duration,
        subdivision: u32,
        duration: Duration,
    ) -> Option<&Vec<Duration>> {
        self.split_exceptions
            .get(&(beat_total, subdivision, duration))
    }
    pub fn set_split_exception(
        &mut self,
        beat_total: Duration,
        subdivision: u32,
        duration: Duration,
        split: Vec<Duration>,
    ) -> RhythmicResult<&mut Self> {
        check_split(duration, &split)?;
        self.split_exceptions.insert(
            (beat_total.without_context(), subdivision, duration.without_context()),
            split.iter().map(|d| d.without_context()).collect(),
        );
        Ok(self)
    }
}

fn check_split(duration: Duration, split: &[Duration]) -> RhythmicResult<()> {
    if split.len() < 2
        || split.iter().any(|d| d.is_zero())
        || split.iter().sum::<Duration>() != duration
    {
        return Err(RhythmicError::InvalidTable(format!(
            "split {} is not a partition of {duration}",
            split.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" + ")
        )));
    }
    Ok(())
}
