//! A smallest piece of music, that is held by Beat.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Duration, NoteType, Pitch};
use crate::error::{RhythmicError, RhythmicResult};

/// What sounds (or not) during the item.
///
/// Grace items have no duration at all, so they never take place in a beat.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Pitched(Vec<Pitch>),
    Rest,
    Grace(Vec<Pitch>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamValue {
    Begin,
    Continue,
    End,
    ForwardHook,
    BackwardHook,
}
impl BeamValue {
    /// MusicXML `beam` element value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Continue => "continue",
            Self::End => "end",
            Self::ForwardHook => "forward hook",
            Self::BackwardHook => "backward hook",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TupletBracket {
    Start,
    Stop,
}

/// `actual_notes` are played in time of `normal_notes` of `normal_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupletRatio {
    pub actual_notes: u32,
    pub normal_notes: u32,
    pub normal_type: NoteType,
    pub bracket: Option<TupletBracket>,
}
impl TupletRatio {
    pub fn new(
        actual_notes: u32,
        normal_notes: u32,
        normal_type: NoteType,
    ) -> RhythmicResult<Self> {
        if normal_notes < 1 || actual_notes <= normal_notes {
            return Err(RhythmicError::InvalidTable(format!(
                "tuplet ratio {actual_notes}:{normal_notes} should have \
                more actual notes than normal"
            )));
        }
        Ok(Self {
            actual_notes,
            normal_notes,
            normal_type,
            bracket: None,
        })
    }
    pub fn with_bracket(mut self, bracket: Option<TupletBracket>) -> Self {
        self.bracket = bracket;
        self
    }
    /// Sounding length of printed length under this ratio.
    pub fn apply(&self, printed: Duration) -> Duration {
        printed * self.normal_notes as u64 / self.actual_notes as u64
    }
}

/// Chord, rest or grace chord with all the rhythmic notation attached.
///
/// Created with duration only. Note type, dots, tuplet and beams are
/// filled by [Beat::finalize](super::Beat::finalize), or can be set
/// manually beforehand.
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmicItem {
    kind: ItemKind,
    duration: Duration,
    note_type: Option<NoteType>,
    dots: Option<u8>,
    tuplet: Option<TupletRatio>,
    beams: BTreeMap<u8, BeamValue>,
    tied_to_next: bool,
    tied_to_previous: bool,
    broken_beam: bool,
}
impl RhythmicItem {
    fn new(kind: ItemKind, duration: Duration) -> Self {
        Self {
            kind,
            duration: duration.without_context(),
            note_type: None,
            dots: None,
            tuplet: None,
            beams: BTreeMap::new(),
            tied_to_next: false,
            tied_to_previous: false,
            broken_beam: false,
        }
    }

    /// Note or chord of several simultaneous notes.
    pub fn pitched(
        pitches: Vec<Pitch>,
        duration: Duration,
    ) -> RhythmicResult<Self> {
        if pitches.is_empty() {
            return Err(RhythmicError::InvalidDuration(
                "pitched item without pitches, use rest instead".to_string(),
            ));
        }
        if duration.is_zero() {
            return Err(RhythmicError::InvalidDuration(
                "pitched item of zero duration, use grace instead"
                    .to_string(),
            ));
        }
        Ok(Self::new(ItemKind::Pitched(pitches), duration))
    }
    pub fn rest(duration: Duration) -> RhythmicResult<Self> {
        if duration.is_zero() {
            return Err(RhythmicError::InvalidDuration(
                "rest of zero duration".to_string(),
            ));
        }
        Ok(Self::new(ItemKind::Rest, duration))
    }
    /// Grace chord: zero duration, printed as eighth by default.
    pub fn grace(pitches: Vec<Pitch>) -> RhythmicResult<Self> {
        if pitches.is_empty() {
            return Err(RhythmicError::InvalidDuration(
                "grace item without pitches".to_string(),
            ));
        }
        let mut item = Self::new(ItemKind::Grace(pitches), Duration::zero());
        item.note_type = Some(NoteType::Eighth);
        item.dots = Some(0);
        Ok(item)
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }
    pub fn pitches(&self) -> &[Pitch] {
        match &self.kind {
            ItemKind::Pitched(pitches) | ItemKind::Grace(pitches) => pitches,
            ItemKind::Rest => &[],
        }
    }
    fn pitches_mut(&mut self) -> &mut [Pitch] {
        match &mut self.kind {
            ItemKind::Pitched(pitches) | ItemKind::Grace(pitches) => pitches,
            ItemKind::Rest => &mut [],
        }
    }
    pub fn is_rest(&self) -> bool {
        self.kind == ItemKind::Rest
    }
    pub fn is_grace(&self) -> bool {
        matches!(self.kind, ItemKind::Grace(_))
    }

    pub fn duration(&self) -> &Duration {
        &self.duration
    }
    /// Annotate duration with the context of enclosing beat.
    pub(crate) fn set_duration_context(
        &mut self,
        subdivision: Option<u32>,
        beat_total: Duration,
    ) {
        self.duration.set_subdivision(subdivision);
        self.duration.set_beat_total(beat_total);
    }

    pub fn note_type(&self) -> Option<NoteType> {
        self.note_type
    }
    /// Note type can be set only once.
    pub fn set_note_type(&mut self, note_type: NoteType) -> RhythmicResult<()> {
        if let Some(current) = self.note_type {
            return Err(RhythmicError::TypeAlreadySet(current.to_string()));
        }
        self.note_type = Some(note_type);
        Ok(())
    }
    pub fn dots(&self) -> Option<u8> {
        self.dots
    }
    pub fn set_dots(&mut self, dots: u8) -> &mut Self {
        self.dots = Some(dots);
        self
    }
    /// Printed length of note type and dots, if type is known.
    pub fn printed_duration(&self) -> Option<Duration> {
        self.note_type
            .map(|tp| tp.dotted_duration(self.dots.unwrap_or(0)))
    }

    pub fn tuplet(&self) -> Option<&TupletRatio> {
        self.tuplet.as_ref()
    }
    pub fn set_tuplet(&mut self, tuplet: Option<TupletRatio>) -> &mut Self {
        self.tuplet = tuplet;
        self
    }

    pub fn beams(&self) -> &BTreeMap<u8, BeamValue> {
        &self.beams
    }
    pub(crate) fn set_beam(&mut self, level: u8, value: BeamValue) {
        self.beams.insert(level, value);
    }
    pub(crate) fn clear_beams(&mut self) {
        self.beams.clear();
    }
    /// Amount of beams, the note type gives. Rests and graces have none.
    pub fn number_of_beams(&self) -> u8 {
        match self.is_rest() || self.is_grace() {
            true => 0,
            false => self.note_type.map(|tp| tp.number_of_beams()).unwrap_or(0),
        }
    }

    pub fn tied_to_next(&self) -> bool {
        self.tied_to_next
    }
    pub fn tied_to_previous(&self) -> bool {
        self.tied_to_previous
    }
    /// Ties are meaningful only for pitched items, others ignore them.
    pub fn set_tied_to_next(&mut self, tied: bool) -> &mut Self {
        self.tied_to_next = tied && self.is_tieable();
        self
    }
    pub fn set_tied_to_previous(&mut self, tied: bool) -> &mut Self {
        self.tied_to_previous = tied && self.is_tieable();
        self
    }
    fn is_tieable(&self) -> bool {
        matches!(self.kind, ItemKind::Pitched(_))
    }

    /// If true, beam is broken between previous item and this one.
    pub fn broken_beam(&self) -> bool {
        self.broken_beam
    }
    pub fn set_broken_beam(&mut self, broken: bool) -> &mut Self {
        self.broken_beam = broken;
        self
    }

    /// Split item, truncate duration and return new "head" item,
    /// of given duration, tied to the truncated one.
    ///
    /// # Example
    /// ```
    /// # use score_rhythm::primitives::{Duration, Pitch, RhythmicItem, Step};
    /// let mut item = RhythmicItem::pitched(
    ///     vec![Pitch::new(Step::F, 1, 4)],
    ///     Duration::new(3, 2).unwrap(),
    /// ).unwrap();
    /// let head = item.cut_head(Duration::new(1, 2).unwrap()).unwrap();
    /// assert_eq!(item.duration(), &Duration::from(1));
    /// assert_eq!(head.duration(), &Duration::new(1, 2).unwrap());
    /// assert!(item.tied_to_next());
    /// assert!(head.tied_to_previous());
    /// assert!(!head.pitches()[0].show_accidental());
    /// ```
    pub fn cut_head(&mut self, head_length: Duration) -> RhythmicResult<Self> {
        if head_length.is_zero() || head_length >= self.duration {
            return Err(RhythmicError::InvalidDuration(format!(
                "Trying to cut head not shorter, than body: head: {}, body: {}",
                head_length, self.duration
            )));
        }
        let body_length = self.duration.checked_sub(head_length)?;
        let mut parts = self.split_into(&[body_length, head_length])?;
        let head = parts.pop();
        let body = parts.pop();
        match (body, head) {
            (Some(body), Some(head)) => {
                *self = body;
                Ok(head)
            }
            _ => Err(RhythmicError::InvalidDuration(
                "split lost item parts".to_string(),
            )),
        }
    }

    /// Fragments of the item with given durations, tied together.
    ///
    /// Only the first fragment keeps visible accidentals and the incoming
    /// tie, only the last keeps the outgoing tie. Derived notation is not
    /// copied.
    pub fn split_into(&self, durations: &[Duration]) -> RhythmicResult<Vec<Self>> {
        let total: Duration = durations.iter().sum();
        if total != self.duration {
            return Err(RhythmicError::InvalidDuration(format!(
                "fragments sum to {}, but item lasts {}",
                total, self.duration
            )));
        }
        if durations.iter().any(|dur| dur.is_zero()) {
            return Err(RhythmicError::InvalidDuration(
                "zero-length fragment".to_string(),
            ));
        }
        let last = durations.len().saturating_sub(1);
        Ok(durations
            .iter()
            .enumerate()
            .map(|(idx, dur)| {
                let mut part = Self::new(self.kind.clone(), *dur);
                part.duration
                    .set_subdivision(self.duration.subdivision())
                    .set_beat_total(self.duration.beat_total());
                let first = idx == 0;
                part.set_tied_to_previous(match first {
                    true => self.tied_to_previous,
                    false => true,
                });
                part.set_tied_to_next(match idx == last {
                    true => self.tied_to_next,
                    false => true,
                });
                part.broken_beam = first && self.broken_beam;
                if !first {
                    part.pitches_mut()
                        .iter_mut()
                        .for_each(|p| {
                            p.set_show_accidental(false);
                        });
                }
                part
            })
            .collect())
    }
}
