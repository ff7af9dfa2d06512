use log::{debug, warn};

use crate::{
    error::{RhythmicError, RhythmicResult},
    primitives::{Beat, Measure, RhythmicItem, TimeSignature},
    rhythm::RhythmicConfig,
};

/// One voice of a staff: measures over a flat arena of beats.
///
/// Beats are addressed by their index in the arena, so the neighbor beats
/// and tied continuations are found by index arithmetic.
///
/// # Example
/// ```
/// # use score_rhythm::{dom::Voice, primitives::*, rhythm::RhythmicConfig};
/// let mut voice = Voice::new(TimeSignature::new(2, 4)).unwrap();
/// let c = Pitch::new(Step::C, 0, 5);
/// voice.push(RhythmicItem::pitched(vec![c], Duration::new(5, 2).unwrap()).unwrap()).unwrap();
/// voice.pad_with_rests().unwrap();
/// voice.finalize(RhythmicConfig::builtin()).unwrap();
/// assert_eq!(voice.measures().len(), 2);
/// assert_eq!(voice.tie_continuation(0, 0), Some((1, 0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    measures: Vec<Measure>,
    beats: Vec<Beat>,
    cursor: usize,
    pending_graces: Vec<RhythmicItem>,
}
impl Voice {
    /// Voice with the first measure.
    pub fn new(time_signature: TimeSignature) -> RhythmicResult<Self> {
        let mut voice = Self {
            measures: Vec::new(),
            beats: Vec::new(),
            cursor: 0,
            pending_graces: Vec::new(),
        };
        voice.add_measure(time_signature)?;
        Ok(voice)
    }

    /// Append empty measure and return its index. Measures are numbered
    /// from 1.
    pub fn add_measure(&mut self, time_signature: TimeSignature) -> RhythmicResult<u32> {
        let beats = time_signature
            .beat_capacities()?
            .into_iter()
            .map(Beat::new)
            .collect::<RhythmicResult<Vec<_>>>()?;
        let start = self.beats.len();
        let range = start..start + beats.len();
        self.beats.extend(beats);
        let index = self.measures.len() as u32 + 1;
        debug!("add measure {index} in {time_signature}, beats: {range:?}");
        self.measures.push(Measure::new(index, time_signature, range));
        Ok(index)
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }
    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }
    pub fn beat(&self, index: usize) -> Option<&Beat> {
        self.beats.get(index)
    }
    /// Measure, which contains the beat.
    pub fn measure_of(&self, beat: usize) -> Option<&Measure> {
        self.measures.iter().find(|m| m.contains_beat(beat))
    }
    pub fn previous_beat(&self, beat: usize) -> Option<&Beat> {
        beat.checked_sub(1).and_then(|idx| self.beats.get(idx))
    }
    pub fn next_beat(&self, beat: usize) -> Option<&Beat> {
        self.beats.get(beat + 1)
    }

    /// Push item after the last pushed one.
    ///
    /// Item, longer than the space left in the beat, continues in the next
    /// beats, tied. If the last measure is full, measure with the same time
    /// signature is appended. Grace items wait for the next sounding item
    /// and go to its beat.
    pub fn push(&mut self, item: RhythmicItem) -> RhythmicResult<()> {
        if item.is_grace() {
            self.pending_graces.push(item);
            return Ok(());
        }
        let mut item = item;
        loop {
            let beat = self.open_beat()?;
            self.place_graces(beat)?;
            match self.beats[beat].push(item)? {
                None => return Ok(()),
                Some(leftover) => item = leftover,
            }
        }
    }

    /// Move pending graces into the beat. Graces, which were not placed,
    /// stay pending.
    fn place_graces(&mut self, beat: usize) -> RhythmicResult<()> {
        let mut graces = std::mem::take(&mut self.pending_graces).into_iter();
        while let Some(grace) = graces.next() {
            if let Err(err) = self.beats[beat].push(grace.clone()) {
                self.pending_graces = std::iter::once(grace).chain(graces).collect();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Index of the first not full beat, measure is added if needed.
    fn open_beat(&mut self) -> RhythmicResult<usize> {
        while self.cursor < self.beats.len() && self.beats[self.cursor].is_full() {
            self.cursor += 1;
        }
        if self.cursor == self.beats.len() {
            let time_signature = *self
                .measures
                .last()
                .ok_or_else(|| {
                    RhythmicError::BeatWrongDuration("voice has no measures".to_string())
                })?
                .time_signature();
            self.add_measure(time_signature)?;
        }
        Ok(self.cursor)
    }

    /// Fill the rest of the last measure with rests.
    ///
    /// Pending grace items are placed before the first rest.
    pub fn pad_with_rests(&mut self) -> RhythmicResult<()> {
        let last = match self.measures.last() {
            Some(measure) => measure.beats(),
            None => return Ok(()),
        };
        for idx in last {
            if self.beats[idx].is_full() {
                continue;
            }
            self.place_graces(idx)?;
            self.beats[idx].pad_with_rest()?;
        }
        Ok(())
    }

    /// Item, the tie from `(beat, item)` goes to.
    ///
    /// Returns `(beat, item)` indexes of the next sounding item, if both
    /// items are tied to each other.
    pub fn tie_continuation(&self, beat: usize, item: usize) -> Option<(usize, usize)> {
        let current = self.beats.get(beat)?.items().get(item)?;
        if !current.tied_to_next() {
            return None;
        }
        let candidates = self.beats[beat]
            .items()
            .iter()
            .enumerate()
            .skip(item + 1)
            .map(|(idx, next)| (beat, idx, next))
            .chain(self.beats.iter().enumerate().skip(beat + 1).flat_map(|(b, following)| {
                following
                    .items()
                    .iter()
                    .enumerate()
                    .map(move |(idx, next)| (b, idx, next))
            }));
        for (b, idx, next) in candidates {
            if next.is_grace() {
                continue;
            }
            return match next.tied_to_previous() {
                true => Some((b, idx)),
                false => None,
            };
        }
        None
    }

    /// Finalize every beat in order.
    ///
    /// Errors are reported with measure index and beat number in measure
    /// (both count from 1). If any beat fails, no beat of the voice is
    /// finalized.
    pub fn finalize(&mut self, config: &RhythmicConfig) -> RhythmicResult<()> {
        if !self.pending_graces.is_empty() {
            warn!("{} grace items at the end of voice", self.pending_graces.len());
            return Err(RhythmicError::InvalidDuration(
                "grace items are not followed by any sounding item".to_string(),
            ));
        }
        let mut beats = self.beats.clone();
        for measure in self.measures.iter() {
            for (number, idx) in measure.beats().enumerate() {
                beats[idx]
                    .finalize(config)
                    .map_err(|err| err.in_beat(measure.index(), number + 1))?;
            }
        }
        self.beats = beats;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Voice;
    use crate::{
        error::RhythmicError,
        primitives::{Duration, NoteType, Pitch, RhythmicItem, Step, TimeSignature},
        rhythm::RhythmicConfig,
    };

    fn dur(num: u64, den: u64) -> Duration {
        Duration::new(num, den).unwrap()
    }
    fn note(step: Step, duration: Duration) -> RhythmicItem {
        RhythmicItem::pitched(vec![Pitch::new(step, 0, 4)], duration).unwrap()
    }

    #[test]
    fn filling_measures() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut voice = Voice::new(TimeSignature::new(3, 8)).unwrap();
        assert_eq!(voice.beats().len(), 3);
        voice.push(note(Step::C, dur(1, 1))).unwrap();
        voice.push(note(Step::D, dur(1, 1))).unwrap();
        assert_eq!(voice.measures().len(), 2);
        assert_eq!(voice.measures()[1].index(), 2);
        assert_eq!(voice.measures()[1].time_signature(), &TimeSignature::new(3, 8));
        assert!(voice.beats()[..4].iter().all(|b| b.is_full()));
        assert!(!voice.beats()[4].is_full());
        assert_eq!(voice.measure_of(4).unwrap().index(), 2);
        assert_eq!(voice.tie_continuation(0, 0), Some((1, 0)));
        assert_eq!(voice.tie_continuation(1, 0), None);
        assert!(voice.previous_beat(0).is_none());
        assert!(voice.next_beat(5).is_none());
    }

    #[test]
    fn graces_go_to_next_item() {
        let mut voice = Voice::new(TimeSignature::new(2, 4)).unwrap();
        voice.push(note(Step::C, dur(1, 1))).unwrap();
        voice
            .push(RhythmicItem::grace(vec![Pitch::new(Step::B, 0, 4)]).unwrap())
            .unwrap();
        assert!(voice.beats()[1].is_empty());
        voice.push(note(Step::D, dur(1, 2))).unwrap();
        assert!(voice.beats()[1].items()[0].is_grace());
        voice.pad_with_rests().unwrap();
        voice.finalize(RhythmicConfig::builtin()).unwrap();
        assert_eq!(voice.beats()[1].items()[1].note_type(), Some(NoteType::Eighth));
        assert!(voice.beats()[1].items()[2].is_rest());
    }

    #[test]
    fn errors_carry_position() {
        let mut voice = Voice::new(TimeSignature::new(2, 4)).unwrap();
        voice.push(note(Step::C, dur(1, 1))).unwrap();
        voice.push(note(Step::C, dur(1, 2))).unwrap();
        let err = voice.finalize(RhythmicConfig::builtin()).unwrap_err();
        assert!(matches!(
            err,
            RhythmicError::InBeat { measure: 1, beat: 2, .. }
        ));
        assert!(matches!(err.root(), RhythmicError::BeatNotFull { .. }));
        assert!(voice.beats().iter().all(|b| !b.is_finalized()));
        let again = voice.finalize(RhythmicConfig::builtin()).unwrap_err();
        assert_eq!(again, err);
    }

    #[test]
    fn graces_stay_pending_on_failure() {
        let mut voice = Voice::new(TimeSignature::new(2, 4)).unwrap();
        voice.push(note(Step::C, dur(1, 1))).unwrap();
        for step in [Step::D, Step::E] {
            voice
                .push(RhythmicItem::grace(vec![Pitch::new(step, 0, 5)]).unwrap())
                .unwrap();
        }
        assert_eq!(voice.place_graces(0), Err(RhythmicError::BeatIsFull));
        assert_eq!(voice.pending_graces.len(), 2);
        assert_eq!(voice.beats()[0].items().len(), 1);
        voice.place_graces(1).unwrap();
        assert!(voice.pending_graces.is_empty());
        assert_eq!(voice.beats()[1].items().len(), 2);
    }

    #[test]
    fn wrong_time_signature() {
        assert!(matches!(
            Voice::new(TimeSignature::new(5, 16)),
            Err(RhythmicError::BeatWrongDuration(_))
        ));
    }
}
