use super::RhythmicConfig;
use crate::{
    error::{RhythmicError, RhythmicResult},
    primitives::{
        fraction_tools::{is_power_of_two, power_of_two},
        Duration, NoteType, TupletRatio,
    },
};

/// Length, the subdivision of a beat is counted against.
///
/// Binary beats (power of two quarters, or fractions of quarter) are their
/// own grid. Dotted beats (3/4, 3/2, 3, 6…) are counted by quarters.
///
/// # Example
/// ```
/// # use score_rhythm::{primitives::Duration, rhythm::grid_total};
/// assert_eq!(grid_total(Duration::from(2)).unwrap(), Duration::from(2));
/// assert_eq!(grid_total(Duration::new(3, 2).unwrap()).unwrap(), Duration::from(1));
/// assert!(grid_total(Duration::new(5, 4).unwrap()).is_err());
/// ```
pub fn grid_total(beat_total: Duration) -> RhythmicResult<Duration> {
    let (num, den) = beat_total.as_ratio();
    if is_power_of_two(num) && is_power_of_two(den) {
        return Ok(beat_total);
    }
    match is_dotted(beat_total) {
        true => Ok(Duration::from(1)),
        false => Err(RhythmicError::NotImplemented(format!(
            "beat of {beat_total} quarters is neither binary nor dotted"
        ))),
    }
}

/// Three times power of two.
pub fn is_dotted(beat_total: Duration) -> bool {
    let (num, den) = beat_total.as_ratio();
    num % 3 == 0 && is_power_of_two(num / 3) && is_power_of_two(den)
}

/// Writes exact durations as note types with dots.
#[derive(Debug, Clone, Copy)]
pub struct DurationWriter<'a> {
    config: &'a RhythmicConfig,
}
impl<'a> DurationWriter<'a> {
    pub fn new(config: &'a RhythmicConfig) -> Self {
        Self { config }
    }

    /// Subdivision, the duration implies by itself.
    pub fn default_subdivision(
        duration: Duration,
        beat_total: Duration,
    ) -> RhythmicResult<u32> {
        let grid = grid_total(beat_total)?;
        let den = duration.checked_div(grid)?.denom();
        u32::try_from(den).map_err(|_| {
            RhythmicError::NotImplemented(format!("subdivision {den}"))
        })
    }

    /// Note type and number of dots.
    ///
    /// Zero duration has no type. If subdivision is None, it is taken from
    /// the duration itself.
    ///
    /// # Example
    /// ```
    /// # use score_rhythm::{primitives::{Duration, NoteType}, rhythm::{DurationWriter, RhythmicConfig}};
    /// let writer = DurationWriter::new(RhythmicConfig::builtin());
    /// let one = Duration::from(1);
    /// assert_eq!(
    ///     writer.write(Duration::new(1, 3).unwrap(), Some(3), one).unwrap(),
    ///     (Some(NoteType::Eighth), 0)
    /// );
    /// assert_eq!(
    ///     writer.write(Duration::new(7, 8).unwrap(), None, one).unwrap(),
    ///     (Some(NoteType::Eighth), 2)
    /// );
    /// assert_eq!(writer.write(Duration::zero(), None, one).unwrap(), (None, 0));
    /// assert!(writer.write(Duration::new(5, 6).unwrap(), Some(6), one).is_err());
    /// ```
    pub fn write(
        &self,
        duration: Duration,
        subdivision: Option<u32>,
        beat_total: Duration,
    ) -> RhythmicResult<(Option<NoteType>, u8)> {
        if duration.is_zero() {
            return Ok((None, 0));
        }
        let grid = grid_total(beat_total)?;
        let mut subdivision = match subdivision {
            Some(sub) => sub,
            None => Self::default_subdivision(duration, beat_total)?,
        };
        if let Some((tp, dots)) =
            self.config
                .type_exception(beat_total, subdivision, duration)
        {
            return Ok((Some(tp), dots));
        }
        let mut slots = (duration * subdivision as u64).checked_div(grid)?;
        if slots.denom() != 1 {
            subdivision = Self::default_subdivision(duration, beat_total)?;
            slots = (duration * subdivision as u64).checked_div(grid)?;
        }
        let slots = slots.numer();
        let candidates = [(slots, 1, 0), (slots * 2 / 3, 3, 1), (slots * 4 / 7, 7, 2)];
        for (base, divisor, dots) in candidates {
            if slots % divisor != 0 {
                continue;
            }
            if let Some(tp) = self.config.note_type(base, subdivision) {
                return match NoteType::from_quarter_duration(tp.quarter_duration() * grid) {
                    Some(tp) => Ok((Some(tp), dots)),
                    None => Err(RhythmicError::Unwritable(duration)),
                };
            }
        }
        Err(RhythmicError::Unwritable(duration))
    }

    /// Write duration with its own beat context.
    pub fn write_duration(
        &self,
        duration: &Duration,
    ) -> RhythmicResult<(Option<NoteType>, u8)> {
        self.write(*duration, duration.subdivision(), duration.beat_total())
    }

    /// False if duration, in its context, can not be written.
    pub fn is_writable(&self, duration: &Duration) -> RhythmicResult<bool> {
        match self.write_duration(duration) {
            Ok(_) => Ok(true),
            Err(RhythmicError::Unwritable(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Tuplet, implied by the beat subdivision. None for binary grids.
    ///
    /// # Example
    /// ```
    /// # use score_rhythm::{primitives::{Duration, NoteType}, rhythm::{DurationWriter, RhythmicConfig}};
    /// let writer = DurationWriter::new(RhythmicConfig::builtin());
    /// let ratio = writer.get_tuplet_ratio(5, Duration::from(1)).unwrap().unwrap();
    /// assert_eq!((ratio.actual_notes, ratio.normal_notes), (5, 4));
    /// assert_eq!(ratio.normal_type, NoteType::N16th);
    /// assert_eq!(writer.get_tuplet_ratio(8, Duration::from(1)).unwrap(), None);
    /// assert!(writer.get_tuplet_ratio(65, Duration::from(1)).is_err());
    /// ```
    pub fn get_tuplet_ratio(
        &self,
        subdivision: u32,
        beat_total: Duration,
    ) -> RhythmicResult<Option<TupletRatio>> {
        let grid = grid_total(beat_total)?;
        let (actual, normal) = match is_dotted(beat_total) {
            true => match self.config.dotted_tuplet(subdivision) {
                Some(ratio) => ratio,
                None if is_power_of_two(subdivision as u64) => return Ok(None),
                None => {
                    return Err(RhythmicError::NotImplemented(format!(
                        "subdivision {subdivision} of dotted beat {beat_total}"
                    )))
                }
            },
            false => {
                if subdivision > 64 {
                    return Err(RhythmicError::NotImplemented(format!(
                        "subdivision {subdivision} is bigger than 64"
                    )));
                }
                if is_power_of_two(subdivision as u64) {
                    return Ok(None);
                }
                let normal = power_of_two(subdivision as u64).ok_or_else(|| {
                    RhythmicError::NotImplemented("zero subdivision".to_string())
                })?;
                (subdivision, normal as u32)
            }
        };
        let normal_type = NoteType::from_quarter_duration(grid / normal as u64)
            .ok_or_else(|| {
                RhythmicError::NotImplemented(format!(
                    "no note type for {actual}:{normal} tuplet in beat of {beat_total}"
                ))
            })?;
        TupletRatio::new(actual, normal, normal_type).map(Some)
    }
}
