//! Measure is a window over beats of a voice.
//!
//! Time signature defines how measure is divided into beats. Every beat
//! capacity must be one of the [Beat](super::Beat) allowed capacities, so
//! `x/16` meters are grouped by pairs of sixteenths, and meters with odd
//! amount of sixteenths are not supported.

use std::{fmt::Display, ops::Range};

use serde::{Deserialize, Serialize};

use super::Duration;
use crate::error::{RhythmicError, RhythmicResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}
impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Whole measure length in quarters.
    pub fn length(&self) -> RhythmicResult<Duration> {
        Duration::new(self.numerator as u64 * 4, self.denominator as u64)
    }

    /// Capacities of beats, the measure is divided into.
    ///
    /// # Example
    /// ```
    /// # use score_rhythm::primitives::{Duration, TimeSignature};
    /// let caps = TimeSignature::new(6, 16).beat_capacities().unwrap();
    /// assert_eq!(caps, vec![Duration::new(1, 2).unwrap(); 3]);
    /// assert!(TimeSignature::new(5, 16).beat_capacities().is_err());
    /// ```
    pub fn beat_capacities(&self) -> RhythmicResult<Vec<Duration>> {
        let wrong = || RhythmicError::BeatWrongDuration(self.to_string());
        if self.numerator == 0 {
            return Err(wrong());
        }
        let (capacity, amount) = match self.denominator {
            1 => (Duration::from(4), self.numerator),
            2 => (Duration::from(2), self.numerator),
            4 => (Duration::from(1), self.numerator),
            8 => (Duration::from(1) / 2, self.numerator),
            16 if self.numerator % 2 == 0 => {
                (Duration::from(1) / 2, self.numerator / 2)
            }
            _ => return Err(wrong()),
        };
        Ok(vec![capacity; amount as usize])
    }
}
impl Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measure {
    index: u32,
    time_signature: TimeSignature,
    beats: Range<usize>,
}
impl Measure {
    /// `beats` are indexes of the voice beats arena.
    pub fn new(index: u32, time_signature: TimeSignature, beats: Range<usize>) -> Self {
        Self {
            index,
            time_signature,
            beats,
        }
    }
    pub fn index(&self) -> u32 {
        self.index
    }
    pub fn time_signature(&self) -> &TimeSignature {
        &self.time_signature
    }
    pub fn beats(&self) -> Range<usize> {
        self.beats.clone()
    }
    pub fn contains_beat(&self, beat: usize) -> bool {
        self.beats.contains(&beat)
    }
}
