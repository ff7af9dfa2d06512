use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{fraction_tools::is_power_of_two, Duration};
use crate::error::RhythmicError;

/// Printed (graphical) note value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum NoteType {
    N1024th,
    N512th,
    N256th,
    N128th,
    N64th,
    N32nd,
    N16th,
    Eighth,
    Quarter,
    Half,
    Whole,
    Breve,
    Long,
    Maxima,
}
impl NoteType {
    pub const ALL: [NoteType; 14] = [
        Self::N1024th,
        Self::N512th,
        Self::N256th,
        Self::N128th,
        Self::N64th,
        Self::N32nd,
        Self::N16th,
        Self::Eighth,
        Self::Quarter,
        Self::Half,
        Self::Whole,
        Self::Breve,
        Self::Long,
        Self::Maxima,
    ];

    /// Nominal length of undotted note, in quarters.
    pub fn quarter_duration(&self) -> Duration {
        // Quarter has index 8, every step is a factor of two.
        let idx = *self as u32;
        match idx >= 8 {
            true => Duration::from(1 << (idx - 8)),
            false => Duration::from(1) / (1 << (8 - idx)),
        }
    }

    /// Note type with exactly given nominal length.
    ///
    /// # Example
    /// ```
    /// # use score_rhythm::primitives::{Duration, NoteType};
    /// let q = Duration::new(1, 2).unwrap();
    /// assert_eq!(NoteType::from_quarter_duration(q), Some(NoteType::Eighth));
    /// let q = Duration::new(3, 2).unwrap();
    /// assert_eq!(NoteType::from_quarter_duration(q), None);
    /// ```
    pub fn from_quarter_duration(duration: Duration) -> Option<Self> {
        let (num, den) = duration.as_ratio();
        if !is_power_of_two(num) || !is_power_of_two(den) {
            return None;
        }
        Self::ALL
            .iter()
            .find(|tp| tp.quarter_duration() == duration)
            .copied()
    }

    /// Printed length of the note with given amount of dots.
    pub fn dotted_duration(&self, dots: u8) -> Duration {
        let base = self.quarter_duration();
        let dots = dots as u32;
        // base * (2^(n+1) - 1) / 2^n
        base * ((1 << (dots + 1)) - 1) / (1 << dots)
    }

    /// Amount of beams (flags) note of this type has.
    pub fn number_of_beams(&self) -> u8 {
        match self {
            Self::Eighth => 1,
            Self::N16th => 2,
            Self::N32nd => 3,
            Self::N64th => 4,
            Self::N128th => 5,
            Self::N256th => 6,
            Self::N512th => 7,
            Self::N1024th => 8,
            _ => 0,
        }
    }

    /// MusicXML `type` element value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N1024th => "1024th",
            Self::N512th => "512th",
            Self::N256th => "256th",
            Self::N128th => "128th",
            Self::N64th => "64th",
            Self::N32nd => "32nd",
            Self::N16th => "16th",
            Self::Eighth => "eighth",
            Self::Quarter => "quarter",
            Self::Half => "half",
            Self::Whole => "whole",
            Self::Breve => "breve",
            Self::Long => "long",
            Self::Maxima => "maxima",
        }
    }
}
impl Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
impl FromStr for NoteType {
    type Err = RhythmicError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|tp| tp.as_str() == s)
            .copied()
            .ok_or(RhythmicError::InvalidTable(format!(
                "unknown note type: {s}"
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::NoteType;
    use crate::primitives::Duration;

    #[test]
    fn quarter_durations() {
        assert_eq!(NoteType::Quarter.quarter_duration(), Duration::from(1));
        assert_eq!(NoteType::Maxima.quarter_duration(), Duration::from(32));
        assert_eq!(
            NoteType::N1024th.quarter_duration(),
            Duration::new(1, 256).unwrap()
        );
        for tp in NoteType::ALL {
            assert_eq!(
                NoteType::from_quarter_duration(tp.quarter_duration()),
                Some(tp)
            );
            assert_eq!(tp.as_str().parse::<NoteType>().unwrap(), tp);
        }
    }

    #[test]
    fn dots_and_beams() {
        assert_eq!(
            NoteType::Quarter.dotted_duration(1),
            Duration::new(3, 2).unwrap()
        );
        assert_eq!(
            NoteType::Eighth.dotted_duration(2),
            Duration::new(7, 8).unwrap()
        );
        assert_eq!(NoteType::Quarter.number_of_beams(), 0);
        assert_eq!(NoteType::N16th.number_of_beams(), 2);
        assert_eq!(NoteType::N1024th.number_of_beams(), 8);
    }
}
