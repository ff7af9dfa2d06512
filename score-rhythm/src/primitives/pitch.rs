use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}
impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::A => "A",
            Self::B => "B",
        };
        write!(f, "{s}")
    }
}

/// Already spelled pitch.
///
/// Spelling (choosing between enharmonic equivalents) is not a business of
/// this crate: pitch comes with step, alteration and octave (middle C is
/// `C4`). Only visibility of the accidental is managed here, as tied
/// continuations of a note should not repeat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    /// semitones: -2..=2
    pub alter: i8,
    pub octave: i8,
    show_accidental: bool,
}
impl Pitch {
    /// Accidental is shown, if pitch is altered.
    pub fn new(step: Step, alter: i8, octave: i8) -> Self {
        Self {
            step,
            alter,
            octave,
            show_accidental: alter != 0,
        }
    }
    pub fn show_accidental(&self) -> bool {
        self.show_accidental
    }
    pub fn set_show_accidental(&mut self, show: bool) -> &mut Self {
        self.show_accidental = show;
        self
    }
    /// MusicXML `accidental` element value.
    pub fn accidental_name(&self) -> Option<&'static str> {
        match self.alter {
            -2 => Some("flat-flat"),
            -1 => Some("flat"),
            0 => Some("natural"),
            1 => Some("sharp"),
            2 => Some("double-sharp"),
            _ => None,
        }
    }
}
impl Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let alter = match self.alter {
            x if x > 0 => "#".repeat(x as usize),
            x => "b".repeat(x.unsigned_abs() as usize),
        };
        write!(f, "{}{}{}", self.step, alter, self.octave)
    }
}
