use thiserror;

use crate::primitives::Duration;

/// Everything that can go wrong while building or finalizing beats.
///
/// Errors are never recovered inside the engine: wrong rhythmic output is
/// worse than no output, so every variant reaches the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RhythmicError {
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error(
        "Duration {0} can not be written as a note type with dots, \
        and no split rule applies"
    )]
    Unwritable(Duration),
    #[error("Beat capacity must be one of 4, 2, 1 or 1/2 quarters, got {0}")]
    BeatWrongDuration(String),
    #[error("Beat is not full: filled {filled} of {capacity}")]
    BeatNotFull { filled: Duration, capacity: Duration },
    #[error("Beat is full, can not push any more items")]
    BeatIsFull,
    #[error("Item {index} has no note type, can not beam")]
    ChordTypeNotSet { index: usize },
    #[error("Note type is already set to {0}")]
    TypeAlreadySet(String),
    #[error(
        "Some items of the group have manually set tuplets, but not all: \
        {manual} of {total}"
    )]
    UpdateChordTuplets { manual: usize, total: usize },
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("Durations summing to {0} do not form a legal beat grouping")]
    InvalidGrouping(Duration),
    #[error("Beat is already finalized")]
    AlreadyFinalized,
    #[error("Invalid table entry: {0}")]
    InvalidTable(String),
    #[error("Measure {measure}, beat {beat}: {source}")]
    InBeat {
        measure: u32,
        beat: usize,
        #[source]
        source: Box<RhythmicError>,
    },
}
pub type RhythmicResult<T> = Result<T, RhythmicError>;

impl RhythmicError {
    /// Wrap error with position of the beat in the voice.
    pub fn in_beat(self, measure: u32, beat: usize) -> Self {
        Self::InBeat {
            measure,
            beat,
            source: Box::new(self),
        }
    }

    /// Unwraps [RhythmicError::InBeat] layers.
    pub fn root(&self) -> &Self {
        match self {
            Self::InBeat { source, .. } => source.root(),
            other => other,
        }
    }
}
