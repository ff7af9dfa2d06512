//! Elements, from which a voice is constructed.
//!
//! At first, [Voice](crate::dom::Voice) is created from time signatures,
//! which gives the arena of empty beats. Then it is filled by
//! [RhythmicItem]s, which are distributed over beats, and split by ties at
//! beat borders. Then every beat is finalized by the
//! [rhythm](crate::rhythm) engine, and the voice can be rendered to MusicXML.

pub mod beat;
pub mod duration;
pub mod fraction_tools;
pub mod item;
pub mod measure;
pub mod note_type;
pub mod pitch;

pub use beat::Beat;
pub use duration::Duration;
pub use fraction_tools::{frac, limit_denominator};
pub use item::{BeamValue, ItemKind, RhythmicItem, TupletBracket, TupletRatio};
pub use measure::{Measure, TimeSignature};
pub use note_type::NoteType;
pub use pitch::{Pitch, Step};

/// Maximal denominator of every [Duration].
pub static LIMIT_DENOMINATOR: u64 = 1000;
