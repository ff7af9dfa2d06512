//! Rhythmic engine of a music-notation builder.
//!
//! Client code fills a [Voice](dom::Voice) (or single
//! [Beat](primitives::Beat)s) with [RhythmicItem](primitives::RhythmicItem)s
//! of exact durations. Finalization derives everything else: tied splits of
//! unwritable durations, note types and dots, tuplets and beams.
//!
//! ```
//! use score_rhythm::{primitives::*, rhythm::RhythmicConfig};
//!
//! let mut beat = Beat::new(Duration::from(1)).unwrap();
//! let e = Pitch::new(Step::E, 0, 5);
//! for _ in 0..3 {
//!     let item = RhythmicItem::pitched(vec![e], Duration::new(1, 3).unwrap()).unwrap();
//!     assert!(beat.push(item).unwrap().is_none());
//! }
//! beat.finalize(RhythmicConfig::builtin()).unwrap();
//! let first = &beat.items()[0];
//! assert_eq!(first.note_type(), Some(NoteType::Eighth));
//! assert_eq!(first.tuplet().unwrap().actual_notes, 3);
//! assert_eq!(first.beams().get(&1), Some(&BeamValue::Begin));
//! ```

pub mod dom;
pub mod error;
pub mod musicxml_render;
pub mod primitives;
pub mod rhythm;

pub use error::{RhythmicError, RhythmicResult};
