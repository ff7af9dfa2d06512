//! Rhythmic engine.
//!
//! Derives notation of a full beat. Finalization goes strictly in order:
//!
//! 1. subdivision of the beat (or of its halves, for quarter beat, which
//!    does not fit single grid);
//! 2. splitting of unwritable items at their offsets;
//! 3. note types and dots;
//! 4. tuplets;
//! 5. beams.

pub mod beam;
pub mod config;
pub mod splitter;
pub mod subdivision;
pub mod tuplet;
pub mod writer;

use itertools::Itertools;
use log::{debug, trace};

pub use beam::BeamGrouper;
pub use config::RhythmicConfig;
pub use splitter::UnwritableSplitter;
pub use subdivision::SubdivisionResolver;
pub use tuplet::TupletAssigner;
pub use writer::{grid_total, is_dotted, DurationWriter};

use crate::{
    error::{RhythmicError, RhythmicResult},
    primitives::{Duration, RhythmicItem},
};

/// Subdivision of the whole beat or of its two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grid {
    Whole(Option<u32>),
    Halves(Option<u32>, Option<u32>),
}

/// Finalize items of a full beat in place.
pub(crate) fn finalize_items(
    items: &mut Vec<RhythmicItem>,
    beat_total: Duration,
    config: &RhythmicConfig,
) -> RhythmicResult<()> {
    debug!(
        "finalize beat of {}: [{}]",
        beat_total,
        items.iter().map(|i| i.duration().to_string()).join(", ")
    );
    let grid = resolve_grid(items, beat_total)?;
    trace!("grid: {:?}", grid);
    annotate(items, grid, beat_total)?;
    split_unwritable(items, config)?;
    write_types(items, config)?;
    TupletAssigner::new(config).assign(items, beat_total)?;
    match grid {
        Grid::Halves(..) => {
            let idx = SubdivisionResolver::half_split_index(items)?;
            BeamGrouper::beam_halves(items, idx)
        }
        Grid::Whole(Some(8)) if beat_total == Duration::from(1) => {
            match SubdivisionResolver::half_split_index(items) {
                Ok(idx) => BeamGrouper::beam_halves(items, idx),
                Err(_) => BeamGrouper::beam(items),
            }
        }
        Grid::Whole(_) => BeamGrouper::beam(items),
    }
}

fn resolve_grid(items: &[RhythmicItem], beat_total: Duration) -> RhythmicResult<Grid> {
    if let Some(subdivision) = SubdivisionResolver::resolve(items)? {
        return Ok(Grid::Whole(Some(subdivision)));
    }
    if items.iter().all(|i| i.duration().is_zero()) {
        return Ok(Grid::Whole(None));
    }
    if beat_total != Duration::from(1) {
        return Err(RhythmicError::NotImplemented(format!(
            "no single subdivision for beat of {beat_total}"
        )));
    }
    let idx = SubdivisionResolver::half_split_index(items)?;
    Ok(Grid::Halves(
        SubdivisionResolver::resolve(&items[..idx])?,
        SubdivisionResolver::resolve(&items[idx..])?,
    ))
}

fn annotate(
    items: &mut [RhythmicItem],
    grid: Grid,
    beat_total: Duration,
) -> RhythmicResult<()> {
    match grid {
        Grid::Whole(subdivision) => items
            .iter_mut()
            .for_each(|i| i.set_duration_context(subdivision, beat_total)),
        Grid::Halves(first, second) => {
            let idx = SubdivisionResolver::half_split_index(items)?;
            let half = beat_total / 2;
            let (head, tail) = items.split_at_mut(idx);
            head.iter_mut()
                .for_each(|i| i.set_duration_context(first, half));
            tail.iter_mut()
                .for_each(|i| i.set_duration_context(second, half));
        }
    }
    Ok(())
}

/// Replace every unwritable item by tied fragments.
fn split_unwritable(
    items: &mut Vec<RhythmicItem>,
    config: &RhythmicConfig,
) -> RhythmicResult<()> {
    let writer = DurationWriter::new(config);
    let splitter = UnwritableSplitter::new(config);
    let mut idx = 0;
    let mut offset = Duration::zero();
    while idx < items.len() {
        let duration = *items[idx].duration();
        if duration.is_zero()
            || items[idx].note_type().is_some()
            || writer.is_writable(&duration)?
        {
            offset += duration;
            idx += 1;
            continue;
        }
        let fragments = splitter
            .split(duration, offset)?
            .ok_or(RhythmicError::Unwritable(duration))?;
        let parts = items[idx].split_into(&fragments)?;
        items.splice(idx..idx + 1, parts);
    }
    Ok(())
}

fn write_types(items: &mut [RhythmicItem], config: &RhythmicConfig) -> RhythmicResult<()> {
    let writer = DurationWriter::new(config);
    for item in items.iter_mut().filter(|i| !i.duration().is_zero()) {
        if item.note_type().is_some() {
            if item.dots().is_none() {
                item.set_dots(0);
            }
            continue;
        }
        if let (Some(tp), dots) = writer.write_duration(item.duration())? {
            trace!("{} written as {} with {} dots", item.duration(), tp, dots);
            item.set_note_type(tp)?;
            item.set_dots(dots);
        }
    }
    Ok(())
}
