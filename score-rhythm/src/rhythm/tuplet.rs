use log::debug;

use super::{DurationWriter, RhythmicConfig, SubdivisionResolver};
use crate::{
    error::{RhythmicError, RhythmicResult},
    primitives::{Duration, RhythmicItem, TupletBracket},
};

/// Assigns tuplet ratios and brackets to items of a beat.
#[derive(Debug, Clone, Copy)]
pub struct TupletAssigner<'a> {
    writer: DurationWriter<'a>,
}
impl<'a> TupletAssigner<'a> {
    pub fn new(config: &'a RhythmicConfig) -> Self {
        Self {
            writer: DurationWriter::new(config),
        }
    }

    /// Every sounding item of the tuplet group gets the same ratio, the
    /// first one is bracket start, the last one is bracket stop.
    ///
    /// If items of a quarter beat can not be put on a single grid, they
    /// are processed as two independent halves.
    ///
    /// Items with manually set tuplets are left untouched, if every item
    /// has one.
    pub fn assign(
        &self,
        items: &mut [RhythmicItem],
        beat_total: Duration,
    ) -> RhythmicResult<()> {
        let total = items.iter().filter(|i| !i.duration().is_zero()).count();
        let manual = items
            .iter()
            .filter(|i| !i.duration().is_zero() && i.tuplet().is_some())
            .count();
        match manual {
            0 => (),
            x if x == total => return Ok(()),
            _ => {
                return Err(RhythmicError::UpdateChordTuplets { manual, total })
            }
        }
        match SubdivisionResolver::resolve(items)? {
            Some(subdivision) => self.assign_subdivision(items, subdivision, beat_total),
            None if total == 0 => Ok(()),
            None if beat_total == Duration::from(1) => {
                let idx = SubdivisionResolver::half_split_index(items)?;
                debug!("assigning tuplets by halves, split at {idx}");
                let (first, second) = items.split_at_mut(idx);
                let half = Duration::from(1) / 2;
                self.assign(first, half)?;
                self.assign(second, half)
            }
            None => Err(RhythmicError::NotImplemented(format!(
                "no single subdivision for beat of {beat_total}"
            ))),
        }
    }

    fn assign_subdivision(
        &self,
        items: &mut [RhythmicItem],
        subdivision: u32,
        beat_total: Duration,
    ) -> RhythmicResult<()> {
        if [1, 2, 4, 8, 16, 32].contains(&subdivision) {
            return Ok(());
        }
        if subdivision > 16 {
            return Err(RhythmicError::NotImplemented(format!(
                "tuplet of subdivision {subdivision}"
            )));
        }
        let ratio = match self.writer.get_tuplet_ratio(subdivision, beat_total)? {
            None => return Ok(()),
            Some(ratio) => ratio,
        };
        debug!(
            "tuplet {}:{} of {} in beat of {}",
            ratio.actual_notes, ratio.normal_notes, ratio.normal_type, beat_total
        );
        let sounding: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.duration().is_zero())
            .map(|(idx, _)| idx)
            .collect();
        let last = sounding.len().saturating_sub(1);
        for (n, idx) in sounding.into_iter().enumerate() {
            let bracket = match n {
                0 => Some(TupletBracket::Start),
                x if x == last => Some(TupletBracket::Stop),
                _ => None,
            };
            items[idx].set_tuplet(Some(ratio.with_bracket(bracket)));
        }
        Ok(())
    }
}
