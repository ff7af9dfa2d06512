use itertools::Itertools;

use crate::{
    error::{RhythmicError, RhythmicResult},
    primitives::{
        fraction_tools::lcm,
        Duration, RhythmicItem,
    },
};

fn q(numerator: u64, denominator: u64) -> Duration {
    Duration::from(numerator) / denominator
}

/// Finds the single grid, which explains durations of a group of items.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubdivisionResolver;
impl SubdivisionResolver {
    /// Integer count of equal slots, items durations are placed on.
    ///
    /// Zero-length items are ignored.
    ///
    /// # Returns
    /// - Ok(Some(subdivision))
    /// - Ok(None), if group is empty, or no single grid explains it
    ///   (e.g. triplet half and sixteenths half of a beat).
    /// - Err(InvalidGrouping), if durations do not sum to a legal beat.
    /// - Err(NotImplemented) for unsupported dotted groupings.
    ///
    /// # Example
    /// ```
    /// # use score_rhythm::{primitives::{Duration, RhythmicItem}, rhythm::SubdivisionResolver};
    /// let third = RhythmicItem::rest(Duration::new(1, 3).unwrap()).unwrap();
    /// let items = vec![third.clone(), third.clone(), third];
    /// assert_eq!(SubdivisionResolver::resolve(&items).unwrap(), Some(3));
    /// ```
    pub fn resolve(items: &[RhythmicItem]) -> RhythmicResult<Option<u32>> {
        let durations: Vec<Duration> = items
            .iter()
            .map(|item| *item.duration())
            .filter(|d| !d.is_zero())
            .collect();
        match durations.len() {
            0 => return Ok(None),
            1 => return to_subdivision(durations[0].denom()).map(Some),
            _ => (),
        }
        let sum: Duration = durations.iter().sum();
        let raw_lcm = durations.iter().fold(1, |acc, d| lcm(acc, d.denom()));
        if [q(3, 2), q(3, 4), q(3, 1), q(6, 1)].contains(&sum) {
            return match [1, 2, 4, 8, 16].contains(&raw_lcm) {
                true => to_subdivision(raw_lcm).map(Some),
                false => Err(RhythmicError::NotImplemented(format!(
                    "dotted grouping of {sum} with subdivision {raw_lcm}"
                ))),
            };
        }
        if ![q(1, 4), q(1, 2), q(1, 1), q(2, 1), q(4, 1), q(8, 1)].contains(&sum) {
            return Err(RhythmicError::InvalidGrouping(sum));
        }
        let denominators: Vec<u64> = durations
            .iter()
            .map(|d| d.checked_div(sum).map(|n| n.denom()))
            .collect::<RhythmicResult<_>>()?;
        let distinct: Vec<u64> = denominators.iter().copied().unique().collect();
        if distinct.len() == 1 {
            return to_subdivision(distinct[0]).map(Some);
        }
        let common = denominators.iter().fold(1, |acc, d| lcm(acc, *d));
        if !distinct.contains(&common) && common > 16 {
            return Ok(None);
        }
        to_subdivision(common).map(Some)
    }

    /// Index, at which items are split into two halves of 1/2 quarter.
    ///
    /// Zero-length items at the border belong to the second half.
    pub fn half_split_index(items: &[RhythmicItem]) -> RhythmicResult<usize> {
        let half = q(1, 2);
        let mut position = Duration::zero();
        for (idx, item) in items.iter().enumerate() {
            if position == half {
                return Ok(idx);
            }
            position += *item.duration();
            if position > half {
                break;
            }
        }
        Err(RhythmicError::NotImplemented(
            "beat cannot be halved".to_string(),
        ))
    }
}

fn to_subdivision(value: u64) -> RhythmicResult<u32> {
    u32::try_from(value).map_err(|_| {
        RhythmicError::NotImplemented(format!("subdivision {value}"))
    })
}
