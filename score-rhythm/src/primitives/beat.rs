use log::trace;

use super::{Duration, RhythmicItem};
use crate::{
    error::{RhythmicError, RhythmicResult},
    rhythm::{self, RhythmicConfig},
};

/// Fixed-capacity slot of rhythmic items.
///
/// Beat owns its items exclusively. Items are pushed until the beat is
/// full; an item longer than the remaining space is cut, and the tied
/// leftover is returned to be pushed into the next beat.
///
/// # Example
/// ```
/// # use score_rhythm::primitives::{Beat, Duration, Pitch, RhythmicItem, Step};
/// let mut beat = Beat::new(Duration::from(1)).unwrap();
/// let c = Pitch::new(Step::C, 0, 4);
/// let item = RhythmicItem::pitched(vec![c], Duration::new(3, 2).unwrap()).unwrap();
/// let leftover = beat.push(item).unwrap().unwrap();
/// assert!(beat.is_full());
/// assert_eq!(leftover.duration(), &Duration::new(1, 2).unwrap());
/// assert!(leftover.tied_to_previous());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Beat {
    capacity: Duration,
    items: Vec<RhythmicItem>,
    filled: Duration,
    finalized: bool,
}
impl Beat {
    /// Capacity is one of 4, 2, 1 or 1/2 quarters.
    pub fn new(capacity: Duration) -> RhythmicResult<Self> {
        let allowed = [
            Duration::from(4),
            Duration::from(2),
            Duration::from(1),
            Duration::from(1) / 2,
        ];
        if !allowed.contains(&capacity) {
            return Err(RhythmicError::BeatWrongDuration(capacity.to_string()));
        }
        Ok(Self {
            capacity: capacity.without_context(),
            items: Vec::new(),
            filled: Duration::zero(),
            finalized: false,
        })
    }

    pub fn capacity(&self) -> Duration {
        self.capacity
    }
    pub fn items(&self) -> &[RhythmicItem] {
        &self.items
    }
    pub fn filled(&self) -> Duration {
        self.filled
    }
    pub fn remaining(&self) -> Duration {
        self.capacity - self.filled
    }
    pub fn is_full(&self) -> bool {
        self.filled == self.capacity
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Items with their offsets from the beat start.
    pub fn items_with_offsets(
        &self,
    ) -> impl Iterator<Item = (Duration, &RhythmicItem)> {
        self.items.iter().scan(Duration::zero(), |offset, item| {
            let current = *offset;
            *offset += *item.duration();
            Some((current, item))
        })
    }

    /// Push item to the end of beat.
    ///
    /// # Returns
    /// - None, if item fits in the beat.
    /// - Some(RhythmicItem), if item was cut: the leftover, tied to the
    ///   part left in the beat, should be pushed to the next beat.
    pub fn push(
        &mut self,
        mut item: RhythmicItem,
    ) -> RhythmicResult<Option<RhythmicItem>> {
        if self.finalized {
            return Err(RhythmicError::AlreadyFinalized);
        }
        if self.is_full() {
            return Err(RhythmicError::BeatIsFull);
        }
        let remaining = self.remaining();
        let duration = *item.duration();
        if duration <= remaining {
            trace!("push {} to beat of {}", duration, self.capacity);
            self.filled += duration;
            self.items.push(item);
            return Ok(None);
        }
        let leftover = item.cut_head(duration.checked_sub(remaining)?)?;
        trace!(
            "push {} to beat of {}, leftover: {}",
            remaining,
            self.capacity,
            leftover.duration()
        );
        self.filled = self.capacity;
        self.items.push(item);
        Ok(Some(leftover))
    }

    /// Fill the remaining space with a single rest.
    pub fn pad_with_rest(&mut self) -> RhythmicResult<()> {
        if self.is_full() {
            return Ok(());
        }
        let rest = RhythmicItem::rest(self.remaining())?;
        match self.push(rest)? {
            None => Ok(()),
            Some(_) => Err(RhythmicError::InvalidDuration(
                "padding rest exceeds beat".to_string(),
            )),
        }
    }

    /// Derive notation of all items: splits, note types, dots, tuplets
    /// and beams.
    ///
    /// Beat must be full, and can be finalized only once. On error beat is
    /// left untouched.
    pub fn finalize(&mut self, config: &RhythmicConfig) -> RhythmicResult<()> {
        if self.finalized {
            return Err(RhythmicError::AlreadyFinalized);
        }
        if !self.is_full() {
            return Err(RhythmicError::BeatNotFull {
                filled: self.filled,
                capacity: self.capacity,
            });
        }
        let mut items = self.items.clone();
        rhythm::finalize_items(&mut items, self.capacity, config)?;
        self.items = items;
        self.finalized = true;
        Ok(())
    }
}
