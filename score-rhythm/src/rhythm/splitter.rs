use log::debug;

use super::{DurationWriter, RhythmicConfig};
use crate::{error::RhythmicResult, primitives::Duration};

/// Decomposes durations, that can not be written as a single note, into
/// writable fragments, which are to be tied.
#[derive(Debug, Clone, Copy)]
pub struct UnwritableSplitter<'a> {
    config: &'a RhythmicConfig,
    writer: DurationWriter<'a>,
}
impl<'a> UnwritableSplitter<'a> {
    pub fn new(config: &'a RhythmicConfig) -> Self {
        Self {
            config,
            writer: DurationWriter::new(config),
        }
    }

    /// Split duration, placed at `offset` from the beat start.
    ///
    /// Duration context (subdivision and beat total) is used for
    /// writability check and exception lookup, and is copied to the
    /// fragments.
    ///
    /// # Returns
    /// - None, if duration is writable, or no rule applies.
    /// - Some(Vec<Duration>): fragments, summing to the duration.
    ///
    /// # Example
    /// ```
    /// # use score_rhythm::{primitives::Duration, rhythm::{RhythmicConfig, UnwritableSplitter}};
    /// let splitter = UnwritableSplitter::new(RhythmicConfig::builtin());
    /// let five_sixths = Duration::new(5, 6).unwrap();
    /// assert_eq!(
    ///     splitter.split(five_sixths, Duration::zero()).unwrap(),
    ///     Some(vec![Duration::new(1, 2).unwrap(), Duration::new(1, 3).unwrap()])
    /// );
    /// assert_eq!(splitter.split(Duration::new(1, 2).unwrap(), Duration::zero()).unwrap(), None);
    /// ```
    pub fn split(
        &self,
        duration: Duration,
        offset: Duration,
    ) -> RhythmicResult<Option<Vec<Duration>>> {
        if duration.is_zero() || self.writer.is_writable(&duration)? {
            return Ok(None);
        }
        let fragments = self.lookup(duration, offset)?;
        if let Some(fragments) = &fragments {
            debug!(
                "split {} at offset {}: {}",
                duration,
                offset,
                fragments
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(" + ")
            );
        }
        Ok(fragments.map(|fragments| {
            fragments
                .into_iter()
                .map(|d| d.with_context(duration.subdivision(), duration.beat_total()))
                .collect()
        }))
    }

    fn lookup(
        &self,
        duration: Duration,
        offset: Duration,
    ) -> RhythmicResult<Option<Vec<Duration>>> {
        if let Some(split) = self.config.position_split(offset, duration) {
            return Ok(Some(split.clone()));
        }
        let (num, den) = duration.as_ratio();
        if let Some(split) = self.config.numerator_split(num) {
            return Ok(Some(
                split.iter().map(|n| Duration::from(*n) / den).collect(),
            ));
        }
        let beat_total = duration.beat_total();
        let subdivision = match duration.subdivision() {
            Some(sub) => sub,
            None => DurationWriter::default_subdivision(duration, beat_total)?,
        };
        Ok(self
            .config
            .split_exception(beat_total, subdivision, duration)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::UnwritableSplitter;
    use crate::{primitives::Duration, rhythm::RhythmicConfig};

    fn dur(num: u64, den: u64) -> Duration {
        Duration::new(num, den).unwrap()
    }

    #[test]
    fn position_table() {
        let splitter = UnwritableSplitter::new(RhythmicConfig::builtin());
        assert_eq!(
            splitter.split(dur(5, 6), dur(1, 6)).unwrap(),
            Some(vec![dur(1, 3), dur(1, 2)])
        );
        assert_eq!(
            splitter.split(dur(5, 8), dur(3, 8)).unwrap(),
            Some(vec![dur(1, 8), dur(1, 2)])
        );
    }

    #[test]
    fn numerator_table() {
        let splitter = UnwritableSplitter::new(RhythmicConfig::builtin());
        // not in position table at this offset
        assert_eq!(
            splitter.split(dur(5, 6), dur(1, 12)).unwrap(),
            Some(vec![dur(2, 3), dur(1, 6)])
        );
        assert_eq!(
            splitter.split(dur(11, 16), Duration::zero()).unwrap(),
            Some(vec![dur(1, 2), dur(3, 16)])
        );
        let split = splitter.split(dur(13, 16), Duration::zero()).unwrap().unwrap();
        assert_eq!(split.iter().sum::<Duration>(), dur(13, 16));
    }

    #[test]
    fn exception_table() {
        let splitter = UnwritableSplitter::new(RhythmicConfig::builtin());
        let duration = dur(15, 16).with_context(Some(16), Duration::from(1));
        let split = splitter.split(duration, Duration::zero()).unwrap().unwrap();
        assert_eq!(split, vec![dur(3, 4), dur(3, 16)]);
        assert_eq!(split[0].subdivision(), Some(16));
    }

    #[test]
    fn custom_rules() {
        let mut config = RhythmicConfig::default();
        config
            .set_position_split(Duration::zero(), dur(5, 6), vec![dur(1, 3), dur(1, 2)])
            .unwrap();
        let splitter = UnwritableSplitter::new(&config);
        assert_eq!(
            splitter.split(dur(5, 6), Duration::zero()).unwrap(),
            Some(vec![dur(1, 3), dur(1, 2)])
        );
    }

    #[test]
    fn no_rule() {
        let splitter = UnwritableSplitter::new(RhythmicConfig::builtin());
        assert_eq!(splitter.split(dur(23, 24), Duration::zero()).unwrap(), None);
    }
}
