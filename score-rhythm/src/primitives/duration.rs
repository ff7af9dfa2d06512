use std::{
    cmp::Ordering,
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub},
};

use derivative::Derivative;
use fraction::Fraction;

use super::{
    fraction_tools::{frac, ratio},
    limit_denominator, LIMIT_DENOMINATOR,
};
use crate::error::{RhythmicError, RhythmicResult};

/// Exact duration in quarter notes.
///
/// Value is always non-negative and its denominator never exceeds
/// [LIMIT_DENOMINATOR]. Besides the value, duration is annotated with the
/// rhythmic context of the beat, it is placed in: the beat subdivision and
/// the beat total length. The context is used only for deriving note type
/// and dots, and does not take part in comparison or hashing.
///
/// # Example
/// ```
/// # use score_rhythm::primitives::Duration;
/// let third = Duration::new(1, 3).unwrap();
/// let mut in_beat = third;
/// in_beat.set_subdivision(Some(3));
/// assert_eq!(third, in_beat);
/// assert_eq!(third + third + third, Duration::from(1));
/// assert_eq!(Duration::try_from(0.25).unwrap(), Duration::new(1, 4).unwrap());
/// assert!(Duration::try_from(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, Derivative)]
#[derivative(PartialEq, Eq, Hash)]
pub struct Duration {
    value: Fraction,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    subdivision: Option<u32>,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    beat_total: Fraction,
}
impl Duration {
    pub fn new(numerator: u64, denominator: u64) -> RhythmicResult<Self> {
        if denominator == 0 {
            return Err(RhythmicError::InvalidDuration(format!(
                "denominator of {numerator}/{denominator} is zero"
            )));
        }
        Ok(Self::from_value(frac(numerator, denominator)))
    }
    pub fn zero() -> Self {
        Self::from_value(frac(0, 1))
    }

    /// Builds duration from already checked non-negative fraction.
    fn from_value(value: Fraction) -> Self {
        let value = match ratio(&value).0 {
            0 => frac(0, 1),
            _ => limit_denominator(value, LIMIT_DENOMINATOR),
        };
        Self {
            value,
            subdivision: None,
            beat_total: frac(1, 1),
        }
    }

    pub fn value(&self) -> Fraction {
        self.value
    }
    /// (numerator, denominator) in lowest terms.
    pub fn as_ratio(&self) -> (u64, u64) {
        ratio(&self.value)
    }
    pub fn numer(&self) -> u64 {
        self.as_ratio().0
    }
    pub fn denom(&self) -> u64 {
        self.as_ratio().1
    }
    pub fn is_zero(&self) -> bool {
        self.numer() == 0
    }

    pub fn subdivision(&self) -> Option<u32> {
        self.subdivision
    }
    pub fn set_subdivision(&mut self, subdivision: Option<u32>) -> &mut Self {
        self.subdivision = subdivision;
        self
    }
    /// Total length of the enclosing beat. 1 by default.
    pub fn beat_total(&self) -> Duration {
        Self::from_value(self.beat_total)
    }
    pub fn set_beat_total(&mut self, beat_total: Duration) -> &mut Self {
        self.beat_total = beat_total.value;
        self
    }
    /// The same value with the given context.
    pub fn with_context(
        mut self,
        subdivision: Option<u32>,
        beat_total: Duration,
    ) -> Self {
        self.set_subdivision(subdivision).set_beat_total(beat_total);
        self
    }
    /// The same value with default context.
    pub fn without_context(&self) -> Self {
        Self::from_value(self.value)
    }

    pub fn checked_sub(self, rhs: Self) -> RhythmicResult<Self> {
        if rhs.value > self.value {
            return Err(RhythmicError::InvalidDuration(format!(
                "duration can not be negative: {self} - {rhs}"
            )));
        }
        Ok(Self::from_value(self.value - rhs.value))
    }
    pub fn checked_div(self, rhs: Self) -> RhythmicResult<Self> {
        if rhs.is_zero() {
            return Err(RhythmicError::InvalidDuration(format!(
                "division of {self} by zero duration"
            )));
        }
        Ok(Self::from_value(self.value / rhs.value))
    }
}
impl Default for Duration {
    fn default() -> Self {
        Self::zero()
    }
}
impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_ratio() {
            (num, 1) => write!(f, "{num}"),
            (num, den) => write!(f, "{num}/{den}"),
        }
    }
}
impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}
impl From<u64> for Duration {
    fn from(value: u64) -> Self {
        Self::from_value(frac(value, 1))
    }
}
impl TryFrom<Fraction> for Duration {
    type Error = RhythmicError;
    fn try_from(value: Fraction) -> Result<Self, Self::Error> {
        if value.is_nan() || value.is_infinite() {
            return Err(RhythmicError::InvalidDuration(format!(
                "{value} is not a finite number"
            )));
        }
        if value.is_sign_negative() && ratio(&value).0 != 0 {
            return Err(RhythmicError::InvalidDuration(format!(
                "duration can not be negative: {value}"
            )));
        }
        Ok(Self::from_value(value))
    }
}
impl TryFrom<f64> for Duration {
    type Error = RhythmicError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(RhythmicError::InvalidDuration(format!(
                "{value} is not a finite number"
            )));
        }
        Self::try_from(Fraction::from(value))
    }
}
impl Add for Duration {
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_value(self.value + rhs.value)
    }
    type Output = Self;
}
impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
/// # Panics
///
/// If result is negative. Use [Duration::checked_sub] where it may be.
impl Sub for Duration {
    fn sub(self, rhs: Self) -> Self::Output {
        if rhs.value > self.value {
            panic!(
                "duration can not be negative. left: {}, right: {}",
                self, rhs
            );
        }
        Self::from_value(self.value - rhs.value)
    }
    type Output = Self;
}
impl Mul for Duration {
    fn mul(self, rhs: Self) -> Self::Output {
        Self::from_value(self.value * rhs.value)
    }
    type Output = Self;
}
impl Mul<u64> for Duration {
    fn mul(self, rhs: u64) -> Self::Output {
        Self::from_value(self.value * frac(rhs, 1))
    }
    type Output = Self;
}
/// # Panics
///
/// On division by zero. Use [Duration::checked_div] where it may be.
impl Div for Duration {
    fn div(self, rhs: Self) -> Self::Output {
        if rhs.is_zero() {
            panic!("division of {} by zero duration", self);
        }
        Self::from_value(self.value / rhs.value)
    }
    type Output = Self;
}
/// # Panics
///
/// On division by zero.
impl Div<u64> for Duration {
    fn div(self, rhs: u64) -> Self::Output {
        if rhs == 0 {
            panic!("division of {} by zero", self);
        }
        Self::from_value(self.value / frac(rhs, 1))
    }
    type Output = Self;
}
impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, dur| acc + dur)
    }
}
impl<'a> Sum<&'a Duration> for Duration {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, dur| acc + *dur)
    }
}
