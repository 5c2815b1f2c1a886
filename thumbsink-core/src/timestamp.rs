//! Timestamps with explicit time bases.
//!
//! Frame pacing decisions in the pipeline are made from presentation
//! timestamps, so timestamps carry their unit with them instead of assuming
//! a global clock rate.

use crate::rational::Rational;
use std::cmp::Ordering;
use std::fmt;

/// Unit for interpreting raw timestamp values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBase(pub Rational);

impl TimeBase {
    /// Nanosecond time base (1/1000000000).
    pub const NANOSECONDS: Self = Self(Rational { num: 1, den: 1_000_000_000 });

    /// Millisecond time base (1/1000).
    pub const MILLISECONDS: Self = Self(Rational { num: 1, den: 1000 });

    /// Second time base (1/1).
    pub const SECONDS: Self = Self(Rational { num: 1, den: 1 });

    /// Create a time base from numerator and denominator.
    pub fn new(num: i64, den: i64) -> Self {
        Self(Rational::new(num, den))
    }

    /// Convert a value in this time base to another.
    pub fn convert(&self, value: i64, target: TimeBase) -> i64 {
        self.0.rescale(value, target.0)
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::NANOSECONDS
    }
}

impl From<Rational> for TimeBase {
    fn from(r: Rational) -> Self {
        Self(r)
    }
}

/// A timestamp value paired with its time base.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    /// Raw value in `time_base` units.
    pub value: i64,
    /// Unit of `value`.
    pub time_base: TimeBase,
}

impl Timestamp {
    /// Sentinel for an undefined timestamp.
    pub const NONE: i64 = i64::MIN;

    /// Create a new timestamp.
    pub fn new(value: i64, time_base: TimeBase) -> Self {
        Self { value, time_base }
    }

    /// Create an undefined timestamp.
    pub fn none() -> Self {
        Self {
            value: Self::NONE,
            time_base: TimeBase::default(),
        }
    }

    /// Create a timestamp from nanoseconds.
    pub fn from_nanos(nanos: i64) -> Self {
        Self {
            value: nanos,
            time_base: TimeBase::NANOSECONDS,
        }
    }

    /// Whether the timestamp is defined.
    pub fn is_valid(&self) -> bool {
        self.value != Self::NONE
    }

    /// Re-express in another time base.
    pub fn rescale(&self, target: TimeBase) -> Self {
        if !self.is_valid() {
            return Self::none();
        }
        Self {
            value: self.time_base.convert(self.value, target),
            time_base: target,
        }
    }

    /// Value in nanoseconds, if defined.
    pub fn to_nanos(&self) -> Option<i64> {
        if self.is_valid() {
            Some(self.time_base.convert(self.value, TimeBase::NANOSECONDS))
        } else {
            None
        }
    }

    /// Nanoseconds elapsed since `earlier`.
    ///
    /// Returns `None` if either timestamp is undefined. Negative when this
    /// timestamp precedes `earlier`.
    pub fn elapsed_since(&self, earlier: Timestamp) -> Option<i64> {
        Some(self.to_nanos()? - earlier.to_nanos()?)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::none()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_nanos(), other.to_nanos()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.to_nanos(), other.to_nanos()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_nanos() {
            Some(nanos) => {
                let secs = nanos as f64 / 1e9;
                let hours = (secs / 3600.0) as u32;
                let mins = ((secs % 3600.0) / 60.0) as u32;
                let secs = secs % 60.0;
                write!(f, "{:02}:{:02}:{:06.3}", hours, mins, secs)
            }
            None => write!(f, "NONE"),
        }
    }
}
