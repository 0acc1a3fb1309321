use cu_viz_payloads::RosTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};
use std::time::Duration;

/// Transform times are unsigned nanoseconds, either since an epoch (for stamps)
/// or relative (for durations like a staleness bound).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TfDuration(pub u64);

/// A point in time is a duration since the stamp epoch.
pub type TfTime = TfDuration;

/// Inclusive span of time covered by a transform history.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfTimeRange {
    pub start: TfTime,
    pub end: TfTime,
}

impl TfDuration {
    pub const MIN: TfDuration = TfDuration(0u64);
    pub const MAX: TfDuration = TfDuration(u64::MAX);

    pub fn as_nanos(&self) -> u64 {
        let Self(nanos) = self;
        *nanos
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        TfDuration((secs.max(0.0) * 1e9) as u64)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1e9
    }

    /// Distance between two instants regardless of their order.
    pub fn abs_diff(self, other: TfDuration) -> TfDuration {
        TfDuration(self.0.abs_diff(other.0))
    }
}

impl From<u64> for TfDuration {
    fn from(nanos: u64) -> Self {
        TfDuration(nanos)
    }
}

impl From<TfDuration> for u64 {
    fn from(val: TfDuration) -> Self {
        val.0
    }
}

impl From<Duration> for TfDuration {
    fn from(duration: Duration) -> Self {
        TfDuration(duration.as_nanos() as u64)
    }
}

impl From<TfDuration> for Duration {
    fn from(val: TfDuration) -> Self {
        Duration::from_nanos(val.0)
    }
}

impl From<RosTime> for TfDuration {
    fn from(stamp: RosTime) -> Self {
        TfDuration(stamp.as_nanos())
    }
}

impl Add for TfDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        TfDuration(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TfDuration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        TfDuration(self.0.saturating_sub(rhs.0))
    }
}

impl Display for TfDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Self(nanos) = *self;
        if nanos >= 1_000_000_000 {
            write!(f, "{:.3} s", nanos as f64 / 1_000_000_000.0)
        } else if nanos >= 1_000_000 {
            write!(f, "{:.3} ms", nanos as f64 / 1_000_000.0)
        } else if nanos >= 1_000 {
            write!(f, "{:.3} µs", nanos as f64 / 1_000.0)
        } else {
            write!(f, "{nanos} ns")
        }
    }
}
