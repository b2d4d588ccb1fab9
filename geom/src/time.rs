use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::Duration;

/// A simulated instant, seconds elapsed since the start of the run.
///
/// Unlike [`Duration`], `Time` carries a total order so it can key the event kernel's
/// `BinaryHeap`-based priority queue directly.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Time(f64);

impl Time {
    pub const START_OF_SIMULATION: Time = Time(0.0);

    pub fn seconds(value: f64) -> Time {
        assert!(!value.is_nan(), "Time::seconds(NaN)");
        Time(value)
    }

    pub fn inner_seconds(self) -> f64 {
        self.0
    }
}

impl Eq for Time {}
impl Ord for Time {
    fn cmp(&self, other: &Time) -> std::cmp::Ordering {
        self.0
            .partial_cmp(&other.0)
            .expect("Time should never be NaN")
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t={:.3}s", self.0)
    }
}
impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Add<Duration> for Time {
    type Output = Time;
    fn add(self, dt: Duration) -> Time {
        Time(self.0 + dt.inner_seconds())
    }
}
impl Sub for Time {
    type Output = Duration;
    fn sub(self, other: Time) -> Duration {
        Duration::seconds(self.0 - other.0)
    }
}
impl Sub<Duration> for Time {
    type Output = Time;
    fn sub(self, dt: Duration) -> Time {
        Time(self.0 - dt.inner_seconds())
    }
}
