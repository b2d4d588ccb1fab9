use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::Speed;

/// A span of simulated time, always stored in seconds.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Duration(f64);

impl Duration {
    pub const ZERO: Duration = Duration(0.0);

    pub const fn seconds(value: f64) -> Duration {
        assert!(!value.is_nan(), "Duration::seconds(NaN)");
        Duration(value)
    }

    pub fn inner_seconds(self) -> f64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    pub fn min(self, other: Duration) -> Duration {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}
impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, other: Duration) -> Duration {
        Duration(self.0 + other.0)
    }
}
impl AddAssign for Duration {
    fn add_assign(&mut self, other: Duration) {
        self.0 += other.0;
    }
}
impl Sub for Duration {
    type Output = Duration;
    fn sub(self, other: Duration) -> Duration {
        Duration(self.0 - other.0)
    }
}
impl std::ops::Mul<f64> for Duration {
    type Output = Duration;
    fn mul(self, scalar: f64) -> Duration {
        Duration(self.0 * scalar)
    }
}
impl std::ops::Mul<Speed> for Duration {
    type Output = crate::Distance;
    fn mul(self, speed: Speed) -> crate::Distance {
        crate::Distance::km(speed.inner_kmh() * self.0 / 3600.0)
    }
}
