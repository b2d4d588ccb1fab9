use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

use crate::{Distance, Duration};

/// A velocity, always stored in km/h.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Speed(f64);

impl Speed {
    pub const ZERO: Speed = Speed(0.0);

    pub fn km_per_hour(value: f64) -> Speed {
        assert!(!value.is_nan(), "Speed::km_per_hour(NaN)");
        Speed(value)
    }

    pub fn inner_kmh(self) -> f64 {
        self.0
    }

    /// The distance covered after travelling at this constant speed for `dt`.
    pub fn dist_travelled(self, dt: Duration) -> Distance {
        Distance::km(self.0 * dt.inner_seconds() / 3600.0)
    }

    /// The time needed to close a given `dist` gap at this constant (positive) relative speed.
    /// `None` if this speed would never close the gap.
    pub fn time_to_cover(self, dist: Distance) -> Option<Duration> {
        if self.0 <= 0.0 {
            return None;
        }
        Some(Duration::seconds(dist.inner_km() / self.0 * 3600.0))
    }

    pub fn min(self, other: Speed) -> Speed {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Speed) -> Speed {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.3}km/h", self.0)
    }
}
impl fmt::Debug for Speed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Sub for Speed {
    type Output = Speed;
    fn sub(self, other: Speed) -> Speed {
        Speed(self.0 - other.0)
    }
}
