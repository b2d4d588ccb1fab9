use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A length, always stored in kilometers.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Distance(f64);

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub const fn km(value: f64) -> Distance {
        assert!(!value.is_nan(), "Distance::km(NaN)");
        Distance(value)
    }

    pub fn meters(value: f64) -> Distance {
        Distance::km(value / 1000.0)
    }

    pub fn inner_km(self) -> f64 {
        self.0
    }

    pub fn inner_meters(self) -> f64 {
        self.0 * 1000.0
    }

    pub fn abs(self) -> Distance {
        Distance(self.0.abs())
    }

    pub fn max(self, other: Distance) -> Distance {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    pub fn min(self, other: Distance) -> Distance {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.6}km", self.0)
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Add for Distance {
    type Output = Distance;
    fn add(self, other: Distance) -> Distance {
        Distance(self.0 + other.0)
    }
}
impl AddAssign for Distance {
    fn add_assign(&mut self, other: Distance) {
        self.0 += other.0;
    }
}
impl Sub for Distance {
    type Output = Distance;
    fn sub(self, other: Distance) -> Distance {
        Distance(self.0 - other.0)
    }
}
impl SubAssign for Distance {
    fn sub_assign(&mut self, other: Distance) {
        self.0 -= other.0;
    }
}
impl std::ops::Mul<f64> for Distance {
    type Output = Distance;
    fn mul(self, scalar: f64) -> Distance {
        Distance(self.0 * scalar)
    }
}
impl std::ops::Div<Distance> for Distance {
    type Output = f64;
    fn div(self, other: Distance) -> f64 {
        self.0 / other.0
    }
}
impl std::iter::Sum for Distance {
    fn sum<I: Iterator<Item = Distance>>(iter: I) -> Distance {
        iter.fold(Distance::ZERO, |a, b| a + b)
    }
}
