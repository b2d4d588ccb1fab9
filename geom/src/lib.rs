//! Small geometry and unit-conversion primitives for the simulation engine.
//!
//! Every quantity that crosses a module boundary is a newtype, never a bare `f64`: distances are
//! always kilometers, durations and times are always seconds, speeds are always km/h. Converting
//! between units (e.g. meters to kilometers) happens only at construction.

mod angle;
mod distance;
mod duration;
mod polyline;
mod pt2d;
mod speed;
mod time;

pub use crate::angle::Angle;
pub use crate::distance::Distance;
pub use crate::duration::Duration;
pub use crate::polyline::PolyLine;
pub use crate::pt2d::{HashablePt2D, LonLat, Pt2D};
pub use crate::speed::Speed;
pub use crate::time::Time;

/// Radius of the Earth, in kilometers, used by the haversine formula in [`Pt2D::dist_to`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;
