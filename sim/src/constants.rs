//! Tunable constants shared across the car and crossroad behavior.

use geom::{Distance, Duration, Speed};

/// Minimum bumper-to-bumper gap between two cars.
pub const MIN_GAP: Distance = Distance::km(0.001);

/// Lookahead used for pre-acquiring a crossing lane and for right-of-way testing.
pub const CROSSROAD_BLOCKING_TIME: Duration = Duration::seconds(3.0);

/// How often a car stopped at `Waiting` polls for its next crossing lane to become available.
pub const WAIT_POLL_INTERVAL: Duration = Duration::seconds(1.0);

/// The random internal percentage of a lane a `Crossing` car first commits to driving towards,
/// before re-evaluating the crossroad approach.
pub const CROSSING_TARGET_PCT_RANGE: (f64, f64) = (0.3, 0.8);

/// Uniform speed/length ranges for freshly spawned cars.
pub const SPAWN_DESIRED_SPEED_KMH_RANGE: (f64, f64) = (20.0, 50.0);
pub const SPAWN_LENGTH_KM_RANGE: (f64, f64) = (0.0035, 0.0055);

/// Uniform placement window along a spawn lane.
pub const SPAWN_POSITION_PCT_RANGE: (f64, f64) = (0.2, 0.8);

pub const DESPAWN_SPEED: Speed = Speed::ZERO;
