//! Per-car state and the position/speed arithmetic it builds on.

use geom::{Distance, Duration, Speed, Time};
use map_model::{CrossroadID, LaneID, WayID};

use crate::constants::MIN_GAP;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CarState {
    Crossing,
    CrossingCrossroad,
    Queued,
    Waiting,
    Despawning,
}

/// Where a `Crossing` car is within its lane's three-step approach: first committed to an
/// internal random waypoint, then to the point it must pre-acquire the next Crossing Lane by,
/// then to the lane's actual end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CrossingPhase {
    ToMidpoint,
    ToBlockPoint,
    ToLaneEnd,
}

/// The car's planned future path: `next_way` is where it intends to go after finishing the
/// current lane; `next_lanes` holds the lanes that get it there -- either `[crossing_lane,
/// outgoing_lane]` when a Crossroad is in the way, or just `[outgoing_lane]` for a direct
/// continuation. `lane_to_switch` names a lane the car should merge towards before it can
/// actually take that path.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub next_way: Option<WayID>,
    pub next_lanes: Vec<LaneID>,
    pub lane_to_switch: Option<LaneID>,
}

impl Plan {
    pub fn none() -> Plan {
        Plan::default()
    }

    pub fn is_empty(&self) -> bool {
        self.next_lanes.is_empty()
    }
}

pub struct Car {
    pub id: map_model::CarID,
    /// `None` while `CrossingCrossroad` (the car is on an internal Crossing Lane, not a Way).
    pub way: Option<WayID>,
    pub crossroad: Option<CrossroadID>,
    pub lane: LaneID,
    /// Position anchor in km along `lane`, valid as of `update_time`.
    position: Distance,
    update_time: Time,
    pub speed: Speed,
    pub desired_speed: Speed,
    pub length: Distance,
    pub state: CarState,
    pub plan: Plan,
    /// Crossing Lanes currently held: at most a "next-crossroad" lock plus a
    /// "currently-traversing" lock, so this never holds more than two entries.
    pub held_crossing_lanes: Vec<LaneID>,
    pub crossing_phase: CrossingPhase,
    /// The position `crossing_phase` is driving towards, valid only while `state ==
    /// CarState::Crossing`.
    pub crossing_target: Distance,
}

impl Car {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: map_model::CarID,
        way: Option<WayID>,
        lane: LaneID,
        position: Distance,
        now: Time,
        speed: Speed,
        desired_speed: Speed,
        length: Distance,
        state: CarState,
    ) -> Car {
        Car {
            id,
            way,
            crossroad: None,
            lane,
            position,
            update_time: now,
            speed,
            desired_speed,
            length,
            state,
            plan: Plan::none(),
            held_crossing_lanes: Vec::new(),
            crossing_phase: CrossingPhase::ToMidpoint,
            crossing_target: Distance::ZERO,
        }
    }

    /// `position(t) = position_anchor + speed * (t - update_time) / 3600`.
    pub fn position_at(&self, now: Time) -> Distance {
        self.position + self.speed.dist_travelled(now - self.update_time)
    }

    pub fn position(&self) -> Distance {
        self.position
    }

    pub fn update_time(&self) -> Time {
        self.update_time
    }

    /// Re-anchors position at `now` without changing speed; used whenever the car moves to a new
    /// lane or its position is otherwise authoritatively set (e.g. spawn placement).
    pub fn set_position(&mut self, position: Distance, now: Time) {
        self.position = position;
        self.update_time = now;
    }

    /// Re-anchors position at `now`, then sets the new speed. Callers are responsible for the
    /// remaining side effects (emitting a calendar event, waking the car behind, rescheduling the
    /// release timer) since those need access to simulation-wide state this struct doesn't have.
    pub fn set_speed(&mut self, new_speed: Speed, now: Time) {
        let anchored = self.position_at(now);
        self.position = anchored;
        self.update_time = now;
        self.speed = new_speed;
    }

    /// `time_to_be_at_position(p) = (p - position) / speed * 3600`.
    pub fn time_to_be_at_position(&self, now: Time, p: Distance) -> Option<Duration> {
        let remaining = p - self.position_at(now);
        if remaining.inner_km() <= 0.0 {
            return Some(Duration::ZERO);
        }
        self.speed.time_to_cover(remaining)
    }
}

/// `distance_to_car_ahead = ahead.position - self.position - (ahead.length + MIN_GAP)`,
/// evaluated at `now` so both positions are on the same time basis.
pub fn distance_to_car_ahead(me: &Car, ahead: &Car, now: Time) -> Distance {
    ahead.position_at(now) - me.position_at(now) - (ahead.length + MIN_GAP)
}

/// `time_to_reach_car_ahead`: finite only while `self.speed > ahead.speed`.
pub fn time_to_reach_car_ahead(me: &Car, ahead: &Car, now: Time) -> Option<Duration> {
    if me.speed <= ahead.speed {
        return None;
    }
    let gap = distance_to_car_ahead(me, ahead, now);
    if gap.inner_km() <= 0.0 {
        return Some(Duration::ZERO);
    }
    (me.speed - ahead.speed).time_to_cover(gap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_model::CarID;

    fn car_at(pos: f64, speed: f64) -> Car {
        Car::new(
            CarID(0),
            None,
            LaneID(0),
            Distance::km(pos),
            Time::START_OF_SIMULATION,
            Speed::km_per_hour(speed),
            Speed::km_per_hour(50.0),
            Distance::km(0.004),
            CarState::Crossing,
        )
    }

    #[test]
    fn position_advances_with_speed() {
        let car = car_at(0.0, 36.0); // 36 km/h = 0.01 km/s
        let later = Time::START_OF_SIMULATION + Duration::seconds(10.0);
        assert!((car.position_at(later).inner_km() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn set_speed_reanchors_position() {
        let mut car = car_at(0.0, 36.0);
        let t1 = Time::START_OF_SIMULATION + Duration::seconds(5.0);
        car.set_speed(Speed::km_per_hour(0.0), t1);
        assert!((car.position().inner_km() - 0.05).abs() < 1e-9);
        assert_eq!(car.update_time(), t1);
        let t2 = t1 + Duration::seconds(100.0);
        // Stopped, so position must not keep advancing.
        assert_eq!(car.position_at(t2), car.position());
    }

    #[test]
    fn car_ahead_gap_accounts_for_length_and_min_gap() {
        let me = car_at(0.0, 0.0);
        let ahead = car_at(0.01, 0.0);
        let gap = distance_to_car_ahead(&me, &ahead, Time::START_OF_SIMULATION);
        assert!((gap.inner_km() - (0.01 - 0.004 - 0.001)).abs() < 1e-9);
    }

    #[test]
    fn time_to_reach_is_none_when_not_closing() {
        let me = car_at(0.0, 20.0);
        let ahead = car_at(0.01, 30.0);
        assert!(time_to_reach_car_ahead(&me, &ahead, Time::START_OF_SIMULATION).is_none());
    }
}
