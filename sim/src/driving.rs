//! Per-lane car queues. Kept in the simulation layer rather than `map_model::Lane` because the
//! queue is mutable runtime state, not static network topology.
//!
//! Ordering is index 0 = rearmost (lowest position) through index last = foremost (I2). The
//! queue never re-sorts itself: insertion places a car at the correct slot given the *current*
//! positions of its neighbors (via the caller-supplied `pos_of` lookup, since positions are
//! derived quantities that live on `Car`, not here), and the car behavior model is responsible
//! for never producing an overtake that would violate the invariant.

use std::collections::HashMap;

use geom::Distance;
use map_model::{CarID, LaneID};

#[derive(Default)]
pub struct Queues {
    lanes: HashMap<LaneID, Vec<CarID>>,
}

impl Queues {
    pub fn new() -> Queues {
        Queues::default()
    }

    pub fn cars_on(&self, lane: LaneID) -> &[CarID] {
        self.lanes.get(&lane).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self, lane: LaneID) -> bool {
        self.cars_on(lane).is_empty()
    }

    pub fn first(&self, lane: LaneID) -> Option<CarID> {
        self.cars_on(lane).first().copied()
    }

    pub fn last(&self, lane: LaneID) -> Option<CarID> {
        self.cars_on(lane).last().copied()
    }

    /// Inserts `car` (at `position`) into `lane`'s queue, keeping it ordered by position
    /// ascending. `pos_of` reports another car's *current* position, since positions evolve
    /// continuously between resumes.
    pub fn insert_sorted(
        &mut self,
        lane: LaneID,
        car: CarID,
        position: Distance,
        pos_of: impl Fn(CarID) -> Distance,
    ) {
        let v = self.lanes.entry(lane).or_default();
        let idx = v
            .iter()
            .position(|&other| pos_of(other).inner_km() > position.inner_km())
            .unwrap_or(v.len());
        v.insert(idx, car);
    }

    pub fn remove(&mut self, lane: LaneID, car: CarID) {
        if let Some(v) = self.lanes.get_mut(&lane) {
            v.retain(|&c| c != car);
        }
    }

    /// The car immediately ahead of `car` in its lane (I1: a car is on exactly one lane's queue
    /// at a time, so this is unambiguous).
    pub fn car_ahead(&self, lane: LaneID, car: CarID) -> Option<CarID> {
        let v = self.cars_on(lane);
        let idx = v.iter().position(|&c| c == car)?;
        v.get(idx + 1).copied()
    }

    pub fn car_behind(&self, lane: LaneID, car: CarID) -> Option<CarID> {
        let v = self.cars_on(lane);
        let idx = v.iter().position(|&c| c == car)?;
        if idx == 0 {
            None
        } else {
            v.get(idx - 1).copied()
        }
    }

    /// True if `car` is the foremost (closest to the lane's end) car in `lane` -- "first in
    /// lane" for the pre-acquire step, i.e. the car with the highest position, last in the
    /// ascending-by-position ordering.
    pub fn is_foremost(&self, lane: LaneID, car: CarID) -> bool {
        self.last(lane) == Some(car)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintains_position_order() {
        let mut q = Queues::new();
        let lane = LaneID(0);
        let positions: HashMap<CarID, Distance> = [
            (CarID(0), Distance::km(0.5)),
            (CarID(1), Distance::km(0.1)),
            (CarID(2), Distance::km(0.9)),
        ]
        .into_iter()
        .collect();
        for (&car, &pos) in &positions {
            q.insert_sorted(lane, car, pos, |c| positions[&c]);
        }
        assert_eq!(q.cars_on(lane), &[CarID(1), CarID(0), CarID(2)]);
        assert_eq!(q.car_ahead(lane, CarID(0)), Some(CarID(2)));
        assert_eq!(q.car_behind(lane, CarID(0)), Some(CarID(1)));
        assert!(q.is_foremost(lane, CarID(2)));
        assert!(!q.is_foremost(lane, CarID(1)));
    }

    #[test]
    fn remove_then_reinsert() {
        let mut q = Queues::new();
        let lane = LaneID(1);
        q.insert_sorted(lane, CarID(0), Distance::km(0.2), |_| Distance::ZERO);
        q.remove(lane, CarID(0));
        assert!(q.is_empty(lane));
    }
}
