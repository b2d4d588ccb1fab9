//! Crossing-lane acquisition (the exclusion primitive) and the per-crossroad traffic light phase
//! machine.

use std::collections::HashMap;

use geom::Duration;
use map_model::{Crossroad, CrossroadID, LaneID, Network, CROSSING_LANE_CAPACITY};

pub const TRAFFIC_LIGHT_INTERVAL: Duration = Duration::seconds(20.0);
pub const TRAFFIC_LIGHT_DISABLED_TIME: Duration = Duration::seconds(5.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// `ways[0]` and its through partner are enabled.
    A,
    /// Every crossing lane is disabled.
    B,
    /// `left(ways[0])` and `right(ways[0])` are enabled.
    C,
}

impl Phase {
    fn duration(self) -> Duration {
        match self {
            Phase::A | Phase::C => TRAFFIC_LIGHT_INTERVAL,
            Phase::B => TRAFFIC_LIGHT_DISABLED_TIME,
        }
    }

    /// A -> B -> C -> B -> A -> ...
    fn next(self, came_from_a: bool) -> (Phase, bool) {
        match self {
            Phase::A => (Phase::B, false),
            Phase::C => (Phase::B, true),
            Phase::B if came_from_a => (Phase::C, false),
            Phase::B => (Phase::A, false),
        }
    }
}

struct CrossingLaneState {
    holders: usize,
    disabled: bool,
}

pub struct Intersections {
    lanes: HashMap<LaneID, CrossingLaneState>,
    phase: HashMap<CrossroadID, (Phase, bool)>,
}

impl Intersections {
    /// Every crossing lane starts enabled; lit crossroads are switched into Phase A's enabled
    /// set by the first scheduled transition the caller drives. Phase A is always the fixed
    /// starting state; only the first transition's timing is randomized.
    pub fn new(network: &Network) -> Intersections {
        let mut lanes = HashMap::new();
        for crossroad in &network.crossroads {
            for c in &crossroad.crossing_lanes {
                lanes.insert(
                    c.id,
                    CrossingLaneState {
                        holders: 0,
                        disabled: false,
                    },
                );
            }
        }
        let mut phase = HashMap::new();
        for crossroad in &network.crossroads {
            if network.node(crossroad.node).has_traffic_light {
                phase.insert(crossroad.id, (Phase::A, false));
            }
        }
        let mut result = Intersections { lanes, phase };
        // Apply phase A's disable set immediately so cars never see a lit crossroad with every
        // lane spuriously enabled before the first transition fires.
        let lit: Vec<CrossroadID> = result.phase.keys().copied().collect();
        for crossroad_id in lit {
            result.apply_phase(network.crossroad(crossroad_id), Phase::A);
        }
        result
    }

    /// Requests `lane`: succeeds only if `lane` itself is enabled and under capacity, and every
    /// lane in its conflict set currently has zero holders.
    pub fn try_acquire(&mut self, lane: LaneID, conflict_set: &[LaneID]) -> bool {
        let s = self.lanes.get(&lane).expect("unknown crossing lane");
        if s.disabled || s.holders >= CROSSING_LANE_CAPACITY {
            return false;
        }
        if conflict_set
            .iter()
            .any(|c| self.lanes.get(c).map_or(false, |o| o.holders > 0))
        {
            return false;
        }
        self.lanes.get_mut(&lane).unwrap().holders += 1;
        true
    }

    pub fn release(&mut self, lane: LaneID) {
        if let Some(s) = self.lanes.get_mut(&lane) {
            s.holders = s.holders.saturating_sub(1);
        }
    }

    /// The initial offset before the first phase transition: uniform in
    /// `[0, TRAFFIC_LIGHT_INTERVAL]`, drawn from the caller's seeded stream.
    pub fn initial_offset(rng: &mut impl rand::Rng) -> Duration {
        Duration::seconds(rng.gen_range(0.0..=TRAFFIC_LIGHT_INTERVAL.inner_seconds()))
    }

    /// Advances `crossroad` to its next phase, applies the new enable/disable set, and returns
    /// `(new phase's duration, the lane ids now enabled)` for the caller to schedule the next
    /// transition and emit the calendar event -- both must happen atomically with the state
    /// change, which holds here since this is a single synchronous call.
    pub fn advance_phase(&mut self, network: &Network, crossroad: CrossroadID) -> (Duration, Vec<LaneID>) {
        let (current, came_from_a) = self.phase[&crossroad];
        let (next, next_came_from_a) = current.next(came_from_a);
        self.phase.insert(crossroad, (next, next_came_from_a));
        let cr = network.crossroad(crossroad);
        let enabled = self.apply_phase(cr, next);
        (next.duration(), enabled)
    }

    fn apply_phase(&mut self, crossroad: &Crossroad, phase: Phase) -> Vec<LaneID> {
        let ways0 = crossroad.incident_ways.first().copied();
        let enabled_ways: Vec<_> = match phase {
            Phase::A => {
                let through = ways0.and_then(|w| crossroad.through_of(w));
                vec![ways0, through].into_iter().flatten().collect()
            }
            Phase::B => vec![],
            Phase::C => {
                let left = ways0.and_then(|w| crossroad.left_of(w));
                let right = ways0.and_then(|w| crossroad.right_of(w));
                vec![left, right].into_iter().flatten().collect()
            }
        };

        let mut enabled_lanes = Vec::new();
        for c in &crossroad.crossing_lanes {
            let should_enable = match phase {
                Phase::B => false,
                _ => enabled_ways.contains(&c.from_way),
            };
            let state = self.lanes.get_mut(&c.id).expect("unknown crossing lane");
            state.disabled = !should_enable;
            if should_enable {
                enabled_lanes.push(c.id);
            }
        }
        enabled_lanes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_caps_concurrent_holders() {
        let mut lanes = HashMap::new();
        lanes.insert(
            LaneID(0),
            CrossingLaneState {
                holders: 0,
                disabled: false,
            },
        );
        let mut isect = Intersections {
            lanes,
            phase: HashMap::new(),
        };
        for _ in 0..CROSSING_LANE_CAPACITY {
            assert!(isect.try_acquire(LaneID(0), &[]));
        }
        assert!(!isect.try_acquire(LaneID(0), &[]));
        isect.release(LaneID(0));
        assert!(isect.try_acquire(LaneID(0), &[]));
    }

    #[test]
    fn disabled_lane_cannot_be_acquired() {
        let mut lanes = HashMap::new();
        lanes.insert(
            LaneID(0),
            CrossingLaneState {
                holders: 0,
                disabled: true,
            },
        );
        let mut isect = Intersections {
            lanes,
            phase: HashMap::new(),
        };
        assert!(!isect.try_acquire(LaneID(0), &[]));
    }

    #[test]
    fn holder_in_conflict_set_blocks_acquisition() {
        let mut lanes = HashMap::new();
        lanes.insert(LaneID(0), CrossingLaneState { holders: 0, disabled: false });
        lanes.insert(LaneID(1), CrossingLaneState { holders: 1, disabled: false });
        let mut isect = Intersections { lanes, phase: HashMap::new() };
        assert!(!isect.try_acquire(LaneID(0), &[LaneID(1)]));
        isect.release(LaneID(1));
        assert!(isect.try_acquire(LaneID(0), &[LaneID(1)]));
    }
}
