//! The simulation orchestrator: owns every piece of mutable state and drives the discrete
//! event loop that dispatches each popped task to the Car Behavior Process or the Traffic Light
//! Controller.
//!
//! Car behavior doesn't exist as a literal coroutine (see `kernel`'s module doc). Instead each
//! `CarState` variant has a `resume_*` function here that re-examines the car's current position
//! and neighbors from scratch and either advances to the next phase/state or re-suspends --
//! exactly the "first condition to actually be true wins" pattern the epoch-based kernel enables.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use rand::Rng;
use rand_xorshift::XorShiftRng;

use geom::{Distance, Duration, Speed, Time};
use map_model::{CarID, CrossroadID, LaneID, Network, WayID};

use crate::calendar::Calendar;
use crate::car::{Car, CarState, CrossingPhase, Plan};
use crate::constants::*;
use crate::driving::Queues;
use crate::intersection::Intersections;
use crate::kernel::{Kernel, TaskId};

/// Position tolerance for "has this car arrived at its target" checks. Smaller than any
/// position a car could possibly be asked to resolve down to, per the invariant that positions
/// only ever move forward.
const EPSILON: Distance = Distance::km(1e-7);

pub struct Sim {
    pub network: Network,
    kernel: Kernel,
    calendar: Calendar,
    queues: Queues,
    intersections: Intersections,
    cars: HashMap<CarID, Car>,
    rng: XorShiftRng,
    next_car_id: u32,
    fleet_size: usize,
}

impl Sim {
    pub fn new(network: Network, vehicle_count: usize, seed: u32) -> Sim {
        let rng = abstutil::seeded_rng(seed);
        let intersections = Intersections::new(&network);
        let mut sim = Sim {
            kernel: Kernel::new(),
            calendar: Calendar::new(),
            queues: Queues::new(),
            intersections,
            cars: HashMap::new(),
            next_car_id: 0,
            fleet_size: vehicle_count,
            network,
            rng,
        };
        sim.schedule_traffic_lights();
        for _ in 0..vehicle_count {
            sim.spawn_one();
        }
        sim
    }

    /// Runs the event loop until no task remains scheduled before `time_span`, then returns the
    /// recorded calendar along with the network it ran over (needed to pack it).
    pub fn run(mut self, time_span: Duration) -> (Calendar, Network) {
        let end = Time::START_OF_SIMULATION + time_span;
        while let Some(t) = self.kernel.peek_time() {
            if t.inner_seconds() >= end.inner_seconds() {
                break;
            }
            match self.kernel.pop().expect("peek_time found a task") {
                TaskId::Car(id) => self.resume_car(id),
                TaskId::Intersection(cid) => self.resume_intersection(cid),
                TaskId::ReleaseCrossingLanes(id) => self.resume_release_crossing_lanes(id),
            }
        }
        self.teardown();
        (self.calendar, self.network)
    }

    fn now(&self) -> Time {
        self.kernel.now()
    }

    // ---- Vehicle Spawner ----

    fn spawn_one(&mut self) {
        let choice = crate::spawner::choose_spawn(&self.network, &mut self.rng);
        let id = CarID(self.next_car_id);
        self.next_car_id += 1;

        let way = self.network.way(choice.way);
        let speed = choice.desired_speed.min(way.max_speed);
        let now = self.now();
        let car = Car::new(
            id,
            Some(choice.way),
            choice.lane,
            choice.position,
            now,
            speed,
            choice.desired_speed,
            choice.length,
            CarState::Crossing,
        );
        self.queues.insert_sorted(choice.lane, id, choice.position, |_| Distance::ZERO);
        self.cars.insert(id, car);
        self.record_event(id);

        let mut car = self.cars.remove(&id).unwrap();
        self.plan_route(&mut car);
        self.cars.insert(id, car);

        self.enter_crossing_phase(id, CrossingPhase::ToMidpoint);
        debug!("{} spawned on {:?} at {:?}", id, choice.lane, choice.position);
    }

    // ---- Calendar plumbing ----

    fn record_event(&mut self, car_id: CarID) {
        let (way, crossroad, lane, position, speed) = {
            let car = &self.cars[&car_id];
            (car.way, car.crossroad, car.lane, car.position(), car.speed)
        };
        let lane_length = self.network.lane(lane).length();
        self.calendar.record_car(
            self.kernel.now(),
            car_id,
            way,
            crossroad,
            lane,
            position,
            lane_length,
            speed,
        );
    }

    // ---- Speed mutation side effects ----

    /// Sets `car`'s speed, re-anchoring its position first, then performs the side effects every
    /// speed change carries: emit a calendar event, wake the car behind (its own car-ahead gap
    /// just changed), and reschedule the release-crossing-lanes timer if one is pending (its
    /// arrival time depends on speed).
    fn set_speed(&mut self, car_id: CarID, new_speed: Speed) {
        let now = self.now();
        let lane = {
            let car = self.cars.get_mut(&car_id).expect("unknown car");
            car.set_speed(new_speed, now);
            car.lane
        };
        self.record_event(car_id);
        if let Some(behind) = self.queues.car_behind(lane, car_id) {
            self.kernel.wake_now(TaskId::Car(behind));
        }
        self.reschedule_release_if_pending(car_id);
    }

    fn reschedule_release_if_pending(&mut self, car_id: CarID) {
        let car = self.cars.get(&car_id).expect("unknown car");
        if car.held_crossing_lanes.is_empty() {
            return;
        }
        // Only the most recently entered lane's clearance timer depends on the car's speed;
        // re-derive it the same way `resume_crossing_crossroad` originally scheduled it.
        if let Some(dt) = car.time_to_be_at_position(self.now(), car.length + MIN_GAP + Distance::km(0.0001)) {
            self.kernel.schedule(dt, TaskId::ReleaseCrossingLanes(car_id));
        }
    }

    // ---- Random path choice ----

    /// Picks (or re-picks) `car`'s `Plan` via a two-stage random path choice: a next Way
    /// uniformly among those reachable from the current Way at the upcoming crossroad, then a
    /// next lane uniformly among those reachable from `car`'s *current* lane; if the current
    /// lane can't make that turn, `lane_to_switch` records the lane it must merge into first.
    /// Computed as soon as a car commits to a new lane rather than only at `Waiting`, so the
    /// pre-acquire step always has a concrete plan to act on.
    fn plan_route(&mut self, car: &mut Car) {
        let lane_id = car.lane;
        let current_way = match car.way {
            Some(w) => w,
            None => {
                car.plan = Plan::none();
                return;
            }
        };
        let end_node = match lane_end_node(&self.network, lane_id) {
            Some(n) => n,
            None => {
                car.plan = Plan::none();
                return;
            }
        };
        let crossroad_id = self.network.crossroad_id_at(end_node);

        let mut plan = Plan::none();
        if let Some(cid) = crossroad_id {
            let crossroad = self.network.crossroad(cid);
            let to_ways: BTreeSet<WayID> = crossroad
                .crossing_lanes_from(current_way)
                .map(|c| c.to_way)
                .collect();
            if !to_ways.is_empty() {
                let to_ways: Vec<WayID> = to_ways.into_iter().collect();
                let chosen_to_way = to_ways[self.rng.gen_range(0..to_ways.len())];

                let reachable_from_here: Vec<_> = crossroad
                    .crossing_lanes_from(current_way)
                    .filter(|c| c.to_way == chosen_to_way && c.from_lane == lane_id)
                    .collect();
                if !reachable_from_here.is_empty() {
                    let c = reachable_from_here[self.rng.gen_range(0..reachable_from_here.len())];
                    plan = Plan {
                        next_way: Some(chosen_to_way),
                        next_lanes: vec![c.id, c.to_lane],
                        lane_to_switch: None,
                    };
                } else {
                    let candidates: Vec<_> = crossroad
                        .crossing_lanes_from(current_way)
                        .filter(|c| c.to_way == chosen_to_way)
                        .collect();
                    let c = candidates[self.rng.gen_range(0..candidates.len())];
                    plan = Plan {
                        next_way: Some(chosen_to_way),
                        next_lanes: Vec::new(),
                        lane_to_switch: Some(c.from_lane),
                    };
                }
            }
        }

        if plan.next_lanes.is_empty() && plan.lane_to_switch.is_none() {
            // No crossroad here, or nothing reachable: fall back to reversing direction on the
            // same Way if it has a lane going the other way (a dead end).
            let lane_is_forward = self.network.lane(lane_id).is_forward;
            let way = self.network.way(current_way);
            let opposite: &[LaneID] = if lane_is_forward {
                &way.lanes.backward
            } else {
                &way.lanes.forward
            };
            if !opposite.is_empty() {
                let chosen = opposite[self.rng.gen_range(0..opposite.len())];
                plan = Plan {
                    next_way: Some(current_way),
                    next_lanes: vec![chosen],
                    lane_to_switch: None,
                };
            }
        }

        car.plan = plan;
    }

    // ---- Car Behavior Process ----

    fn resume_car(&mut self, car_id: CarID) {
        let state = match self.cars.get(&car_id) {
            Some(c) => c.state,
            None => return, // despawned and removed already
        };
        match state {
            CarState::Crossing => self.resume_crossing(car_id),
            CarState::CrossingCrossroad => self.resume_crossing_crossroad(car_id),
            CarState::Queued => self.resume_queued(car_id),
            CarState::Waiting => self.resume_waiting(car_id),
            CarState::Despawning => self.resume_despawning(car_id),
        }
    }

    /// Enters `Crossing` fresh at `phase`, committing to a target position and (re-)setting
    /// speed, then schedules the next wake-up.
    fn enter_crossing_phase(&mut self, car_id: CarID, phase: CrossingPhase) {
        let lane_len = self.network.lane(self.cars[&car_id].lane).length();
        let target = {
            let car = self.cars.get_mut(&car_id).unwrap();
            car.crossing_phase = phase;
            let target = match phase {
                CrossingPhase::ToMidpoint => {
                    let pct = self
                        .rng
                        .gen_range(CROSSING_TARGET_PCT_RANGE.0..=CROSSING_TARGET_PCT_RANGE.1);
                    (lane_len * pct).max(car.position())
                }
                CrossingPhase::ToBlockPoint => {
                    (lane_len - CROSSROAD_BLOCKING_TIME * car.speed).max(car.position())
                }
                CrossingPhase::ToLaneEnd => lane_len,
            };
            car.crossing_target = target;
            target
        };
        self.schedule_crossing_wake(car_id, target);
    }

    fn schedule_crossing_wake(&mut self, car_id: CarID, target: Distance) {
        let now = self.now();
        let car = self.cars.get(&car_id).unwrap();
        let arrival = car.time_to_be_at_position(now, target);
        let ahead_timeout = self
            .queues
            .car_ahead(car.lane, car_id)
            .and_then(|ahead_id| {
                crate::car::time_to_reach_car_ahead(car, &self.cars[&ahead_id], now)
            });
        let dt = match (arrival, ahead_timeout) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => return, // never arrives and never catches up: stays put forever
        };
        self.kernel.schedule(dt, TaskId::Car(car_id));
    }

    fn resume_crossing(&mut self, car_id: CarID) {
        let now = self.now();
        let (lane, target, phase) = {
            let car = &self.cars[&car_id];
            (car.lane, car.crossing_target, car.crossing_phase)
        };

        if let Some(ahead_id) = self.queues.car_ahead(lane, car_id) {
            let gap = crate::car::distance_to_car_ahead(&self.cars[&car_id], &self.cars[&ahead_id], now);
            if gap.inner_km() <= EPSILON.inner_km() {
                self.enter_queued(car_id, ahead_id);
                return;
            }
        }

        let arrived = self.cars[&car_id].position_at(now).inner_km() >= target.inner_km() - EPSILON.inner_km();
        if !arrived {
            // Woken early by something that turned out not to affect us (e.g. a sibling lane's
            // traffic light); just re-arm the same wait.
            self.schedule_crossing_wake(car_id, target);
            return;
        }

        match phase {
            CrossingPhase::ToMidpoint => {
                self.try_lane_change(car_id);
                // try_lane_change may have moved the car onto a different lane with its own
                // fresh phase/target; only continue the original sequence if it didn't.
                if self.cars[&car_id].crossing_phase == CrossingPhase::ToMidpoint {
                    self.enter_crossing_phase(car_id, CrossingPhase::ToBlockPoint);
                }
            }
            CrossingPhase::ToBlockPoint => {
                self.try_preacquire(car_id);
                self.enter_crossing_phase(car_id, CrossingPhase::ToLaneEnd);
            }
            CrossingPhase::ToLaneEnd => {
                self.enter_waiting(car_id);
            }
        }
    }

    /// A car at the front of its lane pre-acquires the next Crossing Lane if it's on a main
    /// Way, or if no car is approaching from the right within `CROSSROAD_BLOCKING_TIME`.
    fn try_preacquire(&mut self, car_id: CarID) {
        let (lane, way, plan_first) = {
            let car = &self.cars[&car_id];
            (car.lane, car.way, car.plan.next_lanes.first().copied())
        };
        let first_lane = match plan_first {
            Some(l) if self.network.lane(l).owning_crossroad().is_some() => l,
            _ => return,
        };
        if !self.queues.is_foremost(lane, car_id) {
            return;
        }
        let way = match way {
            Some(w) => w,
            None => return,
        };
        let cleared = self.crossroad_of_way_end(way).map_or(true, |cid| {
            let crossroad = self.network.crossroad(cid);
            crossroad.is_main_way(way) || self.right_of_way_clear(crossroad, way)
        });
        if !cleared {
            return;
        }
        let conflict_set = self.conflict_set_of(first_lane);
        if self.intersections.try_acquire(first_lane, &conflict_set) {
            self.cars.get_mut(&car_id).unwrap().held_crossing_lanes.push(first_lane);
        }
    }

    /// `crossroad.conflict_set` for `lane` -- every other Crossing Lane that must be clear
    /// before `lane` may be entered.
    fn conflict_set_of(&self, lane: LaneID) -> Vec<LaneID> {
        let crossroad_id = match self.network.lane(lane).owning_crossroad() {
            Some(c) => c,
            None => return Vec::new(),
        };
        let crossroad = self.network.crossroad(crossroad_id);
        match crossroad.crossing_lane(lane) {
            Some(info) => crossroad.conflict_set(info),
            None => Vec::new(),
        }
    }

    fn crossroad_of_way_end(&self, way: WayID) -> Option<CrossroadID> {
        // Only meaningful for the Way the car is currently leaving, so the "end" is wherever its
        // current lane actually terminates; callers already know the lane, so look it up once
        // more here for the common case of "the crossroad this car's lane feeds into".
        let w = self.network.way(way);
        self.network
            .crossroad_id_at(w.to)
            .or_else(|| self.network.crossroad_id_at(w.from))
    }

    /// Heuristic stand-in for "no car is approaching from the right within
    /// `CROSSROAD_BLOCKING_TIME`": true if there's no Way to the right, or every car on its
    /// arriving lanes is farther than `CROSSROAD_BLOCKING_TIME * its speed` from that lane's end.
    fn right_of_way_clear(&self, crossroad: &map_model::Crossroad, way: WayID) -> bool {
        let right = match crossroad.right_of(way) {
            Some(w) => w,
            None => return true,
        };
        let now = self.now();
        for lane in self.network.way(right).lanes.all() {
            if self.network.lane(lane).owning_way() != Some(right) {
                continue;
            }
            if let Some(foremost) = self.queues.last(lane) {
                let car = &self.cars[&foremost];
                let lane_len = self.network.lane(lane).length();
                let remaining = lane_len - car.position_at(now);
                let reach_time = car.speed.time_to_cover(remaining);
                if let Some(t) = reach_time {
                    if t.inner_seconds() <= CROSSROAD_BLOCKING_TIME.inner_seconds() {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// The lane-change policy, simplified to an immediate merge (no gradual reduced-speed
    /// sub-suspend): if `car` has a pending `lane_to_switch`, step one lane towards it, despawning
    /// instead if the destination lane's blocker is stopped outside a queue.
    fn try_lane_change(&mut self, car_id: CarID) {
        let target = match self.cars[&car_id].plan.lane_to_switch {
            Some(t) => t,
            None => return,
        };
        let (current_lane, position) = {
            let car = &self.cars[&car_id];
            (car.lane, car.position())
        };
        if current_lane == target {
            self.cars.get_mut(&car_id).unwrap().plan.lane_to_switch = None;
            let mut car = self.cars.remove(&car_id).unwrap();
            self.plan_route(&mut car);
            self.cars.insert(car_id, car);
            return;
        }
        let lane = self.network.lane(current_lane);
        let direction = if lane.left == Some(target) || self.reaches(current_lane, target, true) {
            lane.left
        } else {
            lane.right
        };
        let dest = match direction {
            Some(d) => d,
            None => return, // no adjacent lane that direction; stay and let `Waiting` sort it out
        };

        if let Some(blocker) = self.blocker_in(dest, position) {
            let blocker_stopped = self.cars[&blocker].speed.inner_kmh() <= 0.0
                && self.cars[&blocker].state != CarState::Queued;
            if blocker_stopped {
                self.enter_despawning(car_id);
                return;
            }
        }

        let now = self.now();
        self.queues.remove(current_lane, car_id);
        if let Some(behind) = self.queues.car_behind(current_lane, car_id) {
            self.kernel.wake_now(TaskId::Car(behind));
        }
        self.queues.insert_sorted(dest, car_id, position, |id| self.cars[&id].position_at(now));
        {
            let car = self.cars.get_mut(&car_id).unwrap();
            car.lane = dest;
        }
        if dest == target {
            self.cars.get_mut(&car_id).unwrap().plan.lane_to_switch = None;
            let mut car = self.cars.remove(&car_id).unwrap();
            self.plan_route(&mut car);
            self.cars.insert(car_id, car);
        }
    }

    /// True if walking `from` via `left`/`right` neighbors eventually reaches `to` going left.
    fn reaches(&self, from: LaneID, to: LaneID, left: bool) -> bool {
        let mut cur = Some(from);
        while let Some(l) = cur {
            if l == to {
                return true;
            }
            let lane = self.network.lane(l);
            cur = if left { lane.left } else { lane.right };
        }
        false
    }

    fn blocker_in(&self, lane: LaneID, position: Distance) -> Option<CarID> {
        let now = self.now();
        self.queues.cars_on(lane).iter().copied().find(|&id| {
            let car = &self.cars[&id];
            (car.position_at(now) - position).abs().inner_km() < car.length.inner_km() + MIN_GAP.inner_km()
        })
    }

    fn enter_queued(&mut self, car_id: CarID, ahead_id: CarID) {
        let ahead_speed = self.cars[&ahead_id].speed;
        let new_speed = ahead_speed.min(self.cars[&car_id].desired_speed);
        self.cars.get_mut(&car_id).unwrap().state = CarState::Queued;
        self.set_speed(car_id, new_speed);
        let lane_end = self.network.lane(self.cars[&car_id].lane).length();
        self.schedule_crossing_wake(car_id, lane_end);
    }

    fn resume_queued(&mut self, car_id: CarID) {
        let now = self.now();
        let lane = self.cars[&car_id].lane;
        let lane_len = self.network.lane(lane).length();

        match self.queues.car_ahead(lane, car_id) {
            None => {
                // Lead car left the lane: resume free driving towards the lane end.
                self.cars.get_mut(&car_id).unwrap().state = CarState::Crossing;
                self.enter_crossing_phase(car_id, CrossingPhase::ToLaneEnd);
                return;
            }
            Some(ahead_id) => {
                let ahead_speed = self.cars[&ahead_id].speed;
                let desired = self.cars[&car_id].desired_speed;
                if ahead_speed.inner_kmh() > desired.inner_kmh() {
                    self.cars.get_mut(&car_id).unwrap().state = CarState::Crossing;
                    self.enter_crossing_phase(car_id, CrossingPhase::ToLaneEnd);
                    return;
                }
                let arrived = self.cars[&car_id].position_at(now).inner_km() >= lane_len.inner_km() - EPSILON.inner_km();
                if arrived {
                    self.enter_waiting(car_id);
                    return;
                }
                let new_speed = ahead_speed.min(desired);
                if (new_speed.inner_kmh() - self.cars[&car_id].speed.inner_kmh()).abs() > 1e-9 {
                    self.set_speed(car_id, new_speed);
                }
                let lane_end = lane_len;
                self.schedule_crossing_wake(car_id, lane_end);
            }
        }
    }

    fn enter_waiting(&mut self, car_id: CarID) {
        self.cars.get_mut(&car_id).unwrap().state = CarState::Waiting;
        self.set_speed(car_id, DESPAWN_SPEED);
        self.kernel.wake_now(TaskId::Car(car_id));
    }

    fn resume_waiting(&mut self, car_id: CarID) {
        if self.cars[&car_id].plan.is_empty() {
            self.enter_despawning(car_id);
            return;
        }
        let first_lane = self.cars[&car_id].plan.next_lanes[0];
        let is_crossing_lane = self.network.lane(first_lane).owning_crossroad().is_some();
        let already_held = self.cars[&car_id].held_crossing_lanes.contains(&first_lane);
        if is_crossing_lane && !already_held {
            let conflict_set = self.conflict_set_of(first_lane);
            if self.intersections.try_acquire(first_lane, &conflict_set) {
                self.cars.get_mut(&car_id).unwrap().held_crossing_lanes.push(first_lane);
            } else {
                self.kernel.schedule(WAIT_POLL_INTERVAL, TaskId::Car(car_id));
                return;
            }
        }
        self.enter_next_lane(car_id, first_lane, is_crossing_lane);
    }

    fn enter_next_lane(&mut self, car_id: CarID, next_lane: LaneID, is_crossing_lane: bool) {
        let now = self.now();
        let old_lane = self.cars[&car_id].lane;
        self.queues.remove(old_lane, car_id);
        if let Some(behind) = self.queues.car_behind(old_lane, car_id) {
            self.kernel.wake_now(TaskId::Car(behind));
        }
        self.queues.insert_sorted(next_lane, car_id, Distance::ZERO, |id| self.cars[&id].position_at(now));

        {
            let car = self.cars.get_mut(&car_id).unwrap();
            car.lane = next_lane;
            car.set_position(Distance::ZERO, now);
        }

        if is_crossing_lane {
            let crossroad = self.network.lane(next_lane).owning_crossroad();
            {
                let car = self.cars.get_mut(&car_id).unwrap();
                car.way = None;
                car.crossroad = crossroad;
                car.state = CarState::CrossingCrossroad;
            }
            let speed = self.cars[&car_id].desired_speed;
            self.set_speed(car_id, speed);
            let lane_len = self.network.lane(next_lane).length();
            self.schedule_crossing_wake(car_id, lane_len);
        } else {
            let next_way = self.cars[&car_id].plan.next_way;
            {
                let car = self.cars.get_mut(&car_id).unwrap();
                car.way = next_way;
                car.crossroad = None;
                car.state = CarState::Crossing;
            }
            let max_speed = next_way.map(|w| self.network.way(w).max_speed).unwrap_or(Speed::ZERO);
            let desired = self.cars[&car_id].desired_speed;
            self.set_speed(car_id, desired.min(max_speed));
            let mut car = self.cars.remove(&car_id).unwrap();
            self.plan_route(&mut car);
            self.cars.insert(car_id, car);
            self.enter_crossing_phase(car_id, CrossingPhase::ToMidpoint);
        }
    }

    fn resume_crossing_crossroad(&mut self, car_id: CarID) {
        let now = self.now();
        let lane = self.cars[&car_id].lane;
        let lane_len = self.network.lane(lane).length();
        let arrived = self.cars[&car_id].position_at(now).inner_km() >= lane_len.inner_km() - EPSILON.inner_km();
        if !arrived {
            self.schedule_crossing_wake(car_id, lane_len);
            return;
        }
        let next_lanes = self.cars[&car_id].plan.next_lanes.clone();
        let outgoing = next_lanes.get(1).copied();
        match outgoing {
            Some(lane) => self.enter_next_lane(car_id, lane, false),
            None => self.enter_despawning(car_id),
        }
    }

    fn resume_release_crossing_lanes(&mut self, car_id: CarID) {
        if let Some(car) = self.cars.get_mut(&car_id) {
            let released = std::mem::take(&mut car.held_crossing_lanes);
            for lane in released {
                self.intersections.release(lane);
            }
        }
    }

    fn enter_despawning(&mut self, car_id: CarID) {
        self.cars.get_mut(&car_id).unwrap().state = CarState::Despawning;
        self.kernel.wake_now(TaskId::Car(car_id));
    }

    fn resume_despawning(&mut self, car_id: CarID) {
        self.record_event(car_id);
        let (lane, held) = {
            let car = &self.cars[&car_id];
            (car.lane, car.held_crossing_lanes.clone())
        };
        for l in held {
            self.intersections.release(l);
        }
        self.kernel.cancel(TaskId::ReleaseCrossingLanes(car_id));
        self.queues.remove(lane, car_id);
        if let Some(behind) = self.queues.car_behind(lane, car_id) {
            self.kernel.wake_now(TaskId::Car(behind));
        }
        self.cars.remove(&car_id);
        self.spawn_one();
        debug_assert_eq!(self.cars.len(), self.fleet_size, "fleet size must stay constant");
    }

    fn teardown(&mut self) {
        let ids: Vec<CarID> = self.cars.keys().copied().collect();
        for id in ids {
            self.record_event(id);
        }
    }

    // ---- Traffic Light Controller ----

    fn schedule_traffic_lights(&mut self) {
        let crossroads: Vec<CrossroadID> = self
            .network
            .crossroads
            .iter()
            .filter(|c| self.network.node(c.node).has_traffic_light)
            .map(|c| c.id)
            .collect();
        for cid in crossroads {
            let offset = Intersections::initial_offset(&mut self.rng);
            self.kernel.schedule(offset, TaskId::Intersection(cid));
        }
    }

    fn resume_intersection(&mut self, crossroad_id: CrossroadID) {
        let (duration, enabled) = self.intersections.advance_phase(&self.network, crossroad_id);
        self.calendar.record_crossroad(self.now(), crossroad_id, enabled);
        self.kernel.schedule(duration, TaskId::Intersection(crossroad_id));
    }
}

/// The node a lane drives towards: `way.to` for a forward lane, `way.from` for a backward one.
fn lane_end_node(network: &Network, lane: LaneID) -> Option<map_model::NodeID> {
    let l = network.lane(lane);
    let way = network.way(l.owning_way()?);
    Some(if l.is_forward { way.to } else { way.from })
}
