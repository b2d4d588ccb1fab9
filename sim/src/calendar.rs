//! The append-only event log and its binary encoding.
//!
//! Every entry is appended at the kernel's current `now`, and `now` only ever advances, so the
//! two sequences are already in timestamp order by construction -- no sort is needed before
//! packing.

use geom::{Distance, Speed, Time};
use map_model::{CarID, CrossroadID, LaneID, Network, Turn, WayID};

#[derive(Clone, Debug)]
pub struct CarEvent {
    pub time: Time,
    pub car: CarID,
    pub way: Option<WayID>,
    pub crossroad: Option<CrossroadID>,
    pub lane: LaneID,
    /// `round(position / lane.length * 100, 4)`, always non-negative.
    pub lane_percentage: f64,
    pub speed: Speed,
}

#[derive(Clone, Debug)]
pub struct CrossroadEvent {
    pub time: Time,
    pub crossroad: CrossroadID,
    pub enabled_lanes: Vec<LaneID>,
}

/// The two parallel append-only sequences: per-car position/speed samples and per-crossroad
/// phase transitions.
#[derive(Default)]
pub struct Calendar {
    pub car_events: Vec<CarEvent>,
    pub crossroad_events: Vec<CrossroadEvent>,
}

impl Calendar {
    pub fn new() -> Calendar {
        Calendar::default()
    }

    pub fn record_car(
        &mut self,
        time: Time,
        car: CarID,
        way: Option<WayID>,
        crossroad: Option<CrossroadID>,
        lane: LaneID,
        position: Distance,
        lane_length: Distance,
        speed: Speed,
    ) {
        let pct = if lane_length.inner_km() > 0.0 {
            (position.inner_km() / lane_length.inner_km() * 100.0).abs()
        } else {
            0.0
        };
        let rounded = (pct * 10_000.0).round() / 10_000.0;
        self.car_events.push(CarEvent {
            time,
            car,
            way,
            crossroad,
            lane,
            lane_percentage: rounded,
            speed,
        });
    }

    pub fn record_crossroad(&mut self, time: Time, crossroad: CrossroadID, enabled_lanes: Vec<LaneID>) {
        self.crossroad_events.push(CrossroadEvent {
            time,
            crossroad,
            enabled_lanes,
        });
    }

    /// Packs `self` and the static network it ran over into a big-endian binary blob: header
    /// counts, then nodes/ways/crossroads, then car events, then crossroad events. Kept
    /// independent of any transport: a thin wrapper could write these bytes to a socket just as
    /// easily as to a file.
    pub fn pack(&self, network: &Network) -> Vec<u8> {
        let mut out = Vec::new();

        let node_count = network.nodes.len() as u32;
        let way_count = network.ways.len() as u32;
        let crossroad_count = network.crossroads.len() as u32;
        let car_event_count = self.car_events.len() as u32;
        let crossroad_event_count = self.crossroad_events.len() as u32;

        write_u32(&mut out, node_count);
        write_u32(&mut out, way_count);
        write_u32(&mut out, crossroad_count);
        write_u32(&mut out, car_event_count);
        write_u32(&mut out, crossroad_event_count);

        for node in network.nodes.values() {
            write_u64(&mut out, node.id.0);
            write_f32(&mut out, node.point.lat as f32);
            write_f32(&mut out, node.point.lng as f32);
        }

        for way in &network.ways {
            write_u32(&mut out, way.id.0);
            write_u32(&mut out, way.max_speed.inner_kmh().round() as u32);
            let lane_ids: Vec<LaneID> = way.lanes.all().collect();
            write_u32(&mut out, lane_ids.len() as u32);
            for lane_id in lane_ids {
                write_lane(&mut out, network.lane(lane_id));
            }
        }

        for crossroad in &network.crossroads {
            let node = network.node(crossroad.node);
            write_u32(&mut out, crossroad.id.0);
            write_u64(&mut out, node.id.0);
            out.push(u8::from(node.has_traffic_light));
            write_f32(&mut out, node.point.lat as f32);
            write_f32(&mut out, node.point.lng as f32);
            write_u32(&mut out, crossroad.crossing_lanes.len() as u32);
            for c in &crossroad.crossing_lanes {
                write_lane(&mut out, network.lane(c.id));
            }
        }

        for ev in &self.car_events {
            write_f32(&mut out, ev.time.inner_seconds() as f32);
            write_u32(&mut out, ev.car.0);
            write_i32(&mut out, ev.way.map_or(-1, |w| w.0 as i32));
            write_i32(&mut out, ev.crossroad.map_or(-1, |c| c.0 as i32));
            write_u32(&mut out, ev.lane.0);
            write_f32(&mut out, ev.lane_percentage as f32);
            write_f32(&mut out, ev.speed.inner_kmh() as f32);
        }

        for ev in &self.crossroad_events {
            write_f32(&mut out, ev.time.inner_seconds() as f32);
            write_u32(&mut out, ev.crossroad.0);
            write_u32(&mut out, ev.enabled_lanes.len() as u32);
            for l in &ev.enabled_lanes {
                write_u32(&mut out, l.0);
            }
        }

        out
    }
}

fn write_lane(out: &mut Vec<u8>, lane: &map_model::Lane) {
    write_u32(out, lane.id.0);
    let pts = lane.polyline.points();
    write_u32(out, pts.len() as u32);
    let turns = lane.permitted_turns;
    out.push(u8::from(lane.is_forward));
    out.push(u8::from(turns.contains(Turn::None)));
    out.push(u8::from(turns.contains(Turn::Left)));
    out.push(u8::from(turns.contains(Turn::Right)));
    out.push(u8::from(turns.contains(Turn::Through)));
    out.push(u8::from(turns.contains(Turn::MergeToRight)));
    out.push(u8::from(turns.contains(Turn::MergeToLeft)));
    out.push(u8::from(turns.contains(Turn::SlightRight)));
    out.push(u8::from(turns.contains(Turn::SlightLeft)));
    for pt in pts {
        write_f32(out, pt.lat as f32);
        write_f32(out, pt.lng as f32);
    }
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}
fn write_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_be_bytes());
}
fn write_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_be_bytes());
}
fn write_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_percentage_is_rounded_and_nonnegative() {
        let mut cal = Calendar::new();
        cal.record_car(
            Time::seconds(1.0),
            CarID(0),
            None,
            None,
            LaneID(0),
            Distance::km(-0.012345678),
            Distance::km(1.0),
            Speed::ZERO,
        );
        assert_eq!(cal.car_events[0].lane_percentage, 1.2346);
    }
}
