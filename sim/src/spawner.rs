//! The Vehicle Spawner: initial fleet placement, and on-despawn replacement so the fleet size
//! stays constant for the whole run.

use rand::Rng;
use rand_xorshift::XorShiftRng;

use geom::{Distance, Speed};
use map_model::{LaneID, Network, WayID};

use crate::constants::{SPAWN_DESIRED_SPEED_KMH_RANGE, SPAWN_LENGTH_KM_RANGE, SPAWN_POSITION_PCT_RANGE};

/// One freshly chosen vehicle, not yet wired into a `Car` or the driving queues.
pub struct SpawnChoice {
    pub way: WayID,
    pub lane: LaneID,
    pub position: Distance,
    pub desired_speed: Speed,
    pub length: Distance,
}

/// Draws a uniformly random Way with at least one lane, a uniformly random lane on it, a
/// uniformly random position within `SPAWN_POSITION_PCT_RANGE` of that lane's length, and a
/// uniformly random desired speed and vehicle length -- in that fixed order, so the seeded
/// stream this consumes is reproducible run to run.
pub fn choose_spawn(network: &Network, rng: &mut XorShiftRng) -> SpawnChoice {
    let candidates: Vec<&map_model::Way> = network
        .ways
        .iter()
        .filter(|w| w.lanes.forward.iter().chain(w.lanes.backward.iter()).next().is_some())
        .collect();
    assert!(!candidates.is_empty(), "network has no way with any lane");
    let way = candidates[rng.gen_range(0..candidates.len())];

    let lanes: Vec<LaneID> = way.lanes.all().collect();
    let lane_id = lanes[rng.gen_range(0..lanes.len())];
    let lane_len = network.lane(lane_id).length();

    let pct = rng.gen_range(SPAWN_POSITION_PCT_RANGE.0..=SPAWN_POSITION_PCT_RANGE.1);
    let position = lane_len * pct;

    let desired_speed = Speed::km_per_hour(
        rng.gen_range(SPAWN_DESIRED_SPEED_KMH_RANGE.0..=SPAWN_DESIRED_SPEED_KMH_RANGE.1),
    );
    let length = Distance::km(rng.gen_range(SPAWN_LENGTH_KM_RANGE.0..=SPAWN_LENGTH_KM_RANGE.1));

    SpawnChoice {
        way: way.id,
        lane: lane_id,
        position,
        desired_speed,
        length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstutil::seeded_rng;
    use geom::Pt2D;

    fn tiny_network() -> Network {
        let raw = map_model::RawNetwork {
            nodes: vec![
                map_model::RawNode {
                    id: map_model::NodeID(0),
                    point: Pt2D::new(0.0, 0.0),
                    tags: map_model::Tags::default(),
                },
                map_model::RawNode {
                    id: map_model::NodeID(1),
                    point: Pt2D::new(0.0, 0.01),
                    tags: map_model::Tags::default(),
                },
            ],
            ways: vec![map_model::RawWay {
                id: 0,
                nodes: vec![map_model::NodeID(0), map_model::NodeID(1)],
                tags: map_model::Tags::default(),
            }],
        };
        map_model::load(raw).unwrap()
    }

    #[test]
    fn spawn_picks_a_lane_with_a_valid_position() {
        let network = tiny_network();
        let mut rng = seeded_rng(42);
        let choice = choose_spawn(&network, &mut rng);
        let lane = network.lane(choice.lane);
        assert_eq!(lane.owning_way(), Some(choice.way));
        assert!(choice.position.inner_km() >= 0.0);
        assert!(choice.position.inner_km() <= lane.length().inner_km());
    }
}
