use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use geom::Angle;

use crate::{CrossroadID, LaneID, NodeID, TurnDirection, WayID};

/// Which of a Way's three possible neighbors (relative to that Way, at one Crossroad) every
/// other incident Way was classified as. At most one Way occupies each slot; ties are resolved
/// during classification (see [`classify_incident_ways`]).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossroadTurn {
    pub through: Option<WayID>,
    pub left: Option<WayID>,
    pub right: Option<WayID>,
}

/// A short internal Lane that connects the end of one incident Way's lane to the start of
/// another, carrying the blocking/capacity machinery that serializes conflicting movements.
///
/// The runtime holder-count and `disabled` flag live in `sim::intersection`, not here: this
/// struct only records the static topology a conflict-set query needs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CrossingLaneInfo {
    pub id: LaneID,
    pub from_way: WayID,
    pub from_lane: LaneID,
    pub to_way: WayID,
    pub to_lane: LaneID,
    /// Index of `to_lane` within its way's same-direction lane list (0 = outer/rightmost),
    /// used to compare "strictly to the left/right of t" in the conflict policy.
    pub to_lane_index: usize,
}

/// The intersection at a Node with more than one incident Way.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Crossroad {
    pub id: CrossroadID,
    pub node: NodeID,
    pub incident_ways: Vec<WayID>,
    pub classification: BTreeMap<WayID, CrossroadTurn>,
    /// The incident Ways sharing the highest-priority highway class, only populated if at most
    /// two such Ways exist (see the `main_way` glossary entry).
    pub main_ways: Vec<WayID>,
    pub crossing_lanes: Vec<CrossingLaneInfo>,
}

impl Crossroad {
    pub fn through_of(&self, way: WayID) -> Option<WayID> {
        self.classification.get(&way).and_then(|t| t.through)
    }

    pub fn left_of(&self, way: WayID) -> Option<WayID> {
        self.classification.get(&way).and_then(|t| t.left)
    }

    pub fn right_of(&self, way: WayID) -> Option<WayID> {
        self.classification.get(&way).and_then(|t| t.right)
    }

    pub fn is_main_way(&self, way: WayID) -> bool {
        self.main_ways.contains(&way)
    }

    /// Classifies `to` relative to `from`. `None` covers both "too acute to classify" and the
    /// U-turn case `from == to`.
    pub fn classify(&self, from: WayID, to: WayID) -> TurnDirection {
        if from == to {
            return TurnDirection::None;
        }
        match self.classification.get(&from) {
            Some(t) if t.through == Some(to) => TurnDirection::Through,
            Some(t) if t.left == Some(to) => TurnDirection::Left,
            Some(t) if t.right == Some(to) => TurnDirection::Right,
            _ => TurnDirection::None,
        }
    }

    pub fn crossing_lane(&self, id: LaneID) -> Option<&CrossingLaneInfo> {
        self.crossing_lanes.iter().find(|c| c.id == id)
    }

    pub fn crossing_lanes_from(&self, way: WayID) -> impl Iterator<Item = &CrossingLaneInfo> {
        self.crossing_lanes.iter().filter(move |c| c.from_way == way)
    }

    /// The conflict set for a traversal of `x`: every other Crossing Lane that must be clear
    /// before `x` may be entered, per the crossroad's conflict policy.
    pub fn conflict_set(&self, x: &CrossingLaneInfo) -> Vec<LaneID> {
        let d = self.classify(x.from_way, x.to_way);
        if d == TurnDirection::None {
            return Vec::new();
        }
        let right_way = self.right_of(x.from_way);
        let left_way = self.left_of(x.from_way);
        let through_way = self.through_of(x.from_way);

        let ends_in_t = |c: &CrossingLaneInfo| c.to_lane == x.to_lane;
        let ends_left_of_t =
            |c: &CrossingLaneInfo| c.to_way == x.to_way && c.to_lane_index > x.to_lane_index;
        let ends_right_of_t =
            |c: &CrossingLaneInfo| c.to_way == x.to_way && c.to_lane_index < x.to_lane_index;
        let originates_in = |c: &CrossingLaneInfo, w: Option<WayID>| Some(c.from_way) == w;
        let ends_in_way = |c: &CrossingLaneInfo, w: Option<WayID>| Some(c.to_way) == w;

        let mut out = Vec::new();
        for c in &self.crossing_lanes {
            if c.id == x.id || c.from_lane == x.from_lane {
                // Excludes the traversal itself and any other destination reachable from the
                // same from_lane: those are serialized by the lane's own FIFO queue already.
                continue;
            }
            let conflicts = match d {
                TurnDirection::Through => {
                    ends_in_t(c)
                        || originates_in(c, right_way)
                        || (originates_in(c, left_way)
                            && (ends_in_way(c, right_way) || ends_left_of_t(c)))
                        || (originates_in(c, through_way) && ends_in_way(c, right_way))
                }
                TurnDirection::Left => {
                    ends_in_t(c)
                        || (originates_in(c, right_way)
                            && (c.to_way == x.from_way || ends_left_of_t(c)))
                        || (originates_in(c, left_way)
                            && left_way
                                .map(|lw| matches!(
                                    self.classify(lw, c.to_way),
                                    TurnDirection::Through | TurnDirection::Right
                                ))
                                .unwrap_or(false))
                        || (originates_in(c, through_way)
                            && (c.to_way == x.from_way || ends_left_of_t(c)))
                }
                TurnDirection::Right => ends_in_t(c) || ends_right_of_t(c),
                TurnDirection::None => false,
            };
            if conflicts {
                out.push(c.id);
            }
        }
        out
    }
}

/// Classifies every incident way's neighbors into a through/left/right slot, returning the
/// per-way classification map.
///
/// `bearings` is `(way, bearing from the node towards that way's second point)`, in the same
/// order as the crossroad's `incident_ways`.
pub fn classify_incident_ways(bearings: &[(WayID, Angle)]) -> BTreeMap<WayID, CrossroadTurn> {
    let mut out = BTreeMap::new();
    for (i, &(wi, theta_i)) in bearings.iter().enumerate() {
        let neighbors: Vec<(WayID, f64)> = bearings
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, &(wj, theta_j))| (wj, theta_i.signed_delta_to(theta_j)))
            .collect();

        if neighbors.len() == 1 {
            // A lone neighbor is always "through", regardless of the angle bin.
            out.insert(
                wi,
                CrossroadTurn {
                    through: Some(neighbors[0].0),
                    left: None,
                    right: None,
                },
            );
            continue;
        }

        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Bin {
            Right,
            Through,
            Left,
        }
        fn bin_of(delta: f64) -> Option<Bin> {
            if (20.0..135.0).contains(&delta) {
                Some(Bin::Right)
            } else if (135.0..225.0).contains(&delta) {
                Some(Bin::Through)
            } else if (225.0..=340.0).contains(&delta) {
                Some(Bin::Left)
            } else {
                None
            }
        }

        let mut by_bin: BTreeMap<u8, Vec<(WayID, f64)>> = BTreeMap::new();
        for (wj, delta) in neighbors {
            let key = match bin_of(delta) {
                Some(Bin::Right) => 0,
                Some(Bin::Through) => 1,
                Some(Bin::Left) => 2,
                None => continue,
            };
            by_bin.entry(key).or_default().push((wj, delta));
        }

        let mut turn = CrossroadTurn::default();
        // Process the Through bin (key 1) first so a multi-member Through bin always claims
        // "through" -- the claim must be tied to bin identity, not to which bin happens to be
        // processed first.
        for key in [1u8, 0, 2] {
            let members = match by_bin.remove(&key) {
                Some(m) => m,
                None => continue,
            };
            if members.len() == 1 {
                let (wj, delta) = members[0];
                assign(&mut turn, wj, delta);
            } else if key == 1 {
                // Multiple through-bin candidates: whichever is closest to 180 degrees (dead
                // ahead) claims "through"; the rest split left/right by which side of 180 they
                // fall on.
                let mut sorted = members;
                sorted.sort_by(|a, b| {
                    (a.1 - 180.0)
                        .abs()
                        .partial_cmp(&(b.1 - 180.0).abs())
                        .unwrap()
                });
                turn.through.get_or_insert(sorted[0].0);
                for &(wj, delta) in &sorted[1..] {
                    if delta < 180.0 {
                        turn.right.get_or_insert(wj);
                    } else {
                        turn.left.get_or_insert(wj);
                    }
                }
            } else {
                // Multiple candidates landed in the same left/right bin; the slot only holds
                // one way, so the one closest to dead-ahead claims it and the rest are left
                // unclassified.
                let mut sorted = members;
                sorted.sort_by(|a, b| {
                    (a.1 - 180.0)
                        .abs()
                        .partial_cmp(&(b.1 - 180.0).abs())
                        .unwrap()
                });
                let (wj, delta) = sorted[0];
                assign(&mut turn, wj, delta);
            }
        }
        out.insert(wi, turn);
    }
    out
}

fn assign(turn: &mut CrossroadTurn, way: WayID, delta: f64) {
    if (20.0..135.0).contains(&delta) {
        turn.right.get_or_insert(way);
    } else if (135.0..225.0).contains(&delta) {
        turn.through.get_or_insert(way);
    } else if (225.0..=340.0).contains(&delta) {
        turn.left.get_or_insert(way);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_neighbor_promotes_to_through() {
        let bearings = vec![(WayID(0), Angle::degrees(0.0)), (WayID(1), Angle::degrees(170.0))];
        let result = classify_incident_ways(&bearings);
        assert_eq!(result[&WayID(0)].through, Some(WayID(1)));
        assert_eq!(result[&WayID(1)].through, Some(WayID(0)));
    }

    #[test]
    fn four_way_classifies_all_three_slots() {
        // North, East, South, West incoming bearings (from the crossroad towards each way).
        let bearings = vec![
            (WayID(0), Angle::degrees(0.0)),
            (WayID(1), Angle::degrees(90.0)),
            (WayID(2), Angle::degrees(180.0)),
            (WayID(3), Angle::degrees(270.0)),
        ];
        let result = classify_incident_ways(&bearings);
        let north = result[&WayID(0)];
        assert_eq!(north.right, Some(WayID(1)));
        assert_eq!(north.through, Some(WayID(2)));
        assert_eq!(north.left, Some(WayID(3)));
    }

    #[test]
    fn through_bin_wins_the_through_slot_even_with_a_crowded_right_bin() {
        // Self at 0 degrees; neighbors at 50 (right), 100 (right), 180 (through), 300 (left).
        // The Right bin has two members and is keyed lower than the Through bin, so a
        // first-bin-wins tie-break would wrongly hand "through" to the 100-degree way.
        let bearings = vec![
            (WayID(0), Angle::degrees(0.0)),
            (WayID(1), Angle::degrees(50.0)),
            (WayID(2), Angle::degrees(100.0)),
            (WayID(3), Angle::degrees(180.0)),
            (WayID(4), Angle::degrees(300.0)),
        ];
        let result = classify_incident_ways(&bearings);
        let self_way = result[&WayID(0)];
        assert_eq!(self_way.through, Some(WayID(3)));
        assert_eq!(self_way.left, Some(WayID(4)));
        assert_eq!(self_way.right, Some(WayID(2)));
    }
}
