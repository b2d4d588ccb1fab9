use std::collections::{BTreeMap, HashMap, HashSet};

use abstutil::Warn;
use geom::{Angle, Distance, PolyLine, Pt2D, Speed};

use crate::crossroad::{classify_incident_ways, CrossingLaneInfo};
use crate::{
    Crossroad, CrossroadID, HighwayClass, Lane, LaneID, LaneParent, Node, NodeID, RawNetwork,
    RawNode, RawWay, Tags, Turn, TurnSet, Way, WayID, WayLanes,
};

/// Default speed limit (km/h) for a way whose `maxspeed` tag is missing or unparseable.
pub const DEFAULT_MAX_SPEED_KMH: f64 = 50.0;
/// How many cars may concurrently hold a single Crossing Lane.
pub const CROSSING_LANE_CAPACITY: usize = 5;

/// The assembled, immutable road network: arenas of Nodes, Ways, Lanes and Crossroads, indexed
/// by the dense ids assigned during assembly.
pub struct Network {
    pub nodes: BTreeMap<NodeID, Node>,
    pub ways: Vec<Way>,
    pub lanes: Vec<Lane>,
    pub crossroads: Vec<Crossroad>,
    node_to_crossroad: HashMap<NodeID, CrossroadID>,
}

impl Network {
    pub fn way(&self, id: WayID) -> &Way {
        &self.ways[id.0 as usize]
    }

    pub fn lane(&self, id: LaneID) -> &Lane {
        &self.lanes[id.0 as usize]
    }

    pub fn crossroad(&self, id: CrossroadID) -> &Crossroad {
        &self.crossroads[id.0 as usize]
    }

    pub fn node(&self, id: NodeID) -> &Node {
        &self.nodes[&id]
    }

    pub fn crossroad_at(&self, node: NodeID) -> Option<&Crossroad> {
        self.node_to_crossroad
            .get(&node)
            .map(|&id| self.crossroad(id))
    }

    pub fn crossroad_id_at(&self, node: NodeID) -> Option<CrossroadID> {
        self.node_to_crossroad.get(&node).copied()
    }
}

/// Deserializes and assembles a prepared road network. Source-data defects are repaired to
/// documented defaults and recorded as warnings rather than surfaced as an error.
pub fn load(raw: RawNetwork) -> Warn<Network> {
    let mut warnings = Vec::new();

    let mut nodes: BTreeMap<NodeID, Node> = BTreeMap::new();
    let mut points: HashMap<NodeID, Pt2D> = HashMap::new();
    for raw_node in &raw.nodes {
        points.insert(raw_node.id, raw_node.point);
        nodes.insert(
            raw_node.id,
            Node {
                id: raw_node.id,
                point: raw_node.point,
                has_traffic_light: raw_node.has_traffic_light(),
                incident_ways: Vec::new(),
            },
        );
    }

    // Pass 1: resolve each raw way's lane configuration and keep its full node-id polyline.
    let mut parsed: Vec<ParsedWay> = Vec::new();
    for raw_way in &raw.ways {
        if raw_way.nodes.len() < 2 {
            warnings.push(format!(
                "way {} has fewer than 2 nodes, dropping",
                raw_way.id
            ));
            continue;
        }
        if raw_way.nodes.iter().any(|n| !points.contains_key(n)) {
            warnings.push(format!(
                "way {} references a dangling node, dropping",
                raw_way.id
            ));
            continue;
        }
        let oneway = raw_way.tags.is("oneway", "yes") || raw_way.tags.is("oneway", "1");
        let max_speed = raw_way.tags.get_f64("maxspeed").unwrap_or_else(|| {
            warnings.push(format!(
                "way {} has no usable maxspeed, defaulting to {}",
                raw_way.id, DEFAULT_MAX_SPEED_KMH
            ));
            DEFAULT_MAX_SPEED_KMH
        });
        let highway_class = raw_way
            .tags
            .get("highway")
            .and_then(HighwayClass::parse)
            .unwrap_or_else(|| {
                warnings.push(format!(
                    "way {} has unknown highway class, defaulting to tertiary",
                    raw_way.id
                ));
                HighwayClass::Tertiary
            });
        let lane_config = resolve_lane_config(&raw_way.tags, oneway);

        parsed.push(ParsedWay {
            nodes: raw_way.nodes.clone(),
            max_speed: Speed::km_per_hour(max_speed),
            highway_class,
            lane_config,
        });
    }

    // Pass 2: find every node that must become a crossroad -- an endpoint of 2+ ways, or an
    // interior point of one way that's also an endpoint of another.
    let mut endpoint_count: HashMap<NodeID, usize> = HashMap::new();
    let mut interior_nodes: HashSet<NodeID> = HashSet::new();
    for way in &parsed {
        *endpoint_count.entry(way.nodes[0]).or_insert(0) += 1;
        *endpoint_count.entry(*way.nodes.last().unwrap()).or_insert(0) += 1;
        for &n in &way.nodes[1..way.nodes.len() - 1] {
            interior_nodes.insert(n);
        }
    }
    let crossroad_nodes: HashSet<NodeID> = endpoint_count
        .iter()
        .filter(|(_, &count)| count >= 2)
        .map(|(&n, _)| n)
        .chain(
            interior_nodes
                .iter()
                .filter(|n| endpoint_count.contains_key(n))
                .copied(),
        )
        .collect();

    // Pass 3: split each way at every interior crossroad node, and assign final dense WayIDs.
    let mut ways: Vec<Way> = Vec::new();
    let mut way_lane_configs: Vec<LaneConfig> = Vec::new();
    for way in &parsed {
        for segment_nodes in split_at(&way.nodes, &crossroad_nodes) {
            let id = WayID(ways.len() as u32);
            let pts: Vec<Pt2D> = segment_nodes.iter().map(|n| points[n]).collect();
            ways.push(Way {
                id,
                from: segment_nodes[0],
                to: *segment_nodes.last().unwrap(),
                polyline: PolyLine::new(pts),
                max_speed: way.max_speed,
                highway_class: way.highway_class,
                lanes: WayLanes::default(),
            });
            // The split portions all preserve the original's lane configuration; stash it so
            // pass 4 can build lanes without re-deriving anything.
            way_lane_configs.push(way.lane_config.clone());
        }
    }

    // Pass 4: build the Lane arena for every way, and link left/right neighbors.
    let mut lanes: Vec<Lane> = Vec::new();
    for (way, config) in ways.iter_mut().zip(way_lane_configs.iter()) {
        way.lanes.forward = build_lanes(way.id, way, config, true, &mut lanes);
        way.lanes.backward = build_lanes(way.id, way, config, false, &mut lanes);
    }

    // Pass 5: every way endpoint is incident to its node.
    for way in &ways {
        nodes.get_mut(&way.from).unwrap().incident_ways.push(way.id);
        nodes.get_mut(&way.to).unwrap().incident_ways.push(way.id);
    }

    // Pass 6: build a Crossroad for every node with more than one incident way.
    let mut crossroads: Vec<Crossroad> = Vec::new();
    let mut node_to_crossroad: HashMap<NodeID, CrossroadID> = HashMap::new();
    for (&node_id, node) in &nodes {
        if node.incident_ways.len() <= 1 {
            continue;
        }
        let crossroad_id = CrossroadID(crossroads.len() as u32);
        node_to_crossroad.insert(node_id, crossroad_id);

        let bearings: Vec<(WayID, Angle)> = node
            .incident_ways
            .iter()
            .map(|&w| (w, bearing_from_node(&ways[w.0 as usize], node_id, node.point)))
            .collect();
        let classification = classify_incident_ways(&bearings);

        let main_ways = compute_main_ways(&node.incident_ways, &ways);

        crossroads.push(Crossroad {
            id: crossroad_id,
            node: node_id,
            incident_ways: node.incident_ways.clone(),
            classification,
            main_ways,
            crossing_lanes: Vec::new(),
        });
    }

    // Pass 7: generate internal Crossing Lanes and their conflict-model metadata.
    for crossroad in &mut crossroads {
        let node = &nodes[&crossroad.node];
        let mut crossing_lanes = Vec::new();
        for &from_way in &crossroad.incident_ways {
            for &to_way in &crossroad.incident_ways {
                let from_way_ref = &ways[from_way.0 as usize];
                let to_way_ref = &ways[to_way.0 as usize];
                let arriving = arriving_lanes(from_way_ref, node.id);
                let departing = departing_lanes(to_way_ref, node.id);
                if arriving.is_empty() || departing.is_empty() {
                    continue;
                }
                let direction = crossroad.classify(from_way, to_way);
                let wanted_turn = match direction {
                    crate::TurnDirection::Through => Some(Turn::Through),
                    crate::TurnDirection::Left => Some(Turn::Left),
                    crate::TurnDirection::Right => Some(Turn::Right),
                    crate::TurnDirection::None if from_way == to_way => Some(Turn::None),
                    crate::TurnDirection::None => None,
                };
                let wanted_turn = match wanted_turn {
                    Some(t) => t,
                    None => continue,
                };
                for &from_lane in arriving {
                    if !lanes[from_lane.0 as usize].allows_turn(wanted_turn) {
                        continue;
                    }
                    for (to_index, &to_lane) in departing.iter().enumerate() {
                        let id = LaneID(lanes.len() as u32);
                        let polyline = PolyLine::new(vec![
                            lanes[from_lane.0 as usize].polyline.last_pt(),
                            lanes[to_lane.0 as usize].polyline.first_pt(),
                        ]);
                        lanes.push(Lane {
                            id,
                            parent: LaneParent::Crossroad(crossroad.id),
                            polyline,
                            is_forward: true,
                            permitted_turns: TurnSet::empty(),
                            left: None,
                            right: None,
                        });
                        crossing_lanes.push(CrossingLaneInfo {
                            id,
                            from_way,
                            from_lane,
                            to_way,
                            to_lane,
                            to_lane_index: to_index,
                        });
                    }
                }
            }
        }
        crossroad.crossing_lanes = crossing_lanes;
    }

    Warn::warnings(
        Network {
            nodes,
            ways,
            lanes,
            crossroads,
            node_to_crossroad,
        },
        warnings,
    )
}

struct ParsedWay {
    nodes: Vec<NodeID>,
    max_speed: Speed,
    highway_class: HighwayClass,
    lane_config: LaneConfig,
}

#[derive(Clone)]
struct LaneConfig {
    forward_count: usize,
    backward_count: usize,
    forward_turns: Vec<TurnSet>,
    backward_turns: Vec<TurnSet>,
}

fn resolve_lane_config(tags: &Tags, oneway: bool) -> LaneConfig {
    let total = tags.get_usize("lanes");
    let explicit_forward = tags.get_usize("lanes:forward");
    let explicit_backward = tags.get_usize("lanes:backward");

    let (mut forward, mut backward) = match (explicit_forward, explicit_backward) {
        (Some(f), Some(b)) => (f, b),
        (Some(f), None) => {
            let t = total.unwrap_or(if oneway { f } else { f * 2 });
            (f, if oneway { 0 } else { t.saturating_sub(f) })
        }
        (None, Some(b)) => {
            let t = total.unwrap_or(if oneway { b } else { b * 2 });
            (t.saturating_sub(b), b)
        }
        (None, None) => {
            let t = total.unwrap_or(if oneway { 1 } else { 2 });
            if oneway {
                (t, 0)
            } else {
                let f = t - t / 2;
                (f, t - f)
            }
        }
    };

    let psv_f = tags.get_usize("psv:lanes:forward").unwrap_or(0);
    let psv_b = tags.get_usize("psv:lanes:backward").unwrap_or(0);
    let rail_f = tags.get_usize("railway:lanes:forward").unwrap_or(0);
    let rail_b = tags.get_usize("railway:lanes:backward").unwrap_or(0);
    forward = forward.saturating_sub(psv_f + rail_f).max(1);
    backward = if oneway {
        0
    } else {
        backward.saturating_sub(psv_b + rail_b)
    };

    LaneConfig {
        forward_turns: parse_turn_list(tags.get("turn:lanes:forward"), forward),
        backward_turns: parse_turn_list(tags.get("turn:lanes:backward"), backward),
        forward_count: forward,
        backward_count: backward,
    }
}

/// `turn:lanes:*` lists lanes left-to-right in the direction of travel, i.e. outer lane last;
/// reverse it so index 0 is the outer lane, matching [`crate::WayLanes`]'s convention.
fn parse_turn_list(raw: Option<&str>, count: usize) -> Vec<TurnSet> {
    let mut list: Vec<TurnSet> = match raw {
        Some(s) => s.split('|').map(parse_lane_turns).collect(),
        None => Vec::new(),
    };
    list.reverse();
    list.truncate(count);
    while list.len() < count {
        list.push(TurnSet::empty());
    }
    list
}

fn parse_lane_turns(segment: &str) -> TurnSet {
    let mut set = TurnSet::empty();
    for tok in segment.split(';') {
        set |= single_turn_token(tok.trim());
    }
    set
}

fn single_turn_token(tok: &str) -> TurnSet {
    match tok {
        "none" => TurnSet::only(Turn::None),
        "left" => TurnSet::only(Turn::Left),
        "right" => TurnSet::only(Turn::Right),
        "through" | "straight" => TurnSet::only(Turn::Through),
        "slight_left" | "merge_to_left" => Turn::Through | Turn::Left,
        "slight_right" | "merge_to_right" => Turn::Through | Turn::Right,
        _ => TurnSet::empty(),
    }
}

/// Splits a way's node-id polyline at every interior node that's in `crossroad_nodes`.
fn split_at(nodes: &[NodeID], crossroad_nodes: &HashSet<NodeID>) -> Vec<Vec<NodeID>> {
    let mut segments = Vec::new();
    let mut current = vec![nodes[0]];
    for &n in &nodes[1..] {
        current.push(n);
        let is_last = n == *nodes.last().unwrap();
        if !is_last && crossroad_nodes.contains(&n) {
            segments.push(std::mem::replace(&mut current, vec![n]));
        }
    }
    segments.push(current);
    segments
}

fn build_lanes(
    way_id: WayID,
    way: &Way,
    config: &LaneConfig,
    forward: bool,
    lanes: &mut Vec<Lane>,
) -> Vec<LaneID> {
    let (count, turns) = if forward {
        (config.forward_count, &config.forward_turns)
    } else {
        (config.backward_count, &config.backward_turns)
    };
    if count == 0 {
        return Vec::new();
    }
    let polyline = way.lane_polyline(forward);
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = LaneID(lanes.len() as u32);
        lanes.push(Lane {
            id,
            parent: LaneParent::Way(way_id),
            polyline: polyline.clone(),
            is_forward: forward,
            permitted_turns: turns.get(i).copied().unwrap_or_else(TurnSet::empty),
            left: None,
            right: None,
        });
        ids.push(id);
    }
    for i in 0..ids.len() {
        if i + 1 < ids.len() {
            lanes[ids[i].0 as usize].left = Some(ids[i + 1]);
            lanes[ids[i + 1].0 as usize].right = Some(ids[i]);
        }
    }
    ids
}

fn bearing_from_node(way: &Way, node: NodeID, node_point: Pt2D) -> Angle {
    let pts = way.polyline.points();
    let adjacent = if node == way.from {
        pts[1]
    } else {
        pts[pts.len() - 2]
    };
    node_point.bearing_to(adjacent)
}

fn compute_main_ways(incident_ways: &[WayID], ways: &[Way]) -> Vec<WayID> {
    let best = incident_ways
        .iter()
        .map(|&w| ways[w.0 as usize].highway_class)
        .min();
    let best = match best {
        Some(b) => b,
        None => return Vec::new(),
    };
    let tied: Vec<WayID> = incident_ways
        .iter()
        .copied()
        .filter(|&w| ways[w.0 as usize].highway_class == best)
        .collect();
    if tied.len() <= 2 {
        tied
    } else {
        Vec::new()
    }
}

fn arriving_lanes(way: &Way, node: NodeID) -> &[LaneID] {
    if way.to == node {
        &way.lanes.forward
    } else if way.from == node {
        &way.lanes.backward
    } else {
        &[]
    }
}

fn departing_lanes(way: &Way, node: NodeID) -> &[LaneID] {
    if way.from == node {
        &way.lanes.forward
    } else if way.to == node {
        &way.lanes.backward
    } else {
        &[]
    }
}
