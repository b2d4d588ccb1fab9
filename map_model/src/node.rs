use serde::{Deserialize, Serialize};

use geom::Pt2D;

use crate::{NodeID, WayID};

/// A point in the network graph: either a plain vertex along a way, or a crossroad if it's
/// incident to more than one way (or was split into one, see network assembly).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeID,
    pub point: Pt2D,
    pub has_traffic_light: bool,
    pub incident_ways: Vec<WayID>,
}

impl Node {
    /// A crossroad forms at any node incident to more than one way, or explicitly at a dead end
    /// that the source network file marked as lit (traffic lights never sit mid-way).
    pub fn is_crossroad(&self) -> bool {
        self.incident_ways.len() > 1
    }
}
