use serde::{Deserialize, Serialize};

use geom::{Distance, PolyLine, Speed};

use crate::{HighwayClass, LaneID, NodeID, WayID};

/// The lanes of a [`Way`], split by direction of travel.
///
/// `forward` is ordered outer (rightmost in right-hand-drive) to inner lane; `backward` mirrors
/// it for traffic going the opposite way. A oneway way has an empty `backward` list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WayLanes {
    pub forward: Vec<LaneID>,
    pub backward: Vec<LaneID>,
}

impl WayLanes {
    pub fn all(&self) -> impl Iterator<Item = LaneID> + '_ {
        self.forward.iter().chain(self.backward.iter()).copied()
    }
}

/// A directed-by-orientation road segment between two endpoint Nodes.
///
/// Invariant: both `from`/`to` are endpoints of this way, and neither appears as an interior
/// point of any other way -- [`crate::network::load`] guarantees this by splitting at
/// construction time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Way {
    pub id: WayID,
    pub from: NodeID,
    pub to: NodeID,
    /// Polyline, including both endpoints.
    pub polyline: geom::PolyLine,
    pub max_speed: Speed,
    pub highway_class: HighwayClass,
    pub lanes: WayLanes,
}

impl Way {
    pub fn length(&self) -> Distance {
        self.polyline.length()
    }

    pub fn endpoints(&self) -> (NodeID, NodeID) {
        (self.from, self.to)
    }

    pub fn other_end(&self, n: NodeID) -> Option<NodeID> {
        if n == self.from {
            Some(self.to)
        } else if n == self.to {
            Some(self.from)
        } else {
            None
        }
    }

    /// Reconstructs the polyline a lane along this way walks, oriented in the direction of
    /// travel: forward lanes walk `from -> to`, backward lanes walk `to -> from`.
    pub fn lane_polyline(&self, is_forward: bool) -> PolyLine {
        if is_forward {
            self.polyline.clone()
        } else {
            self.polyline.reversed()
        }
    }
}
