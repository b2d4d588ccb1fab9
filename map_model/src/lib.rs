//! The static road network: nodes, ways, lanes and crossroads, assembled once from a prepared
//! OSM-derived source file and immutable for the rest of a simulation run.

mod crossroad;
mod ids;
mod lane;
mod network;
mod node;
mod raw;
mod tags;
mod turn;
mod way;

pub use crate::crossroad::{classify_incident_ways, Crossroad, CrossingLaneInfo, CrossroadTurn};
pub use crate::ids::{CarID, CrossroadID, LaneID, NodeID, WayID};
pub use crate::lane::{Lane, LaneParent};
pub use crate::network::{load, Network, CROSSING_LANE_CAPACITY, DEFAULT_MAX_SPEED_KMH};
pub use crate::node::Node;
pub use crate::raw::{RawNetwork, RawNode, RawWay, WayStub};
pub use crate::tags::Tags;
pub use crate::turn::{HighwayClass, Turn, TurnDirection, TurnSet};
pub use crate::way::{Way, WayLanes};
