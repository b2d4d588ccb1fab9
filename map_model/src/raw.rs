use serde::{Deserialize, Serialize};

use geom::Pt2D;

use crate::{NodeID, Tags};

/// A node as the prepared network file states it, before assembly resolves crossroads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeID,
    pub point: Pt2D,
    #[serde(default)]
    pub tags: Tags,
}

impl RawNode {
    pub fn has_traffic_light(&self) -> bool {
        self.tags.is("highway", "traffic_signals")
    }
}

/// A way as the prepared network file states it: an ordered list of node ids plus the OSM tag
/// vocabulary the loader consumes (`maxspeed`, `lanes`, `lanes:forward`, `lanes:backward`,
/// `oneway`, `turn:lanes:forward`, `turn:lanes:backward`, `psv:lanes:*`, `railway:lanes:*`,
/// `highway`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawWay {
    pub id: WayStub,
    pub nodes: Vec<NodeID>,
    #[serde(default)]
    pub tags: Tags,
}

/// The preprocessor assigns ways a provisional id in the source file; the loader discards it and
/// assigns fresh, dense [`crate::WayID`]s during assembly (splitting multiplies ways 1-to-N), so
/// this is only kept around for error messages while loading.
pub type WayStub = u64;

/// The document produced by the out-of-scope map-extraction preprocessor: a flat stream of
/// nodes followed by a flat stream of ways.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawNetwork {
    pub nodes: Vec<RawNode>,
    pub ways: Vec<RawWay>,
}
