use serde::{Deserialize, Serialize};

use geom::{Distance, PolyLine};

use crate::{CrossroadID, LaneID, Turn, TurnSet, WayID};

/// What a lane belongs to: an ordinary Way lane, or one of a Crossroad's internal Crossing
/// Lanes (see [`crate::crossroad::Crossroad`]).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LaneParent {
    Way(WayID),
    Crossroad(CrossroadID),
}

/// A single lane: a polyline cars walk along, plus the turn tokens permitted out of its end.
///
/// Lanes are immutable network topology. The ordered sequence of cars currently occupying a
/// lane ("the queue") is simulation state, not network state, and lives in `sim::driving::Queue`
/// instead -- keeping this crate's data free of anything a running simulation mutates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneID,
    pub parent: LaneParent,
    pub polyline: PolyLine,
    pub is_forward: bool,
    /// Empty means "any turn permitted".
    pub permitted_turns: TurnSet,
    pub left: Option<LaneID>,
    pub right: Option<LaneID>,
}

impl Lane {
    pub fn length(&self) -> Distance {
        self.polyline.length()
    }

    pub fn allows_turn(&self, turn: Turn) -> bool {
        self.permitted_turns.is_empty() || self.permitted_turns.contains(turn)
    }

    pub fn owning_way(&self) -> Option<WayID> {
        match self.parent {
            LaneParent::Way(w) => Some(w),
            LaneParent::Crossroad(_) => None,
        }
    }

    pub fn owning_crossroad(&self) -> Option<CrossroadID> {
        match self.parent {
            LaneParent::Crossroad(c) => Some(c),
            LaneParent::Way(_) => None,
        }
    }
}
