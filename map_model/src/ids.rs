use std::fmt;

use serde::{Deserialize, Serialize};

/// A node's id is taken verbatim from the source network file, not reassigned, so that the
/// loader's dangling-reference checks can talk about the same identifiers the file does.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeID(pub u64);

/// Ways, lanes, and crossroads are assigned fresh, dense ids during assembly (including the
/// extra ways created by splitting), so these are plain arena indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WayID(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneID(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CrossroadID(pub u32);

/// Cars are a simulation concept, not a network one -- `Lane` has no queue field, and the actual
/// per-lane ordering lives in `sim::driving::Queue`. The id type itself is defined here anyway,
/// alongside the rest of this crate's entity ids, so `sim` can pull it in without this crate
/// having to depend back on `sim`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CarID(pub u32);

macro_rules! impl_display {
    ($ty:ident, $prefix:expr) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

impl_display!(NodeID, "Node #");
impl_display!(WayID, "Way #");
impl_display!(LaneID, "Lane #");
impl_display!(CrossroadID, "Crossroad #");
