use enumset::EnumSetType;
use serde::{Deserialize, Serialize};

/// A turn token permitted from a lane, taken from OSM's `turn:lanes:*` vocabulary.
///
/// `slight_left`/`slight_right` and the `merge_*` variants are folded into the plain
/// `through`/`left`/`right` tokens during loading (see `network::single_turn_token`, which maps
/// each raw token, and `network::parse_lane_turns`, which combines a lane's tokens into a
/// [`TurnSet`]); nothing downstream needs to distinguish a slight turn from a sharp one.
#[derive(EnumSetType, Debug, Serialize, Deserialize, Hash)]
#[enumset(serialize_as_list)]
pub enum Turn {
    None,
    Left,
    Right,
    Through,
    MergeToRight,
    MergeToLeft,
    SlightRight,
    SlightLeft,
}

pub type TurnSet = enumset::EnumSet<Turn>;

/// An OSM `highway` value's relative priority. Lower variants sort first / are "more important";
/// `main_ways` at a crossroad are the ways sharing the lowest (most important) class present.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum HighwayClass {
    Motorway,
    MotorwayLink,
    Trunk,
    TrunkLink,
    Primary,
    PrimaryLink,
    Secondary,
    SecondaryLink,
    Tertiary,
    TertiaryLink,
}

impl HighwayClass {
    pub fn parse(tag: &str) -> Option<HighwayClass> {
        use HighwayClass::*;
        Some(match tag {
            "motorway" => Motorway,
            "motorway_link" => MotorwayLink,
            "trunk" => Trunk,
            "trunk_link" => TrunkLink,
            "primary" => Primary,
            "primary_link" => PrimaryLink,
            "secondary" => Secondary,
            "secondary_link" => SecondaryLink,
            "tertiary" => Tertiary,
            "tertiary_link" => TertiaryLink,
            _ => return None,
        })
    }
}

/// The classification of one incident way relative to another at a crossroad, per the bearing
/// bins in [`crate::crossroad::Crossroad::classify`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TurnDirection {
    Through,
    Left,
    Right,
    /// The two ways were too close in bearing to classify (or it's a U-turn, from_way == to_way).
    None,
}
