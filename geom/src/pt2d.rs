use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, EARTH_RADIUS_KM};

/// A geographic point: latitude and longitude in degrees.
///
/// The simulation never projects into a planar coordinate system; distances are computed
/// directly via the haversine formula, so `Pt2D` is simply the vertex type used by polylines
/// (`LonLat` under another name, kept distinct for readability at call sites that build
/// geometry rather than load raw coordinates).
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Pt2D {
    pub lat: f64,
    pub lng: f64,
}

impl Pt2D {
    pub fn new(lat: f64, lng: f64) -> Pt2D {
        Pt2D { lat, lng }
    }

    /// Great-circle distance to `other`, via the haversine formula.
    pub fn dist_to(self, other: Pt2D) -> Distance {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Distance::km(EARTH_RADIUS_KM * c)
    }

    /// Compass bearing from `self` to `other`, 0 = north, increasing clockwise.
    pub fn bearing_to(self, other: Pt2D) -> Angle {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let y = dlng.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
        Angle::degrees(y.atan2(x).to_degrees())
    }

    /// A new point `dist` away from `self` along `bearing`.
    pub fn project(self, bearing: Angle, dist: Distance) -> Pt2D {
        let angular_dist = dist.inner_km() / EARTH_RADIUS_KM;
        let bearing = bearing.inner_degrees().to_radians();
        let lat1 = self.lat.to_radians();
        let lng1 = self.lng.to_radians();

        let lat2 =
            (lat1.sin() * angular_dist.cos() + lat1.cos() * angular_dist.sin() * bearing.cos())
                .asin();
        let lng2 = lng1
            + (bearing.sin() * angular_dist.sin() * lat1.cos())
                .atan2(angular_dist.cos() - lat1.sin() * lat2.sin());
        Pt2D::new(lat2.to_degrees(), lng2.to_degrees())
    }

    pub fn to_hashable(self) -> HashablePt2D {
        HashablePt2D {
            lat: self.lat.to_bits(),
            lng: self.lng.to_bits(),
        }
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// `LonLat` is the name OSM-adjacent tooling expects for a raw, unprocessed geographic
/// coordinate; it's an alias so loader code can speak in the vocabulary of its source format
/// while the rest of the engine speaks in `Pt2D`.
pub type LonLat = Pt2D;

/// A bit-exact, hashable encoding of a point, for deduplicating shared endpoints when splitting
/// ways at interior crossroad nodes (floats themselves aren't `Hash`/`Eq`).
#[derive(Clone, Copy, Debug)]
pub struct HashablePt2D {
    lat: u64,
    lng: u64,
}

impl PartialEq for HashablePt2D {
    fn eq(&self, other: &HashablePt2D) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }
}
impl Eq for HashablePt2D {}
impl Hash for HashablePt2D {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat.hash(state);
        self.lng.hash(state);
    }
}
