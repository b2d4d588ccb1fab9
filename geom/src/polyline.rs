use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D};

/// An ordered sequence of points, walked by cars as they advance along a lane.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    length: Distance,
}

impl PolyLine {
    /// Panics if fewer than two points are given; a lane with no extent isn't representable.
    pub fn new(pts: Vec<Pt2D>) -> PolyLine {
        assert!(pts.len() >= 2, "PolyLine::new needs at least 2 points");
        let length = pts.windows(2).map(|w| w[0].dist_to(w[1])).sum();
        PolyLine { pts, length }
    }

    pub fn points(&self) -> &[Pt2D] {
        &self.pts
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        *self.pts.last().unwrap()
    }

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine::new(pts)
    }

    /// The point reached after walking `dist` along the polyline from the start. Clamped to the
    /// polyline's endpoints.
    pub fn dist_along(&self, dist: Distance) -> Pt2D {
        if dist <= Distance::ZERO {
            return self.first_pt();
        }
        if dist >= self.length {
            return self.last_pt();
        }
        let mut remaining = dist;
        for w in self.pts.windows(2) {
            let seg_len = w[0].dist_to(w[1]);
            if remaining <= seg_len {
                if seg_len == Distance::ZERO {
                    return w[0];
                }
                let bearing = w[0].bearing_to(w[1]);
                return w[0].project(bearing, remaining);
            }
            remaining -= seg_len;
        }
        self.last_pt()
    }

    /// The point reached after walking `pct` (0.0-1.0) of the polyline's length.
    pub fn percentage_along(&self, pct: f64) -> Pt2D {
        self.dist_along(self.length * pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        let pl = PolyLine::new(vec![
            Pt2D::new(49.19, 16.60),
            Pt2D::new(49.20, 16.61),
            Pt2D::new(49.21, 16.62),
        ]);
        assert_eq!(pl.dist_along(Distance::ZERO), pl.first_pt());
        assert_eq!(pl.dist_along(pl.length()), pl.last_pt());
        assert_eq!(pl.percentage_along(0.0), pl.first_pt());
        assert_eq!(pl.percentage_along(1.0), pl.last_pt());
    }

    #[test]
    fn reversed_has_same_length() {
        let pl = PolyLine::new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(1.0, 1.0)]);
        let rev = pl.reversed();
        assert!((pl.length().inner_km() - rev.length().inner_km()).abs() < 1e-9);
        assert_eq!(rev.first_pt(), pl.last_pt());
    }
}
