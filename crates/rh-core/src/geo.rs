//! Geographic coordinate type and distance helpers.
//!
//! `GeoPoint` stores `f64` latitude/longitude in degrees.  Two distances are
//! offered:
//!
//! - [`GeoPoint::degree_distance`]: straight-line distance in raw degree
//!   space.  Used for nearest-node snapping, where only the ordering matters.
//! - [`GeoPoint::planar_miles`]: degree deltas scaled by fixed
//!   latitude/longitude-to-mile constants.  Used by the A* heuristic.

/// Miles per degree of latitude, sampled from two points in New York City.
pub const LAT_TO_MILES: f64 = 60.0;

/// Miles per degree of longitude, sampled from two points in New York City.
pub const LON_TO_MILES: f64 = 45.5;

/// A geographic coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Euclidean distance in degree space.
    #[inline]
    pub fn degree_distance(self, other: GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    /// Straight-line distance in miles using the fixed NYC scale constants.
    ///
    /// Only meaningful near the latitude the constants were sampled at; the
    /// result is an estimate, not a geodesic.
    #[inline]
    pub fn planar_miles(self, other: GeoPoint) -> f64 {
        let dlat = (self.lat - other.lat).abs() * LAT_TO_MILES;
        let dlon = (self.lon - other.lon).abs() * LON_TO_MILES;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    /// `true` if both components are finite numbers.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
