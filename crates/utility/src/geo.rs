use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Nominal length of one degree of latitude.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;

/// Lower bound for `cos(latitude)` when widening longitude near the poles.
const MIN_COS_LATITUDE: f64 = 1e-6;

/// Relative slack added to every box edge so rounding never cuts off a
/// point lying exactly on the circle.
const BOX_TOLERANCE: f64 = 1e-9;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Finite and inside [-90, 90] x [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Axis aligned latitude/longitude rectangle, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Smallest box of this kind that still contains every point within
    /// `radius_meters` of `center`.
    pub fn around(center: &Coordinate, radius_meters: f64) -> Self {
        calculate_bounding_box(center, radius_meters)
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coordinate.latitude)
            && (self.min_lng..=self.max_lng).contains(&coordinate.longitude)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.min_lat, self.max_lat, self.min_lng, self.max_lng
        )
    }
}

/// Computes the pre-filter rectangle for a circular search.
///
/// The latitude extent uses the nominal 111,320 m per degree, widened to the
/// haversine sphere's own degree length where that is shorter, so the box
/// is never smaller than the circle. Longitude is corrected for meridian
/// convergence. Circles reaching a pole or crossing the antimeridian get the
/// full longitude range.
pub fn calculate_bounding_box(center: &Coordinate, radius_meters: f64) -> BoundingBox {
    let radius_meters = radius_meters.max(0.0);
    let angular_radius = radius_meters / EARTH_RADIUS_METERS;

    let lat_delta = (radius_meters / METERS_PER_DEGREE_LATITUDE)
        .max(angular_radius.to_degrees())
        * (1.0 + BOX_TOLERANCE);

    let min_lat = center.latitude - lat_delta;
    let max_lat = center.latitude + lat_delta;

    let cos_lat = center.latitude.to_radians().cos().max(MIN_COS_LATITUDE);
    let covers_pole = min_lat <= -90.0 || max_lat >= 90.0;
    let lng_delta = if covers_pole || angular_radius.sin() >= cos_lat {
        180.0
    } else {
        let nominal = lat_delta / cos_lat;
        let exact = (angular_radius.sin() / cos_lat).asin().to_degrees();
        nominal.max(exact) * (1.0 + BOX_TOLERANCE)
    };

    let (min_lng, max_lng) = {
        let min_lng = center.longitude - lng_delta;
        let max_lng = center.longitude + lng_delta;
        if lng_delta >= 180.0 || min_lng < -180.0 || max_lng > 180.0 {
            (-180.0, 180.0)
        } else {
            (min_lng, max_lng)
        }
    };

    BoundingBox {
        min_lat: min_lat.max(-90.0),
        max_lat: max_lat.min(90.0),
        min_lng,
        max_lng,
    }
}

/// Great-circle distance in meters.
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();

    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` slightly outside [0, 1] for identical or
    // antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Point reached from `start` after `distance_meters` along `bearing_degrees`
/// (clockwise from north).
pub fn destination_point(
    start: &Coordinate,
    bearing_degrees: f64,
    distance_meters: f64,
) -> Coordinate {
    let angular = distance_meters / EARTH_RADIUS_METERS;
    let bearing = bearing_degrees.to_radians();
    let lat1 = start.latitude.to_radians();
    let lon1 = start.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos()
        + lat1.cos() * angular.sin() * bearing.cos())
    .clamp(-1.0, 1.0)
    .asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    let mut longitude = lon2.to_degrees();
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }
    Coordinate::new(lat2.to_degrees(), longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SINGAPORE_CENTER: Coordinate = Coordinate::new(1.3521, 103.8198);

    #[test]
    fn distance_to_itself_is_zero() {
        assert!(haversine_distance(&SINGAPORE_CENTER, &SINGAPORE_CENTER) < 1e-6);
    }

    #[test]
    fn one_degree_along_a_meridian() {
        let a = Coordinate::new(1.0, 103.8);
        let b = Coordinate::new(2.0, 103.8);
        let distance = haversine_distance(&a, &b);
        assert!((distance - 111_320.0).abs() / 111_320.0 < 0.005);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let distance = haversine_distance(&a, &b);
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn orchard_is_outside_five_kilometers_of_the_center() {
        let orchard = Coordinate::new(1.3007, 103.8398);
        let distance = haversine_distance(&SINGAPORE_CENTER, &orchard);
        assert!(distance > 5_000.0);
        assert!((distance - 6_133.0).abs() < 50.0);
    }

    #[test]
    fn bounding_box_contains_center() {
        let bbox = calculate_bounding_box(&SINGAPORE_CENTER, 5_000.0);
        assert!(bbox.contains(&SINGAPORE_CENTER));
        assert!(bbox.min_lat < bbox.max_lat);
        assert!(bbox.min_lng < bbox.max_lng);
    }

    #[test]
    fn zero_radius_box_is_a_point() {
        let bbox = calculate_bounding_box(&SINGAPORE_CENTER, 0.0);
        assert!(bbox.contains(&SINGAPORE_CENTER));
        assert!((bbox.max_lat - bbox.min_lat).abs() < 1e-12);
    }

    #[test]
    fn bounding_box_near_pole_spans_all_longitudes() {
        let bbox = calculate_bounding_box(&Coordinate::new(89.99, 10.0), 5_000.0);
        assert_eq!(bbox.min_lng, -180.0);
        assert_eq!(bbox.max_lng, 180.0);
        assert_eq!(bbox.max_lat, 90.0);
        assert!(bbox.min_lat.is_finite());
    }

    #[test]
    fn bounding_box_at_pole_is_finite() {
        let bbox = calculate_bounding_box(&Coordinate::new(90.0, 0.0), 1_000.0);
        assert!(bbox.min_lat.is_finite() && bbox.max_lat.is_finite());
        assert!(bbox.min_lng.is_finite() && bbox.max_lng.is_finite());
    }

    #[test]
    fn bounding_box_across_antimeridian_spans_all_longitudes() {
        let bbox = calculate_bounding_box(&Coordinate::new(0.0, 179.99), 5_000.0);
        assert_eq!(bbox.min_lng, -180.0);
        assert_eq!(bbox.max_lng, 180.0);
    }

    #[test]
    fn destination_point_travels_the_requested_distance() {
        let target = destination_point(&SINGAPORE_CENTER, 45.0, 3_000.0);
        let distance = haversine_distance(&SINGAPORE_CENTER, &target);
        assert!((distance - 3_000.0).abs() < 1e-3);
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0)
            .prop_map(|(latitude, longitude)| Coordinate::new(latitude, longitude))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_distance(&a, &b);
            let ba = haversine_distance(&b, &a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn distance_to_self_is_zero(a in coordinate()) {
            prop_assert!(haversine_distance(&a, &a) < 1e-6);
        }

        #[test]
        fn distance_is_finite(a in coordinate(), b in coordinate()) {
            prop_assert!(haversine_distance(&a, &b).is_finite());
        }

        #[test]
        fn bounding_box_never_excludes_points_in_the_circle(
            center in coordinate(),
            radius in 0.0f64..2_000_000.0,
            bearing in 0.0f64..360.0,
            fraction in 0.0f64..=1.0,
        ) {
            let bbox = calculate_bounding_box(&center, radius);
            let point = destination_point(&center, bearing, radius * fraction);
            prop_assume!(haversine_distance(&center, &point) <= radius);
            prop_assert!(
                bbox.contains(&point),
                "{} not in {} (center {}, radius {})",
                point, bbox, center, radius
            );
        }

        #[test]
        fn bounding_box_is_ordered(center in coordinate(), radius in 0.0f64..20_000_000.0) {
            let bbox = calculate_bounding_box(&center, radius);
            prop_assert!(bbox.min_lat <= bbox.max_lat);
            prop_assert!(bbox.min_lng <= bbox.max_lng);
            prop_assert!(bbox.min_lat >= -90.0 && bbox.max_lat <= 90.0);
            prop_assert!(bbox.min_lng >= -180.0 && bbox.max_lng <= 180.0);
        }
    }
}
