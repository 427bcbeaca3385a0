//! Great-circle distance and geofence verdicts.

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine great-circle distance in meters between two coordinates.
///
/// # Example
///
/// ```
/// use attendance_engine::attendance::distance_meters;
///
/// // One degree of latitude is roughly 111.2 km.
/// let d = distance_meters(0.0, 0.0, 1.0, 0.0);
/// assert!((d - 111_195.0).abs() < 1.0);
/// ```
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Returns true if the point lies within `radius_meters` of the fence centre.
///
/// Coordinates are not validated; malformed input is a caller contract.
///
/// # Example
///
/// ```
/// use attendance_engine::attendance::within_fence;
///
/// assert!(within_fence(3.1390, 101.6869, 3.1390, 101.6869, 0.0));
/// assert!(!within_fence(3.1490, 101.6869, 3.1390, 101.6869, 100.0));
/// ```
pub fn within_fence(
    point_lat: f64,
    point_lng: f64,
    fence_lat: f64,
    fence_lng: f64,
    radius_meters: f64,
) -> bool {
    distance_meters(point_lat, point_lng, fence_lat, fence_lng) <= radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_point_is_zero_distance() {
        assert_eq!(distance_meters(3.139, 101.6869, 3.139, 101.6869), 0.0);
    }

    #[test]
    fn test_known_distance_kuala_lumpur_to_putrajaya() {
        // KLCC to Putrajaya is about 25 km.
        let d = distance_meters(3.1579, 101.7116, 2.9264, 101.6964);
        assert!((d - 25_800.0).abs() < 500.0, "got {}", d);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let d = distance_meters(0.0, 0.0, 0.0, 0.001);
        assert!(within_fence(0.0, 0.0, 0.0, 0.001, d));
        assert!(!within_fence(0.0, 0.0, 0.0, 0.001, d - 0.01));
    }

    fn lat() -> impl Strategy<Value = f64> {
        -90.0f64..=90.0
    }

    fn lng() -> impl Strategy<Value = f64> {
        -180.0f64..=180.0
    }

    proptest! {
        /// Property: a point is always inside any non-negative fence centred on itself.
        #[test]
        fn prop_point_within_own_fence(lat in lat(), lng in lng(), radius in 0.0f64..1_000_000.0) {
            prop_assert!(within_fence(lat, lng, lat, lng, radius));
        }

        /// Property: growing the radius never turns a hit into a miss.
        #[test]
        fn prop_monotonic_in_radius(
            lat1 in lat(), lng1 in lng(), lat2 in lat(), lng2 in lng(),
            radius in 0.0f64..20_000_000.0, extra in 0.0f64..1_000_000.0,
        ) {
            if within_fence(lat1, lng1, lat2, lng2, radius) {
                prop_assert!(within_fence(lat1, lng1, lat2, lng2, radius + extra));
            }
        }

        /// Property: distance is never negative and never exceeds half the circumference.
        #[test]
        fn prop_distance_bounded(lat1 in lat(), lng1 in lng(), lat2 in lat(), lng2 in lng()) {
            let d = distance_meters(lat1, lng1, lat2, lng2);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_METERS + 1.0);
        }
    }
}
