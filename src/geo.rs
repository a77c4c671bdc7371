//! Great-circle distance helpers

use crate::models::Coordinate;

/// Great-circle distance between two coordinates in kilometers.
///
/// Haversine formula on a sphere of radius 6371 km.
#[must_use]
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: from.latitude(),
            longitude: from.longitude(),
        },
        haversine::Location {
            latitude: to.latitude(),
            longitude: to.longitude(),
        },
        haversine::Units::Kilometers,
    )
}

/// Smallest distance from `point` to any of `others`, `None` when `others` is empty
#[must_use]
pub fn min_distance_km(point: Coordinate, others: &[Coordinate]) -> Option<f64> {
    others
        .iter()
        .map(|other| distance_km(point, *other))
        .min_by(f64::total_cmp)
}
