//! Geofence containment via even-odd ray casting.
//!
//! The sweep line runs along the point's longitude: an edge counts when its
//! endpoints straddle `point.lng`, and the crossing is then located in
//! latitude. Points exactly on an edge get whatever the float comparisons
//! give them.

use super::types::{LatLng, LocationError};

/// Whether `point` lies inside the closed polygon `polygon`.
///
/// The last vertex connects back to the first. Empty and degenerate polygons
/// are answered, never rejected: fewer than three vertices can't enclose
/// anything and come out `false`.
pub fn is_inside(point: LatLng, polygon: &[LatLng]) -> bool {
    let Some(last) = polygon.len().checked_sub(1) else {
        return false;
    };

    let mut inside = false;
    let mut j = last;
    for (i, vi) in polygon.iter().enumerate() {
        let vj = &polygon[j];
        if (vi.lng < point.lng && vj.lng >= point.lng) || (vj.lng < point.lng && vi.lng >= point.lng) {
            // IEEE-754 semantics on purpose: a NaN crossing compares false.
            let crossing = vi.lat + (point.lng - vi.lng) / (vj.lng - vi.lng) * (vj.lat - vi.lat);
            if crossing < point.lat {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Range-check every vertex of a user-supplied fence.
///
/// [`is_inside`] itself takes any values; this is for the input boundaries.
pub fn check_fence(polygon: &[LatLng]) -> Result<(), LocationError> {
    polygon.iter().try_for_each(|v| v.validated().map(|_| ()))
}
