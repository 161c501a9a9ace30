use log::{debug, warn};

use std::collections::HashMap;

use geo::{Area, Centroid, LineString, Polygon, Validation};

use crate::config::*;
use crate::zones::{PolygonTable, ZoneKey};

// Below this value, the area of a ring is considered to be zero.
const AREA_EPSILON: f64 = 1e-12;

/// Where the count of a polygon is drawn, and the count itself.
#[derive(PartialEq, Debug, Clone)]
pub struct PolygonSummary {
    pub key: ZoneKey,
    pub centroid_lon: f64,
    pub centroid_lat: f64,
    /// Number of matched voters with this key.
    pub count: u64,
}

/// Removes the closing vertex when the ring repeats its first vertex at the end.
fn open_ring(ring: &[(f64, f64)]) -> &[(f64, f64)] {
    match ring {
        [first, .., last] if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// The polygon of a ring, without holes. `geo` closes the ring.
pub fn ring_polygon(ring: &[(f64, f64)]) -> Polygon<f64> {
    Polygon::new(LineString::from(open_ring(ring).to_vec()), vec![])
}

/// Signed area of a ring. Positive for counter-clockwise rings.
pub fn signed_area(ring: &[(f64, f64)]) -> f64 {
    ring_polygon(ring).signed_area()
}

/// The area-weighted centroid of a simple polygon.
///
/// Rings with fewer than 3 vertices, with crossing edges or with a zero
/// area have no meaningful centroid: the reason is returned instead.
pub fn centroid(ring: &[(f64, f64)]) -> Result<(f64, f64), String> {
    let n = open_ring(ring).len();
    if n < 3 {
        return Err(format!("{} vertices, at least 3 are needed", n));
    }
    let polygon = ring_polygon(ring);
    if !polygon.is_valid() {
        return Err("the ring crosses itself".to_string());
    }
    if polygon.unsigned_area() < AREA_EPSILON {
        return Err("the ring has a zero area".to_string());
    }
    match polygon.centroid() {
        Some(p) => Ok((p.x(), p.y())),
        None => Err("the ring has no centroid".to_string()),
    }
}

/// Number of voters per zone key.
pub fn count_by_key(voters: &[&VoterRecord]) -> HashMap<ZoneKey, u64> {
    let mut counts: HashMap<ZoneKey, u64> = HashMap::new();
    for v in voters.iter() {
        *counts.entry(ZoneKey::of_voter(v)).or_insert(0) += 1;
    }
    counts
}

/// One summary row per drawable polygon, in key order.
///
/// Polygons without a valid centroid are reported and left out; a polygon
/// without any voter gets a count of zero.
pub fn summarize_polygons(
    table: &PolygonTable,
    matched: &[&VoterRecord],
) -> Analysis<Vec<PolygonSummary>> {
    let counts = count_by_key(matched);
    let mut rows: Vec<PolygonSummary> = Vec::new();
    let mut warnings: Vec<Diagnostic> = Vec::new();
    for (key, ring) in table.rings.iter() {
        if table.defective.contains(key) {
            debug!("summarize_polygons: {}: ambiguous ring, no label", key);
            continue;
        }
        match centroid(ring) {
            Ok((cx, cy)) => {
                let count = counts.get(key).cloned().unwrap_or(0);
                debug!(
                    "summarize_polygons: {}: centroid ({}, {}) count {}",
                    key, cx, cy, count
                );
                rows.push(PolygonSummary {
                    key: key.clone(),
                    centroid_lon: cx,
                    centroid_lat: cy,
                    count,
                });
            }
            Err(reason) => {
                warn!("summarize_polygons: {}: {}", key, reason);
                warnings.push(Diagnostic::DegeneratePolygon {
                    key: key.key(),
                    reason,
                });
            }
        }
    }
    Analysis {
        value: rows,
        warnings,
    }
}
