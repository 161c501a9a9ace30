use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::config::*;

/// Separator between the zone and the polygon in the textual key.
pub const KEY_SEPARATOR: &str = " - ";

/// Normalizes one free-text part of a zone key: surrounding whitespace
/// removed, upper case.
///
/// The same normalization must be applied on the roll and on the
/// geometry table, otherwise the keys do not match.
pub fn normalize_part(s: &str) -> String {
    s.trim().to_uppercase()
}

/// The join key between a voter and the polygon geometry.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct ZoneKey {
    pub zone: String,
    pub polygon: String,
}

impl ZoneKey {
    pub fn new(zone: &str, polygon: &str) -> ZoneKey {
        ZoneKey {
            zone: normalize_part(zone),
            polygon: normalize_part(polygon),
        }
    }

    pub fn of_voter(record: &VoterRecord) -> ZoneKey {
        ZoneKey::new(&record.zone, &record.polygon)
    }

    pub fn of_vertex(vertex: &PolygonVertex) -> ZoneKey {
        ZoneKey::new(&vertex.zone, &vertex.polygon)
    }

    /// The textual form, `zone - polygon`.
    pub fn key(&self) -> String {
        format!("{}{}{}", self.zone, KEY_SEPARATOR, self.polygon)
    }
}

impl Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A polygon ring: (longitude, latitude) vertices in ring order.
pub type Ring = Vec<(f64, f64)>;

/// The zone geometry, one ring per key, ordered by key.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PolygonTable {
    pub rings: BTreeMap<ZoneKey, Ring>,
    /// Keys whose ring is ambiguous. They are already reported and get no label.
    pub defective: BTreeSet<ZoneKey>,
}

impl PolygonTable {
    pub fn contains(&self, key: &ZoneKey) -> bool {
        self.rings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// Assembles the vertex rows into rings.
///
/// The vertices of each polygon are sorted by their order field. Two
/// vertices sharing the same order make the ring ambiguous: such a
/// polygon is reported and marked as defective. It stays in the table so
/// that its voters are still matched.
pub fn build_polygon_table(vertices: &[PolygonVertex]) -> Analysis<PolygonTable> {
    let mut grouped: BTreeMap<ZoneKey, Vec<&PolygonVertex>> = BTreeMap::new();
    for v in vertices.iter() {
        grouped.entry(ZoneKey::of_vertex(v)).or_default().push(v);
    }

    let mut table = PolygonTable::default();
    let mut warnings: Vec<Diagnostic> = Vec::new();
    for (key, mut vs) in grouped.into_iter() {
        vs.sort_by_key(|v| v.order);
        let duplicate = vs.windows(2).find(|w| w[0].order == w[1].order);
        if let Some(w) = duplicate {
            let reason = format!("vertex order {} appears more than once", w[0].order);
            warn!("build_polygon_table: {}: {}", key, reason);
            warnings.push(Diagnostic::DegeneratePolygon {
                key: key.key(),
                reason,
            });
            table.defective.insert(key.clone());
        }
        let ring: Ring = vs.iter().map(|v| (v.longitude, v.latitude)).collect();
        debug!("build_polygon_table: {}: {} vertices", key, ring.len());
        table.rings.insert(key, ring);
    }
    info!(
        "build_polygon_table: {} polygons from {} vertices",
        table.len(),
        vertices.len()
    );
    Analysis {
        value: table,
        warnings,
    }
}

/// The voters that can be placed on the map.
#[derive(PartialEq, Debug, Clone)]
pub struct ZoneMatch<'a> {
    pub matched: Vec<&'a VoterRecord>,
    /// Keys used by some voters and absent from the geometry, sorted.
    pub unmatched_keys: Vec<ZoneKey>,
}

/// Matches the voters to the polygon geometry.
///
/// Every key without geometry is reported once (in key order). The
/// voters with such a key are only left out of the map: the other views
/// keep using the full roll.
pub fn match_zones<'a>(voters: &'a [VoterRecord], table: &PolygonTable) -> Analysis<ZoneMatch<'a>> {
    let mut matched: Vec<&'a VoterRecord> = Vec::new();
    let mut unmatched: BTreeSet<ZoneKey> = BTreeSet::new();
    for v in voters.iter() {
        let key = ZoneKey::of_voter(v);
        if table.contains(&key) {
            matched.push(v);
        } else {
            unmatched.insert(key);
        }
    }

    let unmatched_keys: Vec<ZoneKey> = unmatched.into_iter().collect();
    let warnings: Vec<Diagnostic> = unmatched_keys
        .iter()
        .map(|k| Diagnostic::UnmatchedKey(k.key()))
        .collect();
    if !unmatched_keys.is_empty() {
        let names: Vec<String> = unmatched_keys.iter().map(|k| k.key()).collect();
        warn!(
            "match_zones: polygons without match in the map:\n{}",
            names.join("\n")
        );
    }
    info!(
        "match_zones: {} of {} voters matched",
        matched.len(),
        voters.len()
    );
    Analysis {
        value: ZoneMatch {
            matched,
            unmatched_keys,
        },
        warnings,
    }
}
