//! The zone map: polygons coloured by zone, voter counts at the centroids.

use log::info;

use crate::config::*;
use crate::crosstab::{cross_tabulate, CrossTab};
use crate::geometry::{summarize_polygons, PolygonSummary};
use crate::zones::{build_polygon_table, match_zones, Ring, ZoneKey};

/// RGBA fill colour of a polygon.
pub type Rgba = [u8; 4];

pub const DEFAULT_ZONE_COLOR: Rgba = [200, 200, 200, 120];

/// Initial zoom level of the map.
pub const DEFAULT_ZOOM: u32 = 12;

/// Fill colour of the polygons of a zone.
pub fn zone_color(zone: &str) -> Rgba {
    match zone {
        "ZONA 1" => [255, 87, 51, 120],
        "ZONA 2" => [70, 130, 180, 120],
        "ZONA 3" => [60, 179, 113, 120],
        "ZONA 4" => [186, 85, 211, 120],
        _ => DEFAULT_ZONE_COLOR,
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct PolygonFeature {
    pub key: ZoneKey,
    pub ring: Ring,
    pub color: Rgba,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u32,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ZoneMap {
    pub polygons: Vec<PolygonFeature>,
    pub labels: Vec<PolygonSummary>,
    pub view: Option<ViewState>,
    /// Voters placed on the map.
    pub matched_voters: usize,
    /// Voter keys without geometry, sorted.
    pub unmatched_keys: Vec<ZoneKey>,
    /// Gender and occupation counts of the voters placed on the map.
    pub cross_tab: CrossTab,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Centre of the map: the mean position of the located voters, or the
/// mean of the centroids when no voter has coordinates.
pub fn initial_view(voters: &[&VoterRecord], labels: &[PolygonSummary]) -> Option<ViewState> {
    let located: Vec<(f64, f64)> = voters
        .iter()
        .filter_map(|v| match (v.longitude, v.latitude) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => None,
        })
        .collect();
    let (lon, lat) = if located.is_empty() {
        (
            mean(labels.iter().map(|l| l.centroid_lon))?,
            mean(labels.iter().map(|l| l.centroid_lat))?,
        )
    } else {
        (
            mean(located.iter().map(|p| p.0))?,
            mean(located.iter().map(|p| p.1))?,
        )
    };
    Some(ViewState {
        latitude: lat,
        longitude: lon,
        zoom: DEFAULT_ZOOM,
    })
}

/// Builds the whole zone map from the roll and the vertex table.
///
/// The warnings gather the ambiguous rings, the voter keys without
/// geometry and the polygons that cannot be labelled, in that order.
pub fn build_zone_map(voters: &[VoterRecord], vertices: &[PolygonVertex]) -> Analysis<ZoneMap> {
    let mut warnings: Vec<Diagnostic> = Vec::new();

    let table = build_polygon_table(vertices);
    warnings.extend(table.warnings);
    let table = table.value;

    let zm = match_zones(voters, &table);
    warnings.extend(zm.warnings);
    let matched = zm.value.matched;
    let unmatched_keys = zm.value.unmatched_keys;

    let labels = summarize_polygons(&table, &matched);
    warnings.extend(labels.warnings);
    let labels = labels.value;

    let polygons: Vec<PolygonFeature> = table
        .rings
        .into_iter()
        .map(|(key, ring)| {
            let color = zone_color(&key.zone);
            PolygonFeature { key, ring, color }
        })
        .collect();

    let view = initial_view(&matched, &labels);
    let cross_tab = cross_tabulate(&matched);
    info!(
        "build_zone_map: {} polygons, {} labels, {} warnings",
        polygons.len(),
        labels.len(),
        warnings.len()
    );
    Analysis {
        value: ZoneMap {
            polygons,
            labels,
            view,
            matched_voters: matched.len(),
            unmatched_keys,
            cross_tab,
        },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RollBuilder;

    #[test]
    fn colors() {
        assert_eq!(zone_color("ZONA 2"), [70, 130, 180, 120]);
        assert_eq!(zone_color("ZONA 7"), DEFAULT_ZONE_COLOR);
    }

    #[test]
    fn full_map() {
        let mut b = RollBuilder::new();
        b.add_vertex("zona 1", "1", 1, 0.0, 0.0)
            .add_vertex("zona 1", "1", 2, 4.0, 0.0)
            .add_vertex("zona 1", "1", 3, 4.0, 4.0)
            .add_vertex("zona 1", "1", 4, 0.0, 4.0);
        let mut located = VoterRecord {
            document_id: "1".to_string(),
            birth_year: Some(1970),
            gender: Some("F".to_string()),
            occupation: None,
            zone: "ZONA 1".to_string(),
            polygon: "1".to_string(),
            longitude: Some(1.0),
            latitude: Some(3.0),
            vote_status: VoteStatus::Voted,
        };
        b.add_voter_2(&located);
        located.document_id = "2".to_string();
        located.longitude = Some(3.0);
        located.latitude = Some(1.0);
        b.add_voter_2(&located);
        b.add_voter("3", None, "ZONA 5", "1", VoteStatus::Voted);

        let res = build_zone_map(&b.voters(), &b.vertices());
        let map = res.value;
        assert_eq!(map.polygons.len(), 1);
        assert_eq!(map.polygons[0].color, [255, 87, 51, 120]);
        assert_eq!(map.labels[0].count, 2);
        assert_eq!(map.matched_voters, 2);
        assert_eq!(map.unmatched_keys, vec![ZoneKey::new("ZONA 5", "1")]);
        assert_eq!(map.cross_tab.get("ZONA 1", "1", "F"), Some(2));
        assert_eq!(map.cross_tab.rows.len(), 1);
        assert_eq!(
            map.view,
            Some(ViewState {
                latitude: 2.0,
                longitude: 2.0,
                zoom: 12
            })
        );
        assert_eq!(
            res.warnings,
            vec![Diagnostic::UnmatchedKey("ZONA 5 - 1".to_string())]
        );
    }

    #[test]
    fn ambiguous_ring_keeps_its_voters() {
        let mut b = RollBuilder::new();
        b.add_vertex("ZONA 1", "1", 1, 0.0, 0.0)
            .add_vertex("ZONA 1", "1", 1, 1.0, 0.0)
            .add_vertex("ZONA 1", "1", 2, 1.0, 1.0)
            .add_vertex("ZONA 1", "1", 3, 0.0, 1.0);
        b.add_voter("1", None, "ZONA 1", "1", VoteStatus::Voted);
        let res = build_zone_map(&b.voters(), &b.vertices());
        let map = res.value;
        assert_eq!(map.matched_voters, 1);
        assert!(map.unmatched_keys.is_empty());
        assert_eq!(map.polygons.len(), 1);
        assert!(map.labels.is_empty());
        assert_eq!(map.cross_tab.rows.len(), 1);
        assert!(matches!(
            &res.warnings[..],
            [Diagnostic::DegeneratePolygon { key, .. }] if key == "ZONA 1 - 1"
        ));
    }

    #[test]
    fn view_falls_back_to_centroids() {
        let mut b = RollBuilder::new();
        b.add_vertex("Z", "1", 1, 0.0, 0.0)
            .add_vertex("Z", "1", 2, 2.0, 0.0)
            .add_vertex("Z", "1", 3, 2.0, 2.0)
            .add_vertex("Z", "1", 4, 0.0, 2.0);
        b.add_voter("1", None, "Z", "1", VoteStatus::Unknown);
        let map = build_zone_map(&b.voters(), &b.vertices()).value;
        let view = map.view.unwrap();
        assert!((view.latitude - 1.0).abs() < 1e-9);
        assert!((view.longitude - 1.0).abs() < 1e-9);

        let empty = build_zone_map(&[], &[]).value;
        assert_eq!(empty.view, None);
    }
}
