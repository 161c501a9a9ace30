use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::zones::normalize_part;

/// Occupations that are reported as their own category.
pub const OCCUPATION_CATEGORIES: [&str; 4] = ["SIN OCUPACION", "ESTUDIANTE", "NO CONSTA", "JUBILADO"];
pub const OCCUPATION_MISSING: &str = "SIN DATO";
pub const OCCUPATION_OTHER: &str = "OTRAS";

/// Puts a free-text occupation in one of the reported categories.
pub fn occupation_category(occupation: Option<&str>) -> &'static str {
    let normalized = occupation.map(|s| s.trim().to_uppercase()).unwrap_or_default();
    // "NAN" is how the spreadsheet exports write an empty cell.
    if normalized.is_empty() || normalized == "NAN" {
        return OCCUPATION_MISSING;
    }
    OCCUPATION_CATEGORIES
        .iter()
        .find(|c| **c == normalized)
        .copied()
        .unwrap_or(OCCUPATION_OTHER)
}

/// Which breakdown a column of the cross table comes from.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Breakdown {
    Gender,
    Occupation,
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct CrossTabColumn {
    pub label: String,
    pub breakdown: Breakdown,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CrossTabRow {
    pub zone: String,
    pub polygon: String,
    /// One count per column of the table.
    pub counts: Vec<u64>,
}

/// Gender and occupation counts per (zone, polygon).
///
/// Columns are sorted by label. Every (zone, polygon) found in either
/// breakdown has a row, with zeros where the other breakdown has nothing.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CrossTab {
    pub columns: Vec<CrossTabColumn>,
    pub rows: Vec<CrossTabRow>,
}

impl CrossTab {
    pub fn column_labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    /// The count for a (zone, polygon) pair and a column label, if both exist.
    pub fn get(&self, zone: &str, polygon: &str, label: &str) -> Option<u64> {
        let col = self.columns.iter().position(|c| c.label == label)?;
        let row = self
            .rows
            .iter()
            .find(|r| r.zone == zone && r.polygon == polygon)?;
        row.counts.get(col).cloned()
    }
}

/// Cross-tabulates gender and occupation category per (zone, polygon).
///
/// Voters without a gender are only counted in the occupation breakdown.
pub fn cross_tabulate(voters: &[&VoterRecord]) -> CrossTab {
    let mut counts: BTreeMap<(String, String), BTreeMap<CrossTabColumn, u64>> = BTreeMap::new();
    let mut columns: BTreeSet<CrossTabColumn> = BTreeSet::new();

    for v in voters.iter() {
        let pair = (normalize_part(&v.zone), normalize_part(&v.polygon));
        let cells = counts.entry(pair).or_default();

        let gender = v.gender.as_deref().map(str::trim).filter(|g| !g.is_empty());
        if let Some(g) = gender {
            let col = CrossTabColumn {
                label: g.to_string(),
                breakdown: Breakdown::Gender,
            };
            *cells.entry(col.clone()).or_insert(0) += 1;
            columns.insert(col);
        }

        let col = CrossTabColumn {
            label: occupation_category(v.occupation.as_deref()).to_string(),
            breakdown: Breakdown::Occupation,
        };
        debug!(
            "cross_tabulate: {}: occupation {:?} -> {}",
            v.document_id, v.occupation, col.label
        );
        *cells.entry(col.clone()).or_insert(0) += 1;
        columns.insert(col);
    }

    let columns: Vec<CrossTabColumn> = columns.into_iter().collect();
    let rows: Vec<CrossTabRow> = counts
        .into_iter()
        .map(|((zone, polygon), cells)| CrossTabRow {
            zone,
            polygon,
            counts: columns
                .iter()
                .map(|c| cells.get(c).cloned().unwrap_or(0))
                .collect(),
        })
        .collect();
    info!(
        "cross_tabulate: {} rows, {} columns",
        rows.len(),
        columns.len()
    );
    CrossTab { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RollBuilder;

    #[test]
    fn occupation_categories() {
        assert_eq!(occupation_category(Some("estudiante")), "ESTUDIANTE");
        assert_eq!(occupation_category(Some("  Jubilado ")), "JUBILADO");
        assert_eq!(occupation_category(Some("sin ocupacion")), "SIN OCUPACION");
        assert_eq!(occupation_category(Some("NO CONSTA")), "NO CONSTA");
        assert_eq!(occupation_category(Some("")), "SIN DATO");
        assert_eq!(occupation_category(Some("nan")), "SIN DATO");
        assert_eq!(occupation_category(None), "SIN DATO");
        assert_eq!(occupation_category(Some("ABOGADO")), "OTRAS");
    }

    #[test]
    fn outer_join_with_zero_fill() {
        let mut b = RollBuilder::new();
        b.add_voter_with_profile("1", "ZONA 1", "1", "F", "estudiante")
            .add_voter_with_profile("2", "ZONA 1", "1", "M", "ABOGADO")
            .add_voter_with_profile("3", "ZONA 1", "1", "F", "")
            // Only in the occupation breakdown: no gender.
            .add_voter_with_profile("4", "ZONA 2", "3", "", "jubilado");
        let voters = b.voters();
        let refs: Vec<&VoterRecord> = voters.iter().collect();
        let tab = cross_tabulate(&refs);

        assert_eq!(
            tab.column_labels(),
            vec!["ESTUDIANTE", "F", "JUBILADO", "M", "OTRAS", "SIN DATO"]
        );
        assert_eq!(tab.rows.len(), 2);
        assert_eq!(tab.rows[0].counts, vec![1, 2, 0, 1, 1, 1]);
        assert_eq!(tab.rows[1].zone, "ZONA 2");
        assert_eq!(tab.rows[1].counts, vec![0, 0, 1, 0, 0, 0]);
        assert_eq!(tab.get("ZONA 2", "3", "F"), Some(0));
        assert_eq!(tab.get("ZONA 9", "3", "F"), None);
    }

    #[test]
    fn each_voter_counted_once_per_breakdown() {
        let mut b = RollBuilder::new();
        for i in 0..10 {
            let g = if i % 2 == 0 { "F" } else { "M" };
            b.add_voter_with_profile(&i.to_string(), " zona 1", "2 ", g, "x");
        }
        let voters = b.voters();
        let refs: Vec<&VoterRecord> = voters.iter().collect();
        let tab = cross_tabulate(&refs);
        assert_eq!(tab.rows.len(), 1);
        assert_eq!(tab.rows[0].zone, "ZONA 1");
        assert_eq!(tab.rows[0].polygon, "2");
        let gender_total: u64 = tab
            .columns
            .iter()
            .zip(tab.rows[0].counts.iter())
            .filter(|(c, _)| c.breakdown == Breakdown::Gender)
            .map(|(_, n)| *n)
            .sum();
        assert_eq!(gender_total, 10);
        assert_eq!(tab.get("ZONA 1", "2", "OTRAS"), Some(10));
    }

    #[test]
    fn empty_input() {
        assert_eq!(cross_tabulate(&[]), CrossTab::default());
    }
}
