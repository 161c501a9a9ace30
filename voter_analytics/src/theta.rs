//! Estimated vote probabilities (θ) per age group and party.
//!
//! The estimates and their bootstrap summaries are produced by an external
//! model. This module only validates them and exposes the selections the
//! dashboard needs.

use log::{debug, warn};

use crate::config::*;

// Tolerance on the ordering of the bootstrap bounds.
const BOUND_TOLERANCE: f64 = 1e-9;

fn check_probability(age_group: &str, party: &str, value: f64) -> Result<f64, AnalyticsError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AnalyticsError::InvalidProbability {
            age_group: age_group.to_string(),
            party: party.to_string(),
            value,
        })
    }
}

/// The point estimates: one row per age group, one column per party.
#[derive(PartialEq, Debug, Clone)]
pub struct ThetaTable {
    pub age_groups: Vec<String>,
    pub parties: Vec<String>,
    /// `values[g][p]` for age group `g` and party `p`.
    pub values: Vec<Vec<f64>>,
}

impl ThetaTable {
    pub fn new(
        parties: Vec<String>,
        rows: Vec<(String, Vec<f64>)>,
    ) -> Result<ThetaTable, AnalyticsError> {
        let mut age_groups: Vec<String> = Vec::new();
        let mut values: Vec<Vec<f64>> = Vec::new();
        for (group, row) in rows.into_iter() {
            if row.len() != parties.len() {
                return Err(AnalyticsError::RaggedTable {
                    age_group: group,
                    expected: parties.len(),
                    found: row.len(),
                });
            }
            for (party, x) in parties.iter().zip(row.iter()) {
                check_probability(&group, party, *x)?;
            }
            age_groups.push(group);
            values.push(row);
        }
        Ok(ThetaTable {
            age_groups,
            parties,
            values,
        })
    }

    pub fn get(&self, age_group: &str, party: &str) -> Option<f64> {
        let g = self.age_groups.iter().position(|x| x == age_group)?;
        let p = self.parties.iter().position(|x| x == party)?;
        Some(self.values[g][p])
    }
}

/// A 95% bootstrap interval around the median estimate.
#[derive(PartialEq, Debug, Clone)]
pub struct ThetaInterval {
    pub age_group: String,
    pub party: String,
    pub low: f64,
    pub median: f64,
    pub high: f64,
}

/// The bootstrap summary table, in file order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ThetaIntervals {
    pub rows: Vec<ThetaInterval>,
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for v in values {
        if !res.contains(v) {
            res.push(v.clone());
        }
    }
    res
}

impl ThetaIntervals {
    /// Validates the rows. Bounds out of order are kept but reported.
    pub fn new(rows: Vec<ThetaInterval>) -> Result<Analysis<ThetaIntervals>, AnalyticsError> {
        let mut warnings: Vec<Diagnostic> = Vec::new();
        for r in rows.iter() {
            check_probability(&r.age_group, &r.party, r.low)?;
            check_probability(&r.age_group, &r.party, r.median)?;
            check_probability(&r.age_group, &r.party, r.high)?;
            if r.low > r.median + BOUND_TOLERANCE || r.median > r.high + BOUND_TOLERANCE {
                warn!(
                    "ThetaIntervals::new: unordered bounds for {} / {}: {} {} {}",
                    r.age_group, r.party, r.low, r.median, r.high
                );
                warnings.push(Diagnostic::UnorderedInterval {
                    age_group: r.age_group.clone(),
                    party: r.party.clone(),
                });
            }
        }
        Ok(Analysis {
            value: ThetaIntervals { rows },
            warnings,
        })
    }

    /// The age groups, in the order they first appear.
    pub fn age_groups(&self) -> Vec<String> {
        distinct_in_order(self.rows.iter().map(|r| &r.age_group))
    }

    /// The parties, in the order they first appear.
    pub fn parties(&self) -> Vec<String> {
        distinct_in_order(self.rows.iter().map(|r| &r.party))
    }

    /// One interval per party for the given age group.
    pub fn for_age_group(&self, age_group: &str) -> Result<Vec<&ThetaInterval>, AnalyticsError> {
        let res: Vec<&ThetaInterval> = self.rows.iter().filter(|r| r.age_group == age_group).collect();
        if res.is_empty() {
            return Err(AnalyticsError::UnknownAgeGroup(age_group.to_string()));
        }
        Ok(res)
    }

    /// One interval per age group for the given party.
    pub fn for_party(&self, party: &str) -> Result<Vec<&ThetaInterval>, AnalyticsError> {
        let res: Vec<&ThetaInterval> = self.rows.iter().filter(|r| r.party == party).collect();
        if res.is_empty() {
            return Err(AnalyticsError::UnknownParty(party.to_string()));
        }
        Ok(res)
    }
}

/// The q-th percentile (0 to 100) with linear interpolation between the
/// closest ranks. NaN values are ignored; None if nothing is left.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut xs: Vec<f64> = values.iter().cloned().filter(|x| !x.is_nan()).collect();
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (xs.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(xs[lo] + (xs[hi] - xs[lo]) * frac)
}

/// A point estimate with, when bootstrap samples are available, its 95% interval.
#[derive(PartialEq, Debug, Clone)]
pub struct PointEstimate {
    pub age_group: String,
    pub party: String,
    pub theta: f64,
    pub interval: Option<(f64, f64)>,
}

/// Bootstrap replicates of the θ table: `samples[b][g][p]`.
pub type BootstrapSamples = Vec<Vec<Vec<f64>>>;

/// Every (age group, party) estimate, by age group then party.
///
/// The interval is the 2.5 and 97.5 percentiles of the replicates. A cell
/// whose replicates are all NaN has no interval.
pub fn point_estimates(
    table: &ThetaTable,
    samples: Option<&BootstrapSamples>,
) -> Result<Vec<PointEstimate>, AnalyticsError> {
    if let Some(s) = samples {
        if s.is_empty() {
            return Err(AnalyticsError::EmptyBootstrap);
        }
        for replicate in s.iter() {
            if replicate.len() != table.age_groups.len() {
                return Err(AnalyticsError::RaggedTable {
                    age_group: "<bootstrap>".to_string(),
                    expected: table.age_groups.len(),
                    found: replicate.len(),
                });
            }
            for (group, row) in table.age_groups.iter().zip(replicate.iter()) {
                if row.len() != table.parties.len() {
                    return Err(AnalyticsError::RaggedTable {
                        age_group: group.clone(),
                        expected: table.parties.len(),
                        found: row.len(),
                    });
                }
            }
        }
    }

    let mut res: Vec<PointEstimate> = Vec::new();
    for (g, group) in table.age_groups.iter().enumerate() {
        for (p, party) in table.parties.iter().enumerate() {
            let interval = samples.and_then(|s| {
                let cell: Vec<f64> = s.iter().map(|replicate| replicate[g][p]).collect();
                Some((percentile(&cell, 2.5)?, percentile(&cell, 97.5)?))
            });
            debug!("point_estimates: {} / {}: {:?}", group, party, interval);
            res.push(PointEstimate {
                age_group: group.clone(),
                party: party.clone(),
                theta: table.values[g][p],
                interval,
            });
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ThetaTable {
        ThetaTable::new(
            vec!["A".to_string(), "B".to_string()],
            vec![
                ("16-24".to_string(), vec![0.6, 0.4]),
                ("25-30".to_string(), vec![0.3, 0.7]),
            ],
        )
        .unwrap()
    }

    fn interval(g: &str, p: &str, low: f64, median: f64, high: f64) -> ThetaInterval {
        ThetaInterval {
            age_group: g.to_string(),
            party: p.to_string(),
            low,
            median,
            high,
        }
    }

    #[test]
    fn table_lookup() {
        let t = table();
        assert_eq!(t.get("25-30", "B"), Some(0.7));
        assert_eq!(t.get("61+", "B"), None);
    }

    #[test]
    fn table_validation() {
        let ragged = ThetaTable::new(vec!["A".to_string()], vec![("x".to_string(), vec![0.1, 0.2])]);
        assert!(matches!(ragged, Err(AnalyticsError::RaggedTable { .. })));
        let bad = ThetaTable::new(vec!["A".to_string()], vec![("x".to_string(), vec![1.5])]);
        assert!(matches!(bad, Err(AnalyticsError::InvalidProbability { .. })));
        let nan = ThetaTable::new(vec!["A".to_string()], vec![("x".to_string(), vec![f64::NAN])]);
        assert!(nan.is_err());
    }

    #[test]
    fn interval_selections() {
        let res = ThetaIntervals::new(vec![
            interval("16-24", "A", 0.5, 0.6, 0.7),
            interval("16-24", "B", 0.3, 0.4, 0.5),
            interval("25-30", "A", 0.2, 0.3, 0.4),
            interval("25-30", "B", 0.8, 0.7, 0.75),
        ])
        .unwrap();
        assert_eq!(
            res.warnings,
            vec![Diagnostic::UnorderedInterval {
                age_group: "25-30".to_string(),
                party: "B".to_string()
            }]
        );
        let iv = res.value;
        assert_eq!(iv.age_groups(), vec!["16-24", "25-30"]);
        assert_eq!(iv.parties(), vec!["A", "B"]);
        let young = iv.for_age_group("16-24").unwrap();
        assert_eq!(young.len(), 2);
        assert_eq!(young[1].party, "B");
        let a = iv.for_party("A").unwrap();
        assert_eq!(a.iter().map(|r| r.median).collect::<Vec<f64>>(), vec![0.6, 0.3]);
        assert_eq!(iv.for_party("C"), Err(AnalyticsError::UnknownParty("C".to_string())));
        assert!(iv.for_age_group("99").is_err());
    }

    #[test]
    fn percentiles_interpolate() {
        let xs = vec![4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&xs, 50.0), Some(3.0));
        assert_eq!(percentile(&xs, 0.0), Some(1.0));
        assert_eq!(percentile(&xs, 100.0), Some(5.0));
        assert_eq!(percentile(&xs, 25.0), Some(2.0));
        // rank = 0.1 * 4 = 0.4 -> 1.0 + 0.4 * 1.0
        assert!((percentile(&xs, 10.0).unwrap() - 1.4).abs() < 1e-12);
        assert_eq!(percentile(&[f64::NAN, 2.0], 50.0), Some(2.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn point_estimates_with_and_without_samples() {
        let t = table();
        let plain = point_estimates(&t, None).unwrap();
        assert_eq!(plain.len(), 4);
        assert_eq!(plain[1].party, "B");
        assert_eq!(plain[1].theta, 0.4);
        assert!(plain.iter().all(|e| e.interval.is_none()));

        let samples: BootstrapSamples = (0..=40)
            .map(|b| {
                let x = b as f64 / 40.0;
                vec![vec![x, 1.0 - x], vec![f64::NAN, 0.5]]
            })
            .collect();
        let with = point_estimates(&t, Some(&samples)).unwrap();
        let (low, high) = with[0].interval.unwrap();
        assert!((low - 0.025).abs() < 1e-12);
        assert!((high - 0.975).abs() < 1e-12);
        // All replicates missing for this cell.
        assert_eq!(with[2].interval, None);
        assert_eq!(with[3].interval, Some((0.5, 0.5)));

        let ragged: BootstrapSamples = vec![vec![vec![0.1]]];
        assert!(point_estimates(&t, Some(&ragged)).is_err());
        assert_eq!(
            point_estimates(&t, Some(&Vec::new())),
            Err(AnalyticsError::EmptyBootstrap)
        );
    }
}
