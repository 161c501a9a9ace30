// Readers for the vote-probability tables produced by the estimation model.

use std::collections::HashMap;

use crate::padron::io_common::{parse_float, RawTable};
use crate::padron::io_tsv::read_delimited;
use crate::padron::*;

use voter_analytics::theta::{BootstrapSamples, ThetaInterval, ThetaIntervals, ThetaTable};
use voter_analytics::{AnalyticsError, Analysis};

const AGE_GROUP_COLUMN: &str = "age_group";

fn number(table: &RawTable, lineno: usize, row: &[String], idx: usize) -> PadronResult<f64> {
    let content = row.get(idx).cloned().unwrap_or_default();
    parse_float(&content).context(BadCellSnafu {
        path: table.path.clone(),
        lineno,
        column: table.header.get(idx).cloned().unwrap_or_default(),
        content,
    })
}

fn text(table: &RawTable, lineno: usize, row: &[String], idx: usize) -> PadronResult<String> {
    let content = row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();
    ensure!(
        !content.is_empty(),
        BadCellSnafu {
            path: table.path.clone(),
            lineno,
            column: table.header.get(idx).cloned().unwrap_or_default(),
            content,
        }
    );
    Ok(content)
}

/// Reads the point estimates: an `age_group` column, then one column per party.
pub fn read_theta_estimates(path: &str) -> PadronResult<ThetaTable> {
    let table = read_delimited(path, b',')?;
    let group_idx = table.required_column(AGE_GROUP_COLUMN)?;
    let party_cols: Vec<(usize, String)> = table
        .header
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != group_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut rows: Vec<(String, Vec<f64>)> = Vec::new();
    for (lineno, row) in table.rows.iter() {
        let group = text(&table, *lineno, row, group_idx)?;
        let mut values: Vec<f64> = Vec::with_capacity(party_cols.len());
        for (idx, _) in party_cols.iter() {
            values.push(number(&table, *lineno, row, *idx)?);
        }
        rows.push((group, values));
    }
    let parties: Vec<String> = party_cols.into_iter().map(|(_, p)| p).collect();
    debug!("read_theta_estimates: parties: {:?}", parties);
    ThetaTable::new(parties, rows).context(InvalidTableSnafu { path })
}

/// Reads the bootstrap summary (`age_group`, `party`, `theta_2.5`, `theta_50`, `theta_97.5`).
pub fn read_theta_intervals(path: &str) -> PadronResult<Analysis<ThetaIntervals>> {
    let table = read_delimited(path, b',')?;
    let group_idx = table.required_column(AGE_GROUP_COLUMN)?;
    let party_idx = table.required_column("party")?;
    let low_idx = table.required_column("theta_2.5")?;
    let median_idx = table.required_column("theta_50")?;
    let high_idx = table.required_column("theta_97.5")?;

    let mut rows: Vec<ThetaInterval> = Vec::new();
    for (lineno, row) in table.rows.iter() {
        let lineno = *lineno;
        rows.push(ThetaInterval {
            age_group: text(&table, lineno, row, group_idx)?,
            party: text(&table, lineno, row, party_idx)?,
            low: number(&table, lineno, row, low_idx)?,
            median: number(&table, lineno, row, median_idx)?,
            high: number(&table, lineno, row, high_idx)?,
        });
    }
    ThetaIntervals::new(rows).context(InvalidTableSnafu { path })
}

/// Reads bootstrap replicates in long format (`replicate`, `age_group`,
/// `party`, `theta`) into a cube aligned with the point estimates.
///
/// Cells absent from a replicate are NaN, which the percentiles skip.
pub fn read_theta_samples(path: &str, estimates: &ThetaTable) -> PadronResult<BootstrapSamples> {
    let table = read_delimited(path, b',')?;
    let replicate_idx = table.required_column("replicate")?;
    let group_idx = table.required_column(AGE_GROUP_COLUMN)?;
    let party_idx = table.required_column("party")?;
    let theta_idx = table.required_column("theta")?;

    let groups: HashMap<&str, usize> = estimates
        .age_groups
        .iter()
        .enumerate()
        .map(|(i, g)| (g.as_str(), i))
        .collect();
    let parties: HashMap<&str, usize> = estimates
        .parties
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_str(), i))
        .collect();

    let mut replicates: HashMap<String, usize> = HashMap::new();
    let mut res: BootstrapSamples = Vec::new();
    for (lineno, row) in table.rows.iter() {
        let lineno = *lineno;
        let replicate = text(&table, lineno, row, replicate_idx)?;
        let group = text(&table, lineno, row, group_idx)?;
        let party = text(&table, lineno, row, party_idx)?;
        let theta = number(&table, lineno, row, theta_idx)?;

        let g = match groups.get(group.as_str()) {
            Some(g) => *g,
            None => {
                return Err(AnalyticsError::UnknownAgeGroup(group)).context(InvalidTableSnafu { path })
            }
        };
        let p = match parties.get(party.as_str()) {
            Some(p) => *p,
            None => return Err(AnalyticsError::UnknownParty(party)).context(InvalidTableSnafu { path }),
        };
        let b = *replicates.entry(replicate).or_insert_with(|| {
            res.push(vec![vec![f64::NAN; estimates.parties.len()]; estimates.age_groups.len()]);
            res.len() - 1
        });
        res[b][g][p] = theta;
    }
    info!(
        "read_theta_samples: {} replicates read from {}",
        res.len(),
        path
    );
    if res.is_empty() {
        return Err(AnalyticsError::EmptyBootstrap).context(InvalidTableSnafu { path });
    }
    Ok(res)
}
