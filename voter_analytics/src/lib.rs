/*!
Aggregations over a voter roll (padrón): participation per age bracket,
coverage of the observed vote status, voters per zone polygon with the
polygon centroids, and gender / occupation breakdowns per polygon.

All the functions are pure: they take the in-memory tables and return
derived tables. Data-quality problems (unknown zone keys, degenerate
polygons, empty brackets) do not abort anything. They are returned as
[`Diagnostic`]s next to the result, inside an [`Analysis`].

```
use voter_analytics::builder::RollBuilder;
use voter_analytics::*;

let mut builder = RollBuilder::new();
builder
    .add_voter("1", Some(2003), "ZONA 1", "2", VoteStatus::Voted)
    .add_voter("2", Some(1961), "ZONA 1", "2", VoteStatus::DidNotVote)
    .add_voter("3", Some(1980), "ZONA 1", "2", VoteStatus::Unknown);

let summary = turnout_summary(&builder.voters(), 2025);
assert_eq!(summary.value.coverage.known, 2);
assert_eq!(summary.value.outcome.participation(), Some(50.0));
# Ok::<(), AnalyticsError>(())
```
*/
mod config;
use log::info;

pub mod age;
pub mod auth;
pub mod builder;
pub mod crosstab;
pub mod geometry;
pub mod manual;
pub mod map;
pub mod theta;
pub mod turnout;
pub mod zones;

pub use crate::config::*;
pub use crate::turnout::{BracketTurnout, InformationCoverage, VoteOutcome};

/// The three participation tables of a voting period.
#[derive(PartialEq, Debug, Clone)]
pub struct TurnoutSummary {
    pub coverage: InformationCoverage,
    pub outcome: VoteOutcome,
    pub by_bracket: Vec<BracketTurnout>,
}

/// Computes the coverage, the outcome and the per-bracket participation.
///
/// Arguments:
/// * `records` the voter roll, with the vote status of the period
/// * `reference_year` the year the ages are computed for
pub fn turnout_summary(records: &[VoterRecord], reference_year: i32) -> Analysis<TurnoutSummary> {
    info!(
        "turnout_summary: Processing {:?} voters, reference year {}",
        records.len(),
        reference_year
    );
    let by_bracket = turnout::turnout_by_bracket(records, reference_year);
    Analysis {
        value: TurnoutSummary {
            coverage: turnout::information_coverage(records),
            outcome: turnout::vote_outcome(records),
            by_bracket: by_bracket.value,
        },
        warnings: by_bracket.warnings,
    }
}
