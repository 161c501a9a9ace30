use log::{debug, info, warn};

use crate::age::bracket_of;
use crate::config::*;

/// How many voters have an observed vote status in the period.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct InformationCoverage {
    pub known: u64,
    pub unknown: u64,
}

impl InformationCoverage {
    pub fn total(&self) -> u64 {
        self.known + self.unknown
    }

    pub fn known_share(&self) -> Option<f64> {
        percentage(self.known, self.total())
    }

    pub fn unknown_share(&self) -> Option<f64> {
        percentage(self.unknown, self.total())
    }
}

/// Among the voters with an observed status, who voted.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct VoteOutcome {
    pub voted: u64,
    pub did_not_vote: u64,
}

impl VoteOutcome {
    pub fn total(&self) -> u64 {
        self.voted + self.did_not_vote
    }

    /// Participation in percent, rounded to 2 decimals.
    /// None when nobody has a known status.
    pub fn participation(&self) -> Option<f64> {
        percentage(self.voted, self.total())
    }

    pub fn abstention(&self) -> Option<f64> {
        percentage(self.did_not_vote, self.total())
    }

    fn add(&mut self, status: VoteStatus) {
        match status {
            VoteStatus::Voted => self.voted += 1,
            VoteStatus::DidNotVote => self.did_not_vote += 1,
            VoteStatus::Unknown => {}
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct BracketTurnout {
    pub bracket: AgeBracket,
    pub outcome: VoteOutcome,
}

impl BracketTurnout {
    pub fn participation(&self) -> Option<f64> {
        self.outcome.participation()
    }
}

/// `part / total * 100`, rounded to 2 decimals. Undefined for an empty total.
pub fn percentage(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(round2(part as f64 / total as f64 * 100.0))
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Share of voters with and without an observed status.
pub fn information_coverage(records: &[VoterRecord]) -> InformationCoverage {
    let known = records.iter().filter(|r| r.vote_status.is_known()).count() as u64;
    let res = InformationCoverage {
        known,
        unknown: records.len() as u64 - known,
    };
    info!("information_coverage: {:?}", res);
    res
}

/// Voted vs did not vote, over the voters with a known status only.
pub fn vote_outcome(records: &[VoterRecord]) -> VoteOutcome {
    let mut res = VoteOutcome::default();
    for r in records.iter() {
        res.add(r.vote_status);
    }
    info!("vote_outcome: {:?}", res);
    res
}

/// Participation per age bracket.
///
/// The rows always come in bracket order and all five brackets are present.
/// Voters without a bracket (under 16, unknown birth year) or without a
/// known status are left out. A bracket that ends up without any voter is
/// reported in the warnings and gets zero counts and no participation.
pub fn turnout_by_bracket(
    records: &[VoterRecord],
    reference_year: i32,
) -> Analysis<Vec<BracketTurnout>> {
    let mut rows: Vec<BracketTurnout> = AgeBracket::ALL
        .iter()
        .map(|b| BracketTurnout {
            bracket: *b,
            outcome: VoteOutcome::default(),
        })
        .collect();

    let mut skipped_no_bracket = 0;
    for r in records.iter() {
        if !r.vote_status.is_known() {
            continue;
        }
        match bracket_of(r, reference_year) {
            Some(b) => {
                // ALL is in the same order as the rows.
                if let Some(row) = rows.iter_mut().find(|row| row.bracket == b) {
                    row.outcome.add(r.vote_status);
                }
            }
            None => {
                skipped_no_bracket += 1;
            }
        }
    }
    debug!(
        "turnout_by_bracket: {} voters with known status and no bracket",
        skipped_no_bracket
    );

    let mut warnings: Vec<Diagnostic> = Vec::new();
    for row in rows.iter() {
        if row.outcome.total() == 0 {
            warn!("turnout_by_bracket: no voter with known status in {}", row.bracket);
            warnings.push(Diagnostic::EmptyBracket(row.bracket));
        }
    }
    Analysis {
        value: rows,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RollBuilder;

    fn scenario_roll() -> Vec<VoterRecord> {
        // 100 voters: 60 voted, 20 did not, 20 unknown
        let mut b = RollBuilder::new();
        for i in 0..100 {
            let status = match i {
                0..=59 => VoteStatus::Voted,
                60..=79 => VoteStatus::DidNotVote,
                _ => VoteStatus::Unknown,
            };
            b.add_voter(&format!("{}", i), Some(1980), "ZONA 1", "1", status);
        }
        b.voters()
    }

    #[test]
    fn coverage_and_outcome() {
        let _ = env_logger::builder().is_test(true).try_init();
        let roll = scenario_roll();
        let cov = information_coverage(&roll);
        assert_eq!(cov, InformationCoverage { known: 80, unknown: 20 });
        assert_eq!(cov.known_share(), Some(80.0));
        assert_eq!(cov.unknown_share(), Some(20.0));

        let out = vote_outcome(&roll);
        assert_eq!(out.voted, 60);
        assert_eq!(out.did_not_vote, 20);
        assert_eq!(out.participation(), Some(75.0));
        assert_eq!(out.abstention(), Some(25.0));
    }

    #[test]
    fn empty_roll_is_well_defined() {
        let cov = information_coverage(&[]);
        assert_eq!(cov.total(), 0);
        assert_eq!(cov.known_share(), None);
        let out = vote_outcome(&[]);
        assert_eq!(out.participation(), None);

        let res = turnout_by_bracket(&[], 2025);
        assert_eq!(res.value.len(), 5);
        assert_eq!(res.warnings.len(), 5);
        for row in res.value {
            assert_eq!(row.outcome.total(), 0);
            assert_eq!(row.participation(), None);
        }
    }

    #[test]
    fn by_bracket_counts_and_order() {
        let mut b = RollBuilder::new();
        // Inserted out of order on purpose.
        b.add_voter("a", Some(1950), "Z", "1", VoteStatus::Voted);
        b.add_voter("b", Some(2005), "Z", "1", VoteStatus::Voted);
        b.add_voter("c", Some(2005), "Z", "1", VoteStatus::DidNotVote);
        b.add_voter("d", Some(2004), "Z", "1", VoteStatus::Voted);
        b.add_voter("e", Some(1990), "Z", "1", VoteStatus::Unknown);
        // Under 16: never counted.
        b.add_voter("f", Some(2015), "Z", "1", VoteStatus::Voted);
        b.add_voter("g", None, "Z", "1", VoteStatus::Voted);
        let res = turnout_by_bracket(&b.voters(), 2025);

        let labels: Vec<&str> = res.value.iter().map(|r| r.bracket.label()).collect();
        assert_eq!(labels, vec!["16-24", "25-30", "31-44", "45-60", "61+"]);

        let young = res.value[0];
        assert_eq!(young.outcome.voted, 2);
        assert_eq!(young.outcome.did_not_vote, 1);
        assert_eq!(young.participation(), Some(66.67));

        let old = res.value[4];
        assert_eq!(old.outcome.voted, 1);
        assert_eq!(old.participation(), Some(100.0));

        // 25-30, 31-44 (only an unknown status) and 45-60 are empty.
        assert_eq!(
            res.warnings,
            vec![
                Diagnostic::EmptyBracket(AgeBracket::From25To30),
                Diagnostic::EmptyBracket(AgeBracket::From31To44),
                Diagnostic::EmptyBracket(AgeBracket::From45To60),
            ]
        );
    }

    #[test]
    fn bracket_totals_match_known_records() {
        let roll = scenario_roll();
        let res = turnout_by_bracket(&roll, 2025);
        let total: u64 = res.value.iter().map(|r| r.outcome.total()).sum();
        assert_eq!(total, 80);
        // Everybody was born in 1980 -> 45 years old.
        assert_eq!(res.value[3].outcome.voted, 60);
        assert_eq!(res.value[3].outcome.did_not_vote, 20);
    }

    #[test]
    fn extreme_birth_years_have_no_bracket() {
        let mut b = RollBuilder::new();
        b.add_voter("a", Some(i32::MIN), "Z", "1", VoteStatus::Voted);
        b.add_voter("b", Some(i32::MAX), "Z", "1", VoteStatus::DidNotVote);
        b.add_voter("c", Some(1990), "Z", "1", VoteStatus::Voted);
        let res = turnout_by_bracket(&b.voters(), 2025);
        let total: u64 = res.value.iter().map(|r| r.outcome.total()).sum();
        assert_eq!(total, 1);
        assert_eq!(res.value[2].outcome.voted, 1);
    }

    #[test]
    fn vote_status_parsing() {
        assert_eq!(VoteStatus::parse("True"), VoteStatus::Voted);
        assert_eq!(VoteStatus::parse(" false "), VoteStatus::DidNotVote);
        assert_eq!(VoteStatus::parse("1"), VoteStatus::Voted);
        assert_eq!(VoteStatus::parse("0"), VoteStatus::DidNotVote);
        assert_eq!(VoteStatus::parse(""), VoteStatus::Unknown);
        assert_eq!(VoteStatus::parse("nan"), VoteStatus::Unknown);
    }
}
