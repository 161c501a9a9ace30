// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The observed participation of a voter in one election period.
///
/// The roll only records participation for the ballot boxes whose
/// signed rolls were recovered. Every other voter is `Unknown`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VoteStatus {
    Voted,
    DidNotVote,
    Unknown,
}

impl VoteStatus {
    pub fn is_known(&self) -> bool {
        !matches!(self, VoteStatus::Unknown)
    }

    /// Reads the textual form found in the exported rolls.
    ///
    /// `true`/`false` (any case) and `1`/`0` are understood, everything
    /// else (including the empty cell) is unknown.
    pub fn parse(s: &str) -> VoteStatus {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "1.0" => VoteStatus::Voted,
            "false" | "0" | "0.0" => VoteStatus::DidNotVote,
            _ => VoteStatus::Unknown,
        }
    }
}

impl From<Option<bool>> for VoteStatus {
    fn from(b: Option<bool>) -> Self {
        match b {
            Some(true) => VoteStatus::Voted,
            Some(false) => VoteStatus::DidNotVote,
            None => VoteStatus::Unknown,
        }
    }
}

/// One row of the voter roll (padrón).
#[derive(PartialEq, Debug, Clone)]
pub struct VoterRecord {
    pub document_id: String,
    /// The roll stores the year of birth only.
    pub birth_year: Option<i32>,
    pub gender: Option<String>,
    /// Free text, normalized by the cross-tabulator.
    pub occupation: Option<String>,
    /// Free text, normalized into a zone key by the matcher.
    pub zone: String,
    pub polygon: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub vote_status: VoteStatus,
}

/// One vertex of a zone polygon, as stored in the geometry table.
#[derive(PartialEq, Debug, Clone)]
pub struct PolygonVertex {
    pub zone: String,
    pub polygon: String,
    /// Position of the vertex in the ring.
    pub order: i64,
    pub longitude: f64,
    pub latitude: f64,
}

/// The age ranges used for the participation analysis.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum AgeBracket {
    From16To24,
    From25To30,
    From31To44,
    From45To60,
    From61,
}

impl AgeBracket {
    /// All the brackets, in presentation order.
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::From16To24,
        AgeBracket::From25To30,
        AgeBracket::From31To44,
        AgeBracket::From45To60,
        AgeBracket::From61,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::From16To24 => "16-24",
            AgeBracket::From25To30 => "25-30",
            AgeBracket::From31To44 => "31-44",
            AgeBracket::From45To60 => "45-60",
            AgeBracket::From61 => "61+",
        }
    }

    pub fn from_label(s: &str) -> Option<AgeBracket> {
        AgeBracket::ALL.iter().find(|b| b.label() == s.trim()).copied()
    }
}

impl Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ******** Output data structures *********

/// A data-quality problem found while building a view.
///
/// Diagnostics never stop the processing: the affected entity is
/// left out and everything else is still computed.
#[derive(PartialEq, Debug, Clone)]
pub enum Diagnostic {
    /// A zone key used by some voters has no geometry.
    UnmatchedKey(String),
    /// A polygon that cannot be drawn or labelled.
    DegeneratePolygon { key: String, reason: String },
    /// An age bracket without any voter of known status.
    EmptyBracket(AgeBracket),
    /// A bootstrap interval whose bounds are not ordered.
    UnorderedInterval { age_group: String, party: String },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnmatchedKey(k) => write!(f, "polygon without match in the map: {}", k),
            Diagnostic::DegeneratePolygon { key, reason } => {
                write!(f, "degenerate polygon {}: {}", key, reason)
            }
            Diagnostic::EmptyBracket(b) => {
                write!(f, "age bracket {} has no voter with known status", b)
            }
            Diagnostic::UnorderedInterval { age_group, party } => write!(
                f,
                "interval for age group {} and party {} is not ordered",
                age_group, party
            ),
        }
    }
}

/// A result together with the data-quality warnings raised while computing it.
#[derive(PartialEq, Debug, Clone)]
pub struct Analysis<T> {
    pub value: T,
    pub warnings: Vec<Diagnostic>,
}

impl<T> Analysis<T> {
    pub fn clean(value: T) -> Analysis<T> {
        Analysis {
            value,
            warnings: Vec::new(),
        }
    }
}

/// Errors that prevent a table from being interpreted.
#[derive(PartialEq, Debug, Clone)]
pub enum AnalyticsError {
    /// A row of the probability table does not have one value per party.
    RaggedTable { age_group: String, expected: usize, found: usize },
    /// A probability that is not a number in [0, 1].
    InvalidProbability { age_group: String, party: String, value: f64 },
    EmptyBootstrap,
    UnknownAgeGroup(String),
    UnknownParty(String),
}

impl Error for AnalyticsError {}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyticsError::RaggedTable {
                age_group,
                expected,
                found,
            } => write!(
                f,
                "age group {}: expected {} values, found {}",
                age_group, expected, found
            ),
            AnalyticsError::InvalidProbability {
                age_group,
                party,
                value,
            } => write!(
                f,
                "age group {} party {}: {} is not a probability",
                age_group, party, value
            ),
            AnalyticsError::EmptyBootstrap => write!(f, "the bootstrap sample is empty"),
            AnalyticsError::UnknownAgeGroup(g) => write!(f, "unknown age group {}", g),
            AnalyticsError::UnknownParty(p) => write!(f, "unknown party {}", p),
        }
    }
}
