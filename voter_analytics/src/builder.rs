pub use crate::config::*;

/// A builder for assembling a voter roll and its zone geometry in code.
///
/// The file readers of the `padron` program produce the same structures.
///
/// ```
/// use voter_analytics::builder::RollBuilder;
/// use voter_analytics::VoteStatus;
///
/// let mut builder = RollBuilder::new();
/// builder
///     .add_voter("20111222", Some(1990), "ZONA 1", "3", VoteStatus::Voted)
///     .add_vertex("ZONA 1", "3", 1, -61.0, -38.0)
///     .add_vertex("ZONA 1", "3", 2, -61.1, -38.0)
///     .add_vertex("ZONA 1", "3", 3, -61.1, -38.1);
///
/// assert_eq!(builder.voters().len(), 1);
/// assert_eq!(builder.vertices().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RollBuilder {
    pub(crate) _voters: Vec<VoterRecord>,
    pub(crate) _vertices: Vec<PolygonVertex>,
}

impl RollBuilder {
    pub fn new() -> RollBuilder {
        RollBuilder::default()
    }

    /// Adds a voter with only the fields needed for the turnout and map views.
    pub fn add_voter(
        &mut self,
        document_id: &str,
        birth_year: Option<i32>,
        zone: &str,
        polygon: &str,
        vote_status: VoteStatus,
    ) -> &mut RollBuilder {
        self.add_voter_2(&VoterRecord {
            document_id: document_id.to_string(),
            birth_year,
            gender: None,
            occupation: None,
            zone: zone.to_string(),
            polygon: polygon.to_string(),
            longitude: None,
            latitude: None,
            vote_status,
        })
    }

    /// Adds a voter with its demographic data.
    ///
    /// Empty strings are recorded as missing values.
    pub fn add_voter_with_profile(
        &mut self,
        document_id: &str,
        zone: &str,
        polygon: &str,
        gender: &str,
        occupation: &str,
    ) -> &mut RollBuilder {
        let non_empty = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        self.add_voter_2(&VoterRecord {
            document_id: document_id.to_string(),
            birth_year: None,
            gender: non_empty(gender),
            occupation: non_empty(occupation),
            zone: zone.to_string(),
            polygon: polygon.to_string(),
            longitude: None,
            latitude: None,
            vote_status: VoteStatus::Unknown,
        })
    }

    pub fn add_voter_2(&mut self, record: &VoterRecord) -> &mut RollBuilder {
        self._voters.push(record.clone());
        self
    }

    pub fn add_vertex(
        &mut self,
        zone: &str,
        polygon: &str,
        order: i64,
        longitude: f64,
        latitude: f64,
    ) -> &mut RollBuilder {
        self._vertices.push(PolygonVertex {
            zone: zone.to_string(),
            polygon: polygon.to_string(),
            order,
            longitude,
            latitude,
        });
        self
    }

    pub fn voters(&self) -> Vec<VoterRecord> {
        self._voters.clone()
    }

    pub fn vertices(&self) -> Vec<PolygonVertex> {
        self._vertices.clone()
    }
}
