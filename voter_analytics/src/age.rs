use crate::config::*;

/// The year the ages are computed against.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

/// Age in whole years at the reference year. The roll only has birth years.
///
/// `None` when the difference does not fit an `i32`.
pub fn age(reference_year: i32, birth_year: i32) -> Option<i32> {
    reference_year.checked_sub(birth_year)
}

/// Maps an age to its bracket. Voters under 16 have no bracket and are
/// not part of any participation table.
pub fn classify(age: i32) -> Option<AgeBracket> {
    match age {
        16..=24 => Some(AgeBracket::From16To24),
        25..=30 => Some(AgeBracket::From25To30),
        31..=44 => Some(AgeBracket::From31To44),
        45..=60 => Some(AgeBracket::From45To60),
        a if a > 60 => Some(AgeBracket::From61),
        _ => None,
    }
}

/// The bracket of a voter, if the birth year is known and the voter is 16 or older.
pub fn bracket_of(record: &VoterRecord, reference_year: i32) -> Option<AgeBracket> {
    record
        .birth_year
        .and_then(|y| age(reference_year, y))
        .and_then(classify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_boundaries() {
        assert_eq!(classify(15), None);
        assert_eq!(classify(16), Some(AgeBracket::From16To24));
        assert_eq!(classify(24), Some(AgeBracket::From16To24));
        assert_eq!(classify(25), Some(AgeBracket::From25To30));
        assert_eq!(classify(30), Some(AgeBracket::From25To30));
        assert_eq!(classify(31), Some(AgeBracket::From31To44));
        assert_eq!(classify(44), Some(AgeBracket::From31To44));
        assert_eq!(classify(45), Some(AgeBracket::From45To60));
        assert_eq!(classify(60), Some(AgeBracket::From45To60));
        assert_eq!(classify(61), Some(AgeBracket::From61));
        assert_eq!(classify(104), Some(AgeBracket::From61));
        assert_eq!(classify(-3), None);
    }

    #[test]
    fn brackets_partition_ages() {
        // Every age from 16 up falls in exactly one bracket, consecutive
        // ages never go back to an earlier bracket.
        let mut previous = AgeBracket::From16To24;
        for a in 16..130 {
            let b = classify(a).unwrap();
            assert!(b >= previous, "age {} went back to {}", a, b);
            previous = b;
        }
        for a in -10..16 {
            assert_eq!(classify(a), None);
        }
    }

    #[test]
    fn bracket_of_record() {
        let mut r = VoterRecord {
            document_id: "1".to_string(),
            birth_year: Some(2001),
            gender: None,
            occupation: None,
            zone: "ZONA 1".to_string(),
            polygon: "1".to_string(),
            longitude: None,
            latitude: None,
            vote_status: VoteStatus::Unknown,
        };
        assert_eq!(bracket_of(&r, 2025), Some(AgeBracket::From16To24));
        r.birth_year = Some(2010);
        assert_eq!(bracket_of(&r, 2025), None);
        r.birth_year = None;
        assert_eq!(bracket_of(&r, 2025), None);
        r.birth_year = Some(i32::MIN);
        assert_eq!(bracket_of(&r, 2025), None);
        r.birth_year = Some(i32::MAX);
        assert_eq!(bracket_of(&r, 2025), None);
    }

    #[test]
    fn age_overflow() {
        assert_eq!(age(2025, 1990), Some(35));
        assert_eq!(age(2025, i32::MIN), None);
        assert_eq!(age(-2, i32::MAX), None);
    }

    #[test]
    fn labels_round_trip() {
        for b in AgeBracket::ALL {
            assert_eq!(AgeBracket::from_label(b.label()), Some(b));
        }
        assert_eq!(AgeBracket::from_label("10-15"), None);
    }
}
