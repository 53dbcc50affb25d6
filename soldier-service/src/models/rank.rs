use serde::{Deserialize, Serialize};

/// The seven grade levels in ascending order; the index is the numeric level.
const RANK_NAMES: [&str; 7] = [
    "private",
    "corporal",
    "sergeant",
    "lieutenant",
    "captain",
    "major",
    "colonel",
];

/// A fully-resolved rank. Stored and returned records always carry both the
/// symbolic name and the numeric level, kept mutually consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    pub name: String,
    pub value: i32,
}

impl Rank {
    /// Looks up a rank by numeric level (0-6).
    pub fn from_value(value: i32) -> Option<Rank> {
        let name = usize::try_from(value)
            .ok()
            .and_then(|i| RANK_NAMES.get(i))?;
        Some(Rank {
            name: name.to_string(),
            value,
        })
    }

    /// Looks up a rank by name, case-insensitively. The returned name is the
    /// table's canonical lowercase form.
    pub fn from_name(name: &str) -> Option<Rank> {
        let lowered = name.to_lowercase();
        let value = RANK_NAMES.iter().position(|n| *n == lowered)?;
        Some(Rank {
            name: lowered,
            value: value as i32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_and_name_lookups_agree() {
        for value in 0..7 {
            let by_value = Rank::from_value(value).unwrap();
            let by_name = Rank::from_name(&by_value.name).unwrap();
            assert_eq!(by_value, by_name);
        }
    }

    #[test]
    fn name_lookup_is_case_insensitive_and_canonicalizes() {
        let rank = Rank::from_name("Major").unwrap();
        assert_eq!(rank.name, "major");
        assert_eq!(rank.value, 5);

        let rank = Rank::from_name("COLONEL").unwrap();
        assert_eq!(rank.name, "colonel");
        assert_eq!(rank.value, 6);
    }

    #[test]
    fn out_of_table_inputs_resolve_to_none() {
        assert!(Rank::from_value(-1).is_none());
        assert!(Rank::from_value(7).is_none());
        assert!(Rank::from_name("generalissimo").is_none());
    }
}
