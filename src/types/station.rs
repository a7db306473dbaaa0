//! The two monitoring stations the dashboard materializes subsets for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fixed monitoring location, identified by its exact name in the `station` column.
///
/// Matching is exact and case-sensitive: a row with `"dongsi"` belongs to neither station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Station {
    Dongsi,
    Wanliu,
}

impl Station {
    pub const ALL: [Station; 2] = [Station::Dongsi, Station::Wanliu];

    pub fn name(&self) -> &'static str {
        match self {
            Station::Dongsi => "Dongsi",
            Station::Wanliu => "Wanliu",
        }
    }

    /// Resolves a raw `station` value, returning `None` for anything that is not an exact match.
    pub fn from_name(name: &str) -> Option<Station> {
        Station::ALL.into_iter().find(|station| station.name() == name)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Station {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Station::from_name(s).ok_or_else(|| format!("unknown station '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_sensitive() {
        assert_eq!(Station::from_name("Dongsi"), Some(Station::Dongsi));
        assert_eq!(Station::from_name("Wanliu"), Some(Station::Wanliu));
        assert_eq!(Station::from_name("dongsi"), None);
        assert_eq!(Station::from_name("Wanliu "), None);
        assert_eq!(Station::from_name("Aotizhongxin"), None);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Station::Wanliu.to_string(), "Wanliu");
        assert_eq!("Dongsi".parse::<Station>(), Ok(Station::Dongsi));
        assert!("DONGSI".parse::<Station>().is_err());
    }
}
