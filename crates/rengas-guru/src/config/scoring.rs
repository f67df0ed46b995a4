use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables threaded through the field parsers, normalizer and preference model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub grades: GradeTable,
    #[serde(default)]
    pub noise_range: NoiseRange,
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

/// Letter grade to ordinal mapping used for EU label classes.
///
/// Keys are stored upper-case; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeTable {
    entries: BTreeMap<char, u8>,
}

impl GradeTable {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (char, u8)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(grade, ordinal)| (grade.to_ascii_uppercase(), ordinal))
                .collect(),
        }
    }

    pub fn ordinal(&self, grade: char) -> Option<u8> {
        self.entries.get(&grade.to_ascii_uppercase()).copied()
    }

    pub fn best(&self) -> u8 {
        self.entries.values().copied().max().unwrap_or(0)
    }
}

impl Default for GradeTable {
    fn default() -> Self {
        Self::new([
            ('A', 5),
            ('B', 4),
            ('C', 3),
            ('D', 2),
            ('E', 1),
            ('F', 0),
            ('G', 0),
        ])
    }
}

/// Closed decibel interval considered physically plausible for tire rolling noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseRange {
    pub min_db: f64,
    pub max_db: f64,
}

impl NoiseRange {
    pub fn new(min_db: f64, max_db: f64) -> Option<Self> {
        (min_db <= max_db).then_some(Self { min_db, max_db })
    }

    pub fn contains(&self, decibels: f64) -> bool {
        decibels >= self.min_db && decibels <= self.max_db
    }
}

impl Default for NoiseRange {
    fn default() -> Self {
        Self {
            min_db: 50.0,
            max_db: 100.0,
        }
    }
}

/// How rounding error is distributed when preference weights are rescaled to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Floor every weight, then give the leftover points to the largest fractions.
    #[default]
    LargestRemainder,
    /// Round each weight on its own; the total may land a point or two off 100.
    Independent,
}

impl RoundingPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "largest_remainder" | "largest-remainder" | "hamilton" => Some(Self::LargestRemainder),
            "independent" | "legacy" => Some(Self::Independent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_lookup_ignores_case() {
        let table = GradeTable::default();
        assert_eq!(table.ordinal('a'), Some(5));
        assert_eq!(table.ordinal('E'), Some(1));
        assert_eq!(table.ordinal('g'), Some(0));
        assert_eq!(table.ordinal('Z'), None);
        assert_eq!(table.best(), 5);
    }

    #[test]
    fn noise_range_is_closed() {
        let range = NoiseRange::default();
        assert!(range.contains(50.0));
        assert!(range.contains(100.0));
        assert!(!range.contains(49.9));
        assert!(!range.contains(100.1));
        assert!(NoiseRange::new(80.0, 60.0).is_none());
    }

    #[test]
    fn rounding_policy_parses_aliases() {
        assert_eq!(
            RoundingPolicy::parse(" Largest-Remainder "),
            Some(RoundingPolicy::LargestRemainder)
        );
        assert_eq!(
            RoundingPolicy::parse("legacy"),
            Some(RoundingPolicy::Independent)
        );
        assert_eq!(RoundingPolicy::parse("nearest"), None);
    }
}
