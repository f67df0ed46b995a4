use super::record::{ProductRecord, RawField, Season};
use crate::scoring::parsers::coerce_positive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown season code '{0}' (expected summer/So/Su or winter/Wi/Ta)")]
pub struct UnknownSeason(pub String);

impl FromStr for Season {
    type Err = UnknownSeason;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Season::from_code(value).ok_or_else(|| UnknownSeason(value.to_string()))
    }
}

impl TryFrom<String> for Season {
    type Error = UnknownSeason;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Equality predicates narrowing the catalog down to one comparison set.
///
/// Unset predicates match everything; set ones must all match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub rim_size: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub profile: Option<f64>,
}

impl CatalogQuery {
    pub fn is_empty(&self) -> bool {
        self.season.is_none()
            && self.rim_size.is_none()
            && self.width.is_none()
            && self.profile.is_none()
    }

    pub fn matches(&self, record: &ProductRecord) -> bool {
        if let Some(season) = self.season {
            if record.season_kind() != Some(season) {
                return false;
            }
        }

        dimension_matches(self.rim_size, record.rim_size.as_ref())
            && dimension_matches(self.width, record.width.as_ref())
            && dimension_matches(self.profile, record.profile.as_ref())
    }

    /// Keeps matching records in their original order.
    pub fn apply(&self, records: &[ProductRecord]) -> Vec<ProductRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }

    /// Widths on offer for the chosen season and rim size, ascending.
    ///
    /// Empty until both are chosen; the query's own width and profile are ignored.
    pub fn available_widths(&self, records: &[ProductRecord]) -> Vec<f64> {
        if self.season.is_none() || self.rim_size.is_none() {
            return Vec::new();
        }
        let scope = CatalogQuery {
            width: None,
            profile: None,
            ..self.clone()
        };
        distinct_dimension(records, &scope, |record| record.width.as_ref())
    }

    /// Profiles on offer for the chosen season, rim size and width, ascending.
    pub fn available_profiles(&self, records: &[ProductRecord]) -> Vec<f64> {
        if self.season.is_none() || self.rim_size.is_none() || self.width.is_none() {
            return Vec::new();
        }
        let scope = CatalogQuery {
            profile: None,
            ..self.clone()
        };
        distinct_dimension(records, &scope, |record| record.profile.as_ref())
    }
}

fn distinct_dimension<F>(records: &[ProductRecord], scope: &CatalogQuery, field: F) -> Vec<f64>
where
    F: Fn(&ProductRecord) -> Option<&RawField>,
{
    let mut values: Vec<f64> = records
        .iter()
        .filter(|record| scope.matches(record))
        .filter_map(|record| coerce_positive(field(record)))
        .collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

fn dimension_matches(wanted: Option<f64>, actual: Option<&RawField>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => coerce_positive(actual).is_some_and(|value| value == wanted),
    }
}
