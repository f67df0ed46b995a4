use super::record::{ProductRecord, Season};
use serde::Serialize;
use std::fmt;

/// Data-quality finding for a single catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    Missing { field: &'static str },
    InvalidSeason { value: String },
    InvalidNumber { field: &'static str, value: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Missing { field } => write!(f, "Missing {field}"),
            ValidationIssue::InvalidSeason { value } => {
                write!(f, "Invalid season value: {value}")
            }
            ValidationIssue::InvalidNumber { field, value } => {
                write!(f, "Invalid {field} value: {value}")
            }
        }
    }
}

/// Lists everything wrong with a record; an empty list means the record is usable.
pub fn validate_product(record: &ProductRecord) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let present = [
        ("season", record.season.is_some()),
        ("brand", record.brand.is_some()),
        ("width", record.width.is_some()),
        ("rim_size", record.rim_size.is_some()),
        ("price", record.price.is_some()),
    ];
    for (field, is_present) in present {
        if !is_present {
            issues.push(ValidationIssue::Missing { field });
        }
    }

    if let Some(season) = &record.season {
        if Season::from_code(season).is_none() {
            issues.push(ValidationIssue::InvalidSeason {
                value: season.clone(),
            });
        }
    }

    let numeric = [
        ("width", record.width.as_ref()),
        ("rim_size", record.rim_size.as_ref()),
        ("price", record.price.as_ref()),
    ];
    for (field, value) in numeric {
        if let Some(raw) = value {
            if raw.as_number().filter(|number| number.is_finite()).is_none() {
                issues.push(ValidationIssue::InvalidNumber {
                    field,
                    value: raw.to_string(),
                });
            }
        }
    }

    issues
}

/// Validation result for one record of a catalog.
#[derive(Debug, Clone, Serialize)]
pub struct RecordValidation {
    pub id: String,
    pub issues: Vec<ValidationIssue>,
}

/// Validates every record, keeping only those with at least one issue.
pub fn validate_catalog(records: &[ProductRecord]) -> Vec<RecordValidation> {
    records
        .iter()
        .filter_map(|record| {
            let issues = validate_product(record);
            (!issues.is_empty()).then(|| RecordValidation {
                id: record.id.clone(),
                issues,
            })
        })
        .collect()
}
