//! Product catalog model and the plumbing that feeds comparison sets into scoring.

mod analytics;
mod normalizer;
mod parser;
mod query;
mod record;
mod validation;

pub use analytics::{
    analyze_metric, brand_report, metric_distribution, BrandSummary, CatalogMetric,
    DistributionBucket, MetricSummary, SeasonBreakdown, UnknownMetric, UNKNOWN_BRAND,
};
pub use query::{CatalogQuery, UnknownSeason};
pub use record::{ProductRecord, RawField, Season};
pub use validation::{validate_catalog, validate_product, RecordValidation, ValidationIssue};

use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads catalog exports (one product per CSV row) into [`ProductRecord`]s.
pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ProductRecord>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ProductRecord>, CatalogImportError> {
        let records = parser::parse_records(reader)?;
        debug!(records = records.len(), "catalog import finished");
        Ok(records)
    }
}
