use metrics_exporter_prometheus::PrometheusHandle;
use rengas_guru::catalog::{CatalogImporter, CatalogQuery, ProductRecord};
use rengas_guru::config::ScoringConfig;
use rengas_guru::error::AppError;
use serde::Deserialize;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) scoring: Arc<ScoringConfig>,
}

/// Catalog supplied with a request: inline CSV text or already-structured records.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogSource {
    #[serde(default)]
    pub(crate) catalog_csv: Option<String>,
    #[serde(default)]
    pub(crate) records: Vec<ProductRecord>,
    #[serde(default)]
    pub(crate) query: CatalogQuery,
}

impl CatalogSource {
    /// Resolves the comparison set, narrowed by the query.
    pub(crate) fn into_records(self) -> Result<Vec<ProductRecord>, AppError> {
        let CatalogSource {
            catalog_csv,
            records,
            query,
        } = self;

        let records = match catalog_csv {
            Some(_) if !records.is_empty() => {
                return Err(AppError::InvalidRequest(
                    "provide either catalog_csv or records, not both".to_string(),
                ))
            }
            Some(csv) => CatalogImporter::from_reader(Cursor::new(csv.into_bytes()))?,
            None => records,
        };

        Ok(narrow(records, &query))
    }
}

pub(crate) fn load_catalog(path: &Path, query: &CatalogQuery) -> Result<Vec<ProductRecord>, AppError> {
    let records = CatalogImporter::from_path(path)?;
    Ok(narrow(records, query))
}

fn narrow(records: Vec<ProductRecord>, query: &CatalogQuery) -> Vec<ProductRecord> {
    if query.is_empty() {
        records
    } else {
        query.apply(&records)
    }
}
