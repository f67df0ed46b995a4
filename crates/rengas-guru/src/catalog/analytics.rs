use super::record::{ProductRecord, Season};
use crate::config::ScoringConfig;
use crate::scoring::parsers::{coerce_positive, parse_noise_level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric catalog columns that can be summarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMetric {
    Price,
    NoiseLevel,
    Width,
    Profile,
    RimSize,
}

impl CatalogMetric {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::NoiseLevel => "noise_level",
            Self::Width => "width",
            Self::Profile => "profile",
            Self::RimSize => "rim_size",
        }
    }

    fn value(self, record: &ProductRecord, config: &ScoringConfig) -> Option<f64> {
        match self {
            Self::Price => coerce_positive(record.price.as_ref()),
            Self::NoiseLevel => parse_noise_level(record.noise_level.as_ref(), &config.noise_range),
            Self::Width => coerce_positive(record.width.as_ref()),
            Self::Profile => coerce_positive(record.profile.as_ref()),
            Self::RimSize => coerce_positive(record.rim_size.as_ref()),
        }
    }
}

impl fmt::Display for CatalogMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown catalog metric '{0}' (expected price, noise_level, width, profile or rim_size)")]
pub struct UnknownMetric(pub String);

impl FromStr for CatalogMetric {
    type Err = UnknownMetric;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "price" => Ok(Self::Price),
            "noise" | "noise_level" => Ok(Self::NoiseLevel),
            "width" => Ok(Self::Width),
            "profile" => Ok(Self::Profile),
            "rim" | "rim_size" | "diameter" => Ok(Self::RimSize),
            _ => Err(UnknownMetric(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeasonBreakdown {
    pub summer: usize,
    pub winter: usize,
}

/// Descriptive statistics for one metric over a slice of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric: CatalogMetric,
    pub total: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub season_breakdown: SeasonBreakdown,
}

pub fn analyze_metric(
    records: &[ProductRecord],
    metric: CatalogMetric,
    config: &ScoringConfig,
) -> MetricSummary {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| metric.value(record, config))
        .collect();

    let min = values.iter().copied().reduce(f64::min);
    let max = values.iter().copied().reduce(f64::max);
    let average = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);

    let mut season_breakdown = SeasonBreakdown::default();
    for record in records {
        match record.season_kind() {
            Some(Season::Summer) => season_breakdown.summer += 1,
            Some(Season::Winter) => season_breakdown.winter += 1,
            None => {}
        }
    }

    MetricSummary {
        metric,
        total: values.len(),
        min,
        max,
        average,
        season_breakdown,
    }
}

/// Catalog share of one brand, split by season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandSummary {
    pub brand: String,
    pub total: usize,
    pub seasons: SeasonBreakdown,
}

pub const UNKNOWN_BRAND: &str = "Unknown";

/// Per-brand record counts, ordered by brand name.
pub fn brand_report(records: &[ProductRecord]) -> Vec<BrandSummary> {
    let mut brands: BTreeMap<&str, (usize, SeasonBreakdown)> = BTreeMap::new();
    for record in records {
        let brand = record.brand.as_deref().unwrap_or(UNKNOWN_BRAND);
        let (total, seasons) = brands.entry(brand).or_default();
        *total += 1;
        match record.season_kind() {
            Some(Season::Summer) => seasons.summer += 1,
            Some(Season::Winter) => seasons.winter += 1,
            None => {}
        }
    }

    brands
        .into_iter()
        .map(|(brand, (total, seasons))| BrandSummary {
            brand: brand.to_string(),
            total,
            seasons,
        })
        .collect()
}

/// One histogram bar: a rounded metric value and how many records carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistributionBucket {
    pub value: i64,
    pub count: usize,
}

/// Histogram of rounded metric values, ascending by value.
pub fn metric_distribution(
    records: &[ProductRecord],
    metric: CatalogMetric,
    config: &ScoringConfig,
) -> Vec<DistributionBucket> {
    let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for value in records.iter().filter_map(|record| metric.value(record, config)) {
        *buckets.entry(value.round() as i64).or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|(value, count)| DistributionBucket { value, count })
        .collect()
}
