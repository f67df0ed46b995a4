use super::criterion::{Criterion, CriterionRange};
use super::parsers::{coerce_positive, coerce_rating, decode_grade, parse_noise_level};
use crate::catalog::ProductRecord;
use crate::config::ScoringConfig;
use serde::Serialize;
use tracing::debug;

/// Parsed criterion values of one record; `None` marks "no value".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ParsedCriteria {
    pub price: Option<f64>,
    pub wet_grip: Option<f64>,
    pub fuel_efficiency: Option<f64>,
    pub satisfaction: Option<f64>,
    pub noise: Option<f64>,
}

impl ParsedCriteria {
    /// Grades decoding to 0 carry no information and count as "no value".
    pub fn from_record(record: &ProductRecord, config: &ScoringConfig) -> Self {
        let grade = |raw: Option<&String>| {
            let ordinal = decode_grade(raw.map(String::as_str), &config.grades);
            (ordinal > 0).then_some(f64::from(ordinal))
        };

        Self {
            price: coerce_positive(record.price.as_ref()),
            wet_grip: grade(record.wet_grip.as_ref()),
            fuel_efficiency: grade(record.fuel_efficiency.as_ref()),
            satisfaction: coerce_rating(record.user_rating.as_ref()),
            noise: parse_noise_level(record.noise_level.as_ref(), &config.noise_range),
        }
    }

    pub fn get(&self, criterion: Criterion) -> Option<f64> {
        match criterion {
            Criterion::Price => self.price,
            Criterion::WetGrip => self.wet_grip,
            Criterion::FuelEfficiency => self.fuel_efficiency,
            Criterion::Satisfaction => self.satisfaction,
            Criterion::Noise => self.noise,
        }
    }
}

/// Per-criterion scores in [0,1], relative to one comparison set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NormalizedScoreSet {
    pub price: f64,
    pub wet_grip: f64,
    pub fuel_efficiency: f64,
    pub satisfaction: f64,
    pub noise: f64,
}

impl NormalizedScoreSet {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Price => self.price,
            Criterion::WetGrip => self.wet_grip,
            Criterion::FuelEfficiency => self.fuel_efficiency,
            Criterion::Satisfaction => self.satisfaction,
            Criterion::Noise => self.noise,
        }
    }

    fn set(&mut self, criterion: Criterion, score: f64) {
        let slot = match criterion {
            Criterion::Price => &mut self.price,
            Criterion::WetGrip => &mut self.wet_grip,
            Criterion::FuelEfficiency => &mut self.fuel_efficiency,
            Criterion::Satisfaction => &mut self.satisfaction,
            Criterion::Noise => &mut self.noise,
        };
        *slot = score;
    }
}

/// The catalog slice records are scored against.
///
/// Every record is parsed once on construction and the per-criterion extremes
/// are fixed for the lifetime of the set; records are addressed by position.
#[derive(Debug)]
pub struct ComparisonSet<'a> {
    records: &'a [ProductRecord],
    parsed: Vec<ParsedCriteria>,
    ranges: [Option<CriterionRange>; 5],
    config: &'a ScoringConfig,
}

impl<'a> ComparisonSet<'a> {
    pub fn new(records: &'a [ProductRecord], config: &'a ScoringConfig) -> Self {
        let parsed: Vec<ParsedCriteria> = records
            .iter()
            .map(|record| ParsedCriteria::from_record(record, config))
            .collect();

        let ranges = Criterion::ALL.map(|criterion| {
            CriterionRange::from_values(parsed.iter().filter_map(|values| values.get(criterion)))
        });

        Self {
            records,
            parsed,
            ranges,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &'a [ProductRecord] {
        self.records
    }

    pub fn config(&self) -> &'a ScoringConfig {
        self.config
    }

    pub fn parsed(&self, index: usize) -> Option<&ParsedCriteria> {
        self.parsed.get(index)
    }

    pub fn range(&self, criterion: Criterion) -> Option<CriterionRange> {
        self.ranges[criterion.index()]
    }

    /// Normalized scores of the record at `index`.
    pub fn normalized_scores(&self, index: usize) -> Option<NormalizedScoreSet> {
        self.parsed.get(index).map(|values| self.normalize(values))
    }

    pub fn normalize(&self, values: &ParsedCriteria) -> NormalizedScoreSet {
        let mut scores = NormalizedScoreSet::default();
        for criterion in Criterion::ALL {
            let score = match (values.get(criterion), self.range(criterion)) {
                (Some(value), Some(range)) => range.normalize(value, criterion.direction()),
                _ => 0.0,
            };
            scores.set(criterion, score);
        }
        scores
    }
}

/// Scores `record` against `comparison_set`.
///
/// The record does not have to be a member of the set; its values are placed
/// inside the set's extremes and clamped.
pub fn compute_normalized_scores(
    record: &ProductRecord,
    comparison_set: &ComparisonSet<'_>,
) -> NormalizedScoreSet {
    let values = ParsedCriteria::from_record(record, comparison_set.config());
    let scores = comparison_set.normalize(&values);
    debug!(id = %record.id, raw = ?values, normalized = ?scores, "normalized record");
    scores
}
