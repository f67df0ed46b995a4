use super::aggregate::{compute_attractiveness_score, score_components, ScoreComponent};
use super::comparison::{ComparisonSet, NormalizedScoreSet, ParsedCriteria};
use super::criterion::Criterion;
use super::parsers::coerce_positive;
use super::preferences::{apply_edit, PreferenceSet};
use crate::catalog::ProductRecord;
use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::debug;

/// Column a ranked catalog can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[serde(alias = "score")]
    Attractiveness,
    Price,
    #[serde(alias = "rating", alias = "dex_rating")]
    UserRating,
    WetGrip,
    FuelEfficiency,
    #[serde(alias = "noise_level")]
    Noise,
    Vendor,
    Brand,
    Model,
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort column '{0}'")]
pub struct UnknownSortColumn(pub String);

impl FromStr for SortColumn {
    type Err = UnknownSortColumn;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "attractiveness" | "score" => Ok(Self::Attractiveness),
            "price" => Ok(Self::Price),
            "user_rating" | "rating" | "dex_rating" => Ok(Self::UserRating),
            "wet_grip" => Ok(Self::WetGrip),
            "fuel_efficiency" => Ok(Self::FuelEfficiency),
            "noise" | "noise_level" => Ok(Self::Noise),
            "vendor" => Ok(Self::Vendor),
            "brand" => Ok(Self::Brand),
            "model" => Ok(Self::Model),
            "size" => Ok(Self::Size),
            _ => Err(UnknownSortColumn(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Active ordering. Defaults to best attractiveness first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortState {
    pub const fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// A new column starts ascending; the current column flips direction.
    pub fn select(self, column: SortColumn) -> Self {
        if self.column == column {
            Self::new(column, self.direction.toggled())
        } else {
            Self::new(column, SortDirection::Ascending)
        }
    }
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortColumn::Attractiveness, SortDirection::Descending)
    }
}

/// One row of a ranked catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub input_index: usize,
    pub record: ProductRecord,
    pub normalized: NormalizedScoreSet,
    pub attractiveness: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ScoreComponent>,
    #[serde(skip)]
    parsed: ParsedCriteria,
}

/// Scored and ordered comparison set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCatalog {
    /// `false` when no preferences were supplied and scores are all 0.
    pub scored: bool,
    pub sort: SortState,
    pub entries: Vec<RankedEntry>,
}

impl RankedCatalog {
    /// Reorders without rescoring.
    pub fn sort_by(&mut self, sort: SortState) {
        sort_entries(&mut self.entries, sort, self.scored);
        self.sort = sort;
    }

    pub fn sorted_by(mut self, sort: SortState) -> Self {
        self.sort_by(sort);
        self
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.record.id.as_str())
            .collect()
    }
}

/// Full batch scoring pass over `records` followed by a stable sort.
pub fn rank_catalog(
    records: &[ProductRecord],
    preferences: Option<&PreferenceSet>,
    config: &ScoringConfig,
    sort: SortState,
) -> RankedCatalog {
    let comparison_set = ComparisonSet::new(records, config);

    let mut entries: Vec<RankedEntry> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let parsed = comparison_set
                .parsed(index)
                .copied()
                .unwrap_or_default();
            let normalized = comparison_set.normalize(&parsed);
            let attractiveness = compute_attractiveness_score(&normalized, preferences);
            debug!(
                id = %record.id,
                raw = ?parsed,
                normalized = ?normalized,
                attractiveness,
                "scored record"
            );

            RankedEntry {
                rank: 0,
                input_index: index,
                record: record.clone(),
                normalized,
                attractiveness,
                components: preferences
                    .map(|preferences| score_components(&normalized, preferences))
                    .unwrap_or_default(),
                parsed,
            }
        })
        .collect();

    let scored = preferences.is_some();
    sort_entries(&mut entries, sort, scored);
    debug!(
        records = entries.len(),
        scored,
        column = ?sort.column,
        direction = ?sort.direction,
        "ranked comparison set"
    );

    RankedCatalog {
        scored,
        sort,
        entries,
    }
}

fn sort_entries(entries: &mut [RankedEntry], sort: SortState, scored: bool) {
    entries.sort_by_key(|entry| entry.input_index);

    // unscored catalogs keep the caller's order unless a data column is chosen
    if scored || sort.column != SortColumn::Attractiveness {
        entries.sort_by(|a, b| {
            match (sort_key(sort.column, a), sort_key(sort.column, b)) {
                (Some(left), Some(right)) => sort.direction.apply(left.compare(&right)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }

    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = position + 1;
    }
}

enum SortKey {
    Number(f64),
    Text(String),
    Dimensions([f64; 3]),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::Dimensions(left), Self::Dimensions(right)) => left
                .iter()
                .zip(right)
                .map(|(l, r)| l.total_cmp(r))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        }
    }
}

fn sort_key(column: SortColumn, entry: &RankedEntry) -> Option<SortKey> {
    let criterion = |criterion: Criterion| entry.parsed.get(criterion).map(SortKey::Number);
    let text = |value: &Option<String>| {
        value
            .as_deref()
            .map(|text| SortKey::Text(text.to_lowercase()))
    };
    let record = &entry.record;

    match column {
        SortColumn::Attractiveness => Some(SortKey::Number(f64::from(entry.attractiveness))),
        SortColumn::Price => criterion(Criterion::Price),
        SortColumn::UserRating => criterion(Criterion::Satisfaction),
        SortColumn::WetGrip => criterion(Criterion::WetGrip),
        SortColumn::FuelEfficiency => criterion(Criterion::FuelEfficiency),
        SortColumn::Noise => criterion(Criterion::Noise),
        SortColumn::Vendor => text(&record.vendor),
        SortColumn::Brand => text(&record.brand),
        SortColumn::Model => text(&record.model),
        SortColumn::Size => Some(SortKey::Dimensions([
            coerce_positive(record.width.as_ref())?,
            coerce_positive(record.profile.as_ref())?,
            coerce_positive(record.rim_size.as_ref())?,
        ])),
    }
}

/// Stateful ranking over one comparison set.
///
/// Preference or catalog changes trigger a full rescore; picking a column
/// only reorders.
#[derive(Debug, Clone)]
pub struct RankingView {
    records: Vec<ProductRecord>,
    preferences: Option<PreferenceSet>,
    config: ScoringConfig,
    ranked: RankedCatalog,
}

impl RankingView {
    pub fn new(
        records: Vec<ProductRecord>,
        preferences: Option<PreferenceSet>,
        config: ScoringConfig,
    ) -> Self {
        let ranked = rank_catalog(&records, preferences.as_ref(), &config, SortState::default());
        Self {
            records,
            preferences,
            config,
            ranked,
        }
    }

    pub fn catalog(&self) -> &RankedCatalog {
        &self.ranked
    }

    pub fn preferences(&self) -> Option<&PreferenceSet> {
        self.preferences.as_ref()
    }

    pub fn sort(&self) -> SortState {
        self.ranked.sort
    }

    pub fn select_column(&mut self, column: SortColumn) {
        let sort = self.ranked.sort.select(column);
        self.ranked.sort_by(sort);
    }

    pub fn set_preferences(&mut self, preferences: Option<PreferenceSet>) {
        self.preferences = preferences;
        self.recompute();
    }

    /// Applies a slider edit through the preference model and rescores.
    pub fn edit_preference(&mut self, key: Criterion, value: u8) -> PreferenceSet {
        let current = self.preferences.unwrap_or_else(PreferenceSet::zero);
        let edited = apply_edit(&current, key, value, self.config.rounding);
        self.set_preferences(Some(edited));
        edited
    }

    pub fn set_records(&mut self, records: Vec<ProductRecord>) {
        self.records = records;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.ranked = rank_catalog(
            &self.records,
            self.preferences.as_ref(),
            &self.config,
            self.ranked.sort,
        );
    }
}
