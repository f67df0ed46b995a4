//! Multi-criteria preference scoring.
//!
//! Raw records go through the field parsers, are normalized per criterion
//! against the whole comparison set, weighted by the user's preferences into a
//! 0–100 attractiveness score, and finally ranked. Every pass is a pure batch
//! computation over its two inputs.

mod aggregate;
mod comparison;
mod criterion;
pub mod parsers;
mod preferences;
mod ranking;

pub use aggregate::{compute_attractiveness_score, score_components, ScoreComponent};
pub use comparison::{compute_normalized_scores, ComparisonSet, NormalizedScoreSet, ParsedCriteria};
pub use criterion::{normalize_value, Criterion, CriterionRange, Direction};
pub use preferences::{apply_edit, renormalize, PreferenceSet, WeightOutOfRange, WEIGHT_TOTAL};
pub use ranking::{
    rank_catalog, RankedCatalog, RankedEntry, RankingView, SortColumn, SortDirection, SortState,
    UnknownSortColumn,
};
