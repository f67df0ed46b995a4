use super::comparison::NormalizedScoreSet;
use super::criterion::Criterion;
use super::preferences::PreferenceSet;
use serde::{Deserialize, Serialize};

/// Weighted 0–100 figure of merit. Without preferences every record scores 0.
pub fn compute_attractiveness_score(
    normalized_scores: &NormalizedScoreSet,
    preference_set: Option<&PreferenceSet>,
) -> u8 {
    let Some(preferences) = preference_set else {
        return 0;
    };

    let weighted: f64 = Criterion::ALL
        .iter()
        .map(|criterion| normalized_scores.get(*criterion) * preferences.fraction(*criterion))
        .sum();

    (weighted * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Discrete contribution of one criterion, kept for transparent score audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub criterion: Criterion,
    /// Normalized score as a whole percentage.
    pub normalized_pct: u8,
    pub weight: u8,
    /// Points this criterion adds to the attractiveness score, before rounding.
    pub points: f64,
}

pub fn score_components(
    normalized_scores: &NormalizedScoreSet,
    preference_set: &PreferenceSet,
) -> Vec<ScoreComponent> {
    Criterion::ALL
        .iter()
        .map(|criterion| {
            let normalized = normalized_scores.get(*criterion);
            ScoreComponent {
                criterion: *criterion,
                normalized_pct: (normalized * 100.0).round() as u8,
                weight: preference_set.get(*criterion),
                points: normalized * f64::from(preference_set.get(*criterion)),
            }
        })
        .collect()
}
