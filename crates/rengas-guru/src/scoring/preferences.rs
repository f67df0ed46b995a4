use super::criterion::Criterion;
use crate::config::RoundingPolicy;
use serde::{Deserialize, Serialize};

pub const WEIGHT_TOTAL: u16 = 100;

/// Importance weights for the five criteria, each in `0..=100`.
///
/// After [`apply_edit`] the weights sum to 100 unless every weight is zero.
/// Deserialization rejects weights above 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPreferenceSet")]
pub struct PreferenceSet {
    pub price: u8,
    pub wet_grip: u8,
    pub fuel_efficiency: u8,
    pub satisfaction: u8,
    pub noise: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("weight for {criterion} must be within 0..=100, got {weight}")]
pub struct WeightOutOfRange {
    pub criterion: Criterion,
    pub weight: u16,
}

#[derive(Deserialize)]
struct RawPreferenceSet {
    #[serde(default)]
    price: u16,
    #[serde(default)]
    wet_grip: u16,
    #[serde(default)]
    fuel_efficiency: u16,
    #[serde(default)]
    satisfaction: u16,
    #[serde(default)]
    noise: u16,
}

impl TryFrom<RawPreferenceSet> for PreferenceSet {
    type Error = WeightOutOfRange;

    fn try_from(raw: RawPreferenceSet) -> Result<Self, Self::Error> {
        let weights = [
            raw.price,
            raw.wet_grip,
            raw.fuel_efficiency,
            raw.satisfaction,
            raw.noise,
        ];

        let mut set = Self::zero();
        for (criterion, weight) in Criterion::ALL.into_iter().zip(weights) {
            let checked = u8::try_from(weight)
                .ok()
                .filter(|value| *value <= 100)
                .ok_or(WeightOutOfRange { criterion, weight })?;
            set.set(criterion, checked);
        }
        Ok(set)
    }
}

impl PreferenceSet {
    pub const fn zero() -> Self {
        Self {
            price: 0,
            wet_grip: 0,
            fuel_efficiency: 0,
            satisfaction: 0,
            noise: 0,
        }
    }

    pub fn from_weights(weights: [u8; 5]) -> Self {
        let mut set = Self::zero();
        for (criterion, weight) in Criterion::ALL.into_iter().zip(weights) {
            set.set(criterion, weight);
        }
        set
    }

    pub fn weights(&self) -> [u8; 5] {
        Criterion::ALL.map(|criterion| self.get(criterion))
    }

    pub fn get(&self, criterion: Criterion) -> u8 {
        match criterion {
            Criterion::Price => self.price,
            Criterion::WetGrip => self.wet_grip,
            Criterion::FuelEfficiency => self.fuel_efficiency,
            Criterion::Satisfaction => self.satisfaction,
            Criterion::Noise => self.noise,
        }
    }

    pub fn set(&mut self, criterion: Criterion, weight: u8) {
        let slot = match criterion {
            Criterion::Price => &mut self.price,
            Criterion::WetGrip => &mut self.wet_grip,
            Criterion::FuelEfficiency => &mut self.fuel_efficiency,
            Criterion::Satisfaction => &mut self.satisfaction,
            Criterion::Noise => &mut self.noise,
        };
        *slot = weight.min(100);
    }

    pub fn total(&self) -> u16 {
        self.weights().iter().map(|weight| u16::from(*weight)).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    /// Fraction of the total importance carried by `criterion`.
    pub fn fraction(&self, criterion: Criterion) -> f64 {
        f64::from(self.get(criterion)) / f64::from(WEIGHT_TOTAL)
    }
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self::from_weights([20; 5])
    }
}

/// Sets `key` to `new_value` and rescales all five weights to total 100.
///
/// An all-zero candidate is returned as is.
pub fn apply_edit(
    current: &PreferenceSet,
    key: Criterion,
    new_value: u8,
    rounding: RoundingPolicy,
) -> PreferenceSet {
    let mut candidate = *current;
    candidate.set(key, new_value);
    renormalize(&candidate, rounding)
}

/// Rescales weights to total 100 using the given rounding policy.
pub fn renormalize(candidate: &PreferenceSet, rounding: RoundingPolicy) -> PreferenceSet {
    let sum = candidate.total();
    if sum == 0 {
        return *candidate;
    }

    let factor = f64::from(WEIGHT_TOTAL) / f64::from(sum);
    let scaled = candidate
        .weights()
        .map(|weight| f64::from(weight) * factor);

    let weights = match rounding {
        RoundingPolicy::Independent => scaled.map(|value| value.round() as u8),
        RoundingPolicy::LargestRemainder => largest_remainder(scaled),
    };
    PreferenceSet::from_weights(weights)
}

fn largest_remainder(scaled: [f64; 5]) -> [u8; 5] {
    let mut weights = scaled.map(|value| value.floor() as u8);
    let assigned: u16 = weights.iter().map(|weight| u16::from(*weight)).sum();
    let leftover = usize::from(WEIGHT_TOTAL.saturating_sub(assigned));

    let mut order: Vec<usize> = (0..scaled.len()).collect();
    order.sort_by(|a, b| {
        let remainder = |index: usize| scaled[index] - scaled[index].floor();
        remainder(*b).total_cmp(&remainder(*a))
    });

    for index in order.into_iter().take(leftover) {
        weights[index] += 1;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICIES: [RoundingPolicy; 2] =
        [RoundingPolicy::LargestRemainder, RoundingPolicy::Independent];

    #[test]
    fn editing_one_weight_rescales_the_others() {
        let current = PreferenceSet::default();
        let edited = apply_edit(&current, Criterion::Price, 60, RoundingPolicy::LargestRemainder);
        // candidate [60,20,20,20,20] sums to 140
        assert_eq!(edited.weights(), [43, 15, 14, 14, 14]);
        assert_eq!(edited.total(), 100);
    }

    #[test]
    fn all_zero_candidate_passes_through() {
        let current = PreferenceSet::from_weights([100, 0, 0, 0, 0]);
        for policy in POLICIES {
            let edited = apply_edit(&current, Criterion::Price, 0, policy);
            assert_eq!(edited, PreferenceSet::zero());
            assert_eq!(edited.total(), 0);
        }
    }

    #[test]
    fn reapplying_current_value_is_a_no_op() {
        let normalized = PreferenceSet::from_weights([35, 25, 10, 20, 10]);
        for policy in POLICIES {
            for criterion in Criterion::ALL {
                let value = normalized.get(criterion);
                assert_eq!(apply_edit(&normalized, criterion, value, policy), normalized);
            }
        }
    }

    #[test]
    fn largest_remainder_edit_result_is_a_fixed_point() {
        let seeds = [[20; 5], [3, 52, 1, 26, 18], [1, 1, 1, 0, 0], [33, 66, 100, 33, 0]];
        for seed in seeds {
            let start = PreferenceSet::from_weights(seed);
            for criterion in Criterion::ALL {
                for value in [0, 1, 29, 66, 100] {
                    let policy = RoundingPolicy::LargestRemainder;
                    let once = apply_edit(&start, criterion, value, policy);
                    let twice = apply_edit(&once, criterion, once.get(criterion), policy);
                    assert_eq!(once, twice, "{seed:?} {criterion} {value}");
                }
            }
        }
    }

    #[test]
    fn independent_drift_is_not_a_fixed_point() {
        let policy = RoundingPolicy::Independent;
        let current = PreferenceSet::from_weights([3, 52, 1, 26, 18]);

        let once = apply_edit(&current, Criterion::WetGrip, 20, policy);
        assert_eq!(once.weights(), [4, 29, 1, 38, 26]);
        assert_eq!(once.total(), 98);

        let twice = apply_edit(&once, Criterion::WetGrip, once.wet_grip, policy);
        assert_eq!(twice.weights(), [4, 30, 1, 39, 27]);
        assert_eq!(twice.total(), 101);
        assert_ne!(once, twice);
    }

    #[test]
    fn largest_remainder_always_totals_one_hundred() {
        let seeds = [
            [3, 52, 1, 26, 18],
            [1, 1, 1, 0, 0],
            [33, 66, 100, 33, 0],
            [7, 7, 7, 7, 7],
            [100, 100, 100, 100, 99],
        ];
        for seed in seeds {
            let current = PreferenceSet::from_weights(seed);
            for criterion in Criterion::ALL {
                for value in [0, 1, 20, 33, 50, 66, 99, 100] {
                    let edited =
                        apply_edit(&current, criterion, value, RoundingPolicy::LargestRemainder);
                    if edited.is_zero() {
                        continue;
                    }
                    assert_eq!(edited.total(), 100, "{seed:?} {criterion} {value}");
                }
            }
        }
    }

    #[test]
    fn largest_remainder_breaks_ties_in_criterion_order() {
        let edited = renormalize(
            &PreferenceSet::from_weights([1, 1, 1, 0, 0]),
            RoundingPolicy::LargestRemainder,
        );
        assert_eq!(edited.weights(), [34, 33, 33, 0, 0]);
    }

    #[test]
    fn independent_rounding_drift_is_visible() {
        let three_way = renormalize(
            &PreferenceSet::from_weights([1, 1, 1, 0, 0]),
            RoundingPolicy::Independent,
        );
        assert_eq!(three_way.weights(), [33, 33, 33, 0, 0]);
        assert_eq!(three_way.total(), 99);

        let current = PreferenceSet::from_weights([3, 52, 1, 26, 18]);
        let edited = apply_edit(&current, Criterion::WetGrip, 20, RoundingPolicy::Independent);
        assert_eq!(edited.weights(), [4, 29, 1, 38, 26]);
        assert_eq!(edited.total(), 98);

        let upward = renormalize(
            &PreferenceSet::from_weights([2, 2, 3, 0, 0]),
            RoundingPolicy::Independent,
        );
        assert_eq!(upward.weights(), [29, 29, 43, 0, 0]);
        assert_eq!(upward.total(), 101);
    }

    #[test]
    fn independent_rounding_drift_is_bounded() {
        for a in (0..=100).step_by(7) {
            for b in (0..=100).step_by(11) {
                let current = PreferenceSet::from_weights([a, b, 13, 29, 5]);
                let edited = renormalize(&current, RoundingPolicy::Independent);
                let total = i32::from(edited.total());
                assert!((98..=102).contains(&total), "{a} {b} -> {total}");
            }
        }
    }

    #[test]
    fn set_clamps_to_one_hundred() {
        let mut set = PreferenceSet::zero();
        set.set(Criterion::Noise, 250);
        assert_eq!(set.noise, 100);
        assert_eq!(set.fraction(Criterion::Noise), 1.0);
    }

    #[test]
    fn deserialization_rejects_weights_above_one_hundred() {
        let parsed: PreferenceSet =
            serde_json::from_str(r#"{"price":60,"noise":40}"#).expect("weights parse");
        assert_eq!(parsed.weights(), [60, 0, 0, 0, 40]);

        let err = serde_json::from_str::<PreferenceSet>(r#"{"price":200,"noise":200}"#)
            .expect_err("overweight rejected");
        assert!(err.to_string().contains("weight for price must be within 0..=100, got 200"));

        assert!(serde_json::from_str::<PreferenceSet>(r#"{"wet_grip":101}"#).is_err());
        assert!(serde_json::from_str::<PreferenceSet>(r#"{"noise":70000}"#).is_err());
    }
}
