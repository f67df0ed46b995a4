use serde::{Deserialize, Serialize};
use std::fmt;

/// One scored dimension of a tire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Price,
    WetGrip,
    FuelEfficiency,
    Satisfaction,
    Noise,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::Price,
        Criterion::WetGrip,
        Criterion::FuelEfficiency,
        Criterion::Satisfaction,
        Criterion::Noise,
    ];

    pub const fn direction(self) -> Direction {
        match self {
            Self::Price | Self::Noise => Direction::LowerIsBetter,
            Self::WetGrip | Self::FuelEfficiency | Self::Satisfaction => Direction::HigherIsBetter,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::WetGrip => "wet_grip",
            Self::FuelEfficiency => "fuel_efficiency",
            Self::Satisfaction => "satisfaction",
            Self::Noise => "noise",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::WetGrip => "Wet Grip",
            Self::FuelEfficiency => "Fuel Economy",
            Self::Satisfaction => "Customer Satisfaction",
            Self::Noise => "Low Noise",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which end of a criterion's raw scale is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Extremes of one criterion over the comparison set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriterionRange {
    pub min: f64,
    pub max: f64,
}

impl CriterionRange {
    /// `None` when there is nothing to compare against.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(Self {
                min: value,
                max: value,
            }),
            Some(Self { min, max }) => Some(Self {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    /// Position of `value` inside the range, oriented so that 1 is best.
    pub fn normalize(&self, value: f64, direction: Direction) -> f64 {
        if self.max == self.min {
            return 1.0;
        }

        let position = (value - self.min) / (self.max - self.min);
        let score = match direction {
            Direction::HigherIsBetter => position,
            Direction::LowerIsBetter => 1.0 - position,
        };
        score.clamp(0.0, 1.0)
    }
}

/// Unit-interval score of `value` relative to `comparison_values`.
///
/// Missing values and empty comparison sets score 0; a set whose values are
/// all equal scores 1.
pub fn normalize_value(value: Option<f64>, comparison_values: &[f64], direction: Direction) -> f64 {
    match (value, CriterionRange::from_values(comparison_values.iter().copied())) {
        (Some(value), Some(range)) => range.normalize(value, direction),
        _ => 0.0,
    }
}
