//! Configurable factor weights.

use serde::{Deserialize, Serialize};

/// Tolerance when checking that weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights combining the five factor scores into one similarity score.
///
/// Overridable as a unit; a valid set is non-negative, finite, and sums to
/// 1.0 within [`WEIGHT_SUM_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactorWeights {
    /// Weight of the building-area factor.
    pub building_area: f64,
    /// Weight of the lot-size factor.
    pub lot_size: f64,
    /// Weight of the construction-age factor.
    pub age: f64,
    /// Weight of the zoning factor.
    pub zoning: f64,
    /// Weight of the location factor.
    pub location: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            building_area: 0.30,
            lot_size: 0.20,
            age: 0.15,
            zoning: 0.25,
            location: 0.10,
        }
    }
}

/// A weight set that cannot be combined into a meaningful score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    /// The weights do not sum to 1.0.
    #[error("factor weights must sum to 1.0, got {sum}")]
    BadSum {
        /// The actual sum.
        sum: f64,
    },
    /// A weight is negative or non-finite.
    #[error("factor weight `{name}` is invalid: {value}")]
    BadWeight {
        /// Name of the offending weight.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
}

impl FactorWeights {
    /// Sum of all five weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.building_area + self.lot_size + self.age + self.zoning + self.location
    }

    /// Checks that every weight is usable and the set sums to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError`] naming the first offending weight, or the
    /// bad sum.
    pub fn validate(&self) -> Result<(), WeightsError> {
        let named = [
            ("building_area", self.building_area),
            ("lot_size", self.lot_size),
            ("age", self.age),
            ("zoning", self.zoning),
            ("location", self.location),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::BadWeight { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum { sum });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        FactorWeights::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_sum() {
        let weights = FactorWeights {
            building_area: 0.5,
            ..FactorWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(WeightsError::BadSum { .. })
        ));
    }

    #[test]
    fn rejects_negative_weight() {
        let weights = FactorWeights {
            age: -0.15,
            zoning: 0.55,
            ..FactorWeights::default()
        };
        assert_eq!(
            weights.validate(),
            Err(WeightsError::BadWeight {
                name: "age",
                value: -0.15,
            })
        );
    }

    #[test]
    fn rejects_non_finite_weight() {
        let weights = FactorWeights {
            location: f64::NAN,
            ..FactorWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(WeightsError::BadWeight {
                name: "location",
                ..
            })
        ));
    }

    #[test]
    fn tolerates_float_noise_in_the_sum() {
        let weights = FactorWeights {
            building_area: 0.30 + 1e-12,
            ..FactorWeights::default()
        };
        weights.validate().unwrap();
    }
}
