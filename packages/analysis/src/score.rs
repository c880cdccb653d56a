//! Per-factor similarity formulas.
//!
//! Every factor yields a score in `[0, 1]`. The formulas are fixed; only
//! the weights combining them are configurable.

use comp_scout_property_models::{zoning, FactorScores, PropertyRecord};

use crate::distance;
use crate::weights::FactorWeights;

/// Age horizon: year-built differences at or beyond this many years score 0.
pub const AGE_HORIZON_YEARS: f64 = 50.0;

/// Distance horizon: separations at or beyond this many miles score 0.
pub const DISTANCE_HORIZON_MILES: f64 = 50.0;

/// Zoning score for codes in the same broad category but not identical.
pub const RELATED_ZONING_SCORE: f64 = 0.5;

/// Relative similarity of two magnitudes: `1 - min(1, |a - b| / max(a, b))`.
///
/// Both zero (or non-positive) scores 0 rather than 1: two records with no
/// recorded area say nothing about each other.
#[must_use]
pub fn relative_similarity(a: f64, b: f64) -> f64 {
    let larger = a.max(b);
    if larger <= 0.0 {
        return 0.0;
    }
    (1.0 - ((a - b).abs() / larger).min(1.0)).clamp(0.0, 1.0)
}

/// Construction-age similarity: linear falloff to 0 over
/// [`AGE_HORIZON_YEARS`].
#[must_use]
pub fn age_similarity(year_a: i32, year_b: i32) -> f64 {
    let delta = f64::from((year_a - year_b).abs());
    1.0 - (delta / AGE_HORIZON_YEARS).min(1.0)
}

/// Zoning similarity: identical code 1.0, same broad category
/// [`RELATED_ZONING_SCORE`], otherwise 0.0.
///
/// Codes are compared notation-insensitively, so `"I1"` matches `"I-1"`.
#[must_use]
pub fn zoning_similarity(a: &str, b: &str) -> f64 {
    if zoning::same_code(a, b) {
        return 1.0;
    }
    match (zoning::category_for(a), zoning::category_for(b)) {
        (Some(cat_a), Some(cat_b)) if cat_a == cat_b => RELATED_ZONING_SCORE,
        _ => 0.0,
    }
}

/// Proximity similarity: linear falloff to 0 over
/// [`DISTANCE_HORIZON_MILES`].
#[must_use]
pub fn location_similarity(miles: f64) -> f64 {
    1.0 - (miles / DISTANCE_HORIZON_MILES).min(1.0)
}

/// Scores one candidate against the target: the per-factor breakdown plus
/// the weighted total, clamped to `[0, 1]`.
#[must_use]
pub fn score_pair(
    target: &PropertyRecord,
    candidate: &PropertyRecord,
    weights: &FactorWeights,
) -> (f64, FactorScores) {
    let factors = FactorScores {
        building_area: relative_similarity(target.building_area, candidate.building_area),
        lot_size: relative_similarity(target.lot_size, candidate.lot_size),
        age: age_similarity(target.year_built, candidate.year_built),
        zoning: zoning_similarity(&target.zoning, &candidate.zoning),
        location: location_similarity(distance::miles_between_records(target, candidate)),
    };

    let score = weights.building_area.mul_add(
        factors.building_area,
        weights.lot_size.mul_add(
            factors.lot_size,
            weights.age.mul_add(
                factors.age,
                weights
                    .zoning
                    .mul_add(factors.zoning, weights.location * factors.location),
            ),
        ),
    );

    (score.clamp(0.0, 1.0), factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_similarity_of_equal_values_is_one() {
        assert!((relative_similarity(50_000.0, 50_000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn relative_similarity_of_both_zero_is_zero() {
        assert!(relative_similarity(0.0, 0.0).abs() < 1e-12);
    }

    #[test]
    fn relative_similarity_uses_the_larger_magnitude() {
        // |50000 - 55000| / 55000
        let expected = 1.0 - 5_000.0 / 55_000.0;
        assert!((relative_similarity(50_000.0, 55_000.0) - expected).abs() < 1e-12);
        assert!((relative_similarity(55_000.0, 50_000.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn age_similarity_falls_off_over_fifty_years() {
        assert!((age_similarity(2000, 2000) - 1.0).abs() < 1e-12);
        assert!((age_similarity(2000, 1975) - 0.5).abs() < 1e-12);
        assert!(age_similarity(2000, 1950).abs() < 1e-12);
        assert!(age_similarity(2000, 1900).abs() < 1e-12);
    }

    #[test]
    fn zoning_similarity_tiers() {
        assert!((zoning_similarity("M1", "M1") - 1.0).abs() < 1e-12);
        // Alternate notation of the same code is still an exact match.
        assert!((zoning_similarity("I-1", "I1") - 1.0).abs() < 1e-12);
        // M1 and I-1 are both light industrial.
        assert!((zoning_similarity("M1", "I-1") - 0.5).abs() < 1e-12);
        // Light vs heavy industrial are unrelated.
        assert!(zoning_similarity("M1", "M2").abs() < 1e-12);
        // Unknown codes never relate.
        assert!(zoning_similarity("M1", "R1").abs() < 1e-12);
    }

    #[test]
    fn location_similarity_falls_off_over_fifty_miles() {
        assert!((location_similarity(0.0) - 1.0).abs() < 1e-12);
        assert!((location_similarity(25.0) - 0.5).abs() < 1e-12);
        assert!(location_similarity(50.0).abs() < 1e-12);
        assert!(location_similarity(1_750.0).abs() < 1e-12);
    }
}
