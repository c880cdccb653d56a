#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Comparable-property scoring engine.
//!
//! Pure and synchronous: given a target record and a candidate pool, scores
//! every candidate on five weighted factors (building area, lot size, age,
//! zoning, location) and returns them ranked. Identical inputs always
//! produce identical scores and ordering.

pub mod distance;
pub mod score;
pub mod weights;

use chrono::Utc;
use comp_scout_property_models::eligibility::{DropReason, EligibilityRules};
use comp_scout_property_models::{
    AnalysisOutcome, AnalysisSummary, ComparableResult, ConfidenceLevel, PropertyRecord,
};

pub use weights::{FactorWeights, WeightsError};

/// Errors that fail one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// The target itself fails the eligibility rules; scoring candidates
    /// against it would be meaningless.
    #[error("target `{property_id}` is not analyzable: {reason}")]
    InvalidTarget {
        /// The rejected target's identifier.
        property_id: String,
        /// Why the eligibility rules rejected it.
        reason: DropReason,
    },
}

/// Scores every pool candidate against the target and ranks the results.
///
/// The target is excluded from its own candidate set by `property_id`.
/// Ranking is descending by score with ties broken by ascending
/// `property_id`. The summary's average is computed over the full scored
/// set before `cap` truncates the ranked list, so a cap changes what is
/// returned but never the statistics.
///
/// An empty (or fully self-matching) pool is a valid outcome with zero
/// comparables and an average of 0.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidTarget`] when the target fails `rules`.
pub fn analyze(
    target: &PropertyRecord,
    pool: &[PropertyRecord],
    weights: &FactorWeights,
    rules: &EligibilityRules,
    cap: Option<usize>,
) -> Result<AnalysisOutcome, AnalysisError> {
    if let Err(reason) = rules.check(target) {
        return Err(AnalysisError::InvalidTarget {
            property_id: target.property_id.clone(),
            reason,
        });
    }

    let mut comparables: Vec<ComparableResult> = pool
        .iter()
        .filter(|candidate| candidate.property_id != target.property_id)
        .map(|candidate| {
            let (similarity_score, factors) = score::score_pair(target, candidate, weights);
            ComparableResult {
                record: candidate.clone(),
                similarity_score,
                confidence_level: ConfidenceLevel::classify(similarity_score),
                factors,
            }
        })
        .collect();

    comparables.sort_unstable_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then_with(|| a.record.property_id.cmp(&b.record.property_id))
    });

    let total_comparables_found = comparables.len();
    let avg_similarity_score = if comparables.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let count = comparables.len() as f64;
        comparables.iter().map(|c| c.similarity_score).sum::<f64>() / count
    };

    if let Some(cap) = cap {
        comparables.truncate(cap);
    }

    log::debug!(
        "Scored {total_comparables_found} candidates against {} (avg {avg_similarity_score:.4})",
        target.property_id
    );

    Ok(AnalysisOutcome {
        target: target.clone(),
        comparables,
        summary: AnalysisSummary {
            total_comparables_found,
            avg_similarity_score,
        },
        analyzed_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use comp_scout_property_models::County;

    fn record(id: &str) -> PropertyRecord {
        PropertyRecord {
            property_id: id.to_string(),
            address: "2501 Lively Blvd".to_string(),
            city: "Elk Grove Village".to_string(),
            county: County::CookCounty,
            state: "IL".to_string(),
            zip_code: "60007".to_string(),
            latitude: 41.85,
            longitude: -87.65,
            building_area: 50_000.0,
            lot_size: 100_000.0,
            year_built: 2000,
            zoning: "M1".to_string(),
            assessed_value: 4_000_000.0,
            last_sale_amount: None,
            property_type: Some("Industrial".to_string()),
        }
    }

    fn defaults() -> (FactorWeights, EligibilityRules) {
        (FactorWeights::default(), EligibilityRules::default())
    }

    #[test]
    fn identical_candidate_scores_one_with_high_confidence() {
        let (weights, rules) = defaults();
        let target = record("T-1");
        let twin = record("C-1");

        let outcome = analyze(&target, &[twin], &weights, &rules, None).unwrap();

        assert_eq!(outcome.comparables.len(), 1);
        let top = &outcome.comparables[0];
        assert!((top.similarity_score - 1.0).abs() < 1e-12);
        assert_eq!(top.confidence_level, ConfidenceLevel::High);
        assert!((outcome.summary.avg_similarity_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn target_is_excluded_from_its_own_pool() {
        let (weights, rules) = defaults();
        let target = record("T-1");
        let pool = vec![record("T-1"), record("C-1")];

        let outcome = analyze(&target, &pool, &weights, &rules, None).unwrap();

        assert_eq!(outcome.summary.total_comparables_found, 1);
        assert_eq!(outcome.comparables[0].record.property_id, "C-1");
    }

    #[test]
    fn worked_example_scores_high() {
        let (weights, rules) = defaults();
        let target = record("T-1");
        let mut candidate = record("C-1");
        candidate.building_area = 55_000.0;

        let outcome = analyze(&target, &[candidate], &weights, &rules, None).unwrap();

        let top = &outcome.comparables[0];
        // 0.30 x (1 - 5000/55000) + 0.20 + 0.15 + 0.25 + 0.10
        assert!((top.similarity_score - 0.972_727).abs() < 1e-4);
        assert_eq!(top.confidence_level, ConfidenceLevel::High);
        assert!((top.factors.building_area - 0.909_090).abs() < 1e-4);
        assert!((top.factors.lot_size - 1.0).abs() < 1e-12);
        assert!((top.factors.location - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ranking_is_descending_with_lexicographic_tie_break() {
        let (weights, rules) = defaults();
        let target = record("T-1");
        let mut far = record("A-FAR");
        far.building_area = 10_000.0;
        let twin_b = record("B-TWIN");
        let twin_a = record("A-TWIN");

        let pool = vec![far, twin_b, twin_a];
        let outcome = analyze(&target, &pool, &weights, &rules, None).unwrap();

        let ids: Vec<&str> = outcome
            .comparables
            .iter()
            .map(|c| c.record.property_id.as_str())
            .collect();
        assert_eq!(ids, ["A-TWIN", "B-TWIN", "A-FAR"]);
    }

    #[test]
    fn scores_are_deterministic() {
        let (weights, rules) = defaults();
        let target = record("T-1");
        let mut candidate = record("C-1");
        candidate.building_area = 62_500.0;
        candidate.year_built = 1988;
        candidate.zoning = "I-1".to_string();
        let pool = vec![candidate];

        let first = analyze(&target, &pool, &weights, &rules, None).unwrap();
        let second = analyze(&target, &pool, &weights, &rules, None).unwrap();

        assert_eq!(first.comparables, second.comparables);
        assert_eq!(first.summary, second.summary);
    }

    #[test]
    fn empty_pool_is_a_valid_outcome() {
        let (weights, rules) = defaults();
        let target = record("T-1");

        let outcome = analyze(&target, &[], &weights, &rules, None).unwrap();

        assert!(outcome.comparables.is_empty());
        assert_eq!(outcome.summary.total_comparables_found, 0);
        assert!(outcome.summary.avg_similarity_score.abs() < 1e-12);
    }

    #[test]
    fn cap_truncates_results_but_not_statistics() {
        let (weights, rules) = defaults();
        let target = record("T-1");
        let mut worse = record("C-2");
        worse.building_area = 20_000.0;
        let pool = vec![record("C-1"), worse];

        let capped = analyze(&target, &pool, &weights, &rules, Some(1)).unwrap();
        let uncapped = analyze(&target, &pool, &weights, &rules, None).unwrap();

        assert_eq!(capped.comparables.len(), 1);
        assert_eq!(capped.summary.total_comparables_found, 2);
        assert!(
            (capped.summary.avg_similarity_score - uncapped.summary.avg_similarity_score).abs()
                < 1e-12
        );
    }

    #[test]
    fn ineligible_target_is_rejected() {
        let (weights, rules) = defaults();
        let mut target = record("T-1");
        target.zoning = "R1".to_string();

        let result = analyze(&target, &[record("C-1")], &weights, &rules, None);

        assert_eq!(
            result,
            Err(AnalysisError::InvalidTarget {
                property_id: "T-1".to_string(),
                reason: DropReason::ZoningNotAllowed,
            })
        );
    }

    #[test]
    fn distant_candidate_loses_only_the_location_weight() {
        let (weights, rules) = defaults();
        let target = record("T-1");
        let mut candidate = record("C-1");
        // Los Angeles coordinates: location factor 0, everything else 1.
        candidate.latitude = 34.0522;
        candidate.longitude = -118.2437;

        let outcome = analyze(&target, &[candidate], &weights, &rules, None).unwrap();

        let top = &outcome.comparables[0];
        assert!(top.factors.location.abs() < 1e-12);
        assert!((top.similarity_score - 0.90).abs() < 1e-9);
        assert_eq!(top.confidence_level, ConfidenceLevel::High);
    }
}
