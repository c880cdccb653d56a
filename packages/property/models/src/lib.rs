#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical industrial property types shared across the comp-scout system.
//!
//! Every county data source normalizes its source-specific payloads into
//! [`PropertyRecord`]. The zoning taxonomy and eligibility rules that gate
//! admission to the candidate pool also live here so that ingestion and
//! analysis agree on what an "eligible industrial property" means.

pub mod eligibility;
pub mod zoning;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A county jurisdiction covered by a data source.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum County {
    /// Cook County, Illinois (Chicago area)
    CookCounty,
    /// Dallas County, Texas
    DallasCounty,
    /// Los Angeles County, California
    LosAngelesCounty,
}

impl County {
    /// Returns the human-readable county name (e.g., `"Cook County"`).
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::CookCounty => "Cook County",
            Self::DallasCounty => "Dallas County",
            Self::LosAngelesCounty => "Los Angeles County",
        }
    }

    /// Returns the two-letter state abbreviation for this county.
    #[must_use]
    pub const fn state(self) -> &'static str {
        match self {
            Self::CookCounty => "IL",
            Self::DallasCounty => "TX",
            Self::LosAngelesCounty => "CA",
        }
    }

    /// Returns a short description of the county's industrial market.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CookCounty => "Largest industrial market nationally (Chicago area)",
            Self::DallasCounty => "Fastest growing industrial market",
            Self::LosAngelesCounty => "Largest industrial inventory",
        }
    }
}

/// A property record normalized to the canonical schema.
///
/// All data sources produce this type after field mapping, unit conversion,
/// and cleaning. Records are immutable once normalized — the candidate pool
/// never mutates a record after admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    /// Globally unique identifier: source prefix + source-local parcel ID.
    pub property_id: String,
    /// Street address.
    pub address: String,
    /// City or municipality.
    pub city: String,
    /// County jurisdiction the record came from.
    pub county: County,
    /// Two-letter state abbreviation.
    pub state: String,
    /// ZIP code.
    pub zip_code: String,
    /// Latitude (WGS84 decimal degrees).
    pub latitude: f64,
    /// Longitude (WGS84 decimal degrees).
    pub longitude: f64,
    /// Building area in square feet. Always positive for eligible records.
    pub building_area: f64,
    /// Lot size in square feet. Always positive for eligible records.
    pub lot_size: f64,
    /// Year of construction.
    pub year_built: i32,
    /// Zoning code, uppercased (e.g., `"M1"`, `"I-2"`).
    pub zoning: String,
    /// Assessed value in dollars.
    pub assessed_value: f64,
    /// Most recent sale amount in dollars, when the source reports one.
    pub last_sale_amount: Option<f64>,
    /// Source-reported property classification (e.g., `"Industrial"`).
    pub property_type: Option<String>,
}

/// Confidence tier derived from a similarity score.
///
/// The thresholds are deliberately asymmetric at the boundaries: a score of
/// exactly 0.8 is `Medium` (the `High` bound is exclusive) and a score of
/// exactly 0.6 is `Medium` (the lower bound is inclusive).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    /// Similarity score below 0.6.
    Low,
    /// Similarity score in `[0.6, 0.8]`.
    Medium,
    /// Similarity score above 0.8.
    High,
}

impl ConfidenceLevel {
    /// Exclusive lower bound for [`Self::High`].
    pub const HIGH_THRESHOLD: f64 = 0.8;
    /// Inclusive lower bound for [`Self::Medium`].
    pub const MEDIUM_THRESHOLD: f64 = 0.6;

    /// Classifies a similarity score into a confidence tier.
    #[must_use]
    pub fn classify(score: f64) -> Self {
        if score > Self::HIGH_THRESHOLD {
            Self::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Per-factor similarity sub-scores, each in `[0, 1]`.
///
/// Returned alongside the weighted total so callers can audit how a
/// candidate earned its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    /// Relative building-area similarity.
    pub building_area: f64,
    /// Relative lot-size similarity.
    pub lot_size: f64,
    /// Construction-age similarity over a 50-year horizon.
    pub age: f64,
    /// Zoning-code similarity (exact, related category, or unrelated).
    pub zoning: f64,
    /// Great-circle proximity over a 50-mile horizon.
    pub location: f64,
}

/// A candidate property scored against an analysis target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableResult {
    /// The candidate property.
    pub record: PropertyRecord,
    /// Weighted similarity score in `[0, 1]`.
    pub similarity_score: f64,
    /// Confidence tier derived from the score.
    pub confidence_level: ConfidenceLevel,
    /// Per-factor breakdown of the score.
    pub factors: FactorScores,
}

/// Summary statistics over the full scored candidate set.
///
/// Computed before any result cap is applied, so the average reflects the
/// whole pool rather than the truncated view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Number of candidates scored (excludes the target itself).
    pub total_comparables_found: usize,
    /// Arithmetic mean similarity over all scored candidates; 0 when none.
    pub avg_similarity_score: f64,
}

/// The result of one comparable analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    /// The target property the candidates were scored against.
    pub target: PropertyRecord,
    /// Scored candidates, descending by score with ties broken by
    /// ascending `property_id`. May be truncated by a result cap.
    pub comparables: Vec<ComparableResult>,
    /// Statistics over the full scored set.
    pub summary: AnalysisSummary,
    /// When the analysis ran.
    pub analyzed_at: DateTime<Utc>,
}
