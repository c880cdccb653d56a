//! Industrial zoning taxonomy.
//!
//! County assessors write the same zoning intent in different notations
//! (`"I-1"` vs `"I1"`, `"M2"` vs `"m2"`). Codes are compared by a
//! normalized key so notation differences don't break allow-list checks or
//! exact-match scoring. The broad categories group codes by industrial
//! intensity, so an M-class and an I-class code of the same intensity are
//! treated as related.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Broad industrial category a zoning code belongs to.
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
pub enum ZoningCategory {
    /// Light manufacturing and light industrial (M1, I-1, IL, MR1).
    LightIndustrial,
    /// Heavy manufacturing and heavy industrial (M2, I-2, MR2).
    HeavyIndustrial,
    /// Mixed-use and research/flex industrial (IM, IR).
    FlexIndustrial,
}

/// Known industrial zoning codes: canonical notation, category, description.
const ZONING_TABLE: &[(&str, ZoningCategory, &str)] = &[
    ("M1", ZoningCategory::LightIndustrial, "Light Manufacturing"),
    ("M2", ZoningCategory::HeavyIndustrial, "Heavy Manufacturing"),
    ("I-1", ZoningCategory::LightIndustrial, "Light Industrial"),
    ("I-2", ZoningCategory::HeavyIndustrial, "Heavy Industrial"),
    ("IM", ZoningCategory::FlexIndustrial, "Industrial Mixed"),
    ("IL", ZoningCategory::LightIndustrial, "Industrial Light"),
    ("IR", ZoningCategory::FlexIndustrial, "Industrial Research"),
    (
        "MR1",
        ZoningCategory::LightIndustrial,
        "Restricted Light Industrial",
    ),
    (
        "MR2",
        ZoningCategory::HeavyIndustrial,
        "Restricted Heavy Industrial",
    ),
];

/// Normalizes a zoning code for comparison: uppercased with separators and
/// whitespace removed, so `"i-1"`, `"I1"`, and `"I-1"` all compare equal.
#[must_use]
pub fn code_key(code: &str) -> String {
    code.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

/// Returns `true` if two zoning codes denote the same code, ignoring
/// notation differences.
#[must_use]
pub fn same_code(a: &str, b: &str) -> bool {
    code_key(a) == code_key(b)
}

/// Returns the broad industrial category for a zoning code, or `None` for
/// codes outside the known industrial taxonomy (residential, commercial,
/// agricultural, unknown).
#[must_use]
pub fn category_for(code: &str) -> Option<ZoningCategory> {
    let key = code_key(code);
    ZONING_TABLE
        .iter()
        .find(|(canonical, _, _)| code_key(canonical) == key)
        .map(|(_, category, _)| *category)
}

/// Returns the description for a known zoning code.
#[must_use]
pub fn describe(code: &str) -> Option<&'static str> {
    let key = code_key(code);
    ZONING_TABLE
        .iter()
        .find(|(canonical, _, _)| code_key(canonical) == key)
        .map(|(_, _, description)| *description)
}

/// Returns the default industrial zoning allow-list in canonical notation.
#[must_use]
pub fn default_allow_list() -> Vec<String> {
    ZONING_TABLE
        .iter()
        .map(|(canonical, _, _)| (*canonical).to_string())
        .collect()
}
