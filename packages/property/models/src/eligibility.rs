//! Eligibility rules gating admission to the candidate pool.
//!
//! A normalized record that fails any check here is dropped before it
//! reaches the pool. The orchestrator keeps aggregate counts per
//! [`DropReason`] rather than retaining the rejected records.

use chrono::{Datelike as _, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::PropertyRecord;
use crate::zoning;

/// Earliest plausible construction year.
pub const MIN_YEAR_BUILT: i32 = 1800;

/// Why a normalized record was rejected by the property filter.
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
pub enum DropReason {
    /// Zoning code is not in the industrial allow-list.
    ZoningNotAllowed,
    /// Building area is zero, negative, or non-finite.
    NonPositiveBuildingArea,
    /// Lot size is zero, negative, or non-finite.
    NonPositiveLotSize,
    /// Latitude or longitude outside valid global ranges.
    CoordinateOutOfRange,
    /// Year built outside `[1800, current year]`.
    YearBuiltOutOfRange,
}

/// Domain eligibility criteria for industrial comparables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRules {
    /// Zoning codes admitted to the pool. Compared notation-insensitively
    /// via [`zoning::same_code`].
    pub allowed_zoning: Vec<String>,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            allowed_zoning: zoning::default_allow_list(),
        }
    }
}

impl EligibilityRules {
    /// Checks a record against every eligibility criterion, returning the
    /// first failing [`DropReason`].
    ///
    /// # Errors
    ///
    /// Returns the [`DropReason`] describing why the record is ineligible.
    pub fn check(&self, record: &PropertyRecord) -> Result<(), DropReason> {
        if !(record.building_area.is_finite() && record.building_area > 0.0) {
            return Err(DropReason::NonPositiveBuildingArea);
        }
        if !(record.lot_size.is_finite() && record.lot_size > 0.0) {
            return Err(DropReason::NonPositiveLotSize);
        }
        if !coordinates_in_range(record.latitude, record.longitude) {
            return Err(DropReason::CoordinateOutOfRange);
        }
        let current_year = Utc::now().year();
        if record.year_built < MIN_YEAR_BUILT || record.year_built > current_year {
            return Err(DropReason::YearBuiltOutOfRange);
        }
        if !self
            .allowed_zoning
            .iter()
            .any(|allowed| zoning::same_code(allowed, &record.zoning))
        {
            return Err(DropReason::ZoningNotAllowed);
        }
        Ok(())
    }

    /// Returns `true` if the record passes every eligibility criterion.
    #[must_use]
    pub fn is_eligible(&self, record: &PropertyRecord) -> bool {
        self.check(record).is_ok()
    }
}

/// Returns `true` if both coordinates are finite and within valid global
/// ranges.
#[must_use]
pub fn coordinates_in_range(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::County;

    fn industrial_record() -> PropertyRecord {
        PropertyRecord {
            property_id: "CK0001".to_string(),
            address: "2000 Busse Rd".to_string(),
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
            assessed_value: 2_000_000.0,
            last_sale_amount: None,
            property_type: Some("Industrial".to_string()),
        }
    }

    #[test]
    fn accepts_eligible_industrial_record() {
        assert!(EligibilityRules::default().is_eligible(&industrial_record()));
    }

    #[test]
    fn rejects_residential_zoning() {
        let mut record = industrial_record();
        record.zoning = "R1".to_string();
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::ZoningNotAllowed)
        );
    }

    #[test]
    fn accepts_allow_listed_code_in_alternate_notation() {
        let mut record = industrial_record();
        record.zoning = "I1".to_string();
        assert!(EligibilityRules::default().is_eligible(&record));
    }

    #[test]
    fn rejects_non_positive_building_area() {
        let mut record = industrial_record();
        record.building_area = 0.0;
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::NonPositiveBuildingArea)
        );
        record.building_area = f64::NAN;
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::NonPositiveBuildingArea)
        );
    }

    #[test]
    fn rejects_non_positive_lot_size() {
        let mut record = industrial_record();
        record.lot_size = -1.0;
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::NonPositiveLotSize)
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut record = industrial_record();
        record.latitude = 91.0;
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::CoordinateOutOfRange)
        );
        record.latitude = 41.85;
        record.longitude = -181.0;
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::CoordinateOutOfRange)
        );
    }

    #[test]
    fn rejects_implausible_year_built() {
        let mut record = industrial_record();
        record.year_built = 1799;
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::YearBuiltOutOfRange)
        );
        record.year_built = Utc::now().year() + 1;
        assert_eq!(
            EligibilityRules::default().check(&record),
            Err(DropReason::YearBuiltOutOfRange)
        );
    }

    #[test]
    fn custom_allow_list_narrows_eligibility() {
        let rules = EligibilityRules {
            allowed_zoning: vec!["M2".to_string()],
        };
        let record = industrial_record();
        assert_eq!(rules.check(&record), Err(DropReason::ZoningNotAllowed));
    }
}
