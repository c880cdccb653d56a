//! Mock adapters returning deterministic canned payloads.
//!
//! Each county's canned records use that county's *native* raw shape — the
//! same field names, string-encoded numbers, and unit quirks the live API
//! returns — so development and tests exercise the full normalize/filter
//! path without network access or real parcel data.
//!
//! The record sets are fixed: a handful of eligible industrial parcels per
//! county, plus one residentially zoned parcel (filtered out downstream)
//! and one record with a missing required field (dropped by the
//! normalizer). Counts are stable so tests can assert on them.

use async_trait::async_trait;
use comp_scout_property_models::County;
use serde_json::json;

use crate::config::{SchemaMap, SourceConfig};
use crate::{FetchOptions, PropertySource, RawRecord, SourceError};

/// A source that returns canned data for its configured county.
pub struct MockSource {
    config: SourceConfig,
}

impl MockSource {
    /// Creates a mock adapter for the config's county.
    #[must_use]
    pub const fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PropertySource for MockSource {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn county(&self) -> County {
        self.config.county
    }

    fn schema(&self) -> &SchemaMap {
        &self.config.fields
    }

    async fn fetch(&self, options: &FetchOptions) -> Result<Vec<RawRecord>, SourceError> {
        let mut records = canned_records(self.config.county);
        if let Some(limit) = options.limit {
            records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        log::info!(
            "{}: mock mode, returning {} canned records",
            self.config.name,
            records.len()
        );
        Ok(records)
    }
}

/// Returns the fixed raw record set for a county, in the county's native
/// payload shape.
#[must_use]
pub fn canned_records(county: County) -> Vec<RawRecord> {
    match county {
        County::CookCounty => cook_county_records(),
        County::DallasCounty => dallas_county_records(),
        County::LosAngelesCounty => los_angeles_records(),
    }
}

/// Cook County assessor payloads: Socrata style, numerics as strings.
fn cook_county_records() -> Vec<RawRecord> {
    vec![
        json!({
            "pin": "08-22-401-013",
            "property_address": "2501 Lively Blvd",
            "municipality": "Elk Grove Village",
            "zip": "60007",
            "latitude": "42.0012",
            "longitude": "-87.9980",
            "building_sq_ft": "85000",
            "land_sq_ft": "210000",
            "year_built": "1987",
            "zoning_code": "M1",
            "total_value": "5400000",
            "sale_price": "5100000",
            "class_description": "Industrial"
        }),
        json!({
            "pin": "08-23-200-044",
            "property_address": "1200 Busse Rd",
            "municipality": "Elk Grove Village",
            "zip": "60007",
            "latitude": "42.0155",
            "longitude": "-87.9733",
            "building_sq_ft": "50000",
            "land_sq_ft": "100000",
            "year_built": "2000",
            "zoning_code": "M1",
            "total_value": "4000000",
            "sale_price": "3800000",
            "class_description": "Industrial"
        }),
        json!({
            "pin": "19-16-300-021",
            "property_address": "6600 S Archer Ave",
            "municipality": "Bedford Park",
            "zip": "60501",
            "latitude": "41.7702",
            "longitude": "-87.7810",
            "building_sq_ft": "132500",
            "land_sq_ft": "390000",
            "year_built": "1972",
            "zoning_code": "M2",
            "total_value": "7900000",
            "class_description": "Industrial"
        }),
        json!({
            "pin": "19-17-100-008",
            "property_address": "7400 W 65th St",
            "municipality": "Bedford Park",
            "zip": "60501",
            "latitude": "41.7731",
            "longitude": "-87.8055",
            "building_sq_ft": "55000",
            "land_sq_ft": "118000",
            "year_built": "1998",
            "zoning_code": "I-1",
            "total_value": "4250000",
            "sale_price": "4000000",
            "class_description": "Industrial"
        }),
        json!({
            "pin": "08-24-101-002",
            "property_address": "901 Devon Ave",
            "municipality": "Elk Grove Village",
            "zip": "60007",
            "latitude": "42.0098",
            "longitude": "-87.9601",
            "building_sq_ft": "230000",
            "land_sq_ft": "620000",
            "year_built": "1979",
            "zoning_code": "I-2",
            "total_value": "13800000",
            "class_description": "Industrial"
        }),
        // Residential parcel: passes normalization, rejected by the filter.
        json!({
            "pin": "08-25-404-017",
            "property_address": "445 Ridge Ave",
            "municipality": "Elk Grove Village",
            "zip": "60007",
            "latitude": "42.0040",
            "longitude": "-87.9702",
            "building_sq_ft": "2400",
            "land_sq_ft": "9000",
            "year_built": "1965",
            "zoning_code": "R1",
            "total_value": "310000",
            "class_description": "Residential"
        }),
        // Missing land_sq_ft: dropped by the normalizer.
        json!({
            "pin": "19-18-200-033",
            "property_address": "5200 W 73rd St",
            "municipality": "Bedford Park",
            "zip": "60638",
            "latitude": "41.7588",
            "longitude": "-87.7555",
            "building_sq_ft": "61000",
            "year_built": "1985",
            "zoning_code": "M1",
            "total_value": "3600000",
            "class_description": "Industrial"
        }),
    ]
}

/// Dallas County appraisal payloads: `ArcGIS` attribute style, lot sizes in
/// acres, years as floats, geometry coordinates pre-flattened.
fn dallas_county_records() -> Vec<RawRecord> {
    vec![
        json!({
            "ACCOUNT_NUM": "00000125490000000",
            "SITE_ADDRESS": "2323 Regal Row",
            "CITY": "Dallas",
            "ZIP_CODE": 75247,
            "_geometry_y": 32.8101,
            "_geometry_x": -96.8774,
            "BLDG_AREA": 96000,
            "LAND_AREA_ACRES": 5.1,
            "YR_BUILT": 1984.0,
            "ZONING": "IR",
            "TOTAL_VALUE": 6100000,
            "SALE_AMOUNT": 5750000,
            "PROP_TYPE": "Industrial"
        }),
        json!({
            "ACCOUNT_NUM": "00000139220000000",
            "SITE_ADDRESS": "4100 Singleton Blvd",
            "CITY": "Dallas",
            "ZIP_CODE": 75212,
            "_geometry_y": 32.7792,
            "_geometry_x": -96.8644,
            "BLDG_AREA": 52000,
            "LAND_AREA_ACRES": 2.4,
            "YR_BUILT": 2001.0,
            "ZONING": "IM",
            "TOTAL_VALUE": 3900000,
            "PROP_TYPE": "Industrial"
        }),
        json!({
            "ACCOUNT_NUM": "00000152780000000",
            "SITE_ADDRESS": "8700 Stemmons Fwy",
            "CITY": "Dallas",
            "ZIP_CODE": 75247,
            "_geometry_y": 32.8330,
            "_geometry_x": -96.8802,
            "BLDG_AREA": 185000,
            "LAND_AREA_ACRES": 9.8,
            "YR_BUILT": 1969.0,
            "ZONING": "IM",
            "TOTAL_VALUE": 9400000,
            "SALE_AMOUNT": 9000000,
            "PROP_TYPE": "Industrial"
        }),
        json!({
            "ACCOUNT_NUM": "00000168150000000",
            "SITE_ADDRESS": "1700 Empire Central Dr",
            "CITY": "Dallas",
            "ZIP_CODE": 75235,
            "_geometry_y": 32.8189,
            "_geometry_x": -96.8517,
            "BLDG_AREA": 47500,
            "LAND_AREA_ACRES": 2.0,
            "YR_BUILT": 1996.0,
            "ZONING": "IL",
            "TOTAL_VALUE": 3350000,
            "PROP_TYPE": "Industrial"
        }),
        json!({
            "ACCOUNT_NUM": "00000171030000000",
            "SITE_ADDRESS": "2900 Irving Blvd",
            "CITY": "Dallas",
            "ZIP_CODE": 75247,
            "_geometry_y": 32.8010,
            "_geometry_x": -96.8555,
            "BLDG_AREA": 260000,
            "LAND_AREA_ACRES": 12.6,
            "YR_BUILT": 1977.0,
            "ZONING": "IM",
            "TOTAL_VALUE": 14200000,
            "SALE_AMOUNT": 13500000,
            "PROP_TYPE": "Industrial"
        }),
        // Residential parcel: filtered out downstream.
        json!({
            "ACCOUNT_NUM": "00000183440000000",
            "SITE_ADDRESS": "5605 Mockingbird Ln",
            "CITY": "Dallas",
            "ZIP_CODE": 75206,
            "_geometry_y": 32.8372,
            "_geometry_x": -96.7766,
            "BLDG_AREA": 3100,
            "LAND_AREA_ACRES": 0.3,
            "YR_BUILT": 1958.0,
            "ZONING": "R-7.5",
            "TOTAL_VALUE": 650000,
            "PROP_TYPE": "Residential"
        }),
        // Missing YR_BUILT: dropped by the normalizer.
        json!({
            "ACCOUNT_NUM": "00000197610000000",
            "SITE_ADDRESS": "3300 Manufacturing St",
            "CITY": "Dallas",
            "ZIP_CODE": 75207,
            "_geometry_y": 32.7955,
            "_geometry_x": -96.8301,
            "BLDG_AREA": 71000,
            "LAND_AREA_ACRES": 3.2,
            "ZONING": "IM",
            "TOTAL_VALUE": 5200000,
            "PROP_TYPE": "Industrial"
        }),
    ]
}

/// Los Angeles County assessor payloads: Socrata style, coordinates as
/// strings.
fn los_angeles_records() -> Vec<RawRecord> {
    vec![
        json!({
            "ain": "6303021019",
            "situs_address": "4601 S Soto St",
            "situs_city": "Vernon",
            "situs_zip": "90058",
            "center_lat": "34.0031",
            "center_lon": "-118.2190",
            "building_sqft": "78000",
            "lot_area_sqft": "160000",
            "effective_year_built": "1990",
            "zoning": "M2",
            "total_assessed_value": "8900000",
            "use_type": "Industrial"
        }),
        json!({
            "ain": "6303128005",
            "situs_address": "3049 E Washington Blvd",
            "situs_city": "Vernon",
            "situs_zip": "90058",
            "center_lat": "34.0189",
            "center_lon": "-118.2211",
            "building_sqft": "51000",
            "lot_area_sqft": "98000",
            "effective_year_built": "2004",
            "zoning": "M1",
            "total_assessed_value": "6700000",
            "use_type": "Industrial"
        }),
        json!({
            "ain": "8208017033",
            "situs_address": "17000 Gale Ave",
            "situs_city": "City of Industry",
            "situs_zip": "91745",
            "center_lat": "33.9981",
            "center_lon": "-117.9370",
            "building_sqft": "142000",
            "lot_area_sqft": "310000",
            "effective_year_built": "1981",
            "zoning": "MR2",
            "total_assessed_value": "12600000",
            "use_type": "Industrial"
        }),
        json!({
            "ain": "8208054011",
            "situs_address": "18655 E Valley Blvd",
            "situs_city": "City of Industry",
            "situs_zip": "91744",
            "center_lat": "34.0157",
            "center_lon": "-117.9044",
            "building_sqft": "47000",
            "lot_area_sqft": "95000",
            "effective_year_built": "1999",
            "zoning": "MR1",
            "total_assessed_value": "5100000",
            "use_type": "Industrial"
        }),
        json!({
            "ain": "6303209014",
            "situs_address": "2801 Santa Fe Ave",
            "situs_city": "Vernon",
            "situs_zip": "90058",
            "center_lat": "34.0102",
            "center_lon": "-118.2303",
            "building_sqft": "198000",
            "lot_area_sqft": "405000",
            "effective_year_built": "1974",
            "zoning": "M2",
            "total_assessed_value": "15800000",
            "use_type": "Industrial"
        }),
        // Residential parcel: filtered out downstream.
        json!({
            "ain": "5021004022",
            "situs_address": "1154 W 37th Dr",
            "situs_city": "Los Angeles",
            "situs_zip": "90007",
            "center_lat": "34.0180",
            "center_lon": "-118.2919",
            "building_sqft": "1850",
            "lot_area_sqft": "6200",
            "effective_year_built": "1922",
            "zoning": "R1",
            "total_assessed_value": "720000",
            "use_type": "Residential"
        }),
        // Missing coordinates: dropped by the normalizer.
        json!({
            "ain": "6303302008",
            "situs_address": "5201 District Blvd",
            "situs_city": "Vernon",
            "situs_zip": "90058",
            "building_sqft": "66000",
            "lot_area_sqft": "135000",
            "effective_year_built": "1988",
            "zoning": "M1",
            "total_assessed_value": "7100000",
            "use_type": "Industrial"
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[tokio::test]
    async fn mock_fetch_is_deterministic() {
        let config = registry::all_sources()
            .into_iter()
            .find(|s| s.county == County::CookCounty)
            .unwrap();
        let source = MockSource::new(config);
        let first = source.fetch(&FetchOptions::default()).await.unwrap();
        let second = source.fetch(&FetchOptions::default()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
    }

    #[tokio::test]
    async fn mock_fetch_honors_limit() {
        let config = registry::all_sources()
            .into_iter()
            .find(|s| s.county == County::DallasCounty)
            .unwrap();
        let source = MockSource::new(config);
        let records = source
            .fetch(&FetchOptions { limit: Some(3) })
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn every_county_has_canned_records() {
        for county in [
            County::CookCounty,
            County::DallasCounty,
            County::LosAngelesCounty,
        ] {
            assert_eq!(canned_records(county).len(), 7, "{county}");
        }
    }
}
