//! Schema normalization: raw source payloads → canonical records.
//!
//! Each source's [`SchemaMap`] drives a pure mapping from its raw field
//! names, units, and encodings into [`PropertyRecord`]. The normalizer
//! never invents values — a missing required field is a [`SchemaError`],
//! not a default — and never lets a non-finite number through.

use comp_scout_property_models::{County, PropertyRecord};

use crate::config::{AreaUnit, SchemaMap};
use crate::parsing::{coerce_f64, coerce_i64, coerce_string, lookup};
use crate::RawRecord;

/// Square feet per acre, for sources that report lot sizes in acres.
const SQ_FT_PER_ACRE: f64 = 43_560.0;

/// A per-record normalization failure.
///
/// Non-fatal for ingestion: the record is dropped and counted, and the
/// source's remaining records continue through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field `{field}`: {reason}")]
pub struct SchemaError {
    /// Canonical field that failed to normalize.
    pub field: String,
    /// What went wrong (missing, not numeric, negative, ...).
    pub reason: String,
}

impl SchemaError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(field, "required field missing from source record")
    }
}

/// Normalizes one raw source record into the canonical shape.
///
/// # Errors
///
/// Returns [`SchemaError`] naming the first canonical field that is
/// missing or malformed.
pub fn normalize(
    raw: &RawRecord,
    map: &SchemaMap,
    county: County,
) -> Result<PropertyRecord, SchemaError> {
    let local_id = required_string(raw, &map.property_id, "property_id")?;
    let address = required_string(raw, &map.address, "address")?;
    let city = required_string(raw, &map.city, "city")?;
    let zip_code = required_string(raw, &map.zip_code, "zip_code")?;

    let latitude = required_f64(raw, &map.latitude, "latitude")?;
    let longitude = required_f64(raw, &map.longitude, "longitude")?;

    let building_area = convert_area(
        required_f64(raw, &map.building_area, "building_area")?,
        map.units.building_area,
    );
    let lot_size = convert_area(
        required_f64(raw, &map.lot_size, "lot_size")?,
        map.units.lot_size,
    );

    let year_built = required_year(raw, &map.year_built, "year_built")?;

    let zoning = required_string(raw, &map.zoning, "zoning")?.to_uppercase();

    let assessed_value = required_f64(raw, &map.assessed_value, "assessed_value")?;
    if assessed_value < 0.0 {
        return Err(SchemaError::new("assessed_value", "negative value"));
    }

    let last_sale_amount = optional_f64(raw, &map.last_sale_amount);
    let property_type = lookup(raw, &map.property_type).and_then(|(_, v)| coerce_string(v));

    Ok(PropertyRecord {
        property_id: format!("{}-{local_id}", map.id_prefix),
        address,
        city,
        county,
        state: county.state().to_string(),
        zip_code,
        latitude,
        longitude,
        building_area,
        lot_size,
        year_built,
        zoning,
        assessed_value,
        last_sale_amount,
        property_type,
    })
}

fn required_string(
    raw: &RawRecord,
    candidates: &[String],
    field: &str,
) -> Result<String, SchemaError> {
    let (name, value) = lookup(raw, candidates).ok_or_else(|| SchemaError::missing(field))?;
    coerce_string(value)
        .ok_or_else(|| SchemaError::new(field, format!("`{name}` is empty or not a string")))
}

fn required_f64(raw: &RawRecord, candidates: &[String], field: &str) -> Result<f64, SchemaError> {
    let (name, value) = lookup(raw, candidates).ok_or_else(|| SchemaError::missing(field))?;
    coerce_f64(value)
        .ok_or_else(|| SchemaError::new(field, format!("`{name}` is not a finite number")))
}

fn required_year(raw: &RawRecord, candidates: &[String], field: &str) -> Result<i32, SchemaError> {
    let (name, value) = lookup(raw, candidates).ok_or_else(|| SchemaError::missing(field))?;
    let year = coerce_i64(value)
        .ok_or_else(|| SchemaError::new(field, format!("`{name}` is not an integer")))?;
    i32::try_from(year).map_err(|_| SchemaError::new(field, format!("`{name}` out of range")))
}

fn optional_f64(raw: &RawRecord, candidates: &[String]) -> Option<f64> {
    lookup(raw, candidates).and_then(|(_, v)| coerce_f64(v))
}

const fn convert_area(value: f64, unit: AreaUnit) -> f64 {
    match unit {
        AreaUnit::SquareFeet => value,
        AreaUnit::Acres => value * SQ_FT_PER_ACRE,
    }
}
