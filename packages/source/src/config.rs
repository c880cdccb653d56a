//! Source configuration types, parsed from the embedded TOML registry.
//!
//! A [`SourceConfig`] fully describes one county data source: which fetcher
//! reaches it, the credentials and rate budget it expects, and the
//! [`SchemaMap`] that normalizes its raw payloads into the canonical record
//! shape. Deployments may also construct configs programmatically to
//! override endpoints, credentials, or the mock/live mode.

use comp_scout_property_models::County;
use serde::{Deserialize, Serialize};

/// Whether a source runs against the real endpoint or returns canned data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Deterministic canned payloads, no network, no credentials.
    Mock,
    /// Real HTTP fetches against the configured endpoint.
    Live,
}

/// Credentials for a live source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Application token sent with each request (Socrata `X-App-Token`
    /// header, `ArcGIS` `token` query parameter).
    pub app_token: String,
}

/// Client-side rate-limit budget: at most `max_requests` requests per
/// `window_secs`-second window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests allowed per window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}

/// Which fetcher implementation reaches this source and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Socrata SODA API with `$limit`/`$offset` pagination.
    Socrata {
        /// Dataset resource URL (e.g., `".../resource/tx8h-7rnu.json"`).
        api_url: String,
        /// Column used for deterministic `$order` pagination.
        order_column: String,
        /// Records per page.
        page_size: u64,
    },
    /// `ArcGIS` REST `FeatureServer`/`MapServer` layer query endpoint.
    Arcgis {
        /// Layer query URL (ending in `/query`).
        query_url: String,
        /// Records per page (`resultRecordCount`).
        page_size: u64,
        /// Optional `where` clause; defaults to `"1=1"`.
        #[serde(default)]
        where_clause: Option<String>,
    },
}

/// Unit a source reports an area field in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaUnit {
    /// Square feet (the canonical unit).
    #[default]
    SquareFeet,
    /// Acres, converted to square feet during normalization.
    Acres,
}

/// Area units for the two area fields; square feet unless overridden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaUnits {
    /// Unit of the raw building-area field.
    pub building_area: AreaUnit,
    /// Unit of the raw lot-size field.
    pub lot_size: AreaUnit,
}

/// Declarative mapping from one source's raw field names to the canonical
/// record shape.
///
/// Each canonical field lists the raw field names to try, first present
/// wins. An empty candidate list for an optional field means the source
/// never provides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMap {
    /// Prefix prepended to the source-local ID to form the globally unique
    /// `property_id` (e.g., `"CK"` → `"CK-04123"`).
    pub id_prefix: String,
    /// Units for the raw area fields.
    #[serde(default)]
    pub units: AreaUnits,
    /// Raw field names for the source-local parcel identifier.
    pub property_id: Vec<String>,
    /// Raw field names for the street address.
    pub address: Vec<String>,
    /// Raw field names for the city/municipality.
    pub city: Vec<String>,
    /// Raw field names for the ZIP code.
    pub zip_code: Vec<String>,
    /// Raw field names for latitude.
    pub latitude: Vec<String>,
    /// Raw field names for longitude.
    pub longitude: Vec<String>,
    /// Raw field names for building area.
    pub building_area: Vec<String>,
    /// Raw field names for lot size.
    pub lot_size: Vec<String>,
    /// Raw field names for construction year.
    pub year_built: Vec<String>,
    /// Raw field names for the zoning code.
    pub zoning: Vec<String>,
    /// Raw field names for assessed value.
    pub assessed_value: Vec<String>,
    /// Raw field names for the last sale amount (optional field).
    #[serde(default)]
    pub last_sale_amount: Vec<String>,
    /// Raw field names for the property classification (optional field).
    #[serde(default)]
    pub property_type: Vec<String>,
}

impl SchemaMap {
    /// Returns a schema map whose raw field names are the canonical names
    /// themselves. Used to normalize caller-supplied raw target attributes
    /// through the same path as source records.
    #[must_use]
    pub fn canonical(id_prefix: &str) -> Self {
        let one = |name: &str| vec![name.to_string()];
        Self {
            id_prefix: id_prefix.to_string(),
            units: AreaUnits::default(),
            property_id: one("property_id"),
            address: one("address"),
            city: one("city"),
            zip_code: one("zip_code"),
            latitude: one("latitude"),
            longitude: one("longitude"),
            building_area: one("building_area"),
            lot_size: one("lot_size"),
            year_built: one("year_built"),
            zoning: one("zoning"),
            assessed_value: one("assessed_value"),
            last_sale_amount: one("last_sale_amount"),
            property_type: one("property_type"),
        }
    }
}

/// Full configuration for one county data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique source identifier (e.g., `"cook_county"`).
    pub id: String,
    /// Human-readable name (e.g., `"Cook County Assessor"`).
    pub name: String,
    /// County this source covers.
    pub county: County,
    /// Mock or live mode.
    pub mode: SourceMode,
    /// Fetcher implementation and endpoint.
    pub fetcher: FetcherConfig,
    /// Client-side rate budget.
    #[serde(default)]
    pub rate_limit: RateLimit,
    /// Credentials, absent in mock mode.
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Raw-field mapping to the canonical record shape.
    pub fields: SchemaMap,
}

/// Parses a source definition from TOML.
///
/// # Errors
///
/// Returns a [`toml::de::Error`] if the TOML is malformed or missing
/// required keys.
pub fn parse_source_toml(raw: &str) -> Result<SourceConfig, toml::de::Error> {
    toml::from_str(raw)
}
