//! Built-in source registry.
//!
//! The shipped county sources are defined in TOML files embedded at compile
//! time. Each definition carries its fetcher endpoint, rate budget, and
//! schema map, and defaults to mock mode so a fresh checkout works without
//! credentials. Callers flip individual configs to live mode (and attach
//! credentials) before building adapters.

use crate::config::{parse_source_toml, SourceConfig};

/// Embedded source definitions, one per shipped county.
const SOURCE_DEFS: [&str; 3] = [
    include_str!("../sources/cook_county.toml"),
    include_str!("../sources/dallas_county.toml"),
    include_str!("../sources/los_angeles_county.toml"),
];

/// Returns the configs for every built-in source.
///
/// # Panics
///
/// Panics if an embedded definition fails to parse. The definitions are
/// compiled into the binary and covered by tests, so a parse failure is a
/// build defect, not a runtime condition.
#[must_use]
pub fn all_sources() -> Vec<SourceConfig> {
    SOURCE_DEFS
        .iter()
        .map(|raw| match parse_source_toml(raw) {
            Ok(config) => config,
            Err(e) => unreachable!("embedded source definition failed to parse: {e}"),
        })
        .collect()
}

/// Looks up a built-in source config by its identifier.
#[must_use]
pub fn find_source(id: &str) -> Option<SourceConfig> {
    all_sources().into_iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AreaUnit, FetcherConfig, SourceMode};
    use comp_scout_property_models::County;
    use std::collections::BTreeSet;

    #[test]
    fn all_embedded_definitions_parse() {
        let sources = all_sources();
        assert_eq!(sources.len(), 3);
    }

    #[test]
    fn source_ids_and_prefixes_are_unique() {
        let sources = all_sources();
        let ids: BTreeSet<_> = sources.iter().map(|s| s.id.as_str()).collect();
        let prefixes: BTreeSet<_> = sources.iter().map(|s| s.fields.id_prefix.as_str()).collect();
        assert_eq!(ids.len(), sources.len());
        assert_eq!(prefixes.len(), sources.len());
    }

    #[test]
    fn every_county_is_covered() {
        let counties: BTreeSet<_> = all_sources().iter().map(|s| s.county).collect();
        assert!(counties.contains(&County::CookCounty));
        assert!(counties.contains(&County::DallasCounty));
        assert!(counties.contains(&County::LosAngelesCounty));
    }

    #[test]
    fn sources_default_to_mock_mode() {
        for source in all_sources() {
            assert_eq!(source.mode, SourceMode::Mock, "{}", source.id);
            assert!(source.credentials.is_none(), "{}", source.id);
        }
    }

    #[test]
    fn dallas_uses_arcgis_with_acre_lots() {
        let dallas = find_source("dallas_county").unwrap();
        assert!(matches!(dallas.fetcher, FetcherConfig::Arcgis { .. }));
        assert_eq!(dallas.fields.units.lot_size, AreaUnit::Acres);
        assert_eq!(dallas.fields.units.building_area, AreaUnit::SquareFeet);
    }

    #[test]
    fn find_source_misses_unknown_id() {
        assert!(find_source("harris_county").is_none());
    }
}
