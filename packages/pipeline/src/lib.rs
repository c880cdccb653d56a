#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline facade tying ingestion and analysis together.
//!
//! [`CompScout`] owns the candidate pool as explicitly versioned state
//! behind an async `RwLock`: reads serve the current snapshot, ingesting
//! lazily on first use and again after the time-to-live expires, and
//! [`CompScout::refresh`] invalidates on demand. Concurrent analysis
//! requests against the same snapshot version always see the same pool.

pub mod config;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use comp_scout_analysis::AnalysisError;
use comp_scout_ingest::{run_ingest, IngestError, IngestOutcome, SourceStatus};
use comp_scout_property_models::eligibility::EligibilityRules;
use comp_scout_property_models::zoning::{self, ZoningCategory};
use comp_scout_property_models::{AnalysisOutcome, County, PropertyRecord};
use comp_scout_source::{build_source, normalize, registry, PropertySource, SchemaError, SchemaMap, SourceConfig};
use serde::Serialize;
use strum::IntoEnumIterator;
use tokio::sync::RwLock;

pub use config::{ConfigError, PipelineConfig, DEFAULT_RESULT_CAP, DEFAULT_SNAPSHOT_TTL};

/// Errors surfaced by the pipeline facade.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every source failed during an ingestion run.
    #[error(transparent)]
    NoData(#[from] IngestError),

    /// The analysis target was rejected.
    #[error(transparent)]
    InvalidTarget(#[from] AnalysisError),

    /// A custom target's attributes could not be normalized into a record.
    #[error("invalid target attributes: {0}")]
    MalformedTarget(#[from] SchemaError),

    /// The requested property is not in the current pool.
    #[error("unknown property `{property_id}`")]
    UnknownProperty {
        /// The identifier that matched nothing.
        property_id: String,
    },
}

/// An analysis target: either a pool member by ID, or caller-supplied
/// attributes for a property not in any source.
#[derive(Debug, Clone)]
pub enum TargetSpec {
    /// A property already in the pool, looked up by `property_id`.
    Id(String),
    /// Raw attributes using the canonical field names (`building_area`,
    /// `lot_size`, `year_built`, `zoning`, `latitude`, `longitude`, ...).
    /// Descriptive fields may be omitted; the record is normalized and
    /// filtered exactly like a source record.
    Custom {
        /// County to attribute the target to.
        county: County,
        /// Canonical-named raw attributes.
        attributes: serde_json::Value,
    },
}

/// Supported-county metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyInfo {
    /// The county.
    pub county: County,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Two-letter state abbreviation.
    pub state: &'static str,
    /// Short description of the jurisdiction's data source.
    pub description: &'static str,
}

/// One allow-listed zoning code with its taxonomy entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningInfo {
    /// The code in its configured notation.
    pub code: String,
    /// Broad industrial category.
    pub category: ZoningCategory,
    /// Human-readable description.
    pub description: String,
}

/// Aggregate view over the current snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Snapshot version, incremented on every refresh.
    pub version: u64,
    /// When the snapshot was ingested.
    pub ingested_at: DateTime<Utc>,
    /// Eligible properties in the pool.
    pub total_properties: usize,
    /// Pool counts keyed by county display name.
    pub by_county: BTreeMap<String, usize>,
    /// Pool counts keyed by zoning code.
    pub by_zoning: BTreeMap<String, usize>,
    /// Mean building area in square feet; 0 for an empty pool.
    pub avg_building_area: f64,
    /// Mean assessed value in dollars; 0 for an empty pool.
    pub avg_assessed_value: f64,
    /// Per-source statuses from the ingestion run that built the snapshot.
    pub sources: Vec<SourceStatus>,
}

/// One versioned ingestion result.
#[derive(Debug, Clone)]
struct Snapshot {
    version: u64,
    ingested_at: DateTime<Utc>,
    records: Vec<PropertyRecord>,
    statuses: Vec<SourceStatus>,
}

/// The comparable-finding pipeline.
///
/// Construct once, share via `Arc`, call from any task.
pub struct CompScout {
    config: PipelineConfig,
    sources: Vec<Arc<dyn PropertySource>>,
    rules: EligibilityRules,
    state: RwLock<Option<Snapshot>>,
}

impl CompScout {
    /// Builds a pipeline from a validated configuration, constructing the
    /// mock or live adapter for each configured source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is rejected.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sources = config.sources.iter().map(build_source).collect();
        Ok(Self::assemble(config, sources))
    }

    /// Builds a pipeline over pre-built source adapters, bypassing the
    /// config's own source list. Used to inject synthetic sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the scoring configuration is rejected
    /// or `sources` is empty.
    pub fn with_sources(
        config: PipelineConfig,
        sources: Vec<Arc<dyn PropertySource>>,
    ) -> Result<Self, ConfigError> {
        config.validate_scoring()?;
        if sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        Ok(Self::assemble(config, sources))
    }

    fn assemble(config: PipelineConfig, sources: Vec<Arc<dyn PropertySource>>) -> Self {
        let rules = EligibilityRules {
            allowed_zoning: config.allowed_zoning.clone(),
        };
        Self {
            config,
            sources,
            rules,
            state: RwLock::new(None),
        }
    }

    /// Runs a fresh ingestion and installs it as the current snapshot,
    /// bumping the version.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoData`] when every source failed; the
    /// previous snapshot, if any, stays installed.
    pub async fn refresh(&self) -> Result<IngestOutcome, PipelineError> {
        let outcome = run_ingest(&self.sources, &self.rules, &self.config.ingest).await?;

        let mut guard = self.state.write().await;
        let version = guard.as_ref().map_or(1, |s| s.version + 1);
        log::info!(
            "Installing snapshot v{version}: {} properties from {}/{} sources",
            outcome.records.len(),
            outcome.sources_succeeded(),
            outcome.statuses.len()
        );
        *guard = Some(Snapshot {
            version,
            ingested_at: Utc::now(),
            records: outcome.records.clone(),
            statuses: outcome.statuses.clone(),
        });

        Ok(outcome)
    }

    /// Lists pool properties, optionally filtered by county and capped.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoData`] if a required ingestion fails.
    pub async fn list_properties(
        &self,
        county: Option<County>,
        limit: Option<usize>,
    ) -> Result<Vec<PropertyRecord>, PipelineError> {
        self.with_snapshot(|snapshot| {
            let mut records: Vec<PropertyRecord> = snapshot
                .records
                .iter()
                .filter(|r| county.is_none_or(|c| r.county == c))
                .cloned()
                .collect();
            if let Some(limit) = limit {
                records.truncate(limit);
            }
            records
        })
        .await
    }

    /// Looks up one pool property by ID.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownProperty`] when the ID matches
    /// nothing in the current pool.
    pub async fn get_property(&self, property_id: &str) -> Result<PropertyRecord, PipelineError> {
        self.with_snapshot(|snapshot| {
            snapshot
                .records
                .iter()
                .find(|r| r.property_id == property_id)
                .cloned()
                .ok_or_else(|| PipelineError::UnknownProperty {
                    property_id: property_id.to_string(),
                })
        })
        .await?
    }

    /// Scores the pool against a target and returns the ranked comparables.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownProperty`] for an unresolvable ID
    /// target, [`PipelineError::MalformedTarget`] when custom attributes
    /// fail normalization, or [`PipelineError::InvalidTarget`] when the
    /// target fails eligibility.
    pub async fn analyze_comparables(
        &self,
        target: &TargetSpec,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let resolved = self
            .with_snapshot(|snapshot| {
                let record = match target {
                    TargetSpec::Id(id) => snapshot
                        .records
                        .iter()
                        .find(|r| &r.property_id == id)
                        .cloned()
                        .ok_or_else(|| PipelineError::UnknownProperty {
                            property_id: id.clone(),
                        })?,
                    TargetSpec::Custom { county, attributes } => {
                        resolve_custom(*county, attributes)?
                    }
                };
                Ok::<_, PipelineError>((record, snapshot.records.clone()))
            })
            .await?;
        let (record, pool) = resolved?;

        Ok(comp_scout_analysis::analyze(
            &record,
            &pool,
            &self.config.weights,
            &self.rules,
            self.config.result_cap,
        )?)
    }

    /// Metadata for every supported county.
    #[must_use]
    pub fn counties() -> Vec<CountyInfo> {
        County::iter()
            .map(|county| CountyInfo {
                county,
                display_name: county.display_name(),
                state: county.state(),
                description: county.description(),
            })
            .collect()
    }

    /// The configured zoning allow-list with taxonomy entries.
    #[must_use]
    pub fn zoning_codes(&self) -> Vec<ZoningInfo> {
        self.config
            .allowed_zoning
            .iter()
            .filter_map(|code| {
                zoning::category_for(code).map(|category| ZoningInfo {
                    code: code.clone(),
                    category,
                    description: zoning::describe(code).unwrap_or_default().to_string(),
                })
            })
            .collect()
    }

    /// Aggregate statistics over the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoData`] if a required ingestion fails.
    pub async fn stats(&self) -> Result<PoolStats, PipelineError> {
        self.with_snapshot(|snapshot| {
            let mut by_county: BTreeMap<String, usize> = BTreeMap::new();
            let mut by_zoning: BTreeMap<String, usize> = BTreeMap::new();
            let mut area_sum = 0.0;
            let mut value_sum = 0.0;
            for record in &snapshot.records {
                *by_county
                    .entry(record.county.display_name().to_string())
                    .or_default() += 1;
                *by_zoning.entry(record.zoning.clone()).or_default() += 1;
                area_sum += record.building_area;
                value_sum += record.assessed_value;
            }

            let total = snapshot.records.len();
            #[allow(clippy::cast_precision_loss)]
            let divisor = if total == 0 { 1.0 } else { total as f64 };
            PoolStats {
                version: snapshot.version,
                ingested_at: snapshot.ingested_at,
                total_properties: total,
                by_county,
                by_zoning,
                avg_building_area: area_sum / divisor,
                avg_assessed_value: value_sum / divisor,
                sources: snapshot.statuses.clone(),
            }
        })
        .await
    }

    /// Ingests if no fresh snapshot exists, then applies `f` to it under
    /// the read lock.
    async fn with_snapshot<T>(
        &self,
        f: impl FnOnce(&Snapshot) -> T,
    ) -> Result<T, PipelineError> {
        let needs_refresh = {
            let guard = self.state.read().await;
            match guard.as_ref() {
                Some(snapshot) if !self.is_stale(snapshot) => false,
                Some(snapshot) => {
                    log::info!("snapshot v{} past its TTL, re-ingesting", snapshot.version);
                    true
                }
                None => true,
            }
        };
        if needs_refresh {
            self.refresh().await?;
        }

        let guard = self.state.read().await;
        let Some(snapshot) = guard.as_ref() else {
            unreachable!("refresh always installs a snapshot")
        };
        Ok(f(snapshot))
    }

    fn is_stale(&self, snapshot: &Snapshot) -> bool {
        let ttl = chrono::Duration::from_std(self.config.snapshot_ttl)
            .unwrap_or(chrono::Duration::MAX);
        Utc::now() - snapshot.ingested_at > ttl
    }
}

/// Normalizes caller-supplied attributes through the canonical schema,
/// filling placeholder descriptive fields so a minimal scoring payload
/// (areas, year, zoning, coordinates) is enough.
fn resolve_custom(
    county: County,
    attributes: &serde_json::Value,
) -> Result<PropertyRecord, PipelineError> {
    let mut attributes = attributes.clone();
    if let Some(obj) = attributes.as_object_mut() {
        let defaults = [
            ("property_id", "TARGET"),
            ("address", "Custom Target"),
            ("city", "Unspecified"),
            ("zip_code", "00000"),
        ];
        for (key, value) in defaults {
            obj.entry(key)
                .or_insert_with(|| serde_json::Value::String(value.to_string()));
        }
        obj.entry("assessed_value")
            .or_insert_with(|| serde_json::json!(0.0));
    }

    let schema = SchemaMap::canonical("CUSTOM");
    Ok(normalize::normalize(&attributes, &schema, county)?)
}

/// Returns the registry sources to use, filtered by a comma-separated ID
/// list from the CLI or the `COMP_SCOUT_SOURCES` environment variable. With
/// neither set, all registry sources are returned.
#[must_use]
pub fn enabled_sources(cli_filter: Option<String>) -> Vec<SourceConfig> {
    let filter = cli_filter.or_else(|| std::env::var("COMP_SCOUT_SOURCES").ok());

    let all = registry::all_sources();

    let Some(filter_str) = filter else {
        return all;
    };

    let ids: Vec<&str> = filter_str.split(',').map(str::trim).collect();
    let filtered: Vec<SourceConfig> = all
        .into_iter()
        .filter(|s| ids.contains(&s.id.as_str()))
        .collect();

    if filtered.is_empty() {
        log::warn!(
            "No matching sources found for filter {:?}. Available: {}",
            ids,
            registry::all_sources()
                .iter()
                .map(|s| s.id.clone())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use async_trait::async_trait;
    use comp_scout_source::{FetchOptions, RawRecord, SourceError};
    use serde_json::json;

    struct DownSource;

    #[async_trait]
    impl PropertySource for DownSource {
        fn id(&self) -> &str {
            "down_source"
        }

        fn county(&self) -> County {
            County::DallasCounty
        }

        fn schema(&self) -> &SchemaMap {
            unimplemented!("never fetches successfully")
        }

        async fn fetch(&self, _options: &FetchOptions) -> Result<Vec<RawRecord>, SourceError> {
            Err(SourceError::Unavailable {
                reason: "connection refused".to_string(),
            })
        }
    }

    fn fast_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.ingest.retry = comp_scout_ingest::RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        };
        config
    }

    fn pipeline() -> CompScout {
        CompScout::new(fast_config()).unwrap()
    }

    #[tokio::test]
    async fn first_read_ingests_lazily() {
        let scout = pipeline();
        let records = scout.list_properties(None, None).await.unwrap();
        assert_eq!(records.len(), 15);
    }

    #[tokio::test]
    async fn county_filter_and_limit_apply() {
        let scout = pipeline();
        let cook = scout
            .list_properties(Some(County::CookCounty), None)
            .await
            .unwrap();
        assert_eq!(cook.len(), 5);
        assert!(cook.iter().all(|r| r.county == County::CookCounty));

        let capped = scout.list_properties(None, Some(4)).await.unwrap();
        assert_eq!(capped.len(), 4);
    }

    #[tokio::test]
    async fn get_property_round_trips() {
        let scout = pipeline();
        let all = scout.list_properties(None, None).await.unwrap();
        let first = &all[0];
        let fetched = scout.get_property(&first.property_id).await.unwrap();
        assert_eq!(&fetched, first);

        let missing = scout.get_property("CK-NOPE").await;
        assert!(matches!(
            missing,
            Err(PipelineError::UnknownProperty { .. })
        ));
    }

    #[tokio::test]
    async fn analyze_by_id_excludes_the_target() {
        let scout = pipeline();
        let all = scout.list_properties(None, None).await.unwrap();
        let target_id = all[0].property_id.clone();

        let outcome = scout
            .analyze_comparables(&TargetSpec::Id(target_id.clone()))
            .await
            .unwrap();

        assert_eq!(outcome.target.property_id, target_id);
        assert_eq!(outcome.summary.total_comparables_found, 14);
        assert!(outcome
            .comparables
            .iter()
            .all(|c| c.record.property_id != target_id));
        // Ranked descending.
        for pair in outcome.comparables.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }

    #[tokio::test]
    async fn analyze_custom_target() {
        let scout = pipeline();
        let outcome = scout
            .analyze_comparables(&TargetSpec::Custom {
                county: County::CookCounty,
                attributes: json!({
                    "building_area": 50_000,
                    "lot_size": 100_000,
                    "year_built": 2000,
                    "zoning": "M1",
                    "latitude": 41.85,
                    "longitude": -87.65,
                }),
            })
            .await
            .unwrap();

        assert_eq!(outcome.target.property_id, "CUSTOM-TARGET");
        assert_eq!(outcome.summary.total_comparables_found, 15);
    }

    #[tokio::test]
    async fn ineligible_custom_target_is_rejected() {
        let scout = pipeline();
        let result = scout
            .analyze_comparables(&TargetSpec::Custom {
                county: County::CookCounty,
                attributes: json!({
                    "building_area": 2_400,
                    "lot_size": 9_000,
                    "year_built": 1965,
                    "zoning": "R1",
                    "latitude": 42.0,
                    "longitude": -87.97,
                }),
            })
            .await;

        assert!(matches!(result, Err(PipelineError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn malformed_custom_target_is_rejected() {
        let scout = pipeline();
        let result = scout
            .analyze_comparables(&TargetSpec::Custom {
                county: County::CookCounty,
                attributes: json!({ "zoning": "M1" }),
            })
            .await;

        assert!(matches!(result, Err(PipelineError::MalformedTarget(_))));
    }

    #[tokio::test]
    async fn refresh_bumps_the_version() {
        let scout = pipeline();
        scout.list_properties(None, None).await.unwrap();
        assert_eq!(scout.stats().await.unwrap().version, 1);

        scout.refresh().await.unwrap();
        assert_eq!(scout.stats().await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn expired_ttl_triggers_reingest() {
        let mut config = fast_config();
        config.snapshot_ttl = Duration::ZERO;
        let scout = CompScout::new(config).unwrap();

        scout.list_properties(None, None).await.unwrap();
        let first = scout.stats().await.unwrap().version;
        let second = scout.stats().await.unwrap().version;
        assert!(second > first);
    }

    #[tokio::test]
    async fn partial_source_failure_still_analyzes() {
        let mut sources: Vec<Arc<dyn PropertySource>> = registry::all_sources()
            .iter()
            .map(build_source)
            .collect();
        sources.push(Arc::new(DownSource));

        let scout = CompScout::with_sources(fast_config(), sources).unwrap();
        let outcome = scout
            .analyze_comparables(&TargetSpec::Id("CK-08-22-401-013".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome.summary.total_comparables_found, 14);

        let stats = scout.stats().await.unwrap();
        assert_eq!(stats.sources.len(), 4);
        assert_eq!(
            stats
                .sources
                .iter()
                .filter(|s| !s.succeeded())
                .map(|s| s.source_id.as_str())
                .collect::<Vec<_>>(),
            ["down_source"]
        );
    }

    #[tokio::test]
    async fn stats_aggregate_the_pool() {
        let scout = pipeline();
        let stats = scout.stats().await.unwrap();

        assert_eq!(stats.total_properties, 15);
        assert_eq!(stats.by_county.len(), 3);
        assert_eq!(stats.by_county["Cook County"], 5);
        assert!(stats.avg_building_area > 0.0);
        assert!(stats.avg_assessed_value > 0.0);
        assert_eq!(stats.by_zoning.values().sum::<usize>(), 15);
    }

    #[test]
    fn counties_cover_all_supported_jurisdictions() {
        let counties = CompScout::counties();
        assert_eq!(counties.len(), 3);
        assert!(counties.iter().any(|c| c.state == "IL"));
        assert!(counties.iter().any(|c| c.state == "TX"));
        assert!(counties.iter().any(|c| c.state == "CA"));
    }

    #[test]
    fn zoning_codes_reflect_the_allow_list() {
        let scout = pipeline();
        let codes = scout.zoning_codes();
        assert_eq!(codes.len(), 9);
        assert!(codes
            .iter()
            .any(|z| z.code == "M1" && z.category == ZoningCategory::LightIndustrial));
    }

    #[test]
    fn source_filter_selects_by_id() {
        let filtered = enabled_sources(Some("cook_county, dallas_county".to_string()));
        let ids: Vec<&str> = filtered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["cook_county", "dallas_county"]);

        assert!(enabled_sources(Some("harris_county".to_string())).is_empty());
    }
}
