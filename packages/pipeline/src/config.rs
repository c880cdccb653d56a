//! Pipeline configuration and startup validation.

use std::time::Duration;

use comp_scout_analysis::{FactorWeights, WeightsError};
use comp_scout_ingest::IngestConfig;
use comp_scout_property_models::zoning;
use comp_scout_source::config::SourceMode;
use comp_scout_source::{registry, SourceConfig};

/// How long a snapshot stays fresh before the next read re-ingests.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(15 * 60);

/// Default cap on the number of ranked comparables returned per analysis.
pub const DEFAULT_RESULT_CAP: usize = 10;

/// A configuration the pipeline refuses to start with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The factor weights are unusable.
    #[error(transparent)]
    Weights(#[from] WeightsError),

    /// An allow-list code has no known industrial category, so it could
    /// never contribute a zoning relatedness score.
    #[error("allow-list zoning code `{code}` is not a known industrial code")]
    UnknownZoningCode {
        /// The unrecognized code.
        code: String,
    },

    /// No sources are configured; there would be nothing to ingest.
    #[error("at least one source must be configured")]
    NoSources,
}

/// Everything the pipeline needs at startup.
///
/// Defaults come from the embedded source registry and the fixed factor
/// weight table; deployments override individual fields before handing the
/// config to [`CompScout::new`](crate::CompScout::new).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The county sources to ingest from.
    pub sources: Vec<SourceConfig>,
    /// Fetch, retry, and deadline settings for ingestion runs.
    pub ingest: IngestConfig,
    /// Weights combining the five factor scores.
    pub weights: FactorWeights,
    /// Zoning codes admitted to the candidate pool.
    pub allowed_zoning: Vec<String>,
    /// Cap on ranked comparables returned per analysis; `None` returns the
    /// full ranked set.
    pub result_cap: Option<usize>,
    /// Snapshot time-to-live; reads after expiry trigger a re-ingest.
    pub snapshot_ttl: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: registry::all_sources(),
            ingest: IngestConfig::default(),
            weights: FactorWeights::default(),
            allowed_zoning: zoning::default_allow_list(),
            result_cap: Some(DEFAULT_RESULT_CAP),
            snapshot_ttl: DEFAULT_SNAPSHOT_TTL,
        }
    }
}

impl PipelineConfig {
    /// Validates the scoring surface: factor weights and the zoning
    /// allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a bad weight set or an allow-list code
    /// outside the known industrial taxonomy.
    pub fn validate_scoring(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        for code in &self.allowed_zoning {
            if zoning::category_for(code).is_none() {
                return Err(ConfigError::UnknownZoningCode { code: code.clone() });
            }
        }
        Ok(())
    }

    /// Validates the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a bad weight set, an unknown allow-list
    /// code, or an empty source list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_scoring()?;
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        Ok(())
    }

    /// Flips every configured source into mock mode.
    pub fn force_mock(&mut self) {
        for source in &mut self.sources {
            source.mode = SourceMode::Mock;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_weights() {
        let config = PipelineConfig {
            weights: FactorWeights {
                zoning: 0.9,
                ..FactorWeights::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Weights(_))));
    }

    #[test]
    fn rejects_unknown_allow_list_code() {
        let config = PipelineConfig {
            allowed_zoning: vec!["M1".to_string(), "C2".to_string()],
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownZoningCode {
                code: "C2".to_string(),
            })
        );
    }

    #[test]
    fn rejects_empty_source_list() {
        let config = PipelineConfig {
            sources: Vec::new(),
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoSources));
    }

    #[test]
    fn force_mock_flips_every_source() {
        let mut config = PipelineConfig::default();
        config.force_mock();
        assert!(config
            .sources
            .iter()
            .all(|s| s.mode == SourceMode::Mock));
    }
}
