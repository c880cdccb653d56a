#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property data source adapters and normalization logic.
//!
//! Each county data provider is exposed through the [`PropertySource`]
//! trait. A source is either live (Socrata or `ArcGIS` REST, configured via
//! the embedded TOML registry) or a deterministic mock returning canned
//! payloads in the provider's native shape. Both satisfy the same contract,
//! so callers never branch on the mode.

pub mod arcgis;
pub mod config;
pub mod mock;
pub mod normalize;
pub mod parsing;
pub mod rate;
pub mod registry;
pub mod socrata;

mod http;
mod live;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use comp_scout_property_models::County;

pub use config::{AreaUnit, Credentials, FetcherConfig, RateLimit, SchemaMap, SourceConfig};
pub use live::LiveSource;
pub use mock::MockSource;
pub use normalize::SchemaError;

/// A raw, source-shaped record as returned by an adapter.
///
/// Exists only between fetch and normalization; nothing downstream of the
/// normalizer ever sees one.
pub type RawRecord = serde_json::Value;

/// Errors a source adapter can surface to the orchestrator.
///
/// [`Unavailable`](Self::Unavailable) and [`RateLimited`](Self::RateLimited)
/// are transient and retried with backoff; [`Auth`](Self::Auth) is
/// non-transient and fails the source immediately.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached or returned a server-side failure.
    #[error("source unavailable: {reason}")]
    Unavailable {
        /// Description of what went wrong.
        reason: String,
    },

    /// The source rejected the request for exceeding its rate limit.
    #[error("rate limited by source (retry after {retry_after:?})")]
    RateLimited {
        /// Server-suggested delay before retrying, when the response
        /// carried one.
        retry_after: Option<Duration>,
    },

    /// The source rejected the adapter's credentials.
    #[error("authentication rejected: {reason}")]
    Auth {
        /// Description of the rejection.
        reason: String,
    },
}

impl SourceError {
    /// Returns `true` if retrying this error with backoff can help.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::RateLimited { .. })
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable {
            reason: e.to_string(),
        }
    }
}

/// Configuration for a single fetch operation.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Maximum number of raw records to fetch (for testing and capped runs).
    pub limit: Option<u64>,
}

/// Trait that all property data sources implement.
///
/// Pagination is fully drained inside `fetch` — callers only ever see a
/// complete result set or a failure.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Returns the unique identifier for this source (e.g., `"cook_county"`).
    fn id(&self) -> &str;

    /// Returns the county this source covers.
    fn county(&self) -> County;

    /// Returns the schema map used to normalize this source's raw records.
    fn schema(&self) -> &SchemaMap;

    /// Fetches all raw records from the source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source is unreachable, rate limits
    /// the request, or rejects the configured credentials.
    async fn fetch(&self, options: &FetchOptions) -> Result<Vec<RawRecord>, SourceError>;
}

/// Builds the adapter for a source config, selecting the mock or live
/// implementation from the configured mode.
#[must_use]
pub fn build_source(config: &SourceConfig) -> Arc<dyn PropertySource> {
    match config.mode {
        config::SourceMode::Mock => Arc::new(MockSource::new(config.clone())),
        config::SourceMode::Live => Arc::new(LiveSource::new(config.clone())),
    }
}
