//! Live adapter: dispatches a source config onto the matching fetcher.

use async_trait::async_trait;
use comp_scout_property_models::County;
use tokio::sync::Mutex;

use crate::arcgis::{fetch_arcgis, ArcGisFetch};
use crate::config::{FetcherConfig, SchemaMap, SourceConfig};
use crate::rate::RateWindow;
use crate::socrata::{fetch_socrata, SocrataFetch};
use crate::{FetchOptions, PropertySource, RawRecord, SourceError};

/// A source backed by real HTTP fetches against the configured endpoint.
pub struct LiveSource {
    config: SourceConfig,
    limiter: Mutex<RateWindow>,
}

impl LiveSource {
    /// Creates a live adapter with a fresh rate budget.
    #[must_use]
    pub fn new(config: SourceConfig) -> Self {
        let limiter = Mutex::new(RateWindow::new(config.rate_limit));
        Self { config, limiter }
    }
}

#[async_trait]
impl PropertySource for LiveSource {
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
        let token = self.config.credentials.as_ref().map(|c| c.app_token.as_str());

        match &self.config.fetcher {
            FetcherConfig::Socrata {
                api_url,
                order_column,
                page_size,
            } => {
                fetch_socrata(
                    &SocrataFetch {
                        api_url,
                        order_column,
                        page_size: *page_size,
                        app_token: token,
                        label: &self.config.name,
                    },
                    options,
                    &self.limiter,
                )
                .await
            }
            FetcherConfig::Arcgis {
                query_url,
                page_size,
                where_clause,
            } => {
                fetch_arcgis(
                    &ArcGisFetch {
                        query_url,
                        page_size: *page_size,
                        where_clause: where_clause.as_deref(),
                        token,
                        label: &self.config.name,
                    },
                    options,
                    &self.limiter,
                )
                .await
            }
        }
    }
}
