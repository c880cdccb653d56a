#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-source ingestion orchestrator.
//!
//! Fans out over the configured property sources concurrently, retries
//! transient failures with exponential backoff, normalizes each source's raw
//! payloads into canonical records, and filters out ineligible parcels. One
//! failing source never sinks a run: the outcome carries whatever the
//! healthy sources produced plus a per-source status report.

pub mod backoff;

use std::sync::Arc;
use std::time::Duration;

use comp_scout_property_models::eligibility::{DropReason, EligibilityRules};
use comp_scout_property_models::{County, PropertyRecord};
use comp_scout_source::{normalize, FetchOptions, PropertySource};
use serde::Serialize;
use tokio::task::JoinSet;

pub use backoff::{RetryPolicy, RetryState};

/// Default wall-clock allowance for a single fetch attempt, used when
/// computing the per-source deadline.
pub const DEFAULT_FETCH_ALLOWANCE: Duration = Duration::from_secs(120);

/// Errors that fail an entire ingestion run.
///
/// Individual source failures are reported through [`SourceStatus`] instead;
/// a run only errors when nothing was ingested at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IngestError {
    /// Every configured source failed.
    #[error("all {} sources failed; no records ingested", .statuses.len())]
    NoData {
        /// The per-source failure reports.
        statuses: Vec<SourceStatus>,
    },
}

/// Configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Fetch options passed to every source.
    pub fetch: FetchOptions,
    /// Retry budget applied per source.
    pub retry: RetryPolicy,
    /// Wall-clock allowance per fetch attempt; combined with the retry
    /// policy's backoff delays to form the per-source deadline.
    pub fetch_allowance: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            retry: RetryPolicy::default(),
            fetch_allowance: DEFAULT_FETCH_ALLOWANCE,
        }
    }
}

/// Counts of normalized records dropped by the eligibility filter, keyed by
/// drop reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTally {
    /// Zoning code outside the industrial allow-list.
    pub zoning_not_allowed: usize,
    /// Building area zero, negative, or non-finite.
    pub non_positive_building_area: usize,
    /// Lot size zero, negative, or non-finite.
    pub non_positive_lot_size: usize,
    /// Coordinates outside valid global ranges.
    pub coordinate_out_of_range: usize,
    /// Year built outside the plausible range.
    pub year_built_out_of_range: usize,
}

impl DropTally {
    /// Bumps the counter for one drop reason.
    pub const fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::ZoningNotAllowed => self.zoning_not_allowed += 1,
            DropReason::NonPositiveBuildingArea => self.non_positive_building_area += 1,
            DropReason::NonPositiveLotSize => self.non_positive_lot_size += 1,
            DropReason::CoordinateOutOfRange => self.coordinate_out_of_range += 1,
            DropReason::YearBuiltOutOfRange => self.year_built_out_of_range += 1,
        }
    }

    /// Total records dropped across all reasons.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.zoning_not_allowed
            + self.non_positive_building_area
            + self.non_positive_lot_size
            + self.coordinate_out_of_range
            + self.year_built_out_of_range
    }
}

/// How one source's fetch resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// The source returned data; counts describe the normalize/filter
    /// funnel.
    Succeeded {
        /// Raw records fetched.
        fetched: usize,
        /// Records the normalizer rejected for schema problems.
        schema_dropped: usize,
        /// Records the eligibility filter rejected, by reason.
        filtered: DropTally,
        /// Records kept in the canonical pool.
        kept: usize,
    },
    /// The source gave up after exhausting its retry budget, hitting a
    /// non-transient error, or blowing its deadline.
    Failed {
        /// Description of the final error.
        reason: String,
    },
}

/// Per-source report for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    /// Source identifier (e.g., `"cook_county"`).
    pub source_id: String,
    /// County the source covers.
    pub county: County,
    /// Fetch attempts made, including the first.
    pub attempts: u32,
    /// How the source resolved.
    pub outcome: SourceOutcome,
}

impl SourceStatus {
    /// Returns `true` if the source delivered data.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Succeeded { .. })
    }
}

/// Result of an ingestion run: the merged eligible pool plus per-source
/// statuses, in configuration order.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Canonical, filtered records from all succeeding sources, ordered by
    /// source configuration order.
    pub records: Vec<PropertyRecord>,
    /// One status per configured source, in configuration order.
    pub statuses: Vec<SourceStatus>,
}

impl IngestOutcome {
    /// Number of sources that delivered data.
    #[must_use]
    pub fn sources_succeeded(&self) -> usize {
        self.statuses.iter().filter(|s| s.succeeded()).count()
    }

    /// Number of sources that failed.
    #[must_use]
    pub fn sources_failed(&self) -> usize {
        self.statuses.len() - self.sources_succeeded()
    }
}

struct SourceReport {
    status: SourceStatus,
    records: Vec<PropertyRecord>,
}

/// Runs a full ingestion pass over `sources`.
///
/// Sources are fetched concurrently, each under its own retry budget and
/// deadline. Partial failure is a success: as long as one source delivers,
/// the outcome is `Ok` and the failures show up in the statuses.
///
/// # Errors
///
/// Returns [`IngestError::NoData`] only when every source failed. An empty
/// pool from healthy sources is a valid outcome, not an error.
pub async fn run_ingest(
    sources: &[Arc<dyn PropertySource>],
    rules: &EligibilityRules,
    config: &IngestConfig,
) -> Result<IngestOutcome, IngestError> {
    let deadline = config.retry.deadline(config.fetch_allowance);
    log::info!(
        "Starting ingestion across {} sources (deadline {deadline:?} per source)",
        sources.len()
    );

    let mut tasks = JoinSet::new();
    for (index, source) in sources.iter().enumerate() {
        let source = Arc::clone(source);
        let rules = rules.clone();
        let config = config.clone();
        tasks.spawn(async move {
            let report =
                match tokio::time::timeout(deadline, sync_source(&*source, &rules, &config)).await
                {
                    Ok(report) => report,
                    Err(_) => {
                        log::error!("{}: deadline of {deadline:?} exceeded", source.id());
                        failed_report(&*source, 0, format!("deadline of {deadline:?} exceeded"))
                    }
                };
            (index, report)
        });
    }

    let mut slots: Vec<Option<SourceReport>> = (0..sources.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, report)) => slots[index] = Some(report),
            Err(e) => log::error!("ingestion task aborted: {e}"),
        }
    }

    let mut records = Vec::new();
    let mut statuses = Vec::with_capacity(sources.len());
    for (slot, source) in slots.into_iter().zip(sources) {
        let report =
            slot.unwrap_or_else(|| failed_report(&**source, 0, "task aborted".to_string()));
        records.extend(report.records);
        statuses.push(report.status);
    }

    let failed = statuses.iter().filter(|s| !s.succeeded()).count();
    if failed == statuses.len() {
        return Err(IngestError::NoData { statuses });
    }

    log::info!(
        "Ingestion complete: {} records from {}/{} sources",
        records.len(),
        statuses.len() - failed,
        statuses.len()
    );
    Ok(IngestOutcome { records, statuses })
}

/// Fetches one source to completion under its retry policy, then runs the
/// normalize/filter funnel over whatever it returned.
async fn sync_source(
    source: &dyn PropertySource,
    rules: &EligibilityRules,
    config: &IngestConfig,
) -> SourceReport {
    let mut state = RetryState::Pending;

    loop {
        let attempt = state.current_attempt();
        log::debug!("{}: fetch attempt {attempt}", source.id());

        match source.fetch(&config.fetch).await {
            Ok(raw) => return process_records(source, rules, raw, attempt),
            Err(error) => {
                state = state.after_failure(&config.retry, &error);
                match &state {
                    RetryState::Retrying {
                        attempt: next,
                        delay,
                    } => {
                        log::warn!(
                            "{}: attempt {attempt} failed ({error}); attempt {next} in {delay:?}",
                            source.id()
                        );
                        tokio::time::sleep(*delay).await;
                    }
                    RetryState::Failed { reason } => {
                        log::error!(
                            "{}: giving up after {attempt} attempts: {reason}",
                            source.id()
                        );
                        return failed_report(source, attempt, reason.clone());
                    }
                    RetryState::Pending | RetryState::Succeeded => {
                        unreachable!("after_failure never yields a non-failure state")
                    }
                }
            }
        }
    }
}

fn process_records(
    source: &dyn PropertySource,
    rules: &EligibilityRules,
    raw: Vec<comp_scout_source::RawRecord>,
    attempts: u32,
) -> SourceReport {
    let fetched = raw.len();
    let mut schema_dropped = 0;
    let mut filtered = DropTally::default();
    let mut records = Vec::with_capacity(fetched);

    for value in raw {
        let record = match normalize::normalize(&value, source.schema(), source.county()) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("{}: dropping record: {e}", source.id());
                schema_dropped += 1;
                continue;
            }
        };
        match rules.check(&record) {
            Ok(()) => records.push(record),
            Err(reason) => {
                log::debug!(
                    "{}: filtering out {} ({reason})",
                    source.id(),
                    record.property_id
                );
                filtered.record(reason);
            }
        }
    }

    log::info!(
        "{}: fetched {fetched}, dropped {schema_dropped} malformed, filtered {}, kept {}",
        source.id(),
        filtered.total(),
        records.len()
    );

    SourceReport {
        status: SourceStatus {
            source_id: source.id().to_string(),
            county: source.county(),
            attempts,
            outcome: SourceOutcome::Succeeded {
                fetched,
                schema_dropped,
                filtered,
                kept: records.len(),
            },
        },
        records,
    }
}

fn failed_report(source: &dyn PropertySource, attempts: u32, reason: String) -> SourceReport {
    SourceReport {
        status: SourceStatus {
            source_id: source.id().to_string(),
            county: source.county(),
            attempts,
            outcome: SourceOutcome::Failed { reason },
        },
        records: Vec::new(),
    }
}
