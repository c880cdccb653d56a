//! Shared Socrata SODA API fetcher.
//!
//! Handles paginated fetching from any Socrata dataset using the `$limit`,
//! `$offset`, and `$order` query parameters. Used by the Cook County and
//! Los Angeles County assessor sources.

use tokio::sync::Mutex;

use crate::rate::RateWindow;
use crate::{FetchOptions, RawRecord, SourceError};

/// Configuration for a Socrata fetch operation.
pub struct SocrataFetch<'a> {
    /// Dataset resource URL (e.g., `".../resource/tx8h-7rnu.json"`).
    pub api_url: &'a str,
    /// Column used for deterministic `$order` pagination.
    pub order_column: &'a str,
    /// Page size for pagination.
    pub page_size: u64,
    /// Optional app token, sent as the `X-App-Token` header.
    pub app_token: Option<&'a str>,
    /// Label for log messages (e.g., `"Cook County Assessor"`).
    pub label: &'a str,
}

/// Fetches all records from a Socrata dataset, draining pagination before
/// returning.
///
/// # Errors
///
/// Returns [`SourceError`] if a request fails, the source rate limits or
/// rejects credentials, or a response body is not the expected JSON array.
pub async fn fetch_socrata(
    config: &SocrataFetch<'_>,
    options: &FetchOptions,
    limiter: &Mutex<RateWindow>,
) -> Result<Vec<RawRecord>, SourceError> {
    let client = reqwest::Client::new();
    let mut all_records: Vec<RawRecord> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = options.limit.unwrap_or(u64::MAX);

    loop {
        let remaining = fetch_limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(config.page_size);

        let url = format!(
            "{}?$limit={}&$offset={}&$order={}",
            config.api_url, page_limit, offset, config.order_column
        );

        log::info!(
            "Fetching {} data: offset={offset}, limit={page_limit}",
            config.label
        );
        let body = crate::http::get_json(&client, &url, config.app_token, limiter).await?;

        let records = match body {
            serde_json::Value::Array(records) => records,
            other => {
                return Err(SourceError::Unavailable {
                    reason: format!(
                        "expected a JSON array of records, got {}",
                        type_name(&other)
                    ),
                });
            }
        };

        let count = records.len() as u64;
        if count == 0 {
            break;
        }

        all_records.extend(records);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    log::info!(
        "Downloaded {} {} records total",
        all_records.len(),
        config.label
    );
    Ok(all_records)
}

const fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
