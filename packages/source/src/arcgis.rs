//! Shared `ArcGIS` REST API fetcher.
//!
//! Handles paginated fetching from an `ArcGIS` `FeatureServer` or
//! `MapServer` layer. Used by the Dallas County appraisal district source.

use tokio::sync::Mutex;

use crate::rate::RateWindow;
use crate::{FetchOptions, RawRecord, SourceError};

/// Configuration for an `ArcGIS` fetch operation.
pub struct ArcGisFetch<'a> {
    /// Layer query URL (ending in `/query`).
    pub query_url: &'a str,
    /// Max records per request (`resultRecordCount`).
    pub page_size: u64,
    /// Optional `where` clause; defaults to `"1=1"`.
    pub where_clause: Option<&'a str>,
    /// Optional token, attached as the `token` query parameter.
    pub token: Option<&'a str>,
    /// Label for log messages.
    pub label: &'a str,
}

/// Fetches all features from an `ArcGIS` layer, draining pagination before
/// returning.
///
/// Each feature's attributes are flattened into one raw record, with the
/// geometry's x/y merged as `_geometry_x`/`_geometry_y` so schema maps can
/// reference coordinates even when the layer has no lat/lng attribute
/// columns.
///
/// # Errors
///
/// Returns [`SourceError`] if a request fails or the layer reports an
/// error body (`ArcGIS` signals many failures inside an HTTP 200).
pub async fn fetch_arcgis(
    config: &ArcGisFetch<'_>,
    options: &FetchOptions,
    limiter: &Mutex<RateWindow>,
) -> Result<Vec<RawRecord>, SourceError> {
    let client = reqwest::Client::new();
    let mut all_features: Vec<RawRecord> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = options.limit.unwrap_or(u64::MAX);
    let where_clause = config.where_clause.unwrap_or("1=1");

    loop {
        let fetched = all_features.len() as u64;
        let remaining = fetch_limit.saturating_sub(fetched);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(config.page_size);

        let mut url = format!(
            "{}?where={where_clause}&outFields=*&f=json&outSR=4326&resultRecordCount={page_limit}&resultOffset={offset}",
            config.query_url
        );
        if let Some(token) = config.token {
            url.push_str(&format!("&token={token}"));
        }

        log::info!("{}: offset={offset}, limit={page_limit}", config.label);
        let body = crate::http::get_json(&client, &url, None, limiter).await?;

        // ArcGIS reports most failures inside an HTTP 200 body.
        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(serde_json::Value::as_i64);
            let message = error
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error");
            if code == Some(498) || code == Some(499) {
                return Err(SourceError::Auth {
                    reason: format!("ArcGIS error {code:?}: {message}"),
                });
            }
            return Err(SourceError::Unavailable {
                reason: format!("ArcGIS error {code:?}: {message}"),
            });
        }

        let features = body
            .get("features")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();

        let count = features.len() as u64;
        if count == 0 {
            break;
        }

        for feature in &features {
            if let Some(attrs) = feature.get("attributes").cloned() {
                let mut record = attrs;
                if let (Some(geom), Some(obj)) = (feature.get("geometry"), record.as_object_mut()) {
                    if let Some(x) = geom.get("x") {
                        obj.insert("_geometry_x".to_string(), x.clone());
                    }
                    if let Some(y) = geom.get("y") {
                        obj.insert("_geometry_y".to_string(), y.clone());
                    }
                }
                all_features.push(record);
            }
        }

        offset += count;

        // `exceededTransferLimit: true` is the canonical more-pages signal;
        // `count < page_limit` is unreliable because the server silently
        // caps results at its own maxRecordCount.
        let exceeded = body
            .get("exceededTransferLimit")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !exceeded {
            break;
        }
    }

    log::info!(
        "{}: download complete — {} records",
        config.label,
        all_features.len(),
    );
    Ok(all_features)
}
