//! Shared HTTP plumbing for live fetchers: rate pacing, status
//! classification into the [`SourceError`] taxonomy, and JSON decoding.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::rate::RateWindow;
use crate::SourceError;

/// Issues a paced GET and decodes the JSON body.
///
/// Waits out the client-side rate budget before sending. A Socrata-style
/// app token, when present, is attached as the `X-App-Token` header
/// (`ArcGIS` tokens ride in the query string instead).
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
    app_token: Option<&str>,
    limiter: &Mutex<RateWindow>,
) -> Result<serde_json::Value, SourceError> {
    loop {
        let delay = {
            let mut window = limiter.lock().await;
            match window.next_delay(Instant::now()) {
                None => {
                    window.record(Instant::now());
                    break;
                }
                Some(delay) => delay,
            }
        };
        log::debug!("rate budget exhausted, pacing for {delay:?}");
        tokio::time::sleep(delay).await;
    }

    let mut request = client.get(url);
    if let Some(token) = app_token {
        request = request.header("X-App-Token", token);
    }

    let response = request.send().await?;
    classify_status(&response)?;
    Ok(response.json().await?)
}

/// Maps HTTP status codes onto the source error taxonomy.
///
/// 401/403 are authentication failures (non-transient), 429 is a rate
/// limit carrying the server's `Retry-After` hint when present, and
/// everything else non-successful is treated as the source being
/// unavailable.
fn classify_status(response: &reqwest::Response) -> Result<(), SourceError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(SourceError::Auth {
            reason: format!("HTTP {status}"),
        });
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(SourceError::RateLimited { retry_after });
    }

    if !status.is_success() {
        return Err(SourceError::Unavailable {
            reason: format!("HTTP {status}"),
        });
    }

    Ok(())
}
