//! HTTP client for the Kubernetes event query API

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{QueryResult, QueryService, Row};
use crate::clock::{Clock, SystemClock};

/// Per-request transport timeout
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Window used when a caller omits `start`
pub const DEFAULT_LOOKBACK_HOURS: i64 = 12;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Option<Vec<Row>>,
    #[serde(default)]
    duration_ms: Option<i64>,
}

/// Fill in a missing window: `end` defaults to now, `start` to `end` minus
/// [`DEFAULT_LOOKBACK_HOURS`]
pub fn resolve_time_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = end.unwrap_or(now);
    let start = start.unwrap_or(end - chrono::Duration::hours(DEFAULT_LOOKBACK_HOURS));
    (start, end)
}

/// Client for the `/query` endpoint
pub struct EventQueryClient {
    http_client: reqwest::Client,
    url: String,
    clock: Arc<dyn Clock>,
}

impl EventQueryClient {
    /// Create a client posting to `url` with a fixed request timeout
    pub fn new(url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url: url.to_string(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for window defaulting
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Map a 2xx body to rows; anything that is not the expected object is malformed
fn parse_response(raw: &str) -> QueryResult {
    match serde_json::from_str::<QueryResponse>(raw) {
        Ok(body) => {
            if let Some(ms) = body.duration_ms {
                tracing::debug!("Query service reported {}ms", ms);
            }
            QueryResult::Rows(body.results.unwrap_or_default())
        }
        Err(e) => QueryResult::Failed(format!(
            "Query service returned a malformed response: {}",
            e
        )),
    }
}

#[async_trait]
impl QueryService for EventQueryClient {
    async fn run(
        &self,
        sql: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> QueryResult {
        if start.is_none() || end.is_none() {
            tracing::warn!("Query submitted without a full time range, applying defaults");
        }
        let (start, end) = resolve_time_range(start, end, self.clock.now());

        let request = QueryRequest {
            query: sql,
            start: timestamp(start),
            end: timestamp(end),
        };
        tracing::info!("Executing query over {} .. {}", request.start, request.end);
        tracing::debug!("SQL: {}", sql);

        let started = Instant::now();
        let response = match self.http_client.post(&self.url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Query transport error: {}", e);
                return QueryResult::Failed(format!("Query service request failed: {}", e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let result = match response.text().await {
                Ok(body) if !body.trim().is_empty() => QueryResult::Failed(body.trim().to_string()),
                Ok(_) => QueryResult::Failed(format!("Query service returned HTTP {}", status)),
                Err(e) => {
                    QueryResult::Failed(format!("Query service returned HTTP {}: {}", status, e))
                }
            };
            tracing::warn!("Query rejected with HTTP {}", status);
            return result;
        }

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) => {
                return QueryResult::Failed(format!(
                    "Failed to read query service response: {}",
                    e
                ))
            }
        };

        let result = parse_response(&raw);
        tracing::info!(
            "Query finished in {}ms ({} rows{})",
            started.elapsed().as_millis(),
            result.row_count(),
            if result.is_error() { ", malformed" } else { "" }
        );
        result
    }
}
