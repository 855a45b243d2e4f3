//! Event query service access
//!
//! A query is SQL over the `$events` table plus a time window. The service
//! answers with rows or an error string; the loop never retries, it hands the
//! outcome back to the oracle as an observation.

mod client;
mod summary;

pub use client::{resolve_time_range, EventQueryClient, DEFAULT_LOOKBACK_HOURS, DEFAULT_QUERY_TIMEOUT_SECS};
pub use summary::{summarize, EMPTY_RESULT_SUMMARY};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One result row: column name to scalar value, in the order the service sent them
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of a single query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Ordered rows; the first row defines the column set
    Rows(Vec<Row>),
    /// Error description; no rows are trusted
    Failed(String),
}

impl QueryResult {
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Failed(_))
    }

    pub fn row_count(&self) -> usize {
        match self {
            QueryResult::Rows(rows) => rows.len(),
            QueryResult::Failed(_) => 0,
        }
    }
}

/// Anything that can execute event queries
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Run `sql` over `[start, end]`; missing bounds are defaulted by the implementation
    async fn run(
        &self,
        sql: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> QueryResult;
}
