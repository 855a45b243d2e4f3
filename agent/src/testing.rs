//! Scripted fakes for the oracle and the query service

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::llm::{Message, Oracle, OracleError};
use crate::query::{QueryResult, QueryService};

/// Oracle that replays canned replies and records every request
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedOracle {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every message sequence received, in call order
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, messages: &[Message]) -> Result<String, OracleError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| OracleError::Status {
                status: 503,
                body: "no scripted reply left".into(),
            })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// A query as the fake service received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Query service returning queued results, then empty row sets
#[derive(Default)]
pub struct ScriptedQueryService {
    results: Mutex<VecDeque<QueryResult>>,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl ScriptedQueryService {
    pub fn new(results: impl IntoIterator<Item = QueryResult>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryService for ScriptedQueryService {
    async fn run(
        &self,
        sql: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> QueryResult {
        self.calls.lock().unwrap().push(RecordedQuery {
            sql: sql.to_string(),
            start,
            end,
        });
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| QueryResult::Rows(Vec::new()))
    }
}
