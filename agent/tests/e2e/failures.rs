//! E2E test: query-service errors become observations, never retries;
//! oracle replies that are not a plan end the investigation cleanly

use std::sync::Arc;
use std::time::Duration;

use kube_event_agent::investigation::{Investigator, Outcome, UNPARSEABLE_ANALYSIS};
use kube_event_agent::llm::OpenAiClient;
use kube_event_agent::query::EventQueryClient;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn test_http_error_body_reaches_the_oracle() {
    let oracle_server = MockServer::start().await;
    let query_server = MockServer::start().await;

    let bad_query = r#"{"hypothesis":"h","query":{"sql":"SELECT nope FROM $events","start":"2025-08-03T00:00:00Z","end":"2025-08-03T06:00:00Z"}}"#;
    let conclusion = r#"{"final_analysis":"The event store rejected the query; no conclusion could be drawn."}"#;

    Mock::given(method("POST"))
        .and(body_string_contains("Query failed with error: server: failed to execute query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(conclusion)))
        .expect(1)
        .mount(&oracle_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(bad_query)))
        .up_to_n_times(1)
        .mount(&oracle_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("server: failed to execute query: column \"nope\" not found"),
        )
        .expect(1)
        .mount(&query_server)
        .await;

    let oracle = OpenAiClient::new(&oracle_server.uri(), "k", "gpt-4.1");
    let queries = EventQueryClient::new(
        &format!("{}/query", query_server.uri()),
        Duration::from_secs(5),
    )
    .expect("client builds");

    let report = Investigator::new(Arc::new(oracle), Arc::new(queries))
        .investigate("why are dashboards empty")
        .await;

    assert!(matches!(report.outcome, Outcome::Concluded(_)));
    assert_eq!(report.queries_executed, 1);
}

#[tokio::test]
async fn test_unreachable_oracle_does_not_panic() {
    let queries = EventQueryClient::new("http://127.0.0.1:1/query", Duration::from_secs(1))
        .expect("client builds");
    let oracle = OpenAiClient::new("http://127.0.0.1:1/v1", "k", "gpt-4.1");

    let report = Investigator::new(Arc::new(oracle), Arc::new(queries))
        .investigate("anything")
        .await;

    assert!(matches!(report.outcome, Outcome::Failed(_)));
    assert_eq!(report.queries_executed, 0);
}

#[tokio::test]
async fn test_empty_oracle_reply_is_unparseable() {
    let oracle_server = MockServer::start().await;
    let query_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("")))
        .expect(1)
        .mount(&oracle_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .expect(0)
        .mount(&query_server)
        .await;

    let oracle = OpenAiClient::new(&oracle_server.uri(), "k", "gpt-4.1");
    let queries = EventQueryClient::new(
        &format!("{}/query", query_server.uri()),
        Duration::from_secs(5),
    )
    .expect("client builds");

    let report = Investigator::new(Arc::new(oracle), Arc::new(queries))
        .investigate("x")
        .await;

    assert_eq!(report.outcome, Outcome::Concluded(UNPARSEABLE_ANALYSIS.to_string()));
    assert_eq!(report.turns, 1);
    assert_eq!(report.queries_executed, 0);
}
