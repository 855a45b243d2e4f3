//! E2E test: one investigation through the OpenAI client and the query client

use std::sync::Arc;
use std::time::Duration;

use kube_event_agent::investigation::{Investigator, Outcome};
use kube_event_agent::llm::OpenAiClient;
use kube_event_agent::query::EventQueryClient;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn test_cluster_unstable_over_http() {
    let oracle_server = MockServer::start().await;
    let query_server = MockServer::start().await;

    let turn1 = r#"{"thought":"Which warnings dominate?","hypothesis":"A single failure reason dominates.","query":{"sql":"SELECT reason, COUNT(*) AS count FROM $events WHERE type = 'Warning' GROUP BY reason ORDER BY count DESC LIMIT 5","start":"2025-08-02T18:00:00Z","end":"2025-08-03T06:00:00Z"}}"#;
    let turn2 = r#"{"thought":"Clear signal.","hypothesis":"Volumes fail to mount.","final_analysis":"FailedMount accounts for 50 warnings. Check the storage driver on the affected nodes."}"#;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Query returned 1 rows. Columns: reason, count."))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(turn2)))
        .expect(1)
        .mount(&oracle_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(turn1)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&oracle_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("\"start\":\"2025-08-02T18:00:00Z\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"reason": "FailedMount", "count": 50}],
            "duration_ms": 8,
            "files": [],
            "total_files_size_bytes": 0
        })))
        .expect(1)
        .mount(&query_server)
        .await;

    let oracle = OpenAiClient::new(&format!("{}/v1", oracle_server.uri()), "test-key", "gpt-4.1");
    let queries = EventQueryClient::new(
        &format!("{}/query", query_server.uri()),
        Duration::from_secs(5),
    )
    .expect("client builds");

    let investigator = Investigator::new(Arc::new(oracle), Arc::new(queries));
    let report = investigator.investigate("cluster unstable").await;

    assert_eq!(
        report.outcome,
        Outcome::Concluded(
            "FailedMount accounts for 50 warnings. Check the storage driver on the affected nodes."
                .to_string()
        )
    );
    assert_eq!(report.turns, 2);
    assert_eq!(report.queries_executed, 1);
    assert_eq!(report.hypothesis, "Volumes fail to mount.");
}
