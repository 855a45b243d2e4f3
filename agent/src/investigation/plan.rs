//! The oracle's per-turn decision and its strict decoder
//!
//! Wire shape (one JSON object):
//!
//! ```json
//! {"thought": "...", "hypothesis": "...",
//!  "query": {"sql": "...", "start": "2025-08-03T05:00:00Z", "end": "2025-08-03T06:00:00Z"}}
//! ```
//!
//! or the same with `final_analysis` instead of `query`. Exactly one of the
//! two must be present.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// A query the oracle wants executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub sql: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One decoded oracle decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Keep investigating with another query
    Continue {
        thought: String,
        hypothesis: Option<String>,
        query: QuerySpec,
    },
    /// Stop and report
    Conclude {
        thought: String,
        hypothesis: Option<String>,
        final_analysis: String,
    },
}

impl Plan {
    pub fn thought(&self) -> &str {
        match self {
            Plan::Continue { thought, .. } | Plan::Conclude { thought, .. } => thought,
        }
    }

    pub fn hypothesis(&self) -> Option<&str> {
        match self {
            Plan::Continue { hypothesis, .. } | Plan::Conclude { hypothesis, .. } => {
                hypothesis.as_deref()
            }
        }
    }
}

/// A reply that parsed as an object but is not a usable plan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanDefect {
    #[error("the response matched neither plan shape: {0}")]
    Schema(String),

    #[error("the response contained neither `query` nor `final_analysis`")]
    NoAction,

    #[error("the response contained both `query` and `final_analysis`; exactly one is allowed")]
    BothActions,

    #[error("`query.{0}` is missing; both `start` and `end` are required")]
    MissingBound(&'static str),

    #[error("`query.{field}` is not an ISO-8601 timestamp: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("`query.start` ({start}) is after `query.end` ({end})")]
    InvertedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Why a reply could not become a [`Plan`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanFailure {
    /// Not a JSON object at all; ends the investigation
    #[error("unparseable response: {0}")]
    Unparseable(String),

    /// Fed back to the oracle so it can correct itself
    #[error("invalid plan: {0}")]
    Defect(#[from] PlanDefect),

    /// `query` present without usable `sql`; aborts the investigation
    #[error("query object is missing the required `sql` field")]
    MissingSql,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlan {
    #[serde(default)]
    thought: Option<String>,
    #[serde(default)]
    hypothesis: Option<String>,
    #[serde(default)]
    query: Option<RawQuery>,
    #[serde(default)]
    final_analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQuery {
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts RFC 3339 plus the shorter ISO-8601 forms models tend to emit:
/// minute precision (`2025-08-03T05:00Z`, `2025-08-03T05:00+02:00`) and a
/// bare date (midnight). A missing offset is read as UTC.
fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, PlanDefect> {
    let value = value.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Ok(t.with_timezone(&Utc));
    }

    let naive = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .unwrap_or(value);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|t| t.and_utc())
        .ok_or_else(|| PlanDefect::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn decode_query(raw: RawQuery) -> Result<QuerySpec, PlanFailure> {
    let sql = non_blank(raw.sql).ok_or(PlanFailure::MissingSql)?;
    let start = raw.start.ok_or(PlanDefect::MissingBound("start"))?;
    let end = raw.end.ok_or(PlanDefect::MissingBound("end"))?;
    let start = parse_timestamp("start", &start)?;
    let end = parse_timestamp("end", &end)?;
    if start > end {
        return Err(PlanDefect::InvertedRange { start, end }.into());
    }
    Ok(QuerySpec {
        sql: sql.trim().to_string(),
        start,
        end,
    })
}

/// Decode raw oracle text into a plan
pub fn decode_plan(text: &str) -> Result<Plan, PlanFailure> {
    let value: serde_json::Value = serde_json::from_str(text.trim())
        .map_err(|e| PlanFailure::Unparseable(e.to_string()))?;
    if !value.is_object() {
        return Err(PlanFailure::Unparseable(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let raw: RawPlan =
        serde_json::from_value(value).map_err(|e| PlanDefect::Schema(e.to_string()))?;

    let thought = raw.thought.unwrap_or_default();
    let hypothesis = non_blank(raw.hypothesis);

    match (raw.query, non_blank(raw.final_analysis)) {
        (Some(_), Some(_)) => Err(PlanDefect::BothActions.into()),
        (None, None) => Err(PlanDefect::NoAction.into()),
        (None, Some(final_analysis)) => Ok(Plan::Conclude {
            thought,
            hypothesis,
            final_analysis,
        }),
        (Some(query), None) => Ok(Plan::Continue {
            thought,
            hypothesis,
            query: decode_query(query)?,
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decodes_continue() {
        let plan = decode_plan(
            r#"{"thought":"start broad","hypothesis":"disk pressure",
                "query":{"sql":"SELECT reason, COUNT(*) AS count FROM $events GROUP BY reason",
                         "start":"2025-08-03T05:00:00Z","end":"2025-08-03T06:00:00+00:00"}}"#,
        )
        .unwrap();

        match plan {
            Plan::Continue {
                thought,
                hypothesis,
                query,
            } => {
                assert_eq!(thought, "start broad");
                assert_eq!(hypothesis.as_deref(), Some("disk pressure"));
                assert!(query.sql.starts_with("SELECT reason"));
                assert_eq!(query.start, Utc.with_ymd_and_hms(2025, 8, 3, 5, 0, 0).unwrap());
                assert_eq!(query.end, Utc.with_ymd_and_hms(2025, 8, 3, 6, 0, 0).unwrap());
            }
            other => panic!("Expected Continue, got {:?}", other),
        }
    }

    #[test]
    fn test_decodes_conclude() {
        let plan = decode_plan(r#"{"hypothesis":"h","final_analysis":"Node n1 ran out of disk."}"#)
            .unwrap();
        assert_eq!(
            plan,
            Plan::Conclude {
                thought: String::new(),
                hypothesis: Some("h".into()),
                final_analysis: "Node n1 ran out of disk.".into(),
            }
        );
    }

    #[test]
    fn test_null_fields_count_as_absent() {
        let plan = decode_plan(r#"{"query":null,"final_analysis":"done","hypothesis":""}"#).unwrap();
        assert!(matches!(plan, Plan::Conclude { .. }));
        assert_eq!(plan.hypothesis(), None);
    }

    #[test]
    fn test_neither_action_is_a_defect() {
        assert_eq!(
            decode_plan(r#"{"thought":"hmm","hypothesis":"x"}"#),
            Err(PlanFailure::Defect(PlanDefect::NoAction))
        );
        assert_eq!(
            decode_plan(r#"{"final_analysis":"   "}"#),
            Err(PlanFailure::Defect(PlanDefect::NoAction))
        );
    }

    #[test]
    fn test_both_actions_is_a_defect() {
        let err = decode_plan(
            r#"{"final_analysis":"done","query":{"sql":"SELECT 1","start":"2025-01-01T00:00:00Z","end":"2025-01-02T00:00:00Z"}}"#,
        )
        .unwrap_err();
        assert_eq!(err, PlanFailure::Defect(PlanDefect::BothActions));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = decode_plan(r#"{"final_analysis":"done","confidence":"high"}"#).unwrap_err();
        assert!(matches!(err, PlanFailure::Defect(PlanDefect::Schema(_))));
    }

    #[test]
    fn test_missing_sql_is_contract_violation() {
        let err = decode_plan(
            r#"{"query":{"start":"2025-01-01T00:00:00Z","end":"2025-01-02T00:00:00Z"}}"#,
        )
        .unwrap_err();
        assert_eq!(err, PlanFailure::MissingSql);

        let err = decode_plan(r#"{"query":{"sql":"  "}}"#).unwrap_err();
        assert_eq!(err, PlanFailure::MissingSql);
    }

    #[test]
    fn test_inverted_range_is_a_defect() {
        let err = decode_plan(
            r#"{"query":{"sql":"SELECT 1","start":"2025-01-02T00:00:00Z","end":"2025-01-01T00:00:00Z"}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PlanFailure::Defect(PlanDefect::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_equal_bounds_are_allowed() {
        let plan = decode_plan(
            r#"{"query":{"sql":"SELECT 1","start":"2025-01-01T00:00:00Z","end":"2025-01-01T00:00:00Z"}}"#,
        );
        assert!(matches!(plan, Ok(Plan::Continue { .. })));
    }

    #[test]
    fn test_bad_and_missing_timestamps() {
        let err = decode_plan(r#"{"query":{"sql":"SELECT 1","start":"yesterday","end":"2025-01-01T00:00:00Z"}}"#)
            .unwrap_err();
        assert_eq!(
            err,
            PlanFailure::Defect(PlanDefect::InvalidTimestamp {
                field: "start",
                value: "yesterday".into()
            })
        );

        let err = decode_plan(r#"{"query":{"sql":"SELECT 1","start":"2025-01-01T00:00:00Z"}}"#)
            .unwrap_err();
        assert_eq!(err, PlanFailure::Defect(PlanDefect::MissingBound("end")));
    }

    #[test]
    fn test_zoneless_timestamp_read_as_utc() {
        let plan = decode_plan(
            r#"{"query":{"sql":"SELECT 1","start":"2025-08-03T05:40:00","end":"2025-08-03T06:00:00.5"}}"#,
        )
        .unwrap();
        match plan {
            Plan::Continue { query, .. } => {
                assert_eq!(query.start, Utc.with_ymd_and_hms(2025, 8, 3, 5, 40, 0).unwrap());
            }
            other => panic!("Expected Continue, got {:?}", other),
        }
    }

    #[test]
    fn test_shortened_iso_forms_accepted() {
        let cases = [
            ("2025-08-03T05:00Z", Utc.with_ymd_and_hms(2025, 8, 3, 5, 0, 0)),
            ("2025-08-03T05:00", Utc.with_ymd_and_hms(2025, 8, 3, 5, 0, 0)),
            ("2025-08-03T07:00+02:00", Utc.with_ymd_and_hms(2025, 8, 3, 5, 0, 0)),
            ("2025-08-03", Utc.with_ymd_and_hms(2025, 8, 3, 0, 0, 0)),
        ];
        for (text, expected) in cases {
            assert_eq!(
                parse_timestamp("start", text).unwrap(),
                expected.unwrap(),
                "{}",
                text
            );
        }

        let plan = decode_plan(
            r#"{"query":{"sql":"SELECT 1","start":"2025-08-03","end":"2025-08-03T06:00Z"}}"#,
        );
        assert!(matches!(plan, Ok(Plan::Continue { .. })));
    }

    #[test]
    fn test_partial_timestamps_still_rejected() {
        for text in ["2025-08-03T05", "2025-08", "08/03/2025 05:00"] {
            assert!(parse_timestamp("end", text).is_err(), "{}", text);
        }
    }

    #[test]
    fn test_non_objects_are_unparseable() {
        for text in ["not json", "```json\n{}\n```", "[1,2]", "\"final\"", ""] {
            assert!(
                matches!(decode_plan(text), Err(PlanFailure::Unparseable(_))),
                "{:?} should be unparseable",
                text
            );
        }
    }
}
