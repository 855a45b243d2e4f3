//! Bounded rendering of query results for the transcript
//!
//! Only the row count, the column names and the first row are echoed back,
//! so the transcript stays small no matter how large a result set is.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use super::{QueryResult, Row};

/// Observation text for an empty result set
pub const EMPTY_RESULT_SUMMARY: &str = "Query returned no results (an empty list).";

/// Compact JSON with a space after `,` and `:`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn render_row(row: &Row) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    match row.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => format!("<unserializable row: {}>", e),
    }
}

/// Reduce a query result to a single observation line
pub fn summarize(result: &QueryResult) -> String {
    match result {
        QueryResult::Failed(error) => format!("Query failed with error: {}", error),
        QueryResult::Rows(rows) => match rows.first() {
            None => EMPTY_RESULT_SUMMARY.to_string(),
            Some(first) => {
                let columns: Vec<&str> = first.keys().map(String::as_str).collect();
                format!(
                    "Query returned {} rows. Columns: {}. First row summary: {}",
                    rows.len(),
                    columns.join(", "),
                    render_row(first)
                )
            }
        },
    }
}
