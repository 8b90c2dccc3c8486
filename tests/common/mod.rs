//! Shared utilities for integration tests.

#![allow(dead_code)]

use udf_mux::handler::HandlerResult;
use udf_mux::{Context, EventMetadata, Row, UdfEvent, Value};

/// Build an event with fixed test metadata and `num_records` = row count.
pub fn test_event(function: &str, args: Vec<Row>) -> UdfEvent {
    UdfEvent::new(
        EventMetadata {
            request_id: "00000000-0000-0000-0000-000000000000".into(),
            cluster: "dummy".into(),
            user: "test".into(),
            database: "dev".into(),
            external_function: function.into(),
            query_id: 10,
            num_records: 0,
        },
        args,
    )
}

/// `[["hoge",1],["fuga",2],["piyo",3]]`
pub fn default_rows() -> Vec<Row> {
    vec![
        vec!["hoge".into(), 1i64.into()],
        vec!["fuga".into(), 2i64.into()],
        vec!["piyo".into(), 3i64.into()],
    ]
}

/// The two distinct key/value rows repeated three times.
pub fn duplicated_rows() -> Vec<Row> {
    (0..3)
        .flat_map(|_| {
            [
                vec![Value::from("hoge"), Value::from(1i64)],
                vec![Value::from("fuga"), Value::from(2i64)],
            ]
        })
        .collect()
}

/// `key=value` for a two-column row.
pub fn kv(row: &[Value]) -> Value {
    Value::from(format!("{}={}", row[0], row[1]))
}

/// Whole-batch handler formatting every row with [`kv`].
pub async fn kv_handler(_ctx: Context, rows: Vec<Row>) -> HandlerResult<Vec<Value>> {
    Ok(rows.iter().map(|row| kv(row)).collect())
}

/// Whole-batch handler that returns nothing.
pub async fn void_handler(_ctx: Context, _rows: Vec<Row>) -> HandlerResult<Vec<Value>> {
    Ok(Vec::new())
}

/// Assert two JSON documents are structurally equal.
pub fn assert_json_eq(actual: &str, expected: &str) {
    let actual: serde_json::Value = serde_json::from_str(actual).unwrap();
    let expected: serde_json::Value = serde_json::from_str(expected).unwrap();
    assert_eq!(actual, expected);
}
