//! Inbound invocation event.

use serde::{Deserialize, Serialize};

use crate::event::value::Row;

/// Descriptive attributes of one invocation.
///
/// This is the snapshot handlers read through
/// [`Context::metadata`](crate::dispatch::Context::metadata). Every field
/// defaults so partial events still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMetadata {
    /// Invocation identifier assigned by the caller.
    pub request_id: String,

    /// Cluster the query runs on.
    pub cluster: String,

    /// Database user issuing the query.
    pub user: String,

    /// Database the query runs against.
    pub database: String,

    /// Name of the external function being invoked.
    pub external_function: String,

    /// Query identifier assigned by the caller.
    pub query_id: i64,

    /// Number of result rows the caller expects back.
    pub num_records: usize,
}

/// A complete invocation: metadata plus the argument rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdfEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    /// Outer sequence = rows, inner = columns.
    #[serde(default)]
    pub arguments: Vec<Row>,
}

impl UdfEvent {
    /// Build an event whose expected row count equals the number of rows.
    pub fn new(metadata: EventMetadata, arguments: Vec<Row>) -> Self {
        let metadata = EventMetadata {
            num_records: arguments.len(),
            ..metadata
        };
        Self { metadata, arguments }
    }

    /// Row count the caller expects in the response.
    pub fn expected_rows(&self) -> usize {
        self.metadata.num_records
    }

    /// Name of the invoked external function.
    pub fn function(&self) -> &str {
        &self.metadata.external_function
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Value;

    #[test]
    fn test_parse_event() {
        let json = r#"{
            "request_id": "23FF1F97-F28A-44AA-AB67-266ED976BF40",
            "cluster": "arn:aws:redshift:xxxx",
            "user": "adminuser",
            "database": "db1",
            "external_function": "public.foo",
            "query_id": 5678234,
            "num_records": 2,
            "arguments": [["hoge", 1], ["fuga", null]]
        }"#;
        let event: UdfEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.function(), "public.foo");
        assert_eq!(event.metadata.query_id, 5678234);
        assert_eq!(event.expected_rows(), 2);
        assert_eq!(event.arguments[1], vec![Value::from("fuga"), Value::Null]);
    }

    #[test]
    fn test_missing_fields_default() {
        let event: UdfEvent = serde_json::from_str(r#"{"external_function":"f"}"#).unwrap();
        assert_eq!(event.expected_rows(), 0);
        assert!(event.arguments.is_empty());
        assert!(event.metadata.cluster.is_empty());
    }

    #[test]
    fn test_new_sets_expected_rows() {
        let event = UdfEvent::new(EventMetadata::default(), vec![vec![], vec![]]);
        assert_eq!(event.expected_rows(), 2);
    }
}
