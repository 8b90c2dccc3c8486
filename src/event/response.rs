//! Response envelope returned for every dispatch.
//!
//! # Wire Shape
//! ```text
//! success: {"success":true,"num_records":3,"results":["a",null,"c"]}
//! failure: {"success":false,"error_msg":"..."}
//! ```
//!
//! A zero-row success still carries `"num_records":0,"results":[]`; both
//! fields are present exactly when `success` is true.

use serde::{Deserialize, Serialize};

use crate::event::value::Value;

/// Uniform success/failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_records: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
}

impl Envelope {
    /// Successful envelope; `num_records` is the length of `results`.
    pub fn success(results: Vec<Value>) -> Self {
        Self {
            success: true,
            error_msg: None,
            num_records: Some(results.len()),
            results: Some(results),
        }
    }

    /// Failed envelope carrying only the error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_msg: Some(message.into()),
            num_records: None,
            results: None,
        }
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
