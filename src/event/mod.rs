//! Invocation payloads.
//!
//! # Data Flow
//! ```text
//! JSON event (request_id, cluster, user, database, external_function, ...)
//!     → request.rs (UdfEvent = EventMetadata + argument rows)
//!     → value.rs (closed scalar union for every argument and result)
//!     → response.rs (Envelope: success/failure shape sent back)
//! ```
//!
//! # Design Decisions
//! - Values are a closed enum; non-scalar JSON is rejected at parse time
//! - Absent envelope fields are omitted, never serialized as `null`

pub mod request;
pub mod response;
pub mod value;

pub use request::{EventMetadata, UdfEvent};
pub use response::Envelope;
pub use value::{Row, Value};
