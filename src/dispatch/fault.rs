//! Classification of panics raised while a handler runs.
//!
//! An error-shaped payload (`panic_any(err)`) becomes a dispatch error; any
//! other payload is re-raised unchanged.

use std::any::Any;

use crate::dispatch::DispatchError;
use crate::handler::HandlerError;

type Payload = Box<dyn Any + Send>;

/// Extract the message of an error-shaped payload, or hand the payload back.
pub fn error_message(payload: Payload) -> Result<String, Payload> {
    let payload = match payload.downcast::<HandlerError>() {
        Ok(err) => return Ok(err.to_string()),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(err) => return Ok(err.to_string()),
        Err(payload) => payload,
    };
    match payload.downcast::<std::io::Error>() {
        Ok(err) => Ok(err.to_string()),
        Err(payload) => Err(payload),
    }
}

/// Convert an intercepted panic into a dispatch error, re-raising payloads
/// that are not errors.
pub(crate) fn escalate(payload: Payload) -> DispatchError {
    match error_message(payload) {
        Ok(message) => DispatchError::Fault { message },
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
