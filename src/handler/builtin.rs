//! Handlers shipped with the binary.
//!
//! - `echo`: first column of every row
//! - `concat`: all values of a row concatenated, one task per row
//! - `function_name`: the invoked function name for every row

use async_trait::async_trait;

use crate::dispatch::Context;
use crate::event::{Row, Value};
use crate::handler::{HandlerRegistry, HandlerResult, RowHandler, UdfHandler};

/// Returns the first column of each row (null for empty rows).
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

#[async_trait]
impl UdfHandler for Echo {
    async fn execute(&self, _ctx: &Context, rows: &[Row]) -> HandlerResult<Vec<Value>> {
        Ok(rows
            .iter()
            .map(|row| row.first().cloned().unwrap_or_default())
            .collect())
    }
}

/// Concatenates the display form of every non-null value in a row.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concat;

#[async_trait]
impl RowHandler for Concat {
    async fn execute_row(&self, _ctx: &Context, row: &[Value]) -> HandlerResult<Value> {
        Ok(Value::from(
            row.iter()
                .filter(|v| !v.is_null())
                .map(ToString::to_string)
                .collect::<String>(),
        ))
    }
}

/// Answers every row with the name of the invoked external function.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionName;

#[async_trait]
impl UdfHandler for FunctionName {
    async fn execute(&self, ctx: &Context, rows: &[Row]) -> HandlerResult<Vec<Value>> {
        let name = Value::from(ctx.metadata().external_function);
        Ok(vec![name; rows.len()])
    }
}

/// Registry pre-filled with the builtin handlers.
pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register("echo", Echo)
        .register_row("concat", Concat)
        .register("function_name", FunctionName);
    registry
}
