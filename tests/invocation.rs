//! Configuration-driven invocation through the JSON-lines loop.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use udf_mux::config::load_config;
use udf_mux::handler::builtin;
use udf_mux::lifecycle::build_router;
use udf_mux::runtime::{ErrorResponse, Invoker};

mod common;
use common::{assert_json_eq, test_event};

const CONFIG: &str = r#"
fallback = "function_name"

[invocation]
timeout_secs = 5

[[routes]]
name = "kv"
function = "*_udf"
cluster = "d*"
user_regex = "t.*"
handler = "concat"

[routes.batch]
chunk_size = 2
distinct = true

[[routes]]
function = "echo"
handler = "echo"
"#;

fn invoker() -> Invoker {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();
    let router = build_router(&config, &builtin::registry()).unwrap();
    Invoker::new(router, &config.invocation)
}

#[tokio::test]
async fn test_configured_routes() {
    let invoker = invoker();
    let event = test_event(
        "kv_udf",
        vec![
            vec!["hoge".into(), 1i64.into()],
            vec!["fuga".into(), 2i64.into()],
            vec!["hoge".into(), 1i64.into()],
        ],
    );
    let body = invoker.invoke(&serde_json::to_string(&event).unwrap()).await.unwrap();
    assert_json_eq(
        &body,
        r#"{"results":["hoge1","fuga2","hoge1"],"num_records":3,"success":true}"#,
    );

    let event = test_event("echo", vec![vec!["x".into(), "y".into()]]);
    let body = invoker.invoke(&serde_json::to_string(&event).unwrap()).await.unwrap();
    assert_json_eq(&body, r#"{"results":["x"],"num_records":1,"success":true}"#);

    let event = test_event("unrouted", vec![vec![], vec![]]);
    let body = invoker.invoke(&serde_json::to_string(&event).unwrap()).await.unwrap();
    assert_json_eq(
        &body,
        r#"{"results":["unrouted","unrouted"],"num_records":2,"success":true}"#,
    );
}

#[tokio::test]
async fn test_serve_mixed_input() {
    let invoker = invoker();
    let event = serde_json::to_string(&test_event("echo", vec![vec![7i64.into()]])).unwrap();
    let input = format!("{event}\n\n{{\"arguments\": 3}}\n{event}\n");

    let mut output = Vec::new();
    let served = invoker
        .serve(input.as_bytes(), &mut output, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(served, 3);

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_json_eq(lines[0], r#"{"results":[7],"num_records":1,"success":true}"#);
    let error: ErrorResponse = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(error.error_type, "InvalidEvent");
    assert_json_eq(lines[2], lines[0]);
}
