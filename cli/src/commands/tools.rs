use serde_json::{Value, json};

use crate::util::api_request;

/// POST `{"input": ...}` to `/tools/{tool}`.
pub async fn call(api_url: &str, tool: &str, input: Value, raw: bool) -> i32 {
    api_request(
        api_url,
        reqwest::Method::POST,
        &format!("/tools/{tool}"),
        Some(json!({ "input": input })),
        raw,
    )
    .await
}

/// POST an A2A envelope to `/a2a`.
pub async fn perform_task(api_url: &str, task: &str, input: Value, raw: bool) -> i32 {
    api_request(
        api_url,
        reqwest::Method::POST,
        "/a2a",
        Some(a2a_envelope(task, input)),
        raw,
    )
    .await
}

pub fn a2a_envelope(task: &str, input: Value) -> Value {
    json!({
        "a2a.performTask": {
            "task": task,
            "input": input
        }
    })
}

/// Object input with the `None` fields left out.
pub fn object_input(fields: &[(&str, Option<&str>)]) -> Value {
    Value::Object(
        fields
            .iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), json!(v))))
            .collect(),
    )
}
