use serde_json::{Value, json};

use crate::util::{exit_code_for, get_text, parse_sse, render};

/// Read the `/sse` feed and print the tool descriptors as a JSON array.
pub async fn run(api_url: &str, names_only: bool, raw: bool) -> i32 {
    let (status, body) = match get_text(api_url, "/sse").await {
        Ok(response) => response,
        Err(code) => return code,
    };
    let code = exit_code_for(status);
    if code != 0 {
        eprintln!("{}", body.trim());
        return code;
    }

    let tools = collect_tools(&body);
    let output = if names_only {
        Value::Array(
            tools
                .iter()
                .filter_map(|tool| tool.get("name").cloned())
                .collect(),
        )
    } else {
        json!({ "tools": tools })
    };
    println!("{}", render(&output, raw));
    0
}

/// Descriptors from `tool` events up to the first `end` event. Frames whose data
/// is not JSON are skipped.
fn collect_tools(body: &str) -> Vec<Value> {
    parse_sse(body)
        .into_iter()
        .take_while(|(event, _)| event != "end")
        .filter(|(event, _)| event == "tool")
        .filter_map(|(_, data)| serde_json::from_str(&data).ok())
        .collect()
}
