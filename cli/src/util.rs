use serde_json::{Value, json};

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Serialize for terminal output. Values built from parsed JSON always serialize.
pub fn render(value: &Value, raw: bool) -> String {
    let rendered = if raw {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", render(&err, false));
    std::process::exit(4);
}

fn connection_error(e: &reqwest::Error) -> i32 {
    let err = json!({
        "error": "connection_error",
        "message": format!("{e}"),
        "docs_hint": "Is the tool server running? Check INBOXCAL_API_URL."
    });
    eprintln!("{}", render(&err, false));
    3
}

/// Map an HTTP status to the CLI exit code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub fn exit_code_for(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Execute an API request, print the JSON response, return the exit code.
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
    raw: bool,
) -> i32 {
    let url = match reqwest::Url::parse(&format!("{api_url}{path}")) {
        Ok(u) => u,
        Err(e) => {
            let err = json!({
                "error": "cli_error",
                "message": format!("Invalid URL: {api_url}{path}: {e}")
            });
            eprintln!("{}", render(&err, false));
            return 4;
        }
    };

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => return connection_error(&e),
    };

    let status = resp.status().as_u16();
    let exit_code = exit_code_for(status);

    let resp_body: Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    let formatted = render(&resp_body, raw);
    if exit_code == 0 {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }
    exit_code
}

/// GET a text endpoint. Connection failures are reported and turned into an exit code.
pub async fn get_text(api_url: &str, path: &str) -> Result<(u16, String), i32> {
    let resp = match client().get(format!("{api_url}{path}")).send().await {
        Ok(r) => r,
        Err(e) => return Err(connection_error(&e)),
    };
    let status = resp.status().as_u16();
    match resp.text().await {
        Ok(text) => Ok((status, text)),
        Err(e) => Err(connection_error(&e)),
    }
}

/// Split a server-sent-events body into (event, data) pairs.
/// Multi-line `data:` fields are joined with newlines.
pub fn parse_sse(body: &str) -> Vec<(String, String)> {
    body.replace("\r\n", "\n")
        .split("\n\n")
        .filter_map(|frame| {
            let mut event = None;
            let mut data: Vec<&str> = Vec::new();
            for line in frame.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = Some(value.trim_start().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value));
                }
            }
            if event.is_none() && data.is_empty() {
                return None;
            }
            Some((
                event.unwrap_or_else(|| "message".to_string()),
                data.join("\n"),
            ))
        })
        .collect()
}

/// Parse an inline JSON argument, exiting with a usage error when it is not JSON.
pub fn parse_json_arg(flag: &str, value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|e| {
        exit_error(
            &format!("{flag} is not valid JSON: {e}"),
            Some("Pass a JSON literal, e.g. --input '{\"name\": \"alex\"}'"),
        )
    })
}
