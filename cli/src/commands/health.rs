use crate::util::{api_request, get_text};

pub async fn run(api_url: &str, raw: bool) -> i32 {
    api_request(api_url, reqwest::Method::GET, "/health", None, raw).await
}

/// Plain-text liveness check against `/`.
pub async fn ping(api_url: &str) -> i32 {
    match get_text(api_url, "/").await {
        Ok((status, text)) => {
            let code = crate::util::exit_code_for(status);
            if code == 0 {
                println!("{}", text.trim());
            } else {
                eprintln!("{}", text.trim());
            }
            code
        }
        Err(code) => code,
    }
}
