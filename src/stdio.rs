//! JSON-lines request handling
//!
//! One request per line on the input, one response per line on the output:
//!
//! ```text
//! {"id": 1, "method": "find", "query": "awoken r sonia"}
//! {"id": 1, "result": {"monster": {...}, "extras": {...}}}
//! ```

use crate::error::{validate_query, FindError};
use crate::search::MonsterFinder;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
pub struct FindRequest {
    pub id: Option<Value>,
    pub method: String,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct FindResponse {
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl FindResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: &str, message: &str) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }

    fn from_find_error(id: Option<Value>, err: &FindError) -> Self {
        Self::error(id, err.error_code(), &err.to_string())
    }
}

/// Serve requests from stdin until it closes
pub async fn handle_stdio(finder: &MonsterFinder) -> Result<()> {
    info!("Serving monster lookups on stdio");
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    serve(finder, stdin, &mut stdout).await
}

/// Request loop over any line source and sink
pub async fn serve<R, W>(finder: &MonsterFinder, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("Received request: {}", line);

        let response = match serde_json::from_str::<FindRequest>(&line) {
            Ok(request) => handle_request(request, finder).await,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                FindResponse::error(None, "parse_error", &format!("Invalid JSON: {}", e))
            }
        };

        let response_json = serde_json::to_string(&response)?;
        debug!("Sending response: {}", response_json);
        output.write_all(response_json.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

async fn handle_request(request: FindRequest, finder: &MonsterFinder) -> FindResponse {
    if let Err(e) = validate_query(&request.query) {
        return FindResponse::from_find_error(request.id, &e);
    }

    let result = match request.method.as_str() {
        "find" => finder
            .find(&request.query)
            .await
            .map(|(monster, extras)| json!({ "monster": monster, "extras": extras })),
        "find_all" => finder
            .find_all(&request.query)
            .await
            .map(|(monsters, extras)| json!({ "monsters": monsters, "extras": extras })),
        "find_debug" => finder
            .find_debug(&request.query)
            .await
            .map(|(info, extras)| json!({ "info": info, "extras": extras })),
        _ => {
            return FindResponse::error(
                request.id,
                "method_not_found",
                &format!("Method '{}' not found", request.method),
            )
        }
    };

    match result {
        Ok(value) => FindResponse::success(request.id, value),
        Err(e) => FindResponse::from_find_error(request.id, &e),
    }
}
