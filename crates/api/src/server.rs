//! Newline-delimited JSON transport
//!
//! One request object per input line, one response object per output line.
//! Requests are handled in order.

use deploywatch_common::resilience::Clock;
use deploywatch_domain::DeployError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::context::ToolHandler;

#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    /// Echoed back on the response
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DeployError>,
}

impl ToolResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self { id, result: Some(result), error: None }
    }

    pub fn failure(id: Option<Value>, error: DeployError) -> Self {
        Self { id, result: None, error: Some(error) }
    }
}

/// Parse and handle one request line
pub async fn respond<C>(handler: &ToolHandler<C>, line: &str) -> ToolResponse
where
    C: Clock + Clone,
{
    let request: ToolRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            return ToolResponse::failure(
                None,
                DeployError::InvalidInput(format!("Malformed request: {err}")),
            )
        }
    };

    debug!(method = %request.method, "Handling request");
    match handler.handle_request(&request.method, request.params).await {
        Ok(result) => ToolResponse::success(request.id, result),
        Err(err) => ToolResponse::failure(request.id, err),
    }
}

/// Serve requests from `reader` until end of input.
///
/// Returns the number of requests handled. Blank lines are skipped.
pub async fn serve<C, R, W>(handler: &ToolHandler<C>, reader: R, mut writer: W) -> std::io::Result<usize>
where
    C: Clock + Clone,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = respond(handler, line).await;
        if let Some(error) = &response.error {
            warn!(error = %error, "Request failed");
        }

        let mut encoded = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        handled += 1;
    }

    Ok(handled)
}
