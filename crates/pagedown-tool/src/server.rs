//! Newline-delimited JSON-RPC 2.0 server over stdio.
//!
//! One request per line in, one response per line out. Requests without an
//! `id` are notifications and get no response. Nothing but responses is ever
//! written to the output stream; logs go to stderr.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::tools::ToolService;
use crate::ToolError;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Name reported in `initialize`.
const SERVER_NAME: &str = "html-to-markdown";
/// Protocol version offered when the client does not ask for one.
const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        let code = if err.is_request_error() {
            INVALID_PARAMS
        } else {
            INTERNAL_ERROR
        };
        RpcError::new(code, err.to_string())
    }
}

impl Response {
    fn new(id: Value, outcome: std::result::Result<Value, RpcError>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            jsonrpc: "2.0",
            id,
            result,
            error,
        }
    }
}

/// Serves the tools over JSON-RPC.
pub struct Server {
    tools: ToolService,
}

impl Server {
    pub fn new(tools: ToolService) -> Self {
        Self { tools }
    }

    /// Read requests from `input` until EOF, writing responses to `output`.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line) {
                output.write_all(response.as_bytes())?;
                output.write_all(b"\n")?;
                output.flush()?;
            }
        }
        info!("input closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Returns the serialized response, if any.
    pub fn handle_message(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_value(message)?,
            Err(e) => {
                warn!("malformed message: {}", e);
                Response::new(Value::Null, Err(RpcError::new(PARSE_ERROR, format!("Parse error: {e}"))))
            }
        };

        match serde_json::to_string(&response) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("failed to serialize response: {}", e);
                None
            }
        }
    }

    fn handle_value(&self, message: Value) -> Option<Response> {
        let id = message.get("id").cloned().filter(|id| !id.is_null());

        let request: Request = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                // responses or garbage from the client; only answer if addressed
                return id.map(|id| {
                    Response::new(id, Err(RpcError::new(INVALID_REQUEST, format!("Invalid request: {e}"))))
                });
            }
        };

        let Some(id) = request.id.filter(|id| !id.is_null()) else {
            debug!(method = %request.method, "notification");
            return None;
        };

        debug!(method = %request.method, "request");
        Some(Response::new(id, self.dispatch(&request.method, request.params)))
    }

    fn dispatch(&self, method: &str, params: Value) -> std::result::Result<Value, RpcError> {
        match method {
            "initialize" => {
                let version = params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Ok(json!({
                    "protocolVersion": version,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.list_tools() })),
            "tools/call" => {
                let call: CallParams = serde_json::from_value(params)
                    .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid params: {e}")))?;
                info!(tool = %call.name, "tool call");
                let output = self.tools.call_tool(&call.name, call.arguments)?;
                Ok(serde_json::to_value(output).map_err(ToolError::from)?)
            }
            _ => Err(RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {method}"))),
        }
    }
}

/// Serve on the process's stdin and stdout.
pub fn serve_stdio(tools: ToolService) -> io::Result<()> {
    info!("HTML to Markdown server running on stdio");
    let stdin = io::stdin();
    let stdout = io::stdout();
    Server::new(tools).serve(stdin.lock(), stdout.lock())
}
