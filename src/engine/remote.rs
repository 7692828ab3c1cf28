//! Remote execution client (Piston API)
//!
//! One POST per run, no retry. Every outcome, including transport failure,
//! becomes output text.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::run::{NO_REMOTE_OUTPUT_MESSAGE, UNKNOWN_REMOTE_ERROR_MESSAGE};
use crate::core::{LanguageEntry, RunFailure, RunRequest, RunResult};

/// Public Piston endpoint used when none is configured
pub const DEFAULT_PISTON_URL: &str = "https://emkc.org/api/v2/piston/execute";

/// Backend for languages that are not run locally
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run `request` as `entry`'s remote runtime
    async fn execute(&self, entry: &LanguageEntry, request: &RunRequest) -> RunResult;
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: Vec<SourceFile<'a>>,
    stdin: &'a str,
}

#[derive(Debug, Serialize)]
struct SourceFile<'a> {
    content: &'a str,
}

/// HTTP client for the Piston `execute` endpoint
#[derive(Debug, Clone)]
pub struct PistonClient {
    client: Client,
    url: String,
}

impl PistonClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    async fn send(&self, body: &ExecuteRequest<'_>) -> Result<Value, RunFailure> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| RunFailure::RemoteTransport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RunFailure::RemoteTransport(e.to_string()))?;

        debug!("Piston response ({}): {} bytes", status, text.len());

        serde_json::from_str(&text).map_err(|e| RunFailure::RemoteTransport(e.to_string()))
    }
}

#[async_trait]
impl RemoteExecutor for PistonClient {
    async fn execute(&self, entry: &LanguageEntry, request: &RunRequest) -> RunResult {
        let body = ExecuteRequest {
            language: &entry.api,
            version: &entry.version,
            files: vec![SourceFile {
                content: &request.source_code,
            }],
            stdin: &request.stdin,
        };

        match self.send(&body).await {
            Ok(data) => interpret_response(&data),
            Err(failure) => {
                warn!("Piston request for {} failed: {}", entry.key, failure);
                failure.into()
            }
        }
    }
}

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a JSON value, as JavaScript's `String(value)` gives it
fn js_display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_display(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `value.field` rendered as text when it is truthy
fn truthy_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .filter(|v| is_truthy(v))
        .map(js_display)
}

/// Map a Piston response (`{run: {output}}` or `{message}`) to output text
fn interpret_response(data: &Value) -> RunResult {
    // Property access on a null body fails before any field is read
    if data.is_null() {
        return RunFailure::RemoteTransport(
            "Cannot read properties of null (reading 'run')".to_string(),
        )
        .into();
    }

    match data.get("run").filter(|run| is_truthy(run)) {
        Some(run) => RunResult::new(
            truthy_field(run, "output").unwrap_or_else(|| NO_REMOTE_OUTPUT_MESSAGE.to_string()),
        ),
        None => {
            let message = truthy_field(data, "message")
                .unwrap_or_else(|| UNKNOWN_REMOTE_ERROR_MESSAGE.to_string());
            RunFailure::RemoteProtocol(message).into()
        }
    }
}
