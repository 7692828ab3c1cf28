use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output placeholder shown while a run is in flight
pub const RUNNING_MESSAGE: &str = "Running...";

/// Output of a local run that logged nothing
pub const NO_LOCAL_OUTPUT_MESSAGE: &str = "Code executed successfully (no output)";

/// Output of a remote run that printed nothing
pub const NO_REMOTE_OUTPUT_MESSAGE: &str = "No output";

/// Fallback when a remote error response carries no message
pub const UNKNOWN_REMOTE_ERROR_MESSAGE: &str = "Unknown error";

/// A single run action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub language: String,
    #[serde(rename = "code")]
    pub source_code: String,
    #[serde(default)]
    pub stdin: String,
}

impl RunRequest {
    pub fn new(
        language: impl Into<String>,
        source_code: impl Into<String>,
        stdin: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            source_code: source_code.into(),
            stdin: stdin.into(),
        }
    }
}

/// Result of a run: one opaque text blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub output: String,
}

impl RunResult {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl From<RunFailure> for RunResult {
    fn from(failure: RunFailure) -> Self {
        Self::new(failure.to_string())
    }
}

/// Every way a run can fail. Failures end the run and are shown as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunFailure {
    /// Language is neither run locally nor registered
    #[error("Language not supported in this demo backend.")]
    UnsupportedLanguage,

    /// The local script threw
    #[error("ERROR: {0}")]
    LocalExecution(String),

    /// The remote service answered without a run result
    #[error("Error: {0}")]
    RemoteProtocol(String),

    /// The remote request did not complete
    #[error("Network Error: {0}")]
    RemoteTransport(String),
}
