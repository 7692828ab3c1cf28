use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::RunRequest;
use crate::engine::RunDispatcher;

/// Stateless run queued by a front end
#[derive(Debug, Serialize, Deserialize)]
pub struct RunJob {
    /// Caller's correlation id, echoed back in the result
    #[serde(default)]
    pub session_id: Option<String>,
    /// List the result is pushed to (the caller BLPOPs it)
    pub result_key: String,
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub stdin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunJobResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub output: String,
}

pub async fn process_run_job(job: &RunJob, dispatcher: &RunDispatcher) -> RunJobResult {
    let request = RunRequest::new(job.language.as_str(), job.code.as_str(), job.stdin.as_str());
    let result = dispatcher.execute(&request).await;

    info!(
        "Run job completed: session_id={:?}, language={}",
        job.session_id, job.language
    );

    RunJobResult {
        session_id: job.session_id.clone(),
        output: result.output,
    }
}
